use anyhow::bail;
use clap::Args;
use comfy_table::{presets, Attribute, Table};
use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::resolve_config;
use crate::client::{HistoryApi, HttpClient};
use crate::history::ledger::COLUMNS;
use crate::history::{FetchEvent, HistorySession, HistoryUnavailable, VersionLedger};

#[derive(Args)]
pub struct HistoryArgs {
    /// Project directory
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Maximum number of versions to display (0 = full history)
    #[arg(short = 'n', long, default_value = "50")]
    pub limit: usize,

    /// Path to a config file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: HistoryArgs) -> anyhow::Result<()> {
    let config = resolve_config(args.config.clone())?;
    if config.server.auth_token().is_none() {
        println!("{}", HistoryUnavailable::NotConfigured);
        return Ok(());
    }
    let api: Arc<dyn HistoryApi> = Arc::new(HttpClient::new(&config.server)?);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let mut session = match HistorySession::open(api, &args.dir).await {
            Ok(session) => session,
            Err(reason) => {
                // Terminal for this invocation, not an error.
                println!("{}", reason);
                return Ok(());
            }
        };

        loop {
            if args.limit > 0 && session.ledger().row_count() >= args.limit {
                break;
            }
            let before = session.ledger().oldest();
            if !session.fetch_older() {
                break;
            }
            match session.next_event().await {
                Some(FetchEvent::Page(page)) => {
                    session.apply_page(page)?;
                }
                Some(FetchEvent::Failed { message, retryable }) => {
                    if retryable {
                        bail!("fetching history failed: {} (try again)", message);
                    }
                    bail!("fetching history failed: {}", message);
                }
                None => break,
            }
            if session.ledger().oldest() == before {
                break;
            }
        }

        render(session.ledger(), args.limit);
        Ok(())
    })
}

fn render(ledger: &VersionLedger, limit: usize) {
    if ledger.is_empty() {
        println!("No versions found.");
        return;
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_header(COLUMNS.iter().map(|c| c.title()).collect::<Vec<_>>());

    let rows = if limit > 0 {
        ledger.row_count().min(limit)
    } else {
        ledger.row_count()
    };
    for row in 0..rows {
        let mut cells = Vec::with_capacity(ledger.column_count());
        for column in 0..ledger.column_count() {
            match ledger.cell(row, column) {
                Some(cell) => {
                    let mut out = comfy_table::Cell::new(cell.text);
                    if cell.bold {
                        out = out.add_attribute(Attribute::Bold);
                    }
                    cells.push(out);
                }
                None => cells.push(comfy_table::Cell::new("")),
            }
        }
        table.add_row(cells);
    }

    println!("{table}");
}
