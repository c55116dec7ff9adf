use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use crate::cli::resolve_config;
use crate::help::HelpIndex;
use crate::host::ProjectSnapshot;
use crate::project::LocalProject;
use crate::validation::{ProjectValidator, ValidationIssue};

#[derive(Args)]
pub struct ValidateArgs {
    /// Project directory
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Snapshot of the loaded project captured from the host (JSON)
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Path to a config file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: ValidateArgs) -> anyhow::Result<()> {
    let config = resolve_config(args.config.clone())?;
    let help = HelpIndex::new(&config.help.root);

    let snapshot = match &args.snapshot {
        Some(path) => Some(ProjectSnapshot::load(path)?),
        None => None,
    };
    let local = LocalProject::open(&args.dir).ok();

    let mut validator = ProjectValidator::new(&args.dir, snapshot.as_ref());
    if let Some(local) = &local {
        validator = validator.with_local(local);
    }
    let issues = validator.run_checks()?;

    if issues.is_empty() {
        println!("{}", "No issues found.".green());
        return Ok(());
    }

    println!("{} issue(s) found:", issues.len());
    for issue in &issues {
        print_issue(issue, &help);
    }
    Ok(())
}

fn print_issue(issue: &ValidationIssue, help: &HelpIndex) {
    let message = issue.kind().message(help);
    match issue {
        ValidationIssue::Project { layers, .. } if !layers.is_empty() => {
            println!("  {} {} [{}]", "warning:".yellow(), message, layers.join(", "));
        }
        ValidationIssue::Project { .. } => {
            println!("  {} {}", "warning:".yellow(), message);
        }
        ValidationIssue::Layer { layer, .. } => {
            println!("  {} {} [{}]", "warning:".yellow(), message, layer);
        }
    }
}
