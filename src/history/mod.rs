pub mod fetcher;
pub mod ledger;
pub mod session;
pub mod version;

pub use fetcher::{fetch_window, FetchEvent, VersionsFetcher, FETCH_WINDOW};
pub use ledger::{Cell, Column, RowsChanged, VersionLedger};
pub use session::{HistorySession, HistoryUnavailable};
pub use version::{parse_version_name, Version};
