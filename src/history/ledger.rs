use std::collections::VecDeque;

use crate::history::version::Version;
use crate::utils::contextual_date;
use crate::{CartosyncError, Result};

/// Column layout of the table projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Version,
    Author,
    Created,
}

pub const COLUMNS: [Column; 3] = [Column::Version, Column::Author, Column::Created];

impl Column {
    pub fn from_index(index: usize) -> Option<Column> {
        COLUMNS.get(index).copied()
    }

    pub fn title(&self) -> &'static str {
        match self {
            Column::Version => "Version",
            Column::Author => "Author",
            Column::Created => "Created",
        }
    }
}

/// Display payload for one table cell. `bold` marks the row holding the
/// locally checked-out version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub bold: bool,
}

/// Extent of rows touched by a mutating operation, so an observing view can
/// re-render only the affected range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsChanged {
    pub first: usize,
    pub last: usize,
}

struct Entry {
    version: Version,
    number: u64,
}

/// Ordered, double-ended store of version history entries, newest first.
///
/// The sequence is strictly decreasing in version number from front to back
/// and contains no duplicates; both insert paths validate their input and
/// apply a page all-or-nothing. Pages produced by the windowed fetch
/// protocol re-request the boundary version; the leading duplicate is
/// silently dropped here rather than rejected.
#[derive(Default)]
pub struct VersionLedger {
    entries: VecDeque<Entry>,
    current_version: Option<u64>,
}

impl VersionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the version matching the local checkout. Rendering metadata
    /// only; ordering is unaffected.
    pub fn set_current_version(&mut self, version: Option<u64>) {
        self.current_version = version;
    }

    pub fn current_version(&self) -> Option<u64> {
        self.current_version
    }

    /// Newest known version number, or None when empty.
    pub fn newest(&self) -> Option<u64> {
        self.entries.front().map(|e| e.number)
    }

    /// Oldest known version number, or None when empty.
    pub fn oldest(&self) -> Option<u64> {
        self.entries.back().map(|e| e.number)
    }

    /// True while older history may still exist on the server. Version
    /// numbering starts at 1, so the root version ends pagination.
    pub fn can_extend_backward(&self) -> bool {
        match self.oldest() {
            None => true,
            Some(oldest) => oldest > 1,
        }
    }

    /// Append a page of older versions at the tail.
    ///
    /// The page must be sorted newest first and lie strictly below the
    /// current oldest entry; a leading entry equal to the current oldest is
    /// treated as the protocol's boundary anchor and dropped. On any other
    /// ordering violation the ledger is left untouched.
    pub fn append_older(&mut self, page: Vec<Version>) -> Result<Option<RowsChanged>> {
        let mut incoming = Self::checked_entries(page)?;
        if let Some(oldest) = self.oldest() {
            if incoming.first().map(|e| e.number) == Some(oldest) {
                incoming.remove(0);
            }
            if let Some(first) = incoming.first() {
                if first.number >= oldest {
                    return Err(CartosyncError::History(format!(
                        "page overlaps ledger: {} >= oldest {}",
                        first.number, oldest
                    )));
                }
            }
        }
        if incoming.is_empty() {
            return Ok(None);
        }

        let first_row = self.entries.len();
        self.entries.extend(incoming);
        Ok(Some(RowsChanged {
            first: first_row,
            last: self.entries.len() - 1,
        }))
    }

    /// Insert a page of newer versions at the head; mirrored contract of
    /// [`append_older`](Self::append_older).
    pub fn prepend_newer(&mut self, page: Vec<Version>) -> Result<Option<RowsChanged>> {
        let mut incoming = Self::checked_entries(page)?;
        if let Some(newest) = self.newest() {
            if incoming.last().map(|e| e.number) == Some(newest) {
                incoming.pop();
            }
            if let Some(last) = incoming.last() {
                if last.number <= newest {
                    return Err(CartosyncError::History(format!(
                        "page overlaps ledger: {} <= newest {}",
                        last.number, newest
                    )));
                }
            }
        }
        if incoming.is_empty() {
            return Ok(None);
        }

        let count = incoming.len();
        for entry in incoming.into_iter().rev() {
            self.entries.push_front(entry);
        }
        Ok(Some(RowsChanged {
            first: 0,
            last: count - 1,
        }))
    }

    /// Parse and order-check a page before anything is applied.
    fn checked_entries(page: Vec<Version>) -> Result<Vec<Entry>> {
        let mut entries = Vec::with_capacity(page.len());
        for version in page {
            let number = version.number()?;
            entries.push(Entry { version, number });
        }
        for pair in entries.windows(2) {
            if pair[1].number >= pair[0].number {
                return Err(CartosyncError::History(format!(
                    "page is not strictly descending: {} then {}",
                    pair[0].number, pair[1].number
                )));
            }
        }
        Ok(entries)
    }

    pub fn row_count(&self) -> usize {
        self.entries.len()
    }

    pub fn column_count(&self) -> usize {
        COLUMNS.len()
    }

    /// Display text and style for one grid cell.
    pub fn cell(&self, row: usize, column: usize) -> Option<Cell> {
        let entry = self.entries.get(row)?;
        let column = Column::from_index(column)?;
        let text = match column {
            Column::Version => entry.version.name.clone(),
            Column::Author => entry.version.author.clone(),
            Column::Created => contextual_date(entry.version.created),
        };
        Some(Cell {
            text,
            bold: self.current_version == Some(entry.number),
        })
    }

    /// Versions in display order (newest first).
    pub fn iter(&self) -> impl Iterator<Item = &Version> {
        self.entries.iter().map(|e| &e.version)
    }

    pub fn get(&self, row: usize) -> Option<&Version> {
        self.entries.get(row).map(|e| &e.version)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
