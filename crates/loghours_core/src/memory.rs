//! In-memory spreadsheet and notifier.

use std::collections::BTreeMap;
use std::sync::Arc;

use loghours_error::{LogError, Result};
use parking_lot::Mutex;

use crate::message::SlashResponse;
use crate::notify::Notifier;
use crate::sheet::{Spreadsheet, SpreadsheetConnector, Worksheet};

/// Spreadsheet held in memory.
///
/// Also acts as its own connector. Clones share worksheets.
#[derive(Debug, Clone)]
pub struct MemorySpreadsheet {
    worksheets: Arc<Vec<MemoryWorksheet>>,
    open_error: Option<String>,
}

impl MemorySpreadsheet {
    pub fn new(worksheets: Vec<MemoryWorksheet>) -> Self {
        MemorySpreadsheet {
            worksheets: Arc::new(worksheets),
            open_error: None,
        }
    }

    /// Spreadsheet that errors when opened.
    pub fn failing(msg: impl Into<String>) -> Self {
        MemorySpreadsheet {
            worksheets: Arc::new(Vec::new()),
            open_error: Some(msg.into()),
        }
    }
}

impl SpreadsheetConnector for MemorySpreadsheet {
    type Spreadsheet = MemorySpreadsheet;

    async fn open(&self) -> Result<Self::Spreadsheet> {
        match &self.open_error {
            Some(msg) => Err(LogError::new(msg.clone())),
            None => Ok(self.clone()),
        }
    }
}

impl Spreadsheet for MemorySpreadsheet {
    type Worksheet = MemoryWorksheet;

    async fn worksheets(&self) -> Result<Vec<Self::Worksheet>> {
        Ok(self.worksheets.as_ref().clone())
    }
}

#[derive(Debug, Default)]
struct Grid {
    cells: BTreeMap<(usize, usize), String>,
    writes: usize,
}

/// Worksheet held in memory. Clones share cells.
#[derive(Debug, Clone)]
pub struct MemoryWorksheet {
    title: String,
    grid: Arc<Mutex<Grid>>,
}

impl MemoryWorksheet {
    pub fn new(title: impl Into<String>) -> Self {
        MemoryWorksheet {
            title: title.into(),
            grid: Arc::new(Mutex::new(Grid::default())),
        }
    }

    /// Replace a column with `values`, starting at row 1.
    pub fn with_column(self, col: usize, values: &[&str]) -> Self {
        {
            let mut grid = self.grid.lock();
            grid.cells.retain(|(_, c), _| *c != col);
            for (idx, value) in values.iter().enumerate() {
                if !value.is_empty() {
                    grid.cells.insert((idx + 1, col), value.to_string());
                }
            }
        }
        self
    }

    /// Set a cell without counting it as a write.
    pub fn set(&self, row: usize, col: usize, value: &str) {
        self.grid.lock().cells.insert((row, col), value.to_string());
    }

    pub fn get(&self, row: usize, col: usize) -> Option<String> {
        self.grid.lock().cells.get(&(row, col)).cloned()
    }

    /// Number of writes through `update_cell`.
    pub fn write_count(&self) -> usize {
        self.grid.lock().writes
    }
}

impl Worksheet for MemoryWorksheet {
    fn title(&self) -> &str {
        &self.title
    }

    async fn col_values(&self, col: usize) -> Result<Vec<String>> {
        let grid = self.grid.lock();
        let last = grid
            .cells
            .iter()
            .filter(|((_, c), v)| *c == col && !v.is_empty())
            .map(|((r, _), _)| *r)
            .max()
            .unwrap_or(0);

        Ok((1..=last)
            .map(|row| grid.cells.get(&(row, col)).cloned().unwrap_or_default())
            .collect())
    }

    async fn cell(&self, row: usize, col: usize) -> Result<Option<String>> {
        if row == 0 || col == 0 {
            return Err(LogError::new("Rows and columns start at 1")
                .with_field("row", row)
                .with_field("col", col));
        }
        Ok(self.get(row, col))
    }

    async fn update_cell(&self, row: usize, col: usize, value: &str) -> Result<()> {
        if row == 0 || col == 0 {
            return Err(LogError::new("Rows and columns start at 1")
                .with_field("row", row)
                .with_field("col", col));
        }
        let mut grid = self.grid.lock();
        grid.cells.insert((row, col), value.to_string());
        grid.writes += 1;
        Ok(())
    }
}

/// Notifier that records every message it's asked to send.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<(String, SlashResponse)>>>,
    fail: bool,
}

impl RecordingNotifier {
    /// Notifier that records messages, then errors.
    pub fn failing() -> Self {
        RecordingNotifier {
            messages: Arc::default(),
            fail: true,
        }
    }

    pub fn messages(&self) -> Vec<(String, SlashResponse)> {
        self.messages.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    async fn notify(&self, response_url: &str, message: &SlashResponse) -> Result<()> {
        self.messages
            .lock()
            .push((response_url.to_string(), message.clone()));
        if self.fail {
            return Err(LogError::new("Notification endpoint unavailable"));
        }
        Ok(())
    }
}
