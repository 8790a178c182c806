//! Spreadsheet access used by the updater.
//!
//! Rows and columns are 1-based everywhere.

use std::fmt::Debug;

use loghours_error::Result;

/// Authenticates and opens a configured spreadsheet.
pub trait SpreadsheetConnector: Sync + Send + Debug {
    type Spreadsheet: Spreadsheet;

    fn open(&self) -> impl Future<Output = Result<Self::Spreadsheet>> + Send;
}

pub trait Spreadsheet: Sync + Send {
    type Worksheet: Worksheet;

    /// Worksheets in the order the provider returns them.
    fn worksheets(&self) -> impl Future<Output = Result<Vec<Self::Worksheet>>> + Send;
}

pub trait Worksheet: Sync + Send {
    fn title(&self) -> &str;

    /// Values of a column from the first row down to the last non-empty cell.
    fn col_values(&self, col: usize) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Value of a single cell, `None` if the cell has never been set.
    fn cell(&self, row: usize, col: usize)
    -> impl Future<Output = Result<Option<String>>> + Send;

    fn update_cell(
        &self,
        row: usize,
        col: usize,
        value: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}
