//! Table types.

use super::{Alignment, Direction};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A table structure.
///
/// Cells keep logical column order; right-to-left presentation is carried
/// by `direction` alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Rows in the table
    pub rows: Vec<TableRow>,

    /// Number of header rows (0 = no header)
    pub header_rows: u8,

    /// The single direction declaration of the table
    pub direction: Option<Direction>,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            header_rows: 0,
            direction: None,
        }
    }

    /// Create a table with header.
    pub fn with_header(header_rows: u8) -> Self {
        Self {
            header_rows,
            ..Self::new()
        }
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns (based on first row).
    pub fn column_count(&self) -> usize {
        self.rows.first().map(|r| r.cells.len()).unwrap_or(0)
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over every cell.
    pub fn cells(&self) -> impl Iterator<Item = &TableCell> {
        self.rows.iter().flat_map(|r| &r.cells)
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

/// A table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Cells in the row
    pub cells: Vec<TableCell>,

    /// Whether this is a header row
    pub is_header: bool,
}

impl TableRow {
    /// Create a new row with cells.
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self {
            cells,
            is_header: false,
        }
    }

    /// Create a header row.
    pub fn header(cells: Vec<TableCell>) -> Self {
        Self {
            cells,
            is_header: true,
        }
    }
}

/// A table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    /// Index range into the document's run arena
    pub runs: Range<usize>,

    /// Cell-level direction marker; cleared by the directionality pass
    pub direction: Option<Direction>,

    /// Background fill (hex RGB without `#`)
    pub shading: Option<String>,

    /// Cell paragraph alignment
    pub alignment: Alignment,
}

impl TableCell {
    /// Create a cell over the given run range.
    pub fn new(runs: Range<usize>) -> Self {
        Self {
            runs,
            direction: None,
            shading: None,
            alignment: Alignment::Justify,
        }
    }

    /// Set shading and return self.
    pub fn shaded(mut self, fill: impl Into<String>) -> Self {
        self.shading = Some(fill.into());
        self
    }

    /// Set direction marker and return self.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Check if the cell has no runs.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}
