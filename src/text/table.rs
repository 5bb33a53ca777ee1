//! Table grid assembly from separator-delimited rows.

use crate::render::RenderConfig;

/// A rectangular grid of cell texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableGrid {
    /// Rows of cell text, each padded to `cols`
    pub rows: Vec<Vec<String>>,
    /// Column count
    pub cols: usize,
    /// Whether row 0 is a header
    pub has_header: bool,
}

impl TableGrid {
    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Builds [`TableGrid`]s from raw table lines.
#[derive(Debug, Clone)]
pub struct TableAssembler {
    separator: char,
}

impl TableAssembler {
    /// Create an assembler for the given configuration.
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            separator: config.column_separator,
        }
    }

    /// Assemble a grid from raw lines.
    ///
    /// Returns `None` when no row with at least two fields remains.
    pub fn assemble<S: AsRef<str>>(&self, lines: &[S]) -> Option<TableGrid> {
        let rows = lines
            .iter()
            .map(|line| self.split_row(line.as_ref()))
            .collect();
        grid_from_rows(rows, self.separator)
    }

    /// Cells are only trimmed; run building normalizes them around any
    /// inline formulas.
    fn split_row(&self, line: &str) -> Vec<String> {
        line.trim()
            .trim_matches(self.separator)
            .split(self.separator)
            .map(|field| field.trim().to_string())
            .collect()
    }
}

/// Shape already-split rows into a grid.
///
/// Rows with fewer than two fields are discarded; the rest are padded to
/// the widest row. A second row made only of rule characters is dropped.
pub fn grid_from_rows(rows: Vec<Vec<String>>, separator: char) -> Option<TableGrid> {
    let mut rows: Vec<Vec<String>> = rows.into_iter().filter(|r| r.len() >= 2).collect();
    let cols = rows.iter().map(Vec::len).max()?;

    for row in &mut rows {
        row.resize(cols, String::new());
    }

    if rows.len() > 1 && is_rule_row(&rows[1], separator) {
        rows.remove(1);
    }

    let has_header = rows.len() > 1;
    Some(TableGrid {
        rows,
        cols,
        has_header,
    })
}

fn is_rule_row(row: &[String], separator: char) -> bool {
    row.iter()
        .flat_map(|cell| cell.chars())
        .all(|c| matches!(c, '-' | ':' | ' ') || c == separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assembler() -> TableAssembler {
        TableAssembler::new(&RenderConfig::default())
    }

    #[test]
    fn test_pipe_table() {
        let grid = assembler()
            .assemble(&["| نام | سن |", "|---|---|", "| علی | ۲۰ |"])
            .unwrap();
        assert_eq!(grid.cols, 2);
        assert_eq!(
            grid.rows,
            vec![
                vec!["نام".to_string(), "سن".to_string()],
                vec!["علی".to_string(), "۲۰".to_string()],
            ]
        );
        assert!(grid.has_header);
    }

    #[test]
    fn test_rows_padded() {
        let grid = assembler()
            .assemble(&["a | b | c", "d | e"])
            .unwrap();
        assert_eq!(grid.cols, 3);
        assert!(grid.rows.iter().all(|r| r.len() == 3));
        assert_eq!(grid.rows[1][2], "");
    }

    #[test]
    fn test_short_rows_discarded() {
        let grid = assembler()
            .assemble(&["| a | b |", "| lonely |", "| c | d |"])
            .unwrap();
        assert_eq!(grid.row_count(), 2);
    }

    #[test]
    fn test_alignment_rule_row_removed() {
        let grid = assembler()
            .assemble(&["| a | b |", "| :--- | ---: |", "| 1 | 2 |"])
            .unwrap();
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.rows[1][0], "1");
    }

    #[test]
    fn test_single_row_has_no_header() {
        let grid = assembler().assemble(&["| a | b |"]).unwrap();
        assert!(!grid.has_header);

        // a lone rule row after the header leaves one row
        let grid = assembler().assemble(&["| a | b |", "|---|---|"]).unwrap();
        assert_eq!(grid.row_count(), 1);
        assert!(!grid.has_header);
    }

    #[test]
    fn test_empty_table_dropped() {
        assert!(assembler().assemble(&["| x |", "nothing"]).is_none());
        assert!(assembler().assemble::<&str>(&[]).is_none());
    }

    #[test]
    fn test_cells_trimmed_not_normalized() {
        let grid = assembler().assemble(&["|  $f( x )$ | كتاب |"]).unwrap();
        assert_eq!(grid.rows[0], vec!["$f( x )$".to_string(), "كتاب".to_string()]);
    }
}
