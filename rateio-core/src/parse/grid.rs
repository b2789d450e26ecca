//! Untyped cell grid produced from CSV text
//!
//! The grid is positional: cell (row, col) means the same thing regardless
//! of how many cells a given row actually carries. Reading past the end of
//! a row yields an empty cell.

use csv::ReaderBuilder;

/// Rows of string cells, header already removed or not depending on origin
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<String>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Tokenize CSV text into a grid
    ///
    /// Record lengths may vary, fields may be quoted, and blank lines are
    /// skipped. Invalid UTF-8 is replaced rather than rejected; a record the
    /// reader cannot decode ends tokenization with whatever was read so far.
    pub fn from_csv(text: &str) -> Self {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut rows = Vec::new();
        for result in reader.byte_records() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(error = %e, rows = rows.len(), "stopping CSV tokenization at unreadable record");
                    break;
                }
            };

            let row: Vec<String> = record
                .iter()
                .map(|field| String::from_utf8_lossy(field).into_owned())
                .collect();

            if row.iter().all(|cell| cell.is_empty()) && row.len() <= 1 {
                continue;
            }
            rows.push(row);
        }

        Self { rows }
    }

    /// The same grid with its first row (the header) dropped
    pub fn without_header(mut self) -> Self {
        if !self.rows.is_empty() {
            self.rows.remove(0);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<GridRow<'_>> {
        self.rows.get(index).map(|cells| GridRow { index, cells })
    }

    /// Iterate rows top to bottom
    pub fn rows(&self) -> impl DoubleEndedIterator<Item = GridRow<'_>> + ExactSizeIterator {
        self.rows
            .iter()
            .enumerate()
            .map(|(index, cells)| GridRow { index, cells })
    }

    /// Raw cell text; empty string when out of range
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Borrowed view of one grid row
#[derive(Debug, Clone, Copy)]
pub struct GridRow<'a> {
    index: usize,
    cells: &'a [String],
}

impl<'a> GridRow<'a> {
    /// Position of this row inside its grid
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of cells physically present
    pub fn width(&self) -> usize {
        self.cells.len()
    }

    /// Raw cell text; empty string when out of range
    pub fn cell(&self, col: usize) -> &'a str {
        self.cells.get(col).map(String::as_str).unwrap_or("")
    }

    /// Trimmed cell text
    pub fn trimmed(&self, col: usize) -> &'a str {
        self.cell(col).trim()
    }

    pub fn is_blank(&self, col: usize) -> bool {
        self.trimmed(col).is_empty()
    }

    /// Whether every cell from `col` onward is blank
    pub fn is_blank_from(&self, col: usize) -> bool {
        self.cells.iter().skip(col).all(|c| c.trim().is_empty())
    }

    /// Whether the whole row concatenates to whitespace
    pub fn is_blank_row(&self) -> bool {
        self.is_blank_from(0)
    }

    /// Iterate (column, raw text) pairs
    pub fn cells(&self) -> impl Iterator<Item = (usize, &'a str)> + 'a {
        self.cells.iter().map(String::as_str).enumerate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_csv_quoted_and_ragged() {
        let grid = Grid::from_csv("a,b,c\n\"1.234,56\",x\n\nlast\n");
        assert_eq!(grid.len(), 3);
        assert_eq!(grid.cell(1, 0), "1.234,56");
        assert_eq!(grid.cell(1, 1), "x");
        assert_eq!(grid.cell(1, 2), "");
        assert_eq!(grid.cell(2, 0), "last");
        assert_eq!(grid.cell(9, 9), "");
    }

    #[test]
    fn test_from_csv_empty() {
        assert!(Grid::from_csv("").is_empty());
        assert!(Grid::from_csv("\n\n").is_empty());
    }

    #[test]
    fn test_without_header() {
        let grid = Grid::from_csv("Data,Mes\n05/06/2025,6\n").without_header();
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.cell(0, 1), "6");

        assert!(Grid::default().without_header().is_empty());
    }

    #[test]
    fn test_row_blank_helpers() {
        let grid = Grid::new(vec![vec![
            "".to_string(),
            " x ".to_string(),
            "  ".to_string(),
            "".to_string(),
        ]]);
        let row = grid.row(0).unwrap();
        assert_eq!(row.width(), 4);
        assert_eq!(row.trimmed(1), "x");
        assert!(row.is_blank(0));
        assert!(!row.is_blank(1));
        assert!(row.is_blank(10));
        assert!(row.is_blank_from(2));
        assert!(!row.is_blank_from(1));
        assert!(!row.is_blank_row());
    }

    #[test]
    fn test_rows_iterate_in_both_directions() {
        let grid = Grid::from_csv("a\nb\nc\n");
        let forward: Vec<usize> = grid.rows().map(|r| r.index()).collect();
        let backward: Vec<usize> = grid.rows().rev().map(|r| r.index()).collect();
        assert_eq!(forward, vec![0, 1, 2]);
        assert_eq!(backward, vec![2, 1, 0]);
    }
}
