//! Which sheet to read and how to filter it

use serde::{Deserialize, Serialize};

pub const DEFAULT_SHEET_NAME: &str = "Página1";
pub const DEFAULT_CELL_RANGE: &str = "A1:Z100000";

/// Sheet selection passed to every ingestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetConfig {
    pub sheet_name: String,
    pub cell_range: String,
    /// Keep only records dated in this year; `None` keeps everything
    pub year_filter: Option<i32>,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            cell_range: DEFAULT_CELL_RANGE.to_string(),
            year_filter: None,
        }
    }
}

impl SheetConfig {
    pub fn with_year_filter(mut self, year: Option<i32>) -> Self {
        self.year_filter = year;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SheetConfig::default();
        assert_eq!(config.sheet_name, "Página1");
        assert_eq!(config.cell_range, "A1:Z100000");
        assert_eq!(config.year_filter, None);
        assert_eq!(config.with_year_filter(Some(2025)).year_filter, Some(2025));
    }
}
