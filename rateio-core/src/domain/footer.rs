//! Sheet-of-record totals

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Where the footer totals came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FooterSource {
    /// Read from the trailing total row at this (header-stripped) index
    Footer { row: usize },
    /// No footer row; columns 4 and 5 were summed over every row
    Computed,
}

/// Grand totals as reported by the sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FooterTotals {
    pub gross_total: Decimal,
    pub allocated_total: Decimal,
    /// Number of grid rows after the header was dropped
    pub row_count: usize,
    pub source: FooterSource,
}

impl Default for FooterTotals {
    fn default() -> Self {
        Self {
            gross_total: Decimal::ZERO,
            allocated_total: Decimal::ZERO,
            row_count: 0,
            source: FooterSource::Computed,
        }
    }
}

impl FooterTotals {
    /// True when the totals were read from an actual footer row
    pub fn is_from_footer(&self) -> bool {
        matches!(self.source, FooterSource::Footer { .. })
    }
}
