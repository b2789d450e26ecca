//! Sheet parsing pipeline
//!
//! Everything in here is total over its input: malformed cells degrade to
//! zero or `None`, ill-formed blocks are skipped, and an empty payload is a
//! valid empty sheet.

pub mod dates;
pub mod footer;
pub mod grid;
pub mod money;
pub mod rows;
pub mod summary;

use serde::Serialize;

use crate::domain::{FooterTotals, SummaryBlockSet, TransactionRecord};

pub use dates::{extract_year, month_from_date};
pub use footer::{find_footer, footer_totals, is_footer_row};
pub use grid::{Grid, GridRow};
pub use money::{add_money, is_money_like, money_from_number, parse_money, parse_money_cell, sub_money};
pub use rows::{normalize_rows, Column, SheetRow};
pub use summary::{right_number, scan_summary_blocks};

/// Everything read out of one payload, before aggregation
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedSheet {
    pub footer: FooterTotals,
    pub summary: SummaryBlockSet,
    pub records: Vec<TransactionRecord>,
}

/// Run the footer detector, the summary scanner and the row normalizer over
/// one CSV payload
pub fn parse_sheet(text: &str, year_filter: Option<i32>) -> ParsedSheet {
    let grid = Grid::from_csv(text);
    if grid.is_empty() {
        tracing::info!("payload produced no rows; publishing an empty sheet");
        return ParsedSheet::default();
    }

    let rows = grid.without_header();
    ParsedSheet {
        footer: footer_totals(&rows),
        summary: scan_summary_blocks(&rows),
        records: normalize_rows(&rows, year_filter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_empty_payload_is_empty_sheet() {
        let parsed = parse_sheet("", None);
        assert!(parsed.records.is_empty());
        assert!(parsed.summary.is_empty());
        assert_eq!(parsed.footer, FooterTotals::default());
    }

    #[test]
    fn test_header_only_payload() {
        let parsed = parse_sheet("Data,Mês,Cliente,Centro,Valor,Rateado,Cod,Filial\n", None);
        assert!(parsed.records.is_empty());
        assert_eq!(parsed.footer.row_count, 0);
        assert_eq!(parsed.footer.gross_total, Decimal::ZERO);
    }

    #[test]
    fn test_header_row_is_not_a_record() {
        let text = "05/06/2025,6,ACME,CC1,10,1,001,Header Branch\n05/06/2025,6,ACME,CC1,10,1,001,Branch A\n";
        let parsed = parse_sheet(text, None);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].branch_name, "Branch A");
    }
}
