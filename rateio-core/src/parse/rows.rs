//! Typed access to data rows and their normalization into records

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::dates::{extract_year, month_from_date};
use super::grid::{Grid, GridRow};
use super::money::parse_money;
use crate::domain::TransactionRecord;

/// Fixed column layout of the allocation sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Date,
    Month,
    Counterparty,
    CostCenter,
    Gross,
    Allocated,
    BranchCode,
    BranchName,
}

impl Column {
    pub const fn index(self) -> usize {
        match self {
            Column::Date => 0,
            Column::Month => 1,
            Column::Counterparty => 2,
            Column::CostCenter => 3,
            Column::Gross => 4,
            Column::Allocated => 5,
            Column::BranchCode => 6,
            Column::BranchName => 7,
        }
    }
}

/// A grid row read through the sheet's column contract
#[derive(Debug, Clone, Copy)]
pub struct SheetRow<'a> {
    row: GridRow<'a>,
}

impl<'a> SheetRow<'a> {
    pub fn new(row: GridRow<'a>) -> Self {
        Self { row }
    }

    fn text(&self, column: Column) -> &'a str {
        self.row.cell(column.index())
    }

    pub fn date_raw(&self) -> &'a str {
        self.text(Column::Date)
    }

    /// Month from the month column, else from the date column
    pub fn month(&self) -> Option<u32> {
        month_from_cell(self.text(Column::Month)).or_else(|| month_from_date(self.date_raw()))
    }

    pub fn year(&self) -> Option<i32> {
        extract_year(self.date_raw())
    }

    pub fn counterparty(&self) -> &'a str {
        self.text(Column::Counterparty).trim()
    }

    pub fn cost_center(&self) -> &'a str {
        self.text(Column::CostCenter).trim()
    }

    pub fn gross_value(&self) -> Decimal {
        parse_money(self.text(Column::Gross))
    }

    pub fn allocated_value(&self) -> Decimal {
        parse_money(self.text(Column::Allocated))
    }

    pub fn branch_code(&self) -> &'a str {
        self.text(Column::BranchCode).trim()
    }

    pub fn branch_name(&self) -> &'a str {
        self.text(Column::BranchName).trim()
    }

    /// Build a record if the row passes the retention rule
    pub fn to_record(&self) -> Option<TransactionRecord> {
        let month = self.month();
        let gross_value = self.gross_value();
        let allocated_value = self.allocated_value();
        let branch_name = self.branch_name();

        if !TransactionRecord::is_retainable(month, branch_name, gross_value, allocated_value) {
            return None;
        }

        Some(TransactionRecord {
            date_raw: self.date_raw().to_string(),
            month: month?,
            counterparty: self.counterparty().to_string(),
            cost_center: self.cost_center().to_string(),
            gross_value,
            allocated_value,
            branch_code: self.branch_code().to_string(),
            branch_name: branch_name.to_string(),
            year: self.year(),
        })
    }
}

/// Month number from the month column: parsed like money, truncated, 1..=12
fn month_from_cell(raw: &str) -> Option<u32> {
    let value = parse_money(raw);
    if value < Decimal::ONE || value > Decimal::from(12) {
        return None;
    }
    value.trunc().to_u32()
}

/// Normalize every (header-stripped) row and keep the retainable ones
///
/// Footer and summary rows fail the retention rule on their own, so no row
/// is special-cased here.
pub fn normalize_rows(grid: &Grid, year_filter: Option<i32>) -> Vec<TransactionRecord> {
    let mut dropped = 0usize;
    let mut off_year = 0usize;

    let records: Vec<TransactionRecord> = grid
        .rows()
        .filter_map(|row| {
            let record = SheetRow::new(row).to_record();
            if record.is_none() {
                dropped += 1;
            }
            record
        })
        .filter(|record| {
            let keep = record.matches_year(year_filter);
            if !keep {
                off_year += 1;
            }
            keep
        })
        .collect();

    tracing::debug!(
        retained = records.len(),
        dropped,
        off_year,
        ?year_filter,
        "rows normalized"
    );
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn grid(lines: &[&str]) -> Grid {
        Grid::from_csv(&lines.join("\n"))
    }

    #[test]
    fn test_month_from_cell() {
        assert_eq!(month_from_cell("6"), Some(6));
        assert_eq!(month_from_cell(" 12 "), Some(12));
        assert_eq!(month_from_cell("6,9"), Some(6));
        assert_eq!(month_from_cell("0"), None);
        assert_eq!(month_from_cell("13"), None);
        assert_eq!(month_from_cell("-3"), None);
        assert_eq!(month_from_cell("junho"), None);
    }

    #[test]
    fn test_typed_accessors() {
        let g = grid(&["05/06/2025, 6 , ACME ,CC1,\"R$ 100,00\",\"R$ 40,00\", 001 , Branch A "]);
        let row = SheetRow::new(g.row(0).unwrap());
        assert_eq!(row.date_raw(), "05/06/2025");
        assert_eq!(row.month(), Some(6));
        assert_eq!(row.year(), Some(2025));
        assert_eq!(row.counterparty(), "ACME");
        assert_eq!(row.cost_center(), "CC1");
        assert_eq!(row.gross_value(), Decimal::from(100));
        assert_eq!(row.allocated_value(), Decimal::from(40));
        assert_eq!(row.branch_code(), "001");
        assert_eq!(row.branch_name(), "Branch A");
    }

    #[test]
    fn test_month_falls_back_to_date_column() {
        let g = grid(&["2025-07-15,,ACME,CC1,10,5,001,Branch A"]);
        let record = SheetRow::new(g.row(0).unwrap()).to_record().unwrap();
        assert_eq!(record.month, 7);
        assert_eq!(record.year, Some(2025));
    }

    #[test]
    fn test_retention_filter() {
        let g = grid(&[
            "05/06/2025,6,ACME,CC1,\"100,00\",\"40,00\",001,Branch A",
            "05/06/2025,6,ACME,CC1,\"100,00\",\"40,00\",001,",
            "05/06/2025,6,ACME,CC1,0,0,001,Branch A",
            "xx,99,ACME,CC1,10,1,001,Branch A",
            ",,,,\"100,00\",\"40,00\",,",
            ",,Valor Total do mês 6,,\"100,00\",,,",
            "05/06/2025,6,ACME,CC1,0,\"(5,00)\",001,Branch B",
        ]);
        let records = normalize_rows(&g, None);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].branch_name, "Branch A");
        assert_eq!(records[1].allocated_value, Decimal::from_str("-5").unwrap());

        for r in &records {
            assert!((1..=12).contains(&r.month));
            assert!(!r.branch_name.is_empty());
            assert!(!r.gross_value.is_zero() || !r.allocated_value.is_zero());
        }
    }

    #[test]
    fn test_year_filter() {
        let g = grid(&[
            "05/06/2025,6,ACME,CC1,10,1,001,Branch A",
            "05/06/2024,6,ACME,CC1,10,1,001,Branch A",
            ",6,ACME,CC1,10,1,001,Branch A",
        ]);
        assert_eq!(normalize_rows(&g, None).len(), 3);

        let only_2025 = normalize_rows(&g, Some(2025));
        assert_eq!(only_2025.len(), 1);
        assert_eq!(only_2025[0].year, Some(2025));
    }
}
