//! Transaction record domain model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One allocation line read from the spreadsheet
///
/// Records are only built for rows that pass the retention rule, so
/// `month` is always within 1..=12, `branch_name` is never empty and at
/// least one of the two values is nonzero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Date cell exactly as it appeared in the sheet
    pub date_raw: String,
    pub month: u32,
    /// Client or supplier
    pub counterparty: String,
    pub cost_center: String,
    /// Full value of the transaction ("Valor Total")
    pub gross_value: Decimal,
    /// Portion apportioned to this branch ("Valor Rateado")
    pub allocated_value: Decimal,
    pub branch_code: String,
    pub branch_name: String,
    pub year: Option<i32>,
}

impl TransactionRecord {
    /// Whether a candidate record satisfies the retention rule
    pub fn is_retainable(month: Option<u32>, branch_name: &str, gross: Decimal, allocated: Decimal) -> bool {
        let month_ok = matches!(month, Some(1..=12));
        let branch_ok = !branch_name.trim().is_empty();
        let has_value = !gross.is_zero() || !allocated.is_zero();
        month_ok && branch_ok && has_value
    }

    /// Whether this record passes an optional year filter
    pub fn matches_year(&self, year_filter: Option<i32>) -> bool {
        match year_filter {
            Some(year) => self.year == Some(year),
            None => true,
        }
    }
}
