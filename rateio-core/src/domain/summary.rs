//! Summary blocks hand-authored at the bottom of the sheet

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One line of a "Gasto por filial mês N" block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchSpend {
    pub branch_name: String,
    pub value: Decimal,
}

/// Values extracted from labelled summary blocks
///
/// Keys are the month numbers written in the labels. Months without a
/// recognised block are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryBlockSet {
    pub totals_by_month_gross: BTreeMap<u32, Decimal>,
    pub totals_by_month_allocated: BTreeMap<u32, Decimal>,
    pub spend_by_branch_by_month: BTreeMap<u32, Vec<BranchSpend>>,
}

impl SummaryBlockSet {
    pub fn is_empty(&self) -> bool {
        self.totals_by_month_gross.is_empty()
            && self.totals_by_month_allocated.is_empty()
            && self.spend_by_branch_by_month.is_empty()
    }

    /// All months mentioned by any block, ascending
    pub fn months(&self) -> Vec<u32> {
        let mut months: Vec<u32> = self
            .totals_by_month_gross
            .keys()
            .chain(self.totals_by_month_allocated.keys())
            .chain(self.spend_by_branch_by_month.keys())
            .copied()
            .collect();
        months.sort_unstable();
        months.dedup();
        months
    }
}
