//! Aggregate view derived from the retained records

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A named total inside a ranking (branch or cost center)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTotal {
    pub name: String,
    pub value: Decimal,
}

/// Allocated total of one branch within one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthBranchTotal {
    pub month: u32,
    pub branch_name: String,
    pub value: Decimal,
}

/// Allocated total of a branch with its share of the grand gross total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchShare {
    pub branch_name: String,
    pub value: Decimal,
    /// Percentage of the grand gross total (0 when that total is 0)
    pub percentage: f64,
}

/// Everything the dashboard widgets read
///
/// Rankings are sorted by value, descending. Equal values keep the order in
/// which their key first appeared in the records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateView {
    /// Months present, ascending
    pub months: Vec<u32>,
    /// Branch names present, sorted
    pub branches: Vec<String>,
    pub total_gross: Decimal,
    pub total_allocated: Decimal,
    pub gross_by_month: BTreeMap<u32, Decimal>,
    pub allocated_by_month: BTreeMap<u32, Decimal>,
    pub allocated_by_branch: Vec<RankedTotal>,
    pub allocated_by_cost_center: Vec<RankedTotal>,
    pub allocated_by_month_branch: BTreeMap<u32, Vec<MonthBranchTotal>>,
    pub branch_shares: Vec<BranchShare>,
}

impl AggregateView {
    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// Ranked branch totals for a single month (empty when the month is absent)
    pub fn branches_in_month(&self, month: u32) -> &[MonthBranchTotal] {
        self.allocated_by_month_branch
            .get(&month)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
