//! Aggregation of retained records into the dashboard view

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::domain::{AggregateView, BranchShare, MonthBranchTotal, RankedTotal, TransactionRecord};
use crate::parse::add_money;

/// Running totals keyed by name, remembering first-seen order
///
/// Sums clamp at the decimal range instead of overflowing.
#[derive(Debug, Default)]
pub(crate) struct OrderedTotals {
    index: HashMap<String, usize>,
    entries: Vec<(String, Decimal)>,
}

impl OrderedTotals {
    pub(crate) fn add(&mut self, key: &str, value: Decimal) {
        match self.index.get(key) {
            Some(&i) => {
                let total = &mut self.entries[i].1;
                *total = add_money(*total, value);
            }
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), value));
            }
        }
    }

    /// Entries sorted by value, descending; ties keep first-seen order
    pub(crate) fn ranked(self) -> Vec<(String, Decimal)> {
        let mut entries = self.entries;
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }
}

/// Percentage of `value` in `total`, 0 when the total is 0
pub(crate) fn percentage(value: Decimal, total: Decimal) -> f64 {
    if total.is_zero() {
        return 0.0;
    }
    value
        .checked_div(total)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .and_then(|pct| pct.to_f64())
        .unwrap_or(0.0)
}

/// Fold retained records into the aggregate view
///
/// Pure: the same records always give the same view.
pub fn aggregate(records: &[TransactionRecord]) -> AggregateView {
    if records.is_empty() {
        return AggregateView::default();
    }

    let mut months = BTreeSet::new();
    let mut branches = BTreeSet::new();
    let mut total_gross = Decimal::ZERO;
    let mut total_allocated = Decimal::ZERO;
    let mut gross_by_month: BTreeMap<u32, Decimal> = BTreeMap::new();
    let mut allocated_by_month: BTreeMap<u32, Decimal> = BTreeMap::new();
    let mut by_branch = OrderedTotals::default();
    let mut by_cost_center = OrderedTotals::default();
    let mut by_month_branch: BTreeMap<u32, OrderedTotals> = BTreeMap::new();

    for record in records {
        if (1..=12).contains(&record.month) {
            months.insert(record.month);
            let gross = gross_by_month.entry(record.month).or_default();
            *gross = add_money(*gross, record.gross_value);
            let allocated = allocated_by_month.entry(record.month).or_default();
            *allocated = add_money(*allocated, record.allocated_value);
            by_month_branch
                .entry(record.month)
                .or_default()
                .add(&record.branch_name, record.allocated_value);
        }

        if !record.branch_name.is_empty() {
            branches.insert(record.branch_name.clone());
            by_branch.add(&record.branch_name, record.allocated_value);
        }
        if !record.cost_center.is_empty() {
            by_cost_center.add(&record.cost_center, record.allocated_value);
        }

        total_gross = add_money(total_gross, record.gross_value);
        total_allocated = add_money(total_allocated, record.allocated_value);
    }

    let allocated_by_branch: Vec<RankedTotal> = by_branch
        .ranked()
        .into_iter()
        .map(|(name, value)| RankedTotal { name, value })
        .collect();

    let allocated_by_cost_center = by_cost_center
        .ranked()
        .into_iter()
        .map(|(name, value)| RankedTotal { name, value })
        .collect();

    let allocated_by_month_branch = by_month_branch
        .into_iter()
        .map(|(month, totals)| {
            let ranked = totals
                .ranked()
                .into_iter()
                .map(|(branch_name, value)| MonthBranchTotal { month, branch_name, value })
                .collect();
            (month, ranked)
        })
        .collect();

    let branch_shares = allocated_by_branch
        .iter()
        .map(|entry| BranchShare {
            branch_name: entry.name.clone(),
            value: entry.value,
            percentage: percentage(entry.value, total_gross),
        })
        .collect();

    AggregateView {
        months: months.into_iter().collect(),
        branches: branches.into_iter().collect(),
        total_gross,
        total_allocated,
        gross_by_month,
        allocated_by_month,
        allocated_by_branch,
        allocated_by_cost_center,
        allocated_by_month_branch,
        branch_shares,
    }
}
