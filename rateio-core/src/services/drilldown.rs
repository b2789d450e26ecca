//! Cost-center drilldowns
//!
//! Compare how one cost center's allocated spend is split across branches
//! in a given month, and rank cost centers month by month.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::Serialize;

use super::aggregate::{percentage, OrderedTotals};
use crate::domain::{RankedTotal, TransactionRecord};
use crate::parse::add_money;

/// One branch's slice of a cost center in a month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchSlice {
    pub branch_name: String,
    pub value: Decimal,
    /// Share of the breakdown total, in percent
    pub share: f64,
}

/// Allocated spend of one cost center in one month, split by branch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostCenterBreakdown {
    pub month: u32,
    pub cost_center: String,
    pub branches: Vec<BranchSlice>,
    pub total: Decimal,
    /// Branch with the largest allocation
    pub leader: Option<BranchSlice>,
    /// Mean allocation per branch
    pub average: Decimal,
}

/// Months and cost centers that can be drilled into
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DrilldownOptions {
    pub months: Vec<u32>,
    pub cost_centers: Vec<String>,
}

/// Split one cost center's allocated spend in `month` by branch
pub fn cost_center_branch_breakdown(
    records: &[TransactionRecord],
    month: u32,
    cost_center: &str,
) -> CostCenterBreakdown {
    let mut totals = OrderedTotals::default();
    for record in records
        .iter()
        .filter(|r| r.month == month && r.cost_center == cost_center)
    {
        totals.add(&record.branch_name, record.allocated_value);
    }

    let ranked = totals.ranked();
    let total = ranked.iter().fold(Decimal::ZERO, |sum, (_, v)| add_money(sum, *v));
    let branches: Vec<BranchSlice> = ranked
        .into_iter()
        .map(|(branch_name, value)| BranchSlice {
            share: percentage(value, total),
            branch_name,
            value,
        })
        .collect();

    let average = if branches.is_empty() {
        Decimal::ZERO
    } else {
        total / Decimal::from(branches.len())
    };

    CostCenterBreakdown {
        month,
        cost_center: cost_center.to_string(),
        leader: branches.first().cloned(),
        branches,
        total,
        average,
    }
}

/// Allocated totals per cost center for every month, ranked descending
///
/// `top` keeps only the first N cost centers of each month.
pub fn cost_centers_by_month(
    records: &[TransactionRecord],
    top: Option<usize>,
) -> BTreeMap<u32, Vec<RankedTotal>> {
    let mut by_month: BTreeMap<u32, OrderedTotals> = BTreeMap::new();
    for record in records.iter().filter(|r| !r.cost_center.is_empty()) {
        by_month
            .entry(record.month)
            .or_default()
            .add(&record.cost_center, record.allocated_value);
    }

    by_month
        .into_iter()
        .map(|(month, totals)| {
            let ranked = totals
                .ranked()
                .into_iter()
                .take(top.unwrap_or(usize::MAX))
                .map(|(name, value)| RankedTotal { name, value })
                .collect();
            (month, ranked)
        })
        .collect()
}

/// Distinct months (ascending) and cost centers (sorted) present
pub fn cost_center_options(records: &[TransactionRecord]) -> DrilldownOptions {
    let months: BTreeSet<u32> = records.iter().map(|r| r.month).collect();
    let cost_centers: BTreeSet<&str> = records
        .iter()
        .map(|r| r.cost_center.as_str())
        .filter(|c| !c.is_empty())
        .collect();

    DrilldownOptions {
        months: months.into_iter().collect(),
        cost_centers: cost_centers.into_iter().map(str::to_string).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(month: u32, cost_center: &str, allocated: i64, branch: &str) -> TransactionRecord {
        TransactionRecord {
            date_raw: String::new(),
            month,
            counterparty: String::new(),
            cost_center: cost_center.to_string(),
            gross_value: Decimal::from(allocated * 2),
            allocated_value: Decimal::from(allocated),
            branch_code: String::new(),
            branch_name: branch.to_string(),
            year: None,
        }
    }

    fn sample() -> Vec<TransactionRecord> {
        vec![
            record(6, "Energia", 30, "Crato"),
            record(6, "Energia", 50, "Juazeiro"),
            record(6, "Energia", 20, "Crato"),
            record(6, "Aluguel", 10, "Crato"),
            record(7, "Energia", 99, "Barbalha"),
        ]
    }

    #[test]
    fn test_breakdown() {
        let b = cost_center_branch_breakdown(&sample(), 6, "Energia");
        assert_eq!(b.total, Decimal::from(100));
        assert_eq!(b.branches.len(), 2);
        // Crato 50 and Juazeiro 50 tie; Crato was seen first
        assert_eq!(b.branches[0].branch_name, "Crato");
        assert_eq!(b.branches[0].value, Decimal::from(50));
        assert!((b.branches[0].share - 50.0).abs() < 1e-9);
        assert_eq!(b.leader.as_ref().map(|l| l.branch_name.as_str()), Some("Crato"));
        assert_eq!(b.average, Decimal::from(50));
    }

    #[test]
    fn test_breakdown_without_matches() {
        let b = cost_center_branch_breakdown(&sample(), 8, "Energia");
        assert!(b.branches.is_empty());
        assert!(b.leader.is_none());
        assert_eq!(b.total, Decimal::ZERO);
        assert_eq!(b.average, Decimal::ZERO);
    }

    #[test]
    fn test_breakdown_with_huge_values() {
        let huge = Decimal::from_str_exact("50000000000000000000000000000").unwrap();
        let mut records = sample();
        for branch in ["Crato", "Juazeiro"] {
            records.push(TransactionRecord {
                allocated_value: huge,
                gross_value: huge,
                ..record(9, "Energia", 0, branch)
            });
        }
        let b = cost_center_branch_breakdown(&records, 9, "Energia");
        assert_eq!(b.total, Decimal::MAX);
        assert_eq!(b.branches.len(), 2);
        assert!(b.average > Decimal::ZERO);
    }

    #[test]
    fn test_cost_centers_by_month() {
        let all = cost_centers_by_month(&sample(), None);
        let june = &all[&6];
        assert_eq!(june[0].name, "Energia");
        assert_eq!(june[0].value, Decimal::from(100));
        assert_eq!(june[1].name, "Aluguel");

        let top1 = cost_centers_by_month(&sample(), Some(1));
        assert_eq!(top1[&6].len(), 1);
        assert_eq!(top1[&7].len(), 1);
    }

    #[test]
    fn test_cost_center_options() {
        let opts = cost_center_options(&sample());
        assert_eq!(opts.months, vec![6, 7]);
        assert_eq!(opts.cost_centers, vec!["Aluguel".to_string(), "Energia".to_string()]);
    }
}
