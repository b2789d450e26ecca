//! Cross-check sheet-reported totals against recomputed aggregates

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{AggregateView, FooterTotals, SummaryBlockSet};
use crate::parse::sub_money;

/// Differences up to one cent are considered equal
pub const TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// What a check compares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    FooterGross,
    FooterAllocated,
    MonthGross,
    MonthAllocated,
    MonthBranch,
}

/// One sheet value versus its recomputed counterpart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationCheck {
    pub kind: CheckKind,
    pub label: String,
    pub month: Option<u32>,
    pub sheet_value: Decimal,
    pub computed_value: Decimal,
    /// `sheet_value - computed_value`, clamped to the decimal range
    pub difference: Decimal,
    pub matches: bool,
}

impl ReconciliationCheck {
    fn new(kind: CheckKind, label: String, month: Option<u32>, sheet_value: Decimal, computed_value: Decimal) -> Self {
        let difference = sub_money(sheet_value, computed_value);
        Self {
            kind,
            label,
            month,
            sheet_value,
            computed_value,
            difference,
            matches: difference.abs() <= TOLERANCE,
        }
    }
}

/// Result of comparing the sheet against the recomputed view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationReport {
    /// False when there was no footer row and footer totals were summed
    pub footer_from_sheet: bool,
    pub checks: Vec<ReconciliationCheck>,
}

impl ReconciliationReport {
    pub fn mismatches(&self) -> impl Iterator<Item = &ReconciliationCheck> {
        self.checks.iter().filter(|c| !c.matches)
    }

    pub fn is_consistent(&self) -> bool {
        self.checks.iter().all(|c| c.matches)
    }
}

/// Compare footer and summary blocks with the aggregate view
///
/// The view is built from retained (and possibly year-filtered) records,
/// so gaps are expected when the sheet contains rows the dashboard drops.
pub fn reconcile(footer: &FooterTotals, summary: &SummaryBlockSet, view: &AggregateView) -> ReconciliationReport {
    let mut checks = vec![
        ReconciliationCheck::new(
            CheckKind::FooterGross,
            "Footer gross total".to_string(),
            None,
            footer.gross_total,
            view.total_gross,
        ),
        ReconciliationCheck::new(
            CheckKind::FooterAllocated,
            "Footer allocated total".to_string(),
            None,
            footer.allocated_total,
            view.total_allocated,
        ),
    ];

    for (&month, &value) in &summary.totals_by_month_gross {
        let computed = view.gross_by_month.get(&month).copied().unwrap_or_default();
        checks.push(ReconciliationCheck::new(
            CheckKind::MonthGross,
            format!("Gross total of month {}", month),
            Some(month),
            value,
            computed,
        ));
    }

    for (&month, &value) in &summary.totals_by_month_allocated {
        let computed = view.allocated_by_month.get(&month).copied().unwrap_or_default();
        checks.push(ReconciliationCheck::new(
            CheckKind::MonthAllocated,
            format!("Allocated total of month {}", month),
            Some(month),
            value,
            computed,
        ));
    }

    for (&month, entries) in &summary.spend_by_branch_by_month {
        let computed_month = view.branches_in_month(month);
        for entry in entries {
            let computed = computed_month
                .iter()
                .find(|c| c.branch_name.eq_ignore_ascii_case(&entry.branch_name))
                .map(|c| c.value)
                .unwrap_or_default();
            checks.push(ReconciliationCheck::new(
                CheckKind::MonthBranch,
                format!("{} in month {}", entry.branch_name, month),
                Some(month),
                entry.value,
                computed,
            ));
        }
    }

    let report = ReconciliationReport {
        footer_from_sheet: footer.is_from_footer(),
        checks,
    };
    tracing::debug!(
        checks = report.checks.len(),
        mismatches = report.mismatches().count(),
        "reconciliation finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BranchSpend, FooterSource, TransactionRecord};
    use crate::services::aggregate::aggregate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn record(month: u32, gross: &str, allocated: &str, branch: &str) -> TransactionRecord {
        TransactionRecord {
            date_raw: String::new(),
            month,
            counterparty: String::new(),
            cost_center: "CC".to_string(),
            gross_value: dec(gross),
            allocated_value: dec(allocated),
            branch_code: String::new(),
            branch_name: branch.to_string(),
            year: None,
        }
    }

    #[test]
    fn test_tolerance_is_one_cent() {
        assert_eq!(TOLERANCE, dec("0.01"));
    }

    #[test]
    fn test_consistent_sheet() {
        let view = aggregate(&[record(6, "100", "40", "Crato"), record(7, "50", "10", "Crato")]);
        let footer = FooterTotals {
            gross_total: dec("150"),
            allocated_total: dec("50.005"),
            row_count: 3,
            source: FooterSource::Footer { row: 2 },
        };
        let mut summary = SummaryBlockSet::default();
        summary.totals_by_month_gross.insert(6, dec("100"));
        summary.totals_by_month_allocated.insert(7, dec("10"));
        summary.spend_by_branch_by_month.insert(
            6,
            vec![BranchSpend { branch_name: "CRATO".to_string(), value: dec("40") }],
        );

        let report = reconcile(&footer, &summary, &view);
        assert!(report.footer_from_sheet);
        assert_eq!(report.checks.len(), 5);
        assert!(report.is_consistent());
    }

    #[test]
    fn test_mismatches_are_reported() {
        let view = aggregate(&[record(6, "100", "40", "Crato")]);
        let footer = FooterTotals {
            gross_total: dec("120"),
            allocated_total: dec("40"),
            row_count: 2,
            source: FooterSource::Computed,
        };
        let mut summary = SummaryBlockSet::default();
        summary.totals_by_month_gross.insert(8, dec("5"));

        let report = reconcile(&footer, &summary, &view);
        assert!(!report.footer_from_sheet);
        let mismatches: Vec<_> = report.mismatches().collect();
        assert_eq!(mismatches.len(), 2);
        assert_eq!(mismatches[0].kind, CheckKind::FooterGross);
        assert_eq!(mismatches[0].difference, dec("20"));
        assert_eq!(mismatches[1].kind, CheckKind::MonthGross);
        assert_eq!(mismatches[1].computed_value, Decimal::ZERO);
    }

    #[test]
    fn test_difference_clamps_at_range() {
        let huge = dec("50000000000000000000000000000");
        let view = aggregate(&[record(6, "-50000000000000000000000000000", "0", "Crato")]);
        let footer = FooterTotals {
            gross_total: huge,
            allocated_total: Decimal::ZERO,
            row_count: 2,
            source: FooterSource::Footer { row: 1 },
        };

        let report = reconcile(&footer, &SummaryBlockSet::default(), &view);
        assert_eq!(report.checks[0].kind, CheckKind::FooterGross);
        assert_eq!(report.checks[0].difference, Decimal::MAX);
        assert!(!report.checks[0].matches);
        assert!(report.checks[1].matches);
    }
}
