//! Summary-block scanner
//!
//! Sheets end with hand-authored blocks such as "Valor Total do mês 6" next
//! to a number, or a "Gasto por filial mês 7" label above a small
//! name/value table. Blocks can sit in any column, so the scanner visits
//! every cell and matches it against an ordered list of label rules.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use super::grid::{Grid, GridRow};
use super::money::parse_money;
use crate::domain::{BranchSpend, SummaryBlockSet};

/// Rows searched below a branch-spend label for its "Nome Filial" header
const HEADER_LOOKAHEAD: usize = 3;

/// Where a label was found
#[derive(Debug, Clone, Copy)]
pub struct LabelHit<'a> {
    pub grid: &'a Grid,
    pub row: GridRow<'a>,
    pub col: usize,
    pub month: u32,
}

type Handler = fn(&LabelHit<'_>, &mut SummaryBlockSet);

/// A label pattern and what to do when a cell matches it
pub struct SummaryRule {
    pub name: &'static str,
    pattern: Regex,
    handler: Handler,
}

impl SummaryRule {
    fn new(name: &'static str, pattern: &str, handler: Handler) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("valid summary label regex"),
            handler,
        }
    }

    /// Month number captured from the label, if the cell matches
    fn match_month(&self, cell: &str) -> Option<u32> {
        self.pattern
            .captures(cell)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}

/// Label rules, tried in order; the first match handles the cell
static RULES: LazyLock<Vec<SummaryRule>> = LazyLock::new(|| {
    vec![
        SummaryRule::new(
            "month_gross_total",
            r"(?i)^valor\s*total\s*do\s*m[eê]s\s*(\d+)",
            record_gross_total,
        ),
        SummaryRule::new(
            "month_allocated_total",
            r"(?i)^valor\s*rateado\s*do\s*m[eê]s\s*(\d+)",
            record_allocated_total,
        ),
        SummaryRule::new(
            "branch_spend",
            r"(?i)^gasto\s*por\s*filial\s*m[eê]s\s*(\d+)",
            record_branch_spend,
        ),
    ]
});

/// Scan the whole (header-stripped) grid for summary blocks
pub fn scan_summary_blocks(grid: &Grid) -> SummaryBlockSet {
    let mut out = SummaryBlockSet::default();

    for row in grid.rows() {
        for (col, raw) in row.cells() {
            let cell = raw.trim();
            if cell.is_empty() {
                continue;
            }

            for rule in RULES.iter() {
                if let Some(month) = rule.match_month(cell) {
                    tracing::debug!(rule = rule.name, row = row.index(), col, month, "summary label found");
                    let hit = LabelHit { grid, row, col, month };
                    (rule.handler)(&hit, &mut out);
                    break;
                }
            }
        }
    }

    out
}

/// First non-blank cell strictly right of `col`, read as money
pub fn right_number(row: &GridRow<'_>, col: usize) -> Option<Decimal> {
    row.cells()
        .skip(col + 1)
        .find(|(_, raw)| !raw.trim().is_empty())
        .map(|(_, raw)| parse_money(raw))
}

fn record_gross_total(hit: &LabelHit<'_>, out: &mut SummaryBlockSet) {
    if let Some(value) = right_number(&hit.row, hit.col) {
        out.totals_by_month_gross.insert(hit.month, value);
    }
}

fn record_allocated_total(hit: &LabelHit<'_>, out: &mut SummaryBlockSet) {
    if let Some(value) = right_number(&hit.row, hit.col) {
        out.totals_by_month_allocated.insert(hit.month, value);
    }
}

fn record_branch_spend(hit: &LabelHit<'_>, out: &mut SummaryBlockSet) {
    let entries = read_branch_table(hit.grid, hit.row.index(), hit.col);
    if entries.is_empty() {
        tracing::debug!(month = hit.month, "branch spend block without entries, skipped");
        return;
    }
    out.spend_by_branch_by_month.insert(hit.month, entries);
}

/// Read the name/value table hanging below a branch-spend label
fn read_branch_table(grid: &Grid, label_row: usize, col: usize) -> Vec<BranchSpend> {
    let start = (1..=HEADER_LOOKAHEAD)
        .filter_map(|look| grid.row(label_row + look))
        .find(|row| row.cell(col).to_lowercase().contains("nome filial"))
        .map(|header| header.index() + 1)
        .unwrap_or(label_row + 1);

    let mut entries = Vec::new();
    for index in start..grid.len() {
        let Some(row) = grid.row(index) else { break };
        if row.is_blank_row() {
            break;
        }
        let name = row.trimmed(col);
        if name.is_empty() {
            break;
        }
        let Some(value) = right_number(&row, col) else { break };
        entries.push(BranchSpend {
            branch_name: name.to_string(),
            value,
        });
    }
    entries
}
