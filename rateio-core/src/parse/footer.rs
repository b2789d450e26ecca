//! Footer row detection and sheet-of-record totals

use rust_decimal::Decimal;

use super::grid::{Grid, GridRow};
use super::money::{add_money, is_money_like, parse_money};
use super::rows::Column;
use crate::domain::{FooterSource, FooterTotals};

/// Descriptive columns that must be empty on a footer row
const DESCRIPTIVE_COLUMNS: [Column; 6] = [
    Column::Date,
    Column::Month,
    Column::Counterparty,
    Column::CostCenter,
    Column::BranchCode,
    Column::BranchName,
];

/// First column after the fixed layout
const TAIL_START: usize = 8;

/// Whether a row carries only grand-total figures
///
/// Descriptive columns empty, gross and/or allocated money-shaped, nothing
/// after the branch name column.
pub fn is_footer_row(row: &GridRow<'_>) -> bool {
    let heads_empty = DESCRIPTIVE_COLUMNS.iter().all(|c| row.is_blank(c.index()));
    let has_money = is_money_like(row.cell(Column::Gross.index()))
        || is_money_like(row.cell(Column::Allocated.index()));
    let tail_empty = row.is_blank_from(TAIL_START);
    heads_empty && has_money && tail_empty
}

/// Find the footer row scanning from the bottom; only the last one counts
pub fn find_footer(grid: &Grid) -> Option<GridRow<'_>> {
    grid.rows().rev().find(is_footer_row)
}

/// Sheet totals from the footer row, or summed over every row without one
///
/// `grid` must already have its header removed. The fallback sum is
/// unfiltered: it adds columns 4 and 5 of every row, like the sheet's own SUM.
pub fn footer_totals(grid: &Grid) -> FooterTotals {
    let row_count = grid.len();

    if let Some(footer) = find_footer(grid) {
        tracing::debug!(row = footer.index(), "footer row detected");
        return FooterTotals {
            gross_total: parse_money(footer.cell(Column::Gross.index())),
            allocated_total: parse_money(footer.cell(Column::Allocated.index())),
            row_count,
            source: FooterSource::Footer { row: footer.index() },
        };
    }

    let (gross_total, allocated_total) = grid.rows().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(gross, allocated), row| {
            (
                add_money(gross, parse_money(row.cell(Column::Gross.index()))),
                add_money(allocated, parse_money(row.cell(Column::Allocated.index()))),
            )
        },
    );
    tracing::debug!(rows = row_count, "no footer row; totals computed from all rows");

    FooterTotals {
        gross_total,
        allocated_total,
        row_count,
        source: FooterSource::Computed,
    }
}
