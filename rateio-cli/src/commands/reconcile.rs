//! Reconcile command - compare sheet totals with recomputed ones

use anyhow::Result;
use colored::Colorize;
use comfy_table::Cell;
use rateio_core::services::reconcile;

use super::{load_snapshot, SourceArgs};
use crate::output::{amount_cell, create_table, print_json_with_context, success, warning};

pub fn run(source: &SourceArgs, json: bool) -> Result<()> {
    let loaded = load_snapshot("reconcile", source)?;
    let snapshot = &loaded.snapshot;
    let report = reconcile(&snapshot.footer, &snapshot.summary, &snapshot.view);

    if json {
        return print_json_with_context(&report, loaded.json_context());
    }

    println!("{}", "Reconciliation".bold());
    loaded.print_note();
    if !report.footer_from_sheet {
        warning("No footer row found; footer totals were summed from the rows.");
    }

    let mut table = create_table();
    table.set_header(vec!["Check", "Sheet", "Computed", "Difference", ""]);
    for check in &report.checks {
        let status = if check.matches { "✓".green() } else { "✗".red() };
        table.add_row(vec![
            Cell::new(&check.label),
            amount_cell(check.sheet_value),
            amount_cell(check.computed_value),
            amount_cell(check.difference),
            Cell::new(status.to_string()),
        ]);
    }
    println!("{}", table);

    let mismatches = report.mismatches().count();
    if mismatches == 0 {
        success("Sheet totals match the recomputed values.");
    } else {
        warning(&format!(
            "{} of {} checks differ. Rows dropped by validation or the year filter can explain gaps.",
            mismatches,
            report.checks.len()
        ));
    }

    Ok(())
}
