//! Summary command - totals written in the sheet's summary blocks

use anyhow::Result;
use colored::Colorize;
use comfy_table::Cell;

use super::{load_snapshot, SourceArgs};
use crate::output::{amount_cell, create_table, info, month_label, print_json_with_context};

pub fn run(source: &SourceArgs, json: bool) -> Result<()> {
    let loaded = load_snapshot("summary", source)?;
    let summary = &loaded.snapshot.summary;

    if json {
        return print_json_with_context(summary, loaded.json_context());
    }

    println!("{}", "Sheet Summary Blocks".bold());
    loaded.print_note();
    if summary.is_empty() {
        info("No summary blocks found in the sheet.");
        return Ok(());
    }

    let months = summary.months();
    let totals: Vec<u32> = months
        .iter()
        .copied()
        .filter(|m| {
            summary.totals_by_month_gross.contains_key(m) || summary.totals_by_month_allocated.contains_key(m)
        })
        .collect();

    if !totals.is_empty() {
        let mut table = create_table();
        table.set_header(vec!["Month", "Total", "Allocated"]);
        for month in &totals {
            table.add_row(vec![
                Cell::new(month_label(*month)),
                summary
                    .totals_by_month_gross
                    .get(month)
                    .map(|v| amount_cell(*v))
                    .unwrap_or_else(|| Cell::new("-")),
                summary
                    .totals_by_month_allocated
                    .get(month)
                    .map(|v| amount_cell(*v))
                    .unwrap_or_else(|| Cell::new("-")),
            ]);
        }
        println!("{}", table);
    }

    for (month, entries) in &summary.spend_by_branch_by_month {
        println!();
        println!("{}", format!("Spend by Branch - {}", month_label(*month)).bold());
        let mut table = create_table();
        table.set_header(vec!["Branch", "Value"]);
        for entry in entries {
            table.add_row(vec![Cell::new(&entry.branch_name), amount_cell(entry.value)]);
        }
        println!("{}", table);
    }

    Ok(())
}
