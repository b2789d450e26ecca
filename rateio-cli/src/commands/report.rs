//! Report command - overview of the loaded sheet

use anyhow::Result;
use colored::Colorize;
use comfy_table::Cell;
use rateio_core::FooterSource;

use super::{load_snapshot, SourceArgs};
use crate::output::{amount_cell, create_table, format_money, info, month_label, print_json_with_context};

pub fn run(source: &SourceArgs, json: bool) -> Result<()> {
    let loaded = load_snapshot("report", source)?;
    let snapshot = &loaded.snapshot;

    if json {
        return print_json_with_context(snapshot.as_ref(), loaded.json_context());
    }

    println!("{}", "Allocation Report".bold());
    loaded.print_note();
    println!();

    if snapshot.records.is_empty() {
        info("No records to show.");
        return Ok(());
    }

    let view = &snapshot.view;
    let footer = &snapshot.footer;
    let footer_origin = match footer.source {
        FooterSource::Footer { row } => format!("sheet footer (row {})", row + 2),
        FooterSource::Computed => "summed from rows (no footer found)".to_string(),
    };

    let mut table = create_table();
    table.add_row(vec!["Records".to_string(), snapshot.records.len().to_string()]);
    table.add_row(vec!["Sheet rows".to_string(), footer.row_count.to_string()]);
    table.add_row(vec![
        "Months".to_string(),
        view.months.iter().map(|m| month_label(*m)).collect::<Vec<_>>().join(", "),
    ]);
    table.add_row(vec!["Branches".to_string(), view.branches.len().to_string()]);
    table.add_row(vec!["Gross total".to_string(), format_money(view.total_gross)]);
    table.add_row(vec!["Allocated total".to_string(), format_money(view.total_allocated)]);
    table.add_row(vec!["Footer gross".to_string(), format_money(footer.gross_total)]);
    table.add_row(vec!["Footer allocated".to_string(), format_money(footer.allocated_total)]);
    table.add_row(vec!["Footer source".to_string(), footer_origin]);
    println!("{}", table);
    println!();

    println!("{}", "By Month".bold());
    let mut months = create_table();
    months.set_header(vec!["Month", "Gross", "Allocated"]);
    for month in &view.months {
        months.add_row(vec![
            Cell::new(month_label(*month)),
            amount_cell(view.gross_by_month.get(month).copied().unwrap_or_default()),
            amount_cell(view.allocated_by_month.get(month).copied().unwrap_or_default()),
        ]);
    }
    println!("{}", months);

    Ok(())
}
