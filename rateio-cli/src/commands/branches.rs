//! Branches command - allocated spend per branch

use anyhow::Result;
use colored::Colorize;
use comfy_table::{Cell, CellAlignment};

use super::{load_snapshot, SourceArgs};
use crate::output::{amount_cell, create_table, format_percent, info, month_label, print_json_with_context};

pub fn run(source: &SourceArgs, month: Option<u32>, json: bool) -> Result<()> {
    let loaded = load_snapshot("branches", source)?;
    let view = &loaded.snapshot.view;

    if let Some(month) = month {
        let entries = view.branches_in_month(month);
        if json {
            return print_json_with_context(entries, loaded.json_context());
        }

        println!("{}", format!("Allocated by Branch - {}", month_label(month)).bold());
        loaded.print_note();
        if entries.is_empty() {
            info("No allocations in this month.");
            return Ok(());
        }

        let mut table = create_table();
        table.set_header(vec!["#", "Branch", "Allocated"]);
        for (rank, entry) in entries.iter().enumerate() {
            table.add_row(vec![
                Cell::new(rank + 1),
                Cell::new(&entry.branch_name),
                amount_cell(entry.value),
            ]);
        }
        println!("{}", table);
        return Ok(());
    }

    if json {
        return print_json_with_context(&view.branch_shares, loaded.json_context());
    }

    println!("{}", "Allocated by Branch".bold());
    loaded.print_note();
    if view.branch_shares.is_empty() {
        info("No branches found.");
        return Ok(());
    }

    let mut table = create_table();
    table.set_header(vec!["#", "Branch", "Allocated", "% of gross"]);
    for (rank, share) in view.branch_shares.iter().enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&share.branch_name),
            amount_cell(share.value),
            Cell::new(format_percent(share.percentage)).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{}", table);

    Ok(())
}
