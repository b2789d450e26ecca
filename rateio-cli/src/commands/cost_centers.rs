//! Cost centers command - allocated spend per cost center

use anyhow::Result;
use colored::Colorize;
use comfy_table::Cell;
use rateio_core::services::cost_centers_by_month;
use rateio_core::RankedTotal;

use super::{load_snapshot, SourceArgs};
use crate::output::{amount_cell, create_table, info, month_label, print_json_with_context};

pub fn run(source: &SourceArgs, month: Option<u32>, top: Option<usize>, json: bool) -> Result<()> {
    let loaded = load_snapshot("cost-centers", source)?;
    let snapshot = &loaded.snapshot;

    let (title, entries): (String, Vec<RankedTotal>) = match month {
        Some(month) => {
            let mut by_month = cost_centers_by_month(&snapshot.records, top);
            (
                format!("Allocated by Cost Center - {}", month_label(month)),
                by_month.remove(&month).unwrap_or_default(),
            )
        }
        None => (
            "Allocated by Cost Center".to_string(),
            snapshot
                .view
                .allocated_by_cost_center
                .iter()
                .take(top.unwrap_or(usize::MAX))
                .cloned()
                .collect(),
        ),
    };

    if json {
        return print_json_with_context(&entries, loaded.json_context());
    }

    println!("{}", title.bold());
    loaded.print_note();
    if entries.is_empty() {
        info("No cost centers found.");
        return Ok(());
    }

    let mut table = create_table();
    table.set_header(vec!["#", "Cost center", "Allocated"]);
    for (rank, entry) in entries.iter().enumerate() {
        table.add_row(vec![Cell::new(rank + 1), Cell::new(&entry.name), amount_cell(entry.value)]);
    }
    println!("{}", table);

    Ok(())
}
