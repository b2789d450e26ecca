//! Drilldown command - one cost center's monthly spend split by branch

use anyhow::Result;
use colored::Colorize;
use comfy_table::{Cell, CellAlignment};
use rateio_core::services::{cost_center_branch_breakdown, cost_center_options};

use super::{load_snapshot, SourceArgs};
use crate::output::{
    amount_cell, create_table, format_money, format_percent, info, month_label, print_json_with_context, warning,
};

pub fn run(source: &SourceArgs, month: Option<u32>, cost_center: Option<&str>, json: bool) -> Result<()> {
    let loaded = load_snapshot("drilldown", source)?;
    let records = &loaded.snapshot.records;

    let (Some(month), Some(cost_center)) = (month, cost_center) else {
        let options = cost_center_options(records);
        if json {
            return print_json_with_context(&options, loaded.json_context());
        }
        println!("{}", "Drilldown options".bold());
        loaded.print_note();
        println!(
            "Months: {}",
            options.months.iter().map(|m| month_label(*m)).collect::<Vec<_>>().join(", ")
        );
        println!("Cost centers:");
        for name in &options.cost_centers {
            println!("  • {}", name);
        }
        println!();
        info("Pass --month and --cost-center to drill into one of them.");
        return Ok(());
    };

    let breakdown = cost_center_branch_breakdown(records, month, cost_center);
    if json {
        return print_json_with_context(&breakdown, loaded.json_context());
    }

    println!("{}", format!("{} - {}", breakdown.cost_center, month_label(month)).bold());
    loaded.print_note();
    if breakdown.branches.is_empty() {
        warning("No allocations for this cost center in this month.");
        return Ok(());
    }

    let mut table = create_table();
    table.set_header(vec!["#", "Branch", "Allocated", "Share"]);
    for (rank, slice) in breakdown.branches.iter().enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&slice.branch_name),
            amount_cell(slice.value),
            Cell::new(format_percent(slice.share)).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{}", table);

    println!("Total: {}", format_money(breakdown.total));
    println!("Average per branch: {}", format_money(breakdown.average));
    if let Some(leader) = &breakdown.leader {
        println!("Leader: {} ({})", leader.branch_name, format_percent(leader.share));
    }

    Ok(())
}
