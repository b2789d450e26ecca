//! Output formatting utilities

use std::collections::BTreeMap;

use anyhow::Result;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, CellAlignment, ContentArrangement, Table};
use rateio_core::OperationResult;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use serde_json::Value;

const MONTHS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

pub fn success(msg: &str) {
    println!("{}", msg.green());
}

pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Print `data` as a JSON success envelope
pub fn print_json<T: Serialize>(data: T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&OperationResult::ok(data))?);
    Ok(())
}

/// Print `data` as a JSON success envelope describing where it came from
pub fn print_json_with_context<T: Serialize>(data: T, context: BTreeMap<String, Value>) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(&OperationResult::ok_with_context(data, context))?
    );
    Ok(())
}

/// JSON failure envelope for a command that was asked for `--json`
pub fn json_failure(message: &str) -> Result<String> {
    let result: OperationResult<()> = OperationResult::fail(message);
    Ok(serde_json::to_string_pretty(&result)?)
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Right-aligned cell for amounts
pub fn amount_cell(value: Decimal) -> Cell {
    Cell::new(format_money(value)).set_alignment(CellAlignment::Right)
}

/// Brazilian currency format: `R$ 1.234,56`, `-R$ 10,00`
pub fn format_money(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{}R$ {},{}", sign, grouped, frac_part)
}

/// Percentage with two decimals and a comma: `34,29%`
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value).replace('.', ",")
}

/// Short month label: `Jun (6)`
pub fn month_label(month: u32) -> String {
    match month.checked_sub(1).and_then(|i| MONTHS.get(i as usize)) {
        Some(name) => format!("{} ({})", name, month),
        None => month.to_string(),
    }
}
