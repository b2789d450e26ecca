//! Config command - show or change settings

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use rateio_core::adapters::HttpSheetSource;
use rateio_core::config::{Config, ENV_ENDPOINT, ENV_YEAR_FILTER, SETTINGS_FILE};

use super::{get_logger, get_rateio_dir, log_quietly};
use crate::output::{create_table, print_json, success};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set a value (endpoint, sheetName, range, yearFilter)
    Set {
        key: String,
        /// New value; `none` clears endpoint and yearFilter
        value: String,
    },
}

impl ConfigCommands {
    pub fn json(&self) -> bool {
        matches!(self, ConfigCommands::Show { json: true })
    }
}

pub fn run(command: Option<ConfigCommands>) -> Result<()> {
    let rateio_dir = get_rateio_dir();
    let logger = get_logger();

    match command.unwrap_or(ConfigCommands::Show { json: false }) {
        ConfigCommands::Show { json } => {
            log_quietly(&logger, |l| l.log_command("config show"));
            let config = Config::load(&rateio_dir)?;
            let settings_path = rateio_dir.join(SETTINGS_FILE);

            if json {
                return print_json(serde_json::json!({
                    "endpoint": config.endpoint,
                    "sheetName": config.sheet_name,
                    "range": config.cell_range,
                    "yearFilter": config.year_filter,
                    "settingsPath": settings_path.to_string_lossy(),
                }));
            }

            println!("{}", "Configuration".bold());
            let mut table = create_table();
            table.add_row(vec![
                "endpoint".to_string(),
                config.endpoint.clone().unwrap_or_else(|| "(not set)".to_string()),
            ]);
            table.add_row(vec!["sheetName".to_string(), config.sheet_name.clone()]);
            table.add_row(vec!["range".to_string(), config.cell_range.clone()]);
            table.add_row(vec![
                "yearFilter".to_string(),
                config
                    .year_filter
                    .map(|y| y.to_string())
                    .unwrap_or_else(|| "none".to_string()),
            ]);
            println!("{}", table);
            println!("{}", format!("Settings: {}", settings_path.display()).dimmed());

            for var in [ENV_ENDPOINT, ENV_YEAR_FILTER] {
                if std::env::var_os(var).is_some() {
                    println!("{}", format!("{} is set and overrides the file", var).dimmed());
                }
            }
        }
        ConfigCommands::Set { key, value } => {
            log_quietly(&logger, |l| l.log_command("config set"));
            let mut config = Config::load_file(&rateio_dir)?;
            config.set(&key, &value)?;

            if let Some(endpoint) = config.endpoint.as_deref().filter(|_| key == "endpoint") {
                HttpSheetSource::new(endpoint)?;
            }

            config.save(&rateio_dir)?;
            success(&format!("Set {} = {}", key, value));
        }
    }

    Ok(())
}
