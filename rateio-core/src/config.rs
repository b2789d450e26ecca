//! Configuration management
//!
//! Settings live in `settings.json` inside the rateio directory:
//! ```json
//! {
//!   "sheet": {
//!     "endpoint": "https://script.google.com/macros/s/.../exec",
//!     "sheetName": "Página1",
//!     "range": "A1:Z100000",
//!     "yearFilter": 2025
//!   }
//! }
//! ```
//! Fields this crate does not manage are preserved on save.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::{SheetConfig, DEFAULT_CELL_RANGE, DEFAULT_SHEET_NAME};

pub const SETTINGS_FILE: &str = "settings.json";
pub const ENV_DIR: &str = "RATEIO_DIR";
pub const ENV_ENDPOINT: &str = "RATEIO_ENDPOINT";
pub const ENV_YEAR_FILTER: &str = "RATEIO_YEAR_FILTER";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    sheet: SheetSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sheet_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    year_filter: Option<i32>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Rateio configuration (resolved view of settings + environment)
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Spreadsheet endpoint serving CSV; `None` until configured
    pub endpoint: Option<String>,
    pub sheet_name: String,
    pub cell_range: String,
    pub year_filter: Option<i32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: None,
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            cell_range: DEFAULT_CELL_RANGE.to_string(),
            year_filter: None,
        }
    }
}

/// Parse a year filter value: `none`/empty clears it, otherwise a year
pub fn parse_year_filter(value: &str) -> Result<Option<i32>> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") || value.eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    let year: i32 = value
        .parse()
        .with_context(|| format!("Invalid year filter '{}': expected a year or 'none'", value))?;
    Ok(Some(year))
}

fn read_settings(settings_path: &Path) -> Result<SettingsFile> {
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(settings_path)
        .with_context(|| format!("Failed to read {}", settings_path.display()))?;
    Ok(serde_json::from_str(&content).unwrap_or_else(|e| {
        tracing::warn!(path = %settings_path.display(), error = %e, "settings.json unreadable, using defaults");
        SettingsFile::default()
    }))
}

impl Config {
    /// Load config from the rateio directory, then apply environment
    /// overrides (`RATEIO_ENDPOINT`, `RATEIO_YEAR_FILTER`)
    pub fn load(rateio_dir: &Path) -> Result<Self> {
        let mut config = Self::load_file(rateio_dir)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load settings.json only, ignoring the environment
    pub fn load_file(rateio_dir: &Path) -> Result<Self> {
        let raw = read_settings(&rateio_dir.join(SETTINGS_FILE))?;
        let defaults = Self::default();
        Ok(Self {
            endpoint: raw.sheet.endpoint.filter(|e| !e.trim().is_empty()),
            sheet_name: raw.sheet.sheet_name.unwrap_or(defaults.sheet_name),
            cell_range: raw.sheet.range.unwrap_or(defaults.cell_range),
            year_filter: raw.sheet.year_filter,
        })
    }

    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(endpoint) = var(ENV_ENDPOINT).filter(|e| !e.trim().is_empty()) {
            self.endpoint = Some(endpoint);
        }
        if let Some(year) = var(ENV_YEAR_FILTER) {
            self.year_filter = parse_year_filter(&year)
                .with_context(|| format!("{} is invalid", ENV_YEAR_FILTER))?;
        }
        Ok(())
    }

    /// Save config to the rateio directory, keeping unmanaged fields
    pub fn save(&self, rateio_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(rateio_dir)
            .with_context(|| format!("Failed to create {}", rateio_dir.display()))?;
        let settings_path = rateio_dir.join(SETTINGS_FILE);

        let mut settings = read_settings(&settings_path)?;
        settings.sheet.endpoint = self.endpoint.clone();
        settings.sheet.sheet_name = Some(self.sheet_name.clone());
        settings.sheet.range = Some(self.cell_range.clone());
        settings.sheet.year_filter = self.year_filter;

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)
            .with_context(|| format!("Failed to write {}", settings_path.display()))?;
        Ok(())
    }

    /// Sheet selection for ingestion
    pub fn sheet_config(&self) -> SheetConfig {
        SheetConfig {
            sheet_name: self.sheet_name.clone(),
            cell_range: self.cell_range.clone(),
            year_filter: self.year_filter,
        }
    }

    /// Set a value by its settings key (`endpoint`, `sheetName`, `range`, `yearFilter`)
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "endpoint" => {
                let value = value.trim();
                self.endpoint = if value.is_empty() || value.eq_ignore_ascii_case("none") {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            "sheetName" | "sheet" => self.sheet_name = value.to_string(),
            "range" => self.cell_range = value.to_string(),
            "yearFilter" | "year" => self.year_filter = parse_year_filter(value)?,
            other => anyhow::bail!(
                "Unknown setting '{}'. Expected one of: endpoint, sheetName, range, yearFilter",
                other
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempdir().unwrap();
        let config = Config::load_file(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.sheet_config(), SheetConfig::default());
    }

    #[test]
    fn test_load_settings() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"sheet": {"endpoint": "https://example.com/exec", "sheetName": "Rateio", "yearFilter": 2025}}"#,
        )
        .unwrap();

        let config = Config::load_file(dir.path()).unwrap();
        assert_eq!(config.endpoint.as_deref(), Some("https://example.com/exec"));
        assert_eq!(config.sheet_name, "Rateio");
        assert_eq!(config.cell_range, "A1:Z100000");
        assert_eq!(config.year_filter, Some(2025));
    }

    #[test]
    fn test_invalid_json_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "{not json").unwrap();
        assert_eq!(Config::load_file(dir.path()).unwrap(), Config::default());
    }

    #[test]
    fn test_save_preserves_unknown_fields() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"theme": "dark", "sheet": {"notes": "keep me"}}"#,
        )
        .unwrap();

        let mut config = Config::load_file(dir.path()).unwrap();
        config.set("yearFilter", "2024").unwrap();
        config.save(dir.path()).unwrap();

        let content = std::fs::read_to_string(dir.path().join(SETTINGS_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["theme"], "dark");
        assert_eq!(value["sheet"]["notes"], "keep me");
        assert_eq!(value["sheet"]["yearFilter"], 2024);

        assert_eq!(Config::load_file(dir.path()).unwrap().year_filter, Some(2024));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env_overrides(|key| match key {
                ENV_ENDPOINT => Some("https://override.example.com".to_string()),
                ENV_YEAR_FILTER => Some("2023".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.endpoint.as_deref(), Some("https://override.example.com"));
        assert_eq!(config.year_filter, Some(2023));

        config
            .apply_env_overrides(|key| (key == ENV_YEAR_FILTER).then(|| "none".to_string()))
            .unwrap();
        assert_eq!(config.year_filter, None);

        assert!(config
            .apply_env_overrides(|key| (key == ENV_YEAR_FILTER).then(|| "soon".to_string()))
            .is_err());
    }

    #[test]
    fn test_set() {
        let mut config = Config::default();
        config.set("endpoint", "https://example.com").unwrap();
        config.set("sheetName", "Junho").unwrap();
        config.set("range", "A1:H500").unwrap();
        assert_eq!(config.sheet_config().sheet_name, "Junho");
        assert_eq!(config.sheet_config().cell_range, "A1:H500");

        config.set("endpoint", "none").unwrap();
        assert!(config.endpoint.is_none());
        assert!(config.set("colour", "blue").is_err());
        assert!(config.set("yearFilter", "twenty").is_err());
    }

    #[test]
    fn test_parse_year_filter() {
        assert_eq!(parse_year_filter("2025").unwrap(), Some(2025));
        assert_eq!(parse_year_filter(" none ").unwrap(), None);
        assert_eq!(parse_year_filter("").unwrap(), None);
    }
}
