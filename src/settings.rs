use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{InsightsError, Result};

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace", "off"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log_level: String,
    pub currency_symbol: String,
    pub top_categories: usize,
    pub export_dir: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            currency_symbol: "$".to_string(),
            top_categories: 5,
            export_dir: default_export_dir().to_string_lossy().to_string(),
        }
    }
}

impl Settings {
    /// Update one field from its string form, validating the value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "log_level" => {
                let level = value.to_lowercase();
                if !LOG_LEVELS.contains(&level.as_str()) {
                    return Err(InsightsError::Settings(format!(
                        "log_level must be one of: {}",
                        LOG_LEVELS.join(", ")
                    )));
                }
                self.log_level = level;
            }
            "currency_symbol" => self.currency_symbol = value.to_string(),
            "top_categories" => {
                self.top_categories = value
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| {
                        InsightsError::Settings("top_categories must be a positive integer".to_string())
                    })?;
            }
            "export_dir" => self.export_dir = shellexpand_path(value),
            other => return Err(InsightsError::Settings(format!("Unknown setting: {other}"))),
        }
        Ok(())
    }

    pub fn export_dir(&self) -> PathBuf {
        PathBuf::from(&self.export_dir)
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("expense-insights")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_export_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("expense-insights")
}

pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

/// Missing or unreadable files fall back to defaults.
pub fn load_settings_from(path: &Path) -> Settings {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
        Err(_) => Settings::default(),
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(settings, &settings_path())
}

pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}
