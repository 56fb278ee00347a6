//! Configuration management
//!
//! Settings live in `settings.json` inside the data directory:
//! ```json
//! {
//!   "app": { "demoMode": false },
//!   "metrics": { "activityFactor": 1.55, "calorieDeficit": 500 }
//! }
//! ```
//! Keys this crate does not manage are preserved on save.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::services::metrics::CalorieParams;

const SETTINGS_FILE: &str = "settings.json";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(default)]
    metrics: MetricsSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default)]
    demo_mode: bool,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetricsSettings {
    #[serde(default = "default_activity_factor")]
    activity_factor: f64,
    #[serde(default = "default_calorie_deficit")]
    calorie_deficit: f64,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            activity_factor: default_activity_factor(),
            calorie_deficit: default_calorie_deficit(),
            other: HashMap::new(),
        }
    }
}

fn default_activity_factor() -> f64 {
    CalorieParams::default().activity_factor
}

fn default_calorie_deficit() -> f64 {
    CalorieParams::default().deficit
}

/// Effective configuration for one invocation
#[derive(Debug, Clone)]
pub struct Config {
    pub demo_mode: bool,
    pub calories: CalorieParams,
    raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            demo_mode: false,
            calories: CalorieParams::default(),
            raw_settings: SettingsFile::default(),
        }
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// Demo mode comes from the settings file (`tt demo on`) unless the
    /// `TRIMTRACK_DEMO_MODE` environment variable overrides it. An
    /// unreadable settings file falls back to defaults.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let raw = read_settings(data_dir)?;

        let demo_mode = match std::env::var("TRIMTRACK_DEMO_MODE").ok().as_deref() {
            Some("true" | "1" | "yes" | "TRUE" | "YES") => true,
            Some("false" | "0" | "no" | "FALSE" | "NO") => false,
            _ => raw.app.demo_mode,
        };

        let mut calories = CalorieParams {
            activity_factor: raw.metrics.activity_factor,
            deficit: raw.metrics.calorie_deficit,
        };
        if !(calories.activity_factor.is_finite() && calories.activity_factor > 0.0) {
            tracing::warn!(
                value = calories.activity_factor,
                "ignoring invalid metrics.activityFactor"
            );
            calories.activity_factor = default_activity_factor();
        }
        if !calories.deficit.is_finite() {
            calories.deficit = default_calorie_deficit();
        }

        Ok(Self {
            demo_mode,
            calories,
            raw_settings: raw,
        })
    }

    /// Save managed fields, keeping everything else in the file
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let mut settings = read_settings(data_dir)?;
        settings.app.demo_mode = self.demo_mode;
        settings.metrics.activity_factor = self.calories.activity_factor;
        settings.metrics.calorie_deficit = self.calories.deficit;

        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("creating {}", data_dir.display()))?;
        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(data_dir.join(SETTINGS_FILE), content)
            .with_context(|| format!("writing {SETTINGS_FILE}"))?;
        Ok(())
    }

    /// Database file for the current mode
    pub fn db_filename(&self) -> &'static str {
        if self.demo_mode {
            "demo.duckdb"
        } else {
            "trimtrack.duckdb"
        }
    }

    pub fn enable_demo_mode(&mut self) {
        self.demo_mode = true;
    }

    pub fn disable_demo_mode(&mut self) {
        self.demo_mode = false;
    }

    /// Value of an unmanaged top-level settings key
    pub fn extra(&self, key: &str) -> Option<&serde_json::Value> {
        self.raw_settings.other.get(key)
    }
}

fn read_settings(data_dir: &Path) -> Result<SettingsFile> {
    let path = data_dir.join(SETTINGS_FILE);
    if !path.exists() {
        return Ok(SettingsFile::default());
    }
    let content =
        std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    Ok(serde_json::from_str(&content).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "settings.json is not valid, using defaults");
        SettingsFile::default()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.calories, CalorieParams::default());
        assert_eq!(config.db_filename(), "trimtrack.duckdb");
    }

    #[test]
    fn test_save_preserves_unknown_keys() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"app": {"demoMode": false, "theme": "dark"},
                "metrics": {"activityFactor": 1.375},
                "lastExport": "2025-01-01"}"#,
        )
        .unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        assert_eq!(config.calories.activity_factor, 1.375);
        assert_eq!(config.calories.deficit, 500.0);
        assert!(config.extra("lastExport").is_some());

        config.enable_demo_mode();
        config.save(dir.path()).unwrap();

        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join(SETTINGS_FILE)).unwrap())
                .unwrap();
        assert_eq!(saved["app"]["demoMode"], true);
        assert_eq!(saved["app"]["theme"], "dark");
        assert_eq!(saved["lastExport"], "2025-01-01");
    }

    #[test]
    fn test_invalid_activity_factor_falls_back() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"metrics": {"activityFactor": 0}}"#,
        )
        .unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.calories.activity_factor, 1.55);
    }
}
