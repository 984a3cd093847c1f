use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DashError, Result};
use crate::models::{TrendScope, YearRange};
use crate::stats::ReportOptions;

/// Environment variable that overrides the settings file location.
pub const CONFIG_ENV: &str = "AUTOSALES_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_file: String,
    #[serde(default = "default_year_start")]
    pub year_start: i32,
    #[serde(default = "default_year_end")]
    pub year_end: i32,
    #[serde(default = "default_year")]
    pub default_year: i32,
    #[serde(default)]
    pub yearly_trend: TrendScope,
}

fn default_year_start() -> i32 {
    1980
}

fn default_year_end() -> i32 {
    2023
}

fn default_year() -> i32 {
    2020
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: default_data_file().to_string_lossy().to_string(),
            year_start: default_year_start(),
            year_end: default_year_end(),
            default_year: default_year(),
            yearly_trend: TrendScope::default(),
        }
    }
}

impl Settings {
    pub fn year_range(&self) -> Result<YearRange> {
        YearRange::new(self.year_start, self.year_end)
    }

    pub fn report_options(&self) -> Result<ReportOptions> {
        Ok(ReportOptions {
            years: self.year_range()?,
            trend: self.yearly_trend,
        })
    }

    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(shellexpand_path(&self.data_file))
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("autosales")
}

pub fn settings_path() -> PathBuf {
    match std::env::var_os(CONFIG_ENV) {
        Some(p) if !p.is_empty() => PathBuf::from(p),
        _ => config_dir().join("settings.json"),
    }
}

pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("autosales")
}

fn default_data_file() -> PathBuf {
    default_data_dir().join("historical_automobile_sales.csv")
}

pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

pub fn load_settings_from(path: &Path) -> Settings {
    if !path.exists() {
        return Settings::default();
    }
    let content = std::fs::read_to_string(path).unwrap_or_default();
    match serde_json::from_str(&content) {
        Ok(settings) => {
            tracing::debug!(path = %path.display(), "loaded settings");
            settings
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings file");
            Settings::default()
        }
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(settings, &settings_path())
}

pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| DashError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    tracing::debug!(path = %path.display(), "saved settings");
    Ok(())
}

/// Resolve the data file for a command: an explicit `--file` wins over the settings.
pub fn resolve_data_file(settings: &Settings, file: Option<&str>) -> PathBuf {
    match file {
        Some(f) => PathBuf::from(shellexpand_path(f)),
        None => settings.data_path(),
    }
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            data_file: "/tmp/sales.csv".to_string(),
            year_start: 1990,
            year_end: 2000,
            default_year: 1995,
            yearly_trend: TrendScope::SelectedYear,
        };
        save_settings_to(&settings, &path).unwrap();
        let loaded = load_settings_from(&path);
        assert_eq!(loaded.data_file, "/tmp/sales.csv");
        assert_eq!(loaded.year_start, 1990);
        assert_eq!(loaded.default_year, 1995);
        assert_eq!(loaded.yearly_trend, TrendScope::SelectedYear);
    }

    #[test]
    fn test_load_returns_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let s = load_settings_from(&dir.path().join("missing.json"));
        assert_eq!(s.year_start, 1980);
        assert_eq!(s.year_end, 2023);
        assert_eq!(s.default_year, 2020);
        assert_eq!(s.yearly_trend, TrendScope::AllYears);
        assert!(s.data_file.ends_with("historical_automobile_sales.csv"));
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"data_file": "/tmp/test.csv", "year_end": 2010}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.year_start, 1980);
        assert_eq!(s.year_end, 2010);
        assert_eq!(s.default_year, 2020);
    }

    #[test]
    fn test_garbage_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_settings_from(&path).year_start, 1980);
    }

    #[test]
    fn test_invalid_year_range_is_settings_error() {
        let s = Settings {
            year_start: 2020,
            year_end: 2010,
            ..Settings::default()
        };
        assert!(matches!(s.report_options(), Err(DashError::Settings(_))));
    }

    #[test]
    fn test_explicit_file_wins() {
        let s = Settings {
            data_file: "/tmp/configured.csv".to_string(),
            ..Settings::default()
        };
        assert_eq!(resolve_data_file(&s, None), PathBuf::from("/tmp/configured.csv"));
        assert_eq!(
            resolve_data_file(&s, Some("/tmp/other.csv")),
            PathBuf::from("/tmp/other.csv")
        );
    }
}
