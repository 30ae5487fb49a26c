//! Runtime settings and saved filter presets.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_PATH: &str = "main_data.csv";
pub const DEFAULT_LOG_FILE_PATH: &str = "logs/aq_dashboard.log";

/// Process-level settings, read from the environment (and `.env`).
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_path: PathBuf,
    pub log_file_path: PathBuf,
}

impl Settings {
    /// Reads `AQ_DATA_PATH` and `LOG_FILE_PATH`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Settings {
            data_path: lookup("AQ_DATA_PATH")
                .unwrap_or_else(|| DEFAULT_DATA_PATH.to_string())
                .into(),
            log_file_path: lookup("LOG_FILE_PATH")
                .unwrap_or_else(|| DEFAULT_LOG_FILE_PATH.to_string())
                .into(),
        }
    }
}

/// A saved selection, stored as a JSON object on disk:
/// ```json
/// {
///   "station": "Dongsi",
///   "start": "2014-01-01",
///   "end": "2014-12-31"
/// }
/// ```
/// Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SelectionPreset {
    pub station: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl SelectionPreset {
    /// Loads the preset from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read preset {}", path.display()))?;
        let preset = serde_json::from_str(&content)
            .with_context(|| format!("invalid preset {}", path.display()))?;
        Ok(preset)
    }

    /// Fills in anything the preset leaves out from `other`; values already
    /// set here win.
    pub fn or(self, other: SelectionPreset) -> Self {
        SelectionPreset {
            station: self.station.or(other.station),
            start: self.start.or(other.start),
            end: self.end.or(other.end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::from_lookup(|_| None);
        assert_eq!(settings.data_path, PathBuf::from("main_data.csv"));
        assert_eq!(settings.log_file_path, PathBuf::from("logs/aq_dashboard.log"));
    }

    #[test]
    fn test_settings_from_lookup() {
        let env: HashMap<&str, &str> = [("AQ_DATA_PATH", "/data/beijing.csv.gz")].into();
        let settings = Settings::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(settings.data_path, PathBuf::from("/data/beijing.csv.gz"));
    }

    #[test]
    fn test_preset_load_partial() {
        let path = std::env::temp_dir().join("aq_dashboard_test_preset.json");
        fs::write(&path, r#"{"station": "Dongsi", "start": "2014-01-01"}"#).unwrap();

        let preset = SelectionPreset::load(&path).unwrap();
        assert_eq!(preset.station.as_deref(), Some("Dongsi"));
        assert_eq!(preset.start, NaiveDate::from_ymd_opt(2014, 1, 1));
        assert_eq!(preset.end, None);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_preset_load_invalid() {
        let path = std::env::temp_dir().join("aq_dashboard_test_bad_preset.json");
        fs::write(&path, r#"{"start": "first of may"}"#).unwrap();
        assert!(SelectionPreset::load(&path).is_err());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_cli_values_override_preset() {
        let cli = SelectionPreset {
            station: Some("Wanliu".into()),
            ..Default::default()
        };
        let file = SelectionPreset {
            station: Some("Dongsi".into()),
            end: NaiveDate::from_ymd_opt(2015, 6, 30),
            ..Default::default()
        };
        let merged = cli.or(file);

        assert_eq!(merged.station.as_deref(), Some("Wanliu"));
        assert_eq!(merged.end, NaiveDate::from_ymd_opt(2015, 6, 30));
    }
}
