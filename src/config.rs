//! Engine configuration file
//!
//! `config.json` under the platform config directory, or an explicit path.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::validate_threshold;
use crate::search::autocomplete::AutocompleteOptions;
use crate::search::engine::SmartSearchOptions;
use crate::search::fuzzy::{DEFAULT_LIMIT, DEFAULT_THRESHOLD};

const APP_DIR: &str = "school-core";
const CONFIG_FILE: &str = "config.json";

/// Defaults for the search engine and grading commands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub search_fields: Vec<String>,
    pub filter_fields: Vec<String>,
    pub autocomplete_fields: Vec<String>,
    pub threshold: f64,
    pub limit: usize,
    pub case_sensitive: bool,
    pub min_query_length: usize,
    pub max_suggestions: usize,
    pub grade_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let autocomplete = AutocompleteOptions::default();
        Self {
            search_fields: Vec::new(),
            filter_fields: Vec::new(),
            autocomplete_fields: Vec::new(),
            threshold: DEFAULT_THRESHOLD,
            limit: DEFAULT_LIMIT,
            case_sensitive: false,
            min_query_length: autocomplete.min_length,
            max_suggestions: autocomplete.max_suggestions,
            grade_level: "form1".to_string(),
        }
    }
}

/// Default location of the configuration file
pub fn config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("Cannot determine config directory")?;
    Ok(config_dir.join(APP_DIR).join(CONFIG_FILE))
}

impl EngineConfig {
    /// Load from an explicit path, or from [`config_path`] when none is given.
    ///
    /// A missing file at the default location yields the defaults; an
    /// explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(explicit) => explicit.to_path_buf(),
            None => {
                let default_path = config_path()?;
                if !default_path.exists() {
                    debug!("No config at {}, using defaults", default_path.display());
                    return Ok(Self::default());
                }
                default_path
            }
        };

        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: EngineConfig = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        validate_threshold(config.threshold)
            .with_context(|| format!("Invalid threshold in {}", path.display()))?;

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_search_options(&self) -> SmartSearchOptions {
        SmartSearchOptions {
            search_fields: self.search_fields.clone(),
            filter_fields: self.filter_fields.clone(),
            autocomplete_fields: self.autocomplete_fields.clone(),
            threshold: self.threshold,
            max_results: self.limit,
            case_sensitive: self.case_sensitive,
            min_query_length: self.min_query_length,
            max_suggestions: self.max_suggestions,
        }
    }
}

impl From<EngineConfig> for SmartSearchOptions {
    fn from(config: EngineConfig) -> Self {
        config.to_search_options()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.threshold, 0.3);
        assert_eq!(config.limit, 50);
        assert_eq!(config.min_query_length, 2);
        assert_eq!(config.max_suggestions, 10);
        assert_eq!(config.grade_level, "form1");
        assert!(!config.case_sensitive);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config(r#"{"searchFields": ["name", "code"], "limit": 5}"#);
        let config = EngineConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.search_fields, vec!["name", "code"]);
        assert_eq!(config.limit, 5);
        assert_eq!(config.threshold, 0.3);
        assert_eq!(config.grade_level, "form1");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let file = write_config("{ not json");
        let err = EngineConfig::load(Some(file.path())).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }

    #[test]
    fn test_out_of_range_threshold_is_rejected() {
        let file = write_config(r#"{"threshold": 1.5}"#);
        assert!(EngineConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        assert!(EngineConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_converts_into_search_options() {
        let config = EngineConfig {
            search_fields: vec!["name".to_string()],
            limit: 7,
            case_sensitive: true,
            ..EngineConfig::default()
        };
        let options: SmartSearchOptions = config.into();
        assert_eq!(options.search_fields, vec!["name"]);
        assert_eq!(options.max_results, 7);
        assert!(options.case_sensitive);
        assert_eq!(options.max_suggestions, 10);
    }

    #[test]
    fn test_config_path_location() {
        if let Ok(path) = config_path() {
            assert!(path.ends_with("school-core/config.json"));
        }
    }
}
