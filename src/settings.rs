use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::context::ContextLimits;
use crate::llm::client::{DEFAULT_BASE_URL, DEFAULT_MODEL};

const SETTINGS_DIR: &str = "sheet-search";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub request_timeout_secs: u64,
    pub sheets_api_key: String,
    pub sheets_base_url: Option<String>,
    pub limits: ContextLimits,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: 2048,
            temperature: 0.1,
            request_timeout_secs: 60,
            sheets_api_key: String::new(),
            sheets_base_url: None,
            limits: ContextLimits::default(),
        }
    }
}

impl Settings {
    /// `<config dir>/sheet-search/settings.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(SETTINGS_DIR).join(SETTINGS_FILE))
    }

    /// Settings file (when present) with environment overrides applied
    pub fn load() -> Result<Self, SettingsError> {
        let mut settings = match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        settings.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(key) = lookup("GEMINI_API_KEY") {
            self.api_key = key;
        }
        if let Some(model) = lookup("GEMINI_MODEL") {
            self.model = model;
        }
        if let Some(url) = lookup("GEMINI_BASE_URL") {
            self.base_url = url;
        }
        if let Some(key) = lookup("GOOGLE_SHEETS_API_KEY") {
            self.sheets_api_key = key;
        }
        if let Some(secs) = lookup("SHEET_SEARCH_TIMEOUT_SECS") {
            match secs.trim().parse() {
                Ok(secs) => self.request_timeout_secs = secs,
                Err(_) => log::warn!("Ignoring invalid SHEET_SEARCH_TIMEOUT_SECS: {}", secs),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.model, "gemini-2.5-flash");
        assert_eq!(settings.request_timeout_secs, 60);
        assert!(settings.api_key.is_empty());
        assert_eq!(settings.limits, ContextLimits::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "api_key": "file-key", "limits": {{ "sample_rows": 3 }} }}"#
        )
        .unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.api_key, "file-key");
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.limits.sample_rows, 3);
        assert_eq!(settings.limits.main_context_chars, 4000);
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Settings::from_file(&path), Err(SettingsError::Parse { .. })));

        let missing = dir.path().join("missing.json");
        assert!(matches!(Settings::from_file(&missing), Err(SettingsError::Io { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("GEMINI_API_KEY", "env-key"),
            ("GEMINI_MODEL", "gemini-pro"),
            ("GOOGLE_SHEETS_API_KEY", "sheets-key"),
            ("SHEET_SEARCH_TIMEOUT_SECS", "15"),
            ("GEMINI_BASE_URL", "  "),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(settings.api_key, "env-key");
        assert_eq!(settings.model, "gemini-pro");
        assert_eq!(settings.sheets_api_key, "sheets-key");
        assert_eq!(settings.request_timeout_secs, 15);
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_invalid_timeout_override_is_ignored() {
        let mut settings = Settings::default();
        settings.apply_env_overrides(|key| {
            (key == "SHEET_SEARCH_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert_eq!(settings.request_timeout_secs, 60);
    }
}
