use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::logging::LogConfig;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application metadata
    pub metadata: ConfigMetadata,

    /// Where and how health data is persisted
    pub storage: StorageSettings,

    /// Day boundary settings
    pub day: DaySettings,

    /// AI assistant settings
    pub ai: AiSettings,

    /// Export destination
    pub export: ExportSettings,

    /// Logging settings
    pub logging: LogConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Storage backend kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// SQLite database file under the data directory
    Sqlite,
    /// Process memory only; nothing survives exit
    Memory,
}

/// Persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    pub backend: StorageBackend,

    /// Data directory path
    pub data_dir: PathBuf,

    /// Database file name inside the data directory
    pub database_file: String,

    /// Queue writes on a background worker instead of writing inline
    pub write_behind: bool,
}

impl StorageSettings {
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }
}

/// Which clock decides the calendar date used for rollover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayBoundary {
    /// Device local time
    Local,
    /// UTC date
    Utc,
}

/// Day rollover settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySettings {
    pub boundary: DayBoundary,
}

/// AI chat-completion settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiSettings {
    /// Master switch; disabled means fallbacks only
    pub enabled: bool,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Endpoint override (defaults chosen from the key's provider)
    pub base_url: Option<String>,

    /// Model override
    pub model: Option<String>,

    pub temperature: f32,

    pub max_tokens: u32,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Directory export files are written to
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();

        AppConfig {
            metadata: ConfigMetadata {
                version: "1.0".to_string(),
                created_at: now,
                updated_at: now,
            },
            storage: StorageSettings::default(),
            day: DaySettings::default(),
            ai: AiSettings::default(),
            export: ExportSettings::default(),
            logging: LogConfig::default(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            backend: StorageBackend::Sqlite,
            data_dir: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("healthsync"),
            database_file: "health.db".to_string(),
            write_behind: true,
        }
    }
}

impl Default for DaySettings {
    fn default() -> Self {
        DaySettings {
            boundary: DayBoundary::Local,
        }
    }
}

impl Default for AiSettings {
    fn default() -> Self {
        AiSettings {
            enabled: true,
            api_key_env: "HEALTHSYNC_AI_API_KEY".to_string(),
            base_url: None,
            model: None,
            temperature: 0.7,
            max_tokens: 1000,
            timeout_secs: 30,
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        ExportSettings {
            output_dir: dirs::document_dir().unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".healthsync")
            .join("config.toml")
    }

    /// Load configuration with fallback to defaults
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!(
                    path = %config_path.display(),
                    error = %e,
                    "Config file not loaded, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Flattened `section.key = value` pairs for display
    pub fn list(&self) -> Result<Vec<(String, String)>> {
        let root = toml::Value::try_from(self).context("Failed to serialize configuration")?;
        let mut out = Vec::new();
        flatten("", &root, &mut out);
        Ok(out)
    }

    /// Read a dotted key such as `storage.backend`
    pub fn get_value(&self, key: &str) -> Result<String> {
        let root = toml::Value::try_from(self).context("Failed to serialize configuration")?;
        let mut current = &root;
        for part in key.split('.') {
            current = current
                .get(part)
                .ok_or_else(|| anyhow::anyhow!("Unknown configuration key: {}", key))?;
        }
        Ok(display_value(current))
    }

    /// Set a dotted key, parsing the value as the type already stored there
    pub fn set_value(&mut self, key: &str, raw: &str) -> Result<()> {
        let mut root = toml::Value::try_from(&*self).context("Failed to serialize configuration")?;

        let (parents, leaf) = match key.rsplit_once('.') {
            Some((parents, leaf)) => (Some(parents), leaf),
            None => (None, key),
        };

        let mut section = &mut root;
        for part in parents.into_iter().flat_map(|p| p.split('.')) {
            section = section
                .get_mut(part)
                .ok_or_else(|| anyhow::anyhow!("Unknown configuration key: {}", key))?;
        }
        let table = section
            .as_table_mut()
            .ok_or_else(|| anyhow::anyhow!("Unknown configuration key: {}", key))?;

        // Unset optional values are absent from the table; treat them as strings.
        let current = table
            .entry(leaf.to_string())
            .or_insert(toml::Value::String(String::new()));

        *current = match &*current {
            toml::Value::Boolean(_) => toml::Value::Boolean(
                raw.parse()
                    .with_context(|| format!("Expected true/false for {}", key))?,
            ),
            toml::Value::Integer(_) => toml::Value::Integer(
                raw.parse()
                    .with_context(|| format!("Expected an integer for {}", key))?,
            ),
            toml::Value::Float(_) => toml::Value::Float(
                raw.parse()
                    .with_context(|| format!("Expected a number for {}", key))?,
            ),
            toml::Value::String(_) => toml::Value::String(raw.to_string()),
            _ => anyhow::bail!("Configuration key {} is a section, not a value", key),
        };

        let updated: AppConfig = root
            .try_into()
            .with_context(|| format!("Invalid value for {}: {}", key, raw))?;
        if updated.get_value(key).is_err() {
            anyhow::bail!("Unknown configuration key: {}", key);
        }
        *self = updated;
        self.metadata.updated_at = Utc::now();
        Ok(())
    }
}

fn flatten(prefix: &str, value: &toml::Value, out: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (k, v) in table {
                let key = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{}.{}", prefix, k)
                };
                flatten(&key, v, out);
            }
        }
        other => out.push((prefix.to_string(), display_value(other))),
    }
}

fn display_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.metadata.version, deserialized.metadata.version);
        assert_eq!(config.storage.backend, deserialized.storage.backend);
        assert_eq!(config.day.boundary, DayBoundary::Local);
    }

    #[test]
    fn test_config_file_io() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("conf").join("config.toml");

        let mut original = AppConfig::default();
        original.storage.backend = StorageBackend::Memory;
        original.ai.max_tokens = 500;

        original.save_to_file(&config_path).unwrap();
        let loaded = AppConfig::load_from_file(&config_path).unwrap();

        assert_eq!(loaded.storage.backend, StorageBackend::Memory);
        assert_eq!(loaded.ai.max_tokens, 500);
    }

    #[test]
    fn test_load_or_default_with_missing_file() {
        let temp_dir = tempdir().unwrap();
        let config = AppConfig::load_or_default(Some(&temp_dir.path().join("absent.toml")));
        assert_eq!(config.metadata.version, "1.0");
    }

    #[test]
    fn test_dotted_get_and_set() {
        let mut config = AppConfig::default();
        assert_eq!(config.get_value("storage.backend").unwrap(), "sqlite");

        config.set_value("storage.backend", "memory").unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Memory);

        config.set_value("storage.write_behind", "false").unwrap();
        assert!(!config.storage.write_behind);

        config.set_value("ai.max_tokens", "256").unwrap();
        assert_eq!(config.ai.max_tokens, 256);

        assert!(config.set_value("storage.backend", "floppy").is_err());
        assert!(config.set_value("ai.max_tokens", "lots").is_err());
        assert!(config.get_value("nope.key").is_err());
        assert!(config.set_value("storage", "x").is_err());
        assert!(config.set_value("ai.bogus", "x").is_err());

        config.set_value("ai.base_url", "http://localhost:9999").unwrap();
        assert_eq!(config.ai.base_url.as_deref(), Some("http://localhost:9999"));
    }

    #[test]
    fn test_list_flattens_sections() {
        let config = AppConfig::default();
        let entries = config.list().unwrap();
        assert!(entries.iter().any(|(k, v)| k == "day.boundary" && v == "local"));
        assert!(entries.iter().any(|(k, _)| k == "logging.level"));
    }
}
