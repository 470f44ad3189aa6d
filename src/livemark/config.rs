use crate::commands::export::ExportFormat;
use crate::error::{LivemarkError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_HISTORY_DEBOUNCE_MS: u64 = 1000;
const DEFAULT_SAVED_INDICATOR_MS: u64 = 300;

/// Configuration for livemark, stored in `<data dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LivemarkConfig {
    /// Quiet period before a burst of edits becomes one undo step
    #[serde(default = "default_history_debounce_ms")]
    pub history_debounce_ms: u64,

    /// Delay before the "saving" indicator reads "saved"
    #[serde(default = "default_saved_indicator_ms")]
    pub saved_indicator_ms: u64,

    /// Extensions accepted by `import` (e.g. ".md", ".txt")
    #[serde(default = "default_import_ext")]
    pub import_extensions: Vec<String>,

    /// Format used by `export` when none is given
    #[serde(default)]
    pub default_export_format: ExportFormat,
}

fn default_history_debounce_ms() -> u64 {
    DEFAULT_HISTORY_DEBOUNCE_MS
}

fn default_saved_indicator_ms() -> u64 {
    DEFAULT_SAVED_INDICATOR_MS
}

fn default_import_ext() -> Vec<String> {
    vec![".md".to_string(), ".markdown".to_string(), ".txt".to_string()]
}

impl Default for LivemarkConfig {
    fn default() -> Self {
        Self {
            history_debounce_ms: DEFAULT_HISTORY_DEBOUNCE_MS,
            saved_indicator_ms: DEFAULT_SAVED_INDICATOR_MS,
            import_extensions: default_import_ext(),
            default_export_format: ExportFormat::default(),
        }
    }
}

impl LivemarkConfig {
    pub const KEYS: [&'static str; 4] = [
        "history-debounce-ms",
        "saved-indicator-ms",
        "import-extensions",
        "default-export-format",
    ];

    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(LivemarkError::Io)?;
        let config: LivemarkConfig =
            serde_json::from_str(&content).map_err(LivemarkError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(LivemarkError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(LivemarkError::Serialization)?;
        fs::write(config_path, content).map_err(LivemarkError::Io)?;
        Ok(())
    }

    pub fn history_debounce(&self) -> Duration {
        Duration::from_millis(self.history_debounce_ms)
    }

    pub fn saved_indicator(&self) -> Duration {
        Duration::from_millis(self.saved_indicator_ms)
    }

    /// Whether `filename` has one of the configured import extensions.
    pub fn accepts_import(&self, filename: &str) -> bool {
        let lower = filename.to_lowercase();
        self.import_extensions
            .iter()
            .any(|ext| lower.ends_with(&normalize_ext(ext)))
    }

    /// Read a key as a display string.
    pub fn get(&self, key: &str) -> Result<String> {
        match key {
            "history-debounce-ms" => Ok(self.history_debounce_ms.to_string()),
            "saved-indicator-ms" => Ok(self.saved_indicator_ms.to_string()),
            "import-extensions" => Ok(self.import_extensions.join(",")),
            "default-export-format" => Ok(self.default_export_format.to_string()),
            other => Err(LivemarkError::Config(format!("Unknown config key: {}", other))),
        }
    }

    /// Set a key from its display string.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "history-debounce-ms" => self.history_debounce_ms = parse_ms(key, value)?,
            "saved-indicator-ms" => self.saved_indicator_ms = parse_ms(key, value)?,
            "import-extensions" => {
                self.import_extensions = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(normalize_ext)
                    .collect();
            }
            "default-export-format" => {
                self.default_export_format = value.parse().map_err(LivemarkError::Config)?;
            }
            other => {
                return Err(LivemarkError::Config(format!("Unknown config key: {}", other)))
            }
        }
        Ok(())
    }
}

fn parse_ms(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| LivemarkError::Config(format!("{} expects milliseconds, got {:?}", key, value)))
}

fn normalize_ext(ext: &str) -> String {
    if ext.starts_with('.') {
        ext.to_lowercase()
    } else {
        format!(".{}", ext.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = LivemarkConfig::default();
        assert_eq!(config.history_debounce(), Duration::from_millis(1000));
        assert_eq!(config.saved_indicator(), Duration::from_millis(300));
        assert_eq!(config.import_extensions, vec![".md", ".markdown", ".txt"]);
        assert_eq!(config.default_export_format, ExportFormat::Md);
    }

    #[test]
    fn test_load_missing_config() {
        let dir = TempDir::new().unwrap();
        let config = LivemarkConfig::load(dir.path()).unwrap();
        assert_eq!(config, LivemarkConfig::default());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), r#"{"history_debounce_ms": 250}"#).unwrap();

        let config = LivemarkConfig::load(dir.path()).unwrap();
        assert_eq!(config.history_debounce_ms, 250);
        assert_eq!(config.saved_indicator_ms, 300);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested");

        let mut config = LivemarkConfig::default();
        config.set("default-export-format", "txt").unwrap();
        config.save(&nested).unwrap();

        let loaded = LivemarkConfig::load(&nested).unwrap();
        assert_eq!(loaded.default_export_format, ExportFormat::Txt);
    }

    #[test]
    fn test_set_and_get_keys() {
        let mut config = LivemarkConfig::default();
        config.set("history-debounce-ms", "1500").unwrap();
        config.set("import-extensions", "md, text").unwrap();

        assert_eq!(config.get("history-debounce-ms").unwrap(), "1500");
        assert_eq!(config.get("import-extensions").unwrap(), ".md,.text");
    }

    #[test]
    fn test_rejects_bad_values_and_keys() {
        let mut config = LivemarkConfig::default();
        assert!(config.set("history-debounce-ms", "soon").is_err());
        assert!(config.set("default-export-format", "pdf").is_err());
        assert!(config.set("colour", "blue").is_err());
        assert!(config.get("colour").is_err());
    }

    #[test]
    fn test_accepts_import() {
        let config = LivemarkConfig::default();
        assert!(config.accepts_import("notes.MD"));
        assert!(config.accepts_import("draft.markdown"));
        assert!(!config.accepts_import("photo.png"));
    }
}
