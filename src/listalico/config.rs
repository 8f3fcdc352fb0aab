use crate::error::{ListalicoError, Result};
use crate::model::{normalize_color, DEFAULT_FOLDER_COLOR};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";

/// Settings for listalico, stored in `<data_dir>/config.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListalicoConfig {
    /// Color given to folders created without an explicit one.
    #[serde(default = "default_folder_color")]
    pub default_folder_color: String,

    /// Store a snapshot of the current data before an import replaces it.
    #[serde(default = "default_backup_before_import")]
    pub backup_before_import: bool,

    /// Where `export` writes when no directory is given. Falls back to the
    /// current directory.
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
}

fn default_folder_color() -> String {
    DEFAULT_FOLDER_COLOR.to_string()
}

fn default_backup_before_import() -> bool {
    true
}

impl Default for ListalicoConfig {
    fn default() -> Self {
        Self {
            default_folder_color: default_folder_color(),
            backup_before_import: default_backup_before_import(),
            export_dir: None,
        }
    }
}

impl ListalicoConfig {
    pub const KEYS: [&'static str; 3] =
        ["default_folder_color", "backup_before_import", "export_dir"];

    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: ListalicoConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        fs::create_dir_all(config_dir)?;

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content)?;
        Ok(())
    }

    /// Every key with its current value, in a stable order.
    pub fn list_all(&self) -> Vec<(&'static str, String)> {
        Self::KEYS
            .iter()
            .map(|key| (*key, self.get(key).unwrap_or_default()))
            .collect()
    }

    pub fn get(&self, key: &str) -> Result<String> {
        match key {
            "default_folder_color" => Ok(self.default_folder_color.clone()),
            "backup_before_import" => Ok(self.backup_before_import.to_string()),
            "export_dir" => Ok(self
                .export_dir
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()),
            _ => Err(unknown_key(key)),
        }
    }

    /// Sets a key from its textual form. An empty value clears `export_dir`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "default_folder_color" => {
                self.default_folder_color = normalize_color(value).ok_or_else(|| {
                    ListalicoError::Validation(format!(
                        "Invalid color: {} (expected #RRGGBB)",
                        value
                    ))
                })?;
            }
            "backup_before_import" => {
                self.backup_before_import = match value.trim().to_lowercase().as_str() {
                    "true" | "yes" | "on" | "1" => true,
                    "false" | "no" | "off" | "0" => false,
                    other => {
                        return Err(ListalicoError::Validation(format!(
                            "Expected true or false, got: {}",
                            other
                        )))
                    }
                };
            }
            "export_dir" => {
                let value = value.trim();
                self.export_dir = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }
}

fn unknown_key(key: &str) -> ListalicoError {
    ListalicoError::Validation(format!(
        "Unknown config key: {} (known keys: {})",
        key,
        ListalicoConfig::KEYS.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = ListalicoConfig::default();
        assert_eq!(config.default_folder_color, "#666666");
        assert!(config.backup_before_import);
        assert_eq!(config.export_dir, None);
    }

    #[test]
    fn test_load_missing_config() {
        let dir = tempdir().unwrap();
        let config = ListalicoConfig::load(dir.path()).unwrap();
        assert_eq!(config, ListalicoConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("data");

        let mut config = ListalicoConfig::default();
        config.set("backup_before_import", "off").unwrap();
        config.set("export_dir", "/tmp/backups").unwrap();
        config.save(&nested).unwrap();

        let loaded = ListalicoConfig::load(&nested).unwrap();
        assert_eq!(loaded, config);
        assert!(!loaded.backup_before_import);
    }

    #[test]
    fn test_partial_file_gets_defaults() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), r#"{"export_dir": "out"}"#).unwrap();

        let config = ListalicoConfig::load(dir.path()).unwrap();
        assert_eq!(config.export_dir, Some(PathBuf::from("out")));
        assert_eq!(config.default_folder_color, "#666666");
        assert!(config.backup_before_import);
    }

    #[test]
    fn test_set_validates() {
        let mut config = ListalicoConfig::default();
        assert!(config.set("default_folder_color", "red").is_err());
        assert!(config.set("backup_before_import", "maybe").is_err());
        assert!(config.set("nope", "x").is_err());

        config.set("default_folder_color", "#FF9500").unwrap();
        assert_eq!(config.get("default_folder_color").unwrap(), "#ff9500");

        config.set("export_dir", "  ").unwrap();
        assert_eq!(config.get("export_dir").unwrap(), "");
    }
}
