use crate::error::{FolioError, Result};
use crate::paging::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_LARGE_FILE_THRESHOLD: u64 = 10 * 1024 * 1024;

/// A named directory folio may browse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RootDir {
    pub name: String,
    pub path: String,
}

/// Configuration for folio, stored in config.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FolioConfig {
    #[serde(default = "default_root_dirs")]
    pub root_dirs: Vec<RootDir>,

    /// Lines per page for files at or above the large-file threshold
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Files smaller than this many bytes are shown as a single page
    #[serde(default = "default_large_file_threshold")]
    pub large_file_threshold: u64,

    #[serde(default = "default_highlight")]
    pub highlight: bool,
}

fn default_root_dirs() -> Vec<RootDir> {
    vec![RootDir {
        name: "default".to_string(),
        path: ".".to_string(),
    }]
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_large_file_threshold() -> u64 {
    DEFAULT_LARGE_FILE_THRESHOLD
}

fn default_highlight() -> bool {
    true
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            root_dirs: default_root_dirs(),
            page_size: default_page_size(),
            large_file_threshold: default_large_file_threshold(),
            highlight: default_highlight(),
        }
    }
}

impl FolioConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: FolioConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(FolioError::Config("page_size must be at least 1".to_string()));
        }
        if self.root_dirs.is_empty() {
            return Err(FolioError::Config("at least one root is required".to_string()));
        }
        Ok(())
    }

    /// Picks a root by position (`0`, `1`, ...) or by name. `None` selects the
    /// first root.
    pub fn root(&self, selector: Option<&str>) -> Result<&RootDir> {
        let Some(selector) = selector else {
            return self
                .root_dirs
                .first()
                .ok_or_else(|| FolioError::Config("no roots configured".to_string()));
        };

        let by_index = selector
            .parse::<usize>()
            .ok()
            .and_then(|i| self.root_dirs.get(i));
        by_index
            .or_else(|| self.root_dirs.iter().find(|r| r.name == selector))
            .ok_or_else(|| FolioError::Config(format!("unknown root: {}", selector)))
    }

    /// Display value of a key, `None` for unknown keys.
    ///
    /// Keys: `page_size`, `large_file_threshold`, `highlight`, `roots` and
    /// `root.<name>`.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "page_size" => Some(self.page_size.to_string()),
            "large_file_threshold" => Some(self.large_file_threshold.to_string()),
            "highlight" => Some(self.highlight.to_string()),
            "roots" => Some(
                self.root_dirs
                    .iter()
                    .map(|r| format!("{}={}", r.name, r.path))
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            _ => {
                let name = key.strip_prefix("root.")?;
                self.root_dirs
                    .iter()
                    .find(|r| r.name == name)
                    .map(|r| r.path.clone())
            }
        }
    }

    /// Sets a key from its text form. `root.<name>` adds or moves a root.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "page_size" => {
                let size: usize = value
                    .parse()
                    .map_err(|_| FolioError::Config(format!("not a number: {}", value)))?;
                if size == 0 {
                    return Err(FolioError::Config("page_size must be at least 1".to_string()));
                }
                self.page_size = size;
            }
            "large_file_threshold" => {
                self.large_file_threshold = value
                    .parse()
                    .map_err(|_| FolioError::Config(format!("not a number: {}", value)))?;
            }
            "highlight" => {
                self.highlight = match value {
                    "true" | "on" | "yes" => true,
                    "false" | "off" | "no" => false,
                    _ => return Err(FolioError::Config(format!("not a boolean: {}", value))),
                };
            }
            _ => {
                let name = key
                    .strip_prefix("root.")
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| FolioError::Config(format!("Unknown config key: {}", key)))?;
                match self.root_dirs.iter_mut().find(|r| r.name == name) {
                    Some(root) => root.path = value.to_string(),
                    None => self.root_dirs.push(RootDir {
                        name: name.to_string(),
                        path: value.to_string(),
                    }),
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = FolioConfig::default();
        assert_eq!(config.page_size, 1000);
        assert_eq!(config.large_file_threshold, 10 * 1024 * 1024);
        assert!(config.highlight);
        assert_eq!(config.root_dirs.len(), 1);
        assert_eq!(config.root_dirs[0].path, ".");
    }

    #[test]
    fn test_load_missing_config() {
        let temp = TempDir::new().unwrap();
        let config = FolioConfig::load(temp.path().join("absent")).unwrap();
        assert_eq!(config, FolioConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nested");

        let mut config = FolioConfig::default();
        config.set("page_size", "250").unwrap();
        config.set("root.logs", "/var/log").unwrap();
        config.save(&dir).unwrap();

        let loaded = FolioConfig::load(&dir).unwrap();
        assert_eq!(loaded.page_size, 250);
        assert_eq!(loaded.root(Some("logs")).unwrap().path, "/var/log");
    }

    #[test]
    fn test_partial_file_gets_defaults() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILENAME), r#"{"page_size": 50}"#).unwrap();
        let config = FolioConfig::load(temp.path()).unwrap();
        assert_eq!(config.page_size, 50);
        assert!(config.highlight);
        assert_eq!(config.root_dirs, default_root_dirs());
    }

    #[test]
    fn test_load_rejects_zero_page_size() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILENAME), r#"{"page_size": 0}"#).unwrap();
        assert!(matches!(
            FolioConfig::load(temp.path()),
            Err(FolioError::Config(_))
        ));
    }

    #[test]
    fn test_root_selection() {
        let mut config = FolioConfig::default();
        config.set("root.logs", "/var/log").unwrap();
        assert_eq!(config.root(None).unwrap().name, "default");
        assert_eq!(config.root(Some("1")).unwrap().name, "logs");
        assert_eq!(config.root(Some("logs")).unwrap().path, "/var/log");
        assert!(config.root(Some("7")).is_err());
        assert!(config.root(Some("nope")).is_err());
    }

    #[test]
    fn test_get_and_set_keys() {
        let mut config = FolioConfig::default();
        config.set("highlight", "off").unwrap();
        assert_eq!(config.get("highlight").unwrap(), "false");
        assert!(config.set("highlight", "maybe").is_err());
        assert!(config.set("page_size", "0").is_err());
        assert!(config.set("page_size", "many").is_err());
        assert!(config.set("colour", "red").is_err());
        assert!(config.set("root.", "/x").is_err());
        assert_eq!(config.get("colour"), None);
        assert_eq!(config.get("roots").unwrap(), "default=.");

        config.set("root.default", "/srv").unwrap();
        assert_eq!(config.root_dirs.len(), 1);
        assert_eq!(config.get("root.default").unwrap(), "/srv");
    }
}
