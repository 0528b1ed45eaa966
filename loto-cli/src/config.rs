use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "loto.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LotoConfig {
    /// SQLite database; `data/loto.db` under the working directory when unset.
    pub database: Option<PathBuf>,
    /// CSV file read by `import` when `--file` is not given.
    pub csv_file: PathBuf,
    pub csv_delimiter: char,
    /// Draws considered by `stats`; all of them when unset.
    pub stats_window: Option<u32>,
    pub list_last: u32,
}

impl Default for LotoConfig {
    fn default() -> Self {
        Self {
            database: None,
            csv_file: PathBuf::from("loto2017.csv"),
            csv_delimiter: ';',
            stats_window: None,
            list_last: 10,
        }
    }
}

impl LotoConfig {
    pub fn database_path(&self) -> PathBuf {
        self.database.clone().unwrap_or_else(loto_db::db::db_path)
    }

    pub fn delimiter_byte(&self) -> Result<u8> {
        if !self.csv_delimiter.is_ascii() {
            bail!("Séparateur CSV non ASCII : {:?}", self.csv_delimiter);
        }
        Ok(self.csv_delimiter as u8)
    }

    /// `--window` when given, else the configured window.
    pub fn effective_stats_window(&self, flag: Option<u32>) -> Option<u32> {
        flag.or(self.stats_window)
    }

    /// `--last` when given, else the configured list length.
    pub fn effective_list_last(&self, flag: Option<u32>) -> u32 {
        flag.unwrap_or(self.list_last)
    }

    /// `--file` when given, else the configured CSV file.
    pub fn effective_csv_file(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.unwrap_or_else(|| self.csv_file.clone())
    }
}

pub fn load_config(path: &Path) -> Result<LotoConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire la configuration {:?}", path))?;
    let config: LotoConfig = serde_json::from_str(&json)
        .with_context(|| format!("Configuration invalide {:?}", path))?;
    Ok(config)
}

/// Explicit file if given, else `loto.json` in the working directory if present,
/// else defaults.
pub fn resolve_config(explicit: Option<&Path>) -> Result<LotoConfig> {
    resolve_config_in(Path::new("."), explicit)
}

/// Same as [`resolve_config`], looking for `loto.json` in `dir`.
pub fn resolve_config_in(dir: &Path, explicit: Option<&Path>) -> Result<LotoConfig> {
    match explicit {
        Some(path) => load_config(path),
        None => {
            let path = dir.join(DEFAULT_CONFIG_FILE);
            if path.exists() {
                load_config(&path)
            } else {
                Ok(LotoConfig::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LotoConfig::default();
        assert_eq!(config.csv_delimiter, ';');
        assert_eq!(config.list_last, 10);
        assert_eq!(config.stats_window, None);
        assert_eq!(config.delimiter_byte().unwrap(), b';');
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: LotoConfig = serde_json::from_str(r#"{"stats_window": 50}"#).unwrap();
        assert_eq!(config.stats_window, Some(50));
        assert_eq!(config.csv_delimiter, ';');
        assert_eq!(config.csv_file, PathBuf::from("loto2017.csv"));
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = LotoConfig {
            database: Some(PathBuf::from("/tmp/loto.db")),
            csv_delimiter: ',',
            ..LotoConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let restored: LotoConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, config);
        assert_eq!(restored.database_path(), PathBuf::from("/tmp/loto.db"));
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let config = LotoConfig {
            csv_delimiter: '€',
            ..LotoConfig::default()
        };
        assert!(config.delimiter_byte().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_config(Path::new("/nonexistent/loto.json")).is_err());
    }

    #[test]
    fn test_resolve_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autre.json");
        std::fs::write(&path, r#"{"stats_window": 30, "list_last": 5}"#).unwrap();

        let config = resolve_config_in(dir.path(), Some(&path)).unwrap();
        assert_eq!(config.stats_window, Some(30));
        assert_eq!(config.list_last, 5);
    }

    #[test]
    fn test_resolve_default_file_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            r#"{"csv_delimiter": ",", "stats_window": 100}"#,
        )
        .unwrap();

        let config = resolve_config_in(dir.path(), None).unwrap();
        assert_eq!(config.csv_delimiter, ',');
        assert_eq!(config.stats_window, Some(100));
    }

    #[test]
    fn test_resolve_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve_config_in(dir.path(), None).unwrap(), LotoConfig::default());
    }

    #[test]
    fn test_resolve_invalid_default_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "{ pas du json").unwrap();
        assert!(resolve_config_in(dir.path(), None).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let config = LotoConfig {
            stats_window: Some(50),
            list_last: 20,
            csv_file: PathBuf::from("config.csv"),
            ..LotoConfig::default()
        };
        assert_eq!(config.effective_stats_window(Some(10)), Some(10));
        assert_eq!(config.effective_stats_window(None), Some(50));
        assert_eq!(LotoConfig::default().effective_stats_window(None), None);

        assert_eq!(config.effective_list_last(Some(3)), 3);
        assert_eq!(config.effective_list_last(None), 20);

        assert_eq!(
            config.effective_csv_file(Some(PathBuf::from("flag.csv"))),
            PathBuf::from("flag.csv")
        );
        assert_eq!(config.effective_csv_file(None), PathBuf::from("config.csv"));
    }
}
