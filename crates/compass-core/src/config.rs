//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/compass/config.toml)
//! 3. Environment variables (COMPASS_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix
const ENV_PREFIX: &str = "COMPASS";

/// File name of the user's bookmark store inside `data_dir`
const BOOKMARKS_FILE: &str = "bookmarks.json";

/// File name of the bundled sample set inside `data_dir`
const SAMPLES_FILE: &str = "sample-bookmarks.json";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the bookmark store
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Location of the sample bookmark set (defaults to `data_dir`)
    #[serde(default)]
    pub samples_path: Option<PathBuf>,

    /// Merge the sample set into the store when it is present
    #[serde(default = "default_auto_import")]
    pub auto_import_samples: bool,

    /// Write logs to this file instead of stderr
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            samples_path: None,
            auto_import_samples: default_auto_import(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (COMPASS_DATA_DIR, COMPASS_SAMPLES_PATH, COMPASS_AUTO_IMPORT_SAMPLES)
    /// 2. Config file (~/.config/compass/config.toml or COMPASS_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring an explicit path given on the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_path(p),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // COMPASS_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // COMPASS_SAMPLES_PATH
        if let Ok(val) = std::env::var(format!("{}_SAMPLES_PATH", ENV_PREFIX)) {
            self.samples_path = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }

        // COMPASS_AUTO_IMPORT_SAMPLES
        if let Ok(val) = std::env::var(format!("{}_AUTO_IMPORT_SAMPLES", ENV_PREFIX)) {
            self.auto_import_samples = val.eq_ignore_ascii_case("true") || val == "1";
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path())
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with COMPASS_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("compass")
            .join("config.toml")
    }

    /// Get the path to the bookmark store file
    pub fn bookmarks_path(&self) -> PathBuf {
        self.data_dir.join(BOOKMARKS_FILE)
    }

    /// Get the path to the sample bookmark set
    pub fn samples_path(&self) -> PathBuf {
        self.samples_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join(SAMPLES_FILE))
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("compass")
}

fn default_auto_import() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "COMPASS_DATA_DIR",
        "COMPASS_SAMPLES_PATH",
        "COMPASS_AUTO_IMPORT_SAMPLES",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.auto_import_samples);
        assert!(config.samples_path.is_none());
        assert!(config.log_file.is_none());
        assert!(config.data_dir.ends_with("compass"));
    }

    #[test]
    fn test_file_paths() {
        let config = Config::default();

        assert!(config.bookmarks_path().ends_with("bookmarks.json"));
        assert!(config.samples_path().ends_with("sample-bookmarks.json"));
        assert!(config.samples_path().starts_with(&config.data_dir));
    }

    #[test]
    fn test_explicit_samples_path() {
        let config = Config {
            samples_path: Some(PathBuf::from("/opt/compass/demo.json")),
            ..Config::default()
        };
        assert_eq!(config.samples_path(), PathBuf::from("/opt/compass/demo.json"));
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("COMPASS_DATA_DIR", "/tmp/compass-test");
        config.apply_env_overrides();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/compass-test"));
        assert_eq!(
            config.bookmarks_path(),
            PathBuf::from("/tmp/compass-test/bookmarks.json")
        );
    }

    #[test]
    fn test_env_override_auto_import() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        assert!(config.auto_import_samples);

        env::set_var("COMPASS_AUTO_IMPORT_SAMPLES", "false");
        config.apply_env_overrides();
        assert!(!config.auto_import_samples);

        env::set_var("COMPASS_AUTO_IMPORT_SAMPLES", "1");
        config.apply_env_overrides();
        assert!(config.auto_import_samples);

        env::set_var("COMPASS_AUTO_IMPORT_SAMPLES", "TRUE");
        config.auto_import_samples = false;
        config.apply_env_overrides();
        assert!(config.auto_import_samples);
    }

    #[test]
    fn test_env_override_samples_path() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("COMPASS_SAMPLES_PATH", "/srv/samples.json");
        config.apply_env_overrides();
        assert_eq!(config.samples_path, Some(PathBuf::from("/srv/samples.json")));

        // Empty string clears it
        env::set_var("COMPASS_SAMPLES_PATH", "");
        config.apply_env_overrides();
        assert!(config.samples_path.is_none());
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            data_dir: PathBuf::from("/data/compass"),
            samples_path: Some(PathBuf::from("/data/samples.json")),
            auto_import_samples: false,
            log_file: None,
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("samples_path"));
        assert!(toml_str.contains("auto_import_samples"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.samples_path, config.samples_path);
        assert_eq!(parsed.auto_import_samples, config.auto_import_samples);
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"
            auto_import_samples = false
            log_file = "/custom/compass.log"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert!(!config.auto_import_samples);
        assert_eq!(config.log_file, Some(PathBuf::from("/custom/compass.log")));
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        env::set_var("COMPASS_DATA_DIR", temp_dir.path().join("data"));

        let path = temp_dir.path().join("missing").join("config.toml");
        let config = Config::load_from_path(&path).unwrap();

        // Defaults when the file doesn't exist, data dir created on demand
        assert!(config.auto_import_samples);
        assert!(config.data_dir.exists());
    }

    #[test]
    fn test_save_to_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config {
            data_dir: temp_dir.path().join("data"),
            samples_path: None,
            auto_import_samples: false,
            log_file: None,
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.data_dir, config.data_dir);
        assert!(!loaded.auto_import_samples);
    }
}
