//! Configuration file.
//!
//! Settings live in an INI file at `<config dir>/wbmedia/config.ini`:
//!
//! ```ini
//! [cdn]
//! photo_host = wbbasket.ru
//!
//! [shards]
//! hot_zone = 20-30
//! timeout_secs = 90
//!
//! [video]
//! hot_volumes = 1-50
//! extended_volumes = 51-200
//! ```
//!
//! Every key is optional; a missing key or a missing file yields the
//! default. [`ConfigKey`] enumerates the keys and converts values in both
//! directions, so loading, saving and the `config get/set` commands share
//! one definition.

mod keys;

pub use keys::ConfigKey;

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use crate::cache::VideoCacheConfig;
use crate::cdn::{CdnConfig, HttpConfig};
use crate::logging::LoggingConfig;
use crate::photos::PhotoConfig;
use crate::resolver::ShardSearchConfig;
use crate::video::VideoSearchConfig;

/// Directory name under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "wbmedia";

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Errors reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("failed to write {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    #[error("invalid value '{value}' for [{section}] {key}: {reason}")]
    InvalidValue {
        section: &'static str,
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// Default configuration file location.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub cdn: CdnConfig,
    pub shards: ShardSearchConfig,
    pub photos: PhotoConfig,
    pub video: VideoSearchConfig,
    pub cache: VideoCacheConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
    path: Option<PathBuf>,
}

impl ConfigFile {
    /// Loads the file at the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Loads `path`, returning defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            Self::from_ini(&ini)?
        } else {
            Self::default()
        };
        config.path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parses INI text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Read {
            path: PathBuf::from("<string>"),
            reason: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for key in ConfigKey::all() {
            if let Some(value) = ini.get_from(Some(key.section()), key.key_name()) {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    /// Where this configuration was loaded from, if anywhere.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Writes every key to the file this configuration was loaded from, or
    /// to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = self.path.clone().unwrap_or_else(config_file_path);
        self.save_to(&path)
    }

    /// Writes every key to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |e: std::io::Error| ConfigError::Write {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        self.to_ini().write_to_file(path).map_err(write_err)
    }

    /// Renders the configuration as INI text.
    pub fn to_ini_string(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.to_ini().write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini
    }
}
