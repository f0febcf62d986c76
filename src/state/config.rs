//! Configuration management
//!
//! Settings live in ~/.minpair.cfg and are read once at startup. Controls
//! adjusted during a session (pause, voice) are deliberately not written
//! back.

use crate::{MinpairError, Result};
use ini::Ini;
use log::{debug, info};
use std::path::PathBuf;

/// Pause bounds in milliseconds
pub const PAUSE_MIN_MS: u64 = 0;
pub const PAUSE_MAX_MS: u64 = 3000;
pub const PAUSE_STEP_MS: u64 = 100;
pub const PAUSE_DEFAULT_MS: u64 = 1000;

/// Application configuration
pub struct Config {
    ini: Ini,
    path: PathBuf,
}

impl Config {
    /// Load configuration from the default path, writing a template on
    /// first run
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        debug!("loading config from {:?}", path);

        let ini = if path.exists() {
            Ini::load_from_file(&path)
                .map_err(|e| MinpairError::IniParse(format!("failed to load config: {}", e)))?
        } else {
            info!("config file not found, creating default");
            let default = Self::default_config();
            default
                .write_to_file(&path)
                .map_err(|e| MinpairError::IniParse(format!("failed to write config: {}", e)))?;
            default
        };

        Ok(Self { ini, path })
    }

    /// Config file path (~/.minpair.cfg)
    fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".minpair.cfg")
    }

    /// Expose the config file path for display
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn default_config() -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("speech"))
            .set("primary_language", "en-US")
            .set("secondary_language", "en-GB");

        ini.with_section(Some("drill"))
            .set("pause_ms", PAUSE_DEFAULT_MS.to_string());

        ini
    }

    /// Get a string value from config
    pub fn get_string(&self, section: &str, key: &str, default: &str) -> String {
        self.ini
            .get_from(Some(section), key)
            .unwrap_or(default)
            .to_string()
    }

    /// Get an integer value from config
    pub fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    // Typed getters

    /// Locale preferred for the default voice selection
    pub fn primary_language(&self) -> String {
        self.get_string("speech", "primary_language", "en-US")
    }

    /// Fallback locale when no primary match exists
    pub fn secondary_language(&self) -> String {
        self.get_string("speech", "secondary_language", "en-GB")
    }

    /// Speech rate (0-100)
    pub fn rate(&self) -> Option<u8> {
        u8::try_from(self.get_int("speech", "rate", -1))
            .ok()
            .filter(|&r| r <= 100)
    }

    /// Speech volume (0-100)
    pub fn volume(&self) -> Option<u8> {
        u8::try_from(self.get_int("speech", "volume", -1))
            .ok()
            .filter(|&v| v <= 100)
    }

    /// Initial inter-word pause, clamped to the slider bounds
    pub fn pause_ms(&self) -> u64 {
        let raw = self.get_int("drill", "pause_ms", PAUSE_DEFAULT_MS as i64);
        u64::try_from(raw)
            .unwrap_or(PAUSE_DEFAULT_MS)
            .clamp(PAUSE_MIN_MS, PAUSE_MAX_MS)
    }

    /// Catalog file configured as the default source
    pub fn catalog_path(&self) -> Option<PathBuf> {
        let value = self.get_string("drill", "catalog", "");
        if value.is_empty() {
            None
        } else {
            Some(PathBuf::from(value))
        }
    }

    /// Catalog URL configured as the default source
    pub fn catalog_url(&self) -> Option<String> {
        let value = self.get_string("drill", "url", "");
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }
}
