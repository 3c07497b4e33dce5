use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    forecast::{DEFAULT_DAYS, MAX_DAYS},
    model::Location,
    provider::{open_meteo, sunrise_sunset},
};

/// Where the upstream data comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub sunrise_sunset_url: String,
    pub open_meteo_url: String,
    pub http_timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            sunrise_sunset_url: sunrise_sunset::DEFAULT_BASE_URL.to_string(),
            open_meteo_url: open_meteo::DEFAULT_BASE_URL.to_string(),
            http_timeout_secs: 30,
        }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Number of days to forecast when not given on the command line.
    pub default_days: Option<u8>,

    /// Example TOML:
    /// [home]
    /// name = "Milano"
    /// latitude = 45.4642
    /// longitude = 9.19
    pub home: Option<Location>,

    pub sources: SourceConfig,
}

impl Config {
    /// Configured day count, or the built-in default when unset or out of range.
    pub fn days(&self) -> u8 {
        match self.default_days {
            Some(days) if (1..=MAX_DAYS).contains(&days) => days,
            _ => DEFAULT_DAYS,
        }
    }

    pub fn set_default_days(&mut self, days: u8) -> Result<()> {
        if !(1..=MAX_DAYS).contains(&days) {
            return Err(anyhow!("Default days must be between 1 and {MAX_DAYS}, got {days}."));
        }
        self.default_days = Some(days);
        Ok(())
    }

    pub fn set_home(&mut self, home: Location) {
        self.home = Some(home);
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if let Some(home) = &cfg.home {
            home.coordinate
                .validate()
                .with_context(|| format!("Invalid home location in {}", path.display()))?;
        }

        if cfg.sources.http_timeout_secs == 0 {
            return Err(anyhow!(
                "Invalid http_timeout_secs in {}: must be at least 1.",
                path.display()
            ));
        }

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skyglow", "skyglow")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinate;

    #[test]
    fn days_fall_back_to_default() {
        let mut cfg = Config::default();
        assert_eq!(cfg.days(), DEFAULT_DAYS);

        cfg.default_days = Some(0);
        assert_eq!(cfg.days(), DEFAULT_DAYS);

        cfg.default_days = Some(7);
        assert_eq!(cfg.days(), 7);
    }

    #[test]
    fn set_default_days_rejects_out_of_range() {
        let mut cfg = Config::default();
        let err = cfg.set_default_days(17).unwrap_err();
        assert!(err.to_string().contains("between 1 and 16"));
        assert!(cfg.set_default_days(16).is_ok());
    }

    #[test]
    fn missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_home(Location::new("Torino", Coordinate::new(45.0703, 7.6869).unwrap()));
        cfg.set_default_days(3).unwrap();
        cfg.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[sources]\nhttp_timeout_secs = 5\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.sources.http_timeout_secs, 5);
        assert_eq!(cfg.sources.open_meteo_url, "https://api.open-meteo.com");
        assert!(cfg.home.is_none());
    }

    #[test]
    fn invalid_home_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[home]\nname = \"Bad\"\nlatitude = 95.0\nlongitude = 0.0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Invalid home location"));
    }

    #[test]
    fn zero_http_timeout_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[sources]\nhttp_timeout_secs = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("http_timeout_secs"));
    }
}
