//! Configuration management for feedline.
//!
//! Configuration is read from `~/.config/feedline/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Duration;
use chrono_tz::Tz;
use serde::Deserialize;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub display: DisplayConfig,
    pub fetch: FetchConfig,
    pub retention: RetentionConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file; defaults to `<data dir>/feedline/feedline.db`.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// IANA zone used to bucket entries into calendar days.
    pub timezone: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Feed sources fetched concurrently during one refresh.
    pub workers: usize,
    /// Upper bound for one feed source, connect to last byte.
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Responses larger than this are rejected.
    pub max_feed_bytes: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            timeout_secs: 20,
            user_agent: concat!("feedline/", env!("CARGO_PKG_VERSION")).to_string(),
            max_feed_bytes: 5 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Entries published longer ago than this are deleted.
    pub horizon_days: i64,
    /// Minimum time between two sweeps.
    pub interval_hours: i64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            horizon_days: 90,
            interval_hours: 24,
        }
    }
}

/// About a century.
const MAX_HORIZON_DAYS: i64 = 36_500;
/// One year.
const MAX_INTERVAL_HOURS: i64 = 8_760;

impl RetentionConfig {
    pub fn horizon(&self) -> Result<Duration, ConfigError> {
        Self::bounded("horizon_days", self.horizon_days, MAX_HORIZON_DAYS, Duration::try_days)
    }

    pub fn interval(&self) -> Result<Duration, ConfigError> {
        Self::bounded(
            "interval_hours",
            self.interval_hours,
            MAX_INTERVAL_HOURS,
            Duration::try_hours,
        )
    }

    fn bounded(
        field: &str,
        value: i64,
        max: i64,
        to_duration: fn(i64) -> Option<Duration>,
    ) -> Result<Duration, ConfigError> {
        if !(1..=max).contains(&value) {
            return Err(ConfigError::InvalidRetention(format!(
                "{field} must be between 1 and {max}, got {value}"
            )));
        }
        to_duration(value)
            .ok_or_else(|| ConfigError::InvalidRetention(format!("{field} is out of range")))
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.timezone()?;
        config.retention.horizon()?;
        config.retention.interval()?;
        Ok(config)
    }

    /// Get the default config file path: `~/.config/feedline/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("feedline").join("config.toml"))
    }

    /// The viewer time zone.
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.display
            .timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::InvalidTimezone(self.display.timezone.clone()))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    fn default_config_content() -> String {
        r##"# feedline configuration

[database]
# SQLite database file. Defaults to the platform data directory.
# path = "/var/lib/feedline/feedline.db"

[display]
# Time zone used to group entries by calendar day (IANA name).
timezone = "UTC"

[fetch]
# Feed sources fetched in parallel during one refresh
workers = 10

# Per-source timeout in seconds
timeout_secs = 20

# Largest accepted feed document in bytes
max_feed_bytes = 5242880

[retention]
# Entries older than this many days are deleted
horizon_days = 90

# Minimum hours between two retention sweeps
interval_hours = 24
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Unknown time zone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid retention setting: {0}")]
    InvalidRetention(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("Default config should be valid TOML");

        assert_eq!(config.display.timezone, "UTC");
        assert_eq!(config.fetch.workers, 10);
        assert_eq!(config.fetch.timeout_secs, 20);
        assert_eq!(config.retention.horizon_days, 90);
        assert_eq!(config.retention.interval_hours, 24);
        assert!(config.database.path.is_none());
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[display]
timezone = "Europe/Berlin"
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.timezone().unwrap(), chrono_tz::Europe::Berlin);
        assert_eq!(config.fetch.workers, 10);
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");
        assert_eq!(config.timezone().unwrap(), chrono_tz::UTC);
        assert_eq!(config.fetch.max_feed_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[database]\npath = \"/tmp/feeds.db\"\n[fetch]\nworkers = 3\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.database.path, Some(PathBuf::from("/tmp/feeds.db")));
        assert_eq!(config.fetch.workers, 3);
    }

    #[test]
    fn test_load_rejects_unknown_timezone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[display]\ntimezone = \"Mars/Olympus\"\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidTimezone(_))
        ));
    }

    #[test]
    fn test_retention_bounds() {
        let config = RetentionConfig::default();
        assert_eq!(config.horizon().unwrap(), Duration::days(90));
        assert_eq!(config.interval().unwrap(), Duration::hours(24));

        let rejected = [(-1, 24), (0, 24), (i64::MAX, 24), (90, -5), (90, i64::MAX)];
        for (horizon_days, interval_hours) in rejected {
            let config = RetentionConfig {
                horizon_days,
                interval_hours,
            };
            assert!(
                config.horizon().is_err() || config.interval().is_err(),
                "{horizon_days} days / {interval_hours} hours should be rejected"
            );
        }
    }

    #[test]
    fn test_load_rejects_bad_retention() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        fs::write(&path, "[retention]\nhorizon_days = -1\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidRetention(_))
        ));

        fs::write(&path, "[retention]\nhorizon_days = 9223372036854775807\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidRetention(_))
        ));

        fs::write(&path, "[retention]\ninterval_hours = -24\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidRetention(_))
        ));
    }
}
