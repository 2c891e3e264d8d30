use std::fs::File;
use std::path::Path;
use std::str::FromStr;

use log::{debug, warn};
use rppal::gpio::Level;
use serde::Deserialize;
use tokio::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/screen-sleeper/config.yml";

/// Settings as they appear in the YAML config file. Every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct FileConfig {
    pub delay: Option<u64>,
    pub pin: Option<u8>,
    #[serde(alias = "level")]
    pub trigger: Option<String>,
}

impl FileConfig {
    /// Reads the config file. A file that cannot be opened is not an error, the
    /// command line alone then has to supply the settings.
    pub fn load(path: &Path) -> Result<FileConfig, ConfigError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) => {
                warn!("Ignoring config file {}: {}", path.display(), err);
                return Ok(FileConfig::default());
            }
        };

        // An empty file deserializes to unit, not to a mapping.
        if file.metadata().map(|meta| meta.len() == 0).unwrap_or(false) {
            return Ok(FileConfig::default());
        }

        serde_yaml::from_reader(file).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Command line values. Zero and empty values mean "not given".
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub delay: Option<u64>,
    pub pin: Option<u8>,
    pub level: Option<String>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TriggerLevel {
    High,
    Low,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Pull {
    Up,
    Down,
}

impl TriggerLevel {
    /// Pull resistor holding the pin away from the trigger level while idle.
    pub fn idle_pull(self) -> Pull {
        match self {
            TriggerLevel::High => Pull::Down,
            TriggerLevel::Low => Pull::Up,
        }
    }

    pub fn is_asserted(self, level: Level) -> bool {
        matches!(
            (self, level),
            (TriggerLevel::High, Level::High) | (TriggerLevel::Low, Level::Low)
        )
    }
}

impl FromStr for TriggerLevel {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "high" => Ok(TriggerLevel::High),
            "low" => Ok(TriggerLevel::Low),
            other => Err(ConfigError::InvalidLevel {
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for TriggerLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TriggerLevel::High => write!(f, "high"),
            TriggerLevel::Low => write!(f, "low"),
        }
    }
}

/// Effective settings, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub pin: u8,
    pub delay: Duration,
    pub level: TriggerLevel,
}

impl Settings {
    pub fn resolve(file: FileConfig, overrides: &Overrides) -> Result<Settings, ConfigError> {
        let delay = match overrides.delay {
            Some(delay) if delay > 0 => delay,
            _ => file.delay.unwrap_or(0),
        };

        let pin = match overrides.pin {
            Some(pin) if pin > 0 => pin,
            _ => file.pin.unwrap_or(0),
        };

        let level = match overrides.level.as_deref() {
            Some(level) if !level.is_empty() => level.to_string(),
            _ => file.trigger.unwrap_or_default(),
        };

        let level = if level.is_empty() {
            TriggerLevel::High
        } else {
            level.parse()?
        };

        let settings = Settings {
            pin,
            delay: Duration::from_secs(delay),
            level,
        };
        debug!("Resolved {:?}", settings);

        Ok(settings)
    }

    pub fn load(path: &Path, overrides: &Overrides) -> Result<Settings, ConfigError> {
        Settings::resolve(FileConfig::load(path)?, overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn temp_config(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "screen-sleeper-{}-{}.yml",
            std::process::id(),
            name
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn reads_all_keys_from_file() {
        let path = temp_config("all-keys", "delay: 30\npin: 17\ntrigger: low\n");

        let settings = Settings::load(&path, &Overrides::default()).unwrap();

        assert_eq!(
            settings,
            Settings {
                pin: 17,
                delay: Duration::from_secs(30),
                level: TriggerLevel::Low,
            }
        );
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn accepts_level_as_key_name() {
        let path = temp_config("level-key", "level: low\n");

        let file = FileConfig::load(&path).unwrap();

        assert_eq!(file.trigger.as_deref(), Some("low"));
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("screen-sleeper-does-not-exist.yml");

        let settings = Settings::load(&path, &Overrides::default()).unwrap();

        assert_eq!(settings.pin, 0);
        assert_eq!(settings.delay, Duration::ZERO);
        assert_eq!(settings.level, TriggerLevel::High);
    }

    #[test]
    fn empty_file_falls_back_to_defaults() {
        let path = temp_config("empty", "");

        assert_eq!(FileConfig::load(&path).unwrap(), FileConfig::default());
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = temp_config("malformed", "delay: [not, a, number\n");

        let result = FileConfig::load(&path);

        assert!(matches!(result, Err(ConfigError::Parse { .. })));
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn flags_override_file_values() {
        let file = FileConfig {
            delay: Some(30),
            pin: Some(17),
            trigger: Some("low".to_string()),
        };
        let overrides = Overrides {
            delay: Some(5),
            pin: Some(4),
            level: Some("high".to_string()),
        };

        let settings = Settings::resolve(file, &overrides).unwrap();

        assert_eq!(settings.pin, 4);
        assert_eq!(settings.delay, Duration::from_secs(5));
        assert_eq!(settings.level, TriggerLevel::High);
    }

    #[test]
    fn zero_and_empty_flags_do_not_override() {
        let file = FileConfig {
            delay: Some(30),
            pin: Some(17),
            trigger: Some("low".to_string()),
        };
        let overrides = Overrides {
            delay: Some(0),
            pin: Some(0),
            level: Some(String::new()),
        };

        let settings = Settings::resolve(file, &overrides).unwrap();

        assert_eq!(settings.pin, 17);
        assert_eq!(settings.delay, Duration::from_secs(30));
        assert_eq!(settings.level, TriggerLevel::Low);
    }

    #[test]
    fn invalid_level_in_file_is_rejected() {
        let path = temp_config("invalid-level", "trigger: mid\n");

        let result = Settings::load(&path, &Overrides::default());

        match result {
            Err(ConfigError::InvalidLevel { value }) => assert_eq!(value, "mid"),
            other => panic!("unexpected result: {:?}", other),
        }
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn flag_can_repair_invalid_file_level() {
        let file = FileConfig {
            trigger: Some("mid".to_string()),
            ..FileConfig::default()
        };
        let overrides = Overrides {
            level: Some("low".to_string()),
            ..Overrides::default()
        };

        let settings = Settings::resolve(file, &overrides).unwrap();

        assert_eq!(settings.level, TriggerLevel::Low);
    }

    #[test]
    fn pull_opposes_trigger_level() {
        assert_eq!(TriggerLevel::High.idle_pull(), Pull::Down);
        assert_eq!(TriggerLevel::Low.idle_pull(), Pull::Up);
    }

    #[test]
    fn asserted_when_level_matches_trigger() {
        assert!(TriggerLevel::High.is_asserted(Level::High));
        assert!(!TriggerLevel::High.is_asserted(Level::Low));
        assert!(TriggerLevel::Low.is_asserted(Level::Low));
        assert!(!TriggerLevel::Low.is_asserted(Level::High));
    }
}
