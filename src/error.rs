use std::path::PathBuf;

use thiserror::Error;
use tokio::task::JoinError;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Gpio(#[from] GpioError),

    #[error(transparent)]
    Screen(#[from] ScreenError),

    #[error("Pin monitor task failed: {0}")]
    MonitorTask(#[from] JoinError),
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("invalid level value {value:?}, 'high' or 'low' is required")]
    InvalidLevel { value: String },
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum GpioError {
    #[error("Failed to open GPIO: {0}")]
    Open(#[source] rppal::gpio::Error),

    #[error("Failed to configure GPIO {pin}: {source}")]
    Configure {
        pin: u8,
        source: rppal::gpio::Error,
    },

    #[error("Failed to arm edge detection on GPIO {pin}: {source}")]
    Arm {
        pin: u8,
        source: rppal::gpio::Error,
    },

    #[error("Failed to read GPIO {pin}: {source}")]
    Read {
        pin: u8,
        source: rppal::gpio::Error,
    },
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ScreenError {
    #[error("Failed to write screen device {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
