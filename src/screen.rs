use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::ScreenError;

/// Backlight power control of the official Raspberry Pi touch display.
pub const SCREEN_DEVICE: &str = "/sys/class/backlight/rpi_backlight/bl_power";

pub trait Backlight {
    fn set_power(&mut self, on: bool) -> Result<(), ScreenError>;
}

/// The backlight device file. `bl_power` takes "0" for powered and "1" for
/// blanked.
#[derive(Debug)]
pub struct Screen {
    path: PathBuf,
    present: bool,
}

impl Screen {
    /// Checks once whether the device exists. Hosts without the display keep
    /// running, every write is then skipped.
    pub fn probe(path: impl AsRef<Path>) -> Screen {
        let path = path.as_ref().to_path_buf();
        let present = path.exists();

        if !present {
            warn!(
                "Screen device {} not found, screen power will not be changed",
                path.display()
            );
        }

        Screen { path, present }
    }

    pub fn is_present(&self) -> bool {
        self.present
    }
}

impl Backlight for Screen {
    fn set_power(&mut self, on: bool) -> Result<(), ScreenError> {
        if !self.present {
            debug!("Skipping screen power {} on absent device", on);
            return Ok(());
        }

        let data = if on { "0" } else { "1" };

        fs::write(&self.path, data).map_err(|source| ScreenError::Write {
            path: self.path.clone(),
            source,
        })
    }
}
