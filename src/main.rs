mod config;
mod control;
mod error;
mod gpio;
mod monitor;
mod screen;
mod signals;

use std::io::Write;
use std::path::PathBuf;
use std::process;

use chrono::Local;
use clap::Parser;
use log::{error, info};

use crate::config::{Overrides, Settings, DEFAULT_CONFIG_PATH};
use crate::error::{Error, GpioError};
use crate::gpio::{PinSubsystem, RppalGpio};
use crate::screen::{Screen, SCREEN_DEVICE};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\nbuild time ",
    env!("SCREEN_SLEEPER_BUILD_TIME")
);

/// Turns the display backlight on and off following a GPIO input
#[derive(Parser, Debug)]
#[command(author, version = VERSION, about, long_about = None)]
struct Args {
    /// Config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Seconds the input has to stay released before the screen goes off
    #[arg(long, value_name = "SECONDS")]
    delay: Option<u64>,

    /// BCM (not physical) pin number of the input
    #[arg(long, value_name = "GPIO")]
    pin: Option<u8>,

    /// Input level that keeps the screen on, 'high' or 'low'
    #[arg(long)]
    level: Option<String>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            delay: self.delay,
            pin: self.pin,
            level: self.level.clone(),
        }
    }
}

#[tokio::main]
async fn main() {
    setup_logging();
    let args = Args::parse();

    match run(args, RppalGpio::open).await {
        Ok(()) => info!("Stopped"),
        Err(err) => {
            error!("{}", err);
            println!("error: {}", err);
            process::exit(1);
        }
    }
}

/// Settings are resolved before `open` gets a chance to touch the hardware.
async fn run<S, F>(args: Args, open: F) -> Result<(), Error>
where
    S: PinSubsystem,
    F: FnOnce() -> Result<S, GpioError>,
{
    let settings = Settings::load(&args.config, &args.overrides())?;
    info!(
        "Using GPIO {}, trigger level {}, delay {} s",
        settings.pin,
        settings.level,
        settings.delay.as_secs()
    );

    let shutdown = signals::setup_signals();
    let screen = Screen::probe(SCREEN_DEVICE);
    if screen.is_present() {
        info!("Controlling screen device {}", SCREEN_DEVICE);
    }

    control::run(&settings, screen, open, shutdown).await
}

fn setup_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} {}",
                Local::now().format("%d-%m-%Y %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}
