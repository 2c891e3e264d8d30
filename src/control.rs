use log::{debug, info, warn};
use tokio::select;
use tokio::sync::mpsc::{self, Receiver};
use tokio_util::sync::CancellationToken;

use crate::config::Settings;
use crate::error::{Error, GpioError, ScreenError};
use crate::gpio::{PinInput, PinSubsystem};
use crate::monitor::DebounceMonitor;
use crate::screen::Backlight;

const EVENT_QUEUE_DEPTH: usize = 16;

/// Sole writer of the screen. Powers the screen on when created and again when
/// dropped, and skips writes that would not change the commanded state.
#[derive(Debug)]
pub struct ScreenGuard<B: Backlight> {
    backlight: B,
    on: bool,
}

impl<B: Backlight> ScreenGuard<B> {
    pub fn engage(mut backlight: B) -> Result<ScreenGuard<B>, ScreenError> {
        backlight.set_power(true)?;

        Ok(ScreenGuard {
            backlight,
            on: true,
        })
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn set(&mut self, on: bool) -> Result<(), ScreenError> {
        if on == self.is_on() {
            debug!("Screen already {}", if on { "on" } else { "off" });
            return Ok(());
        }

        self.backlight.set_power(on)?;
        self.on = on;
        info!("Screen turned {}", if on { "on" } else { "off" });

        Ok(())
    }
}

impl<B: Backlight> Drop for ScreenGuard<B> {
    fn drop(&mut self) {
        match self.backlight.set_power(true) {
            Ok(()) => debug!("Screen restored to on"),
            Err(err) => warn!("Failed to restore screen: {}", err),
        }
    }
}

/// Runs until `shutdown` is cancelled or something fails.
///
/// The screen is powered on before `open` touches the pin hardware and is
/// powered on again on every way out of this function.
pub async fn run<S, B, F>(
    settings: &Settings,
    backlight: B,
    open: F,
    shutdown: CancellationToken,
) -> Result<(), Error>
where
    S: PinSubsystem,
    B: Backlight,
    F: FnOnce() -> Result<S, GpioError>,
{
    let mut screen = ScreenGuard::engage(backlight)?;

    let gpio = open()?;
    let mut pin = gpio.input(settings.pin, settings.level.idle_pull())?;
    pin.arm_edge_detection()?;

    let (sender, receiver) = mpsc::channel(EVENT_QUEUE_DEPTH);
    let cancellation_token = CancellationToken::new();
    let monitor = DebounceMonitor::new(pin, settings.level, settings.delay);
    let monitor = tokio::spawn(monitor.run(sender, cancellation_token.clone()));

    let looped = {
        let _cancel_monitor = cancellation_token.drop_guard();
        event_loop(&mut screen, receiver, &shutdown).await
    };

    let monitored = monitor.await;
    drop(gpio);

    looped?;
    monitored??;

    Ok(())
}

async fn event_loop<B: Backlight>(
    screen: &mut ScreenGuard<B>,
    mut events: Receiver<bool>,
    shutdown: &CancellationToken,
) -> Result<(), Error> {
    loop {
        select! {
            event = events.recv() => match event {
                Some(on) => screen.set(on)?,
                None => {
                    debug!("Pin monitor closed its channel");
                    return Ok(());
                }
            },
            _ = shutdown.cancelled() => {
                info!("Shutting down");
                return Ok(());
            }
        }
    }
}
