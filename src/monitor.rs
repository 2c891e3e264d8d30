use log::{debug, info};
use tokio::select;
use tokio::sync::mpsc::Sender;
use tokio::time::{sleep, Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::config::TriggerLevel;
use crate::error::GpioError;
use crate::gpio::PinInput;

pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Countdown gating the "screen off" decision.
///
/// A delay too large to be added to the current instant yields a countdown
/// that runs but never elapses.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DebounceTimer {
    duration: Duration,
    running: bool,
    deadline: Option<Instant>,
}

impl DebounceTimer {
    pub fn started(duration: Duration, now: Instant) -> DebounceTimer {
        let mut timer = DebounceTimer {
            duration,
            running: false,
            deadline: None,
        };
        timer.restart(now);
        timer
    }

    pub fn restart(&mut self, now: Instant) {
        self.running = true;
        self.deadline = now.checked_add(self.duration);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Returns true exactly once per countdown, on the first call at or after
    /// the deadline.
    pub fn poll_elapsed(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if self.running && now >= deadline => {
                self.running = false;
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MonitorState {
    ArmedWaitingEdge,
    Debouncing,
}

/// Turns raw pin reads into "screen on" / "screen off" decisions.
///
/// An edge that lands on the trigger level wakes the screen at once. An edge
/// that leaves it (re)starts the debounce timer, and the screen is blanked
/// only if the pin is still away from the trigger level when the timer
/// elapses. An asserted edge during the countdown does not stop the timer,
/// the level read at elapse decides.
#[derive(Debug)]
pub struct DebounceMonitor<P: PinInput> {
    pin: P,
    level: TriggerLevel,
    timer: DebounceTimer,
}

impl<P: PinInput> DebounceMonitor<P> {
    /// The timer starts running right away, so an idle pin blanks the screen
    /// one delay after launch.
    pub fn new(pin: P, level: TriggerLevel, delay: Duration) -> DebounceMonitor<P> {
        DebounceMonitor {
            pin,
            level,
            timer: DebounceTimer::started(delay, Instant::now()),
        }
    }

    pub fn state(&self) -> MonitorState {
        if self.timer.is_running() {
            MonitorState::Debouncing
        } else {
            MonitorState::ArmedWaitingEdge
        }
    }

    fn is_asserted(&mut self) -> Result<bool, GpioError> {
        Ok(self.level.is_asserted(self.pin.read()?))
    }

    /// One polling tick: edge flag first, then the timer. Returns the screen
    /// power decision, if any.
    pub fn tick(&mut self, now: Instant) -> Result<Option<bool>, GpioError> {
        if self.pin.edge_detected()? {
            if self.is_asserted()? {
                debug!("Edge to trigger level");
                return Ok(Some(true));
            }

            debug!("Edge away from trigger level, restarting debounce timer");
            self.timer.restart(now);
        }

        if self.timer.poll_elapsed(now) && !self.is_asserted()? {
            return Ok(Some(false));
        }

        Ok(None)
    }

    /// Polls until `cancellation_token` is cancelled or the receiving side is
    /// gone. Pin errors end the task.
    pub async fn run(
        mut self,
        events: Sender<bool>,
        cancellation_token: CancellationToken,
    ) -> Result<(), GpioError> {
        info!(
            "Monitoring pin for level {} with {} s delay",
            self.level,
            self.timer.duration.as_secs()
        );

        while !cancellation_token.is_cancelled() {
            if let Some(on) = self.tick(Instant::now())? {
                debug!("Requesting screen power {}", on);

                select! {
                    biased;

                    _ = cancellation_token.cancelled() => break,
                    sent = events.send(on) => {
                        if sent.is_err() {
                            break;
                        }
                    }
                }
            }

            select! {
                _ = cancellation_token.cancelled() => {}
                _ = sleep(POLL_INTERVAL) => {}
            }
        }

        debug!("Pin monitor stopped in state {:?}", self.state());

        Ok(())
    }
}
