use log::info;
use rppal::gpio::{Gpio, InputPin, Level, Trigger};
use tokio::time::Duration;

use crate::config::Pull;
use crate::error::GpioError;

/// Access to the pin hardware. Dropping it closes the subsystem.
pub trait PinSubsystem {
    type Input: PinInput;

    /// Configures `pin` (BCM numbering) as an input with the given pull resistor.
    fn input(&self, pin: u8, pull: Pull) -> Result<Self::Input, GpioError>;
}

/// A configured input pin as seen by the debounce monitor.
pub trait PinInput: Send + 'static {
    fn arm_edge_detection(&mut self) -> Result<(), GpioError>;

    /// Whether at least one edge occurred since the previous call.
    fn edge_detected(&mut self) -> Result<bool, GpioError>;

    fn read(&mut self) -> Result<Level, GpioError>;
}

#[derive(Debug)]
pub struct RppalGpio {
    gpio: Gpio,
}

impl RppalGpio {
    pub fn open() -> Result<RppalGpio, GpioError> {
        let gpio = Gpio::new().map_err(GpioError::Open)?;
        info!("GPIO opened");

        Ok(RppalGpio { gpio })
    }
}

impl Drop for RppalGpio {
    fn drop(&mut self) {
        info!("GPIO closed");
    }
}

impl PinSubsystem for RppalGpio {
    type Input = RppalInput;

    fn input(&self, pin: u8, pull: Pull) -> Result<RppalInput, GpioError> {
        let gpio_pin = self
            .gpio
            .get(pin)
            .map_err(|source| GpioError::Configure { pin, source })?;

        let input = match pull {
            Pull::Up => gpio_pin.into_input_pullup(),
            Pull::Down => gpio_pin.into_input_pulldown(),
        };
        info!("GPIO {} configured as input with pull {:?}", pin, pull);

        Ok(RppalInput { pin, input })
    }
}

#[derive(Debug)]
pub struct RppalInput {
    pin: u8,
    input: InputPin,
}

impl PinInput for RppalInput {
    fn arm_edge_detection(&mut self) -> Result<(), GpioError> {
        self.input
            .set_interrupt(Trigger::Both)
            .map_err(|source| GpioError::Arm {
                pin: self.pin,
                source,
            })
    }

    fn edge_detected(&mut self) -> Result<bool, GpioError> {
        let mut detected = false;

        // Zero timeout keeps this a non-blocking check. Drain the queue so a
        // burst of bounces counts as a single edge.
        while self
            .input
            .poll_interrupt(false, Some(Duration::ZERO))
            .map_err(|source| GpioError::Read {
                pin: self.pin,
                source,
            })?
            .is_some()
        {
            detected = true;
        }

        Ok(detected)
    }

    fn read(&mut self) -> Result<Level, GpioError> {
        Ok(self.input.read())
    }
}
