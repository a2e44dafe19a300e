//! Software-timed PWM

use tessera_hal::{OutputPin, PwmOutput};

/// PWM generated by toggling a plain digital pin from the shared tick
///
/// The counter cycles through 255 positions; the pin is held high while
/// the counter is below the duty, so a duty of `d` delivers exactly
/// `d / 255` of each period. The carrier frequency is the tick rate
/// divided by 255.
pub struct SoftwarePwm<P> {
    pin: P,
    duty: u8,
    counter: u8,
}

impl<P: OutputPin> SoftwarePwm<P> {
    /// Create the strategy with the output off
    pub fn new(mut pin: P) -> Self {
        pin.set_low();
        Self {
            pin,
            duty: 0,
            counter: 0,
        }
    }
}

impl<P: OutputPin> PwmOutput for SoftwarePwm<P> {
    fn set_duty(&mut self, duty: u8) {
        self.duty = duty;
        if duty == 0 {
            // Kill the output immediately instead of waiting for the
            // counter to pass the old edge
            self.pin.set_low();
        }
    }

    fn duty(&self) -> u8 {
        self.duty
    }

    fn on_pwm_tick(&mut self) {
        self.pin.set_state(self.counter < self.duty);
        self.counter = if self.counter >= 254 {
            0
        } else {
            self.counter + 1
        };
    }
}
