//! Stepper axis channel

use tessera_hal::{InputPin, OutputPin};

use crate::endstop::Endstop;

/// Travel direction along an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Toward the maximum endstop
    Forward,
    /// Toward the minimum endstop
    Reverse,
}

/// Step/dir/enable driver for one axis with endstop gating
///
/// The motion layer owns the step timing; this type owns the pins and
/// refuses to step into a pressed limit switch. The enable line is
/// wrapped in the polarity adapter by the board assembly when the driver
/// is enable-low, which most are.
pub struct Stepper<S, D, E, L> {
    step: S,
    dir: D,
    enable_pin: E,
    min_stop: Option<Endstop<L>>,
    max_stop: Option<Endstop<L>>,
    direction: Direction,
    enabled: bool,
}

impl<S, D, E, L> Stepper<S, D, E, L>
where
    S: OutputPin,
    D: OutputPin,
    E: OutputPin,
    L: InputPin,
{
    pub fn new(
        step: S,
        dir: D,
        mut enable_pin: E,
        min_stop: Option<Endstop<L>>,
        max_stop: Option<Endstop<L>>,
    ) -> Self {
        enable_pin.set_low();
        Self {
            step,
            dir,
            enable_pin,
            min_stop,
            max_stop,
            direction: Direction::Forward,
            enabled: false,
        }
    }

    /// Power the driver
    pub fn enable(&mut self) {
        self.enable_pin.set_high();
        self.enabled = true;
    }

    /// Release the driver (axis can be moved by hand)
    pub fn disable(&mut self) {
        self.enable_pin.set_low();
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Latch the travel direction onto the dir pin
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
        self.dir.set_state(direction == Direction::Forward);
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Sample the minimum-limit switch (homing)
    pub fn min_triggered(&mut self) -> bool {
        self.min_stop.as_mut().map(Endstop::triggered).unwrap_or(false)
    }

    /// Sample the maximum-limit switch
    pub fn max_triggered(&mut self) -> bool {
        self.max_stop.as_mut().map(Endstop::triggered).unwrap_or(false)
    }

    /// The endstop in the current travel direction, if pressed
    fn blocked(&mut self) -> bool {
        match self.direction {
            Direction::Forward => self.max_triggered(),
            Direction::Reverse => self.min_triggered(),
        }
    }

    /// Emit one step pulse; returns false when the driver is off or the
    /// limit in the travel direction is pressed
    pub fn step(&mut self) -> bool {
        if !self.enabled || self.blocked() {
            return false;
        }
        self.step.set_high();
        self.step.set_low();
        true
    }
}
