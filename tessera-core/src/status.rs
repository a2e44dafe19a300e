//! Interrupt-safe status cells
//!
//! Fields mutated by the timer-interrupt context but read by the command
//! context are modeled as explicit atomic cells. Per field: the control
//! tick is the only writer; the command context only ever reads. On the
//! single-core targets this firmware runs on, relaxed ordering is
//! sufficient — each field is independently consistent and no reader
//! derives decisions from cross-field ordering.

use core::sync::atomic::{AtomicI32, AtomicU8, Ordering};

use crate::traits::HeaterState;

/// Snapshot cell for one heater
///
/// Temperatures are stored as centi-degrees so they fit an atomic integer
/// without bit-casting floats.
#[derive(Debug)]
pub struct HeaterStatusCell {
    state: AtomicU8,
    temp_centi: AtomicI32,
    target_centi: AtomicI32,
    duty: AtomicU8,
}

impl Default for HeaterStatusCell {
    fn default() -> Self {
        Self::new()
    }
}

impl HeaterStatusCell {
    /// Create a cell in the Idle state
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(HeaterState::Idle as u8),
            temp_centi: AtomicI32::new(0),
            target_centi: AtomicI32::new(0),
            duty: AtomicU8::new(0),
        }
    }

    /// Publish a new snapshot (tick context only)
    pub fn publish(&self, state: HeaterState, temperature: f32, target: f32, duty: u8) {
        self.temp_centi
            .store((temperature * 100.0) as i32, Ordering::Relaxed);
        self.target_centi
            .store((target * 100.0) as i32, Ordering::Relaxed);
        self.duty.store(duty, Ordering::Relaxed);
        self.state.store(state.as_u8(), Ordering::Relaxed);
    }

    /// Current state
    pub fn state(&self) -> HeaterState {
        HeaterState::from_u8(self.state.load(Ordering::Relaxed)).unwrap_or(HeaterState::SensorFault)
    }

    /// Most recent temperature in degrees Celsius
    pub fn temperature(&self) -> f32 {
        self.temp_centi.load(Ordering::Relaxed) as f32 / 100.0
    }

    /// Current target in degrees Celsius
    pub fn target(&self) -> f32 {
        self.target_centi.load(Ordering::Relaxed) as f32 / 100.0
    }

    /// Duty currently driven to the actuator
    pub fn duty(&self) -> u8 {
        self.duty.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_read() {
        let cell = HeaterStatusCell::new();
        cell.publish(HeaterState::Heating, 123.25, 200.0, 187);

        assert_eq!(cell.state(), HeaterState::Heating);
        assert_eq!(cell.temperature(), 123.25);
        assert_eq!(cell.target(), 200.0);
        assert_eq!(cell.duty(), 187);
    }

    #[test]
    fn test_default_is_idle() {
        let cell = HeaterStatusCell::default();
        assert_eq!(cell.state(), HeaterState::Idle);
        assert_eq!(cell.duty(), 0);
    }
}
