//! PID temperature controller
//!
//! Velocity-free positional PID with two windup defenses taken together:
//! the accumulated integral drive is clamped to a configured band, and
//! accumulation is frozen while the raw output is saturated in the same
//! direction as the error. The derivative term acts on the measurement,
//! not the error, so a target step never produces a derivative kick.

use serde::{Deserialize, Serialize};

use crate::persist::{Crc32, Snapshot};

/// PID gain set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PidGains {
    /// Proportional gain (duty counts per degree of error)
    pub kp: f32,
    /// Integral gain (duty counts per degree-second)
    pub ki: f32,
    /// Derivative gain (duty counts per degree-per-second)
    pub kd: f32,
}

impl Default for PidGains {
    fn default() -> Self {
        // Generic hotend starting point, expected to be retuned per machine
        Self {
            kp: 20.0,
            ki: 0.6,
            kd: 65.0,
        }
    }
}

/// PID loop state for one heater
#[derive(Debug, Clone)]
pub struct PidController {
    gains: PidGains,
    drive_min: f32,
    drive_max: f32,
    /// Accumulated integral drive, already scaled by ki
    integral: f32,
    last_input: f32,
    primed: bool,
}

impl PidController {
    pub fn new(gains: PidGains, drive_min: f32, drive_max: f32) -> Self {
        Self {
            gains,
            drive_min,
            drive_max,
            integral: 0.0,
            last_input: 0.0,
            primed: false,
        }
    }

    /// Current gains
    pub fn gains(&self) -> PidGains {
        self.gains
    }

    /// Replace the gains; loop state is reset because the old integral
    /// is meaningless under new scaling
    pub fn set_gains(&mut self, gains: PidGains) {
        self.gains = gains;
        self.reset();
    }

    /// Clear accumulated state (target removed or fault cleared)
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.primed = false;
    }

    /// Run one PID iteration and return the duty in `[0, 255]`
    pub fn update(&mut self, target: f32, current: f32, dt_s: f32) -> u8 {
        let error = target - current;

        let derivative = if self.primed && dt_s > 0.0 {
            self.gains.kd * (current - self.last_input) / dt_s
        } else {
            0.0
        };
        self.last_input = current;
        self.primed = true;

        let raw = self.gains.kp * error + self.integral - derivative;
        let saturated_high = raw >= 255.0 && error > 0.0;
        let saturated_low = raw <= 0.0 && error < 0.0;
        if !saturated_high && !saturated_low {
            self.integral = (self.integral + self.gains.ki * error * dt_s)
                .clamp(self.drive_min, self.drive_max);
        }

        let output = self.gains.kp * error + self.integral - derivative;
        output.clamp(0.0, 255.0) as u8
    }
}

const GAINS_MAGIC: u32 = 0x54474E53; // "TGNS"
const GAINS_VERSION: u8 = 1;

/// Persisted PID gains
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GainsSnapshot {
    magic: u32,
    version: u8,
    /// Heater index the gains belong to
    pub heater: u8,
    pub gains: PidGains,
    crc: u32,
}

impl GainsSnapshot {
    pub fn new(heater: u8, gains: PidGains) -> Self {
        Self {
            magic: GAINS_MAGIC,
            version: GAINS_VERSION,
            heater,
            gains,
            crc: 0,
        }
    }

    fn checksum(&self) -> u32 {
        let mut crc = Crc32::new();
        crc.update(&self.magic.to_le_bytes());
        crc.update(&[self.version, self.heater]);
        crc.update_f32(self.gains.kp);
        crc.update_f32(self.gains.ki);
        crc.update_f32(self.gains.kd);
        crc.finalize()
    }
}

impl Snapshot for GainsSnapshot {
    fn seal(&mut self) {
        self.crc = self.checksum();
    }

    fn verify(&self) -> bool {
        self.magic == GAINS_MAGIC && self.version == GAINS_VERSION && self.crc == self.checksum()
    }
}
