//! Heater channel trait
//!
//! The contract the machine context drives once per control tick, and the
//! operator-interface collaborator uses for targets and fault resets.

/// Heat manager state
///
/// Fault states are terminal until an explicit [`HeaterChannel::reset_fault`]
/// from the operator interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum HeaterState {
    /// No target set, output off
    Idle = 0,
    /// Target set, temperature below the tolerance band
    Heating = 1,
    /// Temperature inside the tolerance band
    AtTarget = 2,
    /// Implausible sensor reading; output forced off
    SensorFault = 3,
    /// Sustained output produced no temperature rise; output forced off
    DecoupledFault = 4,
}

impl HeaterState {
    /// Check if this is a terminal fault state
    pub fn is_fault(self) -> bool {
        matches!(self, HeaterState::SensorFault | HeaterState::DecoupledFault)
    }

    /// Get the state as a byte value (for atomic status cells)
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a state from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(HeaterState::Idle),
            1 => Some(HeaterState::Heating),
            2 => Some(HeaterState::AtTarget),
            3 => Some(HeaterState::SensorFault),
            4 => Some(HeaterState::DecoupledFault),
            _ => None,
        }
    }
}

/// Closed-loop heater contract
///
/// Context rules: `control_tick` and `pwm_tick` run in the timer interrupt
/// and are the only writers of temperature, duty, and state. Everything
/// else runs in the cooperative command context.
pub trait HeaterChannel {
    /// Run one control iteration (read, PID, supervise, write duty)
    fn control_tick(&mut self, now_ms: u32);

    /// Advance the software-PWM time base by one step
    fn pwm_tick(&mut self);

    /// Set the target temperature in degrees Celsius (0 = off)
    fn set_target(&mut self, celsius: f32);

    /// The current target temperature
    fn target(&self) -> f32;

    /// Current state
    fn state(&self) -> HeaterState;

    /// Most recent temperature reading in degrees Celsius
    fn current_temperature(&self) -> f32;

    /// Duty currently written to the actuator
    fn duty(&self) -> u8;

    /// Clear a terminal fault; callable only by the operator interface
    fn reset_fault(&mut self);

    /// True only while state is Heating or AtTarget and the temperature is
    /// within tolerance of the target. Gates extrusion in the motion layer.
    fn is_at_operating_temperature(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_round_trip() {
        for state in [
            HeaterState::Idle,
            HeaterState::Heating,
            HeaterState::AtTarget,
            HeaterState::SensorFault,
            HeaterState::DecoupledFault,
        ] {
            assert_eq!(HeaterState::from_u8(state.as_u8()), Some(state));
        }
        assert_eq!(HeaterState::from_u8(9), None);
    }

    #[test]
    fn test_fault_states() {
        assert!(HeaterState::SensorFault.is_fault());
        assert!(HeaterState::DecoupledFault.is_fault());
        assert!(!HeaterState::Heating.is_fault());
        assert!(!HeaterState::Idle.is_fault());
    }
}
