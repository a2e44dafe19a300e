//! Configuration types

use heapless::Vec;

use crate::heat::PidGains;
use crate::leveling::{GridConfig, PlanePoint};
use crate::motion::Position;

/// Maximum heaters on one machine
pub const MAX_HEATERS: usize = 4;
/// Maximum tools on one machine
pub const MAX_TOOLS: usize = 4;
/// Maximum declared pin capabilities
pub const MAX_CAPABILITIES: usize = 32;

/// A physical pin with its polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinRef {
    /// Board-level pin number
    pub pin: u8,
    /// Active-low wiring
    pub inverted: bool,
}

impl PinRef {
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
        }
    }

    pub const fn inverted(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
        }
    }
}

/// The role a declared pin plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CapabilityKind {
    /// Plain digital output
    Output,
    /// Software-timed PWM output
    PwmSoftware,
    /// Hardware peripheral PWM output
    PwmHardware,
    /// Software PWM with a full-power kickstart burst
    PwmKickstart,
    /// Analog input channel (temperature sensing)
    AnalogInput,
    /// Axis limit switch
    Endstop,
    /// Stepper step pulse
    StepperStep,
    /// Stepper direction
    StepperDir,
    /// Stepper driver enable
    StepperEnable,
}

/// One declared pin capability
///
/// The catalog of these is the board wiring description; startup walks it
/// to construct the matching driver for each role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinAssignment {
    pub kind: CapabilityKind,
    pub pin: PinRef,
}

/// Tuning and safety limits for one heater
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeaterConfig {
    /// PID gains
    pub gains: PidGains,
    /// Readings above this are treated as a sensor fault, and targets
    /// above it are rejected
    pub max_temp: f32,
    /// Upper clamp on the written duty
    pub max_pwm: u8,
    /// Decouple supervision only runs while the duty is at least this
    pub min_duty: u8,
    /// Lower clamp on the accumulated integral drive
    pub drive_min: f32,
    /// Upper clamp on the accumulated integral drive
    pub drive_max: f32,
    /// Longest tolerated interval without a 1 degree rise while heating
    pub decouple_timeout_ms: u32,
    /// Half-width of the at-target band in degrees Celsius
    pub tolerance: f32,
}

impl Default for HeaterConfig {
    fn default() -> Self {
        Self {
            gains: PidGains::default(),
            max_temp: 275.0,
            max_pwm: 255,
            min_duty: 64,
            drive_min: 40.0,
            drive_max: 230.0,
            decouple_timeout_ms: 12_000,
            tolerance: 2.0,
        }
    }
}

/// One selectable tool
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ToolConfig {
    /// Offset from the carriage reference point
    pub offset: Position,
    /// Filament diameter in mm (extruding tools)
    pub filament_diameter: f32,
    /// Axis feedrate ceiling in mm/s
    pub max_feedrate: f32,
    /// Acceleration ceiling in mm/s^2
    pub acceleration: f32,
    /// Instant velocity change allowance in mm/s
    pub yank: f32,
    /// Index into the heater table, if this tool is heated
    pub heater: Option<u8>,
    /// G-code fragment run when the tool is selected
    pub start_script: heapless::String<64>,
    /// G-code fragment run when the tool is deselected
    pub end_script: heapless::String<64>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            offset: Position::new(0.0, 0.0, 0.0),
            filament_diameter: 1.75,
            max_feedrate: 100.0,
            acceleration: 1000.0,
            yank: 5.0,
            heater: None,
            start_script: heapless::String::new(),
            end_script: heapless::String::new(),
        }
    }
}

/// The configured leveling method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LevelingMethod {
    None,
    Grid,
    ThreePoint,
    FourPointSymmetric,
}

/// Configuration validation failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Two capabilities claim the same pin
    DuplicatePin(u8),
    /// Grid rectangle is empty or inverted
    InvalidGridBounds,
    /// degrade_end is not below degrade_start
    InvertedDegradeRange,
    /// No tools defined
    NoTools,
    /// A tool references a heater index outside the heater table
    BadHeaterIndex(u8),
    /// Heater limits are inconsistent
    InvalidHeater(u8),
    /// Tool geometry is inconsistent
    InvalidTool(u8),
    /// Plane methods need their probe points configured
    MissingPlanePoints,
}

/// Complete machine description
#[derive(Debug, Clone, PartialEq)]
pub struct MachineConfig {
    pub capabilities: Vec<PinAssignment, MAX_CAPABILITIES>,
    pub heaters: Vec<HeaterConfig, MAX_HEATERS>,
    pub tools: Vec<ToolConfig, MAX_TOOLS>,
    pub leveling: LevelingMethod,
    pub grid: GridConfig,
    pub plane_points: Vec<PlanePoint, 4>,
    /// Control ticks run every Nth PWM tick
    pub control_divider: u32,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            capabilities: Vec::new(),
            heaters: Vec::new(),
            tools: Vec::new(),
            leveling: LevelingMethod::None,
            grid: GridConfig::default(),
            plane_points: Vec::new(),
            control_divider: 500,
        }
    }
}

impl MachineConfig {
    /// Check the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, a) in self.capabilities.iter().enumerate() {
            for b in self.capabilities.iter().skip(i + 1) {
                if a.pin.pin == b.pin.pin {
                    return Err(ConfigError::DuplicatePin(a.pin.pin));
                }
            }
        }

        if self.tools.is_empty() {
            return Err(ConfigError::NoTools);
        }
        for (i, tool) in self.tools.iter().enumerate() {
            if let Some(h) = tool.heater {
                if usize::from(h) >= self.heaters.len() {
                    return Err(ConfigError::BadHeaterIndex(h));
                }
            }
            if tool.filament_diameter <= 0.0
                || tool.max_feedrate <= 0.0
                || tool.acceleration <= 0.0
            {
                return Err(ConfigError::InvalidTool(i as u8));
            }
        }

        for (i, h) in self.heaters.iter().enumerate() {
            if h.max_temp <= 0.0
                || h.tolerance <= 0.0
                || h.decouple_timeout_ms == 0
                || h.drive_min > h.drive_max
            {
                return Err(ConfigError::InvalidHeater(i as u8));
            }
        }

        if matches!(self.leveling, LevelingMethod::Grid) {
            if self.grid.x_min >= self.grid.x_max || self.grid.y_min >= self.grid.y_max {
                return Err(ConfigError::InvalidGridBounds);
            }
            if self.grid.degrade_start > 0.0 && self.grid.degrade_end >= self.grid.degrade_start {
                return Err(ConfigError::InvertedDegradeRange);
            }
        }
        match self.leveling {
            LevelingMethod::ThreePoint if self.plane_points.len() < 3 => {
                return Err(ConfigError::MissingPlanePoints)
            }
            LevelingMethod::FourPointSymmetric if self.plane_points.len() < 4 => {
                return Err(ConfigError::MissingPlanePoints)
            }
            _ => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> MachineConfig {
        let mut config = MachineConfig::default();
        config.heaters.push(HeaterConfig::default()).unwrap();
        config
            .tools
            .push(ToolConfig {
                heater: Some(0),
                ..ToolConfig::default()
            })
            .unwrap();
        config
    }

    #[test]
    fn test_minimal_config_validates() {
        assert_eq!(minimal().validate(), Ok(()));
    }

    #[test]
    fn test_no_tools_rejected() {
        let mut config = minimal();
        config.tools.clear();
        assert_eq!(config.validate(), Err(ConfigError::NoTools));
    }

    #[test]
    fn test_duplicate_pin_rejected() {
        let mut config = minimal();
        config
            .capabilities
            .push(PinAssignment {
                kind: CapabilityKind::PwmSoftware,
                pin: PinRef::new(12),
            })
            .unwrap();
        config
            .capabilities
            .push(PinAssignment {
                kind: CapabilityKind::Endstop,
                pin: PinRef::inverted(12),
            })
            .unwrap();
        assert_eq!(config.validate(), Err(ConfigError::DuplicatePin(12)));
    }

    #[test]
    fn test_bad_heater_index_rejected() {
        let mut config = minimal();
        config.tools[0].heater = Some(3);
        assert_eq!(config.validate(), Err(ConfigError::BadHeaterIndex(3)));
    }

    #[test]
    fn test_grid_bounds_checked_for_grid_method() {
        let mut config = minimal();
        config.leveling = LevelingMethod::Grid;
        config.grid.x_max = config.grid.x_min;
        assert_eq!(config.validate(), Err(ConfigError::InvalidGridBounds));
    }

    #[test]
    fn test_degrade_band_must_shrink_inward() {
        let mut config = minimal();
        config.leveling = LevelingMethod::Grid;
        config.grid.degrade_start = 5.0;
        config.grid.degrade_end = 8.0;
        assert_eq!(config.validate(), Err(ConfigError::InvertedDegradeRange));
    }

    #[test]
    fn test_plane_methods_need_points() {
        let mut config = minimal();
        config.leveling = LevelingMethod::ThreePoint;
        assert_eq!(config.validate(), Err(ConfigError::MissingPlanePoints));
    }
}
