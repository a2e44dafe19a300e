//! Machine configuration
//!
//! The full capability layout of one machine: pin assignments, heater
//! tuning, tool definitions, leveling method. Built once at startup and
//! validated before any hardware is driven.

mod types;

pub use types::{
    CapabilityKind, ConfigError, HeaterConfig, LevelingMethod, MachineConfig, PinAssignment,
    PinRef, ToolConfig, MAX_CAPABILITIES, MAX_HEATERS, MAX_TOOLS,
};
