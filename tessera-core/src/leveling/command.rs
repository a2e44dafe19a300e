//! Leveling command surface
//!
//! Structured commands consumed from the external G-code dispatcher:
//! G32 runs a measurement, G33 reports or edits the correction, M323
//! toggles or queries the enabled flag. Parsing the G-code text is the
//! dispatcher's job; responses are structured values the dispatcher
//! formats for the operator.

use super::grid::{GridSnapshot, MeasureSummary};
use super::plane::Plane;

/// A leveling command from the dispatcher
///
/// The dispatcher must check the machine-idle precondition before issuing
/// `Measure`; probing blocks the command context and must be mutually
/// exclusive with active motion.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LevelCommand {
    /// G32: run a full measurement
    Measure,
    /// G33: report the current correction state
    Report,
    /// G33 X Y Z: set one grid cell directly (grid method only)
    SetPoint { x: f32, y: f32, z: f32 },
    /// G33 R: delete the correction
    Reset,
    /// M323 S0/S1: gate the correction globally
    SetEnabled(bool),
    /// M323: query the enabled flag
    QueryEnabled,
}

/// Structured response to a leveling command
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LevelReport {
    /// Grid measurement finished
    Measured(MeasureSummary),
    /// Plane measurement finished
    PlaneMeasured(Plane),
    /// Full grid state
    Grid(GridSnapshot),
    /// Fitted plane state
    Plane(Plane),
    /// Enabled flag state
    Enabled(bool),
    /// Command acknowledged with no data
    Done,
    /// No leveling method is configured
    NoMethod,
}
