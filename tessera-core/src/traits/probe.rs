//! Bed probe trait
//!
//! The physical probing routine (deploy, approach, retract) belongs to the
//! motion layer. The leveling engine only needs the result: a Z deviation
//! at a requested XY coordinate, or the knowledge that the point cannot be
//! reached.

/// Errors that abort an in-progress measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProbeError {
    /// Probe failed to trigger at a reachable point
    NotTriggered,
    /// Probe hardware reported a fault
    Hardware,
}

/// Outcome of probing a single point
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProbeOutcome {
    /// Probe triggered; measured Z deviation in mm (bumps up are negative)
    Triggered(f32),
    /// Point is outside the probeable area; skip it
    OutOfReach,
}

/// Trait for the external probing capability
///
/// `probe_at` may block the command context for the physical duration of
/// the move and probe (seconds). There is no timeout at this layer;
/// failure to trigger is reported as an error by the implementation.
pub trait Probe {
    /// Probe the bed at printer coordinates (x, y)
    fn probe_at(&mut self, x: f32, y: f32) -> Result<ProbeOutcome, ProbeError>;
}
