//! Bed leveling engine
//!
//! Learns and applies a correction for bed-surface irregularity. The
//! method is a tagged variant chosen once at startup configuration; all
//! variants implement the identical consumed contract, so the motion
//! layer and the command dispatcher never care which one is active.

pub mod command;
pub mod grid;
pub mod plane;

pub use command::{LevelCommand, LevelReport};
pub use grid::{CellTag, GridConfig, GridLeveling, GridSnapshot, MeasureSummary, GRID_SIZE};
pub use plane::{Plane, PlaneFit, PlaneLeveling, PlanePoint, PlaneSnapshot};

use tessera_hal::{FlashError, KvStore, StorageKey};

use crate::motion::Position;
use crate::persist::{load_snapshot, save_snapshot};
use crate::traits::{Probe, ProbeError};

/// Scratch size for snapshot serialization
const SNAPSHOT_BUF: usize = 192;

/// Errors from leveling operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LevelingError {
    /// Probing aborted the measurement; the prior state is untouched
    Probe(ProbeError),
    /// Measurement finished with no reachable point at all
    NoPointsMeasured,
    /// A required plane point was unreachable
    PointUnreachable,
    /// Probe points do not define a plane
    DegeneratePoints,
    /// Coordinates outside the calibrated rectangle
    OutsideGrid,
    /// Command not supported by the active method
    Unsupported,
    /// Persisting the result failed
    Store(FlashError),
}

impl From<ProbeError> for LevelingError {
    fn from(err: ProbeError) -> Self {
        LevelingError::Probe(err)
    }
}

impl From<FlashError> for LevelingError {
    fn from(err: FlashError) -> Self {
        LevelingError::Store(err)
    }
}

/// The active leveling method
///
/// Selected once at startup from configuration and never changed at
/// runtime.
pub enum Leveling {
    /// Leveling disabled entirely; all corrections are zero
    None,
    /// Persisted distortion grid with extrapolation
    Grid(GridLeveling),
    /// Single plane fitted through four symmetric points
    FourPointSymmetric(PlaneLeveling),
    /// Single plane fitted through three points
    ThreePoint(PlaneLeveling),
}

impl Leveling {
    fn as_plane(&self) -> Option<&PlaneLeveling> {
        match self {
            Leveling::FourPointSymmetric(p) | Leveling::ThreePoint(p) => Some(p),
            _ => None,
        }
    }

    fn as_plane_mut(&mut self) -> Option<&mut PlaneLeveling> {
        match self {
            Leveling::FourPointSymmetric(p) | Leveling::ThreePoint(p) => Some(p),
            _ => None,
        }
    }

    /// Correction at printer coordinates (x, y)
    pub fn distortion_at(&self, xp: f32, yp: f32) -> f32 {
        match self {
            Leveling::None => 0.0,
            Leveling::Grid(g) => g.distortion_at(xp, yp),
            Leveling::FourPointSymmetric(p) | Leveling::ThreePoint(p) => p.distortion_at(xp, yp),
        }
    }

    /// Add the local correction to a commanded position's Z
    pub fn add_distortion(&self, pos: &mut Position) {
        match self {
            Leveling::None => {}
            Leveling::Grid(g) => g.add_distortion(pos),
            Leveling::FourPointSymmetric(p) | Leveling::ThreePoint(p) => p.add_distortion(pos),
        }
    }

    /// Remove the local correction from a machine position's Z
    pub fn sub_distortion(&self, pos: &mut Position) {
        match self {
            Leveling::None => {}
            Leveling::Grid(g) => g.sub_distortion(pos),
            Leveling::FourPointSymmetric(p) | Leveling::ThreePoint(p) => p.sub_distortion(pos),
        }
    }

    /// Whether the correction is currently applied
    pub fn is_distortion_enabled(&self) -> bool {
        match self {
            Leveling::None => false,
            Leveling::Grid(g) => g.is_distortion_enabled(),
            Leveling::FourPointSymmetric(p) | Leveling::ThreePoint(p) => p.is_distortion_enabled(),
        }
    }

    /// Restore persisted state on boot; missing keys are not an error
    pub fn init_from_store<K: KvStore>(&mut self, store: &mut K) -> Result<(), LevelingError> {
        let mut buf = [0u8; SNAPSHOT_BUF];
        match self {
            Leveling::None => Ok(()),
            Leveling::Grid(g) => {
                match load_snapshot::<GridSnapshot, _>(store, StorageKey::DistortionGrid, &mut buf)
                {
                    Ok(snap) => {
                        g.restore(&snap);
                        Ok(())
                    }
                    Err(FlashError::NotFound) => Ok(()),
                    Err(err) => Err(err.into()),
                }
            }
            Leveling::FourPointSymmetric(p) | Leveling::ThreePoint(p) => {
                match load_snapshot::<PlaneSnapshot, _>(store, StorageKey::LevelingState, &mut buf)
                {
                    Ok(snap) => {
                        p.restore(&snap);
                        Ok(())
                    }
                    Err(FlashError::NotFound) => Ok(()),
                    Err(err) => Err(err.into()),
                }
            }
        }
    }

    fn persist<K: KvStore>(&self, store: &mut K) -> Result<(), LevelingError> {
        let mut buf = [0u8; SNAPSHOT_BUF];
        match self {
            Leveling::None => Ok(()),
            Leveling::Grid(g) => {
                let mut snap = g.snapshot();
                save_snapshot(store, StorageKey::DistortionGrid, &mut snap, &mut buf)?;
                Ok(())
            }
            Leveling::FourPointSymmetric(p) | Leveling::ThreePoint(p) => {
                let mut snap = p.snapshot();
                save_snapshot(store, StorageKey::LevelingState, &mut snap, &mut buf)?;
                Ok(())
            }
        }
    }

    /// Execute a command from the external dispatcher
    ///
    /// Runs in the cooperative command context; `Measure` may block for
    /// the physical duration of probing. State-changing commands persist
    /// through `store` before returning.
    pub fn execute<P: Probe, K: KvStore>(
        &mut self,
        cmd: LevelCommand,
        probe: &mut P,
        store: &mut K,
    ) -> Result<LevelReport, LevelingError> {
        if matches!(self, Leveling::None) {
            return Ok(LevelReport::NoMethod);
        }

        let report = match cmd {
            LevelCommand::Measure => match self {
                Leveling::Grid(g) => LevelReport::Measured(g.measure(probe)?),
                _ => {
                    let p = self.as_plane_mut().ok_or(LevelingError::Unsupported)?;
                    p.measure(probe)?;
                    LevelReport::PlaneMeasured(*p.plane())
                }
            },
            LevelCommand::Report => match self {
                Leveling::Grid(g) => LevelReport::Grid(g.snapshot()),
                _ => LevelReport::Plane(*self.as_plane().ok_or(LevelingError::Unsupported)?.plane()),
            },
            LevelCommand::SetPoint { x, y, z } => match self {
                Leveling::Grid(g) => {
                    g.set(x, y, z)?;
                    LevelReport::Done
                }
                _ => return Err(LevelingError::Unsupported),
            },
            LevelCommand::Reset => {
                match self {
                    Leveling::Grid(g) => g.reset(),
                    _ => {
                        if let Some(p) = self.as_plane_mut() {
                            p.reset();
                        }
                    }
                }
                LevelReport::Done
            }
            LevelCommand::SetEnabled(enabled) => {
                match self {
                    Leveling::Grid(g) => g.set_distortion_enabled(enabled),
                    _ => {
                        if let Some(p) = self.as_plane_mut() {
                            p.set_distortion_enabled(enabled);
                        }
                    }
                }
                LevelReport::Enabled(self.is_distortion_enabled())
            }
            LevelCommand::QueryEnabled => return Ok(LevelReport::Enabled(self.is_distortion_enabled())),
        };

        self.persist(store)?;
        Ok(report)
    }
}
