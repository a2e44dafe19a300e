//! Single-plane leveling methods
//!
//! The three-point and four-point-symmetric methods implement the same
//! consumed contract as the grid, but model the bed as one fitted plane
//! `z = a*x + b*y + c`. There is no extrapolation step and no per-cell
//! state to persist - only the coefficients and the enabled flag.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use super::LevelingError;
use crate::float::fabs;
use crate::motion::Position;
use crate::persist::{Crc32, Snapshot};
use crate::traits::{Probe, ProbeOutcome};

/// Magic number identifying a valid plane snapshot ("TPLN")
pub const PLANE_MAGIC: u32 = 0x54504C4E;

/// Current plane snapshot format version
pub const PLANE_VERSION: u8 = 1;

/// Maximum probe points for a plane fit
pub const MAX_PLANE_POINTS: usize = 4;

/// A probe coordinate for plane fitting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlanePoint {
    pub x: f32,
    pub y: f32,
}

/// Fit strategy over the configured points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlaneFit {
    /// Exact plane through three probe points
    ThreePoint,
    /// Four points probed as two opposing pairs; pair slopes are averaged,
    /// which cancels probe noise symmetric about the bed center
    FourPointSymmetric,
}

/// Plane coefficients: z = a*x + b*y + c
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Plane {
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl Plane {
    /// Evaluate the plane at (x, y)
    pub fn z_at(&self, x: f32, y: f32) -> f32 {
        self.a * x + self.b * y + self.c
    }
}

/// Plane-fit leveling engine
pub struct PlaneLeveling {
    fit: PlaneFit,
    points: Vec<PlanePoint, MAX_PLANE_POINTS>,
    plane: Plane,
    enabled: bool,
}

impl PlaneLeveling {
    /// Create a plane engine over its configured probe points
    ///
    /// `ThreePoint` expects exactly 3 points; `FourPointSymmetric` expects
    /// 4, ordered front, right, back, left. Point-count validation happens
    /// at startup configuration.
    pub fn new(fit: PlaneFit, points: Vec<PlanePoint, MAX_PLANE_POINTS>) -> Self {
        Self {
            fit,
            points,
            plane: Plane::default(),
            enabled: false,
        }
    }

    /// Expected point count for a fit strategy
    pub fn expected_points(fit: PlaneFit) -> usize {
        match fit {
            PlaneFit::ThreePoint => 3,
            PlaneFit::FourPointSymmetric => 4,
        }
    }

    /// The fitted plane
    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    /// Probe the configured points and fit the plane
    ///
    /// Unlike the grid, every point is required: an unreachable point
    /// aborts the measurement with the prior plane untouched.
    pub fn measure<P: Probe>(&mut self, probe: &mut P) -> Result<(), LevelingError> {
        let mut z = Vec::<f32, MAX_PLANE_POINTS>::new();
        for point in &self.points {
            match probe.probe_at(point.x, point.y)? {
                ProbeOutcome::Triggered(value) => {
                    // Capacity matches the points list
                    let _ = z.push(value);
                }
                ProbeOutcome::OutOfReach => return Err(LevelingError::PointUnreachable),
            }
        }

        self.plane = match self.fit {
            PlaneFit::ThreePoint => Self::fit_three(&self.points, &z)?,
            PlaneFit::FourPointSymmetric => Self::fit_four_symmetric(&self.points, &z)?,
        };
        Ok(())
    }

    /// Exact plane through three points
    fn fit_three(points: &[PlanePoint], z: &[f32]) -> Result<Plane, LevelingError> {
        if points.len() != 3 || z.len() != 3 {
            return Err(LevelingError::DegeneratePoints);
        }
        let (p1, p2, p3) = (points[0], points[1], points[2]);
        let u = (p2.x - p1.x, p2.y - p1.y, z[1] - z[0]);
        let v = (p3.x - p1.x, p3.y - p1.y, z[2] - z[0]);
        // Plane normal = u x v; a colinear triple has no vertical component
        let nx = u.1 * v.2 - u.2 * v.1;
        let ny = u.2 * v.0 - u.0 * v.2;
        let nz = u.0 * v.1 - u.1 * v.0;
        if fabs(nz) < 1e-6 {
            return Err(LevelingError::DegeneratePoints);
        }
        let a = -nx / nz;
        let b = -ny / nz;
        let c = z[0] - a * p1.x - b * p1.y;
        Ok(Plane { a, b, c })
    }

    /// Plane from two opposing point pairs (front/back, left/right)
    fn fit_four_symmetric(points: &[PlanePoint], z: &[f32]) -> Result<Plane, LevelingError> {
        if points.len() != 4 || z.len() != 4 {
            return Err(LevelingError::DegeneratePoints);
        }
        let (front, right, back, left) = (points[0], points[1], points[2], points[3]);
        let run_x = right.x - left.x;
        let run_y = back.y - front.y;
        if fabs(run_x) < 1e-6 || fabs(run_y) < 1e-6 {
            return Err(LevelingError::DegeneratePoints);
        }
        let a = (z[1] - z[3]) / run_x;
        let b = (z[2] - z[0]) / run_y;
        let cx = (front.x + right.x + back.x + left.x) / 4.0;
        let cy = (front.y + right.y + back.y + left.y) / 4.0;
        let cz = (z[0] + z[1] + z[2] + z[3]) / 4.0;
        let c = cz - a * cx - b * cy;
        Ok(Plane { a, b, c })
    }

    /// Correction at printer coordinates (x, y)
    pub fn distortion_at(&self, xp: f32, yp: f32) -> f32 {
        self.plane.z_at(xp, yp)
    }

    /// Add the plane correction to a commanded position's Z
    pub fn add_distortion(&self, pos: &mut Position) {
        if self.enabled {
            pos.z += self.distortion_at(pos.x, pos.y);
        }
    }

    /// Remove the plane correction from a machine position's Z
    pub fn sub_distortion(&self, pos: &mut Position) {
        if self.enabled {
            pos.z -= self.distortion_at(pos.x, pos.y);
        }
    }

    pub fn set_distortion_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_distortion_enabled(&self) -> bool {
        self.enabled
    }

    /// Drop the fitted plane and disable the correction
    pub fn reset(&mut self) {
        self.plane = Plane::default();
        self.enabled = false;
    }

    /// Capture the plane for persistence
    pub fn snapshot(&self) -> PlaneSnapshot {
        PlaneSnapshot {
            magic: PLANE_MAGIC,
            version: PLANE_VERSION,
            plane: self.plane,
            enabled: self.enabled,
            crc: 0,
        }
    }

    /// Restore from a verified snapshot
    pub fn restore(&mut self, snap: &PlaneSnapshot) {
        self.plane = snap.plane;
        self.enabled = snap.enabled;
    }
}

/// Persisted form of the fitted plane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlaneSnapshot {
    pub magic: u32,
    pub version: u8,
    pub plane: Plane,
    pub enabled: bool,
    pub crc: u32,
}

impl PlaneSnapshot {
    fn checksum(&self) -> u32 {
        let mut crc = Crc32::new();
        crc.update(&self.magic.to_le_bytes());
        crc.update(&[self.version]);
        crc.update_f32(self.plane.a);
        crc.update_f32(self.plane.b);
        crc.update_f32(self.plane.c);
        crc.update(&[self.enabled as u8]);
        crc.finalize()
    }
}

impl Snapshot for PlaneSnapshot {
    fn seal(&mut self) {
        self.crc = self.checksum();
    }

    fn verify(&self) -> bool {
        self.magic == PLANE_MAGIC && self.version == PLANE_VERSION && self.crc == self.checksum()
    }
}
