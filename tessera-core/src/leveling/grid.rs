//! Grid distortion model
//!
//! Learns a fixed-size grid of Z deviations over the bed rectangle from
//! probe measurements, fills unmeasured cells by extrapolation, and
//! applies bilinear-interpolated corrections to commanded positions.
//! Bumps up have negative values.

use serde::{Deserialize, Serialize};

use super::LevelingError;
use crate::float::trunc_index;
use crate::motion::Position;
use crate::persist::{Crc32, Snapshot};
use crate::traits::{Probe, ProbeOutcome};

/// Grid resolution per axis, fixed at build time
pub const GRID_SIZE: usize = 3;

/// Magic number identifying a valid grid snapshot ("TGRD")
pub const GRID_MAGIC: u32 = 0x54475244;

/// Current grid snapshot format version
pub const GRID_VERSION: u8 = 1;

/// How a cell's value was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CellTag {
    /// No value yet
    #[default]
    Unmeasured = 0,
    /// Probed directly
    Measured = 1,
    /// Filled by extrapolation from neighbors
    Extrapolated = 2,
}

impl CellTag {
    fn as_u8(self) -> u8 {
        self as u8
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => CellTag::Measured,
            2 => CellTag::Extrapolated,
            _ => CellTag::Unmeasured,
        }
    }
}

/// Grid geometry and degrade-band parameters
///
/// `degrade_start` and `degrade_end` are distances from the rectangle
/// border: at border distance >= `degrade_start` the correction is applied
/// in full, at <= `degrade_end` it is zero, linear in between. A
/// `degrade_start` of zero disables attenuation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GridConfig {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
    pub degrade_start: f32,
    pub degrade_end: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            x_min: 0.0,
            x_max: 200.0,
            y_min: 0.0,
            y_max: 200.0,
            degrade_start: 10.0,
            degrade_end: 0.0,
        }
    }
}

/// Result counters from a completed measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MeasureSummary {
    /// Cells probed directly
    pub measured: u8,
    /// Cells skipped as unreachable
    pub skipped: u8,
    /// Cells resolved by extrapolation
    pub extrapolated: u8,
    /// Cells filled by the nearest-neighbor fallback (reported as warnings)
    pub gaps: u8,
}

/// The persisted grid-leveling engine
pub struct GridLeveling {
    config: GridConfig,
    cells: [[f32; GRID_SIZE]; GRID_SIZE],
    tags: [[CellTag; GRID_SIZE]; GRID_SIZE],
    enabled: bool,
}

/// Line directions searched when resolving a cell, in documented order:
/// same row, same column, diagonal, anti-diagonal.
const LINES: [(i32, i32); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

impl GridLeveling {
    /// Create an empty, disabled grid
    pub fn new(config: GridConfig) -> Self {
        Self {
            config,
            cells: [[0.0; GRID_SIZE]; GRID_SIZE],
            tags: [[CellTag::Unmeasured; GRID_SIZE]; GRID_SIZE],
            enabled: false,
        }
    }

    /// Grid geometry
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    fn dx(&self) -> f32 {
        (self.config.x_max - self.config.x_min) / (GRID_SIZE - 1) as f32
    }

    fn dy(&self) -> f32 {
        (self.config.y_max - self.config.y_min) / (GRID_SIZE - 1) as f32
    }

    /// X coordinate of grid column `index`
    pub fn x_pos_for(&self, index: usize) -> f32 {
        self.config.x_min + self.dx() * index as f32
    }

    /// Y coordinate of grid row `index`
    pub fn y_pos_for(&self, index: usize) -> f32 {
        self.config.y_min + self.dy() * index as f32
    }

    /// Measure the full grid with the external probing capability
    ///
    /// Unreachable points are skipped and later resolved by extrapolation.
    /// A probe error aborts the measurement and leaves the prior grid
    /// untouched. On success the new grid is committed and extrapolated.
    pub fn measure<P: Probe>(&mut self, probe: &mut P) -> Result<MeasureSummary, LevelingError> {
        let mut cells = [[0.0f32; GRID_SIZE]; GRID_SIZE];
        let mut tags = [[CellTag::Unmeasured; GRID_SIZE]; GRID_SIZE];
        let mut summary = MeasureSummary::default();

        for y in 0..GRID_SIZE {
            for x in 0..GRID_SIZE {
                match probe.probe_at(self.x_pos_for(x), self.y_pos_for(y))? {
                    ProbeOutcome::Triggered(z) => {
                        cells[y][x] = z;
                        tags[y][x] = CellTag::Measured;
                        summary.measured += 1;
                    }
                    ProbeOutcome::OutOfReach => summary.skipped += 1,
                }
            }
        }

        if summary.measured == 0 {
            return Err(LevelingError::NoPointsMeasured);
        }

        self.cells = cells;
        self.tags = tags;
        let (extrapolated, gaps) = self.extrapolate_grid();
        summary.extrapolated = extrapolated;
        summary.gaps = gaps;
        Ok(summary)
    }

    /// Resolve every unmeasured cell from its measured neighbors
    ///
    /// Iterates to a fixed point: a cell resolves when some line through it
    /// (row, column, diagonal, anti-diagonal - searched in that order) has
    /// resolved cells on both sides (distance-weighted interpolation) or
    /// two consecutive resolved cells on one side (linear extrapolation,
    /// `2a - b` for the adjacent case). Contributions from all qualifying
    /// lines are averaged. Cells that stay isolated are filled from the
    /// nearest resolved neighbor and counted as gaps.
    ///
    /// Returns `(extrapolated, gaps)` cell counts.
    pub fn extrapolate_grid(&mut self) -> (u8, u8) {
        let mut extrapolated = 0u8;

        loop {
            let mut progress = false;
            for y in 0..GRID_SIZE {
                for x in 0..GRID_SIZE {
                    if self.tags[y][x] != CellTag::Unmeasured {
                        continue;
                    }
                    if let Some(value) = self.fit_from_lines(x, y) {
                        self.cells[y][x] = value;
                        self.tags[y][x] = CellTag::Extrapolated;
                        extrapolated += 1;
                        progress = true;
                    }
                }
            }
            if !progress {
                break;
            }
        }

        let mut gaps = 0u8;
        for y in 0..GRID_SIZE {
            for x in 0..GRID_SIZE {
                if self.tags[y][x] != CellTag::Unmeasured {
                    continue;
                }
                if let Some(value) = self.nearest_resolved(x, y) {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("leveling: gap at cell ({}, {}) filled from nearest neighbor", x, y);
                    self.cells[y][x] = value;
                    self.tags[y][x] = CellTag::Extrapolated;
                    gaps += 1;
                }
            }
        }

        (extrapolated, gaps)
    }

    /// Average the line fits available for cell (x, y)
    fn fit_from_lines(&self, x: usize, y: usize) -> Option<f32> {
        let mut sum = 0.0f32;
        let mut count = 0u8;
        for (dx, dy) in LINES {
            if let Some(value) = self.fit_along(x, y, dx, dy) {
                sum += value;
                count += 1;
            }
        }
        if count > 0 {
            Some(sum / count as f32)
        } else {
            None
        }
    }

    /// Fit a value for (x, y) from resolved cells along one line direction
    fn fit_along(&self, x: usize, y: usize, dx: i32, dy: i32) -> Option<f32> {
        let pos = self.nearest_on_ray(x, y, dx, dy);
        let neg = self.nearest_on_ray(x, y, -dx, -dy);

        match (neg, pos) {
            (Some((dn, vn)), Some((dp, vp))) => {
                // Resolved cells on both sides: interpolate, weighted by
                // distance so the closer cell dominates.
                Some((vn * dp as f32 + vp * dn as f32) / (dn + dp) as f32)
            }
            (Some((d1, v1)), None) => self.extrapolate_one_side(x, y, -dx, -dy, d1, v1),
            (None, Some((d1, v1))) => self.extrapolate_one_side(x, y, dx, dy, d1, v1),
            (None, None) => None,
        }
    }

    /// Extrapolate from two consecutive resolved cells on one side
    fn extrapolate_one_side(
        &self,
        x: usize,
        y: usize,
        dx: i32,
        dy: i32,
        d1: i32,
        v1: f32,
    ) -> Option<f32> {
        let (x2, y2) = (x as i32 + dx * (d1 + 1), y as i32 + dy * (d1 + 1));
        if !Self::valid_index(x2, y2) {
            return None;
        }
        let (x2, y2) = (x2 as usize, y2 as usize);
        if self.tags[y2][x2] == CellTag::Unmeasured {
            return None;
        }
        let v2 = self.cells[y2][x2];
        Some(v1 + (v1 - v2) * d1 as f32)
    }

    /// Nearest resolved cell along a ray, as (distance, value)
    fn nearest_on_ray(&self, x: usize, y: usize, dx: i32, dy: i32) -> Option<(i32, f32)> {
        for dist in 1..GRID_SIZE as i32 {
            let (cx, cy) = (x as i32 + dx * dist, y as i32 + dy * dist);
            if !Self::valid_index(cx, cy) {
                return None;
            }
            if self.tags[cy as usize][cx as usize] != CellTag::Unmeasured {
                return Some((dist, self.cells[cy as usize][cx as usize]));
            }
        }
        None
    }

    /// Deterministic fallback for isolated cells: the first resolved cell
    /// found on expanding Chebyshev rings, scanned row-major within a ring.
    fn nearest_resolved(&self, x: usize, y: usize) -> Option<f32> {
        for ring in 1..GRID_SIZE as i32 {
            for cy in -ring..=ring {
                for cx in -ring..=ring {
                    if cx.abs() != ring && cy.abs() != ring {
                        continue;
                    }
                    let (gx, gy) = (x as i32 + cx, y as i32 + cy);
                    if !Self::valid_index(gx, gy) {
                        continue;
                    }
                    if self.tags[gy as usize][gx as usize] != CellTag::Unmeasured {
                        return Some(self.cells[gy as usize][gx as usize]);
                    }
                }
            }
        }
        None
    }

    fn valid_index(x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < GRID_SIZE as i32 && y < GRID_SIZE as i32
    }

    /// Correction at printer coordinates (x, y)
    ///
    /// Bilinear interpolation over the four enclosing cells, attenuated
    /// inside the perimeter degrade band. Zero outside the grid.
    pub fn distortion_at(&self, xp: f32, yp: f32) -> f32 {
        let c = &self.config;
        if xp < c.x_min || xp > c.x_max || yp < c.y_min || yp > c.y_max {
            return 0.0;
        }

        let rel_x = (xp - c.x_min) / self.dx();
        let rel_y = (yp - c.y_min) / self.dy();
        let ix = trunc_index(rel_x).min(GRID_SIZE - 2);
        let iy = trunc_index(rel_y).min(GRID_SIZE - 2);
        let fx = rel_x - ix as f32;
        let fy = rel_y - iy as f32;

        let z00 = self.cells[iy][ix];
        let z10 = self.cells[iy][ix + 1];
        let z01 = self.cells[iy + 1][ix];
        let z11 = self.cells[iy + 1][ix + 1];
        let z0 = z00 + (z10 - z00) * fx;
        let z1 = z01 + (z11 - z01) * fx;
        let raw = z0 + (z1 - z0) * fy;

        raw * self.degrade_factor(xp, yp)
    }

    fn degrade_factor(&self, xp: f32, yp: f32) -> f32 {
        let c = &self.config;
        if c.degrade_start <= 0.0 {
            return 1.0;
        }
        let border = (xp - c.x_min)
            .min(c.x_max - xp)
            .min(yp - c.y_min)
            .min(c.y_max - yp);
        if border >= c.degrade_start {
            1.0
        } else if border <= c.degrade_end {
            0.0
        } else {
            (border - c.degrade_end) / (c.degrade_start - c.degrade_end)
        }
    }

    /// Add the local correction to a commanded position's Z
    pub fn add_distortion(&self, pos: &mut Position) {
        if self.enabled {
            pos.z += self.distortion_at(pos.x, pos.y);
        }
    }

    /// Remove the local correction from a machine position's Z
    ///
    /// Exact inverse of [`Self::add_distortion`] for identical (x, y).
    pub fn sub_distortion(&self, pos: &mut Position) {
        if self.enabled {
            pos.z -= self.distortion_at(pos.x, pos.y);
        }
    }

    /// Globally gate the correction; persisted by the caller
    pub fn set_distortion_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_distortion_enabled(&self) -> bool {
        self.enabled
    }

    /// Set the cell nearest to printer coordinates (x, y) directly
    pub fn set(&mut self, x: f32, y: f32, z: f32) -> Result<(), LevelingError> {
        let c = &self.config;
        if x < c.x_min || x > c.x_max || y < c.y_min || y > c.y_max {
            return Err(LevelingError::OutsideGrid);
        }
        let ix = trunc_index((x - c.x_min) / self.dx() + 0.5).min(GRID_SIZE - 1);
        let iy = trunc_index((y - c.y_min) / self.dy() + 0.5).min(GRID_SIZE - 1);
        self.cells[iy][ix] = z;
        self.tags[iy][ix] = CellTag::Measured;
        Ok(())
    }

    /// Value and tag of cell (x, y); grid indices, not coordinates
    pub fn cell(&self, x: usize, y: usize) -> (f32, CellTag) {
        (self.cells[y][x], self.tags[y][x])
    }

    /// Delete the matrix and disable the correction
    pub fn reset(&mut self) {
        self.cells = [[0.0; GRID_SIZE]; GRID_SIZE];
        self.tags = [[CellTag::Unmeasured; GRID_SIZE]; GRID_SIZE];
        self.enabled = false;
    }

    /// Capture the grid for persistence
    pub fn snapshot(&self) -> GridSnapshot {
        let mut tags = [[0u8; GRID_SIZE]; GRID_SIZE];
        for y in 0..GRID_SIZE {
            for x in 0..GRID_SIZE {
                tags[y][x] = self.tags[y][x].as_u8();
            }
        }
        GridSnapshot {
            magic: GRID_MAGIC,
            version: GRID_VERSION,
            config: self.config,
            cells: self.cells,
            tags,
            enabled: self.enabled,
            crc: 0,
        }
    }

    /// Restore the grid from a verified snapshot
    pub fn restore(&mut self, snap: &GridSnapshot) {
        self.config = snap.config;
        self.cells = snap.cells;
        for y in 0..GRID_SIZE {
            for x in 0..GRID_SIZE {
                self.tags[y][x] = CellTag::from_u8(snap.tags[y][x]);
            }
        }
        self.enabled = snap.enabled;
    }
}

/// Persisted form of the distortion grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GridSnapshot {
    pub magic: u32,
    pub version: u8,
    pub config: GridConfig,
    pub cells: [[f32; GRID_SIZE]; GRID_SIZE],
    pub tags: [[u8; GRID_SIZE]; GRID_SIZE],
    pub enabled: bool,
    pub crc: u32,
}

impl GridSnapshot {
    fn checksum(&self) -> u32 {
        let mut crc = Crc32::new();
        crc.update(&self.magic.to_le_bytes());
        crc.update(&[self.version]);
        for value in [
            self.config.x_min,
            self.config.x_max,
            self.config.y_min,
            self.config.y_max,
            self.config.degrade_start,
            self.config.degrade_end,
        ] {
            crc.update_f32(value);
        }
        for row in &self.cells {
            for &cell in row {
                crc.update_f32(cell);
            }
        }
        for row in &self.tags {
            crc.update(row);
        }
        crc.update(&[self.enabled as u8]);
        crc.finalize()
    }
}

impl Snapshot for GridSnapshot {
    fn seal(&mut self) {
        self.crc = self.checksum();
    }

    fn verify(&self) -> bool {
        self.magic == GRID_MAGIC && self.version == GRID_VERSION && self.crc == self.checksum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ProbeError;

    fn flat_config() -> GridConfig {
        GridConfig {
            x_min: 0.0,
            x_max: 100.0,
            y_min: 0.0,
            y_max: 100.0,
            degrade_start: 0.0,
            degrade_end: 0.0,
        }
    }

    /// Probe returning a plane z = base + slope * x
    struct PlaneProbe {
        base: f32,
        slope: f32,
    }

    impl Probe for PlaneProbe {
        fn probe_at(&mut self, x: f32, _y: f32) -> Result<ProbeOutcome, ProbeError> {
            Ok(ProbeOutcome::Triggered(self.base + self.slope * x))
        }
    }

    /// Probe that fails after a number of successful points
    struct FailingProbe {
        remaining: u8,
    }

    impl Probe for FailingProbe {
        fn probe_at(&mut self, _x: f32, _y: f32) -> Result<ProbeOutcome, ProbeError> {
            if self.remaining == 0 {
                return Err(ProbeError::NotTriggered);
            }
            self.remaining -= 1;
            Ok(ProbeOutcome::Triggered(0.5))
        }
    }

    /// Probe that can only reach the four grid corners
    struct CornerProbe;

    impl Probe for CornerProbe {
        fn probe_at(&mut self, x: f32, y: f32) -> Result<ProbeOutcome, ProbeError> {
            let on_edge = |v: f32| v == 0.0 || v == 100.0;
            if on_edge(x) && on_edge(y) {
                Ok(ProbeOutcome::Triggered(x * 0.01 + y * 0.02))
            } else {
                Ok(ProbeOutcome::OutOfReach)
            }
        }
    }

    #[test]
    fn test_measure_full_grid() {
        let mut grid = GridLeveling::new(flat_config());
        let mut probe = PlaneProbe {
            base: 0.1,
            slope: 0.001,
        };
        let summary = grid.measure(&mut probe).unwrap();
        assert_eq!(summary.measured as usize, GRID_SIZE * GRID_SIZE);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.gaps, 0);

        let (value, tag) = grid.cell(2, 0);
        assert_eq!(tag, CellTag::Measured);
        assert!((value - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_probe_failure_leaves_prior_grid() {
        let mut grid = GridLeveling::new(flat_config());
        grid.set(50.0, 50.0, -0.3).unwrap();

        let mut probe = FailingProbe { remaining: 4 };
        assert_eq!(
            grid.measure(&mut probe).unwrap_err(),
            LevelingError::Probe(ProbeError::NotTriggered)
        );

        // Center cell survives the aborted measurement
        let (value, tag) = grid.cell(1, 1);
        assert_eq!(tag, CellTag::Measured);
        assert_eq!(value, -0.3);
    }

    #[test]
    fn test_corners_only_resolves_all_cells() {
        let mut grid = GridLeveling::new(flat_config());
        let summary = grid.measure(&mut CornerProbe).unwrap();
        assert_eq!(summary.measured, 4);
        assert_eq!(summary.skipped, 5);
        assert_eq!(summary.gaps, 0);

        for y in 0..GRID_SIZE {
            for x in 0..GRID_SIZE {
                let (_, tag) = grid.cell(x, y);
                assert_ne!(tag, CellTag::Unmeasured, "cell ({}, {}) unresolved", x, y);
            }
        }

        // Corner values follow z = 0.01x + 0.02y; the planar extrapolation
        // reproduces the plane at the center.
        let (center, tag) = grid.cell(1, 1);
        assert_eq!(tag, CellTag::Extrapolated);
        assert!((center - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_bilinear_interpolation() {
        let mut grid = GridLeveling::new(flat_config());
        // Plane z = 0.002x measured everywhere
        let mut probe = PlaneProbe {
            base: 0.0,
            slope: 0.002,
        };
        grid.measure(&mut probe).unwrap();

        // Bilinear interpolation of a plane reproduces the plane
        assert!((grid.distortion_at(25.0, 40.0) - 0.05).abs() < 1e-6);
        assert!((grid.distortion_at(77.5, 10.0) - 0.155).abs() < 1e-6);
    }

    #[test]
    fn test_outside_grid_is_zero() {
        let mut grid = GridLeveling::new(flat_config());
        grid.measure(&mut PlaneProbe { base: 1.0, slope: 0.0 }).unwrap();
        assert_eq!(grid.distortion_at(-1.0, 50.0), 0.0);
        assert_eq!(grid.distortion_at(50.0, 101.0), 0.0);
    }

    #[test]
    fn test_degrade_band() {
        let mut config = flat_config();
        config.degrade_start = 10.0;
        config.degrade_end = 0.0;
        let mut grid = GridLeveling::new(config);
        grid.measure(&mut PlaneProbe { base: 0.4, slope: 0.0 }).unwrap();

        // On the border: fully attenuated
        assert_eq!(grid.distortion_at(0.0, 50.0), 0.0);
        // Fully interior: raw interpolation
        assert!((grid.distortion_at(50.0, 50.0) - 0.4).abs() < 1e-6);
        // Halfway into the band: half the correction
        assert!((grid.distortion_at(5.0, 50.0) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_add_sub_round_trip() {
        let mut grid = GridLeveling::new(flat_config());
        grid.measure(&mut PlaneProbe { base: 0.25, slope: 0.003 }).unwrap();
        grid.set_distortion_enabled(true);

        let original = Position::new(33.0, 71.0, 5.5);
        let mut pos = original;
        grid.add_distortion(&mut pos);
        assert_ne!(pos.z, original.z);
        grid.sub_distortion(&mut pos);
        assert!((pos.z - original.z).abs() < 1e-5);
        assert_eq!(pos.x, original.x);
        assert_eq!(pos.y, original.y);
    }

    #[test]
    fn test_disabled_is_noop() {
        let mut grid = GridLeveling::new(flat_config());
        grid.measure(&mut PlaneProbe { base: 1.0, slope: 0.0 }).unwrap();
        grid.set_distortion_enabled(false);

        let mut pos = Position::new(50.0, 50.0, 2.0);
        grid.add_distortion(&mut pos);
        assert_eq!(pos.z, 2.0);
        grid.sub_distortion(&mut pos);
        assert_eq!(pos.z, 2.0);
    }

    #[test]
    fn test_set_and_reset() {
        let mut grid = GridLeveling::new(flat_config());
        grid.set(0.0, 0.0, -0.1).unwrap();
        grid.set(49.0, 52.0, 0.2).unwrap(); // snaps to center cell
        assert_eq!(grid.cell(1, 1), (0.2, CellTag::Measured));
        assert_eq!(
            grid.set(150.0, 50.0, 0.0).unwrap_err(),
            LevelingError::OutsideGrid
        );

        grid.set_distortion_enabled(true);
        grid.reset();
        assert!(!grid.is_distortion_enabled());
        assert_eq!(grid.cell(1, 1), (0.0, CellTag::Unmeasured));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut grid = GridLeveling::new(flat_config());
        grid.measure(&mut PlaneProbe { base: 0.1, slope: 0.001 }).unwrap();
        grid.set_distortion_enabled(true);

        let mut snap = grid.snapshot();
        snap.seal();
        assert!(snap.verify());

        let mut restored = GridLeveling::new(GridConfig::default());
        restored.restore(&snap);
        assert!(restored.is_distortion_enabled());
        assert_eq!(
            restored.distortion_at(42.0, 17.0),
            grid.distortion_at(42.0, 17.0)
        );
    }

    #[test]
    fn test_snapshot_rejects_tampering() {
        let grid = GridLeveling::new(flat_config());
        let mut snap = grid.snapshot();
        snap.seal();
        snap.cells[0][0] = 9.0;
        assert!(!snap.verify());
    }

    proptest::proptest! {
        #[test]
        fn prop_add_sub_round_trip(
            x in 0.0f32..100.0,
            y in 0.0f32..100.0,
            z in -10.0f32..10.0,
            base in -0.5f32..0.5,
            slope in -0.005f32..0.005,
        ) {
            let mut grid = GridLeveling::new(flat_config());
            grid.measure(&mut PlaneProbe { base, slope }).unwrap();
            grid.set_distortion_enabled(true);

            let original = Position::new(x, y, z);
            let mut pos = original;
            grid.add_distortion(&mut pos);
            grid.sub_distortion(&mut pos);
            proptest::prop_assert!((pos.z - original.z).abs() < 1e-4);
            proptest::prop_assert_eq!(pos.x, original.x);
            proptest::prop_assert_eq!(pos.y, original.y);
        }
    }
}
