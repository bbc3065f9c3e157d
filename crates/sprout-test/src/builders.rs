//! Synthetic test volumes
//!
//! Deterministic intensity volumes with known component structure, used by
//! the regression tests in place of image files on disk.

use crate::error::TestResult;
use sprout_core::{Shape, Volume};

/// Foreground intensity written by the builders
pub const FOREGROUND: u16 = 200;

/// A single ball of radius `radius` centred in a cube of side `size`.
pub fn sphere(size: usize, radius: f64) -> TestResult<Volume<u16>> {
    let shape = Shape::new_3d(size, size, size)?;
    let c = (size as f64 - 1.0) / 2.0;
    let r2 = radius * radius;
    Ok(Volume::from_fn(shape, |z, y, x| {
        let d2 = (z as f64 - c).powi(2) + (y as f64 - c).powi(2) + (x as f64 - c).powi(2);
        if d2 <= r2 { FOREGROUND } else { 0 }
    }))
}

/// Two 5x5x5 cubes joined by a one-voxel-wide bridge along x.
///
/// Shape is `7 x 7 x 15`. The cubes occupy `x` in `1..6` and `9..14`; the
/// bridge runs through `(3, 3, 6..9)`. One `ball` erosion severs the bridge
/// and leaves two components of 28 voxels each.
pub fn bridged_blobs() -> TestResult<Volume<u16>> {
    let shape = Shape::new_3d(7, 7, 15)?;
    Ok(Volume::from_fn(shape, |z, y, x| {
        let in_zy = (1..6).contains(&z) && (1..6).contains(&y);
        let cube_a = in_zy && (1..6).contains(&x);
        let cube_b = in_zy && (9..14).contains(&x);
        let bridge = z == 3 && y == 3 && (6..9).contains(&x);
        if cube_a || cube_b || bridge {
            FOREGROUND
        } else {
            0
        }
    }))
}

/// Total foreground voxels of [`bridged_blobs`].
pub const BRIDGED_BLOBS_VOXELS: usize = 2 * 125 + 3;

/// A filled 2D disk of radius `radius` centred in a `size x size` image.
pub fn disk(size: usize, radius: f64) -> TestResult<Volume<u16>> {
    let shape = Shape::new_2d(size, size)?;
    let c = (size as f64 - 1.0) / 2.0;
    let r2 = radius * radius;
    Ok(Volume::from_fn(shape, |_, y, x| {
        let d2 = (y as f64 - c).powi(2) + (x as f64 - c).powi(2);
        if d2 <= r2 { FOREGROUND } else { 0 }
    }))
}

/// Reproducible pseudo-random generator (64-bit LCG)
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    /// Create a generator from a seed.
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed ^ 0x9E37_79B9_7F4A_7C15,
        }
    }

    /// Next raw value (upper 32 bits of the state).
    pub fn next_u32(&mut self) -> u32 {
        const A: u64 = 6_364_136_223_846_793_005;
        const C: u64 = 1_442_695_040_888_963_407;
        self.state = self.state.wrapping_mul(A).wrapping_add(C);
        (self.state >> 32) as u32
    }

    /// Uniform value in `[0, n)`. `n` must be non-zero.
    pub fn below(&mut self, n: u32) -> u32 {
        self.next_u32() % n
    }
}

/// A field of overlapping random balls with varying intensity.
///
/// Every ball has an intensity in `100..250` and a radius in `2..=4`.
/// Overlaps take the maximum intensity, so thresholding at increasing levels
/// pulls clusters apart.
pub fn random_blobs(depth: usize, size: usize, count: usize, seed: u64) -> TestResult<Volume<u16>> {
    let shape = Shape::new_3d(depth, size, size)?;
    let mut rng = Lcg::new(seed);
    let balls: Vec<(f64, f64, f64, f64, u16)> = (0..count)
        .map(|_| {
            let z = rng.below(depth as u32) as f64;
            let y = rng.below(size as u32) as f64;
            let x = rng.below(size as u32) as f64;
            let r = 2.0 + rng.below(3) as f64;
            let v = 100 + rng.below(150) as u16;
            (z, y, x, r, v)
        })
        .collect();

    Ok(Volume::from_fn(shape, |z, y, x| {
        balls
            .iter()
            .filter(|&&(bz, by, bx, r, _)| {
                (z as f64 - bz).powi(2) + (y as f64 - by).powi(2) + (x as f64 - bx).powi(2)
                    <= r * r
            })
            .map(|&(.., v)| v)
            .max()
            .unwrap_or(0)
    }))
}
