//! Footprints (structuring elements)
//!
//! A footprint is the neighborhood used by one erosion step. All footprints
//! have radius 1 and are centred on the origin; they differ in which axes
//! they extend along.
//!
//! # Naming
//!
//! Names are case-sensitive: `ball`, `ball_XY`, `ball_YZ`, `ball_XZ`,
//! `cube`, `disk`, `square`, `X`, `Y`, `Z`. The name `default` resolves to
//! `ball` for 3D masks and `disk` for 2D masks (see [`Footprint::resolve`]).

use crate::error::{MorphError, MorphResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Neighborhood offset `(dz, dy, dx)`
pub type Offset = (isize, isize, isize);

/// Structuring element selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Footprint {
    /// 3D cross: origin plus the six face neighbors
    #[serde(rename = "ball")]
    Ball,
    /// 3D cross restricted to the y/x plane
    #[serde(rename = "ball_XY")]
    BallXY,
    /// 3D cross restricted to the z/y plane
    #[serde(rename = "ball_YZ")]
    BallYZ,
    /// 3D cross restricted to the z/x plane
    #[serde(rename = "ball_XZ")]
    BallXZ,
    /// Full 3x3x3 block
    #[serde(rename = "cube")]
    Cube,
    /// 2D cross: origin plus the four edge neighbors
    #[serde(rename = "disk")]
    Disk,
    /// Full 3x3 block
    #[serde(rename = "square")]
    Square,
    /// Line along x (2D or 3D)
    #[serde(rename = "X")]
    LineX,
    /// Line along y (2D or 3D)
    #[serde(rename = "Y")]
    LineY,
    /// Line along z (3D only)
    #[serde(rename = "Z")]
    LineZ,
}

impl Footprint {
    /// Every supported footprint.
    pub const ALL: [Footprint; 10] = [
        Footprint::Ball,
        Footprint::BallXY,
        Footprint::BallYZ,
        Footprint::BallXZ,
        Footprint::Cube,
        Footprint::Disk,
        Footprint::Square,
        Footprint::LineX,
        Footprint::LineY,
        Footprint::LineZ,
    ];

    /// Configuration name of this footprint.
    pub fn name(self) -> &'static str {
        match self {
            Footprint::Ball => "ball",
            Footprint::BallXY => "ball_XY",
            Footprint::BallYZ => "ball_YZ",
            Footprint::BallXZ => "ball_XZ",
            Footprint::Cube => "cube",
            Footprint::Disk => "disk",
            Footprint::Square => "square",
            Footprint::LineX => "X",
            Footprint::LineY => "Y",
            Footprint::LineZ => "Z",
        }
    }

    /// Default footprint for a dimensionality.
    pub fn default_for(ndim: usize) -> Footprint {
        if ndim == 2 {
            Footprint::Disk
        } else {
            Footprint::Ball
        }
    }

    /// Parse a name, resolving `default` against `ndim`, and check that the
    /// footprint can be applied to an `ndim`-dimensional mask.
    ///
    /// # Errors
    ///
    /// Returns [`MorphError::UnsupportedFootprint`] for unknown names and
    /// [`MorphError::DimensionMismatch`] when the footprint does not fit.
    pub fn resolve(name: &str, ndim: usize) -> MorphResult<Footprint> {
        let footprint = if name == "default" {
            Footprint::default_for(ndim)
        } else {
            name.parse()?
        };
        footprint.check_ndim(ndim)?;
        Ok(footprint)
    }

    /// Whether this footprint applies to an `ndim`-dimensional mask.
    pub fn supports(self, ndim: usize) -> bool {
        match self {
            Footprint::LineX | Footprint::LineY => ndim == 2 || ndim == 3,
            Footprint::Disk | Footprint::Square => ndim == 2,
            _ => ndim == 3,
        }
    }

    /// Check that this footprint applies to an `ndim`-dimensional mask.
    ///
    /// # Errors
    ///
    /// Returns [`MorphError::DimensionMismatch`] otherwise.
    pub fn check_ndim(self, ndim: usize) -> MorphResult<()> {
        if self.supports(ndim) {
            return Ok(());
        }
        let expected = match self {
            Footprint::Disk | Footprint::Square => 2,
            _ => 3,
        };
        Err(MorphError::DimensionMismatch {
            footprint: self.name(),
            expected,
            actual: ndim,
        })
    }

    /// Neighbor offsets other than the origin.
    pub fn offsets(self) -> Vec<Offset> {
        match self {
            Footprint::Ball => axis_pairs(&[(1, 0, 0), (0, 1, 0), (0, 0, 1)]),
            Footprint::BallXY | Footprint::Disk => axis_pairs(&[(0, 1, 0), (0, 0, 1)]),
            Footprint::BallYZ => axis_pairs(&[(1, 0, 0), (0, 1, 0)]),
            Footprint::BallXZ => axis_pairs(&[(1, 0, 0), (0, 0, 1)]),
            Footprint::LineX => axis_pairs(&[(0, 0, 1)]),
            Footprint::LineY => axis_pairs(&[(0, 1, 0)]),
            Footprint::LineZ => axis_pairs(&[(1, 0, 0)]),
            Footprint::Cube => block(-1..=1),
            Footprint::Square => block(0..=0),
        }
    }

    /// Preset sweep sequences for a dimensionality, as used when no
    /// footprints are configured.
    pub fn presets(ndim: usize) -> Vec<Footprint> {
        if ndim == 2 {
            vec![Footprint::Disk, Footprint::LineX, Footprint::LineY]
        } else {
            vec![
                Footprint::Ball,
                Footprint::BallXY,
                Footprint::BallYZ,
                Footprint::BallXZ,
            ]
        }
    }
}

fn axis_pairs(axes: &[Offset]) -> Vec<Offset> {
    axes.iter()
        .flat_map(|&(dz, dy, dx)| [(-dz, -dy, -dx), (dz, dy, dx)])
        .collect()
}

fn block(z_range: std::ops::RangeInclusive<isize>) -> Vec<Offset> {
    let mut out = Vec::new();
    for dz in z_range {
        for dy in -1..=1 {
            for dx in -1..=1 {
                if (dz, dy, dx) != (0, 0, 0) {
                    out.push((dz, dy, dx));
                }
            }
        }
    }
    out
}

impl FromStr for Footprint {
    type Err = MorphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Footprint::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| MorphError::UnsupportedFootprint(s.to_string()))
    }
}

impl fmt::Display for Footprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
