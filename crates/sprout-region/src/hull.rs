//! Convex hull measures of voxel sets
//!
//! Computes the area (2D) or volume (3D) of the convex hull of the voxel
//! coordinates of a mask. All arithmetic is exact integer arithmetic, so the
//! result does not depend on floating-point rounding.
//!
//! # Algorithm
//!
//! - Each row of the mask contributes only its first and last foreground
//!   voxel; interior row voxels never lie on the hull.
//! - 2D: Andrew's monotone chain, then the shoelace formula.
//! - 3D: incremental hull. A starting tetrahedron is grown one point at a
//!   time by removing the faces the point can see and coning the horizon to
//!   it. Volume is the sum of signed tetrahedra from the origin.
//!
//! Inputs that span fewer dimensions than the mask (collinear or coplanar
//! voxels) have measure 0.

use crate::error::{RegionError, RegionResult};
use sprout_core::Volume;
use std::collections::HashSet;

type P3 = [i64; 3];

/// Minimum number of voxels for a hull of the given dimensionality.
pub fn min_hull_points(ndim: usize) -> usize {
    ndim + 1
}

/// Hull area (2D) or volume (3D) of a mask's foreground voxels.
///
/// # Errors
///
/// Returns [`RegionError::InsufficientHullPoints`] when the mask has fewer
/// than 3 (2D) or 4 (3D) foreground voxels.
pub fn convex_hull_measure(mask: &Volume<bool>) -> RegionResult<f64> {
    let shape = mask.shape();
    let needed = min_hull_points(shape.ndim());
    let got = mask.count();
    if got < needed {
        return Err(RegionError::InsufficientHullPoints { needed, got });
    }

    let points = row_extremes(mask);
    if shape.is_3d() {
        Ok(hull_volume_x6(&points) as f64 / 6.0)
    } else {
        let planar: Vec<[i64; 2]> = points.iter().map(|p| [p[1], p[2]]).collect();
        Ok(hull_area_x2(&planar) as f64 / 2.0)
    }
}

/// First and last foreground voxel of every `(z, y)` row, as `[z, y, x]`.
fn row_extremes(mask: &Volume<bool>) -> Vec<P3> {
    let shape = mask.shape();
    let data = mask.data();
    let width = shape.width();
    let mut points = Vec::new();
    for z in 0..shape.depth() {
        for y in 0..shape.height() {
            let row = &data[shape.index(z, y, 0)..shape.index(z, y, 0) + width];
            let first = row.iter().position(|&v| v);
            let last = row.iter().rposition(|&v| v);
            if let (Some(a), Some(b)) = (first, last) {
                points.push([z as i64, y as i64, a as i64]);
                if b != a {
                    points.push([z as i64, y as i64, b as i64]);
                }
            }
        }
    }
    points
}

fn cross2(o: [i64; 2], a: [i64; 2], b: [i64; 2]) -> i64 {
    (a[0] - o[0]) * (b[1] - o[1]) - (a[1] - o[1]) * (b[0] - o[0])
}

/// Twice the hull area of a planar point set.
pub fn hull_area_x2(points: &[[i64; 2]]) -> i64 {
    let mut pts = points.to_vec();
    pts.sort_unstable();
    pts.dedup();
    if pts.len() < 3 {
        return 0;
    }

    let mut hull: Vec<[i64; 2]> = Vec::with_capacity(pts.len() * 2);
    for &p in &pts {
        while hull.len() >= 2 && cross2(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && cross2(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0
        {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();

    let n = hull.len();
    let twice: i64 = (0..n)
        .map(|i| {
            let a = hull[i];
            let b = hull[(i + 1) % n];
            a[0] * b[1] - b[0] * a[1]
        })
        .sum();
    twice.abs()
}

fn sub(a: P3, b: P3) -> P3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(a: P3, b: P3) -> P3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn dot(a: P3, b: P3) -> i128 {
    a[0] as i128 * b[0] as i128 + a[1] as i128 * b[1] as i128 + a[2] as i128 * b[2] as i128
}

/// Positive when `d` lies on the side of triangle `(a, b, c)` its normal
/// `(b - a) x (c - a)` points to.
fn orient(a: P3, b: P3, c: P3, d: P3) -> i128 {
    dot(cross(sub(b, a), sub(c, a)), sub(d, a))
}

/// Indices of four affinely independent points, if any exist.
fn initial_simplex(points: &[P3]) -> Option<[usize; 4]> {
    let i0 = 0;
    let i1 = (1..points.len()).find(|&i| points[i] != points[i0])?;
    let i2 = (1..points.len()).find(|&i| {
        cross(sub(points[i1], points[i0]), sub(points[i], points[i0])) != [0, 0, 0]
    })?;
    let i3 = (1..points.len())
        .find(|&i| orient(points[i0], points[i1], points[i2], points[i]) != 0)?;
    Some([i0, i1, i2, i3])
}

/// Six times the hull volume of a spatial point set.
pub fn hull_volume_x6(points: &[P3]) -> i128 {
    let mut pts = points.to_vec();
    pts.sort_unstable();
    pts.dedup();
    if pts.len() < 4 {
        return 0;
    }
    let Some(simplex) = initial_simplex(&pts) else {
        return 0;
    };

    let mut faces: Vec<[usize; 3]> = Vec::new();
    for skip in 0..4 {
        let mut f: Vec<usize> = (0..4).filter(|&k| k != skip).map(|k| simplex[k]).collect();
        let opposite = pts[simplex[skip]];
        if orient(pts[f[0]], pts[f[1]], pts[f[2]], opposite) > 0 {
            f.swap(1, 2);
        }
        faces.push([f[0], f[1], f[2]]);
    }

    for p in 0..pts.len() {
        if simplex.contains(&p) {
            continue;
        }
        let point = pts[p];
        let visible: Vec<bool> = faces
            .iter()
            .map(|f| orient(pts[f[0]], pts[f[1]], pts[f[2]], point) > 0)
            .collect();
        if !visible.iter().any(|&v| v) {
            continue;
        }

        let mut edges: HashSet<(usize, usize)> = HashSet::new();
        for (f, _) in faces.iter().zip(&visible).filter(|(_, v)| **v) {
            edges.insert((f[0], f[1]));
            edges.insert((f[1], f[2]));
            edges.insert((f[2], f[0]));
        }
        let horizon: Vec<(usize, usize)> = edges
            .iter()
            .copied()
            .filter(|&(a, b)| !edges.contains(&(b, a)))
            .collect();

        let mut kept: Vec<[usize; 3]> = faces
            .iter()
            .zip(&visible)
            .filter(|(_, v)| !**v)
            .map(|(f, _)| *f)
            .collect();
        kept.extend(horizon.into_iter().map(|(a, b)| [a, b, p]));
        faces = kept;
    }

    let total: i128 = faces
        .iter()
        .map(|f| dot(pts[f[0]], cross(pts[f[1]], pts[f[2]])))
        .sum();
    total.abs()
}
