//! Geometry helpers for range checks, placement and packet interpolation.
//!
//! Contains helper functions for:
//! - Distance calculations (squared distance for threshold comparisons)
//! - Linear interpolation between waypoints
//! - Polar offsets around a placement anchor
//! - Inset-bounds tests and clamping

use super::types::{Bounds, Point};

/// Squared Euclidean distance in world units.
///
/// Only for ordering and hit tests. Range checks go through `within_range`,
/// since `d² <= r²` can disagree with `d <= r` at the boundary by one ulp.
pub fn distance2(a: &Point, b: &Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// Euclidean distance in world units.
pub fn distance(a: &Point, b: &Point) -> f64 {
    distance2(a, b).sqrt()
}

/// True when `b` lies within `range` of `a` (boundary inclusive).
pub fn within_range(a: &Point, b: &Point, range: f64) -> bool {
    distance(a, b) <= range
}

/// Linear interpolation from `start` to `end`.
///
/// Written as `start·(1-t) + end·t` so that `t == 1.0` yields exactly `end`.
pub fn lerp(start: &Point, end: &Point, t: f64) -> Point {
    Point {
        x: start.x * (1.0 - t) + end.x * t,
        y: start.y * (1.0 - t) + end.y * t,
    }
}

/// Point at `distance` from `anchor` in direction `angle` (radians).
pub fn polar_offset(anchor: &Point, distance: f64, angle: f64) -> Point {
    Point {
        x: anchor.x + angle.cos() * distance,
        y: anchor.y + angle.sin() * distance,
    }
}

/// Inclusive test against the world rectangle shrunk by `margin` on every side.
pub fn within_inset(p: &Point, bounds: &Bounds, margin: f64) -> bool {
    p.x >= margin && p.x <= bounds.width - margin && p.y >= margin && p.y <= bounds.height - margin
}

/// Clamp a point into the world rectangle shrunk by `inset` on every side.
///
/// When the inset exceeds half a dimension the lower edge wins.
pub fn clamp_to_inset(p: &Point, bounds: &Bounds, inset: f64) -> Point {
    Point {
        x: p.x.min(bounds.width - inset).max(inset),
        y: p.y.min(bounds.height - inset).max(inset),
    }
}
