//! Constructive random placement of new nodes and mobiles.
//!
//! Mobiles are dropped uniformly inside the inset world rectangle and always
//! succeed. Nodes are grown outward from the existing backbone: each candidate
//! is sampled at a polar offset of `[0.5·r, 1.0·r]` from a random anchor (the
//! hub or an existing node) so that it is likely to connect, and is rejected
//! when it falls outside the inset rectangle or too close to another fixed
//! entity. The separation requirement relaxes as outer attempts accumulate.

use rand::Rng;
use rand::seq::SliceRandom;
use rand_distr::{Distribution, Uniform};
use std::f64::consts::TAU;

use super::geometry::{distance, polar_offset, within_inset};
use super::types::{Bounds, Entity, EntityKind, Point, SimulationSettings, Velocity};

/// Largest per-axis drift speed given to new entities.
const MAX_DRIFT: f64 = 0.1;

/// Minimum separation, as a fraction of the placement range, required on the
/// given (1-based) outer attempt.
pub fn separation_factor(attempt: u32) -> f64 {
    match attempt {
        0..=10 => 0.5,
        11..=30 => 0.3,
        31..=50 => 0.1,
        _ => 0.0,
    }
}

/// Uniform random position inside the world inset by `margin` on every side.
pub fn place_mobile<R: Rng + ?Sized>(bounds: &Bounds, margin: f64, rng: &mut R) -> Point {
    let span_x = (bounds.width - 2.0 * margin).max(0.0);
    let span_y = (bounds.height - 2.0 * margin).max(0.0);
    Point {
        x: margin + rng.gen_range(0.0..1.0) * span_x,
        y: margin + rng.gen_range(0.0..1.0) * span_y,
    }
}

/// Search for a node position around the existing hub/node backbone.
///
/// `range` is the placement range (current override or the node default).
/// Returns `None` when every outer attempt is exhausted; the caller decides how
/// to report that.
pub fn place_node<R: Rng + ?Sized>(entities: &[Entity], bounds: &Bounds, range: f64, settings: &SimulationSettings, rng: &mut R) -> Option<Point> {
    let anchors: Vec<&Entity> = entities
        .iter()
        .filter(|e| matches!(e.kind, EntityKind::Hub | EntityKind::Node))
        .collect();
    if anchors.is_empty() || !(range > 0.0) {
        return None;
    }

    let radial = Uniform::new_inclusive(range * 0.5, range);
    let angular = Uniform::new(0.0, TAU);

    for attempt in 1..=settings.node_placement_attempts {
        let min_separation = range * separation_factor(attempt);

        for _ in 0..settings.node_placement_candidates {
            let Some(anchor) = anchors.choose(rng) else {
                return None;
            };
            let candidate = polar_offset(&anchor.position, radial.sample(rng), angular.sample(rng));

            if !within_inset(&candidate, bounds, settings.placement_margin) {
                continue;
            }

            let too_close = entities
                .iter()
                .filter(|e| e.kind != EntityKind::Mobile)
                .any(|e| distance(&e.position, &candidate) < min_separation);
            if !too_close {
                log::debug!("Node position ({:.1}, {:.1}) accepted on attempt {}", candidate.x, candidate.y, attempt);
                return Some(candidate);
            }
        }
    }

    None
}

/// Display label from the per-kind running count plus a random suffix.
///
/// The number is bumped until it is unused within the kind, so labels stay
/// unique even after manual additions.
pub fn next_label<R: Rng + ?Sized>(entities: &[Entity], kind: EntityKind, rng: &mut R) -> String {
    let prefix = kind.profile().label_prefix;
    let same_kind: Vec<&str> = entities.iter().filter(|e| e.kind == kind).map(|e| e.label.as_str()).collect();

    let mut number = same_kind.len() + 1 + rng.gen_range(0..100);
    loop {
        let label = format!("{}{}", prefix, number);
        if !same_kind.contains(&label.as_str()) {
            return label;
        }
        number += 1;
    }
}

/// Random initial drift in `[-0.1, 0.1)` per axis.
pub fn initial_velocity<R: Rng + ?Sized>(rng: &mut R) -> Velocity {
    let drift = Uniform::new(-MAX_DRIFT, MAX_DRIFT);
    Velocity {
        vx: drift.sample(rng),
        vy: drift.sample(rng),
    }
}
