//! Per-tick entity motion.
//!
//! Drifting entities move by their velocity and bounce off the world edges.
//! Velocities are only randomised at creation; nothing here draws randomness.

use super::types::{Bounds, Entity, EntityKind, VisualState};

/// Project the `active` flag onto the visual state used by renderers.
pub fn visual_state_for(active: bool) -> VisualState {
    if active { VisualState::Active } else { VisualState::Offline }
}

/// Advance one entity by one tick.
///
/// The hub, fixed entities and entities currently being dragged keep their
/// position and only refresh their visual state. Everything else moves by its
/// velocity; a velocity component is reflected when the position on that axis
/// leaves `[radius, extent - radius]`. The position itself is not clamped.
pub fn advance(entity: &mut Entity, bounds: &Bounds) {
    if entity.kind == EntityKind::Hub || entity.fixed() || entity.dragging {
        entity.visual_state = visual_state_for(entity.active);
        return;
    }

    entity.position.x += entity.velocity.vx;
    entity.position.y += entity.velocity.vy;

    let radius = entity.radius();
    if entity.position.x < radius || entity.position.x > bounds.width - radius {
        entity.velocity.vx = -entity.velocity.vx;
    }
    if entity.position.y < radius || entity.position.y > bounds.height - radius {
        entity.velocity.vy = -entity.velocity.vy;
    }

    entity.visual_state = visual_state_for(entity.active);
}
