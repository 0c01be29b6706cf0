//! In-flight packets and their motion along a precomputed path.

use serde::Serialize;

use super::geometry::lerp;
use super::types::{Entity, EntityId, Point};

/// Identifier of a packet, unique within one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PacketId(pub u64);

/// A delivery animated along a fixed path from its source to the hub.
///
/// The path is resolved once by the router and never recomputed, even when
/// the graph changes underneath it. Waypoint positions are read live, so a
/// packet follows entities that move while it is in flight.
#[derive(Debug, Clone)]
pub struct Packet {
    id: PacketId,
    path: Vec<EntityId>,
    current_step: usize,
    progress: f64,
    position: Point,
    active: bool,
    speed: f64,
    ticks_in_segment: u32,
    ticks_per_segment: u32,
}

/// Number of ticks a segment takes at `speed`: the smallest `n` with `n·speed ≥ 1`.
///
/// Counting ticks instead of accumulating the fraction keeps a 0.05 speed at
/// exactly 20 ticks per hop.
pub fn ticks_per_segment(speed: f64) -> u32 {
    ((1.0 - 1e-9) / speed).ceil().max(1.0) as u32
}

impl Packet {
    /// Create a packet at the first waypoint.
    ///
    /// A single-waypoint path is already delivered and the packet starts
    /// inactive. An empty path also yields an inactive packet.
    pub fn new(id: PacketId, path: Vec<EntityId>, entities: &[Entity], speed: f64) -> Self {
        let position = path.first().map(|first| entities[first.0].position).unwrap_or_default();
        let active = path.len() > 1;
        Self {
            id,
            path,
            current_step: 0,
            progress: 0.0,
            position,
            active,
            speed,
            ticks_in_segment: 0,
            ticks_per_segment: ticks_per_segment(speed),
        }
    }

    pub fn id(&self) -> PacketId {
        self.id
    }

    pub fn path(&self) -> &[EntityId] {
        &self.path
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Fraction of the current segment already traversed, in `[0, 1)`.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn source(&self) -> Option<EntityId> {
        self.path.first().copied()
    }

    /// Advance by one tick.
    ///
    /// Progress grows by `speed`; the position is interpolated between the
    /// current and next waypoint. Completing a segment moves to the next one
    /// and completing the last segment deactivates the packet with its
    /// position on the final waypoint.
    pub fn advance(&mut self, entities: &[Entity]) {
        if !self.active {
            return;
        }
        if self.current_step + 1 >= self.path.len() {
            self.active = false;
            return;
        }

        let start = entities[self.path[self.current_step].0].position;
        let end = entities[self.path[self.current_step + 1].0].position;

        self.ticks_in_segment += 1;
        let segment_done = self.ticks_in_segment >= self.ticks_per_segment;
        let t = if segment_done { 1.0 } else { f64::from(self.ticks_in_segment) * self.speed };
        self.position = lerp(&start, &end, t);

        if segment_done {
            self.ticks_in_segment = 0;
            self.progress = 0.0;
            self.current_step += 1;
            if self.current_step + 1 >= self.path.len() {
                self.active = false;
            }
        } else {
            self.progress = t;
        }
    }
}
