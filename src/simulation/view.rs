//! Serializable read-only snapshot of a simulation, for renderers and reports.

use serde::Serialize;

use super::network::{Simulation, SimulationStats};
use super::packet::PacketId;
use super::types::{Bounds, EntityId, EntityKind, Point, VisualState};

#[derive(Debug, Clone, Serialize)]
pub struct EntityView {
    pub id: EntityId,
    pub label: String,
    pub kind: EntityKind,
    pub position: Point,
    pub radius: f64,
    pub range: f64,
    pub active: bool,
    pub visual_state: VisualState,
    /// Labels of the entities this one links to, as of the last rebuild.
    pub connections: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PacketView {
    pub id: PacketId,
    pub path: Vec<String>,
    pub current_step: usize,
    pub progress: f64,
    pub position: Point,
    pub active: bool,
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkSnapshot {
    pub tick: u64,
    pub paused: bool,
    pub bounds: Bounds,
    pub current_range: Option<f64>,
    pub entities: Vec<EntityView>,
    pub packets: Vec<PacketView>,
    pub stats: SimulationStats,
}

impl NetworkSnapshot {
    pub fn capture(simulation: &Simulation) -> Self {
        let entities = simulation.entities();
        let label_of = |id: &EntityId| entities[id.0].label.clone();

        let entity_views = entities
            .iter()
            .map(|e| EntityView {
                id: e.id,
                label: e.label.clone(),
                kind: e.kind,
                position: e.position,
                radius: e.radius(),
                range: e.range,
                active: e.active,
                visual_state: e.visual_state,
                connections: simulation.connections(e.id).iter().map(label_of).collect(),
            })
            .collect();

        let packet_views = simulation
            .packets()
            .iter()
            .map(|p| PacketView {
                id: p.id(),
                path: p.path().iter().map(label_of).collect(),
                current_step: p.current_step(),
                progress: p.progress(),
                position: p.position(),
                active: p.is_active(),
            })
            .collect();

        Self {
            tick: simulation.tick_count(),
            paused: simulation.paused(),
            bounds: simulation.bounds(),
            current_range: simulation.current_range(),
            entities: entity_views,
            packets: packet_views,
            stats: simulation.stats().clone(),
        }
    }

    /// Number of directed adjacency entries across all entities.
    pub fn link_count(&self) -> usize {
        self.entities.iter().map(|e| e.connections.len()).sum()
    }
}
