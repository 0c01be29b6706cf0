//! The simulation instance: entity arena, live graph, packets and the tick loop.
//!
//! High-level flow of one tick:
//! 1) Kinematics moves drifting entities (skipped while paused).
//! 2) The proximity graph is rebuilt from current positions (always, so a
//!    drag while paused still updates connectivity).
//! 3) Delivered packets are dropped and the remaining ones advance (skipped
//!    while paused).
//!
//! Routing and placement run on demand between ticks and see the graph as of
//! the most recent rebuild.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::collections::VecDeque;

use super::connectivity::{Adjacency, rebuild_graph};
use super::geometry::{clamp_to_inset, distance2};
use super::kinematics;
use super::packet::{Packet, PacketId};
use super::placement::{initial_velocity, next_label, place_mobile, place_node};
use super::router::{RouteFailure, Traversal, find_path};
use super::types::{
    Bounds, ConfigError, DEFAULT_PLACEMENT_RANGE, Diagnostic, DiagnosticRecord, Entity, EntityId, EntityKind, MAX_ENTITIES, Point, SimulationSettings,
};

/// Extra slack around an entity's radius accepted by `entity_at`.
const HIT_SLACK: f64 = 10.0;

/// Running counters for one simulation instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimulationStats {
    pub packets_routed: u64,
    pub packets_delivered: u64,
    pub routes_failed: u64,
    pub placements_failed: u64,
}

/// Outcome of a reset: how many entities were requested and actually placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PopulationReport {
    pub nodes_requested: usize,
    pub nodes_placed: usize,
    pub mobiles_requested: usize,
    pub mobiles_placed: usize,
}

/// Owns all state of one running network.
///
/// External collaborators (renderers, input handlers, scripted scenarios) read
/// through the accessors and change state only through the operations below.
pub struct Simulation {
    entities: Vec<Entity>,
    hub: EntityId,
    adjacency: Adjacency,
    packets: Vec<Packet>,
    bounds: Bounds,
    paused: bool,
    current_range: Option<f64>,
    settings: SimulationSettings,
    rng: StdRng,
    tick_count: u64,
    next_packet_id: u64,
    stats: SimulationStats,
    diagnostics: VecDeque<DiagnosticRecord>,
}

impl Simulation {
    /// Create a simulation with default settings and the default population.
    pub fn new(bounds: Bounds) -> Result<Self, ConfigError> {
        Self::with_settings(bounds, SimulationSettings::default(), StdRng::from_entropy())
    }

    /// Same as `new` but with a reproducible random stream.
    pub fn seeded(bounds: Bounds, seed: u64) -> Result<Self, ConfigError> {
        Self::with_settings(bounds, SimulationSettings::default(), StdRng::seed_from_u64(seed))
    }

    /// Create a simulation populated with `settings.initial_*_count` entities.
    pub fn with_settings(bounds: Bounds, settings: SimulationSettings, rng: StdRng) -> Result<Self, ConfigError> {
        bounds.validate()?;
        settings.validate()?;

        let diagnostics_capacity = settings.diagnostics_capacity;
        let (node_count, mobile_count) = (settings.initial_node_count, settings.initial_mobile_count);
        let mut simulation = Self {
            entities: Vec::new(),
            hub: EntityId(0),
            adjacency: Adjacency::new(),
            packets: Vec::new(),
            bounds,
            paused: false,
            current_range: None,
            settings,
            rng,
            tick_count: 0,
            next_packet_id: 1,
            stats: SimulationStats::default(),
            diagnostics: VecDeque::with_capacity(diagnostics_capacity.min(64)),
        };
        simulation.reset(node_count, mobile_count)?;
        Ok(simulation)
    }

    // ---------- Tick loop ----------

    /// Advance the simulation by one step.
    pub fn tick(&mut self) {
        if !self.paused {
            for entity in &mut self.entities {
                kinematics::advance(entity, &self.bounds);
            }
        }

        rebuild_graph(&self.entities, self.hub, &mut self.adjacency);

        if !self.paused {
            self.packets.retain(Packet::is_active);
            for packet in &mut self.packets {
                packet.advance(&self.entities);
                if !packet.is_active() {
                    self.stats.packets_delivered += 1;
                    let source = packet.source().map_or("?", |id| self.entities[id.0].label.as_str());
                    log::debug!("Packet {} from {} delivered to the hub", packet.id().0, source);
                }
            }
        }

        self.tick_count += 1;
    }

    // ---------- Population ----------

    /// Discard all entities and packets and rebuild the network.
    ///
    /// The hub is placed at the world centre, then nodes and mobiles are
    /// placed one by one, so each placement sees the previous ones. Node
    /// placement may fall short under pathological density; the report says
    /// by how much.
    pub fn reset(&mut self, node_count: usize, mobile_count: usize) -> Result<PopulationReport, ConfigError> {
        if node_count > MAX_ENTITIES || mobile_count > MAX_ENTITIES {
            return Err(ConfigError::TooManyEntities {
                requested: node_count.max(mobile_count),
                max: MAX_ENTITIES,
            });
        }

        self.entities.clear();
        self.packets.clear();

        let hub_velocity = initial_velocity(&mut self.rng);
        let hub = Entity::new(EntityId(0), "HUB".to_string(), EntityKind::Hub, self.bounds.center(), hub_velocity);
        self.hub = hub.id;
        self.entities.push(hub);

        let nodes_placed = (0..node_count).filter(|_| self.add_entity(EntityKind::Node).is_some()).count();
        let mobiles_placed = (0..mobile_count).filter(|_| self.add_entity(EntityKind::Mobile).is_some()).count();

        rebuild_graph(&self.entities, self.hub, &mut self.adjacency);

        let report = PopulationReport {
            nodes_requested: node_count,
            nodes_placed,
            mobiles_requested: mobile_count,
            mobiles_placed,
        };
        if nodes_placed < node_count {
            log::warn!("Reset placed only {}/{} nodes", nodes_placed, node_count);
        }
        log::info!("Network reset: 1 hub, {} nodes, {} mobiles", nodes_placed, mobiles_placed);
        Ok(report)
    }

    /// Place a new node or mobile with the placement engine.
    ///
    /// Returns `None` for the hub kind and when node placement is exhausted.
    /// The new entity gets connections at the next rebuild.
    pub fn add_entity(&mut self, kind: EntityKind) -> Option<EntityId> {
        let position = match kind {
            EntityKind::Hub => {
                log::warn!("Ignoring request to add a second hub");
                return None;
            }
            EntityKind::Mobile => place_mobile(&self.bounds, self.settings.placement_margin, &mut self.rng),
            EntityKind::Node => {
                let range = self.current_range.unwrap_or(DEFAULT_PLACEMENT_RANGE);
                match place_node(&self.entities, &self.bounds, range, &self.settings, &mut self.rng) {
                    Some(position) => position,
                    None => {
                        let attempts = self.settings.node_placement_attempts;
                        log::warn!("Node placement exhausted after {} attempts", attempts);
                        self.stats.placements_failed += 1;
                        self.push_diagnostic(Diagnostic::PlacementExhausted { kind, attempts });
                        return None;
                    }
                }
            }
        };
        Some(self.spawn(kind, position))
    }

    /// Add a node or mobile at an explicit position, clamped into the world.
    pub fn add_entity_at(&mut self, kind: EntityKind, position: Point) -> Option<EntityId> {
        if kind == EntityKind::Hub {
            log::warn!("Ignoring request to add a second hub");
            return None;
        }
        let clamped = clamp_to_inset(&position, &self.bounds, kind.profile().radius);
        Some(self.spawn(kind, clamped))
    }

    fn spawn(&mut self, kind: EntityKind, position: Point) -> EntityId {
        let id = EntityId(self.entities.len());
        let label = next_label(&self.entities, kind, &mut self.rng);
        let velocity = initial_velocity(&mut self.rng);
        let mut entity = Entity::new(id, label, kind, position, velocity);
        if let Some(range) = self.current_range {
            entity.range = range;
        }
        log::debug!("Added {} {} at ({:.1}, {:.1})", kind, entity.label, position.x, position.y);
        self.entities.push(entity);
        id
    }

    // ---------- Settings ----------

    /// Set the range of every non-hub entity, now and for future ones.
    pub fn set_range(&mut self, range: f64) -> Result<(), ConfigError> {
        if !range.is_finite() || range <= 0.0 {
            return Err(ConfigError::NonPositiveRange(range));
        }
        for entity in self.entities.iter_mut().filter(|e| e.kind != EntityKind::Hub) {
            entity.range = range;
        }
        self.current_range = Some(range);
        Ok(())
    }

    /// Flip the paused flag and return the new state.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        log::info!("Simulation {}", if self.paused { "paused" } else { "resumed" });
        self.paused
    }

    /// Update the world size after the display surface was resized.
    pub fn set_bounds(&mut self, bounds: Bounds) -> Result<(), ConfigError> {
        bounds.validate()?;
        self.bounds = bounds;
        Ok(())
    }

    // ---------- Routing ----------

    /// Route a packet from any non-hub entity, hopping only over active entities.
    pub fn route(&mut self, source: EntityId) -> Option<&Packet> {
        self.dispatch(source, Traversal::General)
    }

    /// Route a packet from a mobile through its currently connected nodes.
    ///
    /// Mobiles never forward and activity is not checked along the way. A
    /// mobile without node connections produces no packet.
    pub fn route_from_mobile(&mut self, mobile: EntityId) -> Option<&Packet> {
        self.dispatch(mobile, Traversal::MobileOrigin)
    }

    fn dispatch(&mut self, source: EntityId, traversal: Traversal) -> Option<&Packet> {
        if source.0 >= self.entities.len() {
            log::warn!("Route requested from unknown entity {}", source.0);
            return None;
        }

        match find_path(&self.entities, &self.adjacency, self.hub, source, traversal) {
            Ok(path) => {
                let id = PacketId(self.next_packet_id);
                self.next_packet_id += 1;
                log::debug!("Packet {} routed: {}", id.0, self.describe_path(&path));
                self.packets.push(Packet::new(id, path, &self.entities, self.settings.packet_speed));
                self.stats.packets_routed += 1;
                self.packets.last()
            }
            Err(failure) => {
                self.report_route_failure(source, failure);
                None
            }
        }
    }

    fn report_route_failure(&mut self, source: EntityId, failure: RouteFailure) {
        let label = self.entities[source.0].label.clone();
        match failure {
            RouteFailure::SourceIsHub => {
                log::debug!("Hub is a sink, not routing from it");
            }
            RouteFailure::NotAMobile => {
                log::debug!("{} is not a mobile, mobile-origin routing skipped", label);
                self.push_diagnostic(Diagnostic::NotAMobile { label });
            }
            RouteFailure::NoSignal => {
                log::warn!("Mobile {} has no node in range", label);
                self.push_diagnostic(Diagnostic::NoSignal { mobile: label });
            }
            RouteFailure::HubUnreachable => {
                log::warn!("No path to hub from {}", label);
                self.stats.routes_failed += 1;
                self.push_diagnostic(Diagnostic::HubUnreachable { source: label });
            }
        }
    }

    fn describe_path(&self, path: &[EntityId]) -> String {
        path.iter().map(|id| self.entities[id.0].label.as_str()).collect::<Vec<_>>().join(" -> ")
    }

    // ---------- Entity state ----------

    /// Turn an entity on or off. Returns false for unknown ids.
    pub fn set_active(&mut self, id: EntityId, active: bool) -> bool {
        match self.entities.get_mut(id.0) {
            Some(entity) => {
                entity.active = active;
                log::debug!("{} turned {}", entity.label, if active { "on" } else { "off" });
                true
            }
            None => false,
        }
    }

    /// Flip an entity's active flag and return the new value.
    pub fn toggle_active(&mut self, id: EntityId) -> Option<bool> {
        let active = !self.entities.get(id.0)?.active;
        self.set_active(id, active);
        Some(active)
    }

    /// Pick up an entity for dragging. Only active entities can be picked up;
    /// their drift is stopped.
    pub fn begin_drag(&mut self, id: EntityId) -> bool {
        match self.entities.get_mut(id.0) {
            Some(entity) if entity.active => {
                entity.dragging = true;
                entity.velocity.vx = 0.0;
                entity.velocity.vy = 0.0;
                true
            }
            _ => false,
        }
    }

    /// Move a dragged entity, keeping it fully inside the world.
    pub fn drag_to(&mut self, id: EntityId, position: Point) -> bool {
        let bounds = self.bounds;
        match self.entities.get_mut(id.0) {
            Some(entity) if entity.dragging => {
                entity.position = clamp_to_inset(&position, &bounds, entity.radius());
                true
            }
            _ => false,
        }
    }

    pub fn end_drag(&mut self, id: EntityId) {
        if let Some(entity) = self.entities.get_mut(id.0) {
            entity.dragging = false;
        }
    }

    /// Topmost entity whose centre lies within its radius plus a small slack of `point`.
    pub fn entity_at(&self, point: Point) -> Option<EntityId> {
        self.entities
            .iter()
            .rev()
            .find(|e| {
                let reach = e.radius() + HIT_SLACK;
                distance2(&e.position, &point) < reach * reach
            })
            .map(|e| e.id)
    }

    // ---------- Diagnostics ----------

    fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        if self.settings.diagnostics_capacity == 0 {
            return;
        }
        if self.diagnostics.len() >= self.settings.diagnostics_capacity {
            self.diagnostics.pop_front();
        }
        self.diagnostics.push_back(DiagnosticRecord {
            tick: self.tick_count,
            diagnostic,
        });
    }

    /// Drain all buffered diagnostics, oldest first.
    pub fn drain_diagnostics(&mut self) -> Vec<DiagnosticRecord> {
        self.diagnostics.drain(..).collect()
    }

    // ---------- Read-only views ----------

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.0)
    }

    pub fn hub(&self) -> &Entity {
        &self.entities[self.hub.0]
    }

    pub fn hub_id(&self) -> EntityId {
        self.hub
    }

    /// Connections of `id` as of the most recent rebuild.
    pub fn connections(&self, id: EntityId) -> &[EntityId] {
        self.adjacency.neighbors(id)
    }

    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn current_range(&self) -> Option<f64> {
        self.current_range
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    pub fn count_of(&self, kind: EntityKind) -> usize {
        self.entities.iter().filter(|e| e.kind == kind).count()
    }

    /// The `ordinal`-th entity of `kind` in insertion order.
    pub fn nth_of_kind(&self, kind: EntityKind, ordinal: usize) -> Option<EntityId> {
        self.entities.iter().filter(|e| e.kind == kind).nth(ordinal).map(|e| e.id)
    }

    pub fn find_by_label(&self, label: &str) -> Option<EntityId> {
        self.entities.iter().find(|e| e.label == label).map(|e| e.id)
    }
}
