//! Proximity graph construction.
//!
//! The adjacency table is rebuilt from scratch every tick from the current
//! positions. Edge rules depend on the kinds involved:
//!
//! 1. Node ↔ Hub: bidirectional when the distance is within the node's range.
//! 2. Node ↔ Node: bidirectional when the distance is within the range of the
//!    first node of the pair (arena order). Only one side's range is checked.
//! 3. Mobile → Node: directed. The mobile records the node, the node never
//!    records the mobile, so nodes do not treat mobiles as routing peers.
//!
//! Hub ↔ Hub and Mobile ↔ Mobile edges never exist. The per-kind connection
//! cap is reported but not used as a filter.

use super::geometry::within_range;
use super::types::{Entity, EntityId, EntityKind};

/// Connections of every entity, indexed by `EntityId`.
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    lists: Vec<Vec<EntityId>>,
}

impl Adjacency {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty every list and size the table for `entity_count` entities,
    /// reusing existing allocations.
    pub fn clear(&mut self, entity_count: usize) {
        self.lists.resize_with(entity_count, Vec::new);
        for list in &mut self.lists {
            list.clear();
        }
    }

    /// Connections recorded by `id`, in discovery order.
    pub fn neighbors(&self, id: EntityId) -> &[EntityId] {
        self.lists.get(id.0).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True when `from` records `to` as a connection.
    pub fn contains(&self, from: EntityId, to: EntityId) -> bool {
        self.neighbors(from).contains(&to)
    }

    /// Number of recorded (directed) connection entries.
    pub fn entry_count(&self) -> usize {
        self.lists.iter().map(Vec::len).sum()
    }

    fn link(&mut self, a: EntityId, b: EntityId) {
        self.lists[a.0].push(b);
        self.lists[b.0].push(a);
    }

    fn link_directed(&mut self, from: EntityId, to: EntityId) {
        self.lists[from.0].push(to);
    }
}

/// Recompute all connections from the current entity positions.
///
/// `entities` must be the arena (entity `i` has `EntityId(i)`) and `hub` the id
/// of its unique hub. Runs in O(n²).
pub fn rebuild_graph(entities: &[Entity], hub: EntityId, adjacency: &mut Adjacency) {
    adjacency.clear(entities.len());

    let hub_position = entities[hub.0].position;
    let nodes: Vec<&Entity> = entities.iter().filter(|e| e.kind == EntityKind::Node).collect();

    // 1. Node <-> Hub
    for node in &nodes {
        if within_range(&node.position, &hub_position, node.range) {
            adjacency.link(node.id, hub);
        }
    }

    // 2. Node <-> Node, checked against the first node's range
    for (i, first) in nodes.iter().enumerate() {
        for second in &nodes[i + 1..] {
            if within_range(&first.position, &second.position, first.range) {
                adjacency.link(first.id, second.id);
            }
        }
    }

    // 3. Mobile -> Node
    for mobile in entities.iter().filter(|e| e.kind == EntityKind::Mobile) {
        for node in &nodes {
            if within_range(&mobile.position, &node.position, mobile.range) {
                adjacency.link_directed(mobile.id, node.id);
            }
        }
    }

    if log::log_enabled!(log::Level::Trace) {
        let over_cap = entities.iter().filter(|e| adjacency.neighbors(e.id).len() > e.max_connections()).count();
        log::trace!(
            "Graph rebuilt: {} entities, {} connection entries, {} above declared cap",
            entities.len(),
            adjacency.entry_count(),
            over_cap
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::types::{Point, Velocity};

    fn arena(specs: &[(EntityKind, f64, f64)]) -> Vec<Entity> {
        specs
            .iter()
            .enumerate()
            .map(|(i, &(kind, x, y))| Entity::new(EntityId(i), format!("E{}", i), kind, Point::new(x, y), Velocity::default()))
            .collect()
    }

    fn build(entities: &[Entity]) -> Adjacency {
        let mut adjacency = Adjacency::new();
        rebuild_graph(entities, EntityId(0), &mut adjacency);
        adjacency
    }

    #[test]
    fn node_hub_threshold_is_inclusive() {
        let entities = arena(&[
            (EntityKind::Hub, 400.0, 300.0),
            (EntityKind::Node, 580.0, 300.0), // exactly 180 away
            (EntityKind::Node, 400.0, 480.5), // just outside
        ]);
        let adjacency = build(&entities);
        assert!(adjacency.contains(EntityId(1), EntityId(0)));
        assert!(adjacency.contains(EntityId(0), EntityId(1)));
        assert!(!adjacency.contains(EntityId(2), EntityId(0)));
        assert!(!adjacency.contains(EntityId(0), EntityId(2)));
    }

    #[test]
    fn node_at_rounded_range_distance_links_to_hub() {
        let entities = arena(&[(EntityKind::Hub, 0.0, 0.0), (EntityKind::Node, 138.996, 114.36831722116052)]);
        let adjacency = build(&entities);
        assert!(adjacency.contains(EntityId(1), EntityId(0)));
        assert!(adjacency.contains(EntityId(0), EntityId(1)));
    }

    #[test]
    fn node_and_hub_edges_are_symmetric() {
        let entities = arena(&[
            (EntityKind::Hub, 400.0, 300.0),
            (EntityKind::Node, 500.0, 300.0),
            (EntityKind::Node, 600.0, 300.0),
            (EntityKind::Node, 700.0, 350.0),
            (EntityKind::Node, 100.0, 100.0),
        ]);
        let adjacency = build(&entities);
        for a in &entities {
            for b in &entities {
                if a.kind != EntityKind::Mobile && b.kind != EntityKind::Mobile {
                    assert_eq!(adjacency.contains(a.id, b.id), adjacency.contains(b.id, a.id));
                }
            }
        }
        assert!(adjacency.contains(EntityId(1), EntityId(2)));
        assert!(adjacency.contains(EntityId(2), EntityId(3)));
        assert!(adjacency.neighbors(EntityId(4)).is_empty());
    }

    #[test]
    fn node_pair_uses_first_node_range() {
        let mut entities = arena(&[
            (EntityKind::Hub, 0.0, 0.0),
            (EntityKind::Node, 1000.0, 1000.0),
            (EntityKind::Node, 1150.0, 1000.0),
        ]);
        entities[1].range = 100.0;
        entities[2].range = 200.0;
        assert!(!build(&entities).contains(EntityId(2), EntityId(1)));

        entities[1].range = 200.0;
        entities[2].range = 100.0;
        let adjacency = build(&entities);
        assert!(adjacency.contains(EntityId(1), EntityId(2)));
        assert!(adjacency.contains(EntityId(2), EntityId(1)));
    }

    #[test]
    fn mobile_edges_are_directed_and_never_between_mobiles() {
        let entities = arena(&[
            (EntityKind::Hub, 400.0, 300.0),
            (EntityKind::Node, 200.0, 300.0),
            (EntityKind::Mobile, 250.0, 300.0),
            (EntityKind::Mobile, 260.0, 300.0),
            (EntityKind::Mobile, 400.0, 330.0), // near the hub only
        ]);
        let adjacency = build(&entities);

        assert_eq!(adjacency.neighbors(EntityId(2)), &[EntityId(1)]);
        assert_eq!(adjacency.neighbors(EntityId(3)), &[EntityId(1)]);
        assert!(!adjacency.contains(EntityId(1), EntityId(2)));
        assert!(!adjacency.contains(EntityId(1), EntityId(3)));
        assert!(!adjacency.contains(EntityId(2), EntityId(3)));
        // Mobiles never connect to the hub directly.
        assert!(adjacency.neighbors(EntityId(4)).is_empty());
        assert!(!adjacency.contains(EntityId(0), EntityId(4)));
    }

    #[test]
    fn rebuild_overwrites_previous_connections() {
        let mut entities = arena(&[(EntityKind::Hub, 400.0, 300.0), (EntityKind::Node, 450.0, 300.0)]);
        let mut adjacency = Adjacency::new();
        rebuild_graph(&entities, EntityId(0), &mut adjacency);
        assert!(adjacency.contains(EntityId(1), EntityId(0)));

        entities[1].position = Point::new(50.0, 50.0);
        rebuild_graph(&entities, EntityId(0), &mut adjacency);
        assert!(adjacency.neighbors(EntityId(0)).is_empty());
        assert!(adjacency.neighbors(EntityId(1)).is_empty());
        assert_eq!(adjacency.entry_count(), 0);
    }
}
