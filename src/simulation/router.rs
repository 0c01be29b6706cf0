//! Breadth-first routing from a source entity to the hub.
//!
//! Both variants use a FIFO queue and a parent table, so the reconstructed
//! path has a minimum hop count. Ties between equally short paths are broken
//! by neighbour discovery order and are not part of the contract. Routing only
//! reads the adjacency table as of the most recent rebuild.

use std::collections::VecDeque;

use super::connectivity::Adjacency;
use super::types::{Entity, EntityId, EntityKind};

/// Traversal restriction applied while expanding the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Start from the source itself and expand only active neighbours.
    /// Intermediate kinds are not restricted.
    General,
    /// Start from every node the source mobile is connected to and expand
    /// only non-mobile neighbours. Activity is not checked in this variant.
    MobileOrigin,
}

/// Why a route could not be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteFailure {
    /// The source is the hub, which only sinks traffic.
    SourceIsHub,
    /// Mobile-origin routing was asked for a non-mobile source.
    NotAMobile,
    /// The mobile has no node connections to seed the search with.
    NoSignal,
    /// The search ran out of entities without dequeuing the hub.
    HubUnreachable,
}

/// Find a minimum-hop path from `source` to `hub`, both ends included.
pub fn find_path(entities: &[Entity], adjacency: &Adjacency, hub: EntityId, source: EntityId, traversal: Traversal) -> Result<Vec<EntityId>, RouteFailure> {
    if source == hub || entities[source.0].kind == EntityKind::Hub {
        return Err(RouteFailure::SourceIsHub);
    }

    let mut visited = vec![false; entities.len()];
    let mut parents: Vec<Option<EntityId>> = vec![None; entities.len()];
    let mut queue = VecDeque::new();

    match traversal {
        Traversal::General => {
            visited[source.0] = true;
            queue.push_back(source);
        }
        Traversal::MobileOrigin => {
            if entities[source.0].kind != EntityKind::Mobile {
                return Err(RouteFailure::NotAMobile);
            }
            for &entry in adjacency.neighbors(source) {
                if entities[entry.0].kind == EntityKind::Node && !visited[entry.0] {
                    visited[entry.0] = true;
                    parents[entry.0] = Some(source);
                    queue.push_back(entry);
                }
            }
            if queue.is_empty() {
                return Err(RouteFailure::NoSignal);
            }
        }
    }

    while let Some(current) = queue.pop_front() {
        if current == hub {
            return Ok(reconstruct(&parents, source, hub));
        }

        for &neighbor in adjacency.neighbors(current) {
            if visited[neighbor.0] {
                continue;
            }
            let expandable = match traversal {
                Traversal::General => entities[neighbor.0].active,
                Traversal::MobileOrigin => entities[neighbor.0].kind != EntityKind::Mobile,
            };
            if expandable {
                visited[neighbor.0] = true;
                parents[neighbor.0] = Some(current);
                queue.push_back(neighbor);
            }
        }
    }

    Err(RouteFailure::HubUnreachable)
}

/// Walk the parent table back from `hub` to `source`.
fn reconstruct(parents: &[Option<EntityId>], source: EntityId, hub: EntityId) -> Vec<EntityId> {
    let mut path = vec![hub];
    let mut current = hub;
    while current != source {
        match parents[current.0] {
            Some(parent) => {
                path.push(parent);
                current = parent;
            }
            None => break,
        }
    }
    path.reverse();
    path
}
