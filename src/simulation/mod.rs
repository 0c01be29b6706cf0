//! Hub-and-mesh network simulation core.
//!
//! A single hub sinks all traffic. Fixed nodes form a backbone mesh around it
//! and drifting mobiles attach to whatever nodes are in range. Every tick the
//! proximity graph is rebuilt from current positions, and packets routed by
//! breadth-first search travel hop by hop towards the hub.
//!
//! ## Module Organization
//!
//! - `types`: Entities, kind profiles, settings, errors and diagnostics
//! - `geometry`: Distance, interpolation and inset helpers
//! - `kinematics`: Drift and wall reflection for mobile entities
//! - `connectivity`: Per-tick adjacency rebuild
//! - `placement`: Constructive random placement of new entities
//! - `router`: Minimum-hop path search to the hub
//! - `packet`: Packet motion along a resolved path
//! - `network`: The `Simulation` instance tying the above together
//! - `view`: Serializable snapshots for renderers and reports
//!
//! The core is synchronous and single-threaded. Callers drive it by calling
//! `Simulation::tick` at their own frame rate.

pub mod connectivity;
pub mod geometry;
pub mod kinematics;
pub mod network;
pub mod packet;
pub mod placement;
pub mod router;
pub mod types;
pub mod view;

pub use network::{PopulationReport, Simulation, SimulationStats};
pub use packet::{Packet, PacketId};
pub use types::{Bounds, ConfigError, Diagnostic, DiagnosticRecord, Entity, EntityId, EntityKind, Point, SimulationSettings};
pub use view::NetworkSnapshot;
