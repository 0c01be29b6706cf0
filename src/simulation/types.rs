//! Type definitions for the simulation.
//!
//! Contains the data structures shared across the core:
//! - Geometry primitives (points, velocities, world bounds)
//! - Entity kinds and their constant profile table
//! - The entity record stored in the simulation arena
//! - Tunable settings, configuration errors and diagnostics

use serde::{Deserialize, Serialize};

/// Inset (world units) applied on every side of the world when placing entities.
pub const PLACEMENT_MARGIN: f64 = 50.0;

/// Range used for node placement when no simulation-wide range is set.
pub const DEFAULT_PLACEMENT_RANGE: f64 = 180.0;

/// Fraction of a segment a packet covers per tick (20 ticks per hop).
pub const DEFAULT_PACKET_SPEED: f64 = 0.05;

/// Outer retry ceiling for node placement.
pub const NODE_PLACEMENT_ATTEMPTS: u32 = 100;

/// Candidate positions sampled per outer node placement attempt.
pub const NODE_PLACEMENT_CANDIDATES: u32 = 10;

/// Upper bound on entities of one kind a reset may request.
pub const MAX_ENTITIES: usize = 10000;

/// Upper bound for either world dimension.
pub const MAX_WORLD_COORD: f64 = 10000.0;

/// Maximum number of buffered diagnostics before the oldest is dropped.
pub const DIAGNOSTICS_CAPACITY: usize = 256;

/// Simple 2D point in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Per-tick displacement of a drifting entity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub vx: f64,
    pub vy: f64,
}

/// World size as reported by the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Validated constructor; both dimensions must be finite and positive.
    pub fn new(width: f64, height: f64) -> Result<Self, ConfigError> {
        let bounds = Self { width, height };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.width.is_finite() || !self.height.is_finite() || self.width <= 0.0 || self.height <= 0.0 {
            return Err(ConfigError::InvalidBounds {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// The three participant kinds. Never changes after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Hub,
    Node,
    Mobile,
}

/// Constants that depend only on the entity kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindProfile {
    /// Visual and hit-test size.
    pub radius: f64,
    /// Range given to new entities of this kind when no override is set.
    pub default_range: f64,
    /// Fixed entities never drift.
    pub fixed: bool,
    /// Declared connection cap. Reported but never used to filter edges.
    pub max_connections: usize,
    /// Prefix for generated display labels.
    pub label_prefix: &'static str,
}

const HUB_PROFILE: KindProfile = KindProfile {
    radius: 35.0,
    default_range: 0.0,
    fixed: true,
    max_connections: 4,
    label_prefix: "HUB",
};

const NODE_PROFILE: KindProfile = KindProfile {
    radius: 15.0,
    default_range: 180.0,
    fixed: true,
    max_connections: 4,
    label_prefix: "N",
};

const MOBILE_PROFILE: KindProfile = KindProfile {
    radius: 10.0,
    default_range: 120.0,
    fixed: false,
    max_connections: 4,
    label_prefix: "M",
};

impl EntityKind {
    pub const fn profile(self) -> &'static KindProfile {
        match self {
            EntityKind::Hub => &HUB_PROFILE,
            EntityKind::Node => &NODE_PROFILE,
            EntityKind::Mobile => &MOBILE_PROFILE,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Hub => write!(f, "HUB"),
            EntityKind::Node => write!(f, "NODE"),
            EntityKind::Mobile => write!(f, "MOBILE"),
        }
    }
}

/// Index of an entity in the simulation arena. Stable until the next reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntityId(pub usize);

/// Binary projection of the `active` flag used by renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualState {
    Active,
    Offline,
}

/// One network participant.
///
/// Connections are not stored here: the simulation keeps them in an
/// adjacency table keyed by `EntityId` that is rebuilt every tick.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    /// Display identifier, unique within the kind.
    pub label: String,
    pub kind: EntityKind,
    pub position: Point,
    pub velocity: Velocity,
    /// Maximum distance at which this entity forms outgoing edges.
    pub range: f64,
    pub active: bool,
    /// Set while an external collaborator holds the entity under the pointer.
    pub dragging: bool,
    /// Last projected visual state; refreshed by kinematics.
    pub visual_state: VisualState,
}

impl Entity {
    pub fn new(id: EntityId, label: String, kind: EntityKind, position: Point, velocity: Velocity) -> Self {
        Self {
            id,
            label,
            kind,
            position,
            velocity,
            range: kind.profile().default_range,
            active: true,
            dragging: false,
            visual_state: VisualState::Active,
        }
    }

    pub fn radius(&self) -> f64 {
        self.kind.profile().radius
    }

    pub fn fixed(&self) -> bool {
        self.kind.profile().fixed
    }

    pub fn max_connections(&self) -> usize {
        self.kind.profile().max_connections
    }
}

/// Tunables of a simulation instance. Defaults mirror the constants above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Segment fraction a packet advances per tick.
    pub packet_speed: f64,
    /// Inset applied on every side of the world during placement.
    pub placement_margin: f64,
    pub node_placement_attempts: u32,
    pub node_placement_candidates: u32,
    pub diagnostics_capacity: usize,
    /// Population built by `Simulation::new`.
    pub initial_node_count: usize,
    pub initial_mobile_count: usize,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            packet_speed: DEFAULT_PACKET_SPEED,
            placement_margin: PLACEMENT_MARGIN,
            node_placement_attempts: NODE_PLACEMENT_ATTEMPTS,
            node_placement_candidates: NODE_PLACEMENT_CANDIDATES,
            diagnostics_capacity: DIAGNOSTICS_CAPACITY,
            initial_node_count: 8,
            initial_mobile_count: 5,
        }
    }
}

impl SimulationSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.packet_speed.is_finite() || self.packet_speed <= 0.0 || self.packet_speed > 1.0 {
            return Err(ConfigError::InvalidPacketSpeed(self.packet_speed));
        }
        if !self.placement_margin.is_finite() || self.placement_margin < 0.0 {
            return Err(ConfigError::InvalidSetting(format!(
                "placement_margin {} must be finite and non-negative",
                self.placement_margin
            )));
        }
        if self.node_placement_attempts == 0 || self.node_placement_candidates == 0 {
            return Err(ConfigError::InvalidSetting("node placement attempts and candidates must be positive".to_string()));
        }
        if self.initial_node_count > MAX_ENTITIES || self.initial_mobile_count > MAX_ENTITIES {
            return Err(ConfigError::TooManyEntities {
                requested: self.initial_node_count.max(self.initial_mobile_count),
                max: MAX_ENTITIES,
            });
        }
        Ok(())
    }
}

/// Rejected configuration input. The simulation state is unchanged when one is returned.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NonPositiveRange(f64),
    InvalidBounds { width: f64, height: f64 },
    TooManyEntities { requested: usize, max: usize },
    InvalidPacketSpeed(f64),
    InvalidSetting(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NonPositiveRange(range) => write!(f, "Range must be a positive number, got {}", range),
            ConfigError::InvalidBounds { width, height } => {
                write!(f, "World bounds must be positive and finite, got {}x{}", width, height)
            }
            ConfigError::TooManyEntities { requested, max } => {
                write!(f, "Requested {} entities, maximum per kind is {}", requested, max)
            }
            ConfigError::InvalidPacketSpeed(speed) => write!(f, "Packet speed must be in (0, 1], got {}", speed),
            ConfigError::InvalidSetting(msg) => write!(f, "Invalid setting: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Non-fatal outcomes reported through the diagnostics channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Routing found no path to the hub.
    HubUnreachable { source: String },
    /// A mobile asked to send while not connected to any node.
    NoSignal { mobile: String },
    /// Node placement gave up after the retry ceiling.
    PlacementExhausted { kind: EntityKind, attempts: u32 },
    /// Mobile-origin routing was requested for a non-mobile entity.
    NotAMobile { label: String },
}

/// A diagnostic stamped with the tick at which it was raised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticRecord {
    pub tick: u64,
    pub diagnostic: Diagnostic,
}
