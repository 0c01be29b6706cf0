//! Scene loading, parsing, and validation logic.
//!
//! A scene describes the world size, the initial population, optional
//! hand-placed entities and a script of timed commands. Loading validates it
//! against the simulation's limits before anything is built.

use anyhow::Context;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use std::fs;

use crate::control::ScheduledCommand;
use crate::simulation::types::{MAX_ENTITIES, MAX_WORLD_COORD};
use crate::simulation::{Bounds, ConfigError, EntityKind, Point, Simulation, SimulationSettings};

/// Error type for scene loading failures.
#[derive(Debug)]
pub enum SceneLoadError {
    FileReadError(String),
    ParseError(String),
    ValidationError(String),
}

impl std::fmt::Display for SceneLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneLoadError::FileReadError(msg) => write!(f, "Failed to read file: {}", msg),
            SceneLoadError::ParseError(msg) => write!(f, "Failed to parse JSON: {}", msg),
            SceneLoadError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for SceneLoadError {}

/// An entity placed at a fixed position instead of by the placement engine.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneEntity {
    pub kind: EntityKind,
    pub position: Point,
    /// Start switched off.
    #[serde(default)]
    pub offline: bool,
}

/// Root structure representing the entire scene.
#[derive(Debug, Clone, Deserialize)]
pub struct Scene {
    /// Width of the world in world units.
    pub width: f64,
    /// Height of the world in world units.
    pub height: f64,
    /// Nodes placed by the placement engine on reset.
    #[serde(default)]
    pub node_count: usize,
    /// Mobiles placed by the placement engine on reset.
    #[serde(default)]
    pub mobile_count: usize,
    /// Range override applied before placement.
    #[serde(default)]
    pub range: Option<f64>,
    /// Seed for a reproducible run. Fresh entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Number of ticks the runner executes.
    pub ticks: u64,
    #[serde(default)]
    pub settings: SimulationSettings,
    /// Hand-placed entities added after the generated population.
    #[serde(default)]
    pub layout: Vec<SceneEntity>,
    /// Scripted commands, applied before the tick they are stamped with.
    #[serde(default)]
    pub events: Vec<ScheduledCommand>,
}

impl Scene {
    /// Build a simulation populated as the scene describes.
    ///
    /// Hand-placed entities get their connections at the first tick.
    pub fn build_simulation(&self) -> Result<Simulation, ConfigError> {
        let settings = SimulationSettings {
            initial_node_count: 0,
            initial_mobile_count: 0,
            ..self.settings.clone()
        };
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut simulation = Simulation::with_settings(Bounds::new(self.width, self.height)?, settings, rng)?;
        if let Some(range) = self.range {
            simulation.set_range(range)?;
        }
        simulation.reset(self.node_count, self.mobile_count)?;

        for entity in &self.layout {
            if let Some(id) = simulation.add_entity_at(entity.kind, entity.position) {
                if entity.offline {
                    simulation.set_active(id, false);
                }
            }
        }
        Ok(simulation)
    }
}

/// Load and parse a scene from a file.
///
/// # Parameters
///
/// * `path` - Path to the scene JSON file
///
/// # Returns
///
/// Parsed and validated Scene or an error.
pub fn load_scene(path: &str) -> Result<Scene, SceneLoadError> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path))
        .map_err(|e| SceneLoadError::FileReadError(e.to_string()))?;

    parse_scene(&data)
}

/// Parse and validate a scene from its JSON text.
pub fn parse_scene(data: &str) -> Result<Scene, SceneLoadError> {
    let scene: Scene = serde_json::from_str(data)
        .context("Invalid JSON format")
        .map_err(|e| SceneLoadError::ParseError(format!("{:#}", e)))?;

    validate_scene(&scene).map_err(SceneLoadError::ValidationError)?;

    Ok(scene)
}

/// Validate scene configuration.
///
/// # Returns
///
/// `Ok(())` if validation passes, `Err(String)` with error description otherwise.
pub fn validate_scene(scene: &Scene) -> Result<(), String> {
    // World size
    if !(scene.width > 0.0 && scene.width <= MAX_WORLD_COORD) || !(scene.height > 0.0 && scene.height <= MAX_WORLD_COORD) {
        return Err(format!(
            "World size {}x{} outside allowed range (0-{}]",
            scene.width, scene.height, MAX_WORLD_COORD
        ));
    }

    // Population
    if scene.node_count > MAX_ENTITIES || scene.mobile_count > MAX_ENTITIES {
        return Err(format!(
            "Entity count {}/{} exceeds maximum of {} per kind",
            scene.node_count, scene.mobile_count, MAX_ENTITIES
        ));
    }
    if scene.layout.len() > MAX_ENTITIES {
        return Err(format!("Layout of {} entities exceeds maximum of {}", scene.layout.len(), MAX_ENTITIES));
    }

    if let Some(range) = scene.range {
        if !range.is_finite() || range <= 0.0 {
            return Err(format!("Invalid range {}, must be positive", range));
        }
    }

    scene.settings.validate().map_err(|e| e.to_string())?;

    // Hand-placed entities
    for (idx, entity) in scene.layout.iter().enumerate() {
        if entity.kind == EntityKind::Hub {
            return Err(format!("Layout entry {} is a hub; the hub is always placed at the centre", idx));
        }
        let p = entity.position;
        if !(0.0..=scene.width).contains(&p.x) || !(0.0..=scene.height).contains(&p.y) {
            return Err(format!(
                "Layout entry {} position ({}, {}) lies outside the {}x{} world",
                idx, p.x, p.y, scene.width, scene.height
            ));
        }
    }

    // Script
    for (idx, event) in scene.events.iter().enumerate() {
        if event.tick >= scene.ticks {
            return Err(format!(
                "Event {} ({}) at tick {} is past the end of the run ({} ticks)",
                idx,
                event.command.name(),
                event.tick,
                scene.ticks
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ScenarioCommand;

    const SCENE: &str = r#"{
        "width": 900,
        "height": 600,
        "node_count": 6,
        "mobile_count": 3,
        "range": 200,
        "seed": 11,
        "ticks": 120,
        "settings": { "packet_speed": 0.1 },
        "layout": [
            { "kind": "node", "position": { "x": 120, "y": 80 }, "offline": true },
            { "kind": "mobile", "position": { "x": 700, "y": 500 } }
        ],
        "events": [
            { "tick": 10, "type": "route_from_mobile", "mobile": { "kind": "mobile", "ordinal": 0 } },
            { "tick": 60, "type": "set_range", "range": 150 }
        ]
    }"#;

    #[test]
    fn parses_full_scene() {
        let scene = parse_scene(SCENE).unwrap();
        assert_eq!(scene.width, 900.0);
        assert_eq!(scene.node_count, 6);
        assert_eq!(scene.range, Some(200.0));
        assert_eq!(scene.settings.packet_speed, 0.1);
        assert_eq!(scene.settings.placement_margin, 50.0);
        assert_eq!(scene.layout.len(), 2);
        assert!(scene.layout[0].offline);
        assert_eq!(scene.events[1].command, ScenarioCommand::SetRange { range: 150.0 });
    }

    #[test]
    fn builds_the_described_population() {
        let scene = parse_scene(SCENE).unwrap();
        let sim = scene.build_simulation().unwrap();
        assert_eq!(sim.count_of(EntityKind::Hub), 1);
        assert!(sim.count_of(EntityKind::Node) <= 7);
        assert_eq!(sim.count_of(EntityKind::Mobile), 4);
        assert_eq!(sim.current_range(), Some(200.0));
        assert_eq!(sim.settings().packet_speed, 0.1);

        let offline = sim.entities().iter().find(|e| e.position == Point::new(120.0, 80.0)).unwrap();
        assert!(!offline.active);
    }

    #[test]
    fn same_seed_gives_same_layout() {
        let scene = parse_scene(SCENE).unwrap();
        let a = scene.build_simulation().unwrap();
        let b = scene.build_simulation().unwrap();
        let positions = |sim: &Simulation| sim.entities().iter().map(|e| (e.label.clone(), e.position)).collect::<Vec<_>>();
        assert_eq!(positions(&a), positions(&b));
    }

    #[test]
    fn rejects_invalid_scenes() {
        let cases = [
            r#"{ "width": 0, "height": 600, "ticks": 1 }"#,
            r#"{ "width": 20000, "height": 600, "ticks": 1 }"#,
            r#"{ "width": 800, "height": 600, "ticks": 1, "node_count": 10001 }"#,
            r#"{ "width": 800, "height": 600, "ticks": 1, "range": -3 }"#,
            r#"{ "width": 800, "height": 600, "ticks": 1, "settings": { "packet_speed": 0 } }"#,
            r#"{ "width": 800, "height": 600, "ticks": 1, "layout": [ { "kind": "hub", "position": { "x": 1, "y": 1 } } ] }"#,
            r#"{ "width": 800, "height": 600, "ticks": 1, "layout": [ { "kind": "node", "position": { "x": 900, "y": 1 } } ] }"#,
            r#"{ "width": 800, "height": 600, "ticks": 5, "events": [ { "tick": 6, "type": "toggle_pause" } ] }"#,
        ];
        for case in cases {
            assert!(matches!(parse_scene(case), Err(SceneLoadError::ValidationError(_))), "accepted: {}", case);
        }
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(parse_scene("{ not json"), Err(SceneLoadError::ParseError(_))));
        assert!(matches!(
            parse_scene(r#"{ "width": 800, "height": 600 }"#),
            Err(SceneLoadError::ParseError(_))
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        assert!(matches!(load_scene("/nonexistent/scene.json"), Err(SceneLoadError::FileReadError(_))));
    }
}
