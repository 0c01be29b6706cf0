//! Scripted commands applied to a running simulation.
//!
//! Scene files carry a list of these, each stamped with the tick at which it
//! fires. They cover everything an interactive user can do: send packets,
//! switch entities on and off, drag them around, add entities, change the
//! range and reset or resize the world.

use serde::{Deserialize, Serialize};

use crate::simulation::{Bounds, EntityId, EntityKind, Point, Simulation};

/// Picks one entity of a running simulation.
///
/// Generated labels carry a random suffix, so scripts usually select by kind
/// and insertion order. The hub is always labelled `HUB`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntitySelector {
    Label { label: String },
    Ordinal { kind: EntityKind, ordinal: usize },
}

impl EntitySelector {
    pub fn resolve(&self, simulation: &Simulation) -> Option<EntityId> {
        match self {
            EntitySelector::Label { label } => simulation.find_by_label(label),
            EntitySelector::Ordinal { kind, ordinal } => simulation.nth_of_kind(*kind, *ordinal),
        }
    }
}

impl std::fmt::Display for EntitySelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntitySelector::Label { label } => write!(f, "{}", label),
            EntitySelector::Ordinal { kind, ordinal } => write!(f, "{}#{}", kind, ordinal),
        }
    }
}

/// One user-level action on the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioCommand {
    /// Send a packet from any non-hub entity over active hops.
    Route { source: EntitySelector },
    /// Send a packet from a mobile through its connected nodes.
    RouteFromMobile { mobile: EntitySelector },
    SetActive { target: EntitySelector, active: bool },
    ToggleActive { target: EntitySelector },
    TogglePause,
    /// Add a node or mobile, placed automatically unless a position is given.
    AddEntity {
        kind: EntityKind,
        #[serde(default)]
        position: Option<Point>,
    },
    SetRange { range: f64 },
    Reset { node_count: usize, mobile_count: usize },
    Resize { width: f64, height: f64 },
    /// Pick up an entity, move it and drop it in one step.
    Drag { target: EntitySelector, to: Point },
}

/// A command with the tick before which it is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledCommand {
    pub tick: u64,
    #[serde(flatten)]
    pub command: ScenarioCommand,
}

impl ScenarioCommand {
    /// Short name used in logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioCommand::Route { .. } => "route",
            ScenarioCommand::RouteFromMobile { .. } => "route_from_mobile",
            ScenarioCommand::SetActive { .. } => "set_active",
            ScenarioCommand::ToggleActive { .. } => "toggle_active",
            ScenarioCommand::TogglePause => "toggle_pause",
            ScenarioCommand::AddEntity { .. } => "add_entity",
            ScenarioCommand::SetRange { .. } => "set_range",
            ScenarioCommand::Reset { .. } => "reset",
            ScenarioCommand::Resize { .. } => "resize",
            ScenarioCommand::Drag { .. } => "drag",
        }
    }

    /// Apply the command.
    ///
    /// Routing that finds no path is not an error here; it shows up in the
    /// simulation's diagnostics instead. `Err` means the command itself was
    /// rejected and the simulation is unchanged.
    pub fn apply(&self, simulation: &mut Simulation) -> Result<(), String> {
        match self {
            ScenarioCommand::Route { source } => {
                let id = resolve(source, simulation)?;
                simulation.route(id);
            }
            ScenarioCommand::RouteFromMobile { mobile } => {
                let id = resolve(mobile, simulation)?;
                simulation.route_from_mobile(id);
            }
            ScenarioCommand::SetActive { target, active } => {
                let id = resolve(target, simulation)?;
                simulation.set_active(id, *active);
            }
            ScenarioCommand::ToggleActive { target } => {
                let id = resolve(target, simulation)?;
                simulation.toggle_active(id);
            }
            ScenarioCommand::TogglePause => {
                simulation.toggle_pause();
            }
            ScenarioCommand::AddEntity { kind, position } => {
                let added = match position {
                    Some(position) => simulation.add_entity_at(*kind, *position),
                    None => simulation.add_entity(*kind),
                };
                if added.is_none() {
                    return Err(format!("could not add {}", kind));
                }
            }
            ScenarioCommand::SetRange { range } => {
                simulation.set_range(*range).map_err(|e| e.to_string())?;
            }
            ScenarioCommand::Reset { node_count, mobile_count } => {
                simulation.reset(*node_count, *mobile_count).map_err(|e| e.to_string())?;
            }
            ScenarioCommand::Resize { width, height } => {
                simulation
                    .set_bounds(Bounds {
                        width: *width,
                        height: *height,
                    })
                    .map_err(|e| e.to_string())?;
            }
            ScenarioCommand::Drag { target, to } => {
                let id = resolve(target, simulation)?;
                if !simulation.begin_drag(id) {
                    return Err(format!("{} cannot be dragged while offline", target));
                }
                simulation.drag_to(id, *to);
                simulation.end_drag(id);
            }
        }
        Ok(())
    }
}

fn resolve(selector: &EntitySelector, simulation: &Simulation) -> Result<EntityId, String> {
    selector.resolve(simulation).ok_or_else(|| format!("no entity matches {}", selector))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulation() -> Simulation {
        let mut sim = Simulation::seeded(Bounds::new(800.0, 600.0).unwrap(), 17).unwrap();
        sim.reset(0, 0).unwrap();
        sim.add_entity_at(EntityKind::Node, Point::new(550.0, 300.0)).unwrap();
        sim.add_entity_at(EntityKind::Mobile, Point::new(600.0, 300.0)).unwrap();
        sim.tick();
        sim
    }

    #[test]
    fn parses_scheduled_commands() {
        let json = r#"[
            {"tick": 5, "type": "route_from_mobile", "mobile": {"kind": "mobile", "ordinal": 0}},
            {"tick": 9, "type": "set_active", "target": {"label": "HUB"}, "active": false},
            {"tick": 12, "type": "toggle_pause"},
            {"tick": 20, "type": "add_entity", "kind": "node"}
        ]"#;
        let commands: Vec<ScheduledCommand> = serde_json::from_str(json).unwrap();
        assert_eq!(commands.len(), 4);
        assert_eq!(
            commands[0].command,
            ScenarioCommand::RouteFromMobile {
                mobile: EntitySelector::Ordinal {
                    kind: EntityKind::Mobile,
                    ordinal: 0
                }
            }
        );
        assert_eq!(
            commands[1].command,
            ScenarioCommand::SetActive {
                target: EntitySelector::Label { label: "HUB".to_string() },
                active: false
            }
        );
        assert_eq!(commands[2].command.name(), "toggle_pause");
        assert_eq!(
            commands[3].command,
            ScenarioCommand::AddEntity {
                kind: EntityKind::Node,
                position: None
            }
        );
    }

    #[test]
    fn route_commands_create_packets() {
        let mut sim = simulation();
        let mobile = EntitySelector::Ordinal {
            kind: EntityKind::Mobile,
            ordinal: 0,
        };
        ScenarioCommand::RouteFromMobile { mobile: mobile.clone() }.apply(&mut sim).unwrap();
        ScenarioCommand::Route { source: mobile }.apply(&mut sim).unwrap();
        assert_eq!(sim.packets().len(), 2);
    }

    #[test]
    fn unknown_target_is_rejected() {
        let mut sim = simulation();
        let err = ScenarioCommand::Route {
            source: EntitySelector::Ordinal {
                kind: EntityKind::Node,
                ordinal: 7,
            },
        }
        .apply(&mut sim)
        .unwrap_err();
        assert!(err.contains("NODE#7"));
        assert!(sim.packets().is_empty());
    }

    #[test]
    fn offline_hub_blocks_general_routes() {
        let mut sim = simulation();
        ScenarioCommand::SetActive {
            target: EntitySelector::Label { label: "HUB".to_string() },
            active: false,
        }
        .apply(&mut sim)
        .unwrap();
        let node = EntitySelector::Ordinal {
            kind: EntityKind::Node,
            ordinal: 0,
        };
        ScenarioCommand::Route { source: node }.apply(&mut sim).unwrap();
        assert!(sim.packets().is_empty());
        assert_eq!(sim.stats().routes_failed, 1);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let mut sim = simulation();
        assert!(ScenarioCommand::SetRange { range: -1.0 }.apply(&mut sim).is_err());
        assert!(ScenarioCommand::Resize { width: 0.0, height: 100.0 }.apply(&mut sim).is_err());
        assert!(ScenarioCommand::AddEntity {
            kind: EntityKind::Hub,
            position: None
        }
        .apply(&mut sim)
        .is_err());
        assert_eq!(sim.count_of(EntityKind::Hub), 1);
    }

    #[test]
    fn drag_moves_entity_and_respects_activity() {
        let mut sim = simulation();
        let node = EntitySelector::Ordinal {
            kind: EntityKind::Node,
            ordinal: 0,
        };
        ScenarioCommand::Drag {
            target: node.clone(),
            to: Point::new(100.0, 120.0),
        }
        .apply(&mut sim)
        .unwrap();
        let id = node.resolve(&sim).unwrap();
        assert_eq!(sim.entity(id).unwrap().position, Point::new(100.0, 120.0));
        assert!(!sim.entity(id).unwrap().dragging);

        sim.set_active(id, false);
        assert!(ScenarioCommand::Drag {
            target: node,
            to: Point::new(300.0, 300.0)
        }
        .apply(&mut sim)
        .is_err());
    }
}
