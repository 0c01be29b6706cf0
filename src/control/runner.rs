//! Headless scenario runner.
//!
//! Drives a simulation built from a scene: scripted commands fire before the
//! tick they are stamped with, the simulation ticks at the configured frame
//! interval and diagnostics are collected for the final report.

use serde::Serialize;
use std::thread;
use std::time::{Duration, Instant};

use super::command::ScheduledCommand;
use super::config::RunnerConfig;
use crate::common::Scene;
use crate::simulation::{ConfigError, DiagnosticRecord, NetworkSnapshot, Simulation, SimulationStats};

/// Tick processing slower than the frame interval by more than this is reported.
const DELAY_WARNING_THRESHOLD: Duration = Duration::from_millis(10);

/// A command the simulation refused, kept for the report.
#[derive(Debug, Clone, Serialize)]
pub struct RejectedCommand {
    pub tick: u64,
    pub command: &'static str,
    pub reason: String,
}

/// Summary written at the end of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub generated_at: String,
    pub ticks: u64,
    pub stats: SimulationStats,
    pub diagnostics: Vec<DiagnosticRecord>,
    pub rejected_commands: Vec<RejectedCommand>,
    pub snapshot: NetworkSnapshot,
}

pub struct ScenarioRunner {
    simulation: Simulation,
    events: Vec<ScheduledCommand>,
    next_event: usize,
    ticks: u64,
    diagnostics: Vec<DiagnosticRecord>,
    rejected: Vec<RejectedCommand>,
}

impl ScenarioRunner {
    pub fn from_scene(scene: &Scene) -> Result<Self, ConfigError> {
        let simulation = scene.build_simulation()?;
        Ok(Self::new(simulation, scene.events.clone(), scene.ticks))
    }

    pub fn new(simulation: Simulation, mut events: Vec<ScheduledCommand>, ticks: u64) -> Self {
        // Stable, so commands sharing a tick keep their script order.
        events.sort_by_key(|e| e.tick);
        Self {
            simulation,
            events,
            next_event: 0,
            ticks,
            diagnostics: Vec::new(),
            rejected: Vec::new(),
        }
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn is_finished(&self) -> bool {
        self.simulation.tick_count() >= self.ticks
    }

    /// Apply the commands due at the current tick, then tick once.
    pub fn step(&mut self) {
        let tick = self.simulation.tick_count();
        while let Some(event) = self.events.get(self.next_event).filter(|e| e.tick <= tick) {
            let name = event.command.name();
            match event.command.apply(&mut self.simulation) {
                Ok(()) => log::debug!("Tick {}: applied {}", tick, name),
                Err(reason) => {
                    log::warn!("Tick {}: {} rejected: {}", tick, name, reason);
                    self.rejected.push(RejectedCommand {
                        tick,
                        command: name,
                        reason,
                    });
                }
            }
            self.next_event += 1;
        }

        self.simulation.tick();
        self.diagnostics.extend(self.simulation.drain_diagnostics());
    }

    /// Run every remaining tick, pacing to the configured frame interval.
    pub fn run(&mut self, config: &RunnerConfig) {
        let frame = Duration::from_millis(config.frame_interval_ms);
        let mut delay_warning_issued = false;

        while !self.is_finished() {
            let started = Instant::now();
            self.step();

            let tick = self.simulation.tick_count();
            if config.status_interval > 0 && tick % config.status_interval == 0 {
                self.log_status();
            }

            let elapsed = started.elapsed();
            if elapsed < frame {
                thread::sleep(frame - elapsed);
            } else if !frame.is_zero() {
                let delay = elapsed - frame;
                if delay > DELAY_WARNING_THRESHOLD && !delay_warning_issued {
                    delay_warning_issued = true;
                    log::warn!("Tick {} took {} ms longer than the frame interval", tick, delay.as_millis());
                } else if delay <= DELAY_WARNING_THRESHOLD {
                    delay_warning_issued = false;
                }
            }
        }

        let stats = self.simulation.stats();
        log::info!(
            "Run finished after {} ticks: {} routed, {} delivered, {} failed routes, {} rejected commands",
            self.simulation.tick_count(),
            stats.packets_routed,
            stats.packets_delivered,
            stats.routes_failed,
            self.rejected.len()
        );
    }

    fn log_status(&self) {
        let snapshot = NetworkSnapshot::capture(&self.simulation);
        let in_flight = snapshot.packets.iter().filter(|p| p.active).count();
        log::info!(
            "Tick {}: {} entities, {} links, {} packets in flight{}",
            snapshot.tick,
            snapshot.entities.len(),
            snapshot.link_count(),
            in_flight,
            if snapshot.paused { " (paused)" } else { "" }
        );
    }

    pub fn report(&self) -> RunReport {
        RunReport {
            generated_at: chrono::Utc::now().to_rfc3339(),
            ticks: self.simulation.tick_count(),
            stats: self.simulation.stats().clone(),
            diagnostics: self.diagnostics.clone(),
            rejected_commands: self.rejected.clone(),
            snapshot: NetworkSnapshot::capture(&self.simulation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::parse_scene;
    use crate::simulation::{Diagnostic, EntityKind};

    fn quiet() -> RunnerConfig {
        RunnerConfig {
            frame_interval_ms: 0,
            status_interval: 0,
            ..Default::default()
        }
    }

    /// Hub at (400, 300), a two-node chain to the right and a mobile at its end.
    const CHAIN: &str = r#"{
        "width": 800,
        "height": 600,
        "seed": 3,
        "ticks": 100,
        "layout": [
            { "kind": "node", "position": { "x": 550, "y": 300 } },
            { "kind": "node", "position": { "x": 700, "y": 300 } },
            { "kind": "mobile", "position": { "x": 700, "y": 360 } }
        ],
        "events": [
            { "tick": 30, "type": "set_active", "target": { "kind": "node", "ordinal": 0 }, "active": false },
            { "tick": 1, "type": "drag", "target": { "kind": "mobile", "ordinal": 0 }, "to": { "x": 700, "y": 360 } },
            { "tick": 2, "type": "route_from_mobile", "mobile": { "kind": "mobile", "ordinal": 0 } },
            { "tick": 31, "type": "route", "source": { "kind": "node", "ordinal": 1 } },
            { "tick": 40, "type": "route", "source": { "kind": "node", "ordinal": 9 } }
        ]
    }"#;

    #[test]
    fn runs_script_to_completion() {
        let scene = parse_scene(CHAIN).unwrap();
        let mut runner = ScenarioRunner::from_scene(&scene).unwrap();
        runner.run(&quiet());

        assert!(runner.is_finished());
        let report = runner.report();
        assert_eq!(report.ticks, 100);
        assert_eq!(report.stats.packets_routed, 1);
        assert_eq!(report.stats.packets_delivered, 1);
        assert_eq!(report.stats.routes_failed, 1);
        assert!(matches!(report.diagnostics[0].diagnostic, Diagnostic::HubUnreachable { .. }));
        assert_eq!(report.diagnostics[0].tick, 31);
        assert_eq!(report.rejected_commands.len(), 1);
        assert_eq!(report.rejected_commands[0].tick, 40);
        assert_eq!(report.snapshot.entities.len(), 4);
        assert!(report.generated_at.contains('T'));
    }

    #[test]
    fn events_fire_before_their_tick() {
        let scene = parse_scene(CHAIN).unwrap();
        let mut runner = ScenarioRunner::from_scene(&scene).unwrap();
        for _ in 0..30 {
            runner.step();
        }
        let node = runner.simulation().nth_of_kind(EntityKind::Node, 0).unwrap();
        assert!(runner.simulation().entity(node).unwrap().active);
        runner.step();
        assert!(!runner.simulation().entity(node).unwrap().active);
    }
}
