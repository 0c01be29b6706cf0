use anyhow::Context;
use env_logger::Builder;
use log::{LevelFilter, info};
use std::fs;

use hub_mesh_simulator::common::load_scene;
use hub_mesh_simulator::control::{RunnerConfig, ScenarioRunner};

const DEFAULT_SCENE: &str = "scenes/default.json";

fn main() -> anyhow::Result<()> {
    let scene_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_SCENE.to_string());

    let config_path = RunnerConfig::config_path_from_scene(&scene_path);
    let config = RunnerConfig::load_or_default(&config_path).map_err(anyhow::Error::msg)?;

    // Logging setup
    Builder::new()
        .filter_level(LevelFilter::Warn)
        .filter(Some("hub_mesh_simulator"), config.log_level.to_filter())
        .init();

    info!("Starting up");
    if config_path.exists() {
        info!("Loaded configuration file: {:?}", config_path);
    }

    let scene = load_scene(&scene_path).with_context(|| format!("Failed to load scene {}", scene_path))?;
    info!(
        "Scene {}: {}x{} world, {} nodes, {} mobiles, {} ticks, {} scripted events",
        scene_path,
        scene.width,
        scene.height,
        scene.node_count,
        scene.mobile_count,
        scene.ticks,
        scene.events.len()
    );

    let mut runner = ScenarioRunner::from_scene(&scene).context("Failed to build simulation from scene")?;
    runner.run(&config);

    if let Some(report_path) = &config.report_path {
        let report = serde_json::to_string_pretty(&runner.report()).context("Failed to serialize run report")?;
        fs::write(report_path, report).with_context(|| format!("Failed to write report to {:?}", report_path))?;
        info!("Report written to {:?}", report_path);
    }

    Ok(())
}
