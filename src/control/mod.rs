//! Scripted control of a simulation: timed commands, runner configuration
//! and the headless run loop.

pub mod command;
pub mod config;
pub mod runner;

pub use command::{EntitySelector, ScenarioCommand, ScheduledCommand};
pub use config::{LogLevel, RunnerConfig};
pub use runner::{RunReport, ScenarioRunner};
