//! Hub-and-mesh proximity network simulator.
//!
//! The `simulation` module holds the engine. `common` loads scene files and
//! `control` runs them headlessly.

pub mod common;
pub mod control;
pub mod simulation;
