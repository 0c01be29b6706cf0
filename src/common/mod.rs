//! Scene files shared by the runner and tests.

pub mod scene;

pub use scene::{Scene, SceneEntity, SceneLoadError, load_scene, parse_scene};
