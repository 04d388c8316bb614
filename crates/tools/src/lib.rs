//! Developer tooling: scene inspector.
//!
//! # Invariants
//! - Tools only read the scene; they never change simulation state.

mod inspector;

pub use inspector::{CarInfo, SceneInspector, SceneSummary};
