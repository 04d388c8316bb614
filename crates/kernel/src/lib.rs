//! Ring Train kernel: the per-frame animation and camera update model.
//!
//! Everything here is a pure function of explicit state, so the whole model can
//! be stepped and inspected without a window or GPU.
//!
//! # Invariants
//! - Simulated time never advances while paused.
//! - Formation positions depend only on (time, index, count, radius).
//! - Field of view always lies inside the configured clamp range.
//! - State is single-writer: the input sampler and the clock mutate it once per frame.

pub mod camera;
pub mod clock;
pub mod error;
pub mod formation;
pub mod scene;
pub mod state;
pub mod track;

pub use camera::{CameraPose, OrbitCamera};
pub use clock::{Clock, TimeStep, advance_time};
pub use error::KernelError;
pub use formation::{Formation, FormationElement, element_position};
pub use scene::{FrameTransforms, Scene};
pub use state::{CameraState, FovLimits, RenderFlags, SimulationState};
pub use track::Track;
