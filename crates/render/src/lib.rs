//! Rendering adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers are sinks: they read [`FrameTransforms`] and never mutate scene state.
//! - Culling is a per-frame input, never state a renderer carries between frames.
//!
//! The wgpu backend lives in `ringtrain-render-wgpu`; this crate holds the
//! trait plus a text renderer used by the headless CLI and tests.

mod renderer;

pub use renderer::{DebugTextRenderer, Renderer};
pub use ringtrain_kernel::FrameTransforms;
