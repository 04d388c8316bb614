//! Shared configuration for the ring train demo.
//!
//! Every tunable constant of the scene (formation size, track and camera
//! geometry, input step sizes, frame duration) lives in [`SceneConfig`] so the
//! kernel, input and render crates agree on one source of truth.

pub mod config;

pub use config::{
    CameraConfig, ConfigError, FormationConfig, MotionConfig, SceneConfig, TrackConfig,
    WindowConfig,
};
