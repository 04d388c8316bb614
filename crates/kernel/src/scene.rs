use crate::camera::OrbitCamera;
use crate::clock::{Clock, TimeStep};
use crate::error::KernelError;
use crate::formation::Formation;
use crate::state::{CameraState, FovLimits, RenderFlags, SimulationState};
use crate::track::Track;
use glam::{Mat4, Vec3};
use ringtrain_common::SceneConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Everything a renderer needs for one frame. Produced by
/// [`Scene::frame_transforms`]; renderers only read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameTransforms {
    pub simulated_time: f32,
    pub projection: Mat4,
    pub view: Mat4,
    pub eye: Vec3,
    pub anchor: Vec3,
    /// One translation per car, in formation index order.
    pub models: Vec<Mat4>,
    pub car_size: f32,
    pub culling_enabled: bool,
    pub track: Track,
}

impl FrameTransforms {
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// The whole animated scene: mutable per-frame state plus the fixed geometry
/// it is evaluated against.
///
/// State fields are public so the input sampler can mutate them by reference;
/// geometry is fixed after construction except for the camera aspect ratio.
#[derive(Debug, Clone)]
pub struct Scene {
    pub sim: SimulationState,
    pub camera_state: CameraState,
    pub flags: RenderFlags,
    formation: Formation,
    camera: OrbitCamera,
    track: Track,
    clock: Clock,
    car_size: f32,
}

impl Scene {
    /// Build a scene with the fixed timestep taken from the config.
    pub fn from_config(config: &SceneConfig) -> Result<Self, KernelError> {
        Self::new(config, TimeStep::Fixed(config.motion.frame_duration))
    }

    pub fn new(config: &SceneConfig, step: TimeStep) -> Result<Self, KernelError> {
        config
            .validate()
            .map_err(|e| KernelError::Config(e.to_string()))?;

        let formation = Formation::new(config.formation.count, config.formation.radius)?;
        let cam = &config.camera;
        let camera = OrbitCamera::new(cam.orbit_radius, cam.height, cam.aspect, cam.near, cam.far)?;
        let limits = FovLimits::new(cam.min_fov_degrees, cam.max_fov_degrees)?;

        tracing::debug!(
            cars = formation.count(),
            radius = formation.radius(),
            ?step,
            "scene created"
        );

        Ok(Self {
            sim: SimulationState::new(config.motion.initial_speed),
            camera_state: CameraState::new(
                cam.initial_orbit_angle,
                cam.initial_fov_degrees,
                limits,
            ),
            flags: RenderFlags {
                culling_enabled: config.culling_enabled,
            },
            formation,
            camera,
            track: Track::from(&config.track),
            clock: Clock::new(step),
            car_size: config.formation.car_size,
        })
    }

    pub fn formation(&self) -> &Formation {
        &self.formation
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn car_size(&self) -> f32 {
        self.car_size
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
    }

    /// Run the clock for one frame that took `elapsed` of real time.
    pub fn advance(&mut self, elapsed: Duration) -> f32 {
        self.clock.tick(&mut self.sim, elapsed)
    }

    pub fn anchor(&self) -> Vec3 {
        self.formation.anchor(self.sim.simulated_time())
    }

    pub fn frame_transforms(&self) -> FrameTransforms {
        let time = self.sim.simulated_time();
        let anchor = self.formation.anchor(time);
        let pose = self.camera.pose(&self.camera_state, anchor);
        FrameTransforms {
            simulated_time: time,
            projection: pose.projection,
            view: pose.view,
            eye: pose.eye,
            anchor,
            models: self.formation.model_transforms(time),
            car_size: self.car_size,
            culling_enabled: self.flags.culling_enabled,
            track: self.track,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> Scene {
        Scene::from_config(&SceneConfig::default()).unwrap()
    }

    #[test]
    fn reference_scene_frame() {
        let scene = Scene::from_config(&SceneConfig::default()).unwrap();
        let frame = scene.frame_transforms();
        assert_eq!(frame.models.len(), 10);
        assert!((frame.anchor - Vec3::new(-1.5, 0.0, 0.0)).length() < 1e-5);
        assert!((frame.eye - Vec3::new(-1.5, 0.5, 3.0)).length() < 1e-5);
        assert!(!frame.culling_enabled);
        assert_eq!(frame.track.segments, 100);
    }

    #[test]
    fn wall_clock_scene_uses_measured_time() {
        let mut scene = Scene::new(&SceneConfig::default(), TimeStep::WallClock).unwrap();
        scene.advance(Duration::from_millis(50));
        assert!((scene.sim.simulated_time() - 0.5 * 0.05).abs() < 1e-5);
    }

    #[test]
    fn advance_moves_anchor() {
        let mut scene = reference();
        let before = scene.anchor();
        for _ in 0..60 {
            scene.advance(Duration::ZERO);
        }
        assert!((scene.sim.simulated_time() - 0.5).abs() < 1e-4);
        assert!((scene.anchor() - before).length() > 0.1);
    }

    #[test]
    fn paused_scene_is_still() {
        let mut scene = reference();
        scene.sim.toggle_pause();
        let before = scene.frame_transforms();
        scene.advance(Duration::from_millis(16));
        assert_eq!(scene.frame_transforms(), before);
    }

    #[test]
    fn culling_flag_flows_into_frame() {
        let mut scene = reference();
        scene.flags.toggle_culling();
        assert!(scene.frame_transforms().culling_enabled);
    }

    #[test]
    fn invalid_config_rejected() {
        let mut config = SceneConfig::default();
        config.formation.count = 1;
        assert!(matches!(
            Scene::from_config(&config),
            Err(KernelError::Config(_))
        ));
    }

    #[test]
    fn viewport_changes_projection() {
        let mut scene = reference();
        let before = scene.frame_transforms().projection;
        scene.set_viewport(1920, 1080);
        assert_ne!(scene.frame_transforms().projection, before);
    }
}
