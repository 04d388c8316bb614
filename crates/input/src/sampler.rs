use crate::action::{Action, ActionSnapshot, pressed_edge};
use ringtrain_common::MotionConfig;
use ringtrain_kernel::{CameraState, RenderFlags, Scene, SimulationState};

/// Step sizes applied per frame while a continuous action is held.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputTuning {
    pub speed_step: f32,
    /// Radians per frame.
    pub rotate_step: f32,
    /// How many pixels of a touchpad scroll count as one wheel line.
    pub pixels_per_line: f32,
}

impl Default for InputTuning {
    fn default() -> Self {
        Self::from(&MotionConfig::default())
    }
}

impl From<&MotionConfig> for InputTuning {
    fn from(m: &MotionConfig) -> Self {
        Self {
            speed_step: m.speed_step,
            rotate_step: m.rotate_step,
            pixels_per_line: 20.0,
        }
    }
}

/// A scroll event as delivered by the platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollDelta {
    /// Wheel notches; positive scrolls up.
    Lines(f32),
    /// Touchpad pixels; positive scrolls up.
    Pixels(f32),
}

impl ScrollDelta {
    fn lines(self, pixels_per_line: f32) -> f32 {
        match self {
            ScrollDelta::Lines(l) => l,
            ScrollDelta::Pixels(p) => p / pixels_per_line,
        }
    }
}

/// What the frame loop has to react to after a sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleOutcome {
    pub pause_toggled: bool,
    pub culling_toggled: bool,
    pub exit_requested: bool,
}

/// Applies one frame of held actions to the scene state.
///
/// Keeps the previous frame's snapshot so toggles fire on press edges only.
#[derive(Debug, Clone, Default)]
pub struct InputSampler {
    previous: ActionSnapshot,
    tuning: InputTuning,
}

impl InputSampler {
    pub fn new(tuning: InputTuning) -> Self {
        Self {
            previous: ActionSnapshot::new(),
            tuning,
        }
    }

    pub fn tuning(&self) -> InputTuning {
        self.tuning
    }

    /// Apply `current` to the state and remember it for the next edge check.
    ///
    /// Order: speed, pause edge, orbit, culling edge, exit edge. Speed never
    /// drops below zero. Speed changes made while paused are overwritten when
    /// the pause is released.
    pub fn sample(
        &mut self,
        current: ActionSnapshot,
        sim: &mut SimulationState,
        camera: &mut CameraState,
        flags: &mut RenderFlags,
    ) -> SampleOutcome {
        let mut outcome = SampleOutcome::default();
        let edge = |action| pressed_edge(&self.previous, &current, action);

        if current.is_held(Action::Accelerate) {
            sim.adjust_speed(self.tuning.speed_step);
        }
        if current.is_held(Action::Decelerate) {
            sim.adjust_speed(-self.tuning.speed_step);
        }
        if edge(Action::TogglePause) {
            let paused = sim.toggle_pause();
            tracing::debug!(paused, speed = sim.speed(), "pause toggled");
            outcome.pause_toggled = true;
        }

        if current.is_held(Action::RotateLeft) {
            camera.rotate(-self.tuning.rotate_step);
        }
        if current.is_held(Action::RotateRight) {
            camera.rotate(self.tuning.rotate_step);
        }

        if edge(Action::ToggleCulling) {
            let enabled = flags.toggle_culling();
            tracing::debug!(enabled, "culling toggled");
            outcome.culling_toggled = true;
        }
        outcome.exit_requested = edge(Action::Exit);

        self.previous = current;
        outcome
    }

    /// [`InputSampler::sample`] against the state held by a [`Scene`].
    pub fn sample_scene(&mut self, current: ActionSnapshot, scene: &mut Scene) -> SampleOutcome {
        self.sample(
            current,
            &mut scene.sim,
            &mut scene.camera_state,
            &mut scene.flags,
        )
    }

    /// Zoom from a scroll event: scrolling up narrows the field of view by
    /// one degree per line. Independent of the per-frame poll.
    pub fn scroll(&self, camera: &mut CameraState, delta: ScrollDelta) {
        camera.adjust_fov(-delta.lines(self.tuning.pixels_per_line));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringtrain_common::SceneConfig;

    fn held(actions: &[Action]) -> ActionSnapshot {
        actions.iter().copied().collect()
    }

    fn scene() -> Scene {
        Scene::from_config(&SceneConfig::default()).unwrap()
    }

    #[test]
    fn accelerate_adds_step_per_frame() {
        let mut scene = scene();
        let mut sampler = InputSampler::default();
        for _ in 0..10 {
            sampler.sample_scene(held(&[Action::Accelerate]), &mut scene);
        }
        assert!((scene.sim.speed() - (0.5 + 10.0 * 0.008)).abs() < 1e-5);
    }

    #[test]
    fn decelerate_clamps_at_exactly_zero() {
        let mut scene = scene();
        let mut sampler = InputSampler::default();
        for _ in 0..500 {
            sampler.sample_scene(held(&[Action::Decelerate]), &mut scene);
            assert!(scene.sim.speed() >= 0.0);
        }
        assert_eq!(scene.sim.speed(), 0.0);
    }

    #[test]
    fn holding_pause_toggles_once() {
        let mut scene = scene();
        let mut sampler = InputSampler::default();
        let mut toggles = 0;
        for _ in 0..20 {
            let out = sampler.sample_scene(held(&[Action::TogglePause]), &mut scene);
            toggles += out.pause_toggled as u32;
        }
        assert_eq!(toggles, 1);
        assert!(scene.sim.paused());
    }

    #[test]
    fn each_press_edge_toggles() {
        let mut scene = scene();
        let mut sampler = InputSampler::default();
        for _ in 0..3 {
            sampler.sample_scene(held(&[Action::TogglePause]), &mut scene);
            sampler.sample_scene(held(&[Action::TogglePause]), &mut scene);
            sampler.sample_scene(held(&[]), &mut scene);
        }
        // Three edges: paused, resumed, paused.
        assert!(scene.sim.paused());
    }

    #[test]
    fn pause_then_resume_keeps_speed_and_freezes_time() {
        let mut scene = scene();
        let mut sampler = InputSampler::default();
        let speed = scene.sim.speed();

        sampler.sample_scene(held(&[Action::TogglePause]), &mut scene);
        sampler.sample_scene(held(&[]), &mut scene);
        let frozen = scene.advance(std::time::Duration::ZERO);
        assert_eq!(frozen, 0.0);

        sampler.sample_scene(held(&[Action::TogglePause]), &mut scene);
        assert!(!scene.sim.paused());
        assert_eq!(scene.sim.speed(), speed);
    }

    #[test]
    fn culling_flips_once_per_edge() {
        let mut scene = scene();
        let mut sampler = InputSampler::default();
        let initial = scene.flags.culling_enabled;
        for press in 0..4 {
            for _ in 0..5 {
                sampler.sample_scene(held(&[Action::ToggleCulling]), &mut scene);
            }
            sampler.sample_scene(held(&[]), &mut scene);
            assert_eq!(scene.flags.culling_enabled, press % 2 == 0);
        }
        assert_eq!(scene.flags.culling_enabled, initial);
    }

    #[test]
    fn rotate_is_continuous() {
        let mut scene = scene();
        let mut sampler = InputSampler::default();
        for _ in 0..5 {
            sampler.sample_scene(held(&[Action::RotateRight]), &mut scene);
        }
        assert!((scene.camera_state.orbit_angle() - 0.1).abs() < 1e-6);
        for _ in 0..10 {
            sampler.sample_scene(held(&[Action::RotateLeft]), &mut scene);
        }
        assert!((scene.camera_state.orbit_angle() + 0.1).abs() < 1e-6);
    }

    #[test]
    fn exit_fires_on_edge_only() {
        let mut scene = scene();
        let mut sampler = InputSampler::default();
        assert!(sampler.sample_scene(held(&[Action::Exit]), &mut scene).exit_requested);
        assert!(!sampler.sample_scene(held(&[Action::Exit]), &mut scene).exit_requested);
    }

    #[test]
    fn scroll_up_zooms_in_and_clamps() {
        let mut scene = scene();
        let sampler = InputSampler::default();
        sampler.scroll(&mut scene.camera_state, ScrollDelta::Lines(5.0));
        assert_eq!(scene.camera_state.fov_degrees(), 60.0);
        sampler.scroll(&mut scene.camera_state, ScrollDelta::Lines(500.0));
        assert_eq!(scene.camera_state.fov_degrees(), 10.0);
        sampler.scroll(&mut scene.camera_state, ScrollDelta::Lines(-500.0));
        assert_eq!(scene.camera_state.fov_degrees(), 65.0);
    }

    #[test]
    fn pixel_scroll_is_converted_to_lines() {
        let mut scene = scene();
        let sampler = InputSampler::default();
        sampler.scroll(&mut scene.camera_state, ScrollDelta::Pixels(40.0));
        assert!((scene.camera_state.fov_degrees() - 63.0).abs() < 1e-5);
    }

    #[test]
    fn fov_bounded_under_any_scroll_sequence() {
        let mut scene = scene();
        let sampler = InputSampler::default();
        let deltas = [3.0, -70.0, 0.5, 12.0, 99.0, -1.0, -3.5, 40.0, -200.0];
        for d in deltas.iter().cycle().take(200) {
            sampler.scroll(&mut scene.camera_state, ScrollDelta::Lines(*d));
            let fov = scene.camera_state.fov_degrees();
            assert!((10.0..=65.0).contains(&fov));
        }
    }
}
