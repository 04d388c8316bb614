use crate::error::KernelError;
use serde::{Deserialize, Serialize};

/// Speed, pause and accumulated simulated time of the train.
///
/// Speed is never negative. While paused, `speed` reads 0 and the value it had
/// when the pause engaged is kept in `saved_speed` until the pause is released.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationState {
    speed: f32,
    paused: bool,
    saved_speed: f32,
    simulated_time: f32,
}

impl SimulationState {
    /// Running (unpaused) state at time zero.
    pub fn new(initial_speed: f32) -> Self {
        let speed = initial_speed.max(0.0);
        Self {
            speed,
            paused: false,
            saved_speed: speed,
            simulated_time: 0.0,
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn saved_speed(&self) -> f32 {
        self.saved_speed
    }

    pub fn simulated_time(&self) -> f32 {
        self.simulated_time
    }

    /// Add `delta` to the speed, clamping at zero. There is no upper bound.
    pub fn adjust_speed(&mut self, delta: f32) {
        self.speed = (self.speed + delta).max(0.0);
    }

    /// Flip the pause flag. Returns the new value.
    ///
    /// Entering pause stores the current speed and forces speed to 0; leaving
    /// pause restores the stored speed.
    pub fn toggle_pause(&mut self) -> bool {
        if self.paused {
            self.speed = self.saved_speed;
        } else {
            self.saved_speed = self.speed;
            self.speed = 0.0;
        }
        self.paused = !self.paused;
        self.paused
    }

    /// Jump to an arbitrary point of the animation.
    pub fn set_simulated_time(&mut self, time: f32) {
        self.simulated_time = time.max(0.0);
    }
}

impl Default for SimulationState {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Inclusive clamp range for the field of view, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FovLimits {
    min: f32,
    max: f32,
}

impl FovLimits {
    pub fn new(min: f32, max: f32) -> Result<Self, KernelError> {
        if !(min.is_finite() && max.is_finite()) || min <= 0.0 || max < min || max >= 180.0 {
            return Err(KernelError::InvalidFovRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn clamp(&self, degrees: f32) -> f32 {
        if degrees.is_nan() {
            return self.max;
        }
        degrees.clamp(self.min, self.max)
    }
}

impl Default for FovLimits {
    fn default() -> Self {
        Self {
            min: 10.0,
            max: 65.0,
        }
    }
}

/// Orbit angle and zoom of the camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraState {
    orbit_angle: f32,
    fov_degrees: f32,
    limits: FovLimits,
}

impl CameraState {
    /// The initial field of view is clamped into `limits`.
    pub fn new(orbit_angle: f32, fov_degrees: f32, limits: FovLimits) -> Self {
        Self {
            orbit_angle,
            fov_degrees: limits.clamp(fov_degrees),
            limits,
        }
    }

    /// Azimuth around the anchor in radians. Free-running, never wrapped.
    pub fn orbit_angle(&self) -> f32 {
        self.orbit_angle
    }

    pub fn fov_degrees(&self) -> f32 {
        self.fov_degrees
    }

    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }

    pub fn limits(&self) -> FovLimits {
        self.limits
    }

    pub fn rotate(&mut self, delta: f32) {
        self.orbit_angle += delta;
    }

    /// Widen (positive) or narrow (negative) the field of view, clamped.
    pub fn adjust_fov(&mut self, delta_degrees: f32) {
        self.fov_degrees = self.limits.clamp(self.fov_degrees + delta_degrees);
    }
}

impl Default for CameraState {
    fn default() -> Self {
        let limits = FovLimits::default();
        Self::new(0.0, limits.max(), limits)
    }
}

/// Render toggles that are independent of the simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderFlags {
    pub culling_enabled: bool,
}

impl RenderFlags {
    /// Flip back-face culling. Returns the new value.
    pub fn toggle_culling(&mut self) -> bool {
        self.culling_enabled = !self.culling_enabled;
        self.culling_enabled
    }
}
