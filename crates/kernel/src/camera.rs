use crate::error::KernelError;
use crate::state::CameraState;
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

const DEGENERATE_EPS: f32 = 1e-6;

/// Camera that orbits a target point at a fixed distance and height.
///
/// The orbit angle and field of view come from [`CameraState`]; everything
/// else is fixed for the lifetime of the scene (aspect follows window resizes).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrbitCamera {
    pub radius: f32,
    pub height: f32,
    aspect: f32,
    near: f32,
    far: f32,
}

/// Camera placement and matrices for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub eye: Vec3,
    pub target: Vec3,
    pub view: Mat4,
    pub projection: Mat4,
}

impl OrbitCamera {
    pub fn new(
        radius: f32,
        height: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Result<Self, KernelError> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(KernelError::InvalidRadius(radius));
        }
        if !height.is_finite() {
            return Err(KernelError::InvalidProjection(format!(
                "height {height} is not finite"
            )));
        }
        if !(aspect.is_finite() && aspect > 0.0) {
            return Err(KernelError::InvalidProjection(format!(
                "aspect {aspect} must be positive"
            )));
        }
        if !(near.is_finite() && far.is_finite() && near > 0.0 && far > near) {
            return Err(KernelError::InvalidProjection(format!(
                "clip planes near={near} far={far}"
            )));
        }
        Ok(Self {
            radius,
            height,
            aspect,
            near,
            far,
        })
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    /// Track the framebuffer aspect ratio. Zero-sized dimensions are ignored.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// `target + (r·sin θ, h, r·cos θ)`.
    pub fn eye(&self, orbit_angle: f32, target: Vec3) -> Vec3 {
        target
            + Vec3::new(
                self.radius * orbit_angle.sin(),
                self.height,
                self.radius * orbit_angle.cos(),
            )
    }

    pub fn view_matrix(&self, orbit_angle: f32, target: Vec3) -> Mat4 {
        look_at_guarded(self.eye(orbit_angle, target), target)
    }

    /// Right-handed perspective with a [0, 1] depth range.
    pub fn projection_matrix(&self, fov_radians: f32) -> Mat4 {
        Mat4::perspective_rh(fov_radians, self.aspect, self.near, self.far)
    }

    pub fn pose(&self, state: &CameraState, target: Vec3) -> CameraPose {
        let eye = self.eye(state.orbit_angle(), target);
        CameraPose {
            eye,
            target,
            view: look_at_guarded(eye, target),
            projection: self.projection_matrix(state.fov_radians()),
        }
    }
}

/// Look from `eye` toward `target` with world up +Y.
///
/// When eye and target coincide the camera looks down -Z; when the view
/// direction is vertical, -Z stands in for up. The result never holds NaN.
pub fn look_at_guarded(eye: Vec3, target: Vec3) -> Mat4 {
    let mut dir = target - eye;
    if dir.length_squared() < DEGENERATE_EPS {
        dir = Vec3::NEG_Z;
    }
    let dir = dir.normalize();
    let up = if dir.cross(Vec3::Y).length_squared() < DEGENERATE_EPS {
        Vec3::NEG_Z
    } else {
        Vec3::Y
    };
    Mat4::look_to_rh(eye, dir, up)
}
