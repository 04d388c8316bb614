use crate::error::KernelError;
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Position of element `index` of a `count`-element formation at `time`.
///
/// `angle = time - index * PI / (count - 1)`, placed on the horizontal circle
/// of the given radius. Elements trail each other around the ring as time
/// grows. `count` must be at least 2; callers go through [`Formation::new`].
pub fn element_position(time: f32, index: usize, count: usize, radius: f32) -> Vec3 {
    let angle = time - angular_offset(index, count);
    Vec3::new(radius * angle.cos(), 0.0, radius * angle.sin())
}

fn angular_offset(index: usize, count: usize) -> f32 {
    index as f32 * (PI / (count - 1) as f32)
}

/// One car in the formation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormationElement {
    pub index: usize,
    /// Phase lag behind element 0, in radians.
    pub angular_offset: f32,
}

/// N elements spread over half a circle of phase, riding a ring of fixed radius.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Formation {
    count: usize,
    radius: f32,
}

impl Formation {
    pub fn new(count: usize, radius: f32) -> Result<Self, KernelError> {
        if count < 2 {
            return Err(KernelError::TooFewElements(count));
        }
        if !radius.is_finite() || radius < 0.0 {
            return Err(KernelError::InvalidRadius(radius));
        }
        Ok(Self { count, radius })
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Index of the element the camera follows.
    pub fn anchor_index(&self) -> usize {
        self.count - 1
    }

    pub fn elements(&self) -> impl Iterator<Item = FormationElement> + '_ {
        (0..self.count).map(|index| FormationElement {
            index,
            angular_offset: angular_offset(index, self.count),
        })
    }

    pub fn position(&self, time: f32, index: usize) -> Vec3 {
        element_position(time, index, self.count, self.radius)
    }

    pub fn positions(&self, time: f32) -> Vec<Vec3> {
        (0..self.count).map(|i| self.position(time, i)).collect()
    }

    /// Translation-only model matrices, one per element, in index order.
    pub fn model_transforms(&self, time: f32) -> Vec<Mat4> {
        (0..self.count)
            .map(|i| Mat4::from_translation(self.position(time, i)))
            .collect()
    }

    pub fn anchor(&self, time: f32) -> Vec3 {
        self.position(time, self.anchor_index())
    }
}
