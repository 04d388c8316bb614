use glam::Vec3;
use ringtrain_common::TrackConfig;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Static description of the ground disc under the formation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub radius: f32,
    pub segments: u32,
    pub height: f32,
    pub color: [f32; 4],
}

impl Track {
    /// Points around the rim, closed: the last point repeats the first.
    pub fn rim_points(&self) -> Vec<Vec3> {
        (0..=self.segments)
            .map(|i| {
                let angle = TAU * i as f32 / self.segments as f32;
                Vec3::new(
                    self.radius * angle.cos(),
                    self.height,
                    self.radius * angle.sin(),
                )
            })
            .collect()
    }
}

impl From<&TrackConfig> for Track {
    fn from(c: &TrackConfig) -> Self {
        Self {
            radius: c.radius,
            segments: c.segments,
            height: c.height,
            color: c.color,
        }
    }
}

impl Default for Track {
    fn default() -> Self {
        Self::from(&TrackConfig::default())
    }
}
