use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or validating a [`SceneConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// The ring of cars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormationConfig {
    /// Number of cars on the ring. Must be at least 2.
    pub count: usize,
    /// Radius of the circle the cars ride on.
    pub radius: f32,
    /// Edge length of a single car cube.
    pub car_size: f32,
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self {
            count: 10,
            radius: 1.5,
            car_size: 0.25,
        }
    }
}

/// Static ground disc the cars run on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackConfig {
    pub radius: f32,
    pub segments: u32,
    /// Vertical offset of the track plane (slightly below the cars).
    pub height: f32,
    pub color: [f32; 4],
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            radius: 3.0,
            segments: 100,
            height: -0.1,
            color: [0.5, 0.5, 0.5, 1.0],
        }
    }
}

/// Orbit camera geometry and projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    /// Horizontal distance from the anchor car.
    pub orbit_radius: f32,
    /// Vertical offset above the anchor car.
    pub height: f32,
    pub initial_orbit_angle: f32,
    /// Field of view in degrees.
    pub initial_fov_degrees: f32,
    pub min_fov_degrees: f32,
    pub max_fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            orbit_radius: 3.0,
            height: 0.5,
            initial_orbit_angle: 0.0,
            initial_fov_degrees: 65.0,
            min_fov_degrees: 10.0,
            max_fov_degrees: 65.0,
            aspect: 800.0 / 600.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

/// Speed and orbit controls plus the simulated frame duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MotionConfig {
    pub initial_speed: f32,
    /// Speed change per frame while an accelerate/decelerate key is held.
    pub speed_step: f32,
    /// Orbit angle change (radians) per frame while a rotate key is held.
    pub rotate_step: f32,
    /// Seconds of simulated time per frame under the fixed timestep.
    pub frame_duration: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            initial_speed: 0.5,
            speed_step: 0.008,
            rotate_step: 0.02,
            frame_duration: 1.0 / 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Ring Train".into(),
            width: 800,
            height: 600,
        }
    }
}

/// Full scene configuration. Missing sections fall back to the reference values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneConfig {
    pub formation: FormationConfig,
    pub track: TrackConfig,
    pub camera: CameraConfig,
    pub motion: MotionConfig,
    pub window: WindowConfig,
    pub culling_enabled: bool,
}

impl SceneConfig {
    /// Parse a YAML document and validate it.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!("loaded scene config from {}", path.display());
        Ok(config)
    }

    /// Check the invariants the kernel relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.formation.count < 2 {
            return Err(invalid("formation.count", "must be at least 2"));
        }
        non_negative("formation.radius", self.formation.radius)?;
        positive("formation.car_size", self.formation.car_size)?;

        non_negative("track.radius", self.track.radius)?;
        if self.track.segments < 3 {
            return Err(invalid("track.segments", "must be at least 3"));
        }
        finite("track.height", self.track.height)?;

        let cam = &self.camera;
        non_negative("camera.orbit_radius", cam.orbit_radius)?;
        finite("camera.height", cam.height)?;
        finite("camera.initial_orbit_angle", cam.initial_orbit_angle)?;
        positive("camera.min_fov_degrees", cam.min_fov_degrees)?;
        finite("camera.max_fov_degrees", cam.max_fov_degrees)?;
        if cam.max_fov_degrees >= 180.0 || cam.max_fov_degrees < cam.min_fov_degrees {
            return Err(invalid(
                "camera.max_fov_degrees",
                "must lie between min_fov_degrees and 180",
            ));
        }
        finite("camera.initial_fov_degrees", cam.initial_fov_degrees)?;
        positive("camera.aspect", cam.aspect)?;
        positive("camera.near", cam.near)?;
        finite("camera.far", cam.far)?;
        if cam.far <= cam.near {
            return Err(invalid("camera.far", "must be greater than near"));
        }

        non_negative("motion.initial_speed", self.motion.initial_speed)?;
        non_negative("motion.speed_step", self.motion.speed_step)?;
        finite("motion.rotate_step", self.motion.rotate_step)?;
        positive("motion.frame_duration", self.motion.frame_duration)?;

        if self.window.width == 0 || self.window.height == 0 {
            return Err(invalid("window", "width and height must be non-zero"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} is not finite")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(invalid(field, format!("{value} is negative")));
    }
    Ok(())
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value <= 0.0 {
        return Err(invalid(field, format!("{value} must be positive")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn shipped_config_matches_defaults() {
        let text = include_str!("../../../config/ringtrain.yaml");
        assert_eq!(SceneConfig::from_yaml_str(text).unwrap(), SceneConfig::default());
    }

    #[test]
    fn defaults_match_reference_scene() {
        let c = SceneConfig::default();
        assert_eq!(c.formation.count, 10);
        assert_eq!(c.formation.radius, 1.5);
        assert_eq!(c.camera.initial_fov_degrees, 65.0);
        assert_eq!(c.camera.min_fov_degrees, 10.0);
        assert_eq!(c.motion.speed_step, 0.008);
        assert!(!c.culling_enabled);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let c = SceneConfig::from_yaml_str("formation:\n  count: 4\nculling_enabled: true\n").unwrap();
        assert_eq!(c.formation.count, 4);
        assert_eq!(c.formation.radius, 1.5);
        assert!(c.culling_enabled);
        assert_eq!(c.track, TrackConfig::default());
    }

    #[test]
    fn empty_document_is_default() {
        let c = SceneConfig::from_yaml_str("{}").unwrap();
        assert_eq!(c, SceneConfig::default());
    }

    #[test]
    fn unknown_field_rejected() {
        let err = SceneConfig::from_yaml_str("formation:\n  cars: 4\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn single_car_rejected() {
        let err = SceneConfig::from_yaml_str("formation:\n  count: 1\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "formation.count",
                ..
            }
        ));
    }

    #[test]
    fn inverted_fov_range_rejected() {
        let mut c = SceneConfig::default();
        c.camera.min_fov_degrees = 70.0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn far_must_exceed_near() {
        let mut c = SceneConfig::default();
        c.camera.far = c.camera.near;
        assert!(c.validate().is_err());
    }

    #[test]
    fn zero_orbit_radius_is_allowed() {
        let mut c = SceneConfig::default();
        c.camera.orbit_radius = 0.0;
        assert!(c.validate().is_ok());
    }

    #[test]
    fn load_from_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "motion:\n  initial_speed: 1.25").unwrap();
        let c = SceneConfig::load(tmp.path()).unwrap();
        assert_eq!(c.motion.initial_speed, 1.25);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = SceneConfig::load("/nonexistent/ringtrain.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
