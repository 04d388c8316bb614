use ringtrain_kernel::Scene;
use serde::Serialize;

/// Scene inspector for developer tooling.
///
/// Read-only queries against the scene for the desktop side panel and the
/// CLI.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the scene state.
    pub fn summary(scene: &Scene) -> SceneSummary {
        let anchor = scene.anchor();
        SceneSummary {
            frames: scene.clock().frames(),
            simulated_time: scene.sim.simulated_time(),
            speed: scene.sim.speed(),
            paused: scene.sim.paused(),
            fov_degrees: scene.camera_state.fov_degrees(),
            orbit_degrees: scene.camera_state.orbit_angle().to_degrees(),
            culling_enabled: scene.flags.culling_enabled,
            cars: scene.formation().count(),
            anchor: anchor.to_array(),
        }
    }

    /// Position of one car at the current simulated time.
    pub fn inspect_car(scene: &Scene, index: usize) -> Option<CarInfo> {
        let formation = scene.formation();
        if index >= formation.count() {
            return None;
        }
        let position = formation.position(scene.sim.simulated_time(), index);
        Some(CarInfo {
            index,
            position: position.to_array(),
            is_anchor: index == formation.anchor_index(),
        })
    }
}

/// Summary of scene state for the inspector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSummary {
    pub frames: u64,
    pub simulated_time: f32,
    pub speed: f32,
    pub paused: bool,
    pub fov_degrees: f32,
    pub orbit_degrees: f32,
    pub culling_enabled: bool,
    pub cars: usize,
    pub anchor: [f32; 3],
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: frame={} t={:.3} speed={:.3}{} fov={:.1} orbit={:.1}deg culling={} cars={} anchor=({:.2}, {:.2}, {:.2})",
            self.frames,
            self.simulated_time,
            self.speed,
            if self.paused { " (paused)" } else { "" },
            self.fov_degrees,
            self.orbit_degrees,
            if self.culling_enabled { "on" } else { "off" },
            self.cars,
            self.anchor[0],
            self.anchor[1],
            self.anchor[2],
        )
    }
}

/// Detailed info about a single car.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarInfo {
    pub index: usize,
    pub position: [f32; 3],
    pub is_anchor: bool,
}

impl std::fmt::Display for CarInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Car [{}]{} pos=({:.3}, {:.3}, {:.3})",
            self.index,
            if self.is_anchor { " anchor" } else { "" },
            self.position[0],
            self.position[1],
            self.position[2],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use ringtrain_common::SceneConfig;
    use std::time::Duration;

    fn scene() -> Scene {
        Scene::from_config(&SceneConfig::default()).unwrap()
    }

    #[test]
    fn summary_fresh_scene() {
        let summary = SceneInspector::summary(&scene());
        assert_eq!(summary.frames, 0);
        assert_eq!(summary.simulated_time, 0.0);
        assert_eq!(summary.speed, 0.5);
        assert!(!summary.paused);
        assert_eq!(summary.fov_degrees, 65.0);
        assert_eq!(summary.orbit_degrees, 0.0);
        assert_eq!(summary.cars, 10);
        assert!((summary.anchor[0] + 1.5).abs() < 1e-5);
    }

    #[test]
    fn summary_tracks_advance() {
        let mut scene = scene();
        for _ in 0..3 {
            scene.advance(Duration::ZERO);
        }
        let summary = SceneInspector::summary(&scene);
        assert_eq!(summary.frames, 3);
        assert!((summary.simulated_time - 3.0 * 0.5 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn inspect_car_found() {
        let scene = scene();
        let first = SceneInspector::inspect_car(&scene, 0).unwrap();
        assert!((Vec3::from(first.position) - Vec3::new(1.5, 0.0, 0.0)).length() < 1e-5);
        assert!(!first.is_anchor);
        assert!(SceneInspector::inspect_car(&scene, 9).unwrap().is_anchor);
    }

    #[test]
    fn car_display_marks_anchor() {
        let scene = scene();
        let anchor = SceneInspector::inspect_car(&scene, 9).unwrap().to_string();
        assert!(anchor.starts_with("Car [9] anchor"));
        let first = SceneInspector::inspect_car(&scene, 0).unwrap().to_string();
        assert!(first.contains("pos=(1.500, 0.000, 0.000)"));
    }

    #[test]
    fn inspect_car_out_of_range() {
        assert!(SceneInspector::inspect_car(&scene(), 10).is_none());
    }

    #[test]
    fn summary_display() {
        let mut scene = scene();
        scene.sim.toggle_pause();
        let s = format!("{}", SceneInspector::summary(&scene));
        assert!(s.contains("frame=0"));
        assert!(s.contains("(paused)"));
        assert!(s.contains("culling=off"));
    }
}
