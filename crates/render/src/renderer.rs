use glam::Vec3;
use ringtrain_kernel::FrameTransforms;
use std::fmt::Write;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer consumes one frame's transforms and produces output. It never
/// feeds anything back into the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&self, frame: &FrameTransforms) -> Self::Output;
}

/// Produces a human-readable dump of a frame.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    /// Also list every car position, not just the anchor.
    pub verbose: bool,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}

fn fmt_vec(v: Vec3) -> String {
    format!("({:.3}, {:.3}, {:.3})", v.x, v.y, v.z)
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, frame: &FrameTransforms) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Frame (t={:.4}, cars={}, culling={}) ===",
            frame.simulated_time,
            frame.models.len(),
            if frame.culling_enabled { "on" } else { "off" }
        );
        let _ = writeln!(
            out,
            "Camera: eye={} anchor={}",
            fmt_vec(frame.eye),
            fmt_vec(frame.anchor)
        );
        if self.verbose {
            for (i, model) in frame.models.iter().enumerate() {
                let p = model.transform_point3(Vec3::ZERO);
                let _ = writeln!(out, "  car[{i}] pos={}", fmt_vec(p));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringtrain_common::SceneConfig;
    use ringtrain_kernel::Scene;

    fn frame() -> FrameTransforms {
        Scene::from_config(&SceneConfig::default())
            .unwrap()
            .frame_transforms()
    }

    #[test]
    fn summary_line() {
        let out = DebugTextRenderer::new().render(&frame());
        assert!(out.contains("t=0.0000"));
        assert!(out.contains("cars=10"));
        assert!(out.contains("culling=off"));
        assert!(out.contains("anchor=(-1.500, 0.000, "));
        assert!(!out.contains("car[0]"));
    }

    #[test]
    fn verbose_lists_cars() {
        let out = DebugTextRenderer::verbose().render(&frame());
        assert!(out.contains("car[0] pos=(1.500, 0.000, 0.000)"));
        assert!(out.contains("car[9]"));
    }
}
