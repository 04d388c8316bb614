use ringtrain_input::{Action, ActionSnapshot, InputSampler, InputTuning};
use ringtrain_kernel::{FrameTransforms, Scene};
use serde::Serialize;
use std::str::FromStr;
use std::time::Duration;

/// One action held for exactly one frame, written `FRAME:ACTION`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptStep {
    pub frame: u64,
    pub action: Action,
}

impl FromStr for ScriptStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (frame, action) = s
            .split_once(':')
            .ok_or_else(|| format!("expected FRAME:ACTION, got '{s}'"))?;
        let frame = frame
            .trim()
            .parse()
            .map_err(|e| format!("bad frame number '{frame}': {e}"))?;
        let action = action.parse().map_err(|e| format!("{e}"))?;
        Ok(Self { frame, action })
    }
}

/// Scripted input for a headless run.
#[derive(Debug, Clone, Default)]
pub struct InputScript {
    pub hold: Vec<Action>,
    pub presses: Vec<ScriptStep>,
}

impl InputScript {
    /// Actions held during `frame`.
    pub fn snapshot(&self, frame: u64) -> ActionSnapshot {
        self.hold
            .iter()
            .copied()
            .chain(
                self.presses
                    .iter()
                    .filter(|step| step.frame == frame)
                    .map(|step| step.action),
            )
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulatedFrame {
    pub frame: u64,
    pub transforms: FrameTransforms,
}

/// Run up to `frames` frames in the same order as the window loop: sample
/// input, advance the clock, compute transforms. Stops after the frame in
/// which exit was pressed.
///
/// Only every `every`th frame is kept, plus the last frame that ran.
pub fn simulate(
    scene: &mut Scene,
    script: &InputScript,
    tuning: InputTuning,
    frames: u64,
    every: u64,
) -> Vec<SimulatedFrame> {
    let every = every.max(1);
    let mut sampler = InputSampler::new(tuning);
    let mut kept = Vec::new();
    let mut last = None;
    for frame in 0..frames {
        let outcome = sampler.sample_scene(script.snapshot(frame), scene);
        scene.advance(Duration::ZERO);
        let current = SimulatedFrame {
            frame,
            transforms: scene.frame_transforms(),
        };
        if frame % every == 0 {
            kept.push(current);
            last = None;
        } else {
            last = Some(current);
        }
        if outcome.exit_requested {
            tracing::info!(frame, "exit pressed, stopping");
            break;
        }
    }
    kept.extend(last);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringtrain_common::SceneConfig;

    fn scene() -> Scene {
        Scene::from_config(&SceneConfig::default()).unwrap()
    }

    #[test]
    fn parses_script_steps() {
        let step: ScriptStep = "12:toggle_pause".parse().unwrap();
        assert_eq!(
            step,
            ScriptStep {
                frame: 12,
                action: Action::TogglePause
            }
        );
        assert!("toggle_pause".parse::<ScriptStep>().is_err());
        assert!("x:exit".parse::<ScriptStep>().is_err());
        assert!("3:fly".parse::<ScriptStep>().is_err());
    }

    #[test]
    fn presses_apply_to_their_frame_only() {
        let script = InputScript {
            hold: vec![Action::Accelerate],
            presses: vec![ScriptStep {
                frame: 2,
                action: Action::ToggleCulling,
            }],
        };
        assert!(script.snapshot(0).is_held(Action::Accelerate));
        assert!(!script.snapshot(1).is_held(Action::ToggleCulling));
        assert!(script.snapshot(2).is_held(Action::ToggleCulling));
    }

    #[test]
    fn unscripted_run_accumulates_time() {
        let mut scene = scene();
        let frames = simulate(&mut scene, &InputScript::default(), InputTuning::default(), 60, 1);
        assert_eq!(frames.len(), 60);
        let times: Vec<f32> = frames.iter().map(|f| f.transforms.simulated_time).collect();
        assert!(times.windows(2).all(|w| w[1] >= w[0]));
        assert!((times[59] - 0.5).abs() < 1e-4);
    }

    #[test]
    fn pause_freezes_following_frames() {
        let mut scene = scene();
        let script = InputScript {
            hold: vec![],
            presses: vec![ScriptStep {
                frame: 10,
                action: Action::TogglePause,
            }],
        };
        let frames = simulate(&mut scene, &script, InputTuning::default(), 30, 1);
        // Frame 10 samples the pause before its clock tick, so time stops
        // at the value frame 9 reached.
        let frozen = frames[9].transforms.simulated_time;
        assert!(frames[10..].iter().all(|f| f.transforms.simulated_time == frozen));
        assert!(frames[8].transforms.simulated_time < frozen);
    }

    #[test]
    fn exit_stops_after_current_frame() {
        let mut scene = scene();
        let script = InputScript {
            hold: vec![],
            presses: vec![ScriptStep {
                frame: 4,
                action: Action::Exit,
            }],
        };
        let frames = simulate(&mut scene, &script, InputTuning::default(), 100, 1);
        assert_eq!(frames.len(), 5);
        assert_eq!(frames.last().map(|f| f.frame), Some(4));
    }

    #[test]
    fn unbounded_frame_count_stops_at_exit() {
        let mut scene = scene();
        let script = InputScript {
            hold: vec![],
            presses: vec![ScriptStep {
                frame: 0,
                action: Action::Exit,
            }],
        };
        let frames = simulate(&mut scene, &script, InputTuning::default(), u64::MAX, 1);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].frame, 0);
    }

    #[test]
    fn stride_keeps_every_nth_and_last_frame() {
        let mut scene = scene();
        let frames = simulate(&mut scene, &InputScript::default(), InputTuning::default(), 10, 4);
        let numbers: Vec<u64> = frames.iter().map(|f| f.frame).collect();
        assert_eq!(numbers, vec![0, 4, 8, 9]);
        assert_eq!(scene.clock().frames(), 10);
    }

    #[test]
    fn stride_does_not_repeat_a_kept_last_frame() {
        let mut scene = scene();
        let frames = simulate(&mut scene, &InputScript::default(), InputTuning::default(), 9, 4);
        let numbers: Vec<u64> = frames.iter().map(|f| f.frame).collect();
        assert_eq!(numbers, vec![0, 4, 8]);
    }
}
