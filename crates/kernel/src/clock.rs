use crate::state::SimulationState;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest measured frame delta honoured under [`TimeStep::WallClock`].
/// Longer stalls (window drag, debugger) are truncated to this.
pub const MAX_WALL_CLOCK_DELTA: f32 = 0.1;

/// Advance accumulated simulated time by one frame.
///
/// Paused: returns `previous` unchanged. Running: `previous + speed * frame_duration`.
pub fn advance_time(previous: f32, speed: f32, paused: bool, frame_duration: f32) -> f32 {
    if paused {
        previous
    } else {
        previous + speed * frame_duration
    }
}

/// How much simulated time one frame represents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TimeStep {
    /// Every frame counts as the same duration, regardless of how long it
    /// actually took. Animation rate follows the display refresh rate.
    Fixed(f32),
    /// Use the measured wall-clock delta of each frame, capped at
    /// [`MAX_WALL_CLOCK_DELTA`].
    WallClock,
}

impl Default for TimeStep {
    fn default() -> Self {
        Self::Fixed(1.0 / 60.0)
    }
}

/// Drives [`SimulationState::simulated_time`] once per frame.
#[derive(Debug, Clone, Default)]
pub struct Clock {
    step: TimeStep,
    frames: u64,
}

impl Clock {
    pub fn new(step: TimeStep) -> Self {
        Self { step, frames: 0 }
    }

    pub fn step(&self) -> TimeStep {
        self.step
    }

    /// Number of frames ticked so far, paused or not.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Duration credited to a frame that took `elapsed` of real time.
    pub fn frame_duration(&self, elapsed: Duration) -> f32 {
        match self.step {
            TimeStep::Fixed(dt) => dt,
            TimeStep::WallClock => elapsed.as_secs_f32().min(MAX_WALL_CLOCK_DELTA),
        }
    }

    /// Advance `sim` by one frame and return the new simulated time.
    pub fn tick(&mut self, sim: &mut SimulationState, elapsed: Duration) -> f32 {
        self.frames += 1;
        let dt = self.frame_duration(elapsed);
        let time = advance_time(sim.simulated_time(), sim.speed(), sim.paused(), dt);
        sim.set_simulated_time(time);
        time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn paused_time_is_frozen() {
        assert_eq!(advance_time(3.25, 2.0, true, DT), 3.25);
    }

    #[test]
    fn running_time_advances_by_speed_times_dt() {
        let t = advance_time(1.0, 0.5, false, DT);
        assert!((t - (1.0 + 0.5 * DT)).abs() < 1e-6);
    }

    #[test]
    fn accumulated_time_matches_sum() {
        let mut sim = SimulationState::new(0.5);
        let mut clock = Clock::new(TimeStep::Fixed(DT));
        let mut last = 0.0;
        for _ in 0..600 {
            let t = clock.tick(&mut sim, Duration::ZERO);
            assert!(t >= last);
            last = t;
        }
        let expected = 600.0 * 0.5 * DT;
        assert!((sim.simulated_time() - expected).abs() < 1e-3);
        assert_eq!(clock.frames(), 600);
    }

    #[test]
    fn fixed_step_ignores_measured_time() {
        let clock = Clock::new(TimeStep::Fixed(DT));
        assert_eq!(clock.frame_duration(Duration::from_millis(250)), DT);
    }

    #[test]
    fn wall_clock_step_uses_capped_delta() {
        let clock = Clock::new(TimeStep::WallClock);
        let dt = clock.frame_duration(Duration::from_millis(20));
        assert!((dt - 0.02).abs() < 1e-6);
        assert_eq!(
            clock.frame_duration(Duration::from_secs(3)),
            MAX_WALL_CLOCK_DELTA
        );
    }

    #[test]
    fn pause_freezes_and_resume_continues() {
        let mut sim = SimulationState::new(1.0);
        let mut clock = Clock::new(TimeStep::Fixed(DT));
        clock.tick(&mut sim, Duration::ZERO);
        let before = sim.simulated_time();

        sim.toggle_pause();
        for _ in 0..30 {
            clock.tick(&mut sim, Duration::ZERO);
        }
        assert_eq!(sim.simulated_time(), before);

        sim.toggle_pause();
        clock.tick(&mut sim, Duration::ZERO);
        assert!(sim.simulated_time() > before);
    }

    #[test]
    fn zero_speed_does_not_move() {
        let mut sim = SimulationState::new(0.0);
        let mut clock = Clock::default();
        clock.tick(&mut sim, Duration::ZERO);
        assert_eq!(sim.simulated_time(), 0.0);
    }
}
