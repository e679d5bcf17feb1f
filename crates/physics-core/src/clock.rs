use crate::constants::{FRAME_DT, MAX_CATCH_UP_STEPS};
use std::time::Duration;

/// Fixed-step accumulator. Wall-clock time goes in, whole integration steps
/// come out; the remainder carries over to the next call.
#[derive(Clone, Debug)]
pub struct FrameClock {
    step: f64,
    accum: f64,
    max_steps: u32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(FRAME_DT, MAX_CATCH_UP_STEPS)
    }
}

impl FrameClock {
    /// A step that is not a positive finite duration falls back to
    /// `FRAME_DT`; `max_steps` is at least 1.
    pub fn new(step_sec: f32, max_steps: u32) -> Self {
        let step = if step_sec.is_finite() && step_sec > 0.0 {
            step_sec
        } else {
            log::warn!("[clock] invalid step {step_sec}s, using {FRAME_DT}s");
            FRAME_DT
        };
        Self {
            step: f64::from(step),
            accum: 0.0,
            max_steps: max_steps.max(1),
        }
    }

    pub fn step_sec(&self) -> f32 {
        self.step as f32
    }

    /// Number of fixed steps to run for `elapsed`. Backlog beyond
    /// `max_steps` is dropped rather than replayed.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accum += elapsed.as_secs_f64();
        let mut steps = 0;
        while self.accum >= self.step {
            self.accum -= self.step;
            steps += 1;
            if steps >= self.max_steps {
                self.accum %= self.step;
                break;
            }
        }
        steps
    }
}
