//! Linear easing for scalar values (camera height, speed penalties...)

use serde::{Deserialize, Serialize};

/// Moves a value toward a target at a fixed rate per second
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearDelayer {
    target: f32,
    current: f32,
    increment: f32,
}

impl LinearDelayer {
    /// `increment` is the change per second
    pub fn new(increment: f32) -> Self {
        Self {
            target: 0.0,
            current: 0.0,
            increment: increment.abs(),
        }
    }

    /// Set a new target; `force` jumps there immediately
    pub fn set_target(&mut self, target: f32, force: bool) {
        self.target = target;
        if force {
            self.current = target;
        }
    }

    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Advance toward the target, never overshooting. Returns the new value.
    pub fn tick(&mut self, elapsed: f32) -> f32 {
        let step = self.increment * elapsed.max(0.0);
        let delta = self.target - self.current;
        if delta.abs() <= step {
            self.current = self.target;
        } else {
            self.current += step.copysign(delta);
        }
        self.current
    }

    #[inline]
    pub fn is_stable(&self) -> bool {
        self.current == self.target
    }
}
