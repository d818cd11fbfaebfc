//! Tick-driven timing primitives
//!
//! Every wait in the event (start delays, settle pauses, animation loops) is a
//! small state object advanced once per frame by its owner. Suspension only
//! happens between calls to `advance`.

use serde::{Deserialize, Serialize};

use crate::clamp01;

/// One-shot delay timer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Delay {
    remaining: f32,
}

impl Delay {
    pub fn new(seconds: f32) -> Self {
        Self {
            remaining: seconds.max(0.0),
        }
    }

    /// A delay that is already elapsed
    pub fn elapsed() -> Self {
        Self { remaining: 0.0 }
    }

    /// Advance by `dt`; returns true once the delay has run out
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.remaining > 0.0 {
            self.remaining -= dt;
        }
        self.is_done()
    }

    pub fn is_done(&self) -> bool {
        self.remaining <= 0.0
    }

    pub fn remaining(&self) -> f32 {
        self.remaining.max(0.0)
    }
}

/// Normalised progress over a fixed duration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    elapsed: f32,
    duration: f32,
}

impl Progress {
    pub fn new(duration: f32) -> Self {
        Self {
            elapsed: 0.0,
            duration: duration.max(0.0),
        }
    }

    /// Advance by `dt` and return `clamp01(elapsed / duration)`.
    /// A zero duration completes on the first advance.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed += dt.max(0.0);
        self.t()
    }

    pub fn t(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        clamp01(self.elapsed / self.duration)
    }

    pub fn is_done(&self) -> bool {
        self.t() >= 1.0
    }
}
