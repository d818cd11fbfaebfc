//! Event clock
//!
//! Counts down to a fixed end time, emitting an `HH:MM:SS` message once per
//! second. Time is the session clock in seconds.

use crate::consts::TIME_EPSILON;

/// Format whole seconds as zero-padded `HH:MM:SS`
pub fn format_hms(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Tick-driven countdown to a fixed end time
#[derive(Debug, Clone)]
pub struct EventCountdown {
    end_time: f64,
    now: f64,
    /// Time accumulated towards the next one-second tick
    accumulator: f32,
    running: bool,
    finished: bool,
}

impl EventCountdown {
    pub fn new(end_time: f64) -> Self {
        Self {
            end_time,
            now: 0.0,
            accumulator: 0.0,
            running: false,
            finished: false,
        }
    }

    /// (Re)start ticking from `now`. Restarting replaces the running loop.
    pub fn start(&mut self, now: f64) {
        self.now = now;
        self.accumulator = 0.0;
        self.running = true;
        self.finished = false;
    }

    pub fn cancel(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whole seconds left (never negative)
    pub fn remaining_secs(&self) -> u64 {
        let remaining = self.end_time - self.now + TIME_EPSILON as f64;
        if remaining <= 0.0 { 0 } else { remaining.floor() as u64 }
    }

    /// Advance the clock; returns the message due this frame, if any
    pub fn advance(&mut self, dt: f32) -> Option<String> {
        if !self.running {
            return None;
        }
        self.now += dt as f64;
        self.accumulator += dt;
        if self.accumulator + TIME_EPSILON < 1.0 {
            return None;
        }
        self.accumulator -= 1.0;

        let remaining = self.remaining_secs();
        if remaining == 0 {
            self.running = false;
            self.finished = true;
            log::info!("Event countdown reached zero");
        }
        Some(format_hms(remaining))
    }
}
