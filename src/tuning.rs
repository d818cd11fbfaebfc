//! Game feel tuning
//!
//! Every timing, probability and layout constant of the event lives here with
//! its shipped default. A tuning file (JSON) may override any subset.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::quest::curve::Curve;
use crate::quest::layout::RowPattern;

/// Errors raised while loading a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Pool sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolTuning {
    /// Avatars constructed up front
    pub avatar_pool_size: usize,
    /// Landing effects constructed up front (the effect pool never grows)
    pub effect_pool_size: usize,
    /// How long a landing effect stays visible (seconds)
    pub effect_lifetime: f32,
}

impl Default for PoolTuning {
    fn default() -> Self {
        Self {
            avatar_pool_size: 20,
            effect_pool_size: 10,
            effect_lifetime: 1.0,
        }
    }
}

/// Per-actor animation shapes and timings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionTuning {
    pub jump_duration: f32,
    pub jump_height: f32,
    pub fall_duration: f32,
    /// How high the actor hops before being dragged down
    pub fall_hop_height: f32,
    /// Spin reached at the end of a fall (degrees)
    pub fall_spin_degrees: f32,
    pub pop_duration: f32,
    /// Bell-shaped arc shared by jumps and fall hops
    pub arc_curve: Curve,
    /// Deformation d applied as (1 - d, 1 + d)
    pub squash_curve: Curve,
    /// Gravity weight for falls
    pub fall_curve: Curve,
    pub pop_curve: Curve,
}

impl Default for MotionTuning {
    fn default() -> Self {
        Self {
            jump_duration: 0.5,
            jump_height: 200.0,
            fall_duration: 0.8,
            fall_hop_height: 250.0,
            fall_spin_degrees: 90.0,
            pop_duration: 0.3,
            arc_curve: Curve::bell(),
            squash_curve: Curve::squash_stretch(),
            fall_curve: Curve::ease_in(),
            pop_curve: Curve::ease_in_out(),
        }
    }
}

/// Round resolution constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundTuning {
    /// Probability that a simulated participant clears a round
    pub bot_pass_probability: f32,
    /// Upper bound of the per-actor random start delay (seconds)
    pub max_start_delay: f32,
    /// Pause between winner and loser animations (only when there are winners)
    pub settle_delay: f32,
    pub next_round_delay: f32,
    pub victory_delay: f32,
    pub failure_delay: f32,
    /// Radius of the landing area around a step centre
    pub step_radius: f32,
    /// Vertical squash of the landing area
    pub step_vertical_jitter: f32,
    /// How far below the step line a falling actor is sent
    pub fall_depth: f32,
    /// Step centres, bottom step first
    pub step_positions: Vec<Vec2>,
    /// Lay the steps out on a row pattern instead (one step per slot)
    pub step_pattern: Option<RowPattern>,
}

impl Default for RoundTuning {
    fn default() -> Self {
        Self {
            bot_pass_probability: 0.7,
            max_start_delay: 0.4,
            settle_delay: 0.6,
            next_round_delay: 0.5,
            victory_delay: 1.5,
            failure_delay: 2.0,
            step_radius: 80.0,
            step_vertical_jitter: 0.2,
            fall_depth: 3000.0,
            step_positions: default_step_positions(),
            step_pattern: None,
        }
    }
}

/// Nine steps zig-zagging upward (eight levels to clear)
fn default_step_positions() -> Vec<Vec2> {
    (0..9)
        .map(|i| {
            let x = if i % 2 == 0 { -90.0 } else { 90.0 };
            Vec2::new(x, -600.0 + i as f32 * 150.0)
        })
        .collect()
}

/// Matchmaking simulation constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchmakingTuning {
    pub total_duration: f32,
    pub target_count: u32,
    pub max_visual_slots: usize,
    /// Random tilt of crowd avatars (degrees, symmetric)
    pub rotation_spread: f32,
    pub main_scale: f32,
    /// Pause before the continue control appears
    pub settle_delay: f32,
    pub pile: RowPattern,
}

impl Default for MatchmakingTuning {
    fn default() -> Self {
        Self {
            total_duration: 3.0,
            target_count: 100,
            max_visual_slots: 40,
            rotation_spread: 10.0,
            main_scale: 1.2,
            settle_delay: 0.2,
            pile: RowPattern::default(),
        }
    }
}

/// Reward popup constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardTuning {
    pub max_co_winners: usize,
    pub main_scale: f32,
    pub co_winner_scale: f32,
}

impl Default for RewardTuning {
    fn default() -> Self {
        Self {
            max_co_winners: 5,
            main_scale: 1.3,
            co_winner_scale: 0.8,
        }
    }
}

/// Complete tuning set
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Seed for the session RNG
    pub seed: u64,
    /// Participants requested from the session provider
    pub roster_size: usize,
    pub pool: PoolTuning,
    pub motion: MotionTuning,
    pub round: RoundTuning,
    pub matchmaking: MatchmakingTuning,
    pub reward: RewardTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            seed: 0x1a7a_0e57,
            roster_size: 100,
            pool: PoolTuning::default(),
            motion: MotionTuning::default(),
            round: RoundTuning::default(),
            matchmaking: MatchmakingTuning::default(),
            reward: RewardTuning::default(),
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load and validate a JSON tuning file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| TuningError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let tuning = Self::from_json_str(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values the engines cannot work with
    pub fn validate(&self) -> Result<(), TuningError> {
        let invalid = |msg: &str| -> Result<(), TuningError> {
            Err(TuningError::Invalid(msg.to_string()))
        };

        if !(0.0..=1.0).contains(&self.round.bot_pass_probability) {
            return invalid("round.bot_pass_probability must be within 0..=1");
        }
        if self.roster_size == 0 {
            return invalid("roster_size must be at least 1");
        }
        if self.pool.effect_pool_size == 0 {
            return invalid("pool.effect_pool_size must be at least 1");
        }
        if self.matchmaking.pile.capacities.is_empty() {
            return invalid("matchmaking.pile.capacities must not be empty");
        }
        if self.matchmaking.total_duration <= 0.0 {
            return invalid("matchmaking.total_duration must be positive");
        }

        let durations = [
            self.motion.jump_duration,
            self.motion.fall_duration,
            self.motion.pop_duration,
            self.round.max_start_delay,
            self.round.settle_delay,
            self.round.next_round_delay,
            self.round.victory_delay,
            self.round.failure_delay,
            self.matchmaking.settle_delay,
            self.pool.effect_lifetime,
        ];
        if durations.iter().any(|d| !d.is_finite() || *d < 0.0) {
            return invalid("durations and delays must be finite and non-negative");
        }
        let steps = match &self.round.step_pattern {
            Some(pattern) => pattern.capacity(),
            None => self.round.step_positions.len(),
        };
        if steps == 1 {
            return invalid("round steps must be empty or number at least two");
        }
        if self.round.step_radius < 0.0 || self.matchmaking.pile.jitter < 0.0 {
            return invalid("jitter radii must be non-negative");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let tuning = Tuning::default();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.round.step_positions.len(), 9);
        assert!((tuning.round.bot_pass_probability - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json_str(r#"{ "roster_size": 10, "round": { "settle_delay": 1.0 } }"#)
            .unwrap();
        assert_eq!(tuning.roster_size, 10);
        assert_eq!(tuning.round.settle_delay, 1.0);
        assert_eq!(tuning.round.failure_delay, 2.0);
        assert_eq!(tuning.pool.avatar_pool_size, 20);
    }

    #[test]
    fn test_invalid_probability_rejected() {
        let err = Tuning::from_json_str(r#"{ "round": { "bot_pass_probability": 1.5 } }"#)
            .unwrap_err();
        assert!(matches!(err, TuningError::Invalid(_)));
    }

    #[test]
    fn test_single_step_climb_rejected() {
        let err = Tuning::from_json_str(r#"{ "round": { "step_positions": [[0.0, 0.0]] } }"#)
            .unwrap_err();
        assert!(matches!(err, TuningError::Invalid(_)));
    }

    #[test]
    fn test_step_pattern_from_json() {
        let tuning = Tuning::from_json_str(
            r#"{ "round": { "step_pattern": { "capacities": [1, 1, 1], "jitter": 0.0 } } }"#,
        )
        .unwrap();
        let pattern = tuning.round.step_pattern.unwrap();
        assert_eq!(pattern.capacity(), 3);
        assert_eq!(pattern.row_height, 70.0);
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = Tuning::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Tuning::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, TuningError::Io { .. }));
    }

    #[test]
    fn test_step_positions_round_trip_as_pairs() {
        let json = serde_json::to_string(&RoundTuning::default()).unwrap();
        assert!(json.contains("[-90.0,-600.0]"));
    }
}
