//! Lava Quest - climb-or-fall elimination event core
//!
//! Core modules:
//! - `quest`: Frame-driven simulation (actor pool, animations, rounds, matchmaking)
//! - `session`: Composition root wiring the engines to the UI collaborators
//! - `hud`: HUD sink and text formatting
//! - `reward`: Winners popup built from the quest-completed payload
//! - `tuning`: Data-driven game feel constants

pub mod hud;
pub mod quest;
pub mod reward;
pub mod session;
pub mod tuning;

pub use hud::{HudSink, LogHud, TextHud};
pub use session::{EventSession, MockSessionProvider, SessionInput, SessionPhase, SessionProvider};
pub use tuning::{Tuning, TuningError};

use glam::Vec2;
use rand::Rng;

/// Scheduler configuration constants
pub mod consts {
    /// Fixed frame tick (60 Hz, matches the presentation layer)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Seconds in the event window handed out by the mock backend (23:59:59)
    pub const EVENT_WINDOW_SECS: f64 = 23.0 * 3600.0 + 59.0 * 60.0 + 59.0;

    /// Slack used when comparing accumulated frame time against whole seconds
    pub const TIME_EPSILON: f32 = 1e-3;
}

/// Clamp to [0, 1]
#[inline]
pub fn clamp01(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Unclamped scalar interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Uniform point inside a disc of the given radius
pub fn random_in_disc<R: Rng>(rng: &mut R, radius: f32) -> Vec2 {
    if radius <= 0.0 {
        return Vec2::ZERO;
    }
    // sqrt keeps the distribution uniform over area
    let r = rng.random::<f32>().sqrt() * radius;
    let theta = rng.random::<f32>() * std::f32::consts::TAU;
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Uniform sample in [-spread, spread]
#[inline]
pub fn symmetric_jitter<R: Rng>(rng: &mut R, spread: f32) -> f32 {
    if spread <= 0.0 {
        return 0.0;
    }
    rng.random_range(-spread..=spread)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_random_in_disc_bounded() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..500 {
            let p = random_in_disc(&mut rng, 80.0);
            assert!(p.length() <= 80.0 + 1e-3);
        }
    }

    #[test]
    fn test_zero_spread_is_noop() {
        let mut rng = Pcg32::seed_from_u64(7);
        assert_eq!(random_in_disc(&mut rng, 0.0), Vec2::ZERO);
        assert_eq!(symmetric_jitter(&mut rng, 0.0), 0.0);
    }

    #[test]
    fn test_lerp_unclamped() {
        assert!((lerp(0.0, 10.0, 1.5) - 15.0).abs() < 1e-5);
        assert_eq!(clamp01(2.0), 1.0);
        assert_eq!(clamp01(-1.0), 0.0);
    }
}
