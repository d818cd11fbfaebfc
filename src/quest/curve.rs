//! Keyframed interpolation tables
//!
//! Animation shapes (jump arc, squash/stretch, gravity ease) are supplied as
//! tables of `(time, value)` keys and sampled with piecewise-linear
//! interpolation. Tables are data, so tuning files can replace them.

use serde::{Deserialize, Serialize};

use crate::lerp;

/// A single curve key
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Key {
    pub time: f32,
    pub value: f32,
}

impl Key {
    pub const fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// Interpolation table sorted by key time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Key>", into = "Vec<Key>")]
pub struct Curve {
    keys: Vec<Key>,
}

impl From<Vec<Key>> for Curve {
    fn from(keys: Vec<Key>) -> Self {
        Self::new(keys)
    }
}

impl From<Curve> for Vec<Key> {
    fn from(curve: Curve) -> Self {
        curve.keys
    }
}

impl Curve {
    /// Build a curve; keys are sorted by time and NaN times are dropped
    pub fn new(mut keys: Vec<Key>) -> Self {
        keys.retain(|k| !k.time.is_nan());
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    /// Straight line 0 -> 1
    pub fn linear() -> Self {
        Self::new(vec![Key::new(0.0, 0.0), Key::new(1.0, 1.0)])
    }

    /// Bell shape: 0 at both ends, peak 1 at the midpoint
    pub fn bell() -> Self {
        Self::sampled(16, |t| 4.0 * t * (1.0 - t))
    }

    /// Acceleration: slow start (hang time), fast end
    pub fn ease_in() -> Self {
        Self::sampled(16, |t| t * t)
    }

    /// Smoothstep 0 -> 1
    pub fn ease_in_out() -> Self {
        Self::sampled(16, |t| t * t * (3.0 - 2.0 * t))
    }

    /// Deformation for jumps: crouch, stretch on ascent, squash on landing, settle
    pub fn squash_stretch() -> Self {
        Self::new(vec![
            Key::new(0.0, 0.0),
            Key::new(0.1, -0.12),
            Key::new(0.3, 0.15),
            Key::new(0.7, 0.05),
            Key::new(0.9, -0.1),
            Key::new(1.0, 0.0),
        ])
    }

    /// Tabulate a function over [0, 1] with `segments` linear pieces
    pub fn sampled(segments: usize, f: impl Fn(f32) -> f32) -> Self {
        let segments = segments.max(1);
        let keys = (0..=segments)
            .map(|i| {
                let t = i as f32 / segments as f32;
                Key::new(t, f(t))
            })
            .collect();
        Self::new(keys)
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Sample the curve at `t`, holding the end values outside the key range
    pub fn evaluate(&self, t: f32) -> f32 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };
        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        // First key strictly after t; always in 1..len because of the checks above
        let upper = self.keys.partition_point(|k| k.time <= t);
        let a = self.keys[upper - 1];
        let b = self.keys[upper];
        let span = b.time - a.time;
        if span <= f32::EPSILON {
            return b.value;
        }
        lerp(a.value, b.value, (t - a.time) / span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bell_endpoints_and_peak() {
        let bell = Curve::bell();
        assert!(bell.evaluate(0.0).abs() < 1e-6);
        assert!(bell.evaluate(1.0).abs() < 1e-6);
        assert!((bell.evaluate(0.5) - 1.0).abs() < 1e-6);
        assert!(bell.evaluate(0.25) > 0.5);
    }

    #[test]
    fn test_evaluate_clamps_outside_range() {
        let curve = Curve::ease_in();
        assert_eq!(curve.evaluate(-3.0), 0.0);
        assert_eq!(curve.evaluate(4.0), 1.0);
    }

    #[test]
    fn test_linear_interpolation_between_keys() {
        let curve = Curve::new(vec![Key::new(1.0, 10.0), Key::new(0.0, 0.0)]);
        assert!((curve.evaluate(0.25) - 2.5).abs() < 1e-5);
        assert_eq!(curve.keys()[0].time, 0.0);
    }

    #[test]
    fn test_empty_curve_is_zero() {
        let curve = Curve::new(Vec::new());
        assert_eq!(curve.evaluate(0.5), 0.0);
    }

    #[test]
    fn test_ease_in_is_slow_then_fast() {
        let curve = Curve::ease_in();
        let early = curve.evaluate(0.25) - curve.evaluate(0.0);
        let late = curve.evaluate(1.0) - curve.evaluate(0.75);
        assert!(late > early);
    }

    #[test]
    fn test_curve_json_is_key_list() {
        let curve = Curve::linear();
        let json = serde_json::to_string(&curve).unwrap();
        assert!(json.starts_with('['));
        let back: Curve = serde_json::from_str(&json).unwrap();
        assert_eq!(back, curve);
    }
}
