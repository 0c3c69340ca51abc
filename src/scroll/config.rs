use crate::foundation::error::{ScrollweaveError, ScrollweaveResult};

/// Tuning of the smooth scroll engine.
///
/// Defaults reproduce the reference feel: 1.2 s responsiveness with the `1.001 − 2^(−10t)`
/// style decay and doubled touch gain.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScrollConfig {
    /// Seconds for the virtual position to (practically) catch up with the raw target.
    pub duration: f64,
    /// Decay rate `k` of the `1 − 2^(−k·t)` easing, `t` normalized by `duration`.
    pub decay: f64,
    /// Gain applied to wheel deltas.
    pub wheel_multiplier: f64,
    /// Gain applied to touch-drag deltas.
    pub touch_multiplier: f64,
    /// Weight kept from the previous velocity sample, in `[0, 1)`.
    pub velocity_smoothing: f64,
    /// Largest accepted single input delta, in pixels.
    pub max_delta: f64,
    /// Largest reported velocity magnitude, in pixels per second.
    pub max_velocity: f64,
    /// Distance below which the virtual position snaps onto the target.
    pub settle_epsilon: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            duration: 1.2,
            decay: 10.0,
            wheel_multiplier: 1.0,
            touch_multiplier: 2.0,
            velocity_smoothing: 0.2,
            max_delta: 4000.0,
            max_velocity: 20_000.0,
            settle_epsilon: 0.01,
        }
    }
}

impl ScrollConfig {
    /// Check every field is usable by the per-frame integrator.
    pub fn validate(&self) -> ScrollweaveResult<()> {
        let positive = [
            ("duration", self.duration),
            ("decay", self.decay),
            ("max_delta", self.max_delta),
            ("max_velocity", self.max_velocity),
        ];
        for (name, v) in positive {
            if !v.is_finite() || v <= 0.0 {
                return Err(ScrollweaveError::config(format!(
                    "scroll.{name} must be finite and > 0, got {v}"
                )));
            }
        }
        let non_negative = [
            ("wheel_multiplier", self.wheel_multiplier),
            ("touch_multiplier", self.touch_multiplier),
            ("settle_epsilon", self.settle_epsilon),
        ];
        for (name, v) in non_negative {
            if !v.is_finite() || v < 0.0 {
                return Err(ScrollweaveError::config(format!(
                    "scroll.{name} must be finite and >= 0, got {v}"
                )));
            }
        }
        if !(0.0..1.0).contains(&self.velocity_smoothing) {
            return Err(ScrollweaveError::config(format!(
                "scroll.velocity_smoothing must be in [0, 1), got {}",
                self.velocity_smoothing
            )));
        }
        Ok(())
    }
}
