use crate::animation::ease::Ease;
use crate::animation::value::Value;
use crate::foundation::core::TargetId;
use crate::foundation::error::{ScrollweaveError, ScrollweaveResult};

/// One animated property of a tween.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PropertyTrack {
    /// Host property name (`"opacity"`, `"y"`, `"clipPath"`...).
    pub property: String,
    /// Value at and before the tween start.
    pub from: Value,
    /// Value at and after the tween end.
    pub to: Value,
}

/// Interpolation of a set of properties on one target over `duration` seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct Tween {
    /// Animated target.
    pub target: TargetId,
    /// Animated properties.
    pub tracks: Vec<PropertyTrack>,
    /// Easing applied to normalized tween time.
    pub ease: Ease,
    /// Active duration in seconds.
    pub duration: f64,
    /// Hold time before the tween starts moving, in seconds.
    pub delay: f64,
}

impl Tween {
    /// Start a tween on `target` lasting `duration` seconds, with the default ease.
    pub fn new(target: impl Into<TargetId>, duration: f64) -> Self {
        Self {
            target: target.into(),
            tracks: Vec::new(),
            ease: Ease::default(),
            duration,
            delay: 0.0,
        }
    }

    /// Add an animated property.
    pub fn track(
        mut self,
        property: impl Into<String>,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> Self {
        self.tracks.push(PropertyTrack {
            property: property.into(),
            from: from.into(),
            to: to.into(),
        });
        self
    }

    /// Set the easing.
    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Set the start delay.
    pub fn delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    /// Delay plus duration.
    pub fn span(&self) -> f64 {
        self.delay + self.duration
    }

    /// Validate timing and track shapes.
    pub fn validate(&self) -> ScrollweaveResult<()> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(ScrollweaveError::animation(format!(
                "tween on {} has invalid duration {}",
                self.target, self.duration
            )));
        }
        if !self.delay.is_finite() || self.delay < 0.0 {
            return Err(ScrollweaveError::animation(format!(
                "tween on {} has invalid delay {}",
                self.target, self.delay
            )));
        }
        if self.tracks.is_empty() {
            return Err(ScrollweaveError::animation(format!(
                "tween on {} animates no properties",
                self.target
            )));
        }
        for t in &self.tracks {
            if t.from.kind() != t.to.kind() {
                return Err(ScrollweaveError::animation(format!(
                    "tween on {} property '{}' mixes {} and {}",
                    self.target,
                    t.property,
                    t.from.kind(),
                    t.to.kind()
                )));
            }
        }
        self.ease.validate()
    }

    /// `true` once `local` (time since the tween's position, delay included) reaches the
    /// active part of the tween.
    pub fn has_started(&self, local: f64) -> bool {
        local - self.delay >= 0.0
    }

    /// Sample one track at tween-local time `local` (delay included).
    ///
    /// Boundary values are returned as clones of `from`/`to`, never recomputed, so the
    /// endpoints are exact for every ease.
    pub fn sample(&self, track: &PropertyTrack, local: f64) -> ScrollweaveResult<Value> {
        let active = local - self.delay;
        if active.is_nan() || active < 0.0 {
            return Ok(track.from.clone());
        }
        if active >= self.duration {
            return Ok(track.to.clone());
        }
        if active == 0.0 {
            return Ok(track.from.clone());
        }
        let t = self.ease.apply(active / self.duration);
        Value::interpolate(&track.from, &track.to, t)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tween.rs"]
mod tests;
