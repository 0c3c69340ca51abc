use std::f64::consts::{FRAC_PI_2, TAU};
use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{ScrollweaveError, ScrollweaveResult};

/// Which end of the curve the easing acts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EaseDir {
    /// Slow start.
    In,
    /// Slow end.
    Out,
    /// Slow start and end.
    InOut,
}

impl EaseDir {
    fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
            Self::InOut => "inOut",
        }
    }
}

/// Easing functions used to map normalized animation progress.
///
/// String forms follow the common web naming (`"expo.out"`, `"back.out(1.7)"`,
/// `"elastic.out(1, 0.5)"`, `"power2.inOut"`, `"none"`), which is also the serde form.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Ease {
    /// Identity.
    Linear,
    /// Polynomial ease; `power` 1..=4 maps to exponents 2..=5 (quad..quint).
    Power {
        /// Power level (1 = quad, 4 = quint).
        power: u8,
        /// Curve direction.
        dir: EaseDir,
    },
    /// Sinusoidal ease.
    Sine(EaseDir),
    /// Exponential ease.
    Expo(EaseDir),
    /// Circular ease.
    Circ(EaseDir),
    /// Overshooting ease.
    Back {
        /// Overshoot amount (1.70158 by default).
        overshoot: f64,
        /// Curve direction.
        dir: EaseDir,
    },
    /// Spring-like oscillating ease.
    Elastic {
        /// Oscillation amplitude, at least 1.
        amplitude: f64,
        /// Oscillation period in normalized time.
        period: f64,
        /// Curve direction.
        dir: EaseDir,
    },
    /// Exponential approach `min(1, 1 - 2^(-k t))`, the smooth-scroll curve.
    ExpoDecay {
        /// Decay rate.
        k: f64,
    },
}

impl Default for Ease {
    fn default() -> Self {
        Self::Power {
            power: 1,
            dir: EaseDir::Out,
        }
    }
}

const DEFAULT_OVERSHOOT: f64 = 1.70158;

impl Ease {
    /// Apply this easing function to normalized progress `t`.
    ///
    /// `t` is clamped into `[0, 1]` and the endpoints are exact for every variant.
    pub fn apply(self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        if t == 0.0 {
            return 0.0;
        }
        if t == 1.0 {
            return 1.0;
        }
        match self {
            Self::Linear => t,
            Self::Power { power, dir } => {
                let e = i32::from(power.clamp(1, 4)) + 1;
                directed(dir, t, |x| x.powi(e))
            }
            Self::Sine(dir) => directed(dir, t, |x| 1.0 - (x * FRAC_PI_2).cos()),
            Self::Expo(dir) => directed(dir, t, |x| (10.0 * x - 10.0).exp2()),
            Self::Circ(dir) => directed(dir, t, |x| 1.0 - (1.0 - x * x).max(0.0).sqrt()),
            Self::Back { overshoot, dir } => {
                let s = overshoot;
                directed(dir, t, |x| (s + 1.0) * x * x * x - s * x * x)
            }
            Self::Elastic {
                amplitude,
                period,
                dir,
            } => {
                let a = amplitude.max(1.0);
                let p = if period > 0.0 { period } else { 0.3 };
                let shift = p / TAU * (1.0 / a).asin();
                let ease_out = |x: f64| a * (-10.0 * x).exp2() * ((x - shift) * TAU / p).sin() + 1.0;
                match dir {
                    EaseDir::Out => ease_out(t),
                    EaseDir::In => 1.0 - ease_out(1.0 - t),
                    EaseDir::InOut => {
                        if t < 0.5 {
                            (1.0 - ease_out(1.0 - 2.0 * t)) / 2.0
                        } else {
                            0.5 + ease_out(2.0 * t - 1.0) / 2.0
                        }
                    }
                }
            }
            Self::ExpoDecay { k } => (1.0 - (-k * t).exp2()).min(1.0),
        }
    }

    /// Parse `name`, falling back to the default ease (`power1.out`) with a warning.
    pub fn parse_or_default(name: &str) -> Self {
        match name.parse() {
            Ok(ease) => ease,
            Err(err) => {
                tracing::warn!(name, %err, "unknown easing, using power1.out");
                Self::default()
            }
        }
    }

    /// Validate numeric parameters.
    pub fn validate(self) -> ScrollweaveResult<()> {
        let ok = match self {
            Self::Back { overshoot, .. } => overshoot.is_finite(),
            Self::Elastic {
                amplitude, period, ..
            } => amplitude.is_finite() && period.is_finite() && period > 0.0,
            Self::ExpoDecay { k } => k.is_finite() && k > 0.0,
            _ => true,
        };
        if ok {
            Ok(())
        } else {
            Err(ScrollweaveError::animation(format!(
                "ease '{self}' has invalid parameters"
            )))
        }
    }
}

/// Derive out/inOut variants from an ease-in curve.
fn directed(dir: EaseDir, t: f64, ease_in: impl Fn(f64) -> f64) -> f64 {
    match dir {
        EaseDir::In => ease_in(t),
        EaseDir::Out => 1.0 - ease_in(1.0 - t),
        EaseDir::InOut => {
            if t < 0.5 {
                ease_in(2.0 * t) / 2.0
            } else {
                1.0 - ease_in(2.0 - 2.0 * t) / 2.0
            }
        }
    }
}

impl fmt::Display for Ease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Linear => f.write_str("none"),
            Self::Power { power, dir } => write!(f, "power{power}.{}", dir.as_str()),
            Self::Sine(dir) => write!(f, "sine.{}", dir.as_str()),
            Self::Expo(dir) => write!(f, "expo.{}", dir.as_str()),
            Self::Circ(dir) => write!(f, "circ.{}", dir.as_str()),
            Self::Back { overshoot, dir } => write!(f, "back.{}({overshoot})", dir.as_str()),
            Self::Elastic {
                amplitude,
                period,
                dir,
            } => write!(f, "elastic.{}({amplitude}, {period})", dir.as_str()),
            Self::ExpoDecay { k } => write!(f, "decay({k})"),
        }
    }
}

impl FromStr for Ease {
    type Err = ScrollweaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (head, args) = match s.find('(') {
            Some(open) => {
                let close = s.rfind(')').filter(|&c| c > open).ok_or_else(|| {
                    ScrollweaveError::animation(format!("unbalanced parentheses in ease '{s}'"))
                })?;
                let args = s[open + 1..close]
                    .split(',')
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(|a| {
                        a.parse::<f64>().map_err(|_| {
                            ScrollweaveError::animation(format!("bad ease argument '{a}' in '{s}'"))
                        })
                    })
                    .collect::<ScrollweaveResult<Vec<f64>>>()?;
                (&s[..open], args)
            }
            None => (s, Vec::new()),
        };

        let (family, dir) = match head.split_once('.') {
            Some((family, dir)) => (family, parse_dir(dir, s)?),
            None => (head, EaseDir::Out),
        };
        let family = family.to_ascii_lowercase();

        let power = |power: u8| Ease::Power { power, dir };
        let ease = match family.as_str() {
            "none" | "linear" | "power0" => Ease::Linear,
            "power1" | "quad" => power(1),
            "power2" | "cubic" => power(2),
            "power3" | "quart" => power(3),
            "power4" | "quint" | "strong" => power(4),
            "sine" => Ease::Sine(dir),
            "expo" => Ease::Expo(dir),
            "circ" => Ease::Circ(dir),
            "back" => Ease::Back {
                overshoot: args.first().copied().unwrap_or(DEFAULT_OVERSHOOT),
                dir,
            },
            "elastic" => Ease::Elastic {
                amplitude: args.first().copied().unwrap_or(1.0),
                period: args.get(1).copied().unwrap_or(0.3),
                dir,
            },
            "decay" => Ease::ExpoDecay {
                k: args.first().copied().unwrap_or(10.0),
            },
            _ => {
                return Err(ScrollweaveError::animation(format!("unknown ease '{s}'")));
            }
        };
        ease.validate()?;
        Ok(ease)
    }
}

fn parse_dir(dir: &str, whole: &str) -> ScrollweaveResult<EaseDir> {
    match dir.to_ascii_lowercase().as_str() {
        "in" | "easein" => Ok(EaseDir::In),
        "out" | "easeout" => Ok(EaseDir::Out),
        "inout" | "easeinout" => Ok(EaseDir::InOut),
        _ => Err(ScrollweaveError::animation(format!(
            "unknown ease direction '{dir}' in '{whole}'"
        ))),
    }
}

impl serde::Serialize for Ease {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Ease {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
