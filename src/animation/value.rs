use std::fmt;
use std::str::FromStr;

use crate::foundation::core::{Rgba, Vec2};
use crate::foundation::error::{ScrollweaveError, ScrollweaveResult};
use crate::foundation::math::lerp;

/// Interpolation contract for animation value types.
pub trait Lerp: Sized {
    /// Interpolate from `a` to `b` with normalized factor `t` (may leave `[0, 1]` for
    /// overshooting eases).
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        lerp(*a, *b, t)
    }
}

impl Lerp for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Vec2::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t))
    }
}

impl Lerp for Rgba {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Rgba::new(
            lerp(a.r, b.r, t),
            lerp(a.g, b.g, t),
            lerp(a.b, b.b, t),
            lerp(a.a, b.a, t),
        )
    }
}

/// Clip-path shapes used by reveal animations. All lengths are percentages.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClipShape {
    /// `inset(top right bottom left)`.
    Inset {
        /// Top inset.
        top: f64,
        /// Right inset.
        right: f64,
        /// Bottom inset.
        bottom: f64,
        /// Left inset.
        left: f64,
    },
    /// `circle(radius at cx cy)`.
    Circle {
        /// Radius.
        radius: f64,
        /// Center x.
        cx: f64,
        /// Center y.
        cy: f64,
    },
}

impl ClipShape {
    fn lerp(a: &Self, b: &Self, t: f64) -> ScrollweaveResult<Self> {
        match (a, b) {
            (
                Self::Inset {
                    top: t0,
                    right: r0,
                    bottom: b0,
                    left: l0,
                },
                Self::Inset {
                    top: t1,
                    right: r1,
                    bottom: b1,
                    left: l1,
                },
            ) => Ok(Self::Inset {
                top: lerp(*t0, *t1, t),
                right: lerp(*r0, *r1, t),
                bottom: lerp(*b0, *b1, t),
                left: lerp(*l0, *l1, t),
            }),
            (
                Self::Circle {
                    radius: r0,
                    cx: x0,
                    cy: y0,
                },
                Self::Circle {
                    radius: r1,
                    cx: x1,
                    cy: y1,
                },
            ) => Ok(Self::Circle {
                radius: lerp(*r0, *r1, t),
                cx: lerp(*x0, *x1, t),
                cy: lerp(*y0, *y1, t),
            }),
            _ => Err(ScrollweaveError::evaluation(
                "cannot interpolate between inset() and circle() clip paths",
            )),
        }
    }
}

fn parse_percent(token: &str) -> ScrollweaveResult<f64> {
    let t = token.trim();
    let num = t.strip_suffix('%').unwrap_or(t);
    num.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ScrollweaveError::animation(format!("bad clip-path length '{token}'")))
}

impl FromStr for ClipShape {
    type Err = ScrollweaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let inner = |prefix: &str| {
            s.strip_prefix(prefix)
                .and_then(|rest| rest.strip_suffix(')'))
                .map(str::trim)
        };

        if let Some(body) = inner("inset(") {
            let v = body
                .split_whitespace()
                .map(parse_percent)
                .collect::<ScrollweaveResult<Vec<f64>>>()?;
            // CSS box shorthand: 1..=4 values.
            let (top, right, bottom, left) = match v.as_slice() {
                [a] => (*a, *a, *a, *a),
                [a, b] => (*a, *b, *a, *b),
                [a, b, c] => (*a, *b, *c, *b),
                [a, b, c, d] => (*a, *b, *c, *d),
                _ => {
                    return Err(ScrollweaveError::animation(format!(
                        "inset() takes 1 to 4 lengths, got '{s}'"
                    )));
                }
            };
            return Ok(Self::Inset {
                top,
                right,
                bottom,
                left,
            });
        }

        if let Some(body) = inner("circle(") {
            let (radius, center) = match body.split_once(" at ") {
                Some((r, c)) => (r, Some(c)),
                None => (body, None),
            };
            let radius = parse_percent(radius)?;
            let (cx, cy) = match center {
                None => (50.0, 50.0),
                Some(c) => {
                    let mut it = c.split_whitespace();
                    match (it.next(), it.next(), it.next()) {
                        (Some(x), Some(y), None) => (parse_percent(x)?, parse_percent(y)?),
                        _ => {
                            return Err(ScrollweaveError::animation(format!(
                                "circle() center must be two lengths, got '{s}'"
                            )));
                        }
                    }
                }
            };
            return Ok(Self::Circle { radius, cx, cy });
        }

        Err(ScrollweaveError::animation(format!(
            "unsupported clip-path '{s}'"
        )))
    }
}

impl fmt::Display for ClipShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Inset {
                top,
                right,
                bottom,
                left,
            } => write!(
                f,
                "inset({}% {}% {}% {}%)",
                fmt_num(top),
                fmt_num(right),
                fmt_num(bottom),
                fmt_num(left)
            ),
            Self::Circle { radius, cx, cy } => write!(
                f,
                "circle({}% at {}% {}%)",
                fmt_num(radius),
                fmt_num(cx),
                fmt_num(cy)
            ),
        }
    }
}

/// A string with embedded numbers, e.g. `"blur(20px)"` or `"0 0 40px rgba(0,0,0,0.2)"`.
///
/// Two strings interpolate when their non-numeric skeletons match.
#[derive(Clone, Debug, PartialEq)]
pub struct InterpString {
    /// Literal pieces; always `numbers.len() + 1` entries.
    skeleton: Vec<String>,
    numbers: Vec<f64>,
}

impl InterpString {
    /// Split `s` into skeleton and numbers.
    pub fn parse(s: &str) -> Self {
        let bytes = s.as_bytes();
        let mut skeleton = Vec::new();
        let mut numbers = Vec::new();
        let mut literal_start = 0;
        let mut i = 0;

        while i < bytes.len() {
            let c = bytes[i];
            let prev_is_word = i > 0 && (bytes[i - 1].is_ascii_alphanumeric() || bytes[i - 1] == b'_');
            let starts_number = !prev_is_word
                && (c.is_ascii_digit()
                    || (c == b'.' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit))
                    || (c == b'-'
                        && bytes
                            .get(i + 1)
                            .is_some_and(|n| n.is_ascii_digit() || *n == b'.')));
            if !starts_number {
                i += 1;
                continue;
            }

            let start = i;
            if bytes[i] == b'-' {
                i += 1;
            }
            let mut seen_dot = false;
            while i < bytes.len() {
                match bytes[i] {
                    b'0'..=b'9' => i += 1,
                    b'.' if !seen_dot => {
                        seen_dot = true;
                        i += 1;
                    }
                    _ => break,
                }
            }
            match s[start..i].parse::<f64>() {
                Ok(v) => {
                    skeleton.push(s[literal_start..start].to_owned());
                    numbers.push(v);
                    literal_start = i;
                }
                Err(_) => continue,
            }
        }
        skeleton.push(s[literal_start..].to_owned());
        Self { skeleton, numbers }
    }

    /// Embedded numbers in order.
    pub fn numbers(&self) -> &[f64] {
        &self.numbers
    }

    fn lerp(a: &Self, b: &Self, t: f64) -> ScrollweaveResult<Self> {
        if a.skeleton != b.skeleton || a.numbers.len() != b.numbers.len() {
            return Err(ScrollweaveError::evaluation(format!(
                "cannot interpolate '{a}' to '{b}': shapes differ"
            )));
        }
        Ok(Self {
            skeleton: a.skeleton.clone(),
            numbers: a
                .numbers
                .iter()
                .zip(&b.numbers)
                .map(|(x, y)| lerp(*x, *y, t))
                .collect(),
        })
    }
}

impl fmt::Display for InterpString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, lit) in self.skeleton.iter().enumerate() {
            f.write_str(lit)?;
            if let Some(n) = self.numbers.get(i) {
                f.write_str(&fmt_num(*n))?;
            }
        }
        Ok(())
    }
}

/// Format with at most four decimals and no trailing zeros.
pub(crate) fn fmt_num(v: f64) -> String {
    let s = format!("{v:.4}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_owned() } else { s.to_owned() }
}

/// A typed animatable property value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Plain number (opacity, px offset, degrees, scale).
    Scalar(f64),
    /// 2D vector (translation pair).
    Vec2(Vec2),
    /// Color.
    Color(Rgba),
    /// Clip-path shape.
    ClipPath(ClipShape),
    /// Interpolatable string.
    Text(InterpString),
}

impl Value {
    /// Short name of the value kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Vec2(_) => "vec2",
            Self::Color(_) => "color",
            Self::ClipPath(_) => "clip-path",
            Self::Text(_) => "text",
        }
    }

    /// Interpolate between two values of the same kind.
    pub fn interpolate(from: &Value, to: &Value, t: f64) -> ScrollweaveResult<Value> {
        match (from, to) {
            (Self::Scalar(a), Self::Scalar(b)) => Ok(Self::Scalar(<f64 as Lerp>::lerp(a, b, t))),
            (Self::Vec2(a), Self::Vec2(b)) => Ok(Self::Vec2(<Vec2 as Lerp>::lerp(a, b, t))),
            (Self::Color(a), Self::Color(b)) => Ok(Self::Color(<Rgba as Lerp>::lerp(a, b, t))),
            (Self::ClipPath(a), Self::ClipPath(b)) => ClipShape::lerp(a, b, t).map(Self::ClipPath),
            (Self::Text(a), Self::Text(b)) => InterpString::lerp(a, b, t).map(Self::Text),
            _ => Err(ScrollweaveError::evaluation(format!(
                "cannot interpolate {} to {}",
                from.kind(),
                to.kind()
            ))),
        }
    }

    /// Scalar payload, if any.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Scalar(v)
    }
}

impl From<Vec2> for Value {
    fn from(v: Vec2) -> Self {
        Self::Vec2(v)
    }
}

impl From<Rgba> for Value {
    fn from(v: Rgba) -> Self {
        Self::Color(v)
    }
}

impl From<ClipShape> for Value {
    fn from(v: ClipShape) -> Self {
        Self::ClipPath(v)
    }
}

fn parse_color(s: &str) -> Option<Rgba> {
    if let Some(hex) = s.strip_prefix('#') {
        let expand = |c: u8| -> Option<f64> {
            let v = (c as char).to_digit(16)?;
            Some(f64::from(v * 17))
        };
        let b = hex.as_bytes();
        return match b.len() {
            3 => Some(Rgba::new(expand(b[0])?, expand(b[1])?, expand(b[2])?, 1.0)),
            6 => {
                let nibble = |c: u8| (c as char).to_digit(16);
                let channel = |i: usize| Some(f64::from(nibble(b[i])? * 16 + nibble(b[i + 1])?));
                Some(Rgba::new(channel(0)?, channel(2)?, channel(4)?, 1.0))
            }
            _ => None,
        };
    }

    let body = s
        .strip_prefix("rgba(")
        .or_else(|| s.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    let parts = body
        .split(',')
        .map(|p| p.trim().parse::<f64>().ok())
        .collect::<Option<Vec<f64>>>()?;
    match parts.as_slice() {
        [r, g, b] => Some(Rgba::new(*r, *g, *b, 1.0)),
        [r, g, b, a] => Some(Rgba::new(*r, *g, *b, *a)),
        _ => None,
    }
}

impl FromStr for Value {
    type Err = ScrollweaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(v) = s.parse::<f64>() {
            if !v.is_finite() {
                return Err(ScrollweaveError::animation(format!(
                    "non-finite value '{s}'"
                )));
            }
            return Ok(Self::Scalar(v));
        }
        if let Some(c) = parse_color(s) {
            return Ok(Self::Color(c));
        }
        if s.starts_with("inset(") || s.starts_with("circle(") {
            return s.parse::<ClipShape>().map(Self::ClipPath);
        }
        Ok(Self::Text(InterpString::parse(s)))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(v) => f.write_str(&fmt_num(*v)),
            Self::Vec2(v) => write!(f, "{} {}", fmt_num(v.x), fmt_num(v.y)),
            Self::Color(c) => write!(
                f,
                "rgba({}, {}, {}, {})",
                fmt_num(c.r.round()),
                fmt_num(c.g.round()),
                fmt_num(c.b.round()),
                fmt_num(c.a)
            ),
            Self::ClipPath(c) => c.fmt(f),
            Self::Text(t) => t.fmt(f),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
enum ValueRepr {
    Number(f64),
    Pair([f64; 2]),
    Text(String),
}

impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let repr = match self {
            Self::Scalar(v) => ValueRepr::Number(*v),
            Self::Vec2(v) => ValueRepr::Pair([v.x, v.y]),
            other => ValueRepr::Text(other.to_string()),
        };
        repr.serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for Value {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match ValueRepr::deserialize(deserializer)? {
            ValueRepr::Number(v) => Ok(Self::Scalar(v)),
            ValueRepr::Pair([x, y]) => Ok(Self::Vec2(Vec2::new(x, y))),
            ValueRepr::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/value.rs"]
mod tests;
