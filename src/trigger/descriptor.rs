use std::fmt;
use std::str::FromStr;

use crate::animation::value::fmt_num;
use crate::foundation::error::{ScrollweaveError, ScrollweaveResult};

/// A length along one axis: pixels, or a percentage of some reference length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Length {
    /// Absolute pixels.
    Px(f64),
    /// Percent (0–100) of the reference length.
    Percent(f64),
}

impl Length {
    /// Resolve against `reference`.
    pub fn resolve(self, reference: f64) -> f64 {
        match self {
            Self::Px(px) => px,
            Self::Percent(p) => p / 100.0 * reference,
        }
    }

    fn parse(s: &str) -> ScrollweaveResult<Self> {
        let (num, percent) = match s.strip_suffix('%') {
            Some(n) => (n, true),
            None => (s.strip_suffix("px").unwrap_or(s), false),
        };
        let v: f64 = num
            .trim()
            .parse()
            .map_err(|_| ScrollweaveError::descriptor(format!("invalid length '{s}'")))?;
        if !v.is_finite() {
            return Err(ScrollweaveError::descriptor(format!("invalid length '{s}'")));
        }
        Ok(if percent { Self::Percent(v) } else { Self::Px(v) })
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(px) => write!(f, "{}", fmt_num(*px)),
            Self::Percent(p) => write!(f, "{}%", fmt_num(*p)),
        }
    }
}

/// Point along an element or the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Anchor {
    /// `top` / `left`.
    Start,
    /// `center`.
    Center,
    /// `bottom` / `right`.
    End,
    /// Explicit offset from the start edge.
    At(Length),
}

impl Anchor {
    /// Offset from the start edge of a span of `length`.
    pub fn resolve(self, length: f64) -> f64 {
        match self {
            Self::Start => 0.0,
            Self::Center => length / 2.0,
            Self::End => length,
            Self::At(l) => l.resolve(length),
        }
    }
}

impl FromStr for Anchor {
    type Err = ScrollweaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" | "left" => Ok(Self::Start),
            "center" => Ok(Self::Center),
            "bottom" | "right" => Ok(Self::End),
            other => Length::parse(other).map(Self::At),
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("top"),
            Self::Center => f.write_str("center"),
            Self::End => f.write_str("bottom"),
            Self::At(l) => write!(f, "{l}"),
        }
    }
}

/// Geometry a descriptor resolves against, all along the trigger's axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
    /// Coordinate of the element's start edge.
    pub element_start: f64,
    /// Element length.
    pub element_length: f64,
    /// Viewport length.
    pub viewport_length: f64,
}

/// Trigger range endpoint.
///
/// Forms: `"<element> <viewport>"` (`"top 70%"`, `"bottom top"`, `"top -100"`), `"+=<len>"`
/// relative to the resolved start (`"+=100%"` of the viewport, `"+=400"`), and a bare
/// number for an absolute scroll coordinate (`"99999"`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Descriptor {
    /// Element anchor meets viewport anchor.
    Anchored {
        /// Point on the element.
        element: Anchor,
        /// Point on the viewport.
        viewport: Anchor,
    },
    /// Distance past the resolved start; only meaningful as an end descriptor.
    Relative(Length),
    /// Absolute scroll coordinate.
    Absolute(f64),
}

impl Descriptor {
    /// `element` anchor meets `viewport` anchor.
    pub fn anchored(element: Anchor, viewport: Anchor) -> Self {
        Self::Anchored { element, viewport }
    }

    /// `true` for descriptors that do not depend on element geometry.
    pub fn is_absolute(&self) -> bool {
        matches!(self, Self::Absolute(_))
    }

    /// Resolve to a scroll coordinate. `start` is the already-resolved start and is required
    /// by [`Descriptor::Relative`].
    pub fn resolve(&self, span: Span, start: Option<f64>) -> ScrollweaveResult<f64> {
        match *self {
            Self::Anchored { element, viewport } => Ok(span.element_start
                + element.resolve(span.element_length)
                - viewport.resolve(span.viewport_length)),
            Self::Relative(len) => match start {
                Some(s) => Ok(s + len.resolve(span.viewport_length)),
                None => Err(ScrollweaveError::descriptor(
                    "relative descriptor '+=' is only valid as an end",
                )),
            },
            Self::Absolute(v) => Ok(v),
        }
    }
}

impl FromStr for Descriptor {
    type Err = ScrollweaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ScrollweaveError::descriptor("empty range descriptor"));
        }
        if let Some(rest) = s.strip_prefix("+=") {
            return Length::parse(rest.trim()).map(Self::Relative);
        }
        if let Ok(v) = s.parse::<f64>() {
            if v.is_finite() {
                return Ok(Self::Absolute(v));
            }
        }
        let mut parts = s.split_whitespace();
        let element = parts
            .next()
            .ok_or_else(|| ScrollweaveError::descriptor(format!("invalid descriptor '{s}'")))?
            .parse::<Anchor>()?;
        let viewport = match parts.next() {
            Some(v) => v.parse::<Anchor>()?,
            None => Anchor::Start,
        };
        if parts.next().is_some() {
            return Err(ScrollweaveError::descriptor(format!(
                "descriptor '{s}' has trailing tokens"
            )));
        }
        Ok(Self::Anchored { element, viewport })
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anchored { element, viewport } => write!(f, "{element} {viewport}"),
            Self::Relative(l) => write!(f, "+={l}"),
            Self::Absolute(v) => write!(f, "{}", fmt_num(*v)),
        }
    }
}

impl serde::Serialize for Descriptor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Descriptor {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Text(String),
        }
        match Repr::deserialize(deserializer)? {
            Repr::Number(v) => Ok(Self::Absolute(v)),
            Repr::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/trigger/descriptor.rs"]
mod tests;
