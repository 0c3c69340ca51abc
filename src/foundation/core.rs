use std::collections::BTreeMap;
use std::fmt;

use crate::foundation::error::{ScrollweaveError, ScrollweaveResult};

pub use kurbo::{Point, Rect, Vec2};

/// Identity of a host document element.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ElementId(pub u32);

/// Animation target: a whole element, or one pre-split text unit of it.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TargetId {
    /// Owning element.
    pub element: ElementId,
    /// Index into the element's prepared unit list, `None` for the element itself.
    pub part: Option<u32>,
}

impl TargetId {
    /// Target the element itself.
    pub fn element(element: ElementId) -> Self {
        Self {
            element,
            part: None,
        }
    }

    /// Target unit `index` of `element`.
    pub fn part(element: ElementId, index: u32) -> Self {
        Self {
            element,
            part: Some(index),
        }
    }
}

impl From<ElementId> for TargetId {
    fn from(element: ElementId) -> Self {
        Self::element(element)
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.part {
            None => write!(f, "#{}", self.element.0),
            Some(p) => write!(f, "#{}.{}", self.element.0, p),
        }
    }
}

/// Scroll axis. Only vertical page scrolling is driven by input; horizontal space exists
/// inside pinned galleries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Axis {
    /// Page (document) axis.
    Vertical,
    /// Gallery strip axis.
    Horizontal,
}

/// Visible viewport size in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Viewport {
    /// Create a validated viewport (finite, strictly positive).
    pub fn new(width: f64, height: f64) -> ScrollweaveResult<Self> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(ScrollweaveError::validation(format!(
                "viewport must be finite and positive, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Viewport length along `axis`.
    pub fn extent(self, axis: Axis) -> f64 {
        match axis {
            Axis::Vertical => self.height,
            Axis::Horizontal => self.width,
        }
    }
}

/// Direction of travel of the virtual scroll position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ScrollDirection {
    /// Increasing scroll coordinate (down the page).
    #[default]
    Forward,
    /// Decreasing scroll coordinate.
    Backward,
}

impl ScrollDirection {
    /// Direction implied by `delta`; a zero delta keeps `previous`.
    pub fn from_delta(delta: f64, previous: Self) -> Self {
        if delta > 0.0 {
            Self::Forward
        } else if delta < 0.0 {
            Self::Backward
        } else {
            previous
        }
    }
}

/// Primary pointer precision as reported by the host (`(pointer: coarse)` media query).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PointerKind {
    /// Mouse / trackpad.
    Fine,
    /// Touch.
    Coarse,
}

/// Straight-alpha color. Channels are `0..=255`, alpha is `0..=1`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rgba {
    /// Red.
    pub r: f64,
    /// Green.
    pub g: f64,
    /// Blue.
    pub b: f64,
    /// Alpha.
    pub a: f64,
}

impl Rgba {
    /// Build a color, clamping channels into range.
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self {
            r: r.clamp(0.0, 255.0),
            g: g.clamp(0.0, 255.0),
            b: b.clamp(0.0, 255.0),
            a: a.clamp(0.0, 1.0),
        }
    }

    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

/// Read-only geometry queries against the host document.
///
/// Bounds are in document space (scroll offset already removed), so they do not change while
/// scrolling, only on resize or content reflow.
pub trait Layout {
    /// Current viewport size.
    fn viewport(&self) -> Viewport;

    /// Document-space bounds of `id`, or `None` when the element is absent.
    fn element_bounds(&self, id: ElementId) -> Option<Rect>;

    /// Total natural document height, before pin spacing.
    fn document_height(&self) -> f64;
}

/// In-memory [`Layout`] used for headless replays and tests.
#[derive(Clone, Debug)]
pub struct StaticLayout {
    viewport: Viewport,
    elements: BTreeMap<ElementId, Rect>,
    document_height: Option<f64>,
}

impl StaticLayout {
    /// Empty document with the given viewport.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            elements: BTreeMap::new(),
            document_height: None,
        }
    }

    /// Insert or move an element.
    pub fn insert(&mut self, id: ElementId, bounds: Rect) -> &mut Self {
        self.elements.insert(id, bounds);
        self
    }

    /// Remove an element (unmounted content).
    pub fn remove(&mut self, id: ElementId) -> Option<Rect> {
        self.elements.remove(&id)
    }

    /// Replace the viewport (resize).
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Pin the document height instead of deriving it from element bounds.
    pub fn set_document_height(&mut self, height: f64) {
        self.document_height = Some(height);
    }
}

impl Layout for StaticLayout {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn element_bounds(&self, id: ElementId) -> Option<Rect> {
        self.elements.get(&id).copied()
    }

    fn document_height(&self) -> f64 {
        self.document_height.unwrap_or_else(|| {
            self.elements
                .values()
                .map(|r| r.y1)
                .fold(self.viewport.height, f64::max)
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
