use crate::foundation::core::{ElementId, Layout};
use crate::foundation::error::{ScrollweaveError, ScrollweaveResult};
use crate::trigger::descriptor::{Anchor, Descriptor};
use crate::trigger::registry::{
    ContainerSpace, TriggerCallbacks, TriggerHandle, TriggerId, TriggerRegistry, TriggerSpec,
    UpdateMode, span_px,
};

/// Horizontal travel of a strip of `slides` full-viewport slides: `round((K − 1) · W)`.
///
/// This single function sizes both the pin's vertical scroll budget and the strip
/// translation, so slide boundaries always land on the same scroll stops.
pub fn strip_extent(slides: usize, viewport_width: f64) -> f64 {
    if slides <= 1 || !viewport_width.is_finite() || viewport_width <= 0.0 {
        return 0.0;
    }
    ((slides - 1) as f64 * viewport_width).round()
}

/// Elements of a pinned horizontal gallery.
#[derive(Clone, Debug, PartialEq)]
pub struct HorizontalSpec {
    /// Pinned section.
    pub section: ElementId,
    /// Wide strip translated horizontally.
    pub strip: ElementId,
    /// Slides in strip order.
    pub slides: Vec<ElementId>,
}

/// Pinned section whose vertical scroll budget drives horizontal strip translation.
///
/// Nested slide triggers are registered in the strip's coordinate space: their `"left 80%"`
/// style descriptors resolve against strip-relative left edges and the viewport width, and
/// their progress follows `horizontal position`, not page scroll.
#[derive(Debug)]
pub struct HorizontalScroll {
    spec: HorizontalSpec,
    pin: TriggerHandle,
    extent: f64,
    viewport_width: f64,
    slide_triggers: Vec<TriggerHandle>,
}

impl HorizontalScroll {
    /// Register the pin trigger (`"top top"` to `"+=extent"`) and expose its strip space.
    #[tracing::instrument(skip_all, fields(section = spec.section.0, slides = spec.slides.len()))]
    pub fn mount(
        registry: &mut TriggerRegistry,
        layout: &dyn Layout,
        spec: HorizontalSpec,
    ) -> ScrollweaveResult<Self> {
        if spec.slides.is_empty() {
            return Err(ScrollweaveError::validation(
                "horizontal gallery needs at least one slide",
            ));
        }
        if layout.element_bounds(spec.strip).is_none() {
            return Err(ScrollweaveError::validation(format!(
                "horizontal strip element {} is missing",
                spec.strip.0
            )));
        }
        let viewport_width = layout.viewport().width;
        let extent = strip_extent(spec.slides.len(), viewport_width);

        let pin = registry.register(
            TriggerSpec::new(spec.section, pin_start(), span_px(extent))
                .pinned()
                .update_mode(UpdateMode::Always),
            layout,
        );
        if let Some(id) = pin.id() {
            registry.set_container_space(
                id,
                ContainerSpace {
                    strip: spec.strip,
                    extent,
                },
            );
        }
        tracing::debug!(extent, "horizontal gallery mounted");
        Ok(Self {
            spec,
            pin,
            extent,
            viewport_width,
            slide_triggers: Vec::new(),
        })
    }

    /// Pin trigger id, `None` if the section was missing.
    pub fn pin_id(&self) -> Option<TriggerId> {
        self.pin.id()
    }

    /// Strip element receiving the translation.
    pub fn strip(&self) -> ElementId {
        self.spec.strip
    }

    /// Number of slides.
    pub fn slide_count(&self) -> usize {
        self.spec.slides.len()
    }

    /// Horizontal travel in pixels.
    pub fn extent(&self) -> f64 {
        self.extent
    }

    /// Pin progress, mirrored 1:1 by the side progress indicator.
    pub fn indicator_progress(&self, registry: &TriggerRegistry) -> f64 {
        self.pin
            .id()
            .and_then(|id| registry.progress(id))
            .unwrap_or(0.0)
    }

    /// Horizontal position `progress × extent`.
    pub fn position(&self, registry: &TriggerRegistry) -> f64 {
        self.indicator_progress(registry) * self.extent
    }

    /// Strip translation to apply (`-position`).
    pub fn translate_x(&self, registry: &TriggerRegistry) -> f64 {
        -self.position(registry)
    }

    /// Index of the slide nearest the viewport (indicator dots).
    pub fn active_slide(&self, registry: &TriggerRegistry) -> usize {
        if self.viewport_width <= 0.0 {
            return 0;
        }
        let idx = (self.position(registry) / self.viewport_width).round();
        (idx.max(0.0) as usize).min(self.slide_count() - 1)
    }

    /// Register a trigger on `slide` resolved in strip space.
    pub fn add_slide_trigger(
        &mut self,
        registry: &mut TriggerRegistry,
        layout: &dyn Layout,
        slide: ElementId,
        start: Descriptor,
        end: Descriptor,
        callbacks: TriggerCallbacks,
    ) -> TriggerHandle {
        let Some(pin) = self.pin.id() else {
            tracing::debug!(slide = slide.0, "gallery has no pin, slide trigger skipped");
            return TriggerHandle::inert();
        };
        let handle = registry.register(
            TriggerSpec::new(slide, start, end)
                .in_container(pin)
                .callbacks(callbacks),
            layout,
        );
        self.slide_triggers.push(handle.clone());
        handle
    }

    /// Recompute the extent for the current viewport and re-resolve every trigger.
    pub fn refresh(&mut self, registry: &mut TriggerRegistry, layout: &dyn Layout) {
        self.viewport_width = layout.viewport().width;
        self.extent = strip_extent(self.spec.slides.len(), self.viewport_width);
        if let Some(id) = self.pin.id() {
            registry.set_range(id, pin_start(), span_px(self.extent));
            registry.set_container_space(
                id,
                ContainerSpace {
                    strip: self.spec.strip,
                    extent: self.extent,
                },
            );
        }
        registry.refresh(layout);
    }

    /// Dispose the pin and every slide trigger. Idempotent.
    pub fn dispose(&mut self) {
        for t in self.slide_triggers.drain(..) {
            t.dispose();
        }
        self.pin.dispose();
    }
}

fn pin_start() -> Descriptor {
    Descriptor::anchored(Anchor::Start, Anchor::Start)
}

#[cfg(test)]
#[path = "../../tests/unit/horizontal/mod.rs"]
mod tests;
