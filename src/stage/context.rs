use crate::foundation::core::{ElementId, Layout, TargetId};
use crate::foundation::error::ScrollweaveResult;
use crate::horizontal::{HorizontalScroll, HorizontalSpec};
use crate::timeline::compose::Timeline;
use crate::timeline::def::SectionDef;
use crate::timeline::sink::{PropertyFailure, PropertySink};
use crate::trigger::registry::{
    TriggerEvent, TriggerHandle, TriggerId, TriggerRegistry, TriggerSpec,
};

#[derive(Debug)]
struct MountedStrip {
    scroll: HorizontalScroll,
    written: Option<f64>,
}

/// Pinned element held in place by a `"y"` counter-transform of `pin_offset`.
#[derive(Debug)]
struct MountedPin {
    trigger: TriggerId,
    target: ElementId,
    written: Option<f64>,
}

/// Triggers, timelines and horizontal galleries of one mounted section, reverted as a unit.
///
/// Reverting disposes every trigger and kills every timeline. It is idempotent and also runs
/// on drop, so a section can never leak listeners past its lifetime.
#[derive(Debug)]
pub struct AnimationContext {
    name: String,
    triggers: Vec<TriggerHandle>,
    timelines: Vec<Timeline>,
    strips: Vec<MountedStrip>,
    pins: Vec<MountedPin>,
    reverted: bool,
}

impl AnimationContext {
    /// Empty context.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            triggers: Vec::new(),
            timelines: Vec::new(),
            strips: Vec::new(),
            pins: Vec::new(),
            reverted: false,
        }
    }

    /// Name used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `true` once reverted.
    pub fn is_reverted(&self) -> bool {
        self.reverted
    }

    /// Register a trigger owned by this context.
    pub fn add_trigger(
        &mut self,
        registry: &mut TriggerRegistry,
        layout: &dyn Layout,
        spec: TriggerSpec,
    ) -> TriggerHandle {
        let pinned = spec.target.filter(|_| spec.pin && spec.container.is_none());
        let handle = registry.register(spec, layout);
        if let (Some(target), Some(trigger)) = (pinned, handle.id()) {
            self.pins.push(MountedPin {
                trigger,
                target,
                written: None,
            });
        }
        self.triggers.push(handle.clone());
        handle
    }

    /// Take ownership of a timeline. Returns its index.
    pub fn add_timeline(&mut self, timeline: Timeline) -> usize {
        self.timelines.push(timeline);
        self.timelines.len() - 1
    }

    /// Mount a pinned horizontal gallery owned by this context. Returns its index.
    pub fn add_horizontal(
        &mut self,
        registry: &mut TriggerRegistry,
        layout: &dyn Layout,
        spec: HorizontalSpec,
    ) -> ScrollweaveResult<usize> {
        let section = spec.section;
        let scroll = HorizontalScroll::mount(registry, layout, spec)?;
        if let Some(trigger) = scroll.pin_id() {
            self.pins.push(MountedPin {
                trigger,
                target: section,
                written: None,
            });
        }
        self.strips.push(MountedStrip {
            scroll,
            written: None,
        });
        Ok(self.strips.len() - 1)
    }

    /// Mount a section described as data.
    ///
    /// A section whose trigger target is missing keeps its autonomous timelines and skips the
    /// trigger-bound ones with a warning.
    #[tracing::instrument(skip_all, fields(section = %def.name))]
    pub fn mount_section(
        &mut self,
        registry: &mut TriggerRegistry,
        layout: &dyn Layout,
        def: &SectionDef,
    ) -> ScrollweaveResult<()> {
        let trigger = match &def.trigger {
            Some(t) => self.add_trigger(registry, layout, t.spec()).id(),
            None => None,
        };
        for (i, tdef) in def.timelines.iter().enumerate() {
            if tdef.playback.needs_trigger() && trigger.is_none() {
                tracing::warn!(timeline = i, "section trigger unavailable, timeline skipped");
                continue;
            }
            let timeline = tdef.build(trigger)?;
            self.add_timeline(timeline);
        }
        tracing::debug!(
            triggers = self.triggers.len(),
            timelines = self.timelines.len(),
            "section mounted"
        );
        Ok(())
    }

    /// Timelines in insertion order.
    pub fn timelines(&self) -> &[Timeline] {
        &self.timelines
    }

    /// Mutable access to one timeline.
    pub fn timeline_mut(&mut self, index: usize) -> Option<&mut Timeline> {
        self.timelines.get_mut(index)
    }

    /// One mounted gallery.
    pub fn horizontal(&self, index: usize) -> Option<&HorizontalScroll> {
        self.strips.get(index).map(|s| &s.scroll)
    }

    /// Mutable access to one mounted gallery, for nested slide triggers.
    pub fn horizontal_mut(&mut self, index: usize) -> Option<&mut HorizontalScroll> {
        self.strips.get_mut(index).map(|s| &mut s.scroll)
    }

    /// Handles of the triggers registered directly on this context.
    pub fn triggers(&self) -> &[TriggerHandle] {
        &self.triggers
    }

    /// Recompute gallery extents after a resize. The registry refresh follows separately.
    pub(crate) fn refresh_horizontals(&mut self, registry: &mut TriggerRegistry, layout: &dyn Layout) {
        for strip in &mut self.strips {
            strip.scroll.refresh(registry, layout);
            strip.written = None;
        }
        for pin in &mut self.pins {
            pin.written = None;
        }
    }

    /// Frame step 3: pin counter-transforms, strip translations and scrubbed timelines, reading
    /// the progress computed by this frame's registry update.
    pub(crate) fn drive_scrubbed(
        &mut self,
        registry: &TriggerRegistry,
        dt: f64,
        sink: &mut dyn PropertySink,
        failures: &mut Vec<PropertyFailure>,
    ) {
        for pin in &mut self.pins {
            let Some(y) = registry.snapshot(pin.trigger).map(|s| s.pin_offset) else {
                continue;
            };
            if pin.written == Some(y) {
                continue;
            }
            let target = TargetId::element(pin.target);
            match sink.apply(target, "y", &y.into()) {
                Ok(()) => pin.written = Some(y),
                Err(err) => failures.push(PropertyFailure {
                    target,
                    property: "y".to_owned(),
                    message: err.to_string(),
                }),
            }
        }
        for strip in &mut self.strips {
            let x = strip.scroll.translate_x(registry);
            if strip.written == Some(x) {
                continue;
            }
            let target = TargetId::element(strip.scroll.strip());
            match sink.apply(target, "x", &x.into()) {
                Ok(()) => strip.written = Some(x),
                Err(err) => failures.push(PropertyFailure {
                    target,
                    property: "x".to_owned(),
                    message: err.to_string(),
                }),
            }
        }
        for tl in self.timelines.iter_mut().filter(|t| t.playback().is_scrubbed()) {
            if let Some(p) = tl.playback().trigger().and_then(|id| registry.progress(id)) {
                tl.set_progress(p);
            }
            tl.advance(dt);
            failures.extend(tl.render(sink));
        }
    }

    /// Frame step 4: toggled timelines react to this frame's crossings, then every own clock
    /// advances.
    pub(crate) fn drive_clocks(
        &mut self,
        events: &[TriggerEvent],
        dt: f64,
        sink: &mut dyn PropertySink,
        failures: &mut Vec<PropertyFailure>,
    ) {
        for tl in self.timelines.iter_mut().filter(|t| !t.playback().is_scrubbed()) {
            for e in events {
                tl.on_trigger_event(e);
            }
            tl.advance(dt);
            failures.extend(tl.render(sink));
        }
    }

    /// Dispose every trigger, kill every timeline and unmount every gallery. Idempotent.
    pub fn revert(&mut self) {
        if self.reverted {
            return;
        }
        self.reverted = true;
        for t in self.triggers.drain(..) {
            t.dispose();
        }
        for tl in &mut self.timelines {
            tl.kill();
        }
        for strip in &mut self.strips {
            strip.scroll.dispose();
        }
        tracing::debug!(section = %self.name, "context reverted");
    }
}

impl Drop for AnimationContext {
    fn drop(&mut self) {
        self.revert();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stage/context.rs"]
mod tests;
