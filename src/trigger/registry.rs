use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::foundation::core::{ElementId, Layout, ScrollDirection};
use crate::foundation::error::ScrollweaveResult;
use crate::foundation::math::clamp01;
use crate::trigger::descriptor::{Descriptor, Length, Span};

/// Registry-assigned trigger identity.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TriggerId(pub u32);

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trigger#{}", self.0)
    }
}

/// Lifecycle phase of a trigger relative to its range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// Position is before the range start.
    #[default]
    Before,
    /// Position is inside the range.
    Entered,
    /// Position is past the range end.
    After,
}

/// Kind of a phase crossing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionKind {
    /// `Before → Entered`, moving forward.
    Enter,
    /// `Entered → After`, moving forward.
    Leave,
    /// `After → Entered`, moving backward.
    EnterBack,
    /// `Entered → Before`, moving backward.
    LeaveBack,
}

impl TransitionKind {
    /// Travel direction implied by the crossing.
    pub fn direction(self) -> ScrollDirection {
        match self {
            Self::Enter | Self::Leave => ScrollDirection::Forward,
            Self::EnterBack | Self::LeaveBack => ScrollDirection::Backward,
        }
    }
}

/// One phase crossing observed during [`TriggerRegistry::update`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerEvent {
    /// Trigger that crossed.
    pub trigger: TriggerId,
    /// Crossing kind.
    pub kind: TransitionKind,
    /// Progress after the update.
    pub progress: f64,
    /// Travel direction.
    pub direction: ScrollDirection,
}

/// When `on_update` fires.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMode {
    /// While entered, plus the tick of any crossing.
    #[default]
    WhileActive,
    /// Every tick (continuously scrubbed triggers).
    Always,
}

type TransitionCallback = Box<dyn FnMut(&TriggerEvent)>;
type UpdateCallback = Box<dyn FnMut(f64)>;

/// Optional trigger callbacks.
#[derive(Default)]
pub struct TriggerCallbacks {
    on_enter: Option<TransitionCallback>,
    on_leave: Option<TransitionCallback>,
    on_enter_back: Option<TransitionCallback>,
    on_leave_back: Option<TransitionCallback>,
    on_update: Option<UpdateCallback>,
}

impl fmt::Debug for TriggerCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerCallbacks")
            .field("on_enter", &self.on_enter.is_some())
            .field("on_leave", &self.on_leave.is_some())
            .field("on_enter_back", &self.on_enter_back.is_some())
            .field("on_leave_back", &self.on_leave_back.is_some())
            .field("on_update", &self.on_update.is_some())
            .finish()
    }
}

impl TriggerCallbacks {
    /// No callbacks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fired on `Before → Entered`.
    pub fn on_enter(mut self, f: impl FnMut(&TriggerEvent) + 'static) -> Self {
        self.on_enter = Some(Box::new(f));
        self
    }

    /// Fired on `Entered → After`.
    pub fn on_leave(mut self, f: impl FnMut(&TriggerEvent) + 'static) -> Self {
        self.on_leave = Some(Box::new(f));
        self
    }

    /// Fired on `After → Entered`.
    pub fn on_enter_back(mut self, f: impl FnMut(&TriggerEvent) + 'static) -> Self {
        self.on_enter_back = Some(Box::new(f));
        self
    }

    /// Fired on `Entered → Before`.
    pub fn on_leave_back(mut self, f: impl FnMut(&TriggerEvent) + 'static) -> Self {
        self.on_leave_back = Some(Box::new(f));
        self
    }

    /// Fired with the current progress, see [`UpdateMode`].
    pub fn on_update(mut self, f: impl FnMut(f64) + 'static) -> Self {
        self.on_update = Some(Box::new(f));
        self
    }

    fn transition(&mut self, kind: TransitionKind) -> Option<&mut TransitionCallback> {
        match kind {
            TransitionKind::Enter => self.on_enter.as_mut(),
            TransitionKind::Leave => self.on_leave.as_mut(),
            TransitionKind::EnterBack => self.on_enter_back.as_mut(),
            TransitionKind::LeaveBack => self.on_leave_back.as_mut(),
        }
    }
}

/// Registration request.
#[derive(Debug)]
pub struct TriggerSpec {
    /// Element whose bounds anchor the range; `None` anchors to the document origin.
    pub target: Option<ElementId>,
    /// Range start.
    pub start: Descriptor,
    /// Range end.
    pub end: Descriptor,
    /// Hold the target fixed while entered and extend the document by the range span.
    pub pin: bool,
    /// Pinned horizontal container whose strip coordinates this trigger lives in.
    pub container: Option<TriggerId>,
    /// `on_update` policy.
    pub update: UpdateMode,
    /// Callbacks.
    pub callbacks: TriggerCallbacks,
}

impl TriggerSpec {
    /// Range anchored on `target`.
    pub fn new(target: ElementId, start: Descriptor, end: Descriptor) -> Self {
        Self {
            target: Some(target),
            start,
            end,
            pin: false,
            container: None,
            update: UpdateMode::default(),
            callbacks: TriggerCallbacks::default(),
        }
    }

    /// Range anchored on the document origin.
    pub fn page(start: Descriptor, end: Descriptor) -> Self {
        Self {
            target: None,
            ..Self::new(ElementId(0), start, end)
        }
    }

    /// Parse string descriptors for `target`.
    pub fn parse(target: ElementId, start: &str, end: &str) -> ScrollweaveResult<Self> {
        Ok(Self::new(target, start.parse()?, end.parse()?))
    }

    /// Pin the target.
    pub fn pinned(mut self) -> Self {
        self.pin = true;
        self
    }

    /// Resolve in the strip space of a pinned horizontal container.
    pub fn in_container(mut self, container: TriggerId) -> Self {
        self.container = Some(container);
        self
    }

    /// Set the `on_update` policy.
    pub fn update_mode(mut self, update: UpdateMode) -> Self {
        self.update = update;
        self
    }

    /// Attach callbacks.
    pub fn callbacks(mut self, callbacks: TriggerCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }
}

/// Strip coordinate space exposed by a pinned horizontal container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContainerSpace {
    /// Wide strip element; nested targets resolve relative to its left edge.
    pub strip: ElementId,
    /// Horizontal travel mapped onto the container's progress.
    pub extent: f64,
}

/// Disposable registration handle.
///
/// Handles for skipped registrations (missing target or container) are inert: they carry no
/// id and disposing them does nothing.
#[derive(Clone, Debug)]
pub struct TriggerHandle {
    id: Option<TriggerId>,
    alive: Rc<Cell<bool>>,
}

impl TriggerHandle {
    pub(crate) fn inert() -> Self {
        Self {
            id: None,
            alive: Rc::new(Cell::new(false)),
        }
    }

    /// Registered id, `None` for inert handles.
    pub fn id(&self) -> Option<TriggerId> {
        self.id
    }

    /// `true` when registration was skipped.
    pub fn is_inert(&self) -> bool {
        self.id.is_none()
    }

    /// `true` while registered.
    pub fn is_active(&self) -> bool {
        self.id.is_some() && self.alive.get()
    }

    /// Unregister. Idempotent, and safe from inside the trigger's own callbacks: the entry is
    /// dropped at the start of the next update.
    pub fn dispose(&self) {
        self.alive.set(false);
    }
}

/// Read-only view of one trigger.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerState {
    /// Identity.
    pub id: TriggerId,
    /// Resolved start coordinate.
    pub start: f64,
    /// Resolved end coordinate.
    pub end: f64,
    /// Progress in `[0, 1]`.
    pub progress: f64,
    /// Current phase.
    pub phase: Phase,
    /// Whether the trigger pins its target.
    pub pin: bool,
    /// Counter-translation holding a pinned target in place: `clamp(pos − start, 0, span)`.
    pub pin_offset: f64,
    /// `false` when the range failed to resolve to `start < end`.
    pub valid: bool,
}

impl TriggerState {
    /// `true` while entered.
    pub fn is_active(&self) -> bool {
        self.phase == Phase::Entered
    }

    /// Resolved range length.
    pub fn span(&self) -> f64 {
        self.end - self.start
    }
}

struct Trigger {
    id: TriggerId,
    target: Option<ElementId>,
    start_desc: Descriptor,
    end_desc: Descriptor,
    pin: bool,
    container: Option<TriggerId>,
    update: UpdateMode,
    callbacks: TriggerCallbacks,
    alive: Rc<Cell<bool>>,
    space: Option<ContainerSpace>,

    start: f64,
    end: f64,
    valid: bool,
    progress: f64,
    phase: Phase,
    position: f64,
}

impl Trigger {
    fn state(&self) -> TriggerState {
        let pin_offset = if self.pin && self.valid {
            (self.position - self.start).clamp(0.0, self.end - self.start)
        } else {
            0.0
        };
        TriggerState {
            id: self.id,
            start: self.start,
            end: self.end,
            progress: self.progress,
            phase: self.phase,
            pin: self.pin,
            pin_offset,
            valid: self.valid,
        }
    }
}

/// Page-level pinned section: documents below `bottom` are displaced by `span`.
#[derive(Clone, Copy, Debug)]
struct PinSection {
    bottom: f64,
    span: f64,
}

/// Owner of every scroll trigger.
///
/// Triggers are evaluated in registration order, so a container always updates before the
/// triggers nested in it.
#[derive(Default)]
pub struct TriggerRegistry {
    triggers: Vec<Trigger>,
    next_id: u32,
    pins: Vec<PinSection>,
    events: Vec<TriggerEvent>,
}

impl fmt::Debug for TriggerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerRegistry")
            .field("triggers", &self.triggers.len())
            .field("pin_spacing", &self.pin_spacing())
            .finish()
    }
}

impl TriggerRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered, non-disposed triggers.
    pub fn len(&self) -> usize {
        self.triggers.iter().filter(|t| t.alive.get()).count()
    }

    /// `true` when no live trigger is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register a trigger and resolve its range against `layout`.
    ///
    /// A missing target or container yields an inert handle. An unresolvable range is still
    /// registered but never leaves [`Phase::Before`].
    #[tracing::instrument(skip_all, fields(target = ?spec.target, start = %spec.start, end = %spec.end))]
    pub fn register(&mut self, spec: TriggerSpec, layout: &dyn Layout) -> TriggerHandle {
        if let Some(target) = spec.target {
            if layout.element_bounds(target).is_none() {
                tracing::debug!("target missing, registration skipped");
                return TriggerHandle::inert();
            }
        }
        if let Some(container) = spec.container {
            let ok = self
                .find(container)
                .is_some_and(|c| c.space.is_some() && c.alive.get());
            if !ok {
                tracing::warn!(%container, "container is not a horizontal pin, registration skipped");
                return TriggerHandle::inert();
            }
        }

        let id = TriggerId(self.next_id);
        self.next_id += 1;
        let alive = Rc::new(Cell::new(true));
        self.triggers.push(Trigger {
            id,
            target: spec.target,
            start_desc: spec.start,
            end_desc: spec.end,
            pin: spec.pin,
            container: spec.container,
            update: spec.update,
            callbacks: spec.callbacks,
            alive: alive.clone(),
            space: None,
            start: 0.0,
            end: 0.0,
            valid: false,
            progress: 0.0,
            phase: Phase::Before,
            position: 0.0,
        });
        self.refresh(layout);
        TriggerHandle {
            id: Some(id),
            alive,
        }
    }

    /// Remove a trigger now. Returns `false` if it was already gone.
    pub fn unregister(&mut self, id: TriggerId) -> bool {
        let Some(idx) = self.triggers.iter().position(|t| t.id == id) else {
            return false;
        };
        let t = self.triggers.remove(idx);
        let was_alive = t.alive.replace(false);
        if was_alive {
            tracing::debug!(%id, "trigger unregistered");
        }
        was_alive
    }

    /// Expose a strip coordinate space on a pinned trigger so others can nest in it.
    pub fn set_container_space(&mut self, id: TriggerId, space: ContainerSpace) -> bool {
        match self.find_mut(id) {
            Some(t) => {
                t.space = Some(space);
                true
            }
            None => false,
        }
    }

    /// Replace a trigger's range descriptors. Takes effect on the next [`TriggerRegistry::refresh`].
    pub fn set_range(&mut self, id: TriggerId, start: Descriptor, end: Descriptor) -> bool {
        match self.find_mut(id) {
            Some(t) => {
                t.start_desc = start;
                t.end_desc = end;
                true
            }
            None => false,
        }
    }

    /// Re-resolve every range against `layout` (resize, reflow) and recompute pin spacing.
    #[tracing::instrument(skip_all, fields(triggers = self.triggers.len()))]
    pub fn refresh(&mut self, layout: &dyn Layout) {
        self.prune();

        // Page-level pin spans do not depend on displacement, so resolve them unshifted first.
        let mut pins = Vec::new();
        for t in self.triggers.iter().filter(|t| t.pin && t.container.is_none()) {
            let Some(bounds) = t.target.and_then(|e| layout.element_bounds(e)) else {
                continue;
            };
            if let Some((start, end)) = resolve_page(t, layout, 0.0) {
                if start < end {
                    pins.push(PinSection {
                        bottom: bounds.y1,
                        span: end - start,
                    });
                }
            }
        }
        pins.sort_by(|a, b| a.bottom.total_cmp(&b.bottom));
        self.pins = pins;

        for i in 0..self.triggers.len() {
            let resolved = match self.triggers[i].container {
                Some(cid) => {
                    let space = self.triggers[..i]
                        .iter()
                        .find(|c| c.id == cid)
                        .and_then(|c| c.space);
                    space.and_then(|s| resolve_nested(&self.triggers[i], layout, s))
                }
                None => {
                    let t = &self.triggers[i];
                    let shift = t
                        .target
                        .and_then(|e| layout.element_bounds(e))
                        .map(|b| shift_for(&self.pins, b.y0))
                        .unwrap_or(0.0);
                    resolve_page(t, layout, shift)
                }
            };
            let t = &mut self.triggers[i];
            match resolved {
                Some((start, end)) if start.is_finite() && end.is_finite() && start < end => {
                    t.start = start;
                    t.end = end;
                    t.valid = true;
                }
                Some((start, end)) => {
                    tracing::warn!(id = %t.id, start, end, "invalid trigger range, trigger stays inactive");
                    t.start = start;
                    t.end = end;
                    t.valid = false;
                    t.progress = 0.0;
                }
                None => {
                    tracing::warn!(id = %t.id, "trigger range could not be resolved");
                    t.valid = false;
                    t.progress = 0.0;
                }
            }
        }
    }

    /// Total document extension contributed by page-level pins.
    pub fn pin_spacing(&self) -> f64 {
        self.pins.iter().map(|p| p.span).sum()
    }

    /// Document coordinate of `element`'s top edge after pin displacement.
    pub fn document_offset(&self, layout: &dyn Layout, element: ElementId) -> Option<f64> {
        let b = layout.element_bounds(element)?;
        Some(b.y0 + shift_for(&self.pins, b.y0))
    }

    /// Recompute every trigger for the virtual scroll `position` and fire due callbacks.
    ///
    /// Returns the crossings of this tick in firing order.
    pub fn update(&mut self, position: f64) -> &[TriggerEvent] {
        self.prune();
        self.events.clear();

        for i in 0..self.triggers.len() {
            let local = match self.triggers[i].container {
                Some(cid) => {
                    let parent = self.triggers[..i].iter().find(|c| c.id == cid);
                    match parent.and_then(|c| c.space.map(|s| c.progress * s.extent)) {
                        Some(p) => p,
                        None => continue,
                    }
                }
                None => position,
            };
            let t = &mut self.triggers[i];
            step(t, local, &mut self.events);
        }
        &self.events
    }

    /// Snapshot of one trigger.
    pub fn snapshot(&self, id: TriggerId) -> Option<TriggerState> {
        self.find(id).filter(|t| t.alive.get()).map(Trigger::state)
    }

    /// Progress of one trigger.
    pub fn progress(&self, id: TriggerId) -> Option<f64> {
        self.snapshot(id).map(|s| s.progress)
    }

    /// Snapshots of every live trigger in registration order.
    pub fn snapshots(&self) -> Vec<TriggerState> {
        self.triggers
            .iter()
            .filter(|t| t.alive.get())
            .map(Trigger::state)
            .collect()
    }

    fn prune(&mut self) {
        self.triggers.retain(|t| t.alive.get());
    }

    fn find(&self, id: TriggerId) -> Option<&Trigger> {
        self.triggers.iter().find(|t| t.id == id)
    }

    fn find_mut(&mut self, id: TriggerId) -> Option<&mut Trigger> {
        self.triggers.iter_mut().find(|t| t.id == id)
    }
}

fn shift_for(pins: &[PinSection], top: f64) -> f64 {
    pins.iter()
        .filter(|p| p.bottom <= top)
        .map(|p| p.span)
        .sum()
}

fn resolve_pair(t: &Trigger, span: Span) -> Option<(f64, f64)> {
    let start = t
        .start_desc
        .resolve(span, None)
        .inspect_err(|err| tracing::warn!(id = %t.id, %err, "bad start descriptor"))
        .ok()?;
    let end = t
        .end_desc
        .resolve(span, Some(start))
        .inspect_err(|err| tracing::warn!(id = %t.id, %err, "bad end descriptor"))
        .ok()?;
    Some((start, end))
}

fn resolve_page(t: &Trigger, layout: &dyn Layout, shift: f64) -> Option<(f64, f64)> {
    let viewport = layout.viewport();
    let (element_start, element_length) = match t.target {
        Some(e) => {
            let b = layout.element_bounds(e)?;
            (b.y0 + shift, b.height())
        }
        None => (0.0, 0.0),
    };
    resolve_pair(
        t,
        Span {
            element_start,
            element_length,
            viewport_length: viewport.height,
        },
    )
}

fn resolve_nested(t: &Trigger, layout: &dyn Layout, space: ContainerSpace) -> Option<(f64, f64)> {
    let strip = layout.element_bounds(space.strip)?;
    let (element_start, element_length) = match t.target {
        Some(e) => {
            let b = layout.element_bounds(e)?;
            (b.x0 - strip.x0, b.width())
        }
        None => (0.0, 0.0),
    };
    resolve_pair(
        t,
        Span {
            element_start,
            element_length,
            viewport_length: layout.viewport().width,
        },
    )
}

fn phase_at(position: f64, start: f64, end: f64) -> Phase {
    if position < start {
        Phase::Before
    } else if position > end {
        Phase::After
    } else {
        Phase::Entered
    }
}

fn crossings(from: Phase, to: Phase) -> &'static [TransitionKind] {
    use Phase::*;
    use TransitionKind::*;
    match (from, to) {
        (Before, Entered) => &[Enter],
        (Entered, After) => &[Leave],
        (Before, After) => &[Enter, Leave],
        (After, Entered) => &[EnterBack],
        (Entered, Before) => &[LeaveBack],
        (After, Before) => &[EnterBack, LeaveBack],
        _ => &[],
    }
}

fn step(t: &mut Trigger, position: f64, events: &mut Vec<TriggerEvent>) {
    t.position = position;
    let next = if !t.valid {
        // A range invalidated by refresh unwinds to `Before` through the mirrored crossing.
        t.progress = 0.0;
        Phase::Before
    } else if position.is_finite() {
        t.progress = clamp01((position - t.start) / (t.end - t.start));
        phase_at(position, t.start, t.end)
    } else {
        return;
    };
    let kinds = crossings(t.phase, next);
    t.phase = next;

    for &kind in kinds {
        let event = TriggerEvent {
            trigger: t.id,
            kind,
            progress: t.progress,
            direction: kind.direction(),
        };
        tracing::debug!(id = %t.id, ?kind, progress = t.progress, "trigger transition");
        events.push(event);
        if !t.alive.get() {
            continue;
        }
        if let Some(cb) = t.callbacks.transition(kind) {
            cb(&event);
        }
    }
    if !t.valid {
        return;
    }

    let wants_update = match t.update {
        UpdateMode::Always => true,
        UpdateMode::WhileActive => next == Phase::Entered || !kinds.is_empty(),
    };
    if wants_update && t.alive.get() {
        if let Some(cb) = t.callbacks.on_update.as_mut() {
            cb(t.progress);
        }
    }
}

/// Relative end descriptor covering `px` pixels.
pub(crate) fn span_px(px: f64) -> Descriptor {
    Descriptor::Relative(Length::Px(px))
}

#[cfg(test)]
#[path = "../../tests/unit/trigger/registry.rs"]
mod tests;
