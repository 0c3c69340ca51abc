use std::cell::Cell;
use std::rc::Rc;

use crate::animation::ease::Ease;
use crate::foundation::core::ScrollDirection;
use crate::foundation::error::ScrollweaveResult;
use crate::foundation::math::{clamp01, clamp_abs, exp_decay_alpha, finite_or, lerp};
use crate::scroll::config::ScrollConfig;

/// Origin of a raw scroll delta.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputSource {
    /// Mouse wheel or trackpad.
    Wheel,
    /// Touch drag.
    Touch,
}

/// Snapshot of the engine's scroll state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollState {
    /// Latest raw target offset.
    pub raw: f64,
    /// Eased virtual offset consumed by animation logic.
    pub position: f64,
    /// Smoothed signed velocity of the virtual offset, in pixels per second.
    pub velocity: f64,
    /// Direction of the last non-zero movement.
    pub direction: ScrollDirection,
}

/// Payload delivered to scroll subscribers once per moving frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollEvent {
    /// Virtual position after this frame.
    pub position: f64,
    /// Movement since the previous frame.
    pub delta: f64,
    /// Smoothed velocity, in pixels per second.
    pub velocity: f64,
    /// Direction of travel.
    pub direction: ScrollDirection,
}

/// Programmatic scroll options.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollToOptions {
    /// Seconds the override runs for.
    pub duration: f64,
    /// Curve of the override.
    pub ease: Ease,
    /// Pixels added to the destination.
    pub offset: f64,
}

impl Default for ScrollToOptions {
    fn default() -> Self {
        Self {
            duration: 1.2,
            ease: Ease::ExpoDecay { k: 10.0 },
            offset: 0.0,
        }
    }
}

/// Lifecycle of a programmatic scroll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollToStatus {
    /// Still overriding input.
    Running,
    /// Reached its destination.
    Completed,
    /// Replaced by another `scroll_to` or canceled explicitly.
    Canceled,
}

/// Completion signal of a [`SmoothScroll::scroll_to`] request.
#[derive(Clone, Debug)]
pub struct ScrollToHandle {
    status: Rc<Cell<ScrollToStatus>>,
}

impl ScrollToHandle {
    fn settled(status: ScrollToStatus) -> Self {
        Self {
            status: Rc::new(Cell::new(status)),
        }
    }

    /// Current status.
    pub fn status(&self) -> ScrollToStatus {
        self.status.get()
    }

    /// `true` once the request completed or was canceled.
    pub fn is_done(&self) -> bool {
        self.status() != ScrollToStatus::Running
    }
}

/// Disposable scroll subscription.
///
/// Disposal only flips a flag; the listener is dropped on the next engine tick, so disposing
/// from inside the listener itself is safe.
#[derive(Clone, Debug)]
#[must_use = "dropping a Subscription does not unsubscribe; call dispose()"]
pub struct Subscription {
    alive: Rc<Cell<bool>>,
}

impl Subscription {
    /// Stop receiving events. Idempotent.
    pub fn dispose(&self) {
        self.alive.set(false);
    }

    /// `true` until disposed.
    pub fn is_active(&self) -> bool {
        self.alive.get()
    }
}

type Listener = Box<dyn FnMut(&ScrollEvent)>;

struct ScrollOverride {
    from: f64,
    to: f64,
    elapsed: f64,
    duration: f64,
    ease: Ease,
    status: Rc<Cell<ScrollToStatus>>,
    on_complete: Option<Box<dyn FnOnce()>>,
}

/// Smooth scroll virtualizer.
///
/// Raw wheel/touch deltas move a clamped raw target; [`SmoothScroll::tick`] eases the virtual
/// position toward it once per frame. Triggers must read [`SmoothScroll::position`], never the
/// host's native scroll offset.
pub struct SmoothScroll {
    config: ScrollConfig,
    state: ScrollState,
    limit: f64,
    listeners: Vec<(Rc<Cell<bool>>, Listener)>,
    active: Option<ScrollOverride>,
}

impl std::fmt::Debug for SmoothScroll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmoothScroll")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("limit", &self.limit)
            .field("listeners", &self.listeners.len())
            .field("locked", &self.active.is_some())
            .finish()
    }
}

impl SmoothScroll {
    /// Create an engine at offset 0 with an unbounded scroll limit.
    pub fn new(config: ScrollConfig) -> ScrollweaveResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: ScrollState::default(),
            limit: f64::MAX,
            listeners: Vec::new(),
            active: None,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    /// Full state snapshot.
    pub fn state(&self) -> ScrollState {
        self.state
    }

    /// Virtual (eased) position.
    pub fn position(&self) -> f64 {
        self.state.position
    }

    /// Raw target position.
    pub fn target(&self) -> f64 {
        self.state.raw
    }

    /// Smoothed velocity in pixels per second.
    pub fn velocity(&self) -> f64 {
        self.state.velocity
    }

    /// Direction of the last movement.
    pub fn direction(&self) -> ScrollDirection {
        self.state.direction
    }

    /// Largest reachable offset.
    pub fn limit(&self) -> f64 {
        self.limit
    }

    /// Set the largest reachable offset (document height − viewport height + pin spacing).
    pub fn set_limit(&mut self, limit: f64) {
        self.limit = finite_or(limit, 0.0).max(0.0);
        self.state.raw = self.state.raw.clamp(0.0, self.limit);
    }

    /// `true` while a programmatic scroll overrides input.
    pub fn is_locked(&self) -> bool {
        self.active.is_some()
    }

    /// Feed a raw input delta. Returns `false` when the delta was ignored (override active or
    /// non-finite input).
    pub fn push_delta(&mut self, delta: f64, source: InputSource) -> bool {
        if self.is_locked() || !delta.is_finite() {
            return false;
        }
        let gain = match source {
            InputSource::Wheel => self.config.wheel_multiplier,
            InputSource::Touch => self.config.touch_multiplier,
        };
        let delta = clamp_abs(delta * gain, self.config.max_delta);
        self.state.raw = (self.state.raw + delta).clamp(0.0, self.limit);
        true
    }

    /// Wheel delta shorthand.
    pub fn on_wheel(&mut self, delta: f64) -> bool {
        self.push_delta(delta, InputSource::Wheel)
    }

    /// Touch-drag delta shorthand.
    pub fn on_touch(&mut self, delta: f64) -> bool {
        self.push_delta(delta, InputSource::Touch)
    }

    /// Jump raw and virtual positions without easing (resize, restore). Cancels an override.
    pub fn set_immediate(&mut self, position: f64) {
        self.cancel_scroll_to();
        let p = finite_or(position, self.state.position).clamp(0.0, self.limit);
        self.state.raw = p;
        self.state.position = p;
        self.state.velocity = 0.0;
    }

    /// Start a programmatic scroll towards `target + options.offset`.
    pub fn scroll_to(&mut self, target: f64, options: ScrollToOptions) -> ScrollToHandle {
        self.start_override(target, options, None)
    }

    /// Like [`SmoothScroll::scroll_to`], invoking `on_complete` when the destination is reached.
    /// The callback is dropped unrun if the request is canceled.
    pub fn scroll_to_with(
        &mut self,
        target: f64,
        options: ScrollToOptions,
        on_complete: impl FnOnce() + 'static,
    ) -> ScrollToHandle {
        self.start_override(target, options, Some(Box::new(on_complete)))
    }

    fn start_override(
        &mut self,
        target: f64,
        options: ScrollToOptions,
        on_complete: Option<Box<dyn FnOnce()>>,
    ) -> ScrollToHandle {
        if !target.is_finite() || !options.offset.is_finite() {
            tracing::warn!(target, offset = options.offset, "ignoring non-finite scroll_to");
            return ScrollToHandle::settled(ScrollToStatus::Canceled);
        }
        self.cancel_scroll_to();

        let to = (target + options.offset).clamp(0.0, self.limit);
        let status = Rc::new(Cell::new(ScrollToStatus::Running));
        tracing::debug!(from = self.state.position, to, "scroll_to started");
        self.active = Some(ScrollOverride {
            from: self.state.position,
            to,
            elapsed: 0.0,
            duration: finite_or(options.duration, 0.0).max(0.0),
            ease: options.ease,
            status: status.clone(),
            on_complete,
        });
        ScrollToHandle { status }
    }

    /// Cancel the running programmatic scroll, if any. Input is accepted again immediately and
    /// the raw target stays where the override left it.
    pub fn cancel_scroll_to(&mut self) {
        if let Some(ov) = self.active.take() {
            ov.status.set(ScrollToStatus::Canceled);
            self.state.raw = self.state.position;
            tracing::debug!(position = self.state.position, "scroll_to canceled");
        }
    }

    /// Subscribe to per-frame scroll events.
    pub fn subscribe(&mut self, listener: impl FnMut(&ScrollEvent) + 'static) -> Subscription {
        let alive = Rc::new(Cell::new(true));
        self.listeners.push((alive.clone(), Box::new(listener)));
        Subscription { alive }
    }

    /// Number of live subscribers (disposed ones are pruned on the next tick).
    pub fn subscriber_count(&self) -> usize {
        self.listeners.iter().filter(|(a, _)| a.get()).count()
    }

    /// Advance one frame of `dt` seconds. Returns the emitted event when the position moved.
    pub fn tick(&mut self, dt: f64) -> Option<ScrollEvent> {
        let dt = finite_or(dt, 0.0).max(0.0);
        let prev = self.state.position;

        if let Some(ov) = self.active.as_mut() {
            ov.elapsed += dt;
            let p = if ov.duration <= 0.0 {
                1.0
            } else {
                clamp01(ov.elapsed / ov.duration)
            };
            let pos = if p >= 1.0 {
                ov.to
            } else {
                lerp(ov.from, ov.to, ov.ease.apply(p))
            };
            self.state.raw = pos;
            self.state.position = pos;
            if p >= 1.0 {
                if let Some(done) = self.active.take() {
                    done.status.set(ScrollToStatus::Completed);
                    tracing::debug!(position = pos, "scroll_to completed");
                    if let Some(cb) = done.on_complete {
                        cb();
                    }
                }
            }
        } else {
            let gap = self.state.raw - self.state.position;
            let alpha = exp_decay_alpha(self.config.decay, dt / self.config.duration);
            let next = self.state.position + gap * alpha;
            self.state.position = if (self.state.raw - next).abs() <= self.config.settle_epsilon {
                self.state.raw
            } else {
                next
            };
        }

        let delta = self.state.position - prev;
        let sample = if dt > 0.0 { delta / dt } else { 0.0 };
        let s = self.config.velocity_smoothing;
        let velocity = clamp_abs(
            self.state.velocity * s + sample * (1.0 - s),
            self.config.max_velocity,
        );
        self.state.velocity = if velocity.abs() < 1e-9 { 0.0 } else { velocity };
        self.state.direction = ScrollDirection::from_delta(delta, self.state.direction);

        self.listeners.retain(|(alive, _)| alive.get());
        if delta == 0.0 {
            return None;
        }
        let event = ScrollEvent {
            position: self.state.position,
            delta,
            velocity: self.state.velocity,
            direction: self.state.direction,
        };
        for (alive, listener) in &mut self.listeners {
            if alive.get() {
                listener(&event);
            }
        }
        Some(event)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/engine.rs"]
mod tests;
