use std::collections::BTreeMap;
use std::collections::btree_map::Entry as MapEntry;
use std::fmt;
use std::str::FromStr;

use crate::animation::tween::Tween;
use crate::foundation::core::TargetId;
use crate::foundation::error::{ScrollweaveError, ScrollweaveResult};
use crate::foundation::math::{clamp01, exp_decay_alpha, finite_or};
use crate::timeline::playback::{
    Playback, Repeat, ToggleAction, ToggleActions, loop_finished, loop_time, validate_smoothing,
};
use crate::timeline::sink::{PropertyFailure, PropertySink};
use crate::trigger::registry::{TriggerEvent, TriggerId};

/// Where a tween is placed on its timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Position {
    /// Absolute seconds from the timeline start.
    At(f64),
    /// Fraction of the duration spanned by the absolutely placed tweens.
    Fraction(f64),
    /// Right after the previously added tween ends.
    AfterPrevious,
}

impl FromStr for Position {
    type Err = ScrollweaveError;

    /// `">"` places after the previous tween, `"50%"` is a fraction, a number is seconds.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == ">" {
            return Ok(Self::AfterPrevious);
        }
        let bad = || ScrollweaveError::animation(format!("invalid timeline position '{s}'"));
        match s.strip_suffix('%') {
            Some(p) => p
                .trim()
                .parse::<f64>()
                .map(|p| Self::Fraction(p / 100.0))
                .map_err(|_| bad()),
            None => s.parse::<f64>().map(Self::At).map_err(|_| bad()),
        }
    }
}

impl<'de> serde::Deserialize<'de> for Position {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Text(String),
        }
        match Repr::deserialize(deserializer)? {
            Repr::Number(v) => Ok(Self::At(v)),
            Repr::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Base {
    At(f64),
    Fraction(f64),
}

#[derive(Clone, Debug)]
struct Placed {
    tween: Tween,
    base: Base,
    offset: f64,
    start: f64,
}

/// Ordered composition of tweens plus the clock that plays it.
///
/// Overlapping tweens on one property resolve to the most recently started tween; before any
/// of them has started the earliest tween's from-value holds.
#[derive(Clone)]
pub struct Timeline {
    playback: Playback,
    placed: Vec<Placed>,
    order: Vec<usize>,
    duration: f64,

    time: f64,
    scrub_target: f64,
    elapsed: f64,
    delay_left: f64,
    playing: bool,
    reversed: bool,
    rendered: Option<f64>,
    killed: bool,
}

impl fmt::Debug for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeline")
            .field("playback", &self.playback)
            .field("tweens", &self.placed.len())
            .field("duration", &self.duration)
            .field("time", &self.time)
            .field("playing", &self.playing)
            .field("killed", &self.killed)
            .finish()
    }
}

impl Timeline {
    /// Empty timeline with the given clock source.
    pub fn new(playback: Playback) -> Self {
        let (playing, delay_left) = match playback {
            Playback::Autonomous { delay, .. } => (true, finite_or(delay, 0.0).max(0.0)),
            _ => (false, 0.0),
        };
        Self {
            playback,
            placed: Vec::new(),
            order: Vec::new(),
            duration: 0.0,
            time: 0.0,
            scrub_target: 0.0,
            elapsed: 0.0,
            delay_left,
            playing,
            reversed: false,
            rendered: None,
            killed: false,
        }
    }

    /// Autonomous, single iteration, no delay.
    pub fn autonomous() -> Self {
        Self::new(Playback::Autonomous {
            delay: 0.0,
            repeat: Repeat::Once,
            yoyo: false,
        })
    }

    /// Scrubbed exactly by `trigger`.
    pub fn scrubbed(trigger: TriggerId) -> Self {
        Self::new(Playback::Scrubbed {
            trigger,
            smoothing: None,
        })
    }

    /// Controlled by `trigger` crossings.
    pub fn toggled(trigger: TriggerId, actions: ToggleActions) -> Self {
        Self::new(Playback::Toggled { trigger, actions })
    }

    /// Start delay of an autonomous timeline.
    pub fn with_delay(mut self, delay: f64) -> Self {
        if let Playback::Autonomous { delay: d, .. } = &mut self.playback {
            *d = delay;
            self.delay_left = finite_or(delay, 0.0).max(0.0);
        }
        self
    }

    /// Repeat policy of an autonomous timeline.
    pub fn with_repeat(mut self, repeat: Repeat, yoyo: bool) -> Self {
        if let Playback::Autonomous {
            repeat: r, yoyo: y, ..
        } = &mut self.playback
        {
            *r = repeat;
            *y = yoyo;
        }
        self
    }

    /// Lag smoothing of a scrubbed timeline.
    pub fn with_smoothing(mut self, smoothing: Option<f64>) -> Self {
        if let Playback::Scrubbed { smoothing: s, .. } = &mut self.playback {
            *s = smoothing;
        }
        self
    }

    /// Validate clock parameters.
    pub fn validate(&self) -> ScrollweaveResult<()> {
        match self.playback {
            Playback::Autonomous { delay, .. } if !delay.is_finite() || delay < 0.0 => Err(
                ScrollweaveError::animation(format!("timeline delay must be >= 0, got {delay}")),
            ),
            Playback::Scrubbed { smoothing, .. } => validate_smoothing(smoothing),
            _ => Ok(()),
        }
    }

    /// Clock source.
    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    /// Insert `tween` at `position`.
    pub fn add(&mut self, tween: Tween, position: Position) -> ScrollweaveResult<&mut Self> {
        tween.validate()?;
        let base = self.base_for(position)?;
        self.placed.push(Placed {
            tween,
            base,
            offset: 0.0,
            start: 0.0,
        });
        self.resolve();
        Ok(self)
    }

    /// Insert one tween per target, the `i`-th offset by `i · each` seconds from `position`.
    pub fn stagger(
        &mut self,
        targets: &[TargetId],
        each: f64,
        position: Position,
        mut template: impl FnMut(usize, TargetId) -> Tween,
    ) -> ScrollweaveResult<&mut Self> {
        if !each.is_finite() || each < 0.0 {
            return Err(ScrollweaveError::animation(format!(
                "stagger step must be finite and >= 0, got {each}"
            )));
        }
        let base = self.base_for(position)?;
        let mut batch = Vec::with_capacity(targets.len());
        for (i, &target) in targets.iter().enumerate() {
            let mut tween = template(i, target);
            tween.target = target;
            tween.validate()?;
            batch.push(Placed {
                tween,
                base,
                offset: i as f64 * each,
                start: 0.0,
            });
        }
        self.placed.extend(batch);
        self.resolve();
        Ok(self)
    }

    fn base_for(&self, position: Position) -> ScrollweaveResult<Base> {
        let check = |v: f64| {
            if v.is_finite() && v >= 0.0 {
                Ok(v)
            } else {
                Err(ScrollweaveError::animation(format!(
                    "timeline position must be finite and >= 0, got {v}"
                )))
            }
        };
        Ok(match position {
            Position::At(t) => Base::At(check(t)?),
            Position::Fraction(f) => Base::Fraction(check(f)?),
            Position::AfterPrevious => Base::At(
                self.placed
                    .last()
                    .map(|p| p.start + p.tween.span())
                    .unwrap_or(0.0),
            ),
        })
    }

    fn resolve(&mut self) {
        let absolute = self
            .placed
            .iter()
            .filter_map(|p| match p.base {
                Base::At(t) => Some(t + p.offset + p.tween.span()),
                Base::Fraction(_) => None,
            })
            .fold(0.0, f64::max);
        for p in &mut self.placed {
            p.start = match p.base {
                Base::At(t) => t + p.offset,
                Base::Fraction(f) => f * absolute + p.offset,
            };
        }
        self.duration = self
            .placed
            .iter()
            .map(|p| p.start + p.tween.span())
            .fold(0.0, f64::max);

        let mut order: Vec<usize> = (0..self.placed.len()).collect();
        order.sort_by(|&a, &b| {
            let ka = self.placed[a].start + self.placed[a].tween.delay;
            let kb = self.placed[b].start + self.placed[b].tween.delay;
            ka.total_cmp(&kb).then(a.cmp(&b))
        });
        self.order = order;

        if self.playback.is_scrubbed() {
            self.time = self.scrub_target * self.duration;
        } else {
            self.time = self.time.min(self.duration);
        }
        self.rendered = None;
    }

    /// Number of tweens.
    pub fn len(&self) -> usize {
        self.placed.len()
    }

    /// `true` without tweens.
    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }

    /// Latest tween end.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Resolved start time of the `index`-th added tween.
    pub fn start_of(&self, index: usize) -> Option<f64> {
        self.placed.get(index).map(|p| p.start)
    }

    /// Current playhead in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Playhead as a fraction of the duration.
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            self.time / self.duration
        } else {
            0.0
        }
    }

    /// `true` while the own clock is running.
    pub fn is_playing(&self) -> bool {
        self.playing && !self.killed
    }

    /// `true` once torn down.
    pub fn is_killed(&self) -> bool {
        self.killed
    }

    /// Drive a scrubbed timeline from trigger progress. Without smoothing the playhead becomes
    /// exactly `progress × duration`.
    pub fn set_progress(&mut self, progress: f64) {
        let p = clamp01(progress);
        self.scrub_target = p;
        let smoothed = matches!(
            self.playback,
            Playback::Scrubbed { smoothing: Some(s), .. } if s > 0.0
        );
        if !smoothed {
            self.time = p * self.duration;
        }
    }

    /// Move the playhead to `time` seconds.
    pub fn seek(&mut self, time: f64) {
        self.time = finite_or(time, 0.0).clamp(0.0, self.duration);
        self.scrub_target = self.progress();
    }

    /// Advance the own clock (or the scrub smoothing) by `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        if self.killed {
            return;
        }
        let dt = finite_or(dt, 0.0).max(0.0);
        match self.playback {
            Playback::Scrubbed {
                smoothing: Some(lag),
                ..
            } if lag > 0.0 => {
                let target = self.scrub_target * self.duration;
                let a = exp_decay_alpha(10.0 / lag, dt);
                self.time += (target - self.time) * a;
                if (target - self.time).abs() <= 1e-6 * self.duration.max(1.0) {
                    self.time = target;
                }
            }
            Playback::Scrubbed { .. } => {}
            Playback::Autonomous { repeat, yoyo, .. } => {
                if !self.playing {
                    return;
                }
                let mut dt = dt;
                if self.delay_left > 0.0 {
                    let used = dt.min(self.delay_left);
                    self.delay_left -= used;
                    dt -= used;
                }
                self.elapsed += dt;
                self.time = loop_time(self.elapsed, self.duration, repeat, yoyo);
                if loop_finished(self.elapsed, self.duration, repeat) {
                    self.playing = false;
                }
            }
            Playback::Toggled { .. } => {
                if !self.playing {
                    return;
                }
                let dir = if self.reversed { -1.0 } else { 1.0 };
                self.time = (self.time + dir * dt).clamp(0.0, self.duration);
                if (self.reversed && self.time <= 0.0)
                    || (!self.reversed && self.time >= self.duration)
                {
                    self.playing = false;
                }
            }
        }
    }

    /// React to a trigger crossing. Returns `true` when the event belonged to this timeline.
    pub fn on_trigger_event(&mut self, event: &TriggerEvent) -> bool {
        match self.playback {
            Playback::Toggled { trigger, actions } if trigger == event.trigger => {
                self.apply_action(actions.for_kind(event.kind));
                true
            }
            _ => false,
        }
    }

    /// Apply one toggle action to the own clock.
    pub fn apply_action(&mut self, action: ToggleAction) {
        if self.killed {
            return;
        }
        match action {
            ToggleAction::Play => {
                self.reversed = false;
                self.playing = self.time < self.duration;
            }
            ToggleAction::Pause => self.playing = false,
            ToggleAction::Resume => self.playing = true,
            ToggleAction::Reverse => {
                self.reversed = true;
                self.playing = self.time > 0.0;
            }
            ToggleAction::Restart => {
                self.time = 0.0;
                self.reversed = false;
                self.playing = true;
            }
            ToggleAction::Reset => {
                self.time = 0.0;
                self.reversed = false;
                self.playing = false;
            }
            ToggleAction::Complete => {
                self.time = self.duration;
                self.playing = false;
            }
            ToggleAction::None => {}
        }
    }

    /// Play forward.
    pub fn play(&mut self) {
        self.apply_action(ToggleAction::Play);
    }

    /// Play backward.
    pub fn reverse(&mut self) {
        self.apply_action(ToggleAction::Reverse);
    }

    /// Stop the clock.
    pub fn pause(&mut self) {
        self.apply_action(ToggleAction::Pause);
    }

    /// Tear down. Returns `false` if already killed.
    pub fn kill(&mut self) -> bool {
        if self.killed {
            return false;
        }
        self.killed = true;
        self.playing = false;
        true
    }

    /// Forget what was last written so the next [`Timeline::render`] writes again.
    pub fn invalidate(&mut self) {
        self.rendered = None;
    }

    /// Write the current playhead's values to `sink` if the playhead moved since the last
    /// render.
    pub fn render(&mut self, sink: &mut dyn PropertySink) -> Vec<PropertyFailure> {
        if self.killed || self.rendered == Some(self.time) {
            return Vec::new();
        }
        let failures = self.evaluate_at(self.time, sink);
        self.rendered = Some(self.time);
        failures
    }

    /// Write every animated property at timeline time `time`. Pure in `time`: the same time
    /// always writes the same values.
    pub fn evaluate_at(&self, time: f64, sink: &mut dyn PropertySink) -> Vec<PropertyFailure> {
        let mut winners: BTreeMap<(TargetId, &str), (usize, usize)> = BTreeMap::new();
        for &pi in &self.order {
            let p = &self.placed[pi];
            let started = p.tween.has_started(time - p.start);
            for (ti, track) in p.tween.tracks.iter().enumerate() {
                match winners.entry((p.tween.target, track.property.as_str())) {
                    MapEntry::Vacant(v) => {
                        v.insert((pi, ti));
                    }
                    MapEntry::Occupied(mut o) if started => {
                        o.insert((pi, ti));
                    }
                    MapEntry::Occupied(_) => {}
                }
            }
        }

        let mut failures = Vec::new();
        for ((target, property), (pi, ti)) in winners {
            let p = &self.placed[pi];
            let written = p
                .tween
                .sample(&p.tween.tracks[ti], time - p.start)
                .and_then(|v| sink.apply(target, property, &v));
            if let Err(err) = written {
                failures.push(PropertyFailure {
                    target,
                    property: property.to_owned(),
                    message: err.to_string(),
                });
            }
        }
        failures
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/compose.rs"]
mod tests;
