use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{ScrollweaveError, ScrollweaveResult};
use crate::trigger::registry::{TransitionKind, TriggerId};

/// How many extra iterations an autonomous timeline plays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Repeat {
    /// Play a single iteration.
    #[default]
    Once,
    /// Play `1 + n` iterations.
    Count(u32),
    /// Loop until torn down.
    Infinite,
}

impl Repeat {
    /// Map the common integer convention: `-1` is infinite, `0` plays once.
    pub fn from_count(n: i64) -> Self {
        match n {
            n if n < 0 => Self::Infinite,
            0 => Self::Once,
            n => Self::Count(u32::try_from(n).unwrap_or(u32::MAX)),
        }
    }

    fn last_cycle(self) -> f64 {
        match self {
            Self::Once => 0.0,
            Self::Count(n) => f64::from(n),
            Self::Infinite => f64::INFINITY,
        }
    }
}

/// Timeline clock source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Playback {
    /// Time is `progress(trigger) × duration`, optionally lag-smoothed by `smoothing` seconds.
    Scrubbed {
        /// Driving trigger.
        trigger: TriggerId,
        /// Catch-up lag in seconds; `None` follows progress exactly.
        smoothing: Option<f64>,
    },
    /// Own clock, forward-only, started after `delay`.
    Autonomous {
        /// Seconds before the first frame advances.
        delay: f64,
        /// Extra iterations.
        repeat: Repeat,
        /// Alternate direction every iteration.
        yoyo: bool,
    },
    /// Own clock, controlled by trigger crossings.
    Toggled {
        /// Trigger whose crossings drive the clock.
        trigger: TriggerId,
        /// Reaction per crossing.
        actions: ToggleActions,
    },
}

impl Playback {
    /// Trigger this playback reads from, if any.
    pub fn trigger(&self) -> Option<TriggerId> {
        match *self {
            Self::Scrubbed { trigger, .. } | Self::Toggled { trigger, .. } => Some(trigger),
            Self::Autonomous { .. } => None,
        }
    }

    /// `true` for scrubbed playback.
    pub fn is_scrubbed(&self) -> bool {
        matches!(self, Self::Scrubbed { .. })
    }
}

/// Reaction of a toggled timeline to one crossing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToggleAction {
    /// Play forward from the current time.
    Play,
    /// Stop the clock.
    Pause,
    /// Continue in the last direction.
    Resume,
    /// Play backward from the current time.
    Reverse,
    /// Jump to 0 and play forward.
    Restart,
    /// Jump to 0 and stop.
    Reset,
    /// Jump to the end and stop.
    Complete,
    /// Ignore.
    #[default]
    None,
}

impl FromStr for ToggleAction {
    type Err = ScrollweaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "play" => Self::Play,
            "pause" => Self::Pause,
            "resume" => Self::Resume,
            "reverse" => Self::Reverse,
            "restart" => Self::Restart,
            "reset" => Self::Reset,
            "complete" => Self::Complete,
            "none" => Self::None,
            other => {
                return Err(ScrollweaveError::animation(format!(
                    "unknown toggle action '{other}'"
                )));
            }
        })
    }
}

impl fmt::Display for ToggleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Reverse => "reverse",
            Self::Restart => "restart",
            Self::Reset => "reset",
            Self::Complete => "complete",
            Self::None => "none",
        })
    }
}

/// Actions for enter, leave, enter-back and leave-back, written as four words
/// (`"play none none reverse"`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToggleActions {
    /// On [`TransitionKind::Enter`].
    pub on_enter: ToggleAction,
    /// On [`TransitionKind::Leave`].
    pub on_leave: ToggleAction,
    /// On [`TransitionKind::EnterBack`].
    pub on_enter_back: ToggleAction,
    /// On [`TransitionKind::LeaveBack`].
    pub on_leave_back: ToggleAction,
}

impl Default for ToggleActions {
    fn default() -> Self {
        Self {
            on_enter: ToggleAction::Play,
            on_leave: ToggleAction::None,
            on_enter_back: ToggleAction::None,
            on_leave_back: ToggleAction::None,
        }
    }
}

impl ToggleActions {
    /// Action for `kind`.
    pub fn for_kind(&self, kind: TransitionKind) -> ToggleAction {
        match kind {
            TransitionKind::Enter => self.on_enter,
            TransitionKind::Leave => self.on_leave,
            TransitionKind::EnterBack => self.on_enter_back,
            TransitionKind::LeaveBack => self.on_leave_back,
        }
    }
}

impl FromStr for ToggleActions {
    type Err = ScrollweaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = s.split_whitespace().collect();
        let [a, b, c, d] = words.as_slice() else {
            return Err(ScrollweaveError::animation(format!(
                "toggle actions need four words, got '{s}'"
            )));
        };
        Ok(Self {
            on_enter: a.parse()?,
            on_leave: b.parse()?,
            on_enter_back: c.parse()?,
            on_leave_back: d.parse()?,
        })
    }
}

impl fmt::Display for ToggleActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.on_enter, self.on_leave, self.on_enter_back, self.on_leave_back
        )
    }
}

/// Map elapsed autonomous time onto timeline time for `duration`, honoring repeat and yoyo.
///
/// Odd iterations of a yoyo timeline run backward; once the last iteration ends the time
/// holds at that iteration's end.
pub(crate) fn loop_time(elapsed: f64, duration: f64, repeat: Repeat, yoyo: bool) -> f64 {
    if duration <= 0.0 || !elapsed.is_finite() {
        return duration.max(0.0);
    }
    let elapsed = elapsed.max(0.0);
    let last = repeat.last_cycle();
    let cycle = (elapsed / duration).floor();
    if cycle > last {
        let backward = yoyo && (last % 2.0) == 1.0;
        return if backward { 0.0 } else { duration };
    }
    let local = elapsed - cycle * duration;
    if yoyo && (cycle % 2.0) == 1.0 {
        duration - local
    } else {
        local
    }
}

/// `true` once an autonomous timeline finished its last iteration.
pub(crate) fn loop_finished(elapsed: f64, duration: f64, repeat: Repeat) -> bool {
    match repeat {
        Repeat::Infinite => false,
        _ => elapsed >= duration.max(0.0) * (repeat.last_cycle() + 1.0),
    }
}

/// Validate a lag smoothing value.
pub(crate) fn validate_smoothing(smoothing: Option<f64>) -> ScrollweaveResult<()> {
    match smoothing {
        Some(s) if !s.is_finite() || s < 0.0 => Err(ScrollweaveError::animation(format!(
            "scrub smoothing must be finite and >= 0, got {s}"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/playback.rs"]
mod tests;
