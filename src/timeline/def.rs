use std::collections::BTreeMap;

use crate::animation::ease::Ease;
use crate::animation::tween::Tween;
use crate::animation::value::Value;
use crate::foundation::core::{ElementId, TargetId};
use crate::foundation::error::{ScrollweaveError, ScrollweaveResult};
use crate::timeline::playback::{Repeat, ToggleActions};
use crate::timeline::compose::{Position, Timeline};
use crate::trigger::descriptor::{Anchor, Descriptor};
use crate::trigger::registry::{TriggerId, TriggerSpec, UpdateMode};

/// Stagger of one tween definition over the pre-split units of its target.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaggerDef {
    /// Number of units, addressed as parts `0..count`.
    pub count: u32,
    /// Seconds between consecutive units.
    pub each: f64,
}

/// Declarative tween.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TweenDef {
    /// Animated element.
    pub target: ElementId,
    /// Unit of the element, for a single pre-split glyph or word.
    #[serde(default)]
    pub part: Option<u32>,
    /// Start values, one per animated property.
    #[serde(default)]
    pub from: BTreeMap<String, Value>,
    /// End values.
    pub to: BTreeMap<String, Value>,
    /// Seconds.
    pub duration: f64,
    /// Seconds before moving.
    #[serde(default)]
    pub delay: f64,
    /// Easing name; unknown names fall back to the default with a warning.
    #[serde(default)]
    pub ease: Option<String>,
    /// Placement; defaults to after the previous tween.
    #[serde(default)]
    pub position: Option<Position>,
    /// Optional stagger over units.
    #[serde(default)]
    pub stagger: Option<StaggerDef>,
}

impl TweenDef {
    fn tween(&self, target: TargetId) -> ScrollweaveResult<Tween> {
        let ease = self
            .ease
            .as_deref()
            .map(Ease::parse_or_default)
            .unwrap_or_default();
        let mut tween = Tween::new(target, self.duration)
            .ease(ease)
            .delay(self.delay);
        for (property, to) in &self.to {
            let from = self.from.get(property).ok_or_else(|| {
                ScrollweaveError::animation(format!(
                    "property '{property}' of {target} has no from-value"
                ))
            })?;
            tween = tween.track(property.clone(), from.clone(), to.clone());
        }
        Ok(tween)
    }

    fn add_to(&self, timeline: &mut Timeline) -> ScrollweaveResult<()> {
        let position = self.position.unwrap_or(Position::AfterPrevious);
        match &self.stagger {
            Some(stagger) => {
                let targets: Vec<TargetId> = (0..stagger.count)
                    .map(|i| TargetId::part(self.target, i))
                    .collect();
                let mut built = Vec::with_capacity(targets.len());
                for &t in &targets {
                    built.push(self.tween(t)?);
                }
                let mut built = built.into_iter();
                timeline.stagger(&targets, stagger.each, position, |_, t| {
                    built.next().unwrap_or_else(|| Tween::new(t, 0.0))
                })?;
            }
            None => {
                let target = TargetId {
                    element: self.target,
                    part: self.part,
                };
                timeline.add(self.tween(target)?, position)?;
            }
        }
        Ok(())
    }
}

fn default_toggle_actions() -> String {
    "play none none reverse".to_owned()
}

/// Declarative clock source.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PlaybackDef {
    /// Driven by the section trigger's progress.
    Scrubbed {
        /// Lag smoothing in seconds.
        #[serde(default)]
        smoothing: Option<f64>,
    },
    /// Own clock.
    Autonomous {
        /// Start delay in seconds.
        #[serde(default)]
        delay: f64,
        /// Extra iterations, `-1` for infinite.
        #[serde(default)]
        repeat: i64,
        /// Ping-pong iterations.
        #[serde(default)]
        yoyo: bool,
    },
    /// Own clock switched by the section trigger's crossings.
    Toggled {
        /// Four-word action list.
        #[serde(default = "default_toggle_actions")]
        toggle_actions: String,
    },
}

impl PlaybackDef {
    /// `true` when the clock is bound to the section trigger.
    pub fn needs_trigger(&self) -> bool {
        !matches!(self, Self::Autonomous { .. })
    }
}

/// Declarative timeline.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimelineDef {
    /// Clock source.
    pub playback: PlaybackDef,
    /// Tweens in insertion order.
    pub tweens: Vec<TweenDef>,
}

impl TimelineDef {
    /// Build the timeline, binding trigger-driven playback to `trigger`.
    pub fn build(&self, trigger: Option<TriggerId>) -> ScrollweaveResult<Timeline> {
        let need_trigger = || {
            trigger.ok_or_else(|| {
                ScrollweaveError::validation("trigger-driven timeline needs a section trigger")
            })
        };
        let mut timeline = match &self.playback {
            PlaybackDef::Scrubbed { smoothing } => {
                Timeline::scrubbed(need_trigger()?).with_smoothing(*smoothing)
            }
            PlaybackDef::Autonomous {
                delay,
                repeat,
                yoyo,
            } => Timeline::autonomous()
                .with_delay(*delay)
                .with_repeat(Repeat::from_count(*repeat), *yoyo),
            PlaybackDef::Toggled { toggle_actions } => {
                let actions: ToggleActions = toggle_actions.parse()?;
                Timeline::toggled(need_trigger()?, actions)
            }
        };
        timeline.validate()?;
        for tween in &self.tweens {
            tween.add_to(&mut timeline)?;
        }
        Ok(timeline)
    }
}

/// Declarative trigger.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriggerDef {
    /// Anchor element; omitted for page-level ranges.
    #[serde(default)]
    pub target: Option<ElementId>,
    /// Range start.
    pub start: Descriptor,
    /// Range end; `"bottom top"` when omitted.
    #[serde(default = "default_end")]
    pub end: Descriptor,
    /// Pin the target.
    #[serde(default)]
    pub pin: bool,
    /// `on_update` policy.
    #[serde(default)]
    pub update: UpdateMode,
}

fn default_end() -> Descriptor {
    Descriptor::anchored(Anchor::End, Anchor::Start)
}

impl TriggerDef {
    /// Registration request without callbacks.
    pub fn spec(&self) -> TriggerSpec {
        let mut spec = match self.target {
            Some(t) => TriggerSpec::new(t, self.start, self.end),
            None => TriggerSpec::page(self.start, self.end),
        };
        spec.pin = self.pin;
        spec.update = self.update;
        spec
    }
}

/// A mounted section described as data: an optional trigger and the timelines bound to it.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionDef {
    /// Section name, used in logs.
    pub name: String,
    /// Section trigger.
    #[serde(default)]
    pub trigger: Option<TriggerDef>,
    /// Timelines of the section.
    #[serde(default)]
    pub timelines: Vec<TimelineDef>,
}

impl SectionDef {
    /// Parse from JSON text.
    pub fn from_json_str(s: &str) -> ScrollweaveResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| ScrollweaveError::config(format!("section json parse failed: {e}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/def.rs"]
mod tests;
