//! Scrollweave is a scroll-synchronized animation engine.
//!
//! One [`Stage`] owns every moving part and is stepped once per host frame:
//!
//! - [`SmoothScroll`] turns wheel and touch deltas into an eased virtual scroll position
//! - [`TriggerRegistry`] maps that position onto per-element progress and fires crossings
//! - [`Timeline`]s are scrubbed by trigger progress or run on their own clock
//! - [`HorizontalScroll`] pins a section and converts vertical travel into strip translation
//! - [`CursorRenderer`] draws a procedural shader cursor that follows the pointer
//!
//! The host supplies geometry through [`Layout`] and receives animated values through a
//! [`PropertySink`]. Nothing on the frame path is fatal: failures degrade to warnings, inert
//! handles or [`PropertyFailure`] reports.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod cursor;
pub(crate) mod horizontal;
pub(crate) mod scroll;
pub(crate) mod stage;
pub(crate) mod timeline;
pub(crate) mod trigger;

pub use crate::foundation::core::{
    Axis, ElementId, Layout, Point, PointerKind, Rect, Rgba, ScrollDirection, StaticLayout,
    TargetId, Vec2, Viewport,
};
pub use crate::foundation::error::{ScrollweaveError, ScrollweaveResult};

pub use crate::animation::ease::{Ease, EaseDir};
pub use crate::animation::text::{TextUnit, TextUnits, UnitKind};
pub use crate::animation::tween::{PropertyTrack, Tween};
pub use crate::animation::value::{ClipShape, InterpString, Lerp, Value};
pub use crate::cursor::backend::{CursorSurface, SurfaceKind, create_surface};
pub use crate::cursor::cpu::CpuCursorSurface;
#[cfg(feature = "gpu")]
pub use crate::cursor::gpu::GpuCursorSurface;
pub use crate::cursor::renderer::CursorRenderer;
pub use crate::cursor::shader::{CURSOR_WGSL, field as cursor_field};
pub use crate::cursor::state::{CursorConfig, CursorState, CursorTransform, CursorUniforms};
pub use crate::horizontal::{HorizontalScroll, HorizontalSpec, strip_extent};
pub use crate::scroll::config::ScrollConfig;
pub use crate::scroll::engine::{
    InputSource, ScrollEvent, ScrollState, ScrollToHandle, ScrollToOptions, ScrollToStatus,
    SmoothScroll, Subscription,
};
pub use crate::stage::config::StageConfig;
pub use crate::stage::context::AnimationContext;
pub use crate::stage::driver::{ContextId, FrameReport, Stage};
pub use crate::timeline::compose::{Position, Timeline};
pub use crate::timeline::def::{
    PlaybackDef, SectionDef, StaggerDef, TimelineDef, TriggerDef, TweenDef,
};
pub use crate::timeline::playback::{Playback, Repeat, ToggleAction, ToggleActions};
pub use crate::timeline::sink::{PropertyFailure, PropertySink, PropertyStore};
pub use crate::trigger::descriptor::{Anchor, Descriptor, Length, Span};
pub use crate::trigger::registry::{
    ContainerSpace, Phase, TransitionKind, TriggerCallbacks, TriggerEvent, TriggerHandle,
    TriggerId, TriggerRegistry, TriggerSpec, TriggerState, UpdateMode,
};
