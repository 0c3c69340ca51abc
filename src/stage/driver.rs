use std::fmt;

use crate::cursor::backend::{CursorSurface, SurfaceKind, create_surface};
use crate::cursor::renderer::CursorRenderer;
use crate::foundation::core::{ElementId, Layout, PointerKind};
use crate::foundation::error::ScrollweaveResult;
use crate::scroll::engine::{ScrollToHandle, ScrollToOptions, SmoothScroll};
use crate::stage::config::StageConfig;
use crate::stage::context::AnimationContext;
use crate::timeline::def::SectionDef;
use crate::timeline::sink::{PropertyFailure, PropertySink};
use crate::trigger::registry::{TriggerEvent, TriggerRegistry};

/// Handle of a mounted [`AnimationContext`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub u32);

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "context#{}", self.0)
    }
}

/// What one frame did.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    /// Frame counter, starting at 1.
    pub frame: u64,
    /// Virtual scroll position after the scroll step.
    pub position: f64,
    /// Trigger crossings in firing order.
    pub events: Vec<TriggerEvent>,
    /// Property writes that failed this frame.
    pub failures: Vec<PropertyFailure>,
    /// `true` if the cursor issued a draw.
    pub cursor_drawn: bool,
}

/// The whole engine: smooth scroll, trigger registry, mounted sections and the cursor, stepped
/// once per host frame.
pub struct Stage<L: Layout> {
    config: StageConfig,
    layout: L,
    scroll: SmoothScroll,
    registry: TriggerRegistry,
    contexts: Vec<(ContextId, AnimationContext)>,
    cursor: Option<CursorRenderer>,
    next_context: u32,
    frame: u64,
}

impl<L: Layout> fmt::Debug for Stage<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("frame", &self.frame)
            .field("scroll", &self.scroll)
            .field("registry", &self.registry)
            .field("contexts", &self.contexts.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}

impl<L: Layout> Stage<L> {
    /// Build a stage over `layout`.
    pub fn new(config: StageConfig, layout: L) -> ScrollweaveResult<Self> {
        config.validate()?;
        let scroll = SmoothScroll::new(config.scroll.clone())?;
        let mut stage = Self {
            config,
            layout,
            scroll,
            registry: TriggerRegistry::new(),
            contexts: Vec::new(),
            cursor: None,
            next_context: 0,
            frame: 0,
        };
        stage.update_limit();
        Ok(stage)
    }

    /// Active configuration.
    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Host geometry.
    pub fn layout(&self) -> &L {
        &self.layout
    }

    /// Mutable host geometry. Call [`Stage::resize`] after changing it.
    pub fn layout_mut(&mut self) -> &mut L {
        &mut self.layout
    }

    /// Smooth scroll engine (input, subscriptions, programmatic scroll).
    pub fn scroll(&self) -> &SmoothScroll {
        &self.scroll
    }

    /// Mutable smooth scroll engine.
    pub fn scroll_mut(&mut self) -> &mut SmoothScroll {
        &mut self.scroll
    }

    /// Trigger registry.
    pub fn registry(&self) -> &TriggerRegistry {
        &self.registry
    }

    /// Frames stepped so far.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Mount a section described as data.
    pub fn mount(&mut self, def: &SectionDef) -> ScrollweaveResult<ContextId> {
        self.mount_with(&def.name, |ctx, registry, layout| {
            ctx.mount_section(registry, layout, def)
        })
    }

    /// Mount a section built in code. On error every trigger the closure registered is
    /// disposed again.
    pub fn mount_with(
        &mut self,
        name: &str,
        build: impl FnOnce(&mut AnimationContext, &mut TriggerRegistry, &dyn Layout) -> ScrollweaveResult<()>,
    ) -> ScrollweaveResult<ContextId> {
        let mut ctx = AnimationContext::new(name);
        if let Err(err) = build(&mut ctx, &mut self.registry, &self.layout) {
            ctx.revert();
            self.registry.refresh(&self.layout);
            return Err(err);
        }
        let id = ContextId(self.next_context);
        self.next_context += 1;
        self.contexts.push((id, ctx));
        self.update_limit();
        Ok(id)
    }

    /// A mounted context.
    pub fn context(&self, id: ContextId) -> Option<&AnimationContext> {
        self.contexts.iter().find(|(c, _)| *c == id).map(|(_, ctx)| ctx)
    }

    /// Mutable access to a mounted context.
    pub fn context_mut(&mut self, id: ContextId) -> Option<&mut AnimationContext> {
        self.contexts
            .iter_mut()
            .find(|(c, _)| *c == id)
            .map(|(_, ctx)| ctx)
    }

    /// Revert and forget a context. Returns `false` if it was not mounted.
    pub fn unmount(&mut self, id: ContextId) -> bool {
        let Some(idx) = self.contexts.iter().position(|(c, _)| *c == id) else {
            return false;
        };
        let (_, mut ctx) = self.contexts.remove(idx);
        ctx.revert();
        self.registry.refresh(&self.layout);
        self.update_limit();
        true
    }

    /// Re-resolve every range after the viewport or content changed.
    #[tracing::instrument(skip_all)]
    pub fn resize(&mut self) {
        for (_, ctx) in &mut self.contexts {
            ctx.refresh_horizontals(&mut self.registry, &self.layout);
        }
        self.registry.refresh(&self.layout);
        self.update_limit();
    }

    /// Scroll to the top of `element`, accounting for pin spacing above it.
    pub fn scroll_to_element(
        &mut self,
        element: ElementId,
        options: ScrollToOptions,
    ) -> Option<ScrollToHandle> {
        let Some(top) = self.registry.document_offset(&self.layout, element) else {
            tracing::debug!(element = element.0, "scroll target missing");
            return None;
        };
        Some(self.scroll.scroll_to(top, options))
    }

    /// Enable the shader cursor with a built-in backend.
    pub fn enable_cursor(&mut self, pointer: PointerKind, kind: SurfaceKind) -> ScrollweaveResult<()> {
        self.enable_cursor_with(pointer, |size| create_surface(kind, size))
    }

    /// Enable the shader cursor through a custom surface factory.
    pub fn enable_cursor_with(
        &mut self,
        pointer: PointerKind,
        factory: impl FnOnce(u32) -> ScrollweaveResult<Box<dyn CursorSurface>>,
    ) -> ScrollweaveResult<()> {
        self.disable_cursor();
        let cursor = CursorRenderer::enable_with(pointer, self.config.cursor.clone(), factory)?;
        self.cursor = Some(cursor);
        Ok(())
    }

    /// Release the cursor. Idempotent.
    pub fn disable_cursor(&mut self) {
        if let Some(mut cursor) = self.cursor.take() {
            cursor.disable();
        }
    }

    /// The cursor, if enabled.
    pub fn cursor(&self) -> Option<&CursorRenderer> {
        self.cursor.as_ref()
    }

    /// Mutable cursor, for pointer and hover input.
    pub fn cursor_mut(&mut self) -> Option<&mut CursorRenderer> {
        self.cursor.as_mut()
    }

    /// Step one frame of `dt` seconds in the fixed order: scroll, triggers, scrubbed
    /// timelines, own-clock timelines, cursor.
    pub fn frame(&mut self, dt: f64, sink: &mut dyn PropertySink) -> FrameReport {
        self.frame += 1;

        self.scroll.tick(dt);
        let position = self.scroll.position();

        let events = self.registry.update(position).to_vec();

        let mut failures = Vec::new();
        for (_, ctx) in &mut self.contexts {
            ctx.drive_scrubbed(&self.registry, dt, sink, &mut failures);
        }
        for (_, ctx) in &mut self.contexts {
            ctx.drive_clocks(&events, dt, sink, &mut failures);
        }
        if let Some(first) = failures.first() {
            tracing::warn!(
                frame = self.frame,
                count = failures.len(),
                target = %first.target,
                property = %first.property,
                error = %first.message,
                "property writes failed"
            );
        }

        let viewport = self.layout.viewport();
        let cursor_drawn = self
            .cursor
            .as_mut()
            .is_some_and(|c| c.frame(Some(dt), viewport));

        FrameReport {
            frame: self.frame,
            position,
            events,
            failures,
            cursor_drawn,
        }
    }

    fn update_limit(&mut self) {
        let vh = self.layout.viewport().height;
        let limit = self.layout.document_height() - vh + self.registry.pin_spacing();
        self.scroll.set_limit(limit.max(0.0));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stage/driver.rs"]
mod tests;
