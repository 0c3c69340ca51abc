use crate::cursor::backend::{CursorSurface, SurfaceKind, create_surface};
use crate::cursor::state::{CursorConfig, CursorState, CursorTransform};
use crate::foundation::core::{Point, PointerKind, Viewport};
use crate::foundation::error::{ScrollweaveError, ScrollweaveResult};

/// Shader cursor following the pointer.
///
/// Only fine pointers get a surface. A backend that cannot allocate leaves the renderer
/// disabled: every call is then a no-op and nothing propagates to the frame loop.
pub struct CursorRenderer {
    state: CursorState,
    surface: Option<Box<dyn CursorSurface>>,
    draws: u64,
}

impl std::fmt::Debug for CursorRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorRenderer")
            .field("state", &self.state)
            .field("active", &self.is_active())
            .field("draws", &self.draws)
            .finish()
    }
}

impl CursorRenderer {
    /// Enable on `pointer` with a built-in backend.
    pub fn enable(
        pointer: PointerKind,
        config: CursorConfig,
        kind: SurfaceKind,
    ) -> ScrollweaveResult<Self> {
        Self::enable_with(pointer, config, |size| create_surface(kind, size))
    }

    /// Enable on `pointer`, allocating the surface through `factory`.
    ///
    /// Only an invalid `config` is an error; a failing factory yields a disabled renderer.
    #[tracing::instrument(skip_all, fields(pointer = ?pointer))]
    pub fn enable_with(
        pointer: PointerKind,
        config: CursorConfig,
        factory: impl FnOnce(u32) -> ScrollweaveResult<Box<dyn CursorSurface>>,
    ) -> ScrollweaveResult<Self> {
        let size = config.size;
        let state = CursorState::new(config)?;
        let surface = match pointer {
            PointerKind::Coarse => {
                tracing::debug!("coarse pointer, cursor stays disabled");
                None
            }
            PointerKind::Fine => match factory(size) {
                Ok(surface) => Some(surface),
                Err(err) => {
                    tracing::warn!(%err, "cursor surface unavailable, cursor disabled");
                    None
                }
            },
        };
        Ok(Self {
            state,
            surface,
            draws: 0,
        })
    }

    /// `true` while a surface is allocated.
    pub fn is_active(&self) -> bool {
        self.surface.is_some()
    }

    /// Pointer smoothing and hover state.
    pub fn state(&self) -> &CursorState {
        &self.state
    }

    /// Record a raw pointer move.
    pub fn pointer_moved(&mut self, p: Point) {
        self.state.pointer_moved(p);
    }

    /// Enter or leave an interactive element.
    pub fn set_hover(&mut self, hover: bool) {
        self.state.set_hover(hover);
    }

    /// Placement of the cursor surface on screen.
    pub fn screen_transform(&self) -> CursorTransform {
        self.state.screen_transform()
    }

    /// Frames drawn since enabling.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Advance smoothing and issue one draw. Returns `true` if a frame was drawn.
    ///
    /// A failing draw disables the renderer with a single warning.
    pub fn frame(&mut self, dt: Option<f64>, viewport: Viewport) -> bool {
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        self.state.update(dt);
        let uniforms = self.state.uniforms(viewport);
        match surface.draw(&uniforms) {
            Ok(()) => {
                self.draws += 1;
                true
            }
            Err(err) => {
                tracing::warn!(%err, "cursor draw failed, cursor disabled");
                self.disable();
                false
            }
        }
    }

    /// Copy the last drawn frame to host memory.
    pub fn read_frame(&mut self) -> ScrollweaveResult<image::RgbaImage> {
        self.surface
            .as_mut()
            .ok_or_else(|| ScrollweaveError::gpu("cursor is disabled"))?
            .read_frame()
    }

    /// Release the surface, quad and program. Idempotent.
    pub fn disable(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            surface.release();
            tracing::debug!(draws = self.draws, "cursor disabled");
        }
    }
}

impl Drop for CursorRenderer {
    fn drop(&mut self) {
        self.disable();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cursor/renderer.rs"]
mod tests;
