use crate::cursor::state::CursorUniforms;
use crate::foundation::error::{ScrollweaveError, ScrollweaveResult};

/// Drawing target of the cursor: one square surface, one quad, one fragment program.
///
/// `release` frees every resource and is idempotent; drawing after release is an error.
pub trait CursorSurface {
    /// Side of the surface in pixels.
    fn size(&self) -> u32;

    /// Render one frame with `uniforms`.
    fn draw(&mut self, uniforms: &CursorUniforms) -> ScrollweaveResult<()>;

    /// Copy the last drawn frame to host memory as straight-alpha RGBA8.
    fn read_frame(&mut self) -> ScrollweaveResult<image::RgbaImage>;

    /// Free the surface, quad and program.
    fn release(&mut self);

    /// `true` once [`CursorSurface::release`] ran.
    fn is_released(&self) -> bool;
}

/// Available cursor backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceKind {
    /// Reference rasterizer on the CPU.
    Cpu,
    /// `wgpu` render pipeline.
    #[cfg(feature = "gpu")]
    Gpu,
}

/// Allocate a cursor surface of `size × size` pixels.
pub fn create_surface(kind: SurfaceKind, size: u32) -> ScrollweaveResult<Box<dyn CursorSurface>> {
    if size == 0 {
        return Err(ScrollweaveError::gpu("cursor surface size must be > 0"));
    }
    match kind {
        SurfaceKind::Cpu => Ok(Box::new(crate::cursor::cpu::CpuCursorSurface::new(size))),
        #[cfg(feature = "gpu")]
        SurfaceKind::Gpu => Ok(Box::new(crate::cursor::gpu::GpuCursorSurface::new(size)?)),
    }
}
