use crate::cursor::backend::CursorSurface;
use crate::cursor::shader::field;
use crate::cursor::state::CursorUniforms;
use crate::foundation::error::{ScrollweaveError, ScrollweaveResult};

/// CPU rasterizer of the cursor program, one [`field`] evaluation per pixel centre.
#[derive(Debug)]
pub struct CpuCursorSurface {
    size: u32,
    target: Option<image::RgbaImage>,
    draws: u64,
}

impl CpuCursorSurface {
    /// Allocate a transparent `size × size` target.
    pub fn new(size: u32) -> Self {
        Self {
            size,
            target: Some(image::RgbaImage::new(size, size)),
            draws: 0,
        }
    }

    /// Frames drawn so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }
}

impl CursorSurface for CpuCursorSurface {
    fn size(&self) -> u32 {
        self.size
    }

    fn draw(&mut self, uniforms: &CursorUniforms) -> ScrollweaveResult<()> {
        let target = self
            .target
            .as_mut()
            .ok_or_else(|| ScrollweaveError::gpu("cursor surface was released"))?;
        let side = f64::from(self.size);
        for (x, y, px) in target.enumerate_pixels_mut() {
            // Row 0 is the top of the surface; uv has its origin bottom-left.
            let uv = [
                (f64::from(x) + 0.5) / side,
                1.0 - (f64::from(y) + 0.5) / side,
            ];
            let rgba = field(uv, uniforms);
            px.0 = rgba.map(|c| (c * 255.0).round() as u8);
        }
        self.draws += 1;
        Ok(())
    }

    fn read_frame(&mut self) -> ScrollweaveResult<image::RgbaImage> {
        self.target
            .clone()
            .ok_or_else(|| ScrollweaveError::gpu("cursor surface was released"))
    }

    fn release(&mut self) {
        if self.target.take().is_some() {
            tracing::debug!(size = self.size, "cpu cursor surface released");
        }
    }

    fn is_released(&self) -> bool {
        self.target.is_none()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cursor/cpu.rs"]
mod tests;
