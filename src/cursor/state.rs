use crate::animation::ease::{Ease, EaseDir};
use crate::foundation::core::{Point, Vec2, Viewport};
use crate::foundation::error::{ScrollweaveError, ScrollweaveResult};
use crate::foundation::math::{clamp01, lerp};

/// Tuning of the shader cursor.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CursorConfig {
    /// Fraction of the remaining distance to the pointer covered each frame.
    pub smoothing: f64,
    /// Gain from pixels moved per frame to shader velocity.
    pub velocity_scale: f64,
    /// Upper bound of the shader velocity.
    pub max_velocity: f64,
    /// Side of the square cursor surface in pixels.
    pub size: u32,
    /// Scale while hovering an interactive element.
    pub hover_scale: f64,
    /// Seconds of the hover scale tween.
    pub hover_duration: f64,
    /// Easing of the hover scale tween.
    pub hover_ease: Ease,
    /// Frame delta used when the host reports none.
    pub fallback_dt: f64,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            smoothing: 0.15,
            velocity_scale: 0.1,
            max_velocity: 1.0,
            size: 120,
            hover_scale: 1.5,
            hover_duration: 0.3,
            hover_ease: Ease::Power {
                power: 2,
                dir: EaseDir::Out,
            },
            fallback_dt: 1.0 / 60.0,
        }
    }
}

impl CursorConfig {
    /// Check every field is usable by the per-frame update.
    pub fn validate(&self) -> ScrollweaveResult<()> {
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Err(ScrollweaveError::config(format!(
                "cursor.smoothing must be in (0, 1], got {}",
                self.smoothing
            )));
        }
        let positive = [
            ("velocity_scale", self.velocity_scale),
            ("max_velocity", self.max_velocity),
            ("hover_scale", self.hover_scale),
            ("fallback_dt", self.fallback_dt),
        ];
        for (name, v) in positive {
            if !v.is_finite() || v <= 0.0 {
                return Err(ScrollweaveError::config(format!(
                    "cursor.{name} must be finite and > 0, got {v}"
                )));
            }
        }
        if !self.hover_duration.is_finite() || self.hover_duration < 0.0 {
            return Err(ScrollweaveError::config(format!(
                "cursor.hover_duration must be finite and >= 0, got {}",
                self.hover_duration
            )));
        }
        if self.size == 0 {
            return Err(ScrollweaveError::config("cursor.size must be > 0"));
        }
        self.hover_ease.validate()
    }
}

/// Per-frame inputs of the cursor fragment program.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CursorUniforms {
    /// Accumulated seconds.
    pub time: f64,
    /// Smoothed pointer in normalized viewport space, y pointing up.
    pub mouse: [f64; 2],
    /// Cursor surface size in pixels.
    pub resolution: [f64; 2],
    /// Clamped pointer speed.
    pub velocity: f64,
}

impl CursorUniforms {
    /// Size of the packed uniform block.
    pub const BYTES: usize = 32;

    /// Pack as the `std140`-compatible block read by the WGSL program:
    /// `time, velocity, mouse.xy, resolution.xy`, padded to 32 bytes.
    pub fn to_le_bytes(&self) -> [u8; Self::BYTES] {
        let fields = [
            self.time as f32,
            self.velocity as f32,
            self.mouse[0] as f32,
            self.mouse[1] as f32,
            self.resolution[0] as f32,
            self.resolution[1] as f32,
            0.0,
            0.0,
        ];
        let mut out = [0u8; Self::BYTES];
        for (chunk, v) in out.chunks_exact_mut(4).zip(fields) {
            chunk.copy_from_slice(&v.to_le_bytes());
        }
        out
    }
}

/// Screen-space placement of the cursor surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CursorTransform {
    /// Top-left offset of the surface.
    pub translate: Vec2,
    /// Uniform scale around the surface centre.
    pub scale: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct ScaleTween {
    from: f64,
    to: f64,
    elapsed: f64,
}

/// Pointer smoothing, velocity and hover scale of the cursor.
#[derive(Clone, Debug)]
pub struct CursorState {
    config: CursorConfig,
    target: Option<Point>,
    position: Point,
    previous: Point,
    velocity: f64,
    time: f64,
    scale: f64,
    hover: bool,
    tween: Option<ScaleTween>,
}

impl CursorState {
    /// Settle distance below which the smoothed pointer snaps onto the target.
    const SNAP: f64 = 1e-3;

    /// Idle state; the first pointer move places the cursor without a trail.
    pub fn new(config: CursorConfig) -> ScrollweaveResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            target: None,
            position: Point::ZERO,
            previous: Point::ZERO,
            velocity: 0.0,
            time: 0.0,
            scale: 1.0,
            hover: false,
            tween: None,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &CursorConfig {
        &self.config
    }

    /// Record the latest raw pointer position in viewport pixels.
    pub fn pointer_moved(&mut self, p: Point) {
        if !p.x.is_finite() || !p.y.is_finite() {
            return;
        }
        if self.target.is_none() {
            self.position = p;
            self.previous = p;
        }
        self.target = Some(p);
    }

    /// Enter or leave an interactive element, starting the scale tween.
    pub fn set_hover(&mut self, hover: bool) {
        if self.hover == hover {
            return;
        }
        self.hover = hover;
        let to = if hover { self.config.hover_scale } else { 1.0 };
        self.tween = Some(ScaleTween {
            from: self.scale,
            to,
            elapsed: 0.0,
        });
    }

    /// Advance one frame. `dt` falls back to the configured step when absent or invalid.
    pub fn update(&mut self, dt: Option<f64>) {
        let dt = dt
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(self.config.fallback_dt);
        self.time += dt;

        if let Some(target) = self.target {
            let next = self.position.lerp(target, self.config.smoothing);
            self.position = if next.distance(target) < Self::SNAP {
                target
            } else {
                next
            };
        }
        let moved = self.position.distance(self.previous);
        self.velocity = (moved * self.config.velocity_scale).min(self.config.max_velocity);
        self.previous = self.position;

        if let Some(mut tween) = self.tween {
            tween.elapsed += dt;
            let t = if self.config.hover_duration > 0.0 {
                tween.elapsed / self.config.hover_duration
            } else {
                1.0
            };
            if t >= 1.0 {
                self.scale = tween.to;
                self.tween = None;
            } else {
                self.scale = lerp(tween.from, tween.to, self.config.hover_ease.apply(t));
                self.tween = Some(tween);
            }
        }
    }

    /// Smoothed pointer position.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Shader velocity of the last frame, in `[0, max_velocity]`.
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Accumulated seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Current hover scale.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Uniforms for the current frame; the pointer is normalized with y flipped.
    pub fn uniforms(&self, viewport: Viewport) -> CursorUniforms {
        let size = f64::from(self.config.size);
        let (w, h) = (viewport.width, viewport.height);
        let mouse = if w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0 {
            [
                clamp01(self.position.x / w),
                clamp01(1.0 - self.position.y / h),
            ]
        } else {
            [0.5, 0.5]
        };
        CursorUniforms {
            time: self.time,
            mouse,
            resolution: [size, size],
            velocity: self.velocity,
        }
    }

    /// Placement of the surface centred on the smoothed pointer.
    pub fn screen_transform(&self) -> CursorTransform {
        let half = f64::from(self.config.size) / 2.0;
        CursorTransform {
            translate: Vec2::new(self.position.x - half, self.position.y - half),
            scale: self.scale,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cursor/state.rs"]
mod tests;
