//! Cursor fragment program.
//!
//! [`CURSOR_WGSL`] runs on the GPU backend; [`field`] is its CPU reference and evaluates the
//! same expression tree in `f64`. Both sample a 2D simplex noise, layer five octaves of it into
//! a turbulence term and combine three distorted rings, a core glow and a velocity trail under
//! a circular edge fade.

use crate::cursor::state::CursorUniforms;
use crate::foundation::math::smoothstep;

/// WGSL source: vertex stage `vs` over a two-triangle quad, fragment stage `fs`.
pub const CURSOR_WGSL: &str = r#"
struct Uniforms {
  time: f32,
  velocity: f32,
  mouse: vec2<f32>,
  resolution: vec2<f32>,
  pad: vec2<f32>,
};

@group(0) @binding(0) var<uniform> u: Uniforms;

struct VsOut {
  @builtin(position) pos: vec4<f32>,
  @location(0) uv: vec2<f32>,
};

@vertex
fn vs(@location(0) pos: vec2<f32>) -> VsOut {
  var o: VsOut;
  o.pos = vec4<f32>(pos, 0.0, 1.0);
  o.uv = (pos + vec2<f32>(1.0, 1.0)) * 0.5;
  return o;
}

fn mod289_3(x: vec3<f32>) -> vec3<f32> {
  return x - floor(x * (1.0 / 289.0)) * 289.0;
}

fn mod289_2(x: vec2<f32>) -> vec2<f32> {
  return x - floor(x * (1.0 / 289.0)) * 289.0;
}

fn permute(x: vec3<f32>) -> vec3<f32> {
  return mod289_3(((x * 34.0) + 1.0) * x);
}

fn snoise(v: vec2<f32>) -> f32 {
  let C = vec4<f32>(0.211324865405187, 0.366025403784439, -0.577350269189626, 0.024390243902439);
  var i = floor(v + dot(v, C.yy));
  let x0 = v - i + dot(i, C.xx);
  var i1 = vec2<f32>(0.0, 1.0);
  if (x0.x > x0.y) {
    i1 = vec2<f32>(1.0, 0.0);
  }
  var x12 = x0.xyxy + C.xxzz;
  x12 = vec4<f32>(x12.xy - i1, x12.zw);
  i = mod289_2(i);
  let p = permute(permute(i.y + vec3<f32>(0.0, i1.y, 1.0)) + i.x + vec3<f32>(0.0, i1.x, 1.0));
  var m = max(0.5 - vec3<f32>(dot(x0, x0), dot(x12.xy, x12.xy), dot(x12.zw, x12.zw)), vec3<f32>(0.0));
  m = m * m;
  m = m * m;
  let x = 2.0 * fract(p * C.www) - 1.0;
  let h = abs(x) - 0.5;
  let ox = floor(x + 0.5);
  let a0 = x - ox;
  m = m * (1.79284291400159 - 0.85373472095314 * (a0 * a0 + h * h));
  let g = vec3<f32>(a0.x * x0.x + h.x * x0.y, a0.yz * x12.xz + h.yz * x12.yw);
  return 130.0 * dot(m, g);
}

fn fbm(p: vec2<f32>) -> f32 {
  var value = 0.0;
  var amplitude = 0.5;
  var frequency = 1.0;
  for (var i = 0; i < 5; i++) {
    value += amplitude * snoise(p * frequency);
    amplitude *= 0.5;
    frequency *= 2.0;
  }
  return value;
}

fn ramp(e0: f32, e1: f32, x: f32) -> f32 {
  let t = clamp((x - e0) / (e1 - e0), 0.0, 1.0);
  return t * t * (3.0 - 2.0 * t);
}

@fragment
fn fs(in: VsOut) -> @location(0) vec4<f32> {
  let uv = in.uv;
  let to_center = uv - vec2<f32>(0.5, 0.5);
  let dist = length(to_center);
  let t = u.time;

  let n1 = fbm(to_center * 3.0 + t * 0.5);
  let n2 = fbm(to_center * 5.0 - t * 0.3);
  let n3 = fbm(to_center * 8.0 + t * 0.2);
  let mouse_factor = ramp(0.5, 0.0, length(uv - u.mouse));
  let turbulence = n1 * 0.5 + n2 * 0.3 + n3 * 0.2 + mouse_factor * 0.3;

  let warp = sin(dist * 20.0 - t * 2.0 + turbulence * 3.0) * 0.5 + 0.5;
  let ring1 = ramp(0.15, 0.12, abs(dist - 0.25 + turbulence * 0.05));
  let ring2 = ramp(0.08, 0.05, abs(dist - 0.35 + turbulence * 0.03));
  let ring3 = ramp(0.05, 0.02, abs(dist - 0.15 + turbulence * 0.08));
  let core = ramp(0.08, 0.0, dist);

  var pattern = ring1 * 0.4 + ring2 * 0.3 + ring3 * 0.5 + core * 0.8;
  pattern *= 0.7 + warp * 0.3;
  pattern += ramp(0.4, 0.0, dist) * u.velocity * 0.5;

  let color = pattern * (0.9 + turbulence * 0.2);
  let edge_fade = ramp(0.5, 0.3, dist);
  return vec4<f32>(vec3<f32>(color), pattern * edge_fade * 0.9);
}
"#;

const C: [f64; 4] = [
    0.211324865405187,
    0.366025403784439,
    -0.577350269189626,
    0.024390243902439,
];

fn mod289(x: f64) -> f64 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

fn permute(x: f64) -> f64 {
    mod289((x * 34.0 + 1.0) * x)
}

fn fract(x: f64) -> f64 {
    x - x.floor()
}

/// 2D simplex noise in roughly `[-1, 1]`.
pub fn snoise(v: [f64; 2]) -> f64 {
    let s = (v[0] + v[1]) * C[1];
    let i = [(v[0] + s).floor(), (v[1] + s).floor()];
    let t = (i[0] + i[1]) * C[0];
    let x0 = [v[0] - i[0] + t, v[1] - i[1] + t];
    let i1 = if x0[0] > x0[1] { [1.0, 0.0] } else { [0.0, 1.0] };
    let corners = [
        x0,
        [x0[0] + C[0] - i1[0], x0[1] + C[0] - i1[1]],
        [x0[0] + C[2], x0[1] + C[2]],
    ];

    let i = [mod289(i[0]), mod289(i[1])];
    let ox = [0.0, i1[0], 1.0];
    let oy = [0.0, i1[1], 1.0];

    let mut sum = 0.0;
    for k in 0..3 {
        let p = permute(permute(i[1] + oy[k]) + i[0] + ox[k]);
        let c = corners[k];
        let mut m = (0.5 - (c[0] * c[0] + c[1] * c[1])).max(0.0);
        m *= m;
        m *= m;
        let x = 2.0 * fract(p * C[3]) - 1.0;
        let h = x.abs() - 0.5;
        let a0 = x - (x + 0.5).floor();
        m *= 1.79284291400159 - 0.85373472095314 * (a0 * a0 + h * h);
        sum += m * (a0 * c[0] + h * c[1]);
    }
    130.0 * sum
}

/// Five octaves of [`snoise`], amplitude halving and frequency doubling.
pub fn fbm(p: [f64; 2]) -> f64 {
    let mut value = 0.0;
    let mut amplitude = 0.5;
    let mut frequency = 1.0;
    for _ in 0..5 {
        value += amplitude * snoise([p[0] * frequency, p[1] * frequency]);
        amplitude *= 0.5;
        frequency *= 2.0;
    }
    value
}

/// Evaluate the fragment program at `uv` (origin bottom-left, `[0, 1]²`).
///
/// Returns straight-alpha `[r, g, b, a]`, each clamped into `[0, 1]` the way a unorm target
/// stores them.
pub fn field(uv: [f64; 2], u: &CursorUniforms) -> [f64; 4] {
    let tc = [uv[0] - 0.5, uv[1] - 0.5];
    let dist = tc[0].hypot(tc[1]);
    let t = u.time;

    let n1 = fbm([tc[0] * 3.0 + t * 0.5, tc[1] * 3.0 + t * 0.5]);
    let n2 = fbm([tc[0] * 5.0 - t * 0.3, tc[1] * 5.0 - t * 0.3]);
    let n3 = fbm([tc[0] * 8.0 + t * 0.2, tc[1] * 8.0 + t * 0.2]);
    let mouse_dist = (uv[0] - u.mouse[0]).hypot(uv[1] - u.mouse[1]);
    let mouse_factor = smoothstep(0.5, 0.0, mouse_dist);
    let turbulence = n1 * 0.5 + n2 * 0.3 + n3 * 0.2 + mouse_factor * 0.3;

    let warp = (dist * 20.0 - t * 2.0 + turbulence * 3.0).sin() * 0.5 + 0.5;
    let ring1 = smoothstep(0.15, 0.12, (dist - 0.25 + turbulence * 0.05).abs());
    let ring2 = smoothstep(0.08, 0.05, (dist - 0.35 + turbulence * 0.03).abs());
    let ring3 = smoothstep(0.05, 0.02, (dist - 0.15 + turbulence * 0.08).abs());
    let core = smoothstep(0.08, 0.0, dist);

    let mut pattern = ring1 * 0.4 + ring2 * 0.3 + ring3 * 0.5 + core * 0.8;
    pattern *= 0.7 + warp * 0.3;
    pattern += smoothstep(0.4, 0.0, dist) * u.velocity * 0.5;

    let color = (pattern * (0.9 + turbulence * 0.2)).clamp(0.0, 1.0);
    let alpha = (pattern * smoothstep(0.5, 0.3, dist) * 0.9).clamp(0.0, 1.0);
    [color, color, color, alpha]
}

#[cfg(test)]
#[path = "../../tests/unit/cursor/shader.rs"]
mod tests;
