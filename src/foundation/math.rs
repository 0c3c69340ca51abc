/// Linear interpolation.
pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Clamp into `[0, 1]`, mapping NaN to 0.
pub(crate) fn clamp01(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

/// Hermite smoothstep. `e0 > e1` yields the inverted ramp, like GLSL.
pub(crate) fn smoothstep(e0: f64, e1: f64, x: f64) -> f64 {
    if e0 == e1 {
        return if x < e0 { 0.0 } else { 1.0 };
    }
    let t = clamp01((x - e0) / (e1 - e0));
    t * t * (3.0 - 2.0 * t)
}

/// Fraction of the remaining distance covered after `t` units of exponential decay with rate
/// `k`: `min(1, 1 - 2^(-k t))`.
pub(crate) fn exp_decay_alpha(k: f64, t: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    (1.0 - (-k * t).exp2()).min(1.0)
}

/// Replace non-finite values with `fallback`.
pub(crate) fn finite_or(x: f64, fallback: f64) -> f64 {
    if x.is_finite() { x } else { fallback }
}

/// Symmetric clamp of `x` into `[-limit, limit]`, dropping non-finite input to 0.
pub(crate) fn clamp_abs(x: f64, limit: f64) -> f64 {
    finite_or(x, 0.0).clamp(-limit, limit)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
