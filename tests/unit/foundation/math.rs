use super::*;

#[test]
fn smoothstep_handles_inverted_edges() {
    assert_eq!(smoothstep(0.0, 1.0, 0.5), 0.5);
    assert_eq!(smoothstep(0.5, 0.0, 0.0), 1.0);
    assert_eq!(smoothstep(0.5, 0.0, 0.6), 0.0);
    assert_eq!(smoothstep(0.2, 0.2, 0.1), 0.0);
}

#[test]
fn exp_decay_alpha_is_bounded() {
    assert_eq!(exp_decay_alpha(10.0, 0.0), 0.0);
    assert_eq!(exp_decay_alpha(10.0, 0.1), 0.5);
    assert!(exp_decay_alpha(10.0, 100.0) <= 1.0);
}

#[test]
fn clamp_abs_drops_non_finite() {
    assert_eq!(clamp_abs(f64::INFINITY, 10.0), 0.0);
    assert_eq!(clamp_abs(-50.0, 10.0), -10.0);
    assert_eq!(clamp01(f64::NAN), 0.0);
}
