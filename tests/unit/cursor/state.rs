use super::*;

fn state() -> CursorState {
    CursorState::new(CursorConfig::default()).unwrap()
}

#[test]
fn velocity_decays_to_zero_without_movement() {
    let mut s = state();
    s.pointer_moved(Point::new(100.0, 100.0));
    s.pointer_moved(Point::new(400.0, 300.0));
    s.update(None);
    assert_eq!(s.velocity(), 1.0);

    let mut last = s.velocity();
    for _ in 0..200 {
        s.update(None);
        assert!(s.velocity() <= last + 1e-12);
        last = s.velocity();
    }
    assert_eq!(s.velocity(), 0.0);
    assert_eq!(s.position(), Point::new(400.0, 300.0));
}

#[test]
fn first_move_places_cursor_without_trail() {
    let mut s = state();
    s.pointer_moved(Point::new(640.0, 360.0));
    s.update(None);
    assert_eq!(s.position(), Point::new(640.0, 360.0));
    assert_eq!(s.velocity(), 0.0);
}

#[test]
fn smoothing_covers_fixed_fraction_per_frame() {
    let mut s = state();
    s.pointer_moved(Point::new(0.0, 0.0));
    s.pointer_moved(Point::new(100.0, 0.0));
    s.update(None);
    assert!((s.position().x - 15.0).abs() < 1e-9);
    s.update(None);
    assert!((s.position().x - 27.75).abs() < 1e-9);
}

#[test]
fn non_finite_pointer_is_ignored() {
    let mut s = state();
    s.pointer_moved(Point::new(10.0, 10.0));
    s.pointer_moved(Point::new(f64::NAN, 10.0));
    s.update(None);
    assert_eq!(s.position(), Point::new(10.0, 10.0));
}

#[test]
fn time_uses_frame_delta_with_fallback() {
    let mut s = state();
    s.update(Some(0.05));
    assert!((s.time() - 0.05).abs() < 1e-12);
    s.update(None);
    s.update(Some(f64::NAN));
    s.update(Some(-1.0));
    assert!((s.time() - (0.05 + 3.0 / 60.0)).abs() < 1e-12);
}

#[test]
fn uniforms_flip_y_and_carry_surface_size() {
    let mut s = state();
    s.pointer_moved(Point::new(250.0, 125.0));
    s.update(Some(0.016));
    let u = s.uniforms(Viewport::new(1000.0, 500.0).unwrap());
    assert_eq!(u.mouse, [0.25, 0.75]);
    assert_eq!(u.resolution, [120.0, 120.0]);
    assert_eq!(u.velocity, 0.0);

    let bytes = u.to_le_bytes();
    assert_eq!(bytes[0..4], 0.016f32.to_le_bytes());
    assert_eq!(bytes[8..12], 0.25f32.to_le_bytes());
    assert_eq!(bytes[12..16], 0.75f32.to_le_bytes());
    assert_eq!(bytes[16..20], 120.0f32.to_le_bytes());
    assert_eq!(bytes[24..32], [0u8; 8]);
}

#[test]
fn degenerate_viewport_keeps_uniforms_finite() {
    let mut s = state();
    s.pointer_moved(Point::new(250.0, 125.0));
    s.update(None);
    let u = s.uniforms(Viewport {
        width: 0.0,
        height: 0.0,
    });
    assert_eq!(u.mouse, [0.5, 0.5]);
    let u = s.uniforms(Viewport {
        width: f64::INFINITY,
        height: 500.0,
    });
    assert_eq!(u.mouse, [0.5, 0.5]);

    s.pointer_moved(Point::new(5000.0, -300.0));
    for _ in 0..200 {
        s.update(None);
    }
    let u = s.uniforms(Viewport::new(1000.0, 500.0).unwrap());
    assert_eq!(u.mouse, [1.0, 1.0]);
}

#[test]
fn screen_transform_centres_surface_on_pointer() {
    let mut s = state();
    s.pointer_moved(Point::new(250.0, 125.0));
    s.update(None);
    let t = s.screen_transform();
    assert_eq!(t.translate, Vec2::new(190.0, 65.0));
    assert_eq!(t.scale, 1.0);
}

#[test]
fn hover_tweens_scale_in_and_out() {
    let mut s = state();
    s.set_hover(true);
    s.update(Some(0.15));
    let expected = 1.0 + 0.5 * s.config().hover_ease.apply(0.5);
    assert!((s.scale() - expected).abs() < 1e-12);
    assert!(s.scale() > 1.25 && s.scale() < 1.5);
    s.update(Some(0.2));
    assert_eq!(s.scale(), 1.5);

    // Repeated hover notifications do not restart the tween.
    s.set_hover(true);
    s.update(Some(0.01));
    assert_eq!(s.scale(), 1.5);

    s.set_hover(false);
    s.update(Some(0.3));
    assert_eq!(s.scale(), 1.0);
}

#[test]
fn config_validation_and_json() {
    let bad = CursorConfig {
        smoothing: 0.0,
        ..CursorConfig::default()
    };
    assert!(CursorState::new(bad).is_err());

    let cfg: CursorConfig =
        serde_json::from_str(r#"{ "smoothing": 0.2, "hover_ease": "expo.out" }"#).unwrap();
    assert_eq!(cfg.smoothing, 0.2);
    assert_eq!(cfg.hover_ease, Ease::Expo(EaseDir::Out));
    assert_eq!(cfg.size, 120);
    assert!(serde_json::from_str::<CursorConfig>(r#"{ "smooth": 0.2 }"#).is_err());
}
