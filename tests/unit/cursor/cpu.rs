use super::*;

fn uniforms() -> CursorUniforms {
    CursorUniforms {
        time: 0.5,
        mouse: [0.5, 0.5],
        resolution: [64.0, 64.0],
        velocity: 0.3,
    }
}

#[test]
fn draw_fills_soft_circle() {
    let mut s = CpuCursorSurface::new(64);
    s.draw(&uniforms()).unwrap();
    assert_eq!(s.draws(), 1);
    let img = s.read_frame().unwrap();
    assert_eq!(img.dimensions(), (64, 64));
    for (x, y) in [(0, 0), (63, 0), (0, 63), (63, 63)] {
        assert_eq!(img.get_pixel(x, y).0[3], 0, "corner ({x}, {y})");
    }
    assert!(img.get_pixel(32, 32).0[3] > 100);
}

#[test]
fn release_is_idempotent_and_final() {
    let mut s = CpuCursorSurface::new(16);
    assert!(!s.is_released());
    s.release();
    s.release();
    assert!(s.is_released());
    assert!(s.draw(&uniforms()).is_err());
    assert!(s.read_frame().is_err());
}
