use super::*;
use crate::animation::value::Value;
use crate::foundation::core::{Rect, StaticLayout, TargetId, Viewport};
use crate::foundation::error::ScrollweaveError;
use crate::horizontal::HorizontalSpec;
use crate::timeline::sink::PropertyStore;
use crate::trigger::registry::TransitionKind;

const DT: f64 = 1.0 / 60.0;

const FADE: &str = r#"{
    "name": "fade",
    "trigger": { "target": 20, "start": "top bottom", "end": "bottom top" },
    "timelines": [
        {
            "playback": { "mode": "scrubbed" },
            "tweens": [
                { "target": 21, "from": { "opacity": 0 }, "to": { "opacity": 1 }, "duration": 2, "ease": "none" }
            ]
        }
    ]
}"#;

const REVEAL: &str = r#"{
    "name": "reveal",
    "trigger": { "target": 30, "start": "top 80%", "end": "bottom top" },
    "timelines": [
        {
            "playback": { "mode": "toggled", "toggle_actions": "play none none reverse" },
            "tweens": [
                { "target": 31, "from": { "y": 50 }, "to": { "y": 0 }, "duration": 0.5, "ease": "none" }
            ]
        }
    ]
}"#;

fn layout() -> StaticLayout {
    let mut l = StaticLayout::new(Viewport::new(1280.0, 800.0).unwrap());
    l.insert(ElementId(20), Rect::new(0.0, 2000.0, 1280.0, 2800.0))
        .insert(ElementId(30), Rect::new(0.0, 3200.0, 1280.0, 4000.0));
    l.set_document_height(5000.0);
    l
}

fn stage() -> Stage<StaticLayout> {
    Stage::new(StageConfig::default(), layout()).unwrap()
}

#[test]
fn scroll_limit_covers_document() {
    let s = stage();
    assert_eq!(s.scroll().limit(), 4200.0);
}

#[test]
fn scrubbed_timeline_sees_progress_of_same_frame() {
    let mut s = stage();
    s.mount(&SectionDef::from_json_str(FADE).unwrap()).unwrap();
    let mut store = PropertyStore::new();

    s.scroll_mut().set_immediate(2000.0);
    let report = s.frame(DT, &mut store);
    assert_eq!(report.frame, 1);
    assert_eq!(report.position, 2000.0);
    assert_eq!(report.events.len(), 1);
    assert_eq!(report.events[0].kind, TransitionKind::Enter);
    assert_eq!(store.scalar(ElementId(21), "opacity"), Some(0.5));
    assert!(report.failures.is_empty());
    assert!(!report.cursor_drawn);
}

#[test]
fn wheel_input_eases_towards_target() {
    let mut s = stage();
    s.mount(&SectionDef::from_json_str(FADE).unwrap()).unwrap();
    let mut store = PropertyStore::new();
    s.scroll_mut().on_wheel(2000.0);

    let mut last = 0.0;
    for _ in 0..30 {
        let r = s.frame(DT, &mut store);
        assert!(r.position >= last);
        last = r.position;
    }
    assert!(last > 1200.0 && last < 2000.0);
    let opacity = store.scalar(ElementId(21), "opacity").unwrap();
    assert!((opacity - (last - 1200.0) / 1600.0).abs() < 1e-9);
}

#[test]
fn toggled_timeline_plays_and_reverses() {
    let mut s = stage();
    s.mount(&SectionDef::from_json_str(REVEAL).unwrap()).unwrap();
    let mut store = PropertyStore::new();

    s.frame(DT, &mut store);
    assert_eq!(store.scalar(ElementId(31), "y"), Some(50.0));

    s.scroll_mut().set_immediate(2600.0);
    let r = s.frame(0.25, &mut store);
    assert_eq!(r.events[0].kind, TransitionKind::Enter);
    assert!((store.scalar(ElementId(31), "y").unwrap() - 25.0).abs() < 1e-9);
    s.frame(0.5, &mut store);
    assert_eq!(store.scalar(ElementId(31), "y"), Some(0.0));

    s.scroll_mut().set_immediate(0.0);
    let r = s.frame(0.25, &mut store);
    assert_eq!(r.events[0].kind, TransitionKind::LeaveBack);
    assert!((store.scalar(ElementId(31), "y").unwrap() - 25.0).abs() < 1e-9);
    s.frame(1.0, &mut store);
    assert_eq!(store.scalar(ElementId(31), "y"), Some(50.0));
}

#[test]
fn failing_write_does_not_block_other_tweens() {
    const TWO: &str = r#"{
        "name": "two",
        "timelines": [
            {
                "playback": { "mode": "autonomous" },
                "tweens": [
                    { "target": 1, "from": { "opacity": 0 }, "to": { "opacity": 1 }, "duration": 1, "position": 0 },
                    { "target": 2, "from": { "opacity": 0 }, "to": { "opacity": 1 }, "duration": 1, "position": 0 }
                ]
            }
        ]
    }"#;
    let mut s = stage();
    s.mount(&SectionDef::from_json_str(TWO).unwrap()).unwrap();
    let mut written = Vec::new();
    let mut sink = |target: TargetId, property: &str, _: &Value| {
        if target.element == ElementId(1) {
            return Err(ScrollweaveError::evaluation("detached node"));
        }
        written.push((target, property.to_owned()));
        Ok(())
    };
    let r = s.frame(DT, &mut sink);
    assert_eq!(r.failures.len(), 1);
    assert_eq!(r.failures[0].target, TargetId::element(ElementId(1)));
    assert_eq!(written, vec![(TargetId::element(ElementId(2)), "opacity".to_owned())]);
}

#[test]
fn horizontal_gallery_extends_scroll_and_translates_strip() {
    let mut l = StaticLayout::new(Viewport::new(1000.0, 800.0).unwrap());
    l.insert(ElementId(40), Rect::new(0.0, 800.0, 1000.0, 1600.0))
        .insert(ElementId(41), Rect::new(0.0, 800.0, 3000.0, 1600.0))
        .insert(ElementId(50), Rect::new(0.0, 1600.0, 1000.0, 2400.0));
    let mut s = Stage::new(StageConfig::default(), l).unwrap();
    assert_eq!(s.scroll().limit(), 1600.0);

    let id = s
        .mount_with("gallery", |ctx, reg, layout| {
            ctx.add_horizontal(
                reg,
                layout,
                HorizontalSpec {
                    section: ElementId(40),
                    strip: ElementId(41),
                    slides: vec![ElementId(42), ElementId(43), ElementId(44)],
                },
            )?;
            Ok(())
        })
        .unwrap();
    assert_eq!(s.scroll().limit(), 3600.0);

    let mut store = PropertyStore::new();
    s.scroll_mut().set_immediate(1800.0);
    s.frame(DT, &mut store);
    assert_eq!(store.scalar(ElementId(41), "x"), Some(-1000.0));
    assert_eq!(store.scalar(ElementId(40), "y"), Some(1000.0));
    let h = s.context(id).unwrap().horizontal(0).unwrap();
    assert_eq!(h.active_slide(s.registry()), 1);

    let handle = s
        .scroll_to_element(ElementId(50), ScrollToOptions::default())
        .unwrap();
    for _ in 0..120 {
        s.frame(DT, &mut store);
    }
    assert!(handle.is_done());
    assert_eq!(s.scroll().position(), 3600.0);
    assert_eq!(store.scalar(ElementId(41), "x"), Some(-2000.0));
}

#[test]
fn pinned_section_receives_counter_transform() {
    const HERO: &str = r#"{
        "name": "hero",
        "trigger": { "target": 1, "start": "top top", "end": "+=100%", "pin": true }
    }"#;
    let mut l = layout();
    l.insert(ElementId(1), Rect::new(0.0, 1000.0, 1280.0, 1800.0));
    let mut s = Stage::new(StageConfig::default(), l).unwrap();
    s.mount(&SectionDef::from_json_str(HERO).unwrap()).unwrap();
    assert_eq!(s.registry().pin_spacing(), 800.0);
    let mut store = PropertyStore::new();

    s.frame(DT, &mut store);
    assert_eq!(store.scalar(ElementId(1), "y"), Some(0.0));

    s.scroll_mut().set_immediate(1400.0);
    s.frame(DT, &mut store);
    assert_eq!(store.scalar(ElementId(1), "y"), Some(400.0));

    s.scroll_mut().set_immediate(3000.0);
    s.frame(DT, &mut store);
    assert_eq!(store.scalar(ElementId(1), "y"), Some(800.0));
    let writes = store.writes();
    s.frame(DT, &mut store);
    assert_eq!(store.writes(), writes);
}

#[test]
fn resize_recomputes_limit_and_extent() {
    let mut l = StaticLayout::new(Viewport::new(1000.0, 800.0).unwrap());
    l.insert(ElementId(40), Rect::new(0.0, 800.0, 1000.0, 1600.0))
        .insert(ElementId(41), Rect::new(0.0, 800.0, 4000.0, 1600.0));
    let mut s = Stage::new(StageConfig::default(), l).unwrap();
    s.mount_with("gallery", |ctx, reg, layout| {
        ctx.add_horizontal(
            reg,
            layout,
            HorizontalSpec {
                section: ElementId(40),
                strip: ElementId(41),
                slides: (0..4).map(|i| ElementId(60 + i)).collect(),
            },
        )
        .map(|_| ())
    })
    .unwrap();
    assert_eq!(s.registry().pin_spacing(), 3000.0);

    s.layout_mut()
        .set_viewport(Viewport::new(800.0, 800.0).unwrap());
    s.resize();
    assert_eq!(s.registry().pin_spacing(), 2400.0);
    assert_eq!(s.scroll().limit(), 1600.0 - 800.0 + 2400.0);
}

#[test]
fn unmount_releases_everything() {
    let mut s = stage();
    let a = s.mount(&SectionDef::from_json_str(FADE).unwrap()).unwrap();
    let b = s.mount(&SectionDef::from_json_str(REVEAL).unwrap()).unwrap();
    assert_eq!(s.registry().len(), 2);
    assert!(s.unmount(a));
    assert!(!s.unmount(a));
    assert_eq!(s.registry().len(), 1);
    assert!(s.context(a).is_none());
    assert!(s.context(b).is_some());
}

#[test]
fn failed_mount_disposes_partial_registration() {
    let mut s = stage();
    let err = s.mount_with("broken", |ctx, reg, layout| {
        ctx.add_trigger(
            reg,
            layout,
            crate::trigger::registry::TriggerSpec::parse(ElementId(20), "top top", "bottom top")?,
        );
        Err(ScrollweaveError::validation("bad section"))
    });
    assert!(err.is_err());
    assert!(s.registry().is_empty());
}

#[test]
fn cursor_draws_only_for_fine_pointers() {
    let mut s = stage();
    let mut store = PropertyStore::new();
    s.enable_cursor(PointerKind::Coarse, SurfaceKind::Cpu).unwrap();
    assert!(!s.frame(DT, &mut store).cursor_drawn);

    s.enable_cursor(PointerKind::Fine, SurfaceKind::Cpu).unwrap();
    s.cursor_mut()
        .unwrap()
        .pointer_moved(crate::foundation::core::Point::new(640.0, 400.0));
    assert!(s.frame(DT, &mut store).cursor_drawn);
    s.disable_cursor();
    s.disable_cursor();
    assert!(s.cursor().is_none());
    assert!(!s.frame(DT, &mut store).cursor_drawn);
}
