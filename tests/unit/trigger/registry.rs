use super::*;
use crate::foundation::core::{Rect, StaticLayout, Viewport};
use std::cell::RefCell;

fn layout() -> StaticLayout {
    let mut l = StaticLayout::new(Viewport::new(1280.0, 800.0).unwrap());
    l.insert(ElementId(1), Rect::new(0.0, 5000.0, 1280.0, 6000.0));
    l
}

type Log = Rc<RefCell<Vec<&'static str>>>;

fn logging_callbacks(log: &Log) -> TriggerCallbacks {
    let (a, b, c, d) = (log.clone(), log.clone(), log.clone(), log.clone());
    TriggerCallbacks::new()
        .on_enter(move |_| a.borrow_mut().push("enter"))
        .on_leave(move |_| b.borrow_mut().push("leave"))
        .on_enter_back(move |_| c.borrow_mut().push("enter_back"))
        .on_leave_back(move |_| d.borrow_mut().push("leave_back"))
}

#[test]
fn end_to_end_range_resolution_and_progress() {
    let layout = layout();
    let mut reg = TriggerRegistry::new();
    let h = reg.register(
        TriggerSpec::parse(ElementId(1), "top 70%", "top 20%").unwrap(),
        &layout,
    );
    let id = h.id().unwrap();
    let s = reg.snapshot(id).unwrap();
    assert_eq!(s.start, 4440.0);
    assert_eq!(s.end, 4840.0);

    reg.update(4640.0);
    let s = reg.snapshot(id).unwrap();
    assert_eq!(s.progress, 0.5);
    assert!(s.is_active());

    reg.update(1e9);
    assert_eq!(reg.progress(id), Some(1.0));
    reg.update(-1e9);
    assert_eq!(reg.progress(id), Some(0.0));
}

#[test]
fn forward_then_reverse_fires_mirrored_sequence_once() {
    let layout = layout();
    let mut reg = TriggerRegistry::new();
    let log: Log = Rc::default();
    reg.register(
        TriggerSpec::parse(ElementId(1), "top 70%", "top 20%")
            .unwrap()
            .callbacks(logging_callbacks(&log)),
        &layout,
    );

    let mut pos = 4000.0;
    while pos <= 5200.0 {
        reg.update(pos);
        reg.update(pos);
        pos += 10.0;
    }
    assert_eq!(*log.borrow(), vec!["enter", "leave"]);

    log.borrow_mut().clear();
    while pos >= 4000.0 {
        reg.update(pos);
        pos -= 10.0;
    }
    assert_eq!(*log.borrow(), vec!["enter_back", "leave_back"]);
}

#[test]
fn jumps_fire_double_transitions_in_order() {
    let layout = layout();
    let mut reg = TriggerRegistry::new();
    let log: Log = Rc::default();
    let id = reg
        .register(
            TriggerSpec::parse(ElementId(1), "top 70%", "top 20%")
                .unwrap()
                .callbacks(logging_callbacks(&log)),
            &layout,
        )
        .id()
        .unwrap();

    reg.update(0.0);
    let kinds: Vec<_> = reg.update(10_000.0).iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![TransitionKind::Enter, TransitionKind::Leave]);
    assert!(reg.update(10_000.0).is_empty());

    let events = reg.update(0.0).to_vec();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind, TransitionKind::EnterBack);
    assert_eq!(events[1].kind, TransitionKind::LeaveBack);
    assert!(events.iter().all(|e| e.trigger == id));
    assert!(
        events
            .iter()
            .all(|e| e.direction == ScrollDirection::Backward)
    );
    assert_eq!(
        *log.borrow(),
        vec!["enter", "leave", "enter_back", "leave_back"]
    );
}

#[test]
fn invalid_range_never_leaves_before() {
    let layout = layout();
    let mut reg = TriggerRegistry::new();
    let log: Log = Rc::default();
    let id = reg
        .register(
            TriggerSpec::parse(ElementId(1), "top 20%", "top 70%")
                .unwrap()
                .callbacks(logging_callbacks(&log)),
            &layout,
        )
        .id()
        .unwrap();
    for pos in [0.0, 4500.0, 9000.0, 0.0] {
        assert!(reg.update(pos).is_empty());
    }
    let s = reg.snapshot(id).unwrap();
    assert!(!s.valid);
    assert_eq!(s.phase, Phase::Before);
    assert!(log.borrow().is_empty());
}

#[test]
fn range_invalidated_by_refresh_leaves_back_once() {
    let mut layout = layout();
    let mut reg = TriggerRegistry::new();
    let log: Log = Rc::default();
    let id = reg
        .register(
            TriggerSpec::parse(ElementId(1), "top top", "bottom top")
                .unwrap()
                .callbacks(logging_callbacks(&log)),
            &layout,
        )
        .id()
        .unwrap();
    reg.update(5500.0);
    assert_eq!(reg.snapshot(id).unwrap().phase, Phase::Entered);

    layout.insert(ElementId(1), Rect::new(0.0, 5000.0, 1280.0, 5000.0));
    reg.refresh(&layout);
    assert!(!reg.snapshot(id).unwrap().valid);

    let events = reg.update(5500.0).to_vec();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, TransitionKind::LeaveBack);
    assert_eq!(events[0].progress, 0.0);
    assert!(reg.update(5500.0).is_empty());
    let s = reg.snapshot(id).unwrap();
    assert_eq!(s.phase, Phase::Before);
    assert_eq!(s.progress, 0.0);
    assert_eq!(*log.borrow(), vec!["enter", "leave_back"]);
}

#[test]
fn missing_target_yields_inert_handle() {
    let layout = layout();
    let mut reg = TriggerRegistry::new();
    let h = reg.register(
        TriggerSpec::parse(ElementId(99), "top top", "bottom top").unwrap(),
        &layout,
    );
    assert!(h.is_inert());
    assert!(!h.is_active());
    h.dispose();
    h.dispose();
    assert!(reg.is_empty());
}

#[test]
fn teardown_is_idempotent() {
    let layout = layout();
    let mut reg = TriggerRegistry::new();
    let h = reg.register(
        TriggerSpec::parse(ElementId(1), "top bottom", "bottom top").unwrap(),
        &layout,
    );
    let id = h.id().unwrap();
    assert_eq!(reg.len(), 1);
    h.dispose();
    h.dispose();
    assert_eq!(reg.len(), 0);
    assert!(reg.snapshot(id).is_none());
    assert!(!reg.unregister(id));

    let h2 = reg.register(
        TriggerSpec::parse(ElementId(1), "top bottom", "bottom top").unwrap(),
        &layout,
    );
    let id2 = h2.id().unwrap();
    assert!(reg.unregister(id2));
    assert!(!reg.unregister(id2));
    assert!(!h2.is_active());
}

#[test]
fn disposing_from_own_callback_is_deferred() {
    let layout = layout();
    let mut reg = TriggerRegistry::new();
    let slot: Rc<RefCell<Option<TriggerHandle>>> = Rc::default();
    let calls = Rc::new(Cell::new(0));
    let (slot2, calls2) = (slot.clone(), calls.clone());
    let h = reg.register(
        TriggerSpec::parse(ElementId(1), "top 70%", "top 20%")
            .unwrap()
            .callbacks(TriggerCallbacks::new().on_enter(move |_| {
                calls2.set(calls2.get() + 1);
                if let Some(me) = slot2.borrow().as_ref() {
                    me.dispose();
                }
            })),
        &layout,
    );
    *slot.borrow_mut() = Some(h.clone());

    reg.update(4600.0);
    assert_eq!(calls.get(), 1);
    reg.update(0.0);
    reg.update(4600.0);
    assert_eq!(calls.get(), 1);
    assert!(reg.is_empty());
}

#[test]
fn update_modes() {
    let layout = layout();
    let mut reg = TriggerRegistry::new();
    let active = Rc::new(Cell::new(0));
    let always = Rc::new(Cell::new(0));
    let (a, b) = (active.clone(), always.clone());
    reg.register(
        TriggerSpec::parse(ElementId(1), "top 70%", "top 20%")
            .unwrap()
            .callbacks(TriggerCallbacks::new().on_update(move |_| a.set(a.get() + 1))),
        &layout,
    );
    reg.register(
        TriggerSpec::parse(ElementId(1), "top 70%", "top 20%")
            .unwrap()
            .update_mode(UpdateMode::Always)
            .callbacks(TriggerCallbacks::new().on_update(move |_| b.set(b.get() + 1))),
        &layout,
    );

    reg.update(0.0);
    reg.update(100.0);
    assert_eq!(active.get(), 0);
    assert_eq!(always.get(), 2);

    reg.update(4500.0);
    reg.update(4600.0);
    assert_eq!(active.get(), 2);

    // Crossing tick reports the final progress, then nothing while after.
    reg.update(6000.0);
    reg.update(6100.0);
    assert_eq!(active.get(), 3);
    assert_eq!(always.get(), 6);
}

#[test]
fn pin_extends_document_and_displaces_later_sections() {
    let mut layout = StaticLayout::new(Viewport::new(1280.0, 800.0).unwrap());
    layout
        .insert(ElementId(1), Rect::new(0.0, 1000.0, 1280.0, 1800.0))
        .insert(ElementId(2), Rect::new(0.0, 1800.0, 1280.0, 2600.0));
    let mut reg = TriggerRegistry::new();
    let pin = reg
        .register(
            TriggerSpec::parse(ElementId(1), "top top", "+=2400")
                .unwrap()
                .pinned(),
            &layout,
        )
        .id()
        .unwrap();
    let below = reg
        .register(
            TriggerSpec::parse(ElementId(2), "top top", "bottom top").unwrap(),
            &layout,
        )
        .id()
        .unwrap();

    assert_eq!(reg.pin_spacing(), 2400.0);
    let s = reg.snapshot(below).unwrap();
    assert_eq!((s.start, s.end), (4200.0, 5000.0));
    assert_eq!(reg.document_offset(&layout, ElementId(2)), Some(4200.0));
    assert_eq!(reg.document_offset(&layout, ElementId(1)), Some(1000.0));

    reg.update(2000.0);
    let p = reg.snapshot(pin).unwrap();
    assert_eq!(p.pin_offset, 1000.0);
    reg.update(9000.0);
    assert_eq!(reg.snapshot(pin).unwrap().pin_offset, 2400.0);
    reg.update(0.0);
    assert_eq!(reg.snapshot(pin).unwrap().pin_offset, 0.0);
}

#[test]
fn page_level_trigger_tracks_document_origin() {
    let layout = layout();
    let mut reg = TriggerRegistry::new();
    let id = reg
        .register(
            TriggerSpec::page("top -100".parse().unwrap(), "99999".parse().unwrap()),
            &layout,
        )
        .id()
        .unwrap();
    reg.update(50.0);
    assert_eq!(reg.snapshot(id).unwrap().phase, Phase::Before);
    let events = reg.update(150.0).to_vec();
    assert_eq!(events[0].kind, TransitionKind::Enter);
}

#[test]
fn refresh_follows_resize() {
    let mut layout = layout();
    let mut reg = TriggerRegistry::new();
    let id = reg
        .register(
            TriggerSpec::parse(ElementId(1), "top 70%", "top 20%").unwrap(),
            &layout,
        )
        .id()
        .unwrap();
    layout.set_viewport(Viewport::new(800.0, 1000.0).unwrap());
    reg.refresh(&layout);
    let s = reg.snapshot(id).unwrap();
    assert_eq!((s.start, s.end), (4300.0, 4800.0));
}

#[test]
fn nested_requires_horizontal_container() {
    let layout = layout();
    let mut reg = TriggerRegistry::new();
    let plain = reg
        .register(
            TriggerSpec::parse(ElementId(1), "top top", "+=1000").unwrap(),
            &layout,
        )
        .id()
        .unwrap();
    let nested = reg.register(
        TriggerSpec::parse(ElementId(1), "left 80%", "left 20%")
            .unwrap()
            .in_container(plain),
        &layout,
    );
    assert!(nested.is_inert());
}
