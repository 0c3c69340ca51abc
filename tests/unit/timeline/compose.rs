use super::*;
use crate::animation::ease::Ease;
use crate::animation::value::Value;
use crate::foundation::core::{ElementId, ScrollDirection};
use crate::timeline::sink::PropertyStore;
use crate::trigger::registry::TransitionKind;

fn fade(el: u32, duration: f64) -> Tween {
    Tween::new(ElementId(el), duration)
        .track("opacity", 0.0, 1.0)
        .ease(Ease::Linear)
}

fn event(trigger: TriggerId, kind: TransitionKind) -> TriggerEvent {
    TriggerEvent {
        trigger,
        kind,
        progress: 0.0,
        direction: kind.direction(),
    }
}

#[test]
fn positions_resolve_to_start_times() {
    let mut tl = Timeline::autonomous();
    tl.add(fade(1, 1.0), Position::At(0.0))
        .unwrap()
        .add(fade(2, 0.5), Position::AfterPrevious)
        .unwrap()
        .add(fade(3, 0.2), Position::Fraction(0.5))
        .unwrap();
    assert_eq!(tl.start_of(1), Some(1.0));
    assert_eq!(tl.start_of(2), Some(0.75));
    assert_eq!(tl.duration(), 1.5);
    assert_eq!(tl.len(), 3);
}

#[test]
fn position_strings() {
    assert_eq!(">".parse::<Position>().unwrap(), Position::AfterPrevious);
    assert_eq!("50%".parse::<Position>().unwrap(), Position::Fraction(0.5));
    assert_eq!("0.3".parse::<Position>().unwrap(), Position::At(0.3));
    assert!("soon".parse::<Position>().is_err());
    assert!(
        Timeline::autonomous()
            .add(fade(1, 1.0), Position::At(-1.0))
            .is_err()
    );
}

#[test]
fn stagger_offsets_each_target() {
    let targets: Vec<TargetId> = (0..4).map(|i| TargetId::part(ElementId(7), i)).collect();
    let mut tl = Timeline::autonomous();
    tl.stagger(&targets, 0.03, Position::At(0.2), |_, t| {
        Tween::new(t, 0.8).track("y", 100.0, 0.0)
    })
    .unwrap();
    for i in 0..4 {
        let start = tl.start_of(i).unwrap();
        assert!((start - (0.2 + 0.03 * i as f64)).abs() < 1e-12);
    }
    assert!((tl.duration() - (0.2 + 0.09 + 0.8)).abs() < 1e-12);

    let mut store = PropertyStore::new();
    assert!(tl.evaluate_at(0.0, &mut store).is_empty());
    assert_eq!(store.len(), 4);
    assert_eq!(store.scalar(targets[3], "y"), Some(100.0));
}

#[test]
fn overlapping_tweens_latest_started_wins() {
    let mut tl = Timeline::autonomous();
    tl.add(
        Tween::new(ElementId(1), 1.0)
            .track("x", 0.0, 10.0)
            .ease(Ease::Linear),
        Position::At(0.5),
    )
    .unwrap()
    .add(
        Tween::new(ElementId(1), 1.0)
            .track("x", 100.0, 200.0)
            .ease(Ease::Linear),
        Position::At(1.0),
    )
    .unwrap();

    let mut store = PropertyStore::new();
    tl.evaluate_at(0.0, &mut store);
    assert_eq!(store.scalar(ElementId(1), "x"), Some(0.0));
    tl.evaluate_at(0.75, &mut store);
    assert_eq!(store.scalar(ElementId(1), "x"), Some(2.5));
    tl.evaluate_at(1.5, &mut store);
    assert_eq!(store.scalar(ElementId(1), "x"), Some(150.0));
    tl.evaluate_at(9.0, &mut store);
    assert_eq!(store.scalar(ElementId(1), "x"), Some(200.0));
}

#[test]
fn scrubbed_is_pure_function_of_progress() {
    let mut tl = Timeline::scrubbed(TriggerId(0));
    tl.add(
        Tween::new(ElementId(1), 1.0)
            .track("scale", 1.0, 1.5)
            .ease("power2.inOut".parse().unwrap()),
        Position::At(0.0),
    )
    .unwrap()
    .add(
        Tween::new(ElementId(2), 0.6).track(
            "clipPath",
            "inset(0 100% 0 0)".parse::<Value>().unwrap(),
            "inset(0 0% 0 0)".parse::<Value>().unwrap(),
        ),
        Position::At(0.3),
    )
    .unwrap();

    let mut first = PropertyStore::new();
    tl.set_progress(0.37);
    tl.render(&mut first);

    let mut scratch = PropertyStore::new();
    for p in [0.9, 1.0, 0.1, 0.0] {
        tl.set_progress(p);
        tl.render(&mut scratch);
    }

    let mut again = PropertyStore::new();
    tl.set_progress(0.37);
    tl.render(&mut again);
    for (el, prop) in [(1, "scale"), (2, "clipPath")] {
        assert_eq!(
            first.get(ElementId(el), prop),
            again.get(ElementId(el), prop)
        );
    }
    assert_eq!(tl.time(), 0.37 * tl.duration());
}

#[test]
fn render_skips_unchanged_playhead() {
    let mut tl = Timeline::scrubbed(TriggerId(0));
    tl.add(fade(1, 1.0), Position::At(0.0)).unwrap();
    let mut store = PropertyStore::new();
    tl.set_progress(0.5);
    tl.render(&mut store);
    tl.render(&mut store);
    assert_eq!(store.writes(), 1);
    tl.invalidate();
    tl.render(&mut store);
    assert_eq!(store.writes(), 2);
}

#[test]
fn scrub_smoothing_lags_then_settles() {
    let mut tl = Timeline::scrubbed(TriggerId(0)).with_smoothing(Some(0.5));
    tl.add(fade(1, 2.0), Position::At(0.0)).unwrap();
    tl.set_progress(1.0);
    assert_eq!(tl.time(), 0.0);
    tl.advance(1.0 / 60.0);
    assert!(tl.time() > 0.0 && tl.time() < 2.0);
    for _ in 0..600 {
        tl.advance(1.0 / 60.0);
    }
    assert_eq!(tl.time(), 2.0);
}

#[test]
fn autonomous_waits_for_delay_then_plays_once() {
    let mut tl = Timeline::autonomous().with_delay(0.5);
    tl.add(fade(1, 1.0), Position::At(0.0)).unwrap();
    let mut store = PropertyStore::new();
    tl.render(&mut store);
    assert_eq!(store.scalar(ElementId(1), "opacity"), Some(0.0));

    tl.advance(0.4);
    assert_eq!(tl.time(), 0.0);
    tl.advance(0.35);
    assert!((tl.time() - 0.25).abs() < 1e-12);
    tl.advance(5.0);
    assert_eq!(tl.time(), 1.0);
    assert!(!tl.is_playing());
    tl.render(&mut store);
    assert_eq!(store.scalar(ElementId(1), "opacity"), Some(1.0));
}

#[test]
fn infinite_yoyo_ping_pongs() {
    let mut tl = Timeline::autonomous().with_repeat(Repeat::Infinite, true);
    tl.add(fade(1, 1.0), Position::At(0.0)).unwrap();
    tl.advance(0.25);
    assert!((tl.time() - 0.25).abs() < 1e-12);
    tl.advance(1.0);
    assert!((tl.time() - 0.75).abs() < 1e-12);
    tl.advance(1.0);
    assert!((tl.time() - 0.25).abs() < 1e-12);
    tl.advance(1000.0);
    assert!(tl.is_playing());
}

#[test]
fn toggled_plays_and_reverses_on_crossings() {
    let trig = TriggerId(3);
    let actions: ToggleActions = "play none none reverse".parse().unwrap();
    let mut tl = Timeline::toggled(trig, actions);
    tl.add(fade(1, 1.0), Position::At(0.0)).unwrap();

    tl.advance(0.5);
    assert_eq!(tl.time(), 0.0);

    assert!(!tl.on_trigger_event(&event(TriggerId(9), TransitionKind::Enter)));
    assert!(tl.on_trigger_event(&event(trig, TransitionKind::Enter)));
    tl.advance(0.6);
    assert!((tl.time() - 0.6).abs() < 1e-12);

    tl.on_trigger_event(&event(trig, TransitionKind::LeaveBack));
    tl.advance(0.2);
    assert!((tl.time() - 0.4).abs() < 1e-12);
    tl.advance(1.0);
    assert_eq!(tl.time(), 0.0);
    assert!(!tl.is_playing());
    assert_eq!(
        event(trig, TransitionKind::LeaveBack).direction,
        ScrollDirection::Backward
    );
}

#[test]
fn failures_are_isolated_per_property() {
    let mut tl = Timeline::autonomous();
    tl.add(fade(1, 1.0), Position::At(0.0))
        .unwrap()
        .add(fade(2, 1.0), Position::At(0.0))
        .unwrap()
        .add(fade(3, 1.0), Position::At(0.0))
        .unwrap();

    let mut written = Vec::new();
    let mut sink = |target: TargetId, _: &str, _: &Value| {
        if target.element == ElementId(2) {
            return Err(ScrollweaveError::evaluation("detached node"));
        }
        written.push(target.element);
        Ok(())
    };
    let failures = tl.evaluate_at(0.5, &mut sink);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].target, TargetId::from(ElementId(2)));
    assert!(failures[0].message.contains("detached node"));
    assert_eq!(written, vec![ElementId(1), ElementId(3)]);
}

#[test]
fn kill_is_idempotent_and_stops_rendering() {
    let mut tl = Timeline::autonomous().with_repeat(Repeat::Infinite, true);
    tl.add(fade(1, 1.0), Position::At(0.0)).unwrap();
    assert!(tl.kill());
    assert!(!tl.kill());
    tl.advance(0.5);
    assert_eq!(tl.time(), 0.0);
    let mut store = PropertyStore::new();
    assert!(tl.render(&mut store).is_empty());
    assert!(store.is_empty());
}
