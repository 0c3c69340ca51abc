use super::*;

#[test]
fn toggle_actions_parse_four_words() {
    let a: ToggleActions = "play none none reverse".parse().unwrap();
    assert_eq!(a.for_kind(TransitionKind::Enter), ToggleAction::Play);
    assert_eq!(a.for_kind(TransitionKind::Leave), ToggleAction::None);
    assert_eq!(a.for_kind(TransitionKind::LeaveBack), ToggleAction::Reverse);
    assert_eq!(a.to_string(), "play none none reverse");

    assert!("play none".parse::<ToggleActions>().is_err());
    assert!("play none none rewind".parse::<ToggleActions>().is_err());
}

#[test]
fn repeat_from_count() {
    assert_eq!(Repeat::from_count(-1), Repeat::Infinite);
    assert_eq!(Repeat::from_count(0), Repeat::Once);
    assert_eq!(Repeat::from_count(2), Repeat::Count(2));
}

#[test]
fn loop_time_without_yoyo_restarts() {
    assert_eq!(loop_time(0.5, 2.0, Repeat::Infinite, false), 0.5);
    assert_eq!(loop_time(2.5, 2.0, Repeat::Infinite, false), 0.5);
    assert_eq!(loop_time(9.0, 2.0, Repeat::Once, false), 2.0);
}

#[test]
fn loop_time_yoyo_holds_at_last_iteration_end() {
    assert_eq!(loop_time(1.5, 1.0, Repeat::Count(1), true), 0.5);
    assert_eq!(loop_time(5.0, 1.0, Repeat::Count(1), true), 0.0);
    assert_eq!(loop_time(5.0, 1.0, Repeat::Count(2), true), 1.0);
    assert!(loop_finished(2.0, 1.0, Repeat::Count(1)));
    assert!(!loop_finished(1e9, 1.0, Repeat::Infinite));
}

#[test]
fn zero_duration_loops_are_stable() {
    assert_eq!(loop_time(3.0, 0.0, Repeat::Infinite, true), 0.0);
    assert!(validate_smoothing(Some(-1.0)).is_err());
    assert!(validate_smoothing(None).is_ok());
}
