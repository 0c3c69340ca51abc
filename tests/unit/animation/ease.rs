use super::*;

fn all_eases() -> Vec<Ease> {
    [
        "none",
        "power1.in",
        "power2.out",
        "power3.inOut",
        "power4.out",
        "sine.inOut",
        "expo.out",
        "expo.in",
        "circ.out",
        "back.out(1.7)",
        "elastic.out(1, 0.5)",
        "elastic.inOut",
        "decay(10)",
    ]
    .iter()
    .map(|s| s.parse::<Ease>().unwrap())
    .collect()
}

#[test]
fn endpoints_are_stable() {
    for ease in all_eases() {
        assert_eq!(ease.apply(0.0), 0.0, "{ease}");
        assert_eq!(ease.apply(1.0), 1.0, "{ease}");
        assert_eq!(ease.apply(-3.0), 0.0, "{ease}");
        assert_eq!(ease.apply(7.0), 1.0, "{ease}");
    }
}

#[test]
fn monotonic_spot_check() {
    for name in ["none", "power2.out", "expo.out", "sine.inOut", "power1.in"] {
        let ease: Ease = name.parse().unwrap();
        let a = ease.apply(0.25);
        let b = ease.apply(0.5);
        let c = ease.apply(0.75);
        assert!(a < b, "{name}");
        assert!(b < c, "{name}");
    }
}

#[test]
fn back_overshoots_and_elastic_oscillates() {
    let back: Ease = "back.out(1.7)".parse().unwrap();
    assert!((0..100).any(|i| back.apply(f64::from(i) / 100.0) > 1.0));

    let elastic: Ease = "elastic.out(1, 0.5)".parse().unwrap();
    assert!((0..100).any(|i| elastic.apply(f64::from(i) / 100.0) > 1.0));
}

#[test]
fn parses_web_names_and_aliases() {
    assert_eq!("none".parse::<Ease>().unwrap(), Ease::Linear);
    assert_eq!(
        "power2".parse::<Ease>().unwrap(),
        Ease::Power {
            power: 2,
            dir: EaseDir::Out
        }
    );
    assert_eq!(
        "cubic.inOut".parse::<Ease>().unwrap(),
        Ease::Power {
            power: 2,
            dir: EaseDir::InOut
        }
    );
    assert_eq!(
        "back.out(1.7)".parse::<Ease>().unwrap(),
        Ease::Back {
            overshoot: 1.7,
            dir: EaseDir::Out
        }
    );
    assert_eq!(
        "elastic.out(1, 0.5)".parse::<Ease>().unwrap(),
        Ease::Elastic {
            amplitude: 1.0,
            period: 0.5,
            dir: EaseDir::Out
        }
    );
}

#[test]
fn unknown_names_fall_back_to_default() {
    assert!("smooth".parse::<Ease>().is_err());
    assert!("expo.sideways".parse::<Ease>().is_err());
    assert!("back.out(1.7".parse::<Ease>().is_err());
    assert_eq!(Ease::parse_or_default("smooth"), Ease::default());
}

#[test]
fn display_round_trips_through_parse() {
    for ease in all_eases() {
        let again: Ease = ease.to_string().parse().unwrap();
        assert_eq!(again, ease);
    }
}

#[test]
fn serde_uses_string_form() {
    let ease: Ease = serde_json::from_str("\"expo.out\"").unwrap();
    assert_eq!(ease, Ease::Expo(EaseDir::Out));
    assert_eq!(serde_json::to_string(&ease).unwrap(), "\"expo.out\"");
}

#[test]
fn decay_matches_smooth_scroll_curve() {
    let ease = Ease::ExpoDecay { k: 10.0 };
    assert!((ease.apply(0.1) - 0.5).abs() < 1e-12);
}
