use super::*;

const ALL: [Ease; 3] = [Ease::InOutQuad, Ease::InExpo, Ease::OutExpo];

#[test]
fn endpoints_are_stable() {
    for ease in ALL {
        assert_eq!(ease.apply(0.0), 0.0, "{ease:?}");
        assert_eq!(ease.apply(1.0), 1.0, "{ease:?}");
    }
}

#[test]
fn monotonic_spot_check() {
    for ease in ALL {
        let samples: Vec<f64> = (0..=20).map(|i| ease.apply(i as f64 / 20.0)).collect();
        for pair in samples.windows(2) {
            assert!(pair[0] <= pair[1], "{ease:?} not monotonic: {pair:?}");
        }
    }
}

#[test]
fn in_out_quad_is_point_symmetric_about_the_midpoint() {
    for t in [0.0, 0.1, 0.25, 0.4, 0.5] {
        let lo = Ease::InOutQuad.apply(t);
        let hi = Ease::InOutQuad.apply(1.0 - t);
        assert!((lo + hi - 1.0).abs() < 1e-12, "t={t}: {lo} + {hi}");
    }
    assert!((Ease::InOutQuad.apply(0.5) - 0.5).abs() < 1e-12);
    assert!((Ease::InOutQuad.apply(0.25) - 0.125).abs() < 1e-12);
    assert!((Ease::InOutQuad.apply(0.75) - 0.875).abs() < 1e-12);
}

#[test]
fn in_out_quad_approaches_one_near_the_end() {
    assert!(Ease::InOutQuad.apply(0.999) > 0.999);
}

#[test]
fn exponential_curves_are_asymmetric() {
    // Slow start for InExpo, fast start for OutExpo.
    assert!(Ease::InExpo.apply(0.5) < 0.05);
    assert!(Ease::OutExpo.apply(0.5) > 0.95);
    assert!((Ease::InExpo.apply(0.5) - 2f64.powi(-5)).abs() < 1e-12);
}

#[test]
fn out_of_range_input_is_clamped() {
    for ease in ALL {
        assert_eq!(ease.apply(-3.0), 0.0);
        assert_eq!(ease.apply(7.0), 1.0);
    }
}
