use approx::assert_relative_eq;
use candleview::core::LinearMap;
use candleview::error::ChartError;
use proptest::prelude::*;

#[test]
fn price_map_flips_axis() {
    let map = LinearMap::new(100.0, 400.0, 200.0, 0.0).expect("valid map");
    assert_relative_eq!(map.eval(100.0), 400.0);
    assert_relative_eq!(map.eval(200.0), 0.0);
    assert_relative_eq!(map.eval(150.0), 200.0);
    assert_relative_eq!(map.slope(), -4.0);
}

#[test]
fn equal_domain_points_are_rejected() {
    let err = LinearMap::new(5.0, 0.0, 5.0, 10.0).expect_err("degenerate");
    assert!(matches!(err, ChartError::DegenerateMap { x } if x == 5.0));
}

#[test]
fn non_finite_points_are_rejected() {
    assert!(LinearMap::new(f64::NAN, 0.0, 1.0, 1.0).is_err());
    assert!(LinearMap::new(0.0, f64::INFINITY, 1.0, 1.0).is_err());
}

#[test]
fn flat_map_has_no_inverse() {
    let flat = LinearMap::new(0.0, 3.0, 10.0, 3.0).expect("flat map is valid");
    assert_relative_eq!(flat.eval(123.0), 3.0);
    assert!(flat.inverse().is_err());
}

#[test]
fn points_are_preserved() {
    let map = LinearMap::new(1.0, 2.0, 3.0, 4.0).expect("valid map");
    assert_eq!(map.points(), ((1.0, 2.0), (3.0, 4.0)));
}

proptest! {
    #[test]
    fn inverse_recovers_domain_value(
        x1 in -1_000_000.0f64..1_000_000.0,
        span in 0.01f64..1_000_000.0,
        y1 in 0.0f64..2_000.0,
        height in 1.0f64..2_000.0,
        factor in 0.0f64..1.0
    ) {
        let x2 = x1 + span;
        let map = LinearMap::new(x1, y1 + height, x2, y1).expect("valid map");
        let inverse = map.inverse().expect("invertible");
        let value = x1 + factor * span;

        let recovered = inverse.eval(map.eval(value));
        prop_assert!((recovered - value).abs() <= 1e-6 * span.max(1.0));
    }

    #[test]
    fn defining_points_map_exactly(
        x1 in -10_000.0f64..10_000.0,
        span in 0.5f64..10_000.0,
        y1 in -10_000.0f64..10_000.0,
        y2 in -10_000.0f64..10_000.0
    ) {
        let map = LinearMap::new(x1, y1, x1 + span, y2).expect("valid map");
        prop_assert!((map.eval(x1) - y1).abs() <= 1e-6);
        prop_assert!((map.eval(x1 + span) - y2).abs() <= 1e-6);
    }
}
