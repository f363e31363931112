use candleview::interaction::{PointerState, ZoomConfig, ZoomController, ZoomDirection};

#[test]
fn wheel_delta_maps_to_direction() {
    assert_eq!(ZoomDirection::from_wheel_delta(3.0), Some(ZoomDirection::In));
    assert_eq!(ZoomDirection::from_wheel_delta(-0.5), Some(ZoomDirection::Out));
    assert_eq!(ZoomDirection::from_wheel_delta(0.0), None);
}

#[test]
fn zoom_steps_are_clamped_to_bounds() {
    let config = ZoomConfig {
        initial_width_px: 5.0,
        spacing_px: 2.0,
        step_px: 2.0,
        min_width_px: 4.0,
        max_width_px: 8.0,
    };
    let mut zoom = ZoomController::new(config).expect("zoom");
    assert_eq!(zoom.candle_width_px(), 5.0);

    assert!(zoom.zoom(ZoomDirection::In));
    assert!(zoom.zoom(ZoomDirection::In));
    assert_eq!(zoom.candle_width_px(), 8.0);
    assert!(!zoom.zoom(ZoomDirection::In));

    assert!(zoom.on_wheel(-1.0));
    assert!(zoom.on_wheel(-1.0));
    assert_eq!(zoom.candle_width_px(), 4.0);
    assert!(!zoom.on_wheel(-1.0));
    assert_eq!(zoom.footprint().total_px(), 6.0);
}

#[test]
fn initial_width_outside_bounds_is_clamped() {
    let config = ZoomConfig {
        initial_width_px: 100.0,
        ..ZoomConfig::default()
    };
    let zoom = ZoomController::new(config).expect("zoom");
    assert_eq!(zoom.candle_width_px(), config.max_width_px);
}

#[test]
fn invalid_zoom_config_is_rejected() {
    let defaults = ZoomConfig::default();
    for config in [
        ZoomConfig { min_width_px: 0.0, ..defaults },
        ZoomConfig { max_width_px: 1.0, ..defaults },
        ZoomConfig { step_px: 0.0, ..defaults },
        ZoomConfig { spacing_px: -1.0, ..defaults },
        ZoomConfig { initial_width_px: f64::NAN, ..defaults },
    ] {
        assert!(ZoomController::new(config).is_err(), "{config:?}");
    }
}

#[test]
fn pointer_position_ignores_non_finite_coordinates() {
    assert_eq!(PointerState::Hidden.position(), None);
    assert_eq!(PointerState::At { x: 1.0, y: 2.0 }.position(), Some((1.0, 2.0)));
    assert_eq!(PointerState::At { x: f64::NAN, y: 2.0 }.position(), None);
}
