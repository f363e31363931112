use approx::assert_relative_eq;
use candleview::api::{LayoutConfig, compute_frame_layout};
use candleview::core::{
    AnalysisOverlay, Candle, CandleSeries, PatternMark, TrendDirection, TrendLine, Viewport,
};
use candleview::error::ChartError;
use candleview::interaction::{PointerState, ZoomController};
use proptest::prelude::*;

const MINUTE_NS: i64 = 60_000_000_000;

fn candle(i: i64) -> Candle {
    let open = 10_000 + i * 10;
    let close = if i % 2 == 0 { open + 20 } else { open - 20 };
    Candle::new(
        open,
        open.max(close) + 15,
        open.min(close) - 15,
        close,
        100 + i,
        i * MINUTE_NS,
        (i + 1) * MINUTE_NS - 1,
    )
    .expect("valid candle")
}

fn series(count: i64) -> CandleSeries {
    CandleSeries::from_candles((0..count).map(candle).collect()).expect("series")
}

fn layout_with(
    series: &CandleSeries,
    overlay: Option<&AnalysisOverlay>,
    pointer: PointerState,
) -> candleview::api::FrameLayout {
    compute_frame_layout(
        series,
        overlay,
        Viewport::new(800, 400),
        &LayoutConfig::default(),
        &ZoomController::default(),
        pointer,
        Some(100),
    )
    .expect("layout")
}

#[test]
fn panes_split_plot_volume_and_axis() {
    let layout = layout_with(&series(10), None, PointerState::Hidden);
    assert_eq!(layout.plot.left, 0.0);
    assert_eq!(layout.plot.right, 732.0);
    assert_eq!(layout.plot.top, 15.0);
    assert_eq!(layout.plot.bottom, 307.0);
    let volume = layout.volume_pane.expect("volume pane");
    assert_eq!(volume.top, 311.0);
    assert_eq!(volume.bottom, 385.0);
    assert_eq!(layout.price_axis.left, 732.0);
    assert_eq!(layout.price_axis.right, 800.0);
}

#[test]
fn empty_series_produces_empty_layout() {
    let layout = layout_with(&CandleSeries::new(), None, PointerState::At { x: 10.0, y: 50.0 });
    assert!(layout.is_empty());
    assert!(layout.candles.is_empty());
    assert!(layout.price_ticks.is_empty());
    assert!(layout.crosshair.is_none());
    assert!(layout.last_price.is_none());
}

#[test]
fn window_anchors_to_most_recent_candles() {
    let layout = layout_with(&series(200), None, PointerState::Hidden);
    assert_eq!(layout.window.count, 122);
    assert_eq!(layout.window.start_index, 78);
    assert_eq!(layout.candles.len(), 122);
    assert_eq!(layout.candles.first().map(|c| c.index), Some(78));
    assert_eq!(layout.candles.last().map(|c| c.index), Some(199));
    let last = layout.candles.last().expect("last candle");
    assert!(last.body_right <= layout.plot.right);
}

#[test]
fn price_map_spans_visible_window_only() {
    let layout = layout_with(&series(200), None, PointerState::Hidden);
    let scales = layout.scales.expect("scales");
    // Lowest low is bearish candle 79, highest high bullish candle 198.
    assert_eq!(scales.price_range.min, 10_755.0);
    assert_eq!(scales.price_range.max, 12_015.0);
    assert_relative_eq!(scales.price_to_pixel.eval(10_755.0), layout.plot.bottom, epsilon = 1e-9);
    assert_relative_eq!(scales.price_to_pixel.eval(12_015.0), layout.plot.top, epsilon = 1e-9);
}

#[test]
fn layout_is_deterministic() {
    let overlay = AnalysisOverlay::new()
        .with_pattern(4, PatternMark::new(9))
        .with_trend_line(TrendLine::new(1, 8, TrendDirection::Resistance));
    let pointer = PointerState::At { x: 40.0, y: 120.0 };
    let data = series(30);
    let first = layout_with(&data, Some(&overlay), pointer);
    let second = layout_with(&data, Some(&overlay), pointer);
    assert_eq!(first, second);
}

#[test]
fn volume_bars_scale_from_zero_to_window_max() {
    let layout = layout_with(&series(10), None, PointerState::Hidden);
    let pane = layout.volume_pane.expect("volume pane");
    assert_eq!(layout.volume_bars.len(), 10);
    let tallest = layout.volume_bars.last().expect("bar");
    assert_relative_eq!(tallest.top, pane.top, epsilon = 1e-9);
    for bar in &layout.volume_bars {
        assert_eq!(bar.bottom, pane.bottom);
        assert!(bar.top >= pane.top - 1e-9);
    }
}

#[test]
fn disabled_volume_pane_gives_plot_full_height() {
    let config = LayoutConfig::default().with_volume_pane_ratio(0.0);
    let layout = compute_frame_layout(
        &series(10),
        None,
        Viewport::new(800, 400),
        &config,
        &ZoomController::default(),
        PointerState::Hidden,
        None,
    )
    .expect("layout");
    assert!(layout.volume_pane.is_none());
    assert!(layout.volume_bars.is_empty());
    assert_eq!(layout.plot.bottom, 385.0);
    assert!(layout.scales.expect("scales").volume_to_pixel.is_none());
}

#[test]
fn price_ticks_use_payload_precision() {
    let layout = layout_with(&series(10), None, PointerState::Hidden);
    assert!(!layout.price_ticks.is_empty());
    for tick in &layout.price_ticks {
        assert!(tick.y >= layout.plot.top - 1e-6 && tick.y <= layout.plot.bottom + 1e-6);
        let decimals = tick.label.split('.').nth(1).map(str::len);
        assert_eq!(decimals, Some(2), "label {}", tick.label);
    }
    assert_eq!(layout.price_format.decimals(), 2);
}

#[test]
fn missing_precision_falls_back_to_config_default() {
    let layout = compute_frame_layout(
        &series(5),
        None,
        Viewport::new(800, 400),
        &LayoutConfig::default().with_default_precision(1_000),
        &ZoomController::default(),
        PointerState::Hidden,
        None,
    )
    .expect("layout");
    assert_eq!(layout.price_format.precision(), 1_000);
}

#[test]
fn last_price_marker_tracks_latest_close() {
    let data = series(10);
    let layout = layout_with(&data, None, PointerState::Hidden);
    let marker = layout.last_price.expect("last price");
    let last = data.last().expect("candle");
    assert_eq!(marker.price, last.close as f64);
    assert_eq!(marker.label, "100.70");
    assert!(!marker.is_bullish);
}

#[test]
fn time_ticks_label_every_interval() {
    let layout = layout_with(&series(40), None, PointerState::Hidden);
    let indices: Vec<usize> = layout.time_ticks.iter().map(|t| t.index).collect();
    assert_eq!(indices, vec![0, 15, 30]);
    assert_eq!(layout.time_ticks[1].label.as_deref(), Some("00:15"));
}

#[test]
fn crosshair_snaps_to_nearest_candle() {
    let layout = layout_with(&series(10), None, PointerState::At { x: 13.9, y: 100.0 });
    let crosshair = layout.crosshair.expect("crosshair");
    assert_eq!(crosshair.snapped_index, 2);
    assert_relative_eq!(crosshair.x, 15.0);
    assert_eq!(crosshair.y, 100.0);
    let scales = layout.scales.expect("scales");
    let price = crosshair.price.expect("price inside plot");
    assert_relative_eq!(price, scales.pixel_to_price.eval(100.0));
    assert!(crosshair.price_label.is_some());
    assert_eq!(crosshair.time_label.as_deref(), Some("00:02"));
}

#[test]
fn crosshair_over_volume_pane_has_no_price() {
    let layout = layout_with(&series(10), None, PointerState::At { x: 15.0, y: 350.0 });
    let crosshair = layout.crosshair.expect("crosshair");
    assert_eq!(crosshair.price, None);
    assert_eq!(crosshair.price_label, None);
}

#[test]
fn crosshair_outside_chart_is_hidden() {
    let layout = layout_with(&series(10), None, PointerState::At { x: 760.0, y: 100.0 });
    assert!(layout.crosshair.is_none());
    let layout = layout_with(&series(10), None, PointerState::At { x: 10.0, y: 5.0 });
    assert!(layout.crosshair.is_none());
}

#[test]
fn trend_lines_pass_through_lows_and_highs() {
    let data = series(10);
    let overlay = AnalysisOverlay::new()
        .with_trend_line(TrendLine::new(0, 5, TrendDirection::Support))
        .with_trend_line(TrendLine::new(1, 6, TrendDirection::Resistance));
    let layout = layout_with(&data, Some(&overlay), PointerState::Hidden);
    let scales = layout.scales.expect("scales");
    assert_eq!(layout.trend_segments.len(), 2);

    let support = layout.trend_segments[0];
    assert_relative_eq!(support.x1, 3.0);
    assert_relative_eq!(support.x2, 33.0);
    assert_relative_eq!(support.y1, scales.price_to_pixel.eval(candle(0).low as f64));
    assert_relative_eq!(support.y2, scales.price_to_pixel.eval(candle(5).low as f64));

    let resistance = layout.trend_segments[1];
    assert_eq!(resistance.direction, TrendDirection::Resistance);
    assert_relative_eq!(resistance.y1, scales.price_to_pixel.eval(candle(1).high as f64));
    assert_relative_eq!(resistance.y2, scales.price_to_pixel.eval(candle(6).high as f64));
}

#[test]
fn trend_lines_are_clipped_or_dropped_outside_the_window() {
    let data = series(200);
    let overlay = AnalysisOverlay::new()
        .with_trend_line(TrendLine::new(10, 100, TrendDirection::Support))
        .with_trend_line(TrendLine::new(10, 20, TrendDirection::Support))
        .with_trend_line(TrendLine::new(150, 500, TrendDirection::Resistance));
    let layout = layout_with(&data, Some(&overlay), PointerState::Hidden);
    let scales = layout.scales.expect("scales");

    assert_eq!(layout.trend_segments.len(), 1);
    let clipped = layout.trend_segments[0];
    assert_eq!(clipped.start_index, 10);
    assert_relative_eq!(clipped.x1, layout.plot.left);
    assert_relative_eq!(clipped.x2, scales.index_to_x.eval(100.0));
}

#[test]
fn pattern_markers_stack_labels_above_the_high() {
    let overlay = AnalysisOverlay::new()
        .with_pattern(3, PatternMark::new(7))
        .with_pattern(3, PatternMark::new(8).with_short_code("DJ"))
        .with_pattern(50, PatternMark::new(2));
    let layout = layout_with(&series(10), Some(&overlay), PointerState::Hidden);

    assert_eq!(layout.pattern_markers.len(), 1);
    let marker = &layout.pattern_markers[0];
    assert_eq!(marker.index, 3);
    assert_eq!(marker.labels, vec!["#7".to_owned(), "DJ".to_owned()]);
    let geometry = layout.candles[3];
    assert_relative_eq!(marker.x, geometry.center_x);
    assert_relative_eq!(marker.y, geometry.wick_top - 6.0);
}

#[test]
fn flat_single_candle_is_widened_and_drawable() {
    let flat = Candle::new(500, 500, 500, 500, 0, 0, 0).expect("valid candle");
    let data = CandleSeries::from_candles(vec![flat]).expect("series");
    let layout = layout_with(&data, None, PointerState::Hidden);
    let scales = layout.scales.expect("scales");
    assert!(scales.price_range.span() >= 2.0);
    assert!(layout.candles[0].is_doji);
    assert!(layout.candles[0].wick_top.is_finite());
}

#[test]
fn price_range_snap_rounds_bounds() {
    let config = LayoutConfig::default().with_price_range_snap(100.0);
    let layout = compute_frame_layout(
        &series(10),
        None,
        Viewport::new(800, 400),
        &config,
        &ZoomController::default(),
        PointerState::Hidden,
        None,
    )
    .expect("layout");
    let range = layout.scales.expect("scales").price_range;
    assert_eq!(range.min, 9_900.0);
    assert_eq!(range.max, 10_200.0);
}

#[test]
fn invalid_or_tiny_viewports_are_rejected() {
    let data = series(10);
    for viewport in [Viewport::new(0, 400), Viewport::new(800, 20)] {
        let result = compute_frame_layout(
            &data,
            None,
            viewport,
            &LayoutConfig::default(),
            &ZoomController::default(),
            PointerState::Hidden,
            None,
        );
        assert!(matches!(result, Err(ChartError::InvalidViewport { .. })));
    }
}

#[test]
fn viewport_narrower_than_axis_yields_empty_layout() {
    let layout = compute_frame_layout(
        &series(10),
        None,
        Viewport::new(60, 400),
        &LayoutConfig::default(),
        &ZoomController::default(),
        PointerState::Hidden,
        None,
    )
    .expect("layout");
    assert!(layout.is_empty());
    assert!(layout.window.is_empty());
}

proptest! {
    #[test]
    fn visible_candles_stay_inside_the_plot(
        count in 1i64..600,
        width in 80u32..2_400,
        height in 120u32..1_200,
        zoom_steps in 0usize..40
    ) {
        let data = series(count);
        let mut zoom = ZoomController::default();
        for _ in 0..zoom_steps {
            zoom.on_wheel(1.0);
        }
        let layout = compute_frame_layout(
            &data,
            None,
            Viewport::new(width, height),
            &LayoutConfig::default(),
            &zoom,
            PointerState::Hidden,
            None,
        )
        .expect("layout");

        prop_assert_eq!(layout.window.end_index(), data.len());
        for geometry in &layout.candles {
            prop_assert!(geometry.body_left >= layout.plot.left);
            prop_assert!(geometry.body_right <= layout.plot.right + 1e-9);
            prop_assert!(geometry.wick_top >= layout.plot.top - 1e-6);
            prop_assert!(geometry.wick_bottom <= layout.plot.bottom + 1e-6);
        }
    }
}
