use candleview::api::{
    FrameLayout, LayoutConfig, NO_DATA_TEXT, RenderStyle, build_render_frame, compute_frame_layout,
};
use candleview::core::{
    AnalysisOverlay, Candle, CandleSeries, PatternMark, TrendDirection, TrendLine, Viewport,
};
use candleview::interaction::{PointerState, ZoomController};
use candleview::render::{Primitive, RenderFrame};
use candleview::session::ConnectionStatus;

fn candle(i: i64, open: i64, close: i64) -> Candle {
    Candle::new(
        open,
        open.max(close) + 10,
        open.min(close) - 10,
        close,
        50 + i,
        i * 60,
        i * 60 + 59,
    )
    .expect("valid candle")
}

fn layout(candles: Vec<Candle>, overlay: Option<&AnalysisOverlay>, pointer: PointerState) -> FrameLayout {
    let series = CandleSeries::from_candles(candles).expect("series");
    compute_frame_layout(
        &series,
        overlay,
        Viewport::new(640, 360),
        &LayoutConfig::default().with_timestamp_unit(candleview::core::TimestampUnit::Seconds),
        &ZoomController::default(),
        pointer,
        Some(100),
    )
    .expect("layout")
}

fn texts(frame: &RenderFrame) -> Vec<&str> {
    frame.texts.iter().map(|t| t.text.as_str()).collect()
}

#[test]
fn empty_layout_shows_placeholder_and_status() {
    let layout = layout(Vec::new(), None, PointerState::Hidden);
    let style = RenderStyle::default();
    let frame = build_render_frame(&layout, &style, ConnectionStatus::Connecting).expect("frame");
    frame.validate().expect("valid frame");

    assert_eq!(texts(&frame), vec![NO_DATA_TEXT, "CONNECTING"]);
    assert!(frame.rects.is_empty());
    assert_eq!(frame.lines.len(), 1, "only the axis border");
    assert_eq!(frame.background, Some(style.background_color));
}

#[test]
fn live_frame_has_no_status_text() {
    let layout = layout(
        vec![candle(0, 100, 120), candle(1, 120, 110)],
        None,
        PointerState::Hidden,
    );
    let frame =
        build_render_frame(&layout, &RenderStyle::default(), ConnectionStatus::Live).expect("frame");
    frame.validate().expect("valid frame");

    let labels = texts(&frame);
    assert!(!labels.contains(&NO_DATA_TEXT));
    assert!(!labels.contains(&"CONNECTING"));
    assert!(!labels.contains(&"STALE DATA"));
    assert!(labels.contains(&"1.10"), "last price label, got {labels:?}");
}

#[test]
fn stale_and_disconnected_states_are_indicated() {
    let layout = layout(vec![candle(0, 100, 120)], None, PointerState::Hidden);
    let style = RenderStyle::default();

    let stale = build_render_frame(&layout, &style, ConnectionStatus::Stale).expect("frame");
    assert_eq!(texts(&stale).last().copied(), Some("STALE DATA"));

    let disconnected =
        build_render_frame(&layout, &style, ConnectionStatus::Disconnected).expect("frame");
    assert_eq!(texts(&disconnected).last().copied(), Some("DISCONNECTED"));
}

#[test]
fn candles_use_direction_colors() {
    let layout = layout(
        vec![candle(0, 100, 120), candle(1, 120, 100)],
        None,
        PointerState::Hidden,
    );
    let style = RenderStyle::default();
    let frame = build_render_frame(&layout, &style, ConnectionStatus::Live).expect("frame");

    let bullish = layout.candles[0];
    let body = frame
        .rects
        .iter()
        .find(|r| r.x == bullish.body_left && r.y == bullish.body_top)
        .expect("bullish body");
    assert_eq!(body.fill_color, style.bullish_color);

    let bearish = layout.candles[1];
    let wick = frame
        .lines
        .iter()
        .find(|l| l.x1 == bearish.center_x && l.y1 == bearish.wick_top)
        .expect("bearish wick");
    assert_eq!(wick.color, style.bearish_color);
}

#[test]
fn doji_body_is_drawn_as_a_line() {
    let layout = layout(vec![candle(0, 100, 100)], None, PointerState::Hidden);
    let style = RenderStyle::default();
    let frame = build_render_frame(&layout, &style, ConnectionStatus::Live).expect("frame");
    let doji = layout.candles[0];

    assert!(
        frame
            .lines
            .iter()
            .any(|l| l.x1 == doji.body_left && l.x2 == doji.body_right && l.y1 == doji.body_top && l.y2 == doji.body_top && l.color == style.doji_color)
    );
    assert!(
        !frame
            .rects
            .iter()
            .any(|r| r.x == doji.body_left && r.fill_color == style.doji_color)
    );
}

#[test]
fn overlay_elements_are_emitted() {
    let overlay = AnalysisOverlay::new()
        .with_pattern(1, PatternMark::new(4).with_short_code("ENG"))
        .with_pattern(1, PatternMark::new(5))
        .with_trend_line(TrendLine::new(0, 2, TrendDirection::Support))
        .with_trend_line(TrendLine::new(0, 2, TrendDirection::Resistance));
    let layout = layout(
        vec![candle(0, 100, 120), candle(1, 120, 110), candle(2, 110, 130)],
        Some(&overlay),
        PointerState::Hidden,
    );
    let style = RenderStyle::default();
    let frame = build_render_frame(&layout, &style, ConnectionStatus::Live).expect("frame");

    assert!(frame.lines.iter().any(|l| l.color == style.support_line_color));
    assert!(frame.lines.iter().any(|l| l.color == style.resistance_line_color));

    let labels: Vec<_> = frame
        .texts
        .iter()
        .filter(|t| t.color == style.pattern_label_color)
        .collect();
    assert_eq!(labels.len(), 2);
    assert_eq!(labels[0].text, "ENG");
    assert_eq!(labels[1].text, "#5");
    assert!(labels[1].y < labels[0].y, "second label stacks above the first");
}

#[test]
fn crosshair_adds_guides_and_axis_labels() {
    let candles = vec![candle(0, 100, 120), candle(1, 120, 110), candle(2, 110, 130)];
    let hidden = layout(candles.clone(), None, PointerState::Hidden);
    let hovered = layout(candles, None, PointerState::At { x: 10.0, y: 100.0 });
    let style = RenderStyle::default();

    let base = build_render_frame(&hidden, &style, ConnectionStatus::Live).expect("frame");
    let frame = build_render_frame(&hovered, &style, ConnectionStatus::Live).expect("frame");
    frame.validate().expect("valid frame");

    assert_eq!(frame.lines.len(), base.lines.len() + 2);
    let boxes = frame
        .rects
        .iter()
        .filter(|r| r.fill_color == style.crosshair_label_box_color)
        .count();
    assert_eq!(boxes, 2);
    let crosshair = hovered.crosshair.expect("crosshair");
    let time_label = crosshair.time_label.expect("time label");
    assert!(frame.texts.iter().any(|t| t.text == time_label));
}

#[test]
fn paint_order_keeps_grid_under_candles_and_label_boxes_over_guides() {
    let candles = vec![candle(0, 100, 120), candle(1, 120, 110), candle(2, 110, 130)];
    let hovered = layout(candles, None, PointerState::At { x: 10.0, y: 100.0 });
    let style = RenderStyle::default();
    let frame = build_render_frame(&hovered, &style, ConnectionStatus::Live).expect("frame");
    let order: Vec<Primitive<'_>> = frame.paint_order().collect();
    assert_eq!(order.len(), frame.primitive_count());

    let grid = order
        .iter()
        .position(|p| matches!(p, Primitive::Line(l) if l.color == style.grid_line_color))
        .expect("grid line");
    let body = order
        .iter()
        .position(|p| matches!(p, Primitive::Rect(r) if r.fill_color == style.bullish_color))
        .expect("candle body");
    assert!(grid < body, "grid paints before candle bodies");

    let guide = order
        .iter()
        .position(|p| {
            matches!(p, Primitive::Line(l) if l.color == style.crosshair_line_color && l.y1 == l.y2)
        })
        .expect("horizontal crosshair line");
    let label_box = order
        .iter()
        .position(|p| {
            matches!(p, Primitive::Rect(r) if r.fill_color == style.crosshair_label_box_color)
        })
        .expect("crosshair label box");
    assert!(guide < label_box, "label box covers its guide line");
    assert!(matches!(order.last(), Some(Primitive::Text(_))));
}

#[test]
fn invalid_style_is_rejected() {
    let layout = layout(vec![candle(0, 100, 120)], None, PointerState::Hidden);
    let style = RenderStyle {
        wick_width: 0.0,
        ..RenderStyle::default()
    };
    assert!(build_render_frame(&layout, &style, ConnectionStatus::Live).is_err());
}
