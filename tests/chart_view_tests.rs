use candleview::api::{ChartView, LayoutConfig, NO_DATA_TEXT, RenderStyle};
use candleview::core::{AnalysisOverlay, Candle, CandleSeries, PatternMark, Viewport};
use candleview::interaction::PointerState;
use candleview::render::{NullRenderer, SvgRenderer};
use candleview::session::ConnectionStatus;

fn series(count: i64) -> CandleSeries {
    CandleSeries::from_candles(
        (0..count)
            .map(|i| {
                let open = 1_000 + i;
                Candle::new(open, open + 8, open - 8, open + 3, 10, i, i).expect("valid candle")
            })
            .collect(),
    )
    .expect("series")
}

#[test]
fn render_frame_submits_to_renderer_and_keeps_layout() {
    let mut view = ChartView::new(NullRenderer::default(), LayoutConfig::default()).expect("view");
    assert!(view.last_layout().is_none());

    let data = series(50);
    let visible = view
        .render_frame(&data, None, Viewport::new(900, 500), None, ConnectionStatus::Live)
        .expect("render")
        .window
        .count;
    assert_eq!(visible, 50);

    let renderer = view.renderer();
    assert_eq!(renderer.frames_rendered, 1);
    assert!(renderer.last_rect_count >= 100, "volume bars and bodies");
    assert_eq!(
        renderer.last_frame.as_ref().map(|f| f.primitive_count()),
        Some(renderer.last_line_count + renderer.last_rect_count + renderer.last_text_count)
    );
    assert!(view.last_layout().is_some());
}

#[test]
fn wheel_zoom_changes_visible_count() {
    let mut view = ChartView::new(NullRenderer::default(), LayoutConfig::default()).expect("view");
    let data = series(500);
    let viewport = Viewport::new(800, 400);

    let before = view.layout(&data, None, viewport, None).expect("layout").window.count;
    assert!(view.on_wheel(120.0));
    let zoomed_in = view.layout(&data, None, viewport, None).expect("layout").window.count;
    assert!(zoomed_in < before);

    assert!(view.on_wheel(-120.0));
    assert!(!view.on_wheel(-120.0), "already at minimum width");
    let zoomed_out = view.layout(&data, None, viewport, None).expect("layout").window.count;
    assert_eq!(zoomed_out, before);
    assert!(!view.on_wheel(0.0));
}

#[test]
fn pointer_changes_report_redraw_need() {
    let mut view = ChartView::new(NullRenderer::default(), LayoutConfig::default()).expect("view");
    assert!(view.on_pointer_move(10.0, 20.0));
    assert!(!view.on_pointer_move(10.0, 20.0));
    assert_eq!(view.pointer(), PointerState::At { x: 10.0, y: 20.0 });
    assert!(view.on_pointer_leave());
    assert!(!view.on_pointer_leave());
    assert_eq!(view.pointer(), PointerState::Hidden);
}

#[test]
fn invalid_layout_config_is_rejected() {
    let config = LayoutConfig::default().with_volume_pane_ratio(1.5);
    assert!(ChartView::new(NullRenderer::default(), config).is_err());
}

#[test]
fn svg_document_contains_placeholder_when_empty() {
    let mut view = ChartView::new(SvgRenderer::new(), LayoutConfig::default()).expect("view");
    view.render_frame(
        &CandleSeries::new(),
        None,
        Viewport::new(400, 300),
        None,
        ConnectionStatus::Disconnected,
    )
    .expect("render");

    let document = view.renderer().document();
    assert!(document.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"400\" height=\"300\""));
    assert!(document.ends_with("</svg>\n"));
    assert!(document.contains(NO_DATA_TEXT));
    assert!(document.contains("DISCONNECTED"));
    assert_eq!(view.renderer().frames_rendered(), 1);
}

#[test]
fn svg_document_draws_dashed_grid_and_escapes_labels() {
    let overlay = AnalysisOverlay::new().with_pattern(2, PatternMark::new(3).with_short_code("<H&S>"));
    let mut view = ChartView::new(SvgRenderer::new(), LayoutConfig::default()).expect("view");
    view.render_frame(
        &series(5),
        Some(&overlay),
        Viewport::new(600, 300),
        Some(10),
        ConnectionStatus::Live,
    )
    .expect("render");

    let document = view.renderer().document();
    assert!(document.contains(r#"stroke-dasharray="2 5""#));
    assert!(document.contains("&lt;H&amp;S&gt;"));
    assert!(!document.contains("<H&S>"));
    assert!(document.contains("<rect x=\"0\" y=\"0\" width=\"600\" height=\"300\" fill=\"#131722\"/>"));
}

#[test]
fn svg_document_paints_grid_before_candles() {
    let mut view = ChartView::new(SvgRenderer::new(), LayoutConfig::default()).expect("view");
    view.render_frame(&series(20), None, Viewport::new(600, 300), Some(10), ConnectionStatus::Live)
        .expect("render");

    let document = view.renderer().document();
    let grid = document.find(r#"stroke-dasharray="2 5""#).expect("grid line");
    let body = document.find(r##"fill="#26a69a""##).expect("bullish candle or volume");
    assert!(grid < body);
}

#[test]
fn with_style_rejects_invalid_style() {
    let invalid = RenderStyle {
        trend_line_width: -1.0,
        ..RenderStyle::default()
    };
    let view = ChartView::new(NullRenderer::default(), LayoutConfig::default()).expect("view");
    assert!(view.with_style(invalid).is_err());

    let view = ChartView::new(NullRenderer::default(), LayoutConfig::default()).expect("view");
    let style = RenderStyle {
        wick_width: 2.0,
        ..RenderStyle::default()
    };
    let view = view.with_style(style).expect("valid style");
    assert_eq!(view.style(), &style);
}
