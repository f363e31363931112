#![cfg(feature = "cairo-backend")]

use cairo::{Context, Format, ImageSurface};
use candleview::ChartError;
use candleview::api::{ChartView, LayoutConfig};
use candleview::core::{Candle, CandleSeries, Viewport};
use candleview::render::{CairoContextRenderer, CairoRenderer};
use candleview::session::ConnectionStatus;

fn series() -> CandleSeries {
    CandleSeries::from_candles(
        (0..20)
            .map(|i| {
                let open = 5_000 + i * 3;
                Candle::new(open, open + 20, open - 20, open + 7, 40, i, i).expect("valid candle")
            })
            .collect(),
    )
    .expect("series")
}

#[test]
fn cairo_renderer_rejects_invalid_surface_size() {
    let err = CairoRenderer::new(0, 480).expect_err("invalid width must fail");
    assert!(matches!(err, ChartError::InvalidData(_)));
}

#[test]
fn cairo_renderer_draws_every_primitive() {
    let renderer = CairoRenderer::new(900, 500).expect("renderer");
    let mut view = ChartView::new(renderer, LayoutConfig::default()).expect("view");
    let data = series();
    let frame = view
        .build_frame(&data, None, Viewport::new(900, 500), Some(100), ConnectionStatus::Stale)
        .expect("frame");
    view.render_frame(&data, None, Viewport::new(900, 500), Some(100), ConnectionStatus::Stale)
        .expect("render");

    let stats = view.renderer().last_stats();
    assert_eq!(stats.lines_drawn, frame.lines.len());
    assert_eq!(stats.rects_drawn, frame.rects.len());
    assert_eq!(stats.texts_drawn, frame.texts.len());

    let mut png = Vec::new();
    view.renderer().write_png(&mut png).expect("png");
    assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
}

#[test]
fn cairo_renderer_can_draw_on_external_context() {
    let view = ChartView::new(CairoRenderer::new(10, 10).expect("renderer"), LayoutConfig::default())
        .expect("view");
    let frame = view
        .build_frame(&series(), None, Viewport::new(600, 320), None, ConnectionStatus::Live)
        .expect("frame");

    let surface = ImageSurface::create(Format::ARgb32, 600, 320).expect("surface");
    let context = Context::new(&surface).expect("context");
    let mut renderer = CairoRenderer::new(10, 10).expect("renderer");
    renderer
        .render_on_cairo_context(&context, &frame)
        .expect("render on context");
    assert_eq!(renderer.last_stats().texts_drawn, frame.texts.len());
}
