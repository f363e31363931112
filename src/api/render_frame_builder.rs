use crate::core::TrendDirection;
use crate::error::ChartResult;
use crate::render::{
    LinePrimitive, RectPrimitive, RenderFrame, RenderLayer, TextHAlign, TextPrimitive, TextVAlign,
};
use crate::session::ConnectionStatus;

use super::{FrameLayout, RenderStyle};

pub const NO_DATA_TEXT: &str = "NO DATA";

/// Rough monospace advance used to size label boxes.
const LABEL_CHAR_WIDTH_RATIO: f64 = 0.62;
const LABEL_BOX_PADDING_PX: f64 = 4.0;
const STATUS_INSET_PX: f64 = 6.0;

/// Converts a computed layout into backend-agnostic primitives.
///
/// Gridlines and tick labels go on `RenderLayer::Grid`, volume and candles
/// on `Series`, trend, last-price and crosshair lines on `Overlay`, and label
/// boxes with their text on `Labels`. Renderers paint via
/// `RenderFrame::paint_order`.
pub fn build_render_frame(
    layout: &FrameLayout,
    style: &RenderStyle,
    status: ConnectionStatus,
) -> ChartResult<RenderFrame> {
    style.validate()?;
    let mut frame = RenderFrame::new(layout.viewport).with_background(style.background_color);
    let plot = layout.plot;
    let axis = layout.price_axis;
    let lower = layout.volume_pane.map_or(plot.bottom, |pane| pane.bottom);

    frame.lines.push(
        LinePrimitive::new(
            axis.left,
            axis.top,
            axis.left,
            axis.bottom,
            1.0,
            style.axis_border_color,
        )
        .on_layer(RenderLayer::Grid),
    );

    if layout.is_empty() {
        frame.texts.push(TextPrimitive::new(
            NO_DATA_TEXT,
            (plot.left + plot.right) / 2.0,
            (plot.top + lower) / 2.0,
            style.placeholder_font_size_px,
            style.placeholder_text_color,
            TextHAlign::Center,
        ));
        push_status(&mut frame, layout, style, status);
        return Ok(frame);
    }

    let label_x = axis.left + style.axis_label_padding_px;
    let last_tick = layout.price_ticks.len().saturating_sub(1);
    for (i, tick) in layout.price_ticks.iter().enumerate() {
        frame.lines.push(
            LinePrimitive::new(
                plot.left,
                tick.y,
                plot.right,
                tick.y,
                style.grid_line_width,
                style.grid_line_color,
            )
            .with_stroke_style(style.grid_line_style)
            .on_layer(RenderLayer::Grid),
        );
        // Edge labels stay inside the plot's vertical extent.
        let v_align = if i == 0 {
            TextVAlign::Bottom
        } else if i == last_tick {
            TextVAlign::Top
        } else {
            TextVAlign::Middle
        };
        frame.texts.push(
            TextPrimitive::new(
                tick.label.as_str(),
                label_x,
                tick.y,
                style.axis_label_font_size_px,
                style.axis_label_color,
                TextHAlign::Left,
            )
            .with_v_align(v_align)
            .on_layer(RenderLayer::Grid),
        );
    }

    for tick in &layout.time_ticks {
        frame.lines.push(
            LinePrimitive::new(
                tick.x,
                plot.top,
                tick.x,
                lower,
                style.grid_line_width,
                style.grid_line_color,
            )
            .with_stroke_style(style.grid_line_style)
            .on_layer(RenderLayer::Grid),
        );
        if let Some(label) = &tick.label {
            frame.texts.push(
                TextPrimitive::new(
                    label.as_str(),
                    tick.x,
                    lower + 2.0,
                    style.axis_label_font_size_px,
                    style.axis_label_color,
                    TextHAlign::Center,
                )
                .with_v_align(TextVAlign::Top)
                .on_layer(RenderLayer::Grid),
            );
        }
    }

    for bar in &layout.volume_bars {
        let color = if bar.is_bullish {
            style.bullish_volume_color
        } else {
            style.bearish_volume_color
        };
        frame.rects.push(RectPrimitive::new(
            bar.left,
            bar.top,
            bar.right - bar.left,
            bar.bottom - bar.top,
            color,
        ));
    }

    for candle in &layout.candles {
        let color = style.candle_color(candle.is_bullish, candle.is_doji);
        frame.lines.push(LinePrimitive::new(
            candle.center_x,
            candle.wick_top,
            candle.center_x,
            candle.wick_bottom,
            style.wick_width,
            color,
        ));
        if candle.is_doji {
            frame.lines.push(LinePrimitive::new(
                candle.body_left,
                candle.body_top,
                candle.body_right,
                candle.body_top,
                style.wick_width,
                color,
            ));
        } else {
            frame.rects.push(RectPrimitive::new(
                candle.body_left,
                candle.body_top,
                candle.body_right - candle.body_left,
                candle.body_bottom - candle.body_top,
                color,
            ));
        }
    }

    for segment in &layout.trend_segments {
        let color = match segment.direction {
            TrendDirection::Support => style.support_line_color,
            TrendDirection::Resistance => style.resistance_line_color,
        };
        frame.lines.push(
            LinePrimitive::new(
                segment.x1,
                segment.y1,
                segment.x2,
                segment.y2,
                style.trend_line_width,
                color,
            )
            .on_layer(RenderLayer::Overlay),
        );
    }

    let pattern_line_height = style.pattern_label_font_size_px + 2.0;
    for marker in &layout.pattern_markers {
        for (row, label) in marker.labels.iter().enumerate() {
            frame.texts.push(
                TextPrimitive::new(
                    label.as_str(),
                    marker.x,
                    marker.y - row as f64 * pattern_line_height,
                    style.pattern_label_font_size_px,
                    style.pattern_label_color,
                    TextHAlign::Center,
                )
                .with_v_align(TextVAlign::Bottom),
            );
        }
    }

    if let Some(last) = &layout.last_price {
        let color = if last.is_bullish {
            style.bullish_color
        } else {
            style.bearish_color
        };
        frame.lines.push(
            LinePrimitive::new(plot.left, last.y, plot.right, last.y, 1.0, color)
                .with_stroke_style(style.grid_line_style)
                .on_layer(RenderLayer::Overlay),
        );
        let height = style.last_price_box_height_px;
        frame.rects.push(
            RectPrimitive::new(axis.left, last.y - height / 2.0, axis.width(), height, color)
                .on_layer(RenderLayer::Labels),
        );
        frame.texts.push(TextPrimitive::new(
            last.label.as_str(),
            label_x,
            last.y,
            style.axis_label_font_size_px,
            style.last_price_text_color,
            TextHAlign::Left,
        ));
    }

    if let Some(crosshair) = &layout.crosshair {
        frame.lines.push(
            LinePrimitive::new(
                crosshair.x,
                plot.top,
                crosshair.x,
                lower,
                style.crosshair_line_width,
                style.crosshair_line_color,
            )
            .with_stroke_style(style.crosshair_line_style)
            .on_layer(RenderLayer::Overlay),
        );
        if let Some(price_label) = &crosshair.price_label {
            frame.lines.push(
                LinePrimitive::new(
                    plot.left,
                    crosshair.y,
                    plot.right,
                    crosshair.y,
                    style.crosshair_line_width,
                    style.crosshair_line_color,
                )
                .with_stroke_style(style.crosshair_line_style)
                .on_layer(RenderLayer::Overlay),
            );
            let height = style.last_price_box_height_px;
            frame.rects.push(
                RectPrimitive::new(
                    axis.left,
                    crosshair.y - height / 2.0,
                    axis.width(),
                    height,
                    style.crosshair_label_box_color,
                )
                .on_layer(RenderLayer::Labels),
            );
            frame.texts.push(TextPrimitive::new(
                price_label.as_str(),
                label_x,
                crosshair.y,
                style.axis_label_font_size_px,
                style.crosshair_label_text_color,
                TextHAlign::Left,
            ));
        }
        if let Some(time_label) = &crosshair.time_label {
            let width = estimate_label_width_px(time_label, style.axis_label_font_size_px);
            let height = style.axis_label_font_size_px + LABEL_BOX_PADDING_PX;
            frame.rects.push(
                RectPrimitive::new(
                    crosshair.x - width / 2.0,
                    lower,
                    width,
                    height,
                    style.crosshair_label_box_color,
                )
                .on_layer(RenderLayer::Labels),
            );
            frame.texts.push(
                TextPrimitive::new(
                    time_label.as_str(),
                    crosshair.x,
                    lower + 2.0,
                    style.axis_label_font_size_px,
                    style.crosshair_label_text_color,
                    TextHAlign::Center,
                )
                .with_v_align(TextVAlign::Top),
            );
        }
    }

    push_status(&mut frame, layout, style, status);
    Ok(frame)
}

fn push_status(
    frame: &mut RenderFrame,
    layout: &FrameLayout,
    style: &RenderStyle,
    status: ConnectionStatus,
) {
    if let Some(text) = status.indicator_text() {
        frame.texts.push(
            TextPrimitive::new(
                text,
                layout.plot.left + STATUS_INSET_PX,
                STATUS_INSET_PX,
                style.status_font_size_px,
                style.status_text_color,
                TextHAlign::Left,
            )
            .with_v_align(TextVAlign::Top),
        );
    }
}

fn estimate_label_width_px(text: &str, font_size_px: f64) -> f64 {
    text.chars().count() as f64 * font_size_px * LABEL_CHAR_WIDTH_RATIO + 2.0 * LABEL_BOX_PADDING_PX
}
