use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::{
    AnalysisOverlay, Candle, CandleFootprint, CandleGeometry, CandleSeries, LinearMap, PixelRect,
    PriceFormat, PriceRange, TrendDirection, Viewport, VisibleWindow, VolumeRange,
    find_window_ranges, format_timestamp, price_ticks, project_candles, select_window,
    time_grid_slots,
};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{PointerState, ZoomController};

use super::LayoutConfig;

/// Gap between a candle high and its pattern label.
const PATTERN_MARKER_OFFSET_PX: f64 = 6.0;

/// Maps shared by every element of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameScales {
    pub price_range: PriceRange,
    pub volume_range: VolumeRange,
    pub price_to_pixel: LinearMap,
    pub pixel_to_price: LinearMap,
    /// `None` when the volume pane is disabled.
    pub volume_to_pixel: Option<LinearMap>,
    /// Series index to candle centre x.
    pub index_to_x: LinearMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeBar {
    pub index: usize,
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub is_bullish: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTick {
    pub value: f64,
    pub y: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeTick {
    pub index: usize,
    pub x: f64,
    /// `None` when the timestamp cannot be represented as a date.
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastPriceMarker {
    pub price: f64,
    pub y: f64,
    pub label: String,
    pub is_bullish: bool,
}

/// Trend line in pixel space, clipped to the plot's horizontal extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendSegment {
    pub direction: TrendDirection,
    pub start_index: usize,
    pub end_index: usize,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMarker {
    pub index: usize,
    pub x: f64,
    /// Baseline of the lowest label, above the candle high.
    pub y: f64,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrosshairLayout {
    /// Snapped to the nearest visible candle centre.
    pub x: f64,
    pub y: f64,
    pub snapped_index: usize,
    /// `None` while the pointer is over the volume pane.
    pub price: Option<f64>,
    pub price_label: Option<String>,
    pub time_label: Option<String>,
}

/// Everything a render pass needs, in pixel space.
///
/// Recomputed from scratch on every redraw; two calls with identical inputs
/// compare equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameLayout {
    pub viewport: Viewport,
    pub plot: PixelRect,
    pub volume_pane: Option<PixelRect>,
    pub price_axis: PixelRect,
    pub window: VisibleWindow,
    pub footprint: CandleFootprint,
    pub price_format: PriceFormat,
    /// `None` for an empty window; no maps are built then.
    pub scales: Option<FrameScales>,
    pub candles: Vec<CandleGeometry>,
    pub volume_bars: Vec<VolumeBar>,
    pub price_ticks: Vec<PriceTick>,
    pub time_ticks: Vec<TimeTick>,
    pub last_price: Option<LastPriceMarker>,
    pub trend_segments: Vec<TrendSegment>,
    pub pattern_markers: Vec<PatternMarker>,
    pub crosshair: Option<CrosshairLayout>,
}

impl FrameLayout {
    /// Layout with panes only: used when there is nothing to draw.
    #[must_use]
    pub fn empty(
        viewport: Viewport,
        panes: FramePanes,
        window: VisibleWindow,
        footprint: CandleFootprint,
        price_format: PriceFormat,
    ) -> Self {
        Self {
            viewport,
            plot: panes.plot,
            volume_pane: panes.volume,
            price_axis: panes.price_axis,
            window,
            footprint,
            price_format,
            scales: None,
            candles: Vec::new(),
            volume_bars: Vec::new(),
            price_ticks: Vec::new(),
            time_ticks: Vec::new(),
            last_price: None,
            trend_segments: Vec::new(),
            pattern_markers: Vec::new(),
            crosshair: None,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scales.is_none()
    }
}

/// Pane rectangles of one viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePanes {
    pub plot: PixelRect,
    pub volume: Option<PixelRect>,
    pub price_axis: PixelRect,
}

/// Splits the viewport into price plot, volume pane and right price axis.
pub fn resolve_panes(viewport: Viewport, config: &LayoutConfig) -> ChartResult<FramePanes> {
    let viewport = viewport.ensure_valid()?;
    let width = f64::from(viewport.width);
    let height = f64::from(viewport.height);

    let plot_right = (width - config.price_axis_width_px).max(0.0);
    let top = config.padding_top_px;
    let bottom = height - config.padding_bottom_px;
    let usable = bottom - top;
    let too_small = || ChartError::InvalidViewport {
        width: viewport.width,
        height: viewport.height,
    };
    if usable <= 0.0 {
        return Err(too_small());
    }

    let (plot_bottom, volume) = if config.volume_pane_ratio > 0.0 {
        let volume_top = bottom - usable * config.volume_pane_ratio;
        (
            volume_top - config.volume_pane_gap_px,
            Some(PixelRect::new(0.0, volume_top, plot_right, bottom)),
        )
    } else {
        (bottom, None)
    };
    if plot_bottom <= top {
        return Err(too_small());
    }

    Ok(FramePanes {
        plot: PixelRect::new(0.0, top, plot_right, plot_bottom),
        volume,
        price_axis: PixelRect::new(plot_right, 0.0, width, height),
    })
}

/// Computes the full layout of one redraw.
///
/// Window selection, range finding and map construction run in that order
/// over the visible slice only. `precision` is the payload precision; the
/// configured default applies when it is `None`.
pub fn compute_frame_layout(
    series: &CandleSeries,
    overlay: Option<&AnalysisOverlay>,
    viewport: Viewport,
    config: &LayoutConfig,
    zoom: &ZoomController,
    pointer: PointerState,
    precision: Option<i64>,
) -> ChartResult<FrameLayout> {
    config.validate()?;
    let panes = resolve_panes(viewport, config)?;
    let price_format = config.price_format(precision)?;
    let footprint = zoom.footprint().validate()?;
    let plot = panes.plot;

    let candles = series.as_slice();
    let window = select_window(candles.len(), plot.width(), footprint.total_px())?;
    if window.is_empty() {
        debug!(
            total_candles = candles.len(),
            plot_width = plot.width(),
            "empty visible window"
        );
        return Ok(FrameLayout::empty(
            viewport,
            panes,
            window,
            footprint,
            price_format,
        ));
    }

    let visible = window.slice(candles);
    let ranges = find_window_ranges(visible)?;
    let mut price_range = ranges.price.with_min_span(config.min_price_span)?;
    if let Some(snap) = config.price_range_snap {
        price_range = price_range.snapped(snap)?;
    }

    let price_to_pixel = LinearMap::new(price_range.min, plot.bottom, price_range.max, plot.top)?;
    let pixel_to_price = price_to_pixel.inverse()?;
    let first_center = plot.left + footprint.x_offset(0) + footprint.width_px / 2.0;
    let start = window.start_index as f64;
    let index_to_x = LinearMap::new(
        start,
        first_center,
        start + 1.0,
        first_center + footprint.total_px(),
    )?;
    let volume_to_pixel = match panes.volume {
        Some(pane) => Some(LinearMap::new(
            0.0,
            pane.bottom,
            ranges.volume.max.max(1.0),
            pane.top,
        )?),
        None => None,
    };

    let geometry = project_candles(
        visible,
        window.start_index,
        footprint,
        price_to_pixel,
        plot.left,
    )?;

    let volume_bars = match (volume_to_pixel, panes.volume) {
        (Some(map), Some(pane)) => geometry
            .iter()
            .zip(visible)
            .map(|(geom, candle)| VolumeBar {
                index: geom.index,
                left: geom.body_left,
                right: geom.body_right,
                top: map.eval(candle.volume as f64).min(pane.bottom),
                bottom: pane.bottom,
                is_bullish: geom.is_bullish,
            })
            .collect(),
        _ => Vec::new(),
    };

    let price_ticks = price_ticks(
        price_range,
        config.price_tick_count,
        config.price_tick_granularity,
    )?
    .into_iter()
    .map(|value| PriceTick {
        value,
        y: price_to_pixel.eval(value),
        label: price_format.format(value),
    })
    .collect();

    let time_ticks = time_grid_slots(window.count, config.time_grid_interval)
        .into_iter()
        .filter_map(|slot| {
            let geom = geometry.get(slot)?;
            let candle = visible.get(slot)?;
            Some(TimeTick {
                index: geom.index,
                x: geom.center_x,
                label: format_timestamp(
                    config.timestamp_unit,
                    candle.start,
                    &config.time_label_format,
                ),
            })
        })
        .collect();

    let last_price = visible.last().map(|candle| {
        let price = candle.close as f64;
        LastPriceMarker {
            price,
            y: price_to_pixel.eval(price),
            label: price_format.format(price),
            is_bullish: candle.is_bullish(),
        }
    });

    let (trend_segments, pattern_markers) = match overlay {
        Some(overlay) => (
            trend_segments(overlay, candles, plot, index_to_x, price_to_pixel),
            pattern_markers(overlay, &geometry),
        ),
        None => (Vec::new(), Vec::new()),
    };

    let crosshair = pointer.position().and_then(|(x, y)| {
        crosshair_layout(
            x,
            y,
            &panes,
            &geometry,
            candles,
            pixel_to_price,
            price_format,
            config,
        )
    });

    trace!(
        start_index = window.start_index,
        count = window.count,
        price_min = price_range.min,
        price_max = price_range.max,
        "frame layout computed"
    );

    Ok(FrameLayout {
        viewport,
        plot,
        volume_pane: panes.volume,
        price_axis: panes.price_axis,
        window,
        footprint,
        price_format,
        scales: Some(FrameScales {
            price_range,
            volume_range: ranges.volume,
            price_to_pixel,
            pixel_to_price,
            volume_to_pixel,
            index_to_x,
        }),
        candles: geometry,
        volume_bars,
        price_ticks,
        time_ticks,
        last_price,
        trend_segments,
        pattern_markers,
        crosshair,
    })
}

fn trend_segments(
    overlay: &AnalysisOverlay,
    candles: &[Candle],
    plot: PixelRect,
    index_to_x: LinearMap,
    price_to_pixel: LinearMap,
) -> Vec<TrendSegment> {
    overlay
        .trend_lines()
        .iter()
        .filter_map(|line| {
            let Some(((i1, p1), (i2, p2))) = line.anchors(candles) else {
                trace!(
                    start_index = line.start_index,
                    end_index = line.end_index,
                    total = candles.len(),
                    "trend line outside series"
                );
                return None;
            };
            let (x1, y1) = (index_to_x.eval(i1 as f64), price_to_pixel.eval(p1));
            let (x2, y2) = (index_to_x.eval(i2 as f64), price_to_pixel.eval(p2));
            let (x1, y1, x2, y2) = clip_horizontally(x1, y1, x2, y2, plot.left, plot.right)?;
            Some(TrendSegment {
                direction: line.direction,
                start_index: line.start_index,
                end_index: line.end_index,
                x1,
                y1,
                x2,
                y2,
            })
        })
        .collect()
}

/// Clips a segment to `[left, right]`; `None` when it lies fully outside.
///
/// Endpoints already inside the range are returned untouched.
fn clip_horizontally(
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    left: f64,
    right: f64,
) -> Option<(f64, f64, f64, f64)> {
    if x1.max(x2) < left || x1.min(x2) > right {
        return None;
    }
    if (left..=right).contains(&x1) && (left..=right).contains(&x2) {
        return Some((x1, y1, x2, y2));
    }
    // Some endpoint is outside, so x1 != x2 here.
    let line = LinearMap::new(x1, y1, x2, y2).ok()?;
    let clip = |x: f64, y: f64| {
        let cx = x.clamp(left, right);
        if cx == x { (x, y) } else { (cx, line.eval(cx)) }
    };
    let (cx1, cy1) = clip(x1, y1);
    let (cx2, cy2) = clip(x2, y2);
    Some((cx1, cy1, cx2, cy2))
}

fn pattern_markers(overlay: &AnalysisOverlay, geometry: &[CandleGeometry]) -> Vec<PatternMarker> {
    geometry
        .iter()
        .filter_map(|geom| {
            let marks = overlay.patterns_at(geom.index);
            if marks.is_empty() {
                return None;
            }
            Some(PatternMarker {
                index: geom.index,
                x: geom.center_x,
                y: geom.wick_top - PATTERN_MARKER_OFFSET_PX,
                labels: marks.iter().map(|mark| mark.label()).collect(),
            })
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn crosshair_layout(
    x: f64,
    y: f64,
    panes: &FramePanes,
    geometry: &[CandleGeometry],
    candles: &[Candle],
    pixel_to_price: LinearMap,
    price_format: PriceFormat,
    config: &LayoutConfig,
) -> Option<CrosshairLayout> {
    let plot = panes.plot;
    let lower = panes.volume.map_or(plot.bottom, |pane| pane.bottom);
    if x < plot.left || x > plot.right || y < plot.top || y > lower {
        return None;
    }

    let nearest = geometry
        .iter()
        .min_by_key(|geom| OrderedFloat((geom.center_x - x).abs()))?;
    let price = plot.contains(x, y).then(|| pixel_to_price.eval(y));
    let time_label = candles.get(nearest.index).and_then(|candle| {
        format_timestamp(
            config.timestamp_unit,
            candle.start,
            &config.time_label_format,
        )
    });

    Some(CrosshairLayout {
        x: nearest.center_x,
        y,
        snapped_index: nearest.index,
        price,
        price_label: price.map(|value| price_format.format(value)),
        time_label,
    })
}

#[cfg(test)]
mod tests {
    use super::clip_horizontally;

    #[test]
    fn clip_keeps_inner_segment() {
        let clipped = clip_horizontally(10.0, 5.0, 20.0, 15.0, 0.0, 100.0).expect("inside");
        assert_eq!(clipped, (10.0, 5.0, 20.0, 15.0));
    }

    #[test]
    fn clip_interpolates_at_left_edge() {
        let clipped = clip_horizontally(-10.0, 0.0, 10.0, 20.0, 0.0, 100.0).expect("crossing");
        assert_eq!(clipped, (0.0, 10.0, 10.0, 20.0));
    }

    #[test]
    fn clip_leaves_the_inner_endpoint_bit_exact() {
        let (x1, y1) = (56.714_285_714_282_624, 123.456_789_012_345_6);
        let clipped = clip_horizontally(-20.0, 10.0, x1, y1, 0.0, 100.0).expect("crossing");
        assert_eq!(clipped.0, 0.0);
        assert_eq!((clipped.2, clipped.3), (x1, y1));
    }

    #[test]
    fn clip_keeps_endpoint_order() {
        let clipped = clip_horizontally(120.0, 0.0, 20.0, 10.0, 0.0, 100.0).expect("crossing");
        assert_eq!(clipped, (100.0, 2.0, 20.0, 10.0));
    }

    #[test]
    fn clip_drops_segments_left_of_plot() {
        assert!(clip_horizontally(-30.0, 0.0, -10.0, 5.0, 0.0, 100.0).is_none());
    }
}
