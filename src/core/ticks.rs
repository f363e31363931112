use crate::core::ValueRange;
use crate::error::{ChartError, ChartResult};

pub const DEFAULT_PRICE_TICK_COUNT: usize = 20;
/// Upper bound on generated price ticks regardless of inputs.
pub const MAX_PRICE_TICKS: usize = 512;

const TICK_TOLERANCE_RATIO: f64 = 1e-9;

/// Price values at which horizontal gridlines and labels are drawn.
///
/// The increment is `span / tick_count` rounded down to a multiple of
/// `granularity` (one fixed-point price unit by default). A zero increment
/// would never advance, so it becomes `2 * granularity`.
pub fn price_ticks(
    range: ValueRange,
    tick_count: usize,
    granularity: f64,
) -> ChartResult<Vec<f64>> {
    if tick_count == 0 {
        return Err(ChartError::InvalidData(
            "tick count must be > 0".to_owned(),
        ));
    }
    if !range.min.is_finite() || !range.max.is_finite() || range.min > range.max {
        return Err(ChartError::InvalidData(
            "tick range must be finite with min <= max".to_owned(),
        ));
    }

    let increment = tick_increment(range.span(), tick_count, granularity)?;
    let tolerance = increment * TICK_TOLERANCE_RATIO;

    let mut ticks = Vec::with_capacity((tick_count + 1).min(MAX_PRICE_TICKS));
    let mut k = 0usize;
    loop {
        let value = range.min + k as f64 * increment;
        if value > range.max + tolerance || ticks.len() >= MAX_PRICE_TICKS {
            break;
        }
        ticks.push(value);
        k += 1;
    }
    Ok(ticks)
}

fn tick_increment(span: f64, tick_count: usize, granularity: f64) -> ChartResult<f64> {
    if !granularity.is_finite() || granularity <= 0.0 {
        return Err(ChartError::InvalidData(
            "tick granularity must be finite and > 0".to_owned(),
        ));
    }

    let raw = span / tick_count as f64;
    let rounded = (raw / granularity).floor() * granularity;
    if rounded <= 0.0 || !rounded.is_finite() {
        return Ok(2.0 * granularity);
    }
    Ok(rounded)
}

/// Window slots that carry a vertical gridline, every `interval` candles.
#[must_use]
pub fn time_grid_slots(visible_count: usize, interval: usize) -> Vec<usize> {
    if interval == 0 {
        return Vec::new();
    }
    (0..visible_count).step_by(interval).collect()
}
