use serde::{Deserialize, Serialize};

use crate::core::Candle;
use crate::error::{ChartError, ChartResult};

/// Inclusive `{min, max}` bounds over a candle window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

pub type PriceRange = ValueRange;
pub type VolumeRange = ValueRange;

/// Candle fields a range scan reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeField {
    /// Minimum of lows and maximum of highs.
    Price,
    /// Minimum and maximum of volumes.
    Volume,
}

/// Price and volume bounds of the same window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowRanges {
    pub price: PriceRange,
    pub volume: VolumeRange,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> ChartResult<Self> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(ChartError::InvalidData(format!(
                "range bounds must be finite with min <= max, got [{min}, {max}]"
            )));
        }
        Ok(Self { min, max })
    }

    #[must_use]
    pub fn span(self) -> f64 {
        self.max - self.min
    }

    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Widens the range outward to multiples of `tick_size`.
    ///
    /// The result contains `self` and its span is an integer multiple of
    /// `tick_size`, so gridlines land on round values.
    pub fn snapped(self, tick_size: f64) -> ChartResult<Self> {
        if !tick_size.is_finite() || tick_size <= 0.0 {
            return Err(ChartError::InvalidData(
                "tick size must be finite and > 0".to_owned(),
            ));
        }
        Ok(Self {
            min: (self.min / tick_size).floor() * tick_size,
            max: (self.max / tick_size).ceil() * tick_size,
        })
    }

    /// Widens a collapsed range symmetrically to at least `min_span`.
    ///
    /// A single flat candle yields `min == max`; a map built on that would
    /// divide by zero.
    pub fn with_min_span(self, min_span: f64) -> ChartResult<Self> {
        if !min_span.is_finite() || min_span <= 0.0 {
            return Err(ChartError::InvalidData(
                "minimum span must be finite and > 0".to_owned(),
            ));
        }
        if self.span() >= min_span {
            return Ok(self);
        }
        let center = (self.min + self.max) / 2.0;
        let half = min_span / 2.0;
        Ok(Self {
            min: center - half,
            max: center + half,
        })
    }
}

/// Scans a visible candle slice for the requested field bounds.
///
/// Never pass the whole series here, only the visible window.
pub fn find_range(candles: &[Candle], field: RangeField) -> ChartResult<ValueRange> {
    let (first, rest) = candles.split_first().ok_or(ChartError::EmptyRange)?;

    let seed = match field {
        RangeField::Price => (first.low, first.high),
        RangeField::Volume => (first.volume, first.volume),
    };
    let (min, max) = rest.iter().fold(seed, |(min, max), candle| match field {
        RangeField::Price => (min.min(candle.low), max.max(candle.high)),
        RangeField::Volume => (min.min(candle.volume), max.max(candle.volume)),
    });

    Ok(ValueRange {
        min: min as f64,
        max: max as f64,
    })
}

pub fn find_price_range(candles: &[Candle]) -> ChartResult<PriceRange> {
    find_range(candles, RangeField::Price)
}

pub fn find_volume_range(candles: &[Candle]) -> ChartResult<VolumeRange> {
    find_range(candles, RangeField::Volume)
}

pub fn find_window_ranges(candles: &[Candle]) -> ChartResult<WindowRanges> {
    Ok(WindowRanges {
        price: find_price_range(candles)?,
        volume: find_volume_range(candles)?,
    })
}
