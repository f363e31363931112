use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::core::Candle;
use crate::error::{ChartError, ChartResult};

/// Horizontal space one candle occupies: body width plus gap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandleFootprint {
    pub width_px: f64,
    pub spacing_px: f64,
}

impl CandleFootprint {
    #[must_use]
    pub const fn new(width_px: f64, spacing_px: f64) -> Self {
        Self {
            width_px,
            spacing_px,
        }
    }

    #[must_use]
    pub fn total_px(self) -> f64 {
        self.width_px + self.spacing_px
    }

    /// Left edge of the candle body in window slot `slot`.
    #[must_use]
    pub fn x_offset(self, slot: usize) -> f64 {
        slot as f64 * self.total_px() + self.spacing_px / 2.0
    }

    pub fn validate(self) -> ChartResult<Self> {
        if !self.width_px.is_finite() || self.width_px <= 0.0 {
            return Err(ChartError::InvalidData(
                "candle width must be finite and > 0".to_owned(),
            ));
        }
        if !self.spacing_px.is_finite() || self.spacing_px < 0.0 {
            return Err(ChartError::InvalidData(
                "candle spacing must be finite and >= 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Contiguous suffix of the series that fits the drawing width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleWindow {
    pub start_index: usize,
    pub count: usize,
}

impl VisibleWindow {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.count == 0
    }

    /// One past the last visible index.
    #[must_use]
    pub fn end_index(self) -> usize {
        self.start_index + self.count
    }

    #[must_use]
    pub fn range(self) -> Range<usize> {
        self.start_index..self.end_index()
    }

    #[must_use]
    pub fn contains(self, index: usize) -> bool {
        self.range().contains(&index)
    }

    /// Visible part of `candles`; empty when the window does not fit them.
    #[must_use]
    pub fn slice(self, candles: &[Candle]) -> &[Candle] {
        candles.get(self.range()).unwrap_or(&[])
    }
}

/// Selects how many candles fit and where the leftmost one starts.
///
/// The window always anchors to the most recent candle; zoom only changes
/// `footprint_px`.
pub fn select_window(
    total_candles: usize,
    drawable_width_px: f64,
    footprint_px: f64,
) -> ChartResult<VisibleWindow> {
    if !footprint_px.is_finite() || footprint_px <= 0.0 {
        return Err(ChartError::InvalidData(
            "candle footprint must be finite and > 0".to_owned(),
        ));
    }
    if !drawable_width_px.is_finite() {
        return Err(ChartError::InvalidData(
            "drawable width must be finite".to_owned(),
        ));
    }

    let max_visible = if drawable_width_px <= 0.0 {
        0
    } else {
        (drawable_width_px / footprint_px).floor() as usize
    };

    if max_visible >= total_candles {
        return Ok(VisibleWindow {
            start_index: 0,
            count: total_candles,
        });
    }

    Ok(VisibleWindow {
        start_index: total_candles - max_visible,
        count: max_visible,
    })
}
