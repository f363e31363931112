use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel-projection")]
use rayon::prelude::*;

use crate::core::{CandleFootprint, LinearMap};
use crate::error::{ChartError, ChartResult};

/// One OHLCV bar with fixed-point prices.
///
/// Prices are integers scaled by the payload precision. Timestamps are kept
/// in the server's unit; the engine only compares them for equality and order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    pub open: i64,
    pub high: i64,
    pub low: i64,
    pub close: i64,
    pub volume: i64,
    pub start: i64,
    pub end: i64,
    #[serde(default)]
    pub best_bid: Option<i64>,
    #[serde(default)]
    pub best_ask: Option<i64>,
}

impl Candle {
    /// Builds a validated candle.
    ///
    /// Invariants:
    /// - `low <= min(open, close) <= max(open, close) <= high`
    /// - `volume >= 0`
    /// - `start <= end`
    pub fn new(
        open: i64,
        high: i64,
        low: i64,
        close: i64,
        volume: i64,
        start: i64,
        end: i64,
    ) -> ChartResult<Self> {
        let candle = Self {
            open,
            high,
            low,
            close,
            volume,
            start,
            end,
            best_bid: None,
            best_ask: None,
        };
        candle.validate()?;
        Ok(candle)
    }

    #[must_use]
    pub fn with_quotes(mut self, best_bid: i64, best_ask: i64) -> Self {
        self.best_bid = Some(best_bid);
        self.best_ask = Some(best_ask);
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        if self.low > self.high {
            return Err(ChartError::InvalidData(format!(
                "candle low {} must be <= high {}",
                self.low, self.high
            )));
        }
        let body_low = self.open.min(self.close);
        let body_high = self.open.max(self.close);
        if body_low < self.low || body_high > self.high {
            return Err(ChartError::InvalidData(
                "candle open/close must be within low/high range".to_owned(),
            ));
        }
        if self.volume < 0 {
            return Err(ChartError::InvalidData(format!(
                "candle volume must be >= 0, got {}",
                self.volume
            )));
        }
        if self.start > self.end {
            return Err(ChartError::InvalidData(format!(
                "candle start {} must be <= end {}",
                self.start, self.end
            )));
        }
        Ok(())
    }

    /// Returns `true` when close price is greater than or equal to open price.
    #[must_use]
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }

    #[must_use]
    pub fn is_doji(&self) -> bool {
        self.open == self.close
    }

    /// Returns `true` when OHLC values differ from `other`.
    #[must_use]
    pub fn prices_differ(&self, other: &Self) -> bool {
        self.open != other.open
            || self.high != other.high
            || self.low != other.low
            || self.close != other.close
    }
}

/// Projected candle geometry in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandleGeometry {
    pub index: usize,
    pub center_x: f64,
    pub body_left: f64,
    pub body_right: f64,
    pub body_top: f64,
    pub body_bottom: f64,
    pub wick_top: f64,
    pub wick_bottom: f64,
    pub is_bullish: bool,
    pub is_doji: bool,
}

/// Projects a visible candle slice into deterministic render geometry.
///
/// `first_index` is the series index of `candles[0]`; slot `n` of the slice
/// is placed at `plot_left + footprint.x_offset(n)`.
pub fn project_candles(
    candles: &[Candle],
    first_index: usize,
    footprint: CandleFootprint,
    price_to_pixel: LinearMap,
    plot_left: f64,
) -> ChartResult<Vec<CandleGeometry>> {
    footprint.validate()?;

    #[cfg(feature = "parallel-projection")]
    {
        Ok(candles
            .par_iter()
            .enumerate()
            .map(|(slot, candle)| {
                project_single_candle(
                    candle,
                    first_index + slot,
                    plot_left + footprint.x_offset(slot),
                    footprint.width_px,
                    price_to_pixel,
                )
            })
            .collect())
    }

    #[cfg(not(feature = "parallel-projection"))]
    {
        Ok(candles
            .iter()
            .enumerate()
            .map(|(slot, candle)| {
                project_single_candle(
                    candle,
                    first_index + slot,
                    plot_left + footprint.x_offset(slot),
                    footprint.width_px,
                    price_to_pixel,
                )
            })
            .collect())
    }
}

fn project_single_candle(
    candle: &Candle,
    index: usize,
    left: f64,
    width: f64,
    price_to_pixel: LinearMap,
) -> CandleGeometry {
    let open_y = price_to_pixel.eval(candle.open as f64);
    let close_y = price_to_pixel.eval(candle.close as f64);

    CandleGeometry {
        index,
        center_x: left + width / 2.0,
        body_left: left,
        body_right: left + width,
        body_top: open_y.min(close_y),
        body_bottom: open_y.max(close_y),
        wick_top: price_to_pixel.eval(candle.high as f64),
        wick_bottom: price_to_pixel.eval(candle.low as f64),
        is_bullish: candle.is_bullish(),
        is_doji: candle.is_doji(),
    }
}
