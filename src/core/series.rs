use tracing::{debug, trace};

use crate::core::Candle;
use crate::error::{ChartError, ChartResult};

/// Outcome of applying a latest-candle update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesUpdate {
    /// The last candle shared the start timestamp and was replaced in place.
    Replaced { prices_changed: bool },
    /// The candle opened a new time bucket.
    Appended,
}

/// Chronological candle series.
///
/// Append-only except for in-place replacement of the newest candle. Layout
/// code only ever sees `as_slice()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a series from a full snapshot.
    pub fn from_candles(candles: Vec<Candle>) -> ChartResult<Self> {
        let mut series = Self::new();
        series.replace_all(candles)?;
        Ok(series)
    }

    /// Replaces every candle with a full snapshot.
    ///
    /// Candles must already be valid and ordered by start timestamp.
    pub fn replace_all(&mut self, candles: Vec<Candle>) -> ChartResult<()> {
        for candle in &candles {
            candle.validate()?;
        }
        if let Some(pair) = candles.windows(2).find(|pair| pair[1].start < pair[0].start) {
            return Err(ChartError::InvalidData(format!(
                "candle start {} precedes previous start {}",
                pair[1].start, pair[0].start
            )));
        }

        debug!(count = candles.len(), "replace candle series");
        self.candles = candles;
        Ok(())
    }

    /// Applies the newest candle from the server.
    ///
    /// - replaces the last candle when start timestamps are equal
    /// - appends when the series is empty or the start timestamp differs
    /// - rejects candles older than the last one
    pub fn apply_latest(&mut self, candle: Candle) -> ChartResult<SeriesUpdate> {
        candle.validate()?;

        let update = match self.candles.last_mut() {
            Some(last) if last.start == candle.start => {
                let prices_changed = last.prices_differ(&candle);
                *last = candle;
                SeriesUpdate::Replaced { prices_changed }
            }
            Some(last) if candle.start < last.start => {
                return Err(ChartError::InvalidData(format!(
                    "latest candle start {} is older than series end {}",
                    candle.start, last.start
                )));
            }
            _ => {
                self.candles.push(candle);
                SeriesUpdate::Appended
            }
        };

        trace!(count = self.candles.len(), ?update, "apply latest candle");
        Ok(update)
    }

    pub fn clear(&mut self) {
        self.candles.clear();
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Candle] {
        &self.candles
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Candle> {
        self.candles.get(index)
    }
}
