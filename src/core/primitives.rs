use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Scale factor applied to fixed-point prices when the payload carries none.
pub const DEFAULT_PRICE_PRECISION: i64 = 100_000;

/// Fixed-point price formatter.
///
/// `precision` is the factor raw integer prices were multiplied by
/// (`108_123` with precision `100_000` is `1.08123`). `decimals` is the
/// smallest digit count that represents one fixed-point unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceFormat {
    precision: i64,
    decimals: u32,
}

impl PriceFormat {
    pub fn new(precision: i64) -> ChartResult<Self> {
        if precision <= 0 {
            return Err(ChartError::InvalidData(format!(
                "price precision must be > 0, got {precision}"
            )));
        }

        let mut decimals = 0u32;
        let mut scale = 1i64;
        while scale < precision && decimals < 18 {
            scale *= 10;
            decimals += 1;
        }

        Ok(Self {
            precision,
            decimals,
        })
    }

    #[must_use]
    pub fn precision(self) -> i64 {
        self.precision
    }

    #[must_use]
    pub fn decimals(self) -> u32 {
        self.decimals
    }

    /// Converts a fixed-point value into an exact decimal price.
    pub fn to_decimal(self, fixed: f64) -> ChartResult<Decimal> {
        let raw = Decimal::from_f64(fixed).ok_or_else(|| {
            ChartError::InvalidData(format!("price {fixed} cannot be represented as decimal"))
        })?;
        let scaled = raw
            .checked_div(Decimal::from(self.precision))
            .ok_or_else(|| ChartError::InvalidData("price scaling overflowed".to_owned()))?;
        Ok(scaled.round_dp(self.decimals))
    }

    /// Formats a fixed-point value with the format's decimal count.
    ///
    /// Values that do not fit a `Decimal` fall back to float formatting.
    #[must_use]
    pub fn format(self, fixed: f64) -> String {
        let decimals = self.decimals as usize;
        match self.to_decimal(fixed) {
            Ok(value) => format!("{value:.decimals$}"),
            Err(_) => format!("{:.decimals$}", fixed / self.precision as f64),
        }
    }
}

impl Default for PriceFormat {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRICE_PRECISION,
            decimals: 5,
        }
    }
}

/// Unit of the raw candle timestamps sent by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TimestampUnit {
    Seconds,
    Millis,
    Micros,
    #[default]
    Nanos,
}

impl TimestampUnit {
    const fn ticks_per_second(self) -> i64 {
        match self {
            Self::Seconds => 1,
            Self::Millis => 1_000,
            Self::Micros => 1_000_000,
            Self::Nanos => 1_000_000_000,
        }
    }

    /// Converts a raw timestamp to UTC; `None` when out of chrono's range.
    #[must_use]
    pub fn to_datetime(self, raw: i64) -> Option<DateTime<Utc>> {
        let per_second = self.ticks_per_second();
        let secs = raw.div_euclid(per_second);
        let remainder = raw.rem_euclid(per_second);
        let nanos = remainder * (1_000_000_000 / per_second);
        DateTime::from_timestamp(secs, u32::try_from(nanos).ok()?)
    }
}

/// Formats a raw timestamp with a chrono format string.
///
/// `None` when the timestamp is out of range or the pattern is invalid.
#[must_use]
pub fn format_timestamp(unit: TimestampUnit, raw: i64, pattern: &str) -> Option<String> {
    let time = unit.to_datetime(raw)?;
    let mut out = String::new();
    write!(out, "{}", time.format(pattern)).ok()?;
    Some(out)
}
