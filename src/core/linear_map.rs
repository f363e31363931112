use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Two-point linear interpolation `y = slope * x + intercept`.
///
/// Used for price to pixel, pixel to price, volume to pixel and candle index
/// to pixel conversions. Construction rejects degenerate point pairs so
/// rendering never sees `NaN` or infinite slopes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearMap {
    slope: f64,
    intercept: f64,
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

impl LinearMap {
    /// Builds the line through `(x1, y1)` and `(x2, y2)`.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> ChartResult<Self> {
        if !x1.is_finite() || !y1.is_finite() || !x2.is_finite() || !y2.is_finite() {
            return Err(ChartError::InvalidData(
                "linear map points must be finite".to_owned(),
            ));
        }
        if x1 == x2 {
            return Err(ChartError::DegenerateMap { x: x1 });
        }

        let slope = (y2 - y1) / (x2 - x1);
        let intercept = y1 - slope * x1;
        Ok(Self {
            slope,
            intercept,
            x1,
            y1,
            x2,
            y2,
        })
    }

    #[must_use]
    pub fn eval(self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Map with domain and range swapped.
    ///
    /// Fails when both range values are equal (a flat map has no inverse).
    pub fn inverse(self) -> ChartResult<Self> {
        Self::new(self.y1, self.x1, self.y2, self.x2)
    }

    #[must_use]
    pub fn slope(self) -> f64 {
        self.slope
    }

    #[must_use]
    pub fn intercept(self) -> f64 {
        self.intercept
    }

    /// The two defining points as `((x1, y1), (x2, y2))`.
    #[must_use]
    pub fn points(self) -> ((f64, f64), (f64, f64)) {
        ((self.x1, self.y1), (self.x2, self.y2))
    }
}
