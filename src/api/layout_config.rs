use serde::{Deserialize, Serialize};

use crate::core::{DEFAULT_PRICE_PRECISION, DEFAULT_PRICE_TICK_COUNT, PriceFormat, TimestampUnit};
use crate::error::{ChartError, ChartResult};
use crate::interaction::ZoomConfig;

/// Layout tuning shared by every rendering surface.
///
/// This type is serializable so host applications can persist/load chart setup
/// without inventing their own ad-hoc format. Prices and spans are in
/// fixed-point units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default)]
    pub zoom: ZoomConfig,
    #[serde(default = "default_price_tick_count")]
    pub price_tick_count: usize,
    #[serde(default = "default_price_tick_granularity")]
    pub price_tick_granularity: f64,
    /// Snap the price range outward to multiples of this size.
    #[serde(default)]
    pub price_range_snap: Option<f64>,
    /// Smallest price span a map is built on; flat windows are widened to it.
    #[serde(default = "default_min_price_span")]
    pub min_price_span: f64,
    #[serde(default = "default_price_axis_width_px")]
    pub price_axis_width_px: f64,
    #[serde(default = "default_padding_px")]
    pub padding_top_px: f64,
    #[serde(default = "default_padding_px")]
    pub padding_bottom_px: f64,
    /// Share of the usable height given to volume bars; `0` hides them.
    #[serde(default = "default_volume_pane_ratio")]
    pub volume_pane_ratio: f64,
    #[serde(default = "default_volume_pane_gap_px")]
    pub volume_pane_gap_px: f64,
    /// Vertical gridline every N candles; `0` disables them.
    #[serde(default = "default_time_grid_interval")]
    pub time_grid_interval: usize,
    #[serde(default)]
    pub timestamp_unit: TimestampUnit,
    #[serde(default = "default_time_label_format")]
    pub time_label_format: String,
    /// Precision used when the server payload does not carry one.
    #[serde(default = "default_precision")]
    pub default_precision: i64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            zoom: ZoomConfig::default(),
            price_tick_count: default_price_tick_count(),
            price_tick_granularity: default_price_tick_granularity(),
            price_range_snap: None,
            min_price_span: default_min_price_span(),
            price_axis_width_px: default_price_axis_width_px(),
            padding_top_px: default_padding_px(),
            padding_bottom_px: default_padding_px(),
            volume_pane_ratio: default_volume_pane_ratio(),
            volume_pane_gap_px: default_volume_pane_gap_px(),
            time_grid_interval: default_time_grid_interval(),
            timestamp_unit: TimestampUnit::default(),
            time_label_format: default_time_label_format(),
            default_precision: default_precision(),
        }
    }
}

impl LayoutConfig {
    /// Sets the candle-width zoom tuning.
    #[must_use]
    pub fn with_zoom(mut self, zoom: ZoomConfig) -> Self {
        self.zoom = zoom;
        self
    }

    /// Sets the target number of price ticks.
    #[must_use]
    pub fn with_price_tick_count(mut self, count: usize) -> Self {
        self.price_tick_count = count;
        self
    }

    /// Enables outward snapping of the price range.
    #[must_use]
    pub fn with_price_range_snap(mut self, tick_size: f64) -> Self {
        self.price_range_snap = Some(tick_size);
        self
    }

    /// Sets the minimum price span used for flat windows.
    #[must_use]
    pub fn with_min_price_span(mut self, span: f64) -> Self {
        self.min_price_span = span;
        self
    }

    /// Sets the volume pane share of the usable height.
    #[must_use]
    pub fn with_volume_pane_ratio(mut self, ratio: f64) -> Self {
        self.volume_pane_ratio = ratio;
        self
    }

    /// Sets the right-hand price axis width.
    #[must_use]
    pub fn with_price_axis_width_px(mut self, width: f64) -> Self {
        self.price_axis_width_px = width;
        self
    }

    /// Sets top and bottom plot padding.
    #[must_use]
    pub fn with_padding_px(mut self, top: f64, bottom: f64) -> Self {
        self.padding_top_px = top;
        self.padding_bottom_px = bottom;
        self
    }

    #[must_use]
    pub fn with_time_grid_interval(mut self, interval: usize) -> Self {
        self.time_grid_interval = interval;
        self
    }

    #[must_use]
    pub fn with_timestamp_unit(mut self, unit: TimestampUnit) -> Self {
        self.timestamp_unit = unit;
        self
    }

    #[must_use]
    pub fn with_default_precision(mut self, precision: i64) -> Self {
        self.default_precision = precision;
        self
    }

    /// Price format for a payload precision, falling back to the configured one.
    pub fn price_format(&self, payload_precision: Option<i64>) -> ChartResult<PriceFormat> {
        PriceFormat::new(payload_precision.unwrap_or(self.default_precision))
    }

    pub fn validate(&self) -> ChartResult<()> {
        self.zoom.validate()?;
        if self.price_tick_count == 0 {
            return Err(ChartError::InvalidData(
                "price tick count must be > 0".to_owned(),
            ));
        }
        if !self.price_tick_granularity.is_finite() || self.price_tick_granularity <= 0.0 {
            return Err(ChartError::InvalidData(
                "price tick granularity must be finite and > 0".to_owned(),
            ));
        }
        if let Some(snap) = self.price_range_snap {
            if !snap.is_finite() || snap <= 0.0 {
                return Err(ChartError::InvalidData(
                    "price range snap must be finite and > 0".to_owned(),
                ));
            }
        }
        if !self.min_price_span.is_finite() || self.min_price_span <= 0.0 {
            return Err(ChartError::InvalidData(
                "minimum price span must be finite and > 0".to_owned(),
            ));
        }
        for (name, value) in [
            ("price axis width", self.price_axis_width_px),
            ("top padding", self.padding_top_px),
            ("bottom padding", self.padding_bottom_px),
            ("volume pane gap", self.volume_pane_gap_px),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidData(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        if !self.volume_pane_ratio.is_finite() || !(0.0..1.0).contains(&self.volume_pane_ratio) {
            return Err(ChartError::InvalidData(
                "volume pane ratio must be in [0, 1)".to_owned(),
            ));
        }
        PriceFormat::new(self.default_precision)?;
        Ok(())
    }

    /// Serializes config to pretty JSON for debug/config files.
    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize layout config: {e}")))
    }

    /// Deserializes and validates config from JSON.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse layout config: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

fn default_price_tick_count() -> usize {
    DEFAULT_PRICE_TICK_COUNT
}

fn default_price_tick_granularity() -> f64 {
    1.0
}

fn default_min_price_span() -> f64 {
    2.0
}

fn default_price_axis_width_px() -> f64 {
    68.0
}

fn default_padding_px() -> f64 {
    15.0
}

fn default_volume_pane_ratio() -> f64 {
    0.2
}

fn default_volume_pane_gap_px() -> f64 {
    4.0
}

fn default_time_grid_interval() -> usize {
    15
}

fn default_time_label_format() -> String {
    "%H:%M".to_owned()
}

fn default_precision() -> i64 {
    DEFAULT_PRICE_PRECISION
}
