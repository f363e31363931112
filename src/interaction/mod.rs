use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::CandleFootprint;
use crate::error::{ChartError, ChartResult};

pub const DEFAULT_CANDLE_WIDTH_PX: f64 = 4.0;
pub const DEFAULT_CANDLE_SPACING_PX: f64 = 2.0;
pub const DEFAULT_MIN_CANDLE_WIDTH_PX: f64 = 4.0;
pub const DEFAULT_MAX_CANDLE_WIDTH_PX: f64 = 64.0;
pub const DEFAULT_ZOOM_STEP_PX: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoomDirection {
    /// Wider candles, fewer visible.
    In,
    /// Narrower candles, more visible.
    Out,
}

impl ZoomDirection {
    /// Maps a wheel delta to a zoom direction; zero means no zoom.
    #[must_use]
    pub fn from_wheel_delta(delta_y: f64) -> Option<Self> {
        if delta_y > 0.0 {
            Some(Self::In)
        } else if delta_y < 0.0 {
            Some(Self::Out)
        } else {
            None
        }
    }
}

/// Tuning for the candle-width zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomConfig {
    pub initial_width_px: f64,
    pub spacing_px: f64,
    pub step_px: f64,
    pub min_width_px: f64,
    pub max_width_px: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            initial_width_px: DEFAULT_CANDLE_WIDTH_PX,
            spacing_px: DEFAULT_CANDLE_SPACING_PX,
            step_px: DEFAULT_ZOOM_STEP_PX,
            min_width_px: DEFAULT_MIN_CANDLE_WIDTH_PX,
            max_width_px: DEFAULT_MAX_CANDLE_WIDTH_PX,
        }
    }
}

impl ZoomConfig {
    pub fn validate(self) -> ChartResult<Self> {
        if !self.min_width_px.is_finite() || self.min_width_px <= 0.0 {
            return Err(ChartError::InvalidData(
                "minimum candle width must be finite and > 0".to_owned(),
            ));
        }
        if !self.max_width_px.is_finite() || self.max_width_px < self.min_width_px {
            return Err(ChartError::InvalidData(
                "maximum candle width must be finite and >= minimum".to_owned(),
            ));
        }
        if !self.step_px.is_finite() || self.step_px <= 0.0 {
            return Err(ChartError::InvalidData(
                "zoom step must be finite and > 0".to_owned(),
            ));
        }
        if !self.initial_width_px.is_finite() {
            return Err(ChartError::InvalidData(
                "initial candle width must be finite".to_owned(),
            ));
        }
        CandleFootprint::new(self.min_width_px, self.spacing_px).validate()?;
        Ok(self)
    }
}

/// User-controlled candle width, clamped so the footprint never collapses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomController {
    config: ZoomConfig,
    candle_width_px: f64,
}

impl ZoomController {
    pub fn new(config: ZoomConfig) -> ChartResult<Self> {
        let config = config.validate()?;
        Ok(Self {
            config,
            candle_width_px: config
                .initial_width_px
                .clamp(config.min_width_px, config.max_width_px),
        })
    }

    #[must_use]
    pub fn candle_width_px(self) -> f64 {
        self.candle_width_px
    }

    #[must_use]
    pub fn footprint(self) -> CandleFootprint {
        CandleFootprint::new(self.candle_width_px, self.config.spacing_px)
    }

    /// Applies one zoom step. Returns `true` when the width changed.
    pub fn zoom(&mut self, direction: ZoomDirection) -> bool {
        let delta = match direction {
            ZoomDirection::In => self.config.step_px,
            ZoomDirection::Out => -self.config.step_px,
        };
        let next = (self.candle_width_px + delta)
            .clamp(self.config.min_width_px, self.config.max_width_px);
        let changed = next != self.candle_width_px;
        self.candle_width_px = next;
        trace!(candle_width_px = next, changed, "zoom step");
        changed
    }

    pub fn on_wheel(&mut self, delta_y: f64) -> bool {
        ZoomDirection::from_wheel_delta(delta_y).is_some_and(|direction| self.zoom(direction))
    }
}

impl Default for ZoomController {
    fn default() -> Self {
        let config = ZoomConfig::default();
        Self {
            config,
            candle_width_px: config.initial_width_px,
        }
    }
}

/// Last known pointer position over the chart surface.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PointerState {
    #[default]
    Hidden,
    At {
        x: f64,
        y: f64,
    },
}

impl PointerState {
    #[must_use]
    pub fn position(self) -> Option<(f64, f64)> {
        match self {
            Self::Hidden => None,
            Self::At { x, y } if x.is_finite() && y.is_finite() => Some((x, y)),
            Self::At { .. } => None,
        }
    }
}
