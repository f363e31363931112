//! Chart layout engine: data model and pure coordinate math.
//!
//! Nothing here owns mutable state across frames. Callers pass a candle slice
//! and numeric parameters and get ranges, windows and maps back.

pub mod analysis;
pub mod candle;
pub mod linear_map;
pub mod primitives;
pub mod range;
pub mod series;
pub mod ticks;
pub mod types;
pub mod windowing;

pub use analysis::{AnalysisOverlay, CandlePatterns, PatternMark, TrendDirection, TrendLine};
pub use candle::{Candle, CandleGeometry, project_candles};
pub use linear_map::LinearMap;
pub use primitives::{DEFAULT_PRICE_PRECISION, PriceFormat, TimestampUnit, format_timestamp};
pub use range::{
    PriceRange, RangeField, ValueRange, VolumeRange, WindowRanges, find_price_range, find_range,
    find_volume_range, find_window_ranges,
};
pub use series::{CandleSeries, SeriesUpdate};
pub use ticks::{DEFAULT_PRICE_TICK_COUNT, MAX_PRICE_TICKS, price_ticks, time_grid_slots};
pub use types::{PixelRect, Viewport};
pub use windowing::{CandleFootprint, VisibleWindow, select_window};
