//! Layout composition and the rendering adapter.
//!
//! `compute_frame_layout` turns a series, overlay and viewport into pixel
//! space; `build_render_frame` turns that into primitives; `ChartView` drives
//! both against a `Renderer`.

mod chart_view;
mod layout;
mod layout_config;
mod render_frame_builder;
mod render_style;

pub use chart_view::ChartView;
pub use layout::{
    CrosshairLayout, FrameLayout, FramePanes, FrameScales, LastPriceMarker, PatternMarker,
    PriceTick, TimeTick, TrendSegment, VolumeBar, compute_frame_layout, resolve_panes,
};
pub use layout_config::LayoutConfig;
pub use render_frame_builder::{NO_DATA_TEXT, build_render_frame};
pub use render_style::RenderStyle;
