mod frame;
mod null_renderer;
mod primitives;
mod svg_renderer;

pub use frame::{Primitive, RenderFrame};
pub use null_renderer::NullRenderer;
pub use primitives::{
    Color, LinePrimitive, LineStrokeStyle, RectPrimitive, RenderLayer, TextHAlign, TextPrimitive,
    TextVAlign,
};
pub use svg_renderer::SvgRenderer;

use crate::error::ChartResult;

/// Contract implemented by any rendering surface.
///
/// Surfaces receive a fully materialized, deterministic `RenderFrame` so
/// drawing code stays isolated from layout, protocol and session logic.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()>;
}

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::{CairoContextRenderer, CairoRenderStats, CairoRenderer};
