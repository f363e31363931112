use tracing::trace;

use crate::core::{AnalysisOverlay, CandleSeries, Viewport};
use crate::error::ChartResult;
use crate::interaction::{PointerState, ZoomController};
use crate::render::{RenderFrame, Renderer};
use crate::session::ConnectionStatus;

use super::{FrameLayout, LayoutConfig, RenderStyle, build_render_frame, compute_frame_layout};

/// Rendering adapter: owns the surface plus everything the user can change
/// between frames (zoom and pointer).
///
/// Data lives elsewhere; each `render_frame` call gets the current series and
/// overlay by reference and recomputes the layout from scratch.
pub struct ChartView<R: Renderer> {
    renderer: R,
    config: LayoutConfig,
    style: RenderStyle,
    zoom: ZoomController,
    pointer: PointerState,
    last_layout: Option<FrameLayout>,
}

impl<R: Renderer> ChartView<R> {
    pub fn new(renderer: R, config: LayoutConfig) -> ChartResult<Self> {
        config.validate()?;
        let zoom = ZoomController::new(config.zoom)?;
        Ok(Self {
            renderer,
            config,
            style: RenderStyle::default(),
            zoom,
            pointer: PointerState::Hidden,
            last_layout: None,
        })
    }

    pub fn with_style(mut self, style: RenderStyle) -> ChartResult<Self> {
        self.set_style(style)?;
        Ok(self)
    }

    pub fn set_style(&mut self, style: RenderStyle) -> ChartResult<()> {
        style.validate()?;
        self.style = style;
        Ok(())
    }

    #[must_use]
    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    #[must_use]
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[must_use]
    pub fn zoom(&self) -> ZoomController {
        self.zoom
    }

    #[must_use]
    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    /// Layout of the most recent successful render.
    #[must_use]
    pub fn last_layout(&self) -> Option<&FrameLayout> {
        self.last_layout.as_ref()
    }

    /// Computes the layout for the current zoom and pointer without drawing.
    pub fn layout(
        &self,
        series: &CandleSeries,
        overlay: Option<&AnalysisOverlay>,
        viewport: Viewport,
        precision: Option<i64>,
    ) -> ChartResult<FrameLayout> {
        compute_frame_layout(
            series,
            overlay,
            viewport,
            &self.config,
            &self.zoom,
            self.pointer,
            precision,
        )
    }

    /// Builds the frame without submitting it to the renderer.
    pub fn build_frame(
        &self,
        series: &CandleSeries,
        overlay: Option<&AnalysisOverlay>,
        viewport: Viewport,
        precision: Option<i64>,
        status: ConnectionStatus,
    ) -> ChartResult<RenderFrame> {
        let layout = self.layout(series, overlay, viewport, precision)?;
        build_render_frame(&layout, &self.style, status)
    }

    /// Runs layout, frame building and rendering for one redraw.
    pub fn render_frame(
        &mut self,
        series: &CandleSeries,
        overlay: Option<&AnalysisOverlay>,
        viewport: Viewport,
        precision: Option<i64>,
        status: ConnectionStatus,
    ) -> ChartResult<&FrameLayout> {
        let layout = self.layout(series, overlay, viewport, precision)?;
        let frame = build_render_frame(&layout, &self.style, status)?;
        self.renderer.render(&frame)?;
        trace!(
            primitives = frame.primitive_count(),
            visible = layout.window.count,
            "frame rendered"
        );
        Ok(self.last_layout.insert(layout))
    }

    /// Wheel handler; positive `delta_y` widens candles. Returns `true` when a
    /// redraw is needed.
    pub fn on_wheel(&mut self, delta_y: f64) -> bool {
        self.zoom.on_wheel(delta_y)
    }

    /// Returns `true` when the pointer moved.
    pub fn on_pointer_move(&mut self, x: f64, y: f64) -> bool {
        let next = PointerState::At { x, y };
        let changed = self.pointer != next;
        self.pointer = next;
        changed
    }

    /// Returns `true` when the pointer was visible.
    pub fn on_pointer_leave(&mut self) -> bool {
        let changed = self.pointer != PointerState::Hidden;
        self.pointer = PointerState::Hidden;
        changed
    }
}
