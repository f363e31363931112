use crate::core::Viewport;
use crate::error::ChartResult;
use crate::render::{Color, LinePrimitive, RectPrimitive, RenderLayer, TextPrimitive};

/// Borrowed view of one primitive in paint order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive<'a> {
    Rect(&'a RectPrimitive),
    Line(&'a LinePrimitive),
    Text(&'a TextPrimitive),
}

/// Backend-agnostic scene for one chart draw pass.
///
/// The background paints first, then each `RenderLayer` back to front; see
/// `paint_order`.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub viewport: Viewport,
    pub background: Option<Color>,
    pub lines: Vec<LinePrimitive>,
    pub rects: Vec<RectPrimitive>,
    pub texts: Vec<TextPrimitive>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            background: None,
            lines: Vec::new(),
            rects: Vec::new(),
            texts: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    #[must_use]
    pub fn with_line(mut self, line: LinePrimitive) -> Self {
        self.lines.push(line);
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: TextPrimitive) -> Self {
        self.texts.push(text);
        self
    }

    #[must_use]
    pub fn with_rect(mut self, rect: RectPrimitive) -> Self {
        self.rects.push(rect);
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        self.viewport.ensure_valid()?;

        if let Some(background) = self.background {
            background.validate()?;
        }
        for line in &self.lines {
            line.validate()?;
        }
        for rect in &self.rects {
            rect.validate()?;
        }
        for text in &self.texts {
            text.validate()?;
        }

        Ok(())
    }

    /// Primitives layer by layer; rects, lines, texts within a layer, each
    /// in insertion order.
    pub fn paint_order(&self) -> impl Iterator<Item = Primitive<'_>> + '_ {
        RenderLayer::ALL.into_iter().flat_map(move |layer| {
            let rects = self
                .rects
                .iter()
                .filter(move |rect| rect.layer == layer)
                .map(Primitive::Rect);
            let lines = self
                .lines
                .iter()
                .filter(move |line| line.layer == layer)
                .map(Primitive::Line);
            let texts = self
                .texts
                .iter()
                .filter(move |text| text.layer == layer)
                .map(Primitive::Text);
            rects.chain(lines).chain(texts)
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.rects.is_empty() && self.texts.is_empty()
    }

    #[must_use]
    pub fn primitive_count(&self) -> usize {
        self.lines.len() + self.rects.len() + self.texts.len()
    }
}
