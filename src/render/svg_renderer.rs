use std::fmt::Write as _;

use crate::error::{ChartError, ChartResult};
use crate::render::{
    Color, LinePrimitive, LineStrokeStyle, Primitive, RectPrimitive, RenderFrame, Renderer,
    TextHAlign, TextPrimitive, TextVAlign,
};

const DEFAULT_FONT_FAMILY: &str = "Inconsolata, monospace";

/// Renders frames into standalone SVG documents.
///
/// Each `render` call replaces `document()` with the serialized frame.
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    font_family: String,
    document: String,
    frames_rendered: usize,
}

impl SvgRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            font_family: DEFAULT_FONT_FAMILY.to_owned(),
            document: String::new(),
            frames_rendered: 0,
        }
    }

    #[must_use]
    pub fn with_font_family(mut self, font_family: impl Into<String>) -> Self {
        self.font_family = font_family.into();
        self
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        "svg"
    }

    /// Last rendered document; empty before the first frame.
    #[must_use]
    pub fn document(&self) -> &str {
        &self.document
    }

    #[must_use]
    pub fn frames_rendered(&self) -> usize {
        self.frames_rendered
    }

    fn write_document(&self, frame: &RenderFrame) -> Result<String, std::fmt::Error> {
        let width = frame.viewport.width;
        let height = frame.viewport.height;
        let mut out = String::with_capacity(256 + frame.primitive_count() * 96);

        writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        )?;
        if let Some(background) = frame.background {
            writeln!(
                out,
                r#"<rect x="0" y="0" width="{width}" height="{height}"{}/>"#,
                fill_attrs(background)
            )?;
        }
        for primitive in frame.paint_order() {
            match primitive {
                Primitive::Rect(rect) => write_rect(&mut out, rect)?,
                Primitive::Line(line) => write_line(&mut out, line)?,
                Primitive::Text(text) => write_text(&mut out, text, &self.font_family)?,
            }
        }
        out.push_str("</svg>\n");
        Ok(out)
    }
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for SvgRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        self.document = self
            .write_document(frame)
            .map_err(|err| ChartError::InvalidData(format!("failed to write svg: {err}")))?;
        self.frames_rendered += 1;
        Ok(())
    }
}

fn write_rect(out: &mut String, rect: &RectPrimitive) -> std::fmt::Result {
    write!(
        out,
        r#"<rect x="{}" y="{}" width="{}" height="{}"{}"#,
        px(rect.x),
        px(rect.y),
        px(rect.width),
        px(rect.height),
        fill_attrs(rect.fill_color)
    )?;
    if rect.border_width > 0.0 {
        write!(
            out,
            r#" stroke="{}" stroke-width="{}""#,
            rect.border_color.to_hex_string(),
            px(rect.border_width)
        )?;
    }
    out.push_str("/>\n");
    Ok(())
}

fn write_line(out: &mut String, line: &LinePrimitive) -> std::fmt::Result {
    write!(
        out,
        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}""#,
        px(line.x1),
        px(line.y1),
        px(line.x2),
        px(line.y2),
        line.color.to_hex_string(),
        px(line.stroke_width)
    )?;
    if line.color.alpha < 1.0 {
        write!(out, r#" stroke-opacity="{}""#, px(line.color.alpha))?;
    }
    if let LineStrokeStyle::Dashed { on_px, off_px } = line.stroke_style {
        write!(out, r#" stroke-dasharray="{} {}""#, px(on_px), px(off_px))?;
    }
    out.push_str("/>\n");
    Ok(())
}

fn write_text(out: &mut String, text: &TextPrimitive, font_family: &str) -> std::fmt::Result {
    let anchor = match text.h_align {
        TextHAlign::Left => "start",
        TextHAlign::Center => "middle",
        TextHAlign::Right => "end",
    };
    let baseline = match text.v_align {
        TextVAlign::Top => "hanging",
        TextVAlign::Middle => "middle",
        TextVAlign::Bottom => "text-bottom",
    };
    writeln!(
        out,
        r#"<text x="{}" y="{}" font-family="{}" font-size="{}" text-anchor="{anchor}" dominant-baseline="{baseline}"{}>{}</text>"#,
        px(text.x),
        px(text.y),
        escape_xml(font_family),
        px(text.font_size_px),
        fill_attrs(text.color),
        escape_xml(&text.text)
    )
}

fn fill_attrs(color: Color) -> String {
    if color.alpha < 1.0 {
        format!(
            r#" fill="{}" fill-opacity="{}""#,
            color.to_hex_string(),
            px(color.alpha)
        )
    } else {
        format!(r#" fill="{}""#, color.to_hex_string())
    }
}

/// Rounds to hundredths and drops trailing zeros.
fn px(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded}")
}

fn escape_xml(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
