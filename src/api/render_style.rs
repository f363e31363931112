use crate::error::{ChartError, ChartResult};
use crate::render::{Color, LineStrokeStyle};

/// Style contract for the current render frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    pub background_color: Color,
    pub grid_line_color: Color,
    pub grid_line_width: f64,
    pub grid_line_style: LineStrokeStyle,
    pub axis_border_color: Color,
    pub axis_label_color: Color,
    pub axis_label_font_size_px: f64,
    /// Horizontal gap between the axis border and price labels.
    pub axis_label_padding_px: f64,
    pub bullish_color: Color,
    pub bearish_color: Color,
    pub doji_color: Color,
    pub wick_width: f64,
    pub bullish_volume_color: Color,
    pub bearish_volume_color: Color,
    pub support_line_color: Color,
    pub resistance_line_color: Color,
    pub trend_line_width: f64,
    pub pattern_label_color: Color,
    pub pattern_label_font_size_px: f64,
    pub last_price_box_height_px: f64,
    pub last_price_text_color: Color,
    pub crosshair_line_color: Color,
    pub crosshair_line_width: f64,
    pub crosshair_line_style: LineStrokeStyle,
    pub crosshair_label_box_color: Color,
    pub crosshair_label_text_color: Color,
    pub status_text_color: Color,
    pub status_font_size_px: f64,
    pub placeholder_text_color: Color,
    pub placeholder_font_size_px: f64,
}

impl RenderStyle {
    pub fn validate(&self) -> ChartResult<()> {
        for color in [
            self.background_color,
            self.grid_line_color,
            self.axis_border_color,
            self.axis_label_color,
            self.bullish_color,
            self.bearish_color,
            self.doji_color,
            self.bullish_volume_color,
            self.bearish_volume_color,
            self.support_line_color,
            self.resistance_line_color,
            self.pattern_label_color,
            self.last_price_text_color,
            self.crosshair_line_color,
            self.crosshair_label_box_color,
            self.crosshair_label_text_color,
            self.status_text_color,
            self.placeholder_text_color,
        ] {
            color.validate()?;
        }
        self.grid_line_style.validate()?;
        self.crosshair_line_style.validate()?;
        for (name, value) in [
            ("grid line width", self.grid_line_width),
            ("wick width", self.wick_width),
            ("trend line width", self.trend_line_width),
            ("crosshair line width", self.crosshair_line_width),
            ("axis label font size", self.axis_label_font_size_px),
            ("pattern label font size", self.pattern_label_font_size_px),
            ("last price box height", self.last_price_box_height_px),
            ("status font size", self.status_font_size_px),
            ("placeholder font size", self.placeholder_font_size_px),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ChartError::InvalidData(format!(
                    "{name} must be finite and > 0"
                )));
            }
        }
        if !self.axis_label_padding_px.is_finite() || self.axis_label_padding_px < 0.0 {
            return Err(ChartError::InvalidData(
                "axis label padding must be finite and >= 0".to_owned(),
            ));
        }
        Ok(())
    }

    /// Body/wick color of a candle.
    #[must_use]
    pub fn candle_color(&self, is_bullish: bool, is_doji: bool) -> Color {
        if is_doji {
            self.doji_color
        } else if is_bullish {
            self.bullish_color
        } else {
            self.bearish_color
        }
    }
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            background_color: Color::from_hex(0x13_17_22),
            grid_line_color: Color::rgba(0.6, 0.6, 0.6, 0.35),
            grid_line_width: 0.5,
            grid_line_style: LineStrokeStyle::Dashed {
                on_px: 2.0,
                off_px: 5.0,
            },
            axis_border_color: Color::from_hex(0x2A_2E_39),
            axis_label_color: Color::from_hex(0xD1_D4_DC),
            axis_label_font_size_px: 11.0,
            axis_label_padding_px: 6.0,
            bullish_color: Color::from_hex(0x26_A6_9A),
            bearish_color: Color::from_hex(0xEF_53_50),
            doji_color: Color::from_hex(0xF0_F0_F0),
            wick_width: 1.0,
            bullish_volume_color: Color::rgba(0.149, 0.651, 0.604, 0.5),
            bearish_volume_color: Color::rgba(0.937, 0.325, 0.314, 0.5),
            support_line_color: Color::from_hex(0x42_A5_F5),
            resistance_line_color: Color::from_hex(0xFF_A7_26),
            trend_line_width: 1.5,
            pattern_label_color: Color::from_hex(0xFF_EB_3B),
            pattern_label_font_size_px: 10.0,
            last_price_box_height_px: 18.0,
            last_price_text_color: Color::from_hex(0xFF_FF_FF),
            crosshair_line_color: Color::rgba(0.75, 0.75, 0.75, 0.8),
            crosshair_line_width: 1.0,
            crosshair_line_style: LineStrokeStyle::Dashed {
                on_px: 4.0,
                off_px: 4.0,
            },
            crosshair_label_box_color: Color::from_hex(0x36_3A_45),
            crosshair_label_text_color: Color::from_hex(0xFF_FF_FF),
            status_text_color: Color::from_hex(0xFF_52_52),
            status_font_size_px: 14.0,
            placeholder_text_color: Color::from_hex(0x78_7B_86),
            placeholder_font_size_px: 18.0,
        }
    }
}
