use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::Candle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    /// Line through candle lows.
    Support,
    /// Line through candle highs.
    Resistance,
}

/// Server-detected trend line between two candle indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendLine {
    pub start_index: usize,
    pub end_index: usize,
    pub direction: TrendDirection,
}

impl TrendLine {
    #[must_use]
    pub const fn new(start_index: usize, end_index: usize, direction: TrendDirection) -> Self {
        Self {
            start_index,
            end_index,
            direction,
        }
    }

    /// Price anchors `(index, price)` for both endpoints.
    ///
    /// Returns `None` when either index is outside `candles`.
    #[must_use]
    pub fn anchors(&self, candles: &[Candle]) -> Option<((usize, f64), (usize, f64))> {
        let start = candles.get(self.start_index)?;
        let end = candles.get(self.end_index)?;
        let price = |candle: &Candle| match self.direction {
            TrendDirection::Support => candle.low as f64,
            TrendDirection::Resistance => candle.high as f64,
        };
        Some((
            (self.start_index, price(start)),
            (self.end_index, price(end)),
        ))
    }
}

/// One candle pattern reported for a candle. Codes are opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternMark {
    pub code: u32,
    pub candles_spanning: u32,
    #[serde(default)]
    pub short_code: Option<String>,
}

impl PatternMark {
    #[must_use]
    pub fn new(code: u32) -> Self {
        Self {
            code,
            candles_spanning: 1,
            short_code: None,
        }
    }

    #[must_use]
    pub fn with_short_code(mut self, short_code: impl Into<String>) -> Self {
        self.short_code = Some(short_code.into());
        self
    }

    #[must_use]
    pub fn with_candles_spanning(mut self, candles_spanning: u32) -> Self {
        self.candles_spanning = candles_spanning;
        self
    }

    /// Text drawn next to the candle.
    #[must_use]
    pub fn label(&self) -> String {
        self.short_code
            .clone()
            .filter(|code| !code.is_empty())
            .unwrap_or_else(|| format!("#{}", self.code))
    }
}

pub type CandlePatterns = SmallVec<[PatternMark; 2]>;

/// Read-only annotation layer received from the server.
///
/// Patterns are indexed like the candle series; an empty entry means no
/// pattern for that candle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOverlay {
    patterns: Vec<CandlePatterns>,
    trend_lines: Vec<TrendLine>,
}

impl AnalysisOverlay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a pattern for candle `index`; code `0` means none and is ignored.
    pub fn push_pattern(&mut self, index: usize, mark: PatternMark) {
        if mark.code == 0 {
            return;
        }
        if self.patterns.len() <= index {
            self.patterns.resize_with(index + 1, CandlePatterns::new);
        }
        self.patterns[index].push(mark);
    }

    pub fn push_trend_line(&mut self, line: TrendLine) {
        self.trend_lines.push(line);
    }

    #[must_use]
    pub fn with_pattern(mut self, index: usize, mark: PatternMark) -> Self {
        self.push_pattern(index, mark);
        self
    }

    #[must_use]
    pub fn with_trend_line(mut self, line: TrendLine) -> Self {
        self.push_trend_line(line);
        self
    }

    #[must_use]
    pub fn patterns_at(&self, index: usize) -> &[PatternMark] {
        self.patterns.get(index).map_or(&[], |marks| marks.as_slice())
    }

    #[must_use]
    pub fn trend_lines(&self) -> &[TrendLine] {
        &self.trend_lines
    }

    /// Candle indices carrying at least one pattern, ascending.
    pub fn marked_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.patterns
            .iter()
            .enumerate()
            .filter(|(_, marks)| !marks.is_empty())
            .map(|(index, _)| index)
    }

    #[must_use]
    pub fn pattern_count(&self) -> usize {
        self.patterns.iter().map(|marks| marks.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trend_lines.is_empty() && self.patterns.iter().all(|marks| marks.is_empty())
    }
}
