use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::trace;

use crate::core::{AnalysisOverlay, Candle, PatternMark, TrendDirection, TrendLine};
use crate::error::{ChartError, ChartResult};

use super::RequestKind;
use super::wire::{
    AnalysisEntryWire, CandleEntryWire, CandlePatternWire, CandleWire, ChartWire,
    CompactAnalysisWire, SearchEntryWire, TrendLineWire,
};

/// Code assigned to full-analysis patterns that carry no numeric code.
pub const UNCODED_PATTERN: u32 = u32::MAX;

const CHART_KEY: &str = "chart";
const LATEST_KEYS: [&str; 2] = ["latestCandle", "latest_candle"];
const FULL_ANALYSIS_KEYS: [&str; 2] = ["analysisFull", "fullAnalysis"];
const COMPACT_ANALYSIS_KEY: &str = "analysis";

const ANALYSIS_TYPE_PATTERN: u8 = 0;
const ANALYSIS_TYPE_TREND_LINE: u8 = 1;

/// Full series payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSnapshot {
    /// Fixed-point scale; `None` when the server did not send one.
    pub precision: Option<i64>,
    pub candles: Vec<Candle>,
}

/// Symbol to full name, in server order.
pub type SearchResults = IndexMap<String, String>;

/// Decoded server reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    Full(ChartSnapshot),
    Incremental(Candle),
    Analysis(AnalysisOverlay),
    SearchResults(SearchResults),
    /// Well-formed JSON with no recognised key.
    Unknown { keys: Vec<String> },
}

impl ServerMessage {
    /// Request this message answers; `None` for unknown payloads.
    #[must_use]
    pub fn kind(&self) -> Option<RequestKind> {
        match self {
            Self::Full(_) => Some(RequestKind::Init),
            Self::Incremental(_) => Some(RequestKind::Latest),
            Self::Analysis(_) => Some(RequestKind::Analysis),
            Self::SearchResults(_) => Some(RequestKind::Search),
            Self::Unknown { .. } => None,
        }
    }
}

/// Decodes one text frame.
///
/// The discriminating key is checked in a fixed order: `chart`, the latest
/// candle keys, the full analysis keys, then `analysis`. A top-level array
/// is a search reply.
pub fn decode_message(text: &str) -> ChartResult<ServerMessage> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| ChartError::Protocol(format!("malformed json: {e}")))?;

    let object = match value {
        Value::Array(entries) => return decode_search(entries),
        Value::Object(object) => object,
        other => {
            return Err(ChartError::Protocol(format!(
                "expected a json object or array, got `{}`",
                json_type_name(&other)
            )));
        }
    };

    if let Some(chart) = object.get(CHART_KEY) {
        return decode_chart(chart).map(ServerMessage::Full);
    }
    if let Some(latest) = first_present(&object, &LATEST_KEYS) {
        let entry: CandleEntryWire = from_value(latest, "latest candle")?;
        return to_candle(entry.into_inner()).map(ServerMessage::Incremental);
    }
    if let Some(full) = first_present(&object, &FULL_ANALYSIS_KEYS) {
        return decode_full_analysis(full).map(ServerMessage::Analysis);
    }
    if let Some(compact) = object.get(COMPACT_ANALYSIS_KEY) {
        return decode_compact_analysis(compact).map(ServerMessage::Analysis);
    }

    let keys: Vec<String> = object.keys().cloned().collect();
    trace!(?keys, "unrecognised server message");
    Ok(ServerMessage::Unknown { keys })
}

fn first_present<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

fn from_value<T: DeserializeOwned>(value: &Value, what: &str) -> ChartResult<T> {
    T::deserialize(value).map_err(|e| ChartError::Protocol(format!("invalid {what}: {e}")))
}

fn to_candle(wire: CandleWire) -> ChartResult<Candle> {
    let candle = Candle::new(wire.o, wire.h, wire.l, wire.c, wire.v, wire.s, wire.e)
        .map_err(|e| ChartError::Protocol(format!("invalid candle: {e}")))?;
    Ok(Candle {
        best_bid: wire.b,
        best_ask: wire.a,
        ..candle
    })
}

fn decode_chart(value: &Value) -> ChartResult<ChartSnapshot> {
    let (precision, entries) = match from_value::<ChartWire>(value, "chart")? {
        ChartWire::WithPrecision { precision, candles } => (precision, candles),
        ChartWire::Candles(candles) => (None, candles),
    };
    if let Some(precision) = precision {
        if precision <= 0 {
            return Err(ChartError::Protocol(format!(
                "chart precision must be > 0, got {precision}"
            )));
        }
    }
    let candles = entries
        .into_iter()
        .map(|entry| to_candle(entry.into_inner()))
        .collect::<ChartResult<Vec<_>>>()?;
    Ok(ChartSnapshot { precision, candles })
}

fn decode_full_analysis(value: &Value) -> ChartResult<AnalysisOverlay> {
    let per_candle: Vec<Option<Vec<AnalysisEntryWire>>> = from_value(value, "full analysis")?;
    let mut overlay = AnalysisOverlay::new();
    for (index, entries) in per_candle.into_iter().enumerate() {
        for entry in entries.into_iter().flatten() {
            match entry.kind {
                ANALYSIS_TYPE_PATTERN => {
                    let pattern: CandlePatternWire = from_value(&entry.data, "candle pattern")?;
                    let mut mark = PatternMark::new(pattern.code.unwrap_or(UNCODED_PATTERN))
                        .with_candles_spanning(pattern.candles_spanning);
                    if let Some(short_code) = pattern.short_code {
                        mark = mark.with_short_code(short_code);
                    }
                    overlay.push_pattern(index, mark);
                }
                ANALYSIS_TYPE_TREND_LINE => {
                    let line: TrendLineWire = from_value(&entry.data, "trend line")?;
                    let direction = match line.direction {
                        0 => TrendDirection::Support,
                        1 => TrendDirection::Resistance,
                        other => {
                            return Err(ChartError::Protocol(format!(
                                "unknown trend line direction {other}"
                            )));
                        }
                    };
                    overlay.push_trend_line(TrendLine::new(
                        line.start_index,
                        line.end_index,
                        direction,
                    ));
                }
                other => {
                    trace!(index, kind = other, "skipping unknown analysis entry");
                }
            }
        }
    }
    Ok(overlay)
}

fn decode_compact_analysis(value: &Value) -> ChartResult<AnalysisOverlay> {
    let compact: CompactAnalysisWire = from_value(value, "analysis")?;
    let mut overlay = AnalysisOverlay::new();
    for (index, code) in compact.single_candle.into_iter().enumerate() {
        overlay.push_pattern(index, PatternMark::new(code));
    }
    for line in compact.trend_lines {
        let direction = if line.d {
            TrendDirection::Resistance
        } else {
            TrendDirection::Support
        };
        overlay.push_trend_line(TrendLine::new(line.s, line.e, direction));
    }
    Ok(overlay)
}

fn decode_search(entries: Vec<Value>) -> ChartResult<ServerMessage> {
    let mut results = SearchResults::with_capacity(entries.len());
    for entry in &entries {
        let wire: SearchEntryWire = from_value(entry, "search entry")?;
        results.insert(wire.symbol, wire.full_name);
    }
    Ok(ServerMessage::SearchResults(results))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
