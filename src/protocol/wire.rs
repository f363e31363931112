//! Serde mirrors of the server's JSON shapes.
//!
//! Field names follow the server; conversion into domain types happens in
//! `message.rs`.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct CandleWire {
    pub o: i64,
    pub h: i64,
    pub l: i64,
    pub c: i64,
    #[serde(default)]
    pub v: i64,
    pub s: i64,
    pub e: i64,
    #[serde(default)]
    pub b: Option<i64>,
    #[serde(default)]
    pub a: Option<i64>,
}

/// `{"candle": {...}}`, or a bare candle object.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub(crate) enum CandleEntryWire {
    Wrapped { candle: CandleWire },
    Bare(CandleWire),
}

impl CandleEntryWire {
    pub fn into_inner(self) -> CandleWire {
        match self {
            Self::Wrapped { candle } | Self::Bare(candle) => candle,
        }
    }
}

/// Value of the `chart` key across server revisions.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum ChartWire {
    WithPrecision {
        #[serde(default)]
        precision: Option<i64>,
        candles: Vec<CandleEntryWire>,
    },
    Candles(Vec<CandleEntryWire>),
}

/// One entry of a per-candle full analysis list.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AnalysisEntryWire {
    #[serde(rename = "type")]
    pub kind: u8,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CandlePatternWire {
    #[serde(default)]
    pub code: Option<u32>,
    #[serde(default = "default_candles_spanning")]
    pub candles_spanning: u32,
    #[serde(default)]
    pub short_code: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TrendLineWire {
    pub start_index: usize,
    pub end_index: usize,
    /// `0` support, `1` resistance.
    pub direction: u8,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CompactAnalysisWire {
    #[serde(default)]
    pub single_candle: Vec<u32>,
    #[serde(default)]
    pub trend_lines: Vec<CompactTrendLineWire>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct CompactTrendLineWire {
    pub s: usize,
    pub e: usize,
    /// `true` resistance, `false` support.
    pub d: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchEntryWire {
    pub symbol: String,
    #[serde(default)]
    pub full_name: String,
}

fn default_candles_spanning() -> u32 {
    1
}
