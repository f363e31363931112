use candleview::core::{Candle, CandleSeries, SeriesUpdate};

fn candle(open: i64, close: i64, start: i64) -> Candle {
    Candle::new(
        open,
        open.max(close) + 5,
        open.min(close) - 5,
        close,
        10,
        start,
        start + 59,
    )
    .expect("valid candle")
}

#[test]
fn candle_validation_enforces_ohlc_ordering() {
    assert!(Candle::new(100, 90, 80, 85, 1, 0, 1).is_err());
    assert!(Candle::new(100, 110, 105, 108, 1, 0, 1).is_err());
    assert!(Candle::new(100, 110, 90, 95, -1, 0, 1).is_err());
    assert!(Candle::new(100, 110, 90, 95, 1, 5, 1).is_err());
    assert!(Candle::new(100, 100, 100, 100, 0, 1, 1).is_ok());
}

#[test]
fn bullish_and_doji_classification() {
    assert!(candle(100, 110, 0).is_bullish());
    assert!(!candle(110, 100, 0).is_bullish());
    let doji = candle(100, 100, 0);
    assert!(doji.is_doji());
    assert!(doji.is_bullish());
}

#[test]
fn latest_with_same_start_replaces_last() {
    let mut series =
        CandleSeries::from_candles(vec![candle(100, 105, 0), candle(105, 107, 60)]).expect("series");

    let update = series.apply_latest(candle(105, 109, 60)).expect("apply");
    assert_eq!(update, SeriesUpdate::Replaced { prices_changed: true });
    assert_eq!(series.len(), 2);
    assert_eq!(series.last().map(|c| c.close), Some(109));

    let update = series.apply_latest(candle(105, 109, 60)).expect("apply");
    assert_eq!(update, SeriesUpdate::Replaced { prices_changed: false });
}

#[test]
fn latest_with_new_start_appends() {
    let mut series = CandleSeries::from_candles(vec![candle(100, 105, 0)]).expect("series");
    let update = series.apply_latest(candle(105, 103, 60)).expect("apply");
    assert_eq!(update, SeriesUpdate::Appended);
    assert_eq!(series.len(), 2);
    assert_eq!(series.get(1).map(|c| c.start), Some(60));
}

#[test]
fn latest_into_empty_series_appends() {
    let mut series = CandleSeries::new();
    assert_eq!(series.apply_latest(candle(1, 2, 0)).expect("apply"), SeriesUpdate::Appended);
    assert_eq!(series.len(), 1);
}

#[test]
fn older_latest_candle_is_rejected_without_mutation() {
    let mut series =
        CandleSeries::from_candles(vec![candle(100, 105, 0), candle(105, 107, 60)]).expect("series");
    let before = series.clone();
    assert!(series.apply_latest(candle(100, 101, 0)).is_err());
    assert_eq!(series, before);
}

#[test]
fn full_snapshot_must_be_ordered() {
    let mut series = CandleSeries::from_candles(vec![candle(1, 2, 0)]).expect("series");
    let err = series.replace_all(vec![candle(1, 2, 60), candle(1, 2, 0)]);
    assert!(err.is_err());
    assert_eq!(series.len(), 1, "rejected snapshot leaves series untouched");

    series.replace_all(vec![candle(1, 2, 0), candle(2, 3, 60), candle(3, 4, 120)]).expect("replace");
    assert_eq!(series.len(), 3);
    series.clear();
    assert!(series.is_empty());
}
