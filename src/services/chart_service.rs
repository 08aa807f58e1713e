//! Chart option derivation
//!
//! Turns normalized series into a `ChartIntent`: axis windows, label formats,
//! tick ceilings and series. Nothing here touches a drawing backend.

use chrono::{DateTime, Utc};

use crate::models::{
    AxisRange, Bar, Candle, ChartIntent, ChartKind, ComparisonData, FieldDeviation, Interval,
    IntervalClass, LabelFormat, Market, PredictionResult, PriceField, PricePoint, Series,
    SeriesData, SeriesTone, TimeAxis, TooltipField, ValueAxis,
};

/// Default lookback for the actual-vs-predicted view
pub const DEFAULT_COMPARISON_POINTS: usize = 30;
/// Default number of bars in a deviation chart
pub const DEFAULT_DEVIATION_BARS: usize = 20;
/// Candles drawn in the actual price history view
pub const DEFAULT_HISTORY_CANDLES: usize = 150;

const DEVIATION_DECIMALS: usize = 5;

pub fn label_format(class: IntervalClass) -> LabelFormat {
    match class {
        IntervalClass::Minute | IntervalClass::Hour => LabelFormat::ShortDateTime,
        IntervalClass::Day => LabelFormat::ShortDate,
        IntervalClass::Week => LabelFormat::MonthYear,
    }
}

pub fn tooltip_format(class: IntervalClass) -> &'static str {
    match class {
        IntervalClass::Minute | IntervalClass::Hour => "%b %d, %H:%M",
        IntervalClass::Day | IntervalClass::Week => "%b %d, %Y",
    }
}

/// Upper bound on x-axis ticks; sub-daily charts get fewer to avoid crowding
pub fn tick_ceiling(class: IntervalClass) -> usize {
    if class.is_sub_daily() {
        6
    } else {
        12
    }
}

/// User-requested lookback, never below one point
pub fn lookback_points(requested: Option<usize>, default: usize) -> usize {
    requested.unwrap_or(default).max(1)
}

/// Pad `[min, max]` by 10% of the range on each side.
/// Returns None when no finite value is present.
pub fn padded_range<I>(values: I) -> Option<AxisRange>
where
    I: IntoIterator<Item = f64>,
{
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;

    let padding = (max - min) * 0.1;
    Some(AxisRange {
        min: min - padding,
        max: max + padding,
    })
}

/// Time window covering the last `points` distinct timestamps
pub fn time_window<I>(timestamps: I, points: usize) -> Option<(DateTime<Utc>, DateTime<Utc>)>
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let mut all: Vec<DateTime<Utc>> = timestamps.into_iter().collect();
    if all.is_empty() {
        return None;
    }
    all.sort();
    all.dedup();

    let count = points.max(1);
    let start = all.len().saturating_sub(count);
    Some((all[start], all[all.len() - 1]))
}

pub fn time_axis(interval: Interval, window: Option<(DateTime<Utc>, DateTime<Utc>)>) -> TimeAxis {
    let class = interval.class();
    TimeAxis {
        min: window.map(|(min, _)| min),
        max: window.map(|(_, max)| max),
        label_format: label_format(class),
        tooltip_format: tooltip_format(class),
        tick_count: tick_ceiling(class),
    }
}

fn in_window(ts: DateTime<Utc>, window: Option<(DateTime<Utc>, DateTime<Utc>)>) -> bool {
    window.map_or(false, |(min, max)| ts >= min && ts <= max)
}

/// Actual vs predicted line chart for one field.
///
/// The x window is the last `points` timestamps of the merged series and both
/// lines are clipped to it. The y range is padded over every actual and
/// predicted value, so shrinking the lookback does not rescale the axis.
pub fn comparison_chart(
    market: Market,
    interval: Interval,
    field: PriceField,
    data: &ComparisonData,
    points: usize,
) -> ChartIntent {
    let window = time_window(
        data.actual
            .iter()
            .chain(data.predicted.iter())
            .map(|p| p.timestamp),
        points,
    );

    let clip = |series: &[PricePoint]| -> Vec<(DateTime<Utc>, f64)> {
        series
            .iter()
            .filter(|p| in_window(p.timestamp, window))
            .map(|p| (p.timestamp, p.value(field)))
            .filter(|(_, v)| !v.is_nan())
            .collect()
    };

    let actual = clip(&data.actual);
    let predicted = clip(&data.predicted);
    let range = padded_range(
        data.actual
            .iter()
            .chain(data.predicted.iter())
            .map(|p| p.value(field)),
    );

    ChartIntent {
        title: format!("{} {} - Actual vs Predicted ({})", market, field, interval),
        kind: ChartKind::Line,
        x_axis: time_axis(interval, window),
        y_axis: ValueAxis {
            range,
            decimals: market.price_decimals(),
            prefix: "$",
        },
        series: vec![
            Series {
                name: format!("Actual {}", field),
                tone: SeriesTone::Actual,
                data: SeriesData::Line(actual),
            },
            Series {
                name: format!("Predicted {}", field),
                tone: SeriesTone::Predicted,
                data: SeriesData::Line(predicted),
            },
        ],
        tooltip: vec![TooltipField::Date, TooltipField::Actual, TooltipField::Predicted],
    }
}

fn candle_chart(
    title: String,
    name: String,
    tone: SeriesTone,
    market: Market,
    interval: Interval,
    candles: Vec<Candle>,
    tooltip: Vec<TooltipField>,
) -> ChartIntent {
    let window = time_window(candles.iter().map(|c| c.timestamp), candles.len());
    let range = padded_range(candles.iter().flat_map(|c| [c.low, c.high]));

    ChartIntent {
        title,
        kind: ChartKind::Candlestick,
        x_axis: time_axis(interval, window),
        y_axis: ValueAxis {
            range,
            decimals: market.price_decimals(),
            prefix: "$",
        },
        series: vec![Series {
            name,
            tone,
            data: SeriesData::Candles(candles),
        }],
        tooltip,
    }
}

fn candle(p: &PricePoint) -> Candle {
    Candle {
        timestamp: p.timestamp,
        open: p.open,
        high: p.high,
        low: p.low,
        close: p.close,
    }
}

/// Candlestick chart of a prediction run
pub fn prediction_chart(result: &PredictionResult) -> ChartIntent {
    let candles = result.predictions.iter().map(|p| candle(&p.price)).collect();

    candle_chart(
        format!("{} - Predicted OHLC ({})", result.market, result.interval),
        "Predicted OHLC".to_string(),
        SeriesTone::Predicted,
        result.market,
        result.interval,
        candles,
        vec![
            TooltipField::Date,
            TooltipField::Open,
            TooltipField::High,
            TooltipField::Low,
            TooltipField::Close,
            TooltipField::Confidence,
            TooltipField::Change,
        ],
    )
}

/// Candlestick chart of the latest `limit` actual candles
pub fn history_chart(market: Market, interval: Interval, history: &[PricePoint], limit: usize) -> ChartIntent {
    let start = history.len().saturating_sub(limit.max(1));
    let candles = history[start..].iter().map(candle).collect();

    candle_chart(
        format!("{} - Actual Price ({})", market, interval),
        "Actual OHLC".to_string(),
        SeriesTone::Actual,
        market,
        interval,
        candles,
        vec![
            TooltipField::Date,
            TooltipField::Open,
            TooltipField::High,
            TooltipField::Low,
            TooltipField::Close,
        ],
    )
}

/// Bar chart of the most recent absolute deviations for one field
pub fn deviation_chart(
    market: Market,
    interval: Interval,
    deviation: &FieldDeviation,
    limit: usize,
) -> ChartIntent {
    let format = label_format(interval.class());
    let start = deviation.records.len().saturating_sub(limit.max(1));

    let bars: Vec<Bar> = deviation.records[start..]
        .iter()
        .map(|r| Bar {
            label: r.timestamp.format(format.pattern()).to_string(),
            timestamp: r.timestamp,
            value: r.deviation.abs(),
            signed: r.deviation,
        })
        .collect();

    let window = time_window(bars.iter().map(|b| b.timestamp), bars.len());
    // bars grow from zero
    let range = padded_range(bars.iter().map(|b| b.value)).map(|r| AxisRange {
        min: 0.0,
        max: r.max,
    });

    ChartIntent {
        title: format!(
            "{} {} Price Deviations (Last {}, {})",
            market,
            deviation.field,
            bars.len(),
            interval
        ),
        kind: ChartKind::Bar,
        x_axis: time_axis(interval, window),
        y_axis: ValueAxis {
            range,
            decimals: DEVIATION_DECIMALS,
            prefix: "",
        },
        series: vec![Series {
            name: "Absolute Deviation".to_string(),
            tone: SeriesTone::Neutral,
            data: SeriesData::Bars(bars),
        }],
        tooltip: vec![
            TooltipField::Date,
            TooltipField::Actual,
            TooltipField::Predicted,
            TooltipField::Deviation,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JoinPolicy, PredictionPoint, PredictionSummary};
    use crate::services::deviation_service;
    use chrono::{Duration, TimeZone};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn series(start_hour: u32, values: &[f64]) -> Vec<PricePoint> {
        let base = Utc.with_ymd_and_hms(2025, 4, 5, start_hour, 0, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| PricePoint {
                timestamp: base + Duration::hours(i as i64),
                open: v,
                high: v + 1.0,
                low: v - 1.0,
                close: v,
            })
            .collect()
    }

    #[test]
    fn test_padded_range_example() {
        let range = padded_range(vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!(approx(range.min, 0.7));
        assert!(approx(range.max, 4.3));
    }

    #[test]
    fn test_padded_range_empty_and_flat() {
        assert!(padded_range(Vec::<f64>::new()).is_none());
        assert!(padded_range(vec![f64::NAN]).is_none());
        let flat = padded_range(vec![5.0, 5.0]).unwrap();
        assert_eq!((flat.min, flat.max), (5.0, 5.0));
    }

    #[test]
    fn test_formats_and_ticks_by_class() {
        assert_eq!(label_format(IntervalClass::Minute), LabelFormat::ShortDateTime);
        assert_eq!(label_format(IntervalClass::Hour), LabelFormat::ShortDateTime);
        assert_eq!(label_format(IntervalClass::Day), LabelFormat::ShortDate);
        assert_eq!(label_format(IntervalClass::Week), LabelFormat::MonthYear);
        assert_eq!(tick_ceiling(IntervalClass::Minute), 6);
        assert_eq!(tick_ceiling(IntervalClass::Hour), 6);
        assert_eq!(tick_ceiling(IntervalClass::Day), 12);
        assert_eq!(tick_ceiling(IntervalClass::Week), 12);
    }

    #[test]
    fn test_lookback_never_below_one() {
        assert_eq!(lookback_points(None, 30), 30);
        assert_eq!(lookback_points(Some(0), 30), 1);
        assert_eq!(lookback_points(Some(50), 30), 50);
    }

    #[test]
    fn test_time_window_takes_last_points() {
        let points = series(0, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        let (min, max) = time_window(points.iter().map(|p| p.timestamp), 2).unwrap();
        assert_eq!(min, points[3].timestamp);
        assert_eq!(max, points[4].timestamp);

        let (min, _) = time_window(points.iter().map(|p| p.timestamp), 100).unwrap();
        assert_eq!(min, points[0].timestamp);
        assert!(time_window(Vec::new(), 10).is_none());
    }

    #[test]
    fn test_comparison_chart_clips_and_pads() {
        let data = ComparisonData {
            actual: series(0, &[10.0, 11.0, 12.0, 13.0]),
            predicted: series(2, &[12.5, 13.5, 14.0]),
        };
        let chart = comparison_chart(Market::Gold, Interval::OneHour, PriceField::Close, &data, 3);
        assert_eq!(chart.kind, ChartKind::Line);
        assert_eq!(chart.x_axis.tick_count, 6);
        assert_eq!(chart.x_axis.label_format, LabelFormat::ShortDateTime);

        // merged timestamps are hours 0..=4; the last three are 2, 3, 4
        let window_start = data.actual[2].timestamp;
        assert_eq!(chart.x_axis.min, Some(window_start));
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].len(), 2);
        assert_eq!(chart.series[1].len(), 3);

        // all values 10..=14 count, not just the windowed ones -> padding 0.4
        let range = chart.y_axis.range.unwrap();
        assert!(approx(range.min, 9.6));
        assert!(approx(range.max, 14.4));
    }

    #[test]
    fn test_comparison_range_ignores_lookback() {
        let data = ComparisonData {
            actual: series(0, &[1.0, 2.0, 3.0, 4.0]),
            predicted: series(0, &[1.0, 2.0, 3.0, 4.0]),
        };
        let chart = comparison_chart(Market::Gold, Interval::OneHour, PriceField::Close, &data, 1);
        assert_eq!(chart.series[0].len(), 1);
        assert_eq!(chart.series[1].len(), 1);

        let range = chart.y_axis.range.unwrap();
        assert!(approx(range.min, 0.7));
        assert!(approx(range.max, 4.3));
    }

    #[test]
    fn test_comparison_chart_without_data() {
        let chart = comparison_chart(
            Market::Gold,
            Interval::OneDay,
            PriceField::Open,
            &ComparisonData::default(),
            30,
        );
        assert!(!chart.has_data());
        assert!(chart.x_axis.min.is_none());
        assert!(chart.y_axis.range.is_none());
        assert_eq!(chart.x_axis.tick_count, 12);
    }

    #[test]
    fn test_prediction_chart_candles() {
        let predictions = series(5, &[100.0, 102.0])
            .into_iter()
            .map(|price| PredictionPoint {
                price,
                confidence: Some(80.0),
                change: price.close - price.open,
                range: price.high - price.low,
                formatted: None,
            })
            .collect();
        let result = PredictionResult {
            market: Market::Gold,
            interval: Interval::OneWeek,
            predictions,
            summary: PredictionSummary::default(),
            message: "ok".to_string(),
        };
        let chart = prediction_chart(&result);
        assert_eq!(chart.kind, ChartKind::Candlestick);
        assert_eq!(chart.x_axis.label_format, LabelFormat::MonthYear);
        // lows/highs span 99..103 -> padding 0.4
        let range = chart.y_axis.range.unwrap();
        assert!(approx(range.min, 98.6));
        assert!(approx(range.max, 103.4));
    }

    #[test]
    fn test_history_chart_keeps_latest_candles() {
        let history = series(0, &[10.0, 11.0, 12.0, 13.0, 14.0]);
        let chart = history_chart(Market::Gold, Interval::OneDay, &history, 3);
        assert_eq!(chart.kind, ChartKind::Candlestick);
        assert_eq!(chart.series[0].tone, SeriesTone::Actual);
        assert_eq!(chart.x_axis.label_format, LabelFormat::ShortDate);
        assert_eq!(chart.x_axis.tick_count, 12);

        let SeriesData::Candles(candles) = &chart.series[0].data else {
            panic!("expected candles");
        };
        assert_eq!(candles.len(), 3);
        assert_eq!(candles[0].open, 12.0);
        assert_eq!(chart.x_axis.min, Some(history[2].timestamp));
        assert_eq!(chart.x_axis.max, Some(history[4].timestamp));

        // lows/highs of the kept candles span 11..15 -> padding 0.4
        let range = chart.y_axis.range.unwrap();
        assert!(approx(range.min, 10.6));
        assert!(approx(range.max, 15.4));
    }

    #[test]
    fn test_history_chart_without_data() {
        let chart = history_chart(Market::Gold, Interval::OneHour, &[], DEFAULT_HISTORY_CANDLES);
        assert!(!chart.has_data());
        assert!(chart.y_axis.range.is_none());
        assert!(chart.x_axis.min.is_none());
    }

    #[test]
    fn test_deviation_chart_keeps_latest_bars() {
        let actual = series(0, &[10.0, 11.0, 12.0, 13.0]);
        let predicted = series(0, &[11.0, 10.0, 12.5, 12.0]);
        let report = deviation_service::build_report(&actual, &predicted, JoinPolicy::Exact);
        let close = report.field(PriceField::Close).unwrap();

        let chart = deviation_chart(Market::Gold, Interval::OneHour, close, 2);
        let SeriesData::Bars(bars) = &chart.series[0].data else {
            panic!("expected bars");
        };
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].signed, -0.5);
        assert_eq!(bars[0].value, 0.5);
        assert_eq!(bars[1].signed, 1.0);
        assert_eq!(chart.y_axis.range.unwrap().min, 0.0);
    }
}
