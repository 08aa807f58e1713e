//! Chart rendering intent
//!
//! A `ChartIntent` describes what to draw (axes, series, tooltip fields)
//! without depending on any charting library. The derivation lives in
//! `services::chart_service`, drawing in `services::render_service`.

use chrono::{DateTime, Utc};

/// Closed numeric range for a value axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

/// Time axis label format, keyed by interval class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelFormat {
    /// "Apr 05 14:00"
    ShortDateTime,
    /// "Apr 05"
    ShortDate,
    /// "Apr 2025"
    MonthYear,
}

impl LabelFormat {
    pub fn pattern(&self) -> &'static str {
        match self {
            LabelFormat::ShortDateTime => "%b %d %H:%M",
            LabelFormat::ShortDate => "%b %d",
            LabelFormat::MonthYear => "%b %Y",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxis {
    pub min: Option<DateTime<Utc>>,
    pub max: Option<DateTime<Utc>>,
    pub label_format: LabelFormat,
    pub tooltip_format: &'static str,
    pub tick_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueAxis {
    pub range: Option<AxisRange>,
    pub decimals: usize,
    pub prefix: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub timestamp: DateTime<Utc>,
    /// Bar height (absolute deviation)
    pub value: f64,
    /// Signed value, drives the bar color
    pub signed: f64,
}

/// Colour role, mapped to concrete colours by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesTone {
    Actual,
    Predicted,
    Neutral,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SeriesData {
    Line(Vec<(DateTime<Utc>, f64)>),
    Candles(Vec<Candle>),
    Bars(Vec<Bar>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub tone: SeriesTone,
    pub data: SeriesData,
}

impl Series {
    pub fn len(&self) -> usize {
        match &self.data {
            SeriesData::Line(points) => points.len(),
            SeriesData::Candles(candles) => candles.len(),
            SeriesData::Bars(bars) => bars.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Candlestick,
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipField {
    Date,
    Open,
    High,
    Low,
    Close,
    Change,
    Confidence,
    Actual,
    Predicted,
    Deviation,
}

/// Everything a renderer needs to draw one chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartIntent {
    pub title: String,
    pub kind: ChartKind,
    pub x_axis: TimeAxis,
    pub y_axis: ValueAxis,
    pub series: Vec<Series>,
    pub tooltip: Vec<TooltipField>,
}

impl ChartIntent {
    pub fn has_data(&self) -> bool {
        self.series.iter().any(|s| !s.is_empty())
    }
}
