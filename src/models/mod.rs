//! Data models shared by the commands and services
//!
//! Market and interval selection, normalized price series, deviation
//! records, chart intents, trade plans and per-user preferences.

pub mod chart;
pub mod deviation;
pub mod interval;
pub mod prediction;
pub mod preferences;
pub mod price;
pub mod trade;

pub use chart::{
    AxisRange, Bar, Candle, ChartIntent, ChartKind, LabelFormat, Series, SeriesData, SeriesTone,
    TimeAxis, TooltipField, ValueAxis,
};
pub use deviation::{DeviationRecord, DeviationReport, FieldDeviation, JoinPolicy};
pub use interval::{Interval, IntervalClass, Market, Symbol};
pub use prediction::{ComparisonData, PredictionResult, PredictionSummary};
pub use preferences::{PreferenceKey, RejectedPreference, UserPreferences};
pub use price::{PredictionPoint, PriceField, PricePoint};
pub use trade::{PlanInputs, PredictionPlan, RangePlan, TradeLevels, TradeParams, TradeSide};
