//! Actual-vs-predicted deviation models

use chrono::{DateTime, Duration, Utc};

use super::price::PriceField;

/// One aligned actual/predicted pair for a single OHLC field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviationRecord {
    pub timestamp: DateTime<Utc>,
    pub field: PriceField,
    pub actual: f64,
    pub predicted: f64,
    /// actual − predicted
    pub deviation: f64,
    /// deviation / actual × 100; infinite or NaN when actual is zero
    pub deviation_percent: f64,
}

/// How actual and predicted timestamps are matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinPolicy {
    /// Timestamps must be identical
    Exact,
    /// Closest predicted point within the tolerance, earlier point on ties
    Nearest { tolerance: Duration },
}

impl Default for JoinPolicy {
    fn default() -> Self {
        JoinPolicy::Exact
    }
}

impl JoinPolicy {
    /// A zero tolerance collapses to an exact join
    pub fn from_tolerance(tolerance: Duration) -> Self {
        if tolerance <= Duration::zero() {
            JoinPolicy::Exact
        } else {
            JoinPolicy::Nearest { tolerance }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            JoinPolicy::Exact => "exact timestamp match".to_string(),
            JoinPolicy::Nearest { tolerance } => {
                format!("nearest within {}s", tolerance.num_seconds())
            }
        }
    }
}

/// Deviation series and aggregates for one field
#[derive(Debug, Clone)]
pub struct FieldDeviation {
    pub field: PriceField,
    pub records: Vec<DeviationRecord>,
    pub mean_abs_deviation: Option<f64>,
    /// Mean absolute percentage deviation over finite percentages only
    pub mean_abs_percent: Option<f64>,
}

impl FieldDeviation {
    pub fn matches(&self) -> usize {
        self.records.len()
    }

    pub fn latest(&self) -> Option<&DeviationRecord> {
        self.records.last()
    }
}

/// Deviation analysis across all four OHLC fields
#[derive(Debug, Clone)]
pub struct DeviationReport {
    pub policy: JoinPolicy,
    pub fields: Vec<FieldDeviation>,
}

impl DeviationReport {
    pub fn field(&self, field: PriceField) -> Option<&FieldDeviation> {
        self.fields.iter().find(|f| f.field == field)
    }
}
