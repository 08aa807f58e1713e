//! Raw API rows to normalized price series
//!
//! Dates arrive as `"2025-04-05 14:00:00"` or `"2025-04-05T14:00:00"`; the
//! first space becomes a `T` unless a `T` is already present. Naive times
//! are read in the configured source zone; bare dates are UTC midnight. A row
//! is dropped as a whole when its date or any OHLC value fails to convert.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;
use tracing::debug;

use crate::api::prediction::{RawPredictionRow, RawPriceRow, RawSummary};
use crate::models::{PredictionPoint, PredictionSummary, PricePoint};

/// Time zone used for date strings without an explicit offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceZone {
    Local,
    Fixed(FixedOffset),
}

impl Default for SourceZone {
    fn default() -> Self {
        SourceZone::Local
    }
}

impl SourceZone {
    fn resolve(&self, naive: &NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            SourceZone::Local => Local
                .from_local_datetime(naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            SourceZone::Fixed(offset) => offset
                .from_local_datetime(naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    zone: SourceZone,
}

/// Rewrite `"YYYY-MM-DD HH:MM:SS"` into ISO form; strings with a `T` pass through trimmed
pub fn to_iso(date: &str) -> String {
    let trimmed = date.trim();
    if trimmed.contains('T') {
        trimmed.to_string()
    } else {
        trimmed.replacen(' ', "T", 1)
    }
}

/// Loose numeric conversion: JSON numbers as-is, numeric strings parsed.
/// Returns None for anything missing, non-numeric or non-finite.
/// `"inf"` and `"1e999"` parse in Rust but are never real prices.
pub fn coerce_number(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };

    if !number.is_finite() {
        None
    } else {
        Some(number)
    }
}

impl Normalizer {
    pub fn new(zone: SourceZone) -> Self {
        Self { zone }
    }

    /// Parse a raw date string into an instant
    pub fn parse_timestamp(&self, raw: &str) -> Option<DateTime<Utc>> {
        let iso = to_iso(raw);
        if iso.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(&iso) {
            return Some(dt.with_timezone(&Utc));
        }

        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(&iso, format) {
                return self.zone.resolve(&naive);
            }
        }

        NaiveDate::parse_from_str(&iso, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    fn timestamp_of(&self, value: Option<&Value>) -> Option<DateTime<Utc>> {
        match value? {
            Value::String(s) => self.parse_timestamp(s),
            _ => None,
        }
    }

    /// Convert one raw row, or None if any part fails validation
    pub fn normalize_row(&self, row: &RawPriceRow) -> Option<PricePoint> {
        Some(PricePoint {
            timestamp: self.timestamp_of(row.date.as_ref())?,
            open: coerce_number(row.open.as_ref())?,
            high: coerce_number(row.high.as_ref())?,
            low: coerce_number(row.low.as_ref())?,
            close: coerce_number(row.close.as_ref())?,
        })
    }

    /// Normalize a whole series, dropping invalid rows and sorting by time
    pub fn normalize_series(&self, rows: &[RawPriceRow]) -> Vec<PricePoint> {
        let mut points: Vec<PricePoint> = rows
            .iter()
            .filter_map(|row| {
                let point = self.normalize_row(row);
                if point.is_none() {
                    debug!("Dropping malformed price row: {:?}", row);
                }
                point
            })
            .collect();

        points.sort_by_key(|p| p.timestamp);
        points
    }

    /// Normalize prediction rows; change and range are derived when the
    /// backend leaves them out
    pub fn normalize_predictions(&self, rows: &[RawPredictionRow]) -> Vec<PredictionPoint> {
        let mut points: Vec<PredictionPoint> = rows
            .iter()
            .filter_map(|row| {
                let Some(price) = self.normalize_row(&row.as_price_row()) else {
                    debug!("Dropping malformed prediction row: {:?}", row);
                    return None;
                };

                let confidence = coerce_number(row.confidence.as_ref())
                    .filter(|c| (0.0..=100.0).contains(c));

                Some(PredictionPoint {
                    price,
                    confidence,
                    change: coerce_number(row.change.as_ref()).unwrap_or(price.close - price.open),
                    range: coerce_number(row.price_range.as_ref()).unwrap_or(price.high - price.low),
                    formatted: row.formatted.clone().filter(|f| !f.trim().is_empty()),
                })
            })
            .collect();

        points.sort_by_key(|p| p.price.timestamp);
        points
    }
}

/// Convert the summary block, keeping only numeric values
pub fn normalize_summary(raw: Option<&RawSummary>) -> PredictionSummary {
    let Some(raw) = raw else {
        return PredictionSummary::default();
    };

    PredictionSummary {
        last_open: coerce_number(raw.last_open.as_ref()),
        last_high: coerce_number(raw.last_high.as_ref()),
        last_low: coerce_number(raw.last_low.as_ref()),
        last_close: coerce_number(raw.last_close.as_ref()),
        avg_predicted_close: coerce_number(raw.avg_predicted_close.as_ref()),
        high_predicted: coerce_number(raw.high_predicted.as_ref()),
        low_predicted: coerce_number(raw.low_predicted.as_ref()),
        avg_range: coerce_number(raw.avg_range.as_ref()),
        interval: raw.interval.clone(),
        symbol: raw.symbol.clone(),
    }
}
