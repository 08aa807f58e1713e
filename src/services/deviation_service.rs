//! Actual-vs-predicted alignment and deviation math

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::models::{
    DeviationRecord, DeviationReport, FieldDeviation, JoinPolicy, PriceField, PricePoint,
};

/// Build the deviation record for one aligned pair
pub fn deviation_record(
    timestamp: DateTime<Utc>,
    field: PriceField,
    actual: f64,
    predicted: f64,
) -> DeviationRecord {
    let deviation = actual - predicted;
    DeviationRecord {
        timestamp,
        field,
        actual,
        predicted,
        deviation,
        deviation_percent: deviation / actual * 100.0,
    }
}

/// Predicted values for one field, indexed for lookup under a join policy
enum PredictedIndex {
    Exact(HashMap<i64, (DateTime<Utc>, f64)>),
    /// Sorted by timestamp, one entry per timestamp
    Sorted(Vec<(DateTime<Utc>, f64)>),
}

impl PredictedIndex {
    fn build(predicted: &[PricePoint], field: PriceField, policy: JoinPolicy) -> Self {
        // later entries overwrite earlier ones for the same timestamp
        let mut by_time: HashMap<i64, (DateTime<Utc>, f64)> = HashMap::with_capacity(predicted.len());
        for point in predicted {
            by_time.insert(point.timestamp.timestamp_millis(), (point.timestamp, point.value(field)));
        }

        match policy {
            JoinPolicy::Exact => PredictedIndex::Exact(by_time),
            JoinPolicy::Nearest { .. } => {
                let mut sorted: Vec<(DateTime<Utc>, f64)> = by_time.into_values().collect();
                sorted.sort_by_key(|(t, _)| *t);
                PredictedIndex::Sorted(sorted)
            }
        }
    }

    fn lookup(&self, timestamp: DateTime<Utc>, policy: JoinPolicy) -> Option<f64> {
        match (self, policy) {
            (PredictedIndex::Exact(map), _) => map.get(&timestamp.timestamp_millis()).map(|(_, v)| *v),
            (PredictedIndex::Sorted(sorted), JoinPolicy::Nearest { tolerance }) => {
                let idx = sorted.partition_point(|(t, _)| *t < timestamp);
                let before = idx.checked_sub(1).and_then(|i| sorted.get(i));
                let after = sorted.get(idx);

                let candidate = match (before, after) {
                    (Some(b), Some(a)) => {
                        if timestamp - b.0 <= a.0 - timestamp {
                            Some(b)
                        } else {
                            Some(a)
                        }
                    }
                    (Some(b), None) => Some(b),
                    (None, Some(a)) => Some(a),
                    (None, None) => None,
                }?;

                let distance = if candidate.0 >= timestamp {
                    candidate.0 - timestamp
                } else {
                    timestamp - candidate.0
                };
                (distance <= tolerance).then_some(candidate.1)
            }
            (PredictedIndex::Sorted(_), JoinPolicy::Exact) => None,
        }
    }
}

/// Align actual and predicted series on one field.
///
/// Emits one record per distinct actual timestamp that has a predicted
/// partner under `policy`, skipping NaN values, sorted by ascending time.
pub fn compute_deviations(
    actual: &[PricePoint],
    predicted: &[PricePoint],
    field: PriceField,
    policy: JoinPolicy,
) -> Vec<DeviationRecord> {
    let index = PredictedIndex::build(predicted, field, policy);
    let mut seen: HashSet<i64> = HashSet::with_capacity(actual.len());

    let mut records: Vec<DeviationRecord> = actual
        .iter()
        .filter(|point| seen.insert(point.timestamp.timestamp_millis()))
        .filter_map(|point| {
            let actual_value = point.value(field);
            let predicted_value = index.lookup(point.timestamp, policy)?;
            if actual_value.is_nan() || predicted_value.is_nan() {
                return None;
            }
            Some(deviation_record(point.timestamp, field, actual_value, predicted_value))
        })
        .collect();

    records.sort_by_key(|r| r.timestamp);
    records
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Deviation records and aggregates for every OHLC field
pub fn build_report(actual: &[PricePoint], predicted: &[PricePoint], policy: JoinPolicy) -> DeviationReport {
    let fields = PriceField::ALL
        .iter()
        .map(|&field| {
            let records = compute_deviations(actual, predicted, field, policy);
            let mean_abs_deviation = mean(records.iter().map(|r| r.deviation.abs()));
            let mean_abs_percent = mean(
                records
                    .iter()
                    .map(|r| r.deviation_percent.abs())
                    .filter(|p| p.is_finite()),
            );
            FieldDeviation {
                field,
                records,
                mean_abs_deviation,
                mean_abs_percent,
            }
        })
        .collect();

    DeviationReport { policy, fields }
}

/// Format a percentage, showing `n/a` for the zero-actual case
pub fn format_percent(value: f64) -> String {
    if value.is_finite() {
        format!("{:+.2}%", value)
    } else {
        "n/a".to_string()
    }
}
