//! Prediction result models

use super::interval::{Interval, Market};
use super::price::{PricePoint, PredictionPoint};

/// Summary block returned next to the prediction rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionSummary {
    pub last_open: Option<f64>,
    pub last_high: Option<f64>,
    pub last_low: Option<f64>,
    pub last_close: Option<f64>,
    pub avg_predicted_close: Option<f64>,
    pub high_predicted: Option<f64>,
    pub low_predicted: Option<f64>,
    pub avg_range: Option<f64>,
    pub interval: Option<String>,
    pub symbol: Option<String>,
}

/// Normalized response of a prediction run
#[derive(Debug, Clone)]
pub struct PredictionResult {
    pub market: Market,
    pub interval: Interval,
    pub predictions: Vec<PredictionPoint>,
    pub summary: PredictionSummary,
    pub message: String,
}

/// Actual and predicted series for one market/interval, both normalized
#[derive(Debug, Clone, Default)]
pub struct ComparisonData {
    pub actual: Vec<PricePoint>,
    pub predicted: Vec<PricePoint>,
}

impl ComparisonData {
    pub fn is_empty(&self) -> bool {
        self.actual.is_empty() && self.predicted.is_empty()
    }
}
