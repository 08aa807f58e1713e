//! Normalized price series models

use chrono::{DateTime, Utc};
use std::fmt;

/// One OHLC candle after normalization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Predicted candle with the extra fields the result endpoint provides
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionPoint {
    pub price: PricePoint,
    /// Model confidence in percent (0–100), when the backend supplies one
    pub confidence: Option<f64>,
    pub change: f64,
    pub range: f64,
    pub formatted: Option<String>,
}

/// OHLC field selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
}

impl PricePoint {
    pub fn value(&self, field: PriceField) -> f64 {
        match field {
            PriceField::Open => self.open,
            PriceField::High => self.high,
            PriceField::Low => self.low,
            PriceField::Close => self.close,
        }
    }
}

impl PredictionPoint {
    /// Percent move from open to close
    pub fn change_percent(&self) -> f64 {
        self.change / self.price.open * 100.0
    }
}

impl PriceField {
    pub const ALL: [PriceField; 4] = [
        PriceField::Open,
        PriceField::High,
        PriceField::Low,
        PriceField::Close,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PriceField::Open => "Open",
            PriceField::High => "High",
            PriceField::Low => "Low",
            PriceField::Close => "Close",
        }
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "open" | "o" => Ok(PriceField::Open),
            "high" | "h" => Ok(PriceField::High),
            "low" | "l" => Ok(PriceField::Low),
            "close" | "c" => Ok(PriceField::Close),
            other => Err(format!("❌ Unknown price field: '{}'. Use: open, high, low, close", other)),
        }
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
