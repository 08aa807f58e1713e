use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Body for the POST endpoints (`symbol` only for currency markets)
#[derive(Debug, Clone, Serialize)]
pub struct IntervalRequest<'a> {
    pub interval: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<&'a str>,
}

/// One raw OHLC row as the backend sends it.
///
/// Actual-price rows use capitalised keys (`Date`, `Open`, ...), predicted
/// rows lowercase ones. Values stay untyped until normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPriceRow {
    #[serde(alias = "Date", default)]
    pub date: Option<Value>,
    #[serde(alias = "Open", default)]
    pub open: Option<Value>,
    #[serde(alias = "High", default)]
    pub high: Option<Value>,
    #[serde(alias = "Low", default)]
    pub low: Option<Value>,
    #[serde(alias = "Close", default)]
    pub close: Option<Value>,
}

/// Wrapper returned by the actual-price endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActualPricesResponse {
    #[serde(default)]
    pub data: Value,
}

/// One row of a prediction run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPredictionRow {
    #[serde(default)]
    pub date: Option<Value>,
    #[serde(default)]
    pub formatted: Option<String>,
    #[serde(default)]
    pub open: Option<Value>,
    #[serde(default)]
    pub high: Option<Value>,
    #[serde(default)]
    pub low: Option<Value>,
    #[serde(default)]
    pub close: Option<Value>,
    #[serde(default)]
    pub change: Option<Value>,
    #[serde(default)]
    pub confidence: Option<Value>,
    #[serde(default)]
    pub price_range: Option<Value>,
}

impl RawPredictionRow {
    pub fn as_price_row(&self) -> RawPriceRow {
        RawPriceRow {
            date: self.date.clone(),
            open: self.open.clone(),
            high: self.high.clone(),
            low: self.low.clone(),
            close: self.close.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSummary {
    #[serde(default)]
    pub last_open: Option<Value>,
    #[serde(default)]
    pub last_high: Option<Value>,
    #[serde(default)]
    pub last_low: Option<Value>,
    #[serde(default)]
    pub last_close: Option<Value>,
    #[serde(default)]
    pub avg_predicted_close: Option<Value>,
    #[serde(default)]
    pub high_predicted: Option<Value>,
    #[serde(default)]
    pub low_predicted: Option<Value>,
    #[serde(default)]
    pub avg_range: Option<Value>,
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
}

/// Response of the prediction-result endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPredictionResponse {
    #[serde(default)]
    pub predictions: Value,
    #[serde(default)]
    pub summary: Option<RawSummary>,
    #[serde(default)]
    pub message: Option<String>,
}

impl RawPredictionResponse {
    pub fn rows(&self) -> Vec<RawPredictionRow> {
        rows_from_value(&self.predictions)
    }
}

/// Decode every object in a JSON array, skipping entries that are not rows.
/// Anything other than an array yields no rows.
pub fn rows_from_value<T>(value: &Value) -> Vec<T>
where
    T: for<'de> Deserialize<'de>,
{
    let Some(items) = value.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<T>(item.clone()) {
            Ok(row) => Some(row),
            Err(e) => {
                debug!("Skipping undecodable row {}: {}", item, e);
                None
            }
        })
        .collect()
}

/// Errors raised by the prediction API client
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Transport failure (connection refused, timeout, ...)
    #[error("Request failed: {0}")]
    Request(String),
    /// Non-2xx response; `message` prefers the server-provided text
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("Failed to parse response: {0}")]
    Deserialization(String),
    #[error("Invalid prediction data: predictions array missing or empty")]
    EmptyPredictions,
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Pick the human-readable message out of an error body.
///
/// Looks for `message`, then `error`, then `detail`; falls back to the raw
/// body, then to the status line.
pub fn extract_error_message(status: u16, body_text: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body_text) {
        for key in ["message", "error", "detail"] {
            if let Some(msg) = json.get(key).and_then(|v| v.as_str()) {
                if !msg.trim().is_empty() {
                    return msg.trim().to_string();
                }
            }
        }
    }

    let trimmed = body_text.trim();
    if !trimmed.is_empty() && trimmed.len() <= 200 && !trimmed.starts_with('<') {
        return trimmed.to_string();
    }

    format!("Request failed with status code {}", status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_actual_rows_accept_capitalised_keys() {
        let rows: Vec<RawPriceRow> = rows_from_value(&json!([
            {"Date": "2025-04-05 14:00:00", "Open": 1.0, "High": 2.0, "Low": 0.5, "Close": "1.5"}
        ]));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, Some(json!("2025-04-05 14:00:00")));
        assert_eq!(rows[0].close, Some(json!("1.5")));
    }

    #[test]
    fn test_non_array_payload_yields_no_rows() {
        assert!(rows_from_value::<RawPriceRow>(&Value::Null).is_empty());
        assert!(rows_from_value::<RawPriceRow>(&json!({"data": []})).is_empty());
    }

    #[test]
    fn test_non_object_entries_are_skipped() {
        let rows: Vec<RawPriceRow> = rows_from_value(&json!([
            42,
            {"date": "2025-04-05T14:00:00", "open": 1, "high": 2, "low": 0, "close": 1}
        ]));
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_request_body_omits_symbol_for_gold() {
        let body = IntervalRequest { interval: "1h", symbol: None };
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({"interval": "1h"}));

        let body = IntervalRequest { interval: "4h", symbol: Some("EURUSD=X") };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"interval": "4h", "symbol": "EURUSD=X"})
        );
    }

    #[test]
    fn test_error_message_prefers_server_fields() {
        assert_eq!(
            extract_error_message(400, r#"{"message": "Model not trained"}"#),
            "Model not trained"
        );
        assert_eq!(
            extract_error_message(500, r#"{"error": "yfinance timeout"}"#),
            "yfinance timeout"
        );
        assert_eq!(
            extract_error_message(404, r#"{"detail": "Not found."}"#),
            "Not found."
        );
        assert_eq!(
            extract_error_message(502, "<html>Bad Gateway</html>"),
            "Request failed with status code 502"
        );
        assert_eq!(extract_error_message(503, ""), "Request failed with status code 503");
    }

    #[test]
    fn test_prediction_response_rows() {
        let response: RawPredictionResponse = serde_json::from_value(json!({
            "predictions": [
                {"date": "2025-04-05 15:00:00", "formatted": "Apr 05 15:00", "open": 2300.5,
                 "high": 2310.0, "low": 2295.1, "close": 2305.2, "change": 4.7,
                 "confidence": 81.5, "price_range": 14.9}
            ],
            "summary": {"last_close": 2299.0, "interval": "1h"},
            "message": "Prediction successful!"
        }))
        .unwrap();
        let rows = response.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].formatted.as_deref(), Some("Apr 05 15:00"));
        assert_eq!(response.summary.unwrap().interval.as_deref(), Some("1h"));
    }
}
