//! Fetch-and-normalize flows behind the market commands

use tracing::{debug, info};

use crate::api::prediction::RawPredictionResponse;
use crate::api::PredictionClient;
use crate::models::{
    ComparisonData, DeviationReport, Interval, JoinPolicy, Market, PredictionResult, PricePoint,
};
use crate::services::deviation_service;
use crate::services::normalizer::{normalize_summary, Normalizer};
use crate::utils::errors::api_error_message;

const DEFAULT_MESSAGE: &str = "Prediction completed";

/// Fetch actual and predicted history concurrently and normalize both
pub async fn fetch_comparison(
    client: &PredictionClient,
    normalizer: &Normalizer,
    market: Market,
    interval: Interval,
) -> Result<ComparisonData, String> {
    let (actual, predicted) = tokio::join!(
        client.actual_prices(market, interval),
        client.predicted_prices(market, interval)
    );

    let actual = actual.map_err(|e| api_error_message(&e))?;
    let predicted = predicted.map_err(|e| api_error_message(&e))?;

    let data = ComparisonData {
        actual: normalizer.normalize_series(&actual),
        predicted: normalizer.normalize_series(&predicted),
    };

    debug!(
        "{} {}: kept {}/{} actual and {}/{} predicted rows",
        market,
        interval,
        data.actual.len(),
        actual.len(),
        data.predicted.len(),
        predicted.len()
    );

    Ok(data)
}

/// Actual OHLC history only
pub async fn fetch_history(
    client: &PredictionClient,
    normalizer: &Normalizer,
    market: Market,
    interval: Interval,
) -> Result<Vec<PricePoint>, String> {
    let rows = client
        .actual_prices(market, interval)
        .await
        .map_err(|e| api_error_message(&e))?;
    let history = normalizer.normalize_series(&rows);
    debug!("{} {}: kept {}/{} history rows", market, interval, history.len(), rows.len());
    Ok(history)
}

/// Fetch both series and compute deviations for all four fields
pub async fn fetch_deviation_report(
    client: &PredictionClient,
    normalizer: &Normalizer,
    market: Market,
    interval: Interval,
    policy: JoinPolicy,
) -> Result<(ComparisonData, DeviationReport), String> {
    let data = fetch_comparison(client, normalizer, market, interval).await?;
    let report = deviation_service::build_report(&data.actual, &data.predicted, policy);
    Ok((data, report))
}

/// Turn a raw prediction response into a normalized result
pub fn build_result(
    market: Market,
    interval: Interval,
    raw: &RawPredictionResponse,
    normalizer: &Normalizer,
) -> Result<PredictionResult, String> {
    let predictions = normalizer.normalize_predictions(&raw.rows());
    if predictions.is_empty() {
        return Err("❌ Invalid prediction data: no usable prediction rows".to_string());
    }

    let message = raw
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_MESSAGE)
        .to_string();

    Ok(PredictionResult {
        market,
        interval,
        predictions,
        summary: normalize_summary(raw.summary.as_ref()),
        message,
    })
}

/// Run a fresh prediction for the upcoming candles
pub async fn run_prediction(
    client: &PredictionClient,
    normalizer: &Normalizer,
    market: Market,
    interval: Interval,
) -> Result<PredictionResult, String> {
    info!("Running prediction for {} {}", market, interval);
    let raw = client
        .prediction_result(market, interval)
        .await
        .map_err(|e| api_error_message(&e))?;

    build_result(market, interval, &raw, normalizer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Symbol;
    use chrono::FixedOffset;
    use serde_json::json;
    use std::time::Duration;

    use crate::services::normalizer::SourceZone;

    fn utc_normalizer() -> Normalizer {
        Normalizer::new(SourceZone::Fixed(FixedOffset::east_opt(0).unwrap()))
    }

    fn response(value: serde_json::Value) -> RawPredictionResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_build_result_normalizes_rows_and_summary() {
        let raw = response(json!({
            "predictions": [
                {"date": "2025-04-05 15:00:00", "open": 1.1, "high": 1.2, "low": 1.0, "close": 1.15, "confidence": 82.5},
                {"date": "2025-04-05 14:00:00", "open": "1.0", "high": 1.1, "low": 0.9, "close": 1.1},
                {"date": "garbage", "open": 1.0, "high": 1.0, "low": 1.0, "close": 1.0}
            ],
            "summary": {"last_close": 1.09, "avg_predicted_close": "1.12", "symbol": "EURUSD=X"},
            "message": "ok"
        }));

        let result = build_result(
            Market::Currency(Symbol::EurUsd),
            Interval::OneHour,
            &raw,
            &utc_normalizer(),
        )
        .unwrap();

        assert_eq!(result.predictions.len(), 2);
        assert!(result.predictions[0].price.timestamp < result.predictions[1].price.timestamp);
        assert_eq!(result.predictions[1].confidence, Some(82.5));
        assert_eq!(result.summary.last_close, Some(1.09));
        assert_eq!(result.summary.avg_predicted_close, Some(1.12));
        assert_eq!(result.summary.symbol.as_deref(), Some("EURUSD=X"));
        assert_eq!(result.message, "ok");
    }

    #[test]
    fn test_build_result_defaults_message() {
        let raw = response(json!({
            "predictions": [{"date": "2025-04-05", "open": 1, "high": 2, "low": 0.5, "close": 1.5}]
        }));
        let result = build_result(Market::Gold, Interval::OneDay, &raw, &utc_normalizer()).unwrap();
        assert_eq!(result.message, DEFAULT_MESSAGE);
        assert_eq!(result.summary, Default::default());
    }

    #[test]
    fn test_build_result_rejects_all_malformed_rows() {
        let raw = response(json!({"predictions": [{"date": null, "open": 1}]}));
        assert!(build_result(Market::Gold, Interval::OneHour, &raw, &utc_normalizer()).is_err());
    }

    #[tokio::test]
    async fn test_fetch_comparison_surfaces_transport_error() {
        let client = PredictionClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = fetch_comparison(&client, &utc_normalizer(), Market::Gold, Interval::OneHour)
            .await
            .unwrap_err();
        assert!(err.contains("unreachable"));
    }
}
