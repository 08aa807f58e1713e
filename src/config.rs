//! Startup configuration read from the environment (`.env` is loaded first)

use std::time::Duration;

use chrono::FixedOffset;
use thiserror::Error;

use crate::api::PredictionClient;
use crate::models::{JoinPolicy, TradeParams};
use crate::services::normalizer::SourceZone;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("{key} has invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub discord_token: String,
    pub database_url: String,
    pub api_base_url: String,
    pub api_timeout: Duration,
    pub refresh_interval: Duration,
    pub join_policy: JoinPolicy,
    pub source_zone: SourceZone,
    pub chart_width: u32,
    pub chart_height: u32,
    pub trade: TradeParams,
}

fn required<F>(get: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn parsed<F, T>(get: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(value) => value.parse::<T>().map_err(|e| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

fn positive<T: PartialOrd + Default>(key: &'static str, value: T, raw: impl ToString) -> Result<T, ConfigError> {
    if value > T::default() {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
            reason: "must be greater than zero".to_string(),
        })
    }
}

/// Zero keeps exact matching; negatives and overflowing values are rejected
fn join_tolerance(secs: i64) -> Result<chrono::Duration, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        key: "JOIN_TOLERANCE_SECS",
        value: secs.to_string(),
        reason: reason.to_string(),
    };
    if secs < 0 {
        return Err(invalid("must not be negative"));
    }
    chrono::Duration::try_seconds(secs).ok_or_else(|| invalid("tolerance out of range"))
}

fn trade_params<F>(get: &F) -> Result<TradeParams, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let d = TradeParams::default();
    Ok(TradeParams {
        stop_loss_buffer: parsed(get, "TRADE_STOP_LOSS_BUFFER", d.stop_loss_buffer)?,
        profit_target_offset: parsed(get, "TRADE_PROFIT_TARGET_OFFSET", d.profit_target_offset)?,
        pip_multiplier: parsed(get, "TRADE_PIP_MULTIPLIER", d.pip_multiplier)?,
        trade_day_threshold: parsed(get, "TRADE_DAY_THRESHOLD", d.trade_day_threshold)?,
        buy_entry_offset: parsed(get, "TRADE_BUY_ENTRY_OFFSET", d.buy_entry_offset)?,
        buy_take_profit_offset: parsed(get, "TRADE_BUY_TAKE_PROFIT_OFFSET", d.buy_take_profit_offset)?,
        buy_stop_loss_offset: parsed(get, "TRADE_BUY_STOP_LOSS_OFFSET", d.buy_stop_loss_offset)?,
        sell_entry_offset: parsed(get, "TRADE_SELL_ENTRY_OFFSET", d.sell_entry_offset)?,
        sell_entry_adjust: parsed(get, "TRADE_SELL_ENTRY_ADJUST", d.sell_entry_adjust)?,
        sell_take_profit_offset: parsed(get, "TRADE_SELL_TAKE_PROFIT_OFFSET", d.sell_take_profit_offset)?,
        sell_stop_loss_offset: parsed(get, "TRADE_SELL_STOP_LOSS_OFFSET", d.sell_stop_loss_offset)?,
    })
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discord_token = required(&get, "DISCORD_TOKEN")?;
        let database_url = required(&get, "DATABASE_URL")?;

        let api_base_url = get("PREDICTION_API_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| PredictionClient::DEFAULT_BASE_URL.to_string());
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                key: "PREDICTION_API_URL",
                value: api_base_url,
                reason: "must start with http:// or https://".to_string(),
            });
        }

        let timeout_secs: u64 = parsed(&get, "PREDICTION_API_TIMEOUT_SECS", 30)?;
        let timeout_secs = positive("PREDICTION_API_TIMEOUT_SECS", timeout_secs, timeout_secs)?;
        let refresh_secs: u64 = parsed(&get, "REFRESH_INTERVAL_SECS", 3600)?;
        let refresh_secs = positive("REFRESH_INTERVAL_SECS", refresh_secs, refresh_secs)?;

        let tolerance_secs: i64 = parsed(&get, "JOIN_TOLERANCE_SECS", 0)?;
        let join_policy = JoinPolicy::from_tolerance(join_tolerance(tolerance_secs)?);

        let source_zone = match get("SOURCE_UTC_OFFSET_MINUTES").filter(|v| !v.trim().is_empty()) {
            None => SourceZone::Local,
            Some(raw) => {
                let minutes: i32 = parsed(&get, "SOURCE_UTC_OFFSET_MINUTES", 0)?;
                let offset = FixedOffset::east_opt(minutes * 60).ok_or_else(|| ConfigError::Invalid {
                    key: "SOURCE_UTC_OFFSET_MINUTES",
                    value: raw.clone(),
                    reason: "offset out of range".to_string(),
                })?;
                SourceZone::Fixed(offset)
            }
        };

        let chart_width: u32 = parsed(&get, "CHART_WIDTH", 1000)?;
        let chart_width = positive("CHART_WIDTH", chart_width, chart_width)?;
        let chart_height: u32 = parsed(&get, "CHART_HEIGHT", 600)?;
        let chart_height = positive("CHART_HEIGHT", chart_height, chart_height)?;

        Ok(Self {
            discord_token,
            database_url,
            api_base_url,
            api_timeout: Duration::from_secs(timeout_secs),
            refresh_interval: Duration::from_secs(refresh_secs),
            join_policy,
            source_zone,
            chart_width,
            chart_height,
            trade: trade_params(&get)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const BASE: [(&str, &str); 2] = [("DISCORD_TOKEN", "token"), ("DATABASE_URL", "mysql://localhost/fx")];

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&BASE)).unwrap();
        assert_eq!(config.api_base_url, "http://127.0.0.1:8000");
        assert_eq!(config.api_timeout, Duration::from_secs(30));
        assert_eq!(config.refresh_interval, Duration::from_secs(3600));
        assert_eq!(config.join_policy, JoinPolicy::Exact);
        assert_eq!(config.source_zone, SourceZone::Local);
        assert_eq!((config.chart_width, config.chart_height), (1000, 600));
        assert_eq!(config.trade, TradeParams::default());
    }

    #[test]
    fn test_missing_token() {
        let err = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "mysql://x")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DISCORD_TOKEN"));
    }

    #[test]
    fn test_overrides() {
        let mut pairs = BASE.to_vec();
        pairs.extend([
            ("PREDICTION_API_URL", "https://fx.example.com/"),
            ("JOIN_TOLERANCE_SECS", "5"),
            ("SOURCE_UTC_OFFSET_MINUTES", "-300"),
            ("TRADE_DAY_THRESHOLD", "25.5"),
            ("REFRESH_INTERVAL_SECS", "900"),
        ]);
        let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.api_base_url, "https://fx.example.com/");
        assert_eq!(
            config.join_policy,
            JoinPolicy::Nearest { tolerance: chrono::Duration::seconds(5) }
        );
        assert_eq!(
            config.source_zone,
            SourceZone::Fixed(FixedOffset::west_opt(5 * 3600).unwrap())
        );
        assert_eq!(config.trade.trade_day_threshold, 25.5);
        assert_eq!(config.refresh_interval, Duration::from_secs(900));
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let mut pairs = BASE.to_vec();
        pairs.push(("CHART_WIDTH", "wide"));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&pairs)),
            Err(ConfigError::Invalid { key: "CHART_WIDTH", .. })
        ));

        let mut pairs = BASE.to_vec();
        pairs.push(("REFRESH_INTERVAL_SECS", "0"));
        assert!(AppConfig::from_lookup(lookup(&pairs)).is_err());

        let mut pairs = BASE.to_vec();
        pairs.push(("PREDICTION_API_URL", "localhost:8000"));
        assert!(AppConfig::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn test_join_tolerance_bounds() {
        for raw in ["-5", "9223372036854775807"] {
            let mut pairs = BASE.to_vec();
            pairs.push(("JOIN_TOLERANCE_SECS", raw));
            assert!(matches!(
                AppConfig::from_lookup(lookup(&pairs)),
                Err(ConfigError::Invalid { key: "JOIN_TOLERANCE_SECS", .. })
            ));
        }

        let mut pairs = BASE.to_vec();
        pairs.push(("JOIN_TOLERANCE_SECS", "0"));
        assert_eq!(AppConfig::from_lookup(lookup(&pairs)).unwrap().join_policy, JoinPolicy::Exact);
    }
}
