//! Per-user defaults and risk-disclaimer state

use rand::distributions::Alphanumeric;
use rand::Rng;
use sqlx::mysql::MySqlPool;
use thiserror::Error;
use tracing::{info, warn};

use crate::db;
use crate::models::{Interval, PreferenceKey, Symbol, UserPreferences};
use crate::utils::extract_clean_error;

pub const DISCLAIMER_CODE_LEN: usize = 12;

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("Database error: {}", extract_clean_error(&.0.to_string()))]
    Database(#[from] sqlx::Error),
    #[error("⚠️ You must accept the risk disclaimer first. Read it with `$disclaimer` and reply `$disclaimer accept`.")]
    DisclaimerRequired,
}

/// Load a user's preferences, repairing stored values that no longer validate
pub async fn load_preferences(pool: &MySqlPool, discord_id: u64) -> Result<UserPreferences, PreferenceError> {
    let entries = db::preferences::get_preferences(pool, discord_id).await?;
    let (prefs, rejected) = UserPreferences::from_entries(entries);

    if !rejected.is_empty() {
        let canonical = prefs.to_entries();
        for bad in &rejected {
            warn!(
                "User {} had invalid '{}' value '{}', resetting to default",
                discord_id,
                bad.key.as_str(),
                bad.value
            );
            match canonical.get(&bad.key) {
                Some(value) => db::preferences::set_preference(pool, discord_id, bad.key.as_str(), value).await?,
                None => {
                    db::preferences::delete_preference(pool, discord_id, bad.key.as_str()).await?;
                }
            }
        }
    }

    Ok(prefs)
}

pub async fn set_gold_interval(pool: &MySqlPool, discord_id: u64, interval: Interval) -> Result<(), PreferenceError> {
    db::preferences::set_preference(pool, discord_id, PreferenceKey::GoldInterval.as_str(), interval.as_str()).await?;
    Ok(())
}

pub async fn set_analytic_interval(
    pool: &MySqlPool,
    discord_id: u64,
    interval: Interval,
) -> Result<(), PreferenceError> {
    db::preferences::set_preference(pool, discord_id, PreferenceKey::AnalyticInterval.as_str(), interval.as_str())
        .await?;
    Ok(())
}

/// Store the default currency pair together with its interval
pub async fn set_currency_defaults(
    pool: &MySqlPool,
    discord_id: u64,
    symbol: Symbol,
    interval: Interval,
) -> Result<(), PreferenceError> {
    db::preferences::set_preference(pool, discord_id, PreferenceKey::CurrencySymbol.as_str(), symbol.as_str()).await?;
    db::preferences::set_preference(pool, discord_id, PreferenceKey::CurrencyInterval.as_str(), interval.as_str())
        .await?;
    Ok(())
}

/// Random alphanumeric acceptance code
pub fn generate_disclaimer_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(DISCLAIMER_CODE_LEN)
        .map(char::from)
        .collect()
}

/// Record acceptance and return the stored code
pub async fn accept_disclaimer(pool: &MySqlPool, discord_id: u64) -> Result<String, PreferenceError> {
    let code = generate_disclaimer_code();
    db::preferences::set_preference(pool, discord_id, PreferenceKey::DisclaimerAccepted.as_str(), "true").await?;
    db::preferences::set_preference(pool, discord_id, PreferenceKey::DisclaimerCode.as_str(), &code).await?;
    info!("User {} accepted the risk disclaimer", discord_id);
    Ok(code)
}

pub fn require_disclaimer(prefs: &UserPreferences) -> Result<(), PreferenceError> {
    if prefs.disclaimer_accepted {
        Ok(())
    } else {
        Err(PreferenceError::DisclaimerRequired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disclaimer_code_shape() {
        let code = generate_disclaimer_code();
        assert_eq!(code.len(), DISCLAIMER_CODE_LEN);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(code, generate_disclaimer_code());
    }

    #[test]
    fn test_disclaimer_gate() {
        let mut prefs = UserPreferences::default();
        assert!(matches!(require_disclaimer(&prefs), Err(PreferenceError::DisclaimerRequired)));
        prefs.disclaimer_accepted = true;
        assert!(require_disclaimer(&prefs).is_ok());
    }
}
