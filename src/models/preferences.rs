//! Per-user preference models

use std::collections::HashMap;

use super::interval::{Interval, Symbol};

/// Storage keys for user preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceKey {
    CurrencySymbol,
    CurrencyInterval,
    GoldInterval,
    AnalyticInterval,
    DisclaimerAccepted,
    DisclaimerCode,
}

impl PreferenceKey {
    pub const ALL: [PreferenceKey; 6] = [
        PreferenceKey::CurrencySymbol,
        PreferenceKey::CurrencyInterval,
        PreferenceKey::GoldInterval,
        PreferenceKey::AnalyticInterval,
        PreferenceKey::DisclaimerAccepted,
        PreferenceKey::DisclaimerCode,
    ];

    // The analytic key keeps its historical spelling so existing values still load.
    pub fn as_str(&self) -> &'static str {
        match self {
            PreferenceKey::CurrencySymbol => "default-symbol",
            PreferenceKey::CurrencyInterval => "default-interval",
            PreferenceKey::GoldInterval => "fx-default-interval",
            PreferenceKey::AnalyticInterval => "gold_analytic_interval_defaul",
            PreferenceKey::DisclaimerAccepted => "riskDisclaimerAccepted",
            PreferenceKey::DisclaimerCode => "riskDisclaimerCode",
        }
    }

    pub fn from_storage(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == key)
    }
}

/// Typed view over the stored key/value preferences
#[derive(Debug, Clone, PartialEq)]
pub struct UserPreferences {
    pub currency_symbol: Symbol,
    pub currency_interval: Interval,
    pub gold_interval: Interval,
    pub analytic_interval: Interval,
    pub disclaimer_accepted: bool,
    pub disclaimer_code: Option<String>,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            currency_symbol: Symbol::EurUsd,
            currency_interval: Interval::OneHour,
            gold_interval: Interval::OneHour,
            analytic_interval: Interval::OneHour,
            disclaimer_accepted: false,
            disclaimer_code: None,
        }
    }
}

/// A stored value that did not match its enumeration and was replaced
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedPreference {
    pub key: PreferenceKey,
    pub value: String,
}

impl UserPreferences {
    /// Build preferences from raw stored pairs.
    ///
    /// Missing keys take their default. Values that fail validation are
    /// replaced by the default and reported back so the caller can log them.
    /// Unknown keys are ignored.
    pub fn from_entries<I, K, V>(entries: I) -> (Self, Vec<RejectedPreference>)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut prefs = Self::default();
        let mut rejected = Vec::new();

        for (key, value) in entries {
            let Some(key) = PreferenceKey::from_storage(key.as_ref()) else {
                continue;
            };
            let value = value.as_ref();
            let accepted = match key {
                PreferenceKey::CurrencySymbol => value
                    .parse::<Symbol>()
                    .map(|s| prefs.currency_symbol = s)
                    .is_ok(),
                PreferenceKey::CurrencyInterval => value
                    .parse::<Interval>()
                    .map(|i| prefs.currency_interval = i)
                    .is_ok(),
                PreferenceKey::GoldInterval => value
                    .parse::<Interval>()
                    .map(|i| prefs.gold_interval = i)
                    .is_ok(),
                PreferenceKey::AnalyticInterval => value
                    .parse::<Interval>()
                    .map(|i| prefs.analytic_interval = i)
                    .is_ok(),
                PreferenceKey::DisclaimerAccepted => match value.trim() {
                    "true" => {
                        prefs.disclaimer_accepted = true;
                        true
                    }
                    "false" => {
                        prefs.disclaimer_accepted = false;
                        true
                    }
                    _ => false,
                },
                PreferenceKey::DisclaimerCode => {
                    let code = value.trim();
                    if code.is_empty() {
                        false
                    } else {
                        prefs.disclaimer_code = Some(code.to_string());
                        true
                    }
                }
            };

            if !accepted {
                rejected.push(RejectedPreference {
                    key,
                    value: value.to_string(),
                });
            }
        }

        (prefs, rejected)
    }

    /// Canonical key/value pairs for storage
    pub fn to_entries(&self) -> HashMap<PreferenceKey, String> {
        let mut entries = HashMap::new();
        entries.insert(PreferenceKey::CurrencySymbol, self.currency_symbol.as_str().to_string());
        entries.insert(PreferenceKey::CurrencyInterval, self.currency_interval.as_str().to_string());
        entries.insert(PreferenceKey::GoldInterval, self.gold_interval.as_str().to_string());
        entries.insert(PreferenceKey::AnalyticInterval, self.analytic_interval.as_str().to_string());
        entries.insert(PreferenceKey::DisclaimerAccepted, self.disclaimer_accepted.to_string());
        if let Some(code) = &self.disclaimer_code {
            entries.insert(PreferenceKey::DisclaimerCode, code.clone());
        }
        entries
    }
}
