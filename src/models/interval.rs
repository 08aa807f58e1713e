//! Interval, symbol and market selection models

use std::fmt;
use std::str::FromStr;

/// Sampling granularity of a price series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interval {
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    FourHours,
    OneDay,
    OneWeek,
}

/// Coarse interval class used for axis label formatting and tick density
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalClass {
    Minute,
    Hour,
    Day,
    Week,
}

impl Interval {
    pub const ALL: [Interval; 6] = [
        Interval::FifteenMinutes,
        Interval::ThirtyMinutes,
        Interval::OneHour,
        Interval::FourHours,
        Interval::OneDay,
        Interval::OneWeek,
    ];

    /// Label sent to the prediction API and stored in preferences
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::FifteenMinutes => "15m",
            Interval::ThirtyMinutes => "30m",
            Interval::OneHour => "1h",
            Interval::FourHours => "4h",
            Interval::OneDay => "1d",
            Interval::OneWeek => "1wk",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Interval::FifteenMinutes => "15 Minutes",
            Interval::ThirtyMinutes => "30 Minutes",
            Interval::OneHour => "1 Hour",
            Interval::FourHours => "4 Hours",
            Interval::OneDay => "1 Day",
            Interval::OneWeek => "1 Week",
        }
    }

    pub fn class(&self) -> IntervalClass {
        match self {
            Interval::FifteenMinutes | Interval::ThirtyMinutes => IntervalClass::Minute,
            Interval::OneHour | Interval::FourHours => IntervalClass::Hour,
            Interval::OneDay => IntervalClass::Day,
            Interval::OneWeek => IntervalClass::Week,
        }
    }

    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|i| i.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl IntervalClass {
    pub fn is_sub_daily(&self) -> bool {
        matches!(self, IntervalClass::Minute | IntervalClass::Hour)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "15m" | "15min" => Ok(Interval::FifteenMinutes),
            "30m" | "30min" => Ok(Interval::ThirtyMinutes),
            "1h" | "60m" => Ok(Interval::OneHour),
            "4h" => Ok(Interval::FourHours),
            "1d" | "1day" => Ok(Interval::OneDay),
            "1wk" | "1w" | "1week" => Ok(Interval::OneWeek),
            other => Err(format!(
                "❌ Unknown interval: '{}'. Supported: {}",
                other,
                Interval::supported_list()
            )),
        }
    }
}

/// Currency pairs served by the prediction backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    EurUsd,
    GbpUsd,
    UsdJpy,
}

impl Symbol {
    pub const ALL: [Symbol; 3] = [Symbol::EurUsd, Symbol::GbpUsd, Symbol::UsdJpy];

    /// Ticker as understood by the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            Symbol::EurUsd => "EURUSD=X",
            Symbol::GbpUsd => "GBPUSD=X",
            Symbol::UsdJpy => "JPY=X",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Symbol::EurUsd => "EUR/USD",
            Symbol::GbpUsd => "GBP/USD",
            Symbol::UsdJpy => "USD/JPY",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Symbol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned = s.trim().to_uppercase().replace('/', "");
        match cleaned.as_str() {
            "EURUSD=X" | "EURUSD" | "EUR" => Ok(Symbol::EurUsd),
            "GBPUSD=X" | "GBPUSD" | "GBP" => Ok(Symbol::GbpUsd),
            "JPY=X" | "USDJPY" | "JPY" => Ok(Symbol::UsdJpy),
            _ => Err(format!(
                "❌ Unknown symbol: '{}'. Supported: EUR/USD, GBP/USD, USD/JPY",
                s.trim()
            )),
        }
    }
}

/// Which endpoint family a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Market {
    Gold,
    Currency(Symbol),
}

impl Market {
    pub fn title(&self) -> String {
        match self {
            Market::Gold => "XAUUSD".to_string(),
            Market::Currency(symbol) => symbol.display_name().to_string(),
        }
    }

    /// Decimal places used when displaying prices for this market
    pub fn price_decimals(&self) -> usize {
        match self {
            Market::Gold => 2,
            Market::Currency(_) => 4,
        }
    }
}

impl FromStr for Market {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gold" | "xau" | "xauusd" => Ok(Market::Gold),
            _ => s
                .parse::<Symbol>()
                .map(Market::Currency)
                .map_err(|_| format!("❌ Unknown market: '{}'. Use `gold` or a currency pair (EUR/USD, GBP/USD, USD/JPY)", s.trim())),
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_aliases() {
        assert_eq!("15min".parse::<Interval>().unwrap(), Interval::FifteenMinutes);
        assert_eq!("1day".parse::<Interval>().unwrap(), Interval::OneDay);
        assert_eq!("1WK".parse::<Interval>().unwrap(), Interval::OneWeek);
        assert!("45m".parse::<Interval>().is_err());
    }

    #[test]
    fn test_interval_classes() {
        assert_eq!(Interval::FifteenMinutes.class(), IntervalClass::Minute);
        assert_eq!(Interval::FourHours.class(), IntervalClass::Hour);
        assert_eq!(Interval::OneDay.class(), IntervalClass::Day);
        assert_eq!(Interval::OneWeek.class(), IntervalClass::Week);
        assert!(Interval::OneHour.class().is_sub_daily());
        assert!(!Interval::OneWeek.class().is_sub_daily());
    }

    #[test]
    fn test_symbol_and_market_parsing() {
        assert_eq!("eur/usd".parse::<Symbol>().unwrap(), Symbol::EurUsd);
        assert_eq!("JPY=X".parse::<Symbol>().unwrap(), Symbol::UsdJpy);
        assert_eq!("gold".parse::<Market>().unwrap(), Market::Gold);
        assert_eq!(
            "GBPUSD".parse::<Market>().unwrap(),
            Market::Currency(Symbol::GbpUsd)
        );
        assert!("BTC".parse::<Market>().is_err());
    }
}
