//! Trade-planning models

/// Constants used by both trade-planning calculators.
///
/// None of these has a documented derivation; they are the values the
/// dashboard shipped with and can be overridden from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeParams {
    /// Added below the adjusted low (buy) or above the adjusted high (sell)
    pub stop_loss_buffer: f64,
    /// Added to the current price before measuring the profit distance
    pub profit_target_offset: f64,
    pub pip_multiplier: f64,
    /// Maximum high − low spread still considered a trade day
    pub trade_day_threshold: f64,
    pub buy_entry_offset: f64,
    pub buy_take_profit_offset: f64,
    pub buy_stop_loss_offset: f64,
    pub sell_entry_offset: f64,
    pub sell_entry_adjust: f64,
    pub sell_take_profit_offset: f64,
    pub sell_stop_loss_offset: f64,
}

impl Default for TradeParams {
    fn default() -> Self {
        Self {
            stop_loss_buffer: 5.0,
            profit_target_offset: 1.0,
            pip_multiplier: 100.0,
            trade_day_threshold: 19.0,
            buy_entry_offset: 10.0,
            buy_take_profit_offset: 20.0,
            buy_stop_loss_offset: 19.0,
            sell_entry_offset: 10.0,
            sell_entry_adjust: 1.0,
            sell_take_profit_offset: 19.0,
            sell_stop_loss_offset: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn label(&self) -> &'static str {
        match self {
            TradeSide::Buy => "Buy",
            TradeSide::Sell => "Sell",
        }
    }
}

/// Entry, take-profit and stop-loss for one side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeLevels {
    pub side: TradeSide,
    pub entry: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
}

/// User inputs for the prediction-based calculator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanInputs {
    pub open_price: f64,
    pub current_price: f64,
    pub pip: f64,
}

/// Buy and sell plan derived from one predicted candle
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionPlan {
    pub label: String,
    pub buy: TradeLevels,
    pub sell: TradeLevels,
    pub profit_pips: f64,
}

/// Result of the high/low range calculator
#[derive(Debug, Clone, PartialEq)]
pub struct RangePlan {
    pub spread: f64,
    /// True when the spread is within the trade-day threshold
    pub trade_day: bool,
    /// Present only on trade days
    pub levels: Option<(TradeLevels, TradeLevels)>,
}
