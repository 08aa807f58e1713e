//! Trade-planning calculators

use crate::models::{PlanInputs, PredictionPlan, PredictionPoint, RangePlan, TradeLevels, TradeParams, TradeSide};

/// Buy/sell levels for one predicted candle, shifted onto the user's open price
pub fn plan_from_prediction(
    prediction: &PredictionPoint,
    inputs: PlanInputs,
    params: &TradeParams,
) -> PredictionPlan {
    let predicted = &prediction.price;
    let shift = inputs.open_price - predicted.open;
    let adjusted_high = predicted.high + shift;
    let adjusted_low = predicted.low + shift;

    let buy = TradeLevels {
        side: TradeSide::Buy,
        entry: inputs.current_price,
        take_profit: adjusted_high,
        stop_loss: adjusted_low - params.stop_loss_buffer,
    };
    let sell = TradeLevels {
        side: TradeSide::Sell,
        entry: inputs.current_price,
        take_profit: adjusted_low,
        stop_loss: adjusted_high + params.stop_loss_buffer,
    };

    // Both sides report the distance to the adjusted high
    let profit_pips = (adjusted_high - (inputs.current_price + params.profit_target_offset)).abs()
        * params.pip_multiplier
        * inputs.pip;

    let label = prediction
        .formatted
        .clone()
        .unwrap_or_else(|| predicted.timestamp.format("%Y-%m-%d %H:%M").to_string());

    PredictionPlan { label, buy, sell, profit_pips }
}

/// Levels from the last candle's high, low and close
pub fn range_plan(high: f64, low: f64, close: f64, params: &TradeParams) -> RangePlan {
    let spread = high - low;
    let trade_day = spread <= params.trade_day_threshold;

    let levels = trade_day.then(|| {
        let buy = TradeLevels {
            side: TradeSide::Buy,
            entry: close + params.buy_entry_offset,
            take_profit: close + params.buy_take_profit_offset,
            stop_loss: close - params.buy_stop_loss_offset,
        };
        let sell = TradeLevels {
            side: TradeSide::Sell,
            entry: close - params.sell_entry_offset + params.sell_entry_adjust,
            take_profit: close - params.sell_take_profit_offset,
            stop_loss: close + params.sell_stop_loss_offset,
        };
        (buy, sell)
    });

    RangePlan { spread, trade_day, levels }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PricePoint;
    use chrono::{TimeZone, Utc};

    fn prediction(open: f64, high: f64, low: f64) -> PredictionPoint {
        PredictionPoint {
            price: PricePoint {
                timestamp: Utc.with_ymd_and_hms(2025, 4, 5, 14, 0, 0).unwrap(),
                open,
                high,
                low,
                close: open,
            },
            confidence: None,
            change: 0.0,
            range: high - low,
            formatted: None,
        }
    }

    #[test]
    fn test_prediction_plan_shifts_levels() {
        let params = TradeParams::default();
        let inputs = PlanInputs { open_price: 2010.0, current_price: 2012.0, pip: 0.1 };
        let plan = plan_from_prediction(&prediction(2000.0, 2030.0, 1990.0), inputs, &params);

        assert_eq!(plan.buy.entry, 2012.0);
        assert_eq!(plan.buy.take_profit, 2040.0);
        assert_eq!(plan.buy.stop_loss, 1995.0);
        assert_eq!(plan.sell.entry, 2012.0);
        assert_eq!(plan.sell.take_profit, 2000.0);
        assert_eq!(plan.sell.stop_loss, 2045.0);
        // |2040 - 2013| * 100 * 0.1
        assert!((plan.profit_pips - 270.0).abs() < 1e-9);
        assert_eq!(plan.label, "2025-04-05 14:00");
    }

    #[test]
    fn test_prediction_plan_uses_formatted_label() {
        let mut row = prediction(1.0, 1.2, 0.9);
        row.formatted = Some("Apr 05, 2:00 PM".to_string());
        let inputs = PlanInputs { open_price: 1.0, current_price: 1.0, pip: 1.0 };
        let plan = plan_from_prediction(&row, inputs, &TradeParams::default());
        assert_eq!(plan.label, "Apr 05, 2:00 PM");
    }

    #[test]
    fn test_range_plan_trade_day_flag() {
        let params = TradeParams::default();
        assert!(!range_plan(25.0, 5.0, 10.0, &params).trade_day);
        assert!(range_plan(20.0, 5.0, 10.0, &params).trade_day);
        // the threshold itself still counts
        assert!(range_plan(24.0, 5.0, 10.0, &params).trade_day);
    }

    #[test]
    fn test_range_plan_levels() {
        let plan = range_plan(2020.0, 2005.0, 2010.0, &TradeParams::default());
        let (buy, sell) = plan.levels.unwrap();
        assert_eq!(plan.spread, 15.0);
        assert_eq!((buy.entry, buy.take_profit, buy.stop_loss), (2020.0, 2030.0, 1991.0));
        assert_eq!((sell.entry, sell.take_profit, sell.stop_loss), (2001.0, 1991.0, 2030.0));
    }

    #[test]
    fn test_range_plan_not_trade_has_no_levels() {
        let plan = range_plan(2040.0, 2000.0, 2010.0, &TradeParams::default());
        assert!(!plan.trade_day);
        assert!(plan.levels.is_none());
    }

    #[test]
    fn test_custom_threshold() {
        let params = TradeParams { trade_day_threshold: 50.0, ..TradeParams::default() };
        assert!(range_plan(2040.0, 2000.0, 2010.0, &params).trade_day);
    }
}
