use serenity::builder::{CreateEmbed, CreateEmbedFooter};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use super::IntervalDefault;
use crate::models::{Market, PlanInputs, PredictionPlan, TradeParams};
use crate::services::{prediction_service, trade_service};
use crate::utils::format::{parse_number, price};
use crate::utils::Table;

pub const DEFAULT_PIP: f64 = 0.01;
const MAX_PLANS: usize = 12;

const USAGE: &str = "❌ Usage: `$plan [gold|pair] [interval] <open price> <current price> [pip]`";

pub fn parse_inputs(rest: &[&str]) -> Result<PlanInputs, String> {
    match rest {
        [open, current] => Ok(PlanInputs {
            open_price: parse_number(open, "open price")?,
            current_price: parse_number(current, "current price")?,
            pip: DEFAULT_PIP,
        }),
        [open, current, pip] => Ok(PlanInputs {
            open_price: parse_number(open, "open price")?,
            current_price: parse_number(current, "current price")?,
            pip: parse_number(pip, "pip")?,
        }),
        _ => Err(USAGE.to_string()),
    }
}

pub fn plan_table(plans: &[PredictionPlan], decimals: usize) -> String {
    let mut table = Table::new(vec!["Candle", "Side", "Entry", "Take Profit", "Stop Loss", "Profit (pips)"]).numeric();
    for plan in plans {
        for levels in [&plan.buy, &plan.sell] {
            table.add_row([
                plan.label.clone(),
                levels.side.label().to_string(),
                price(Some(levels.entry), decimals),
                price(Some(levels.take_profit), decimals),
                price(Some(levels.stop_loss), decimals),
                format!("{:.2}", plan.profit_pips),
            ]);
        }
    }
    table.render()
}

/// `$plan [market] [interval] <open> <current> [pip]`
pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    let deps = super::deps(ctx).await?;
    let prefs = super::gated_prefs(&deps, msg).await?;

    let (market, interval, rest) = super::parse_target(args, Some(Market::Gold), &prefs, IntervalDefault::Market)?;
    let inputs = parse_inputs(rest)?;

    tracing::info!("Trade plan requested by {} for {} {}: {:?}", msg.author.id, market, interval, inputs);
    super::typing(ctx, msg).await;

    let result = prediction_service::run_prediction(&deps.client, &deps.normalizer(), market, interval).await?;
    let params: &TradeParams = &deps.config.trade;
    let plans: Vec<PredictionPlan> = result
        .predictions
        .iter()
        .take(MAX_PLANS)
        .map(|p| trade_service::plan_from_prediction(p, inputs, params))
        .collect();

    let decimals = market.price_decimals();
    let embed = CreateEmbed::default()
        .title(format!("🧮 {} Trade Plan ({})", market, interval.description()))
        .description(plan_table(&plans, decimals))
        .field("Open Price", price(Some(inputs.open_price), decimals), true)
        .field("Current Price", price(Some(inputs.current_price), decimals), true)
        .field("Pip", inputs.pip.to_string(), true)
        .footer(CreateEmbedFooter::new(format!(
            "Levels shift predicted candles onto your open price. Stop buffer {}. Not financial advice.",
            params.stop_loss_buffer
        )))
        .color(0x2ecc71);

    super::send_embed(ctx, msg, embed).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TradeLevels, TradeSide};

    #[test]
    fn test_parse_inputs() {
        let inputs = parse_inputs(&["2010", "2012"]).unwrap();
        assert_eq!(inputs.pip, DEFAULT_PIP);
        let inputs = parse_inputs(&["2010", "2012", "0.1"]).unwrap();
        assert_eq!(inputs.pip, 0.1);
        assert_eq!(parse_inputs(&["2010"]).unwrap_err(), USAGE);
        assert!(parse_inputs(&["x", "2012"]).is_err());
    }

    #[test]
    fn test_plan_table_lists_both_sides() {
        let levels = |side| TradeLevels { side, entry: 1.0, take_profit: 2.0, stop_loss: 0.5 };
        let plan = PredictionPlan {
            label: "Apr 05 14:00".to_string(),
            buy: levels(TradeSide::Buy),
            sell: levels(TradeSide::Sell),
            profit_pips: 12.5,
        };
        let table = plan_table(&[plan], 2);
        assert!(table.contains("Buy") && table.contains("Sell"));
        assert!(table.contains("12.50"));
    }
}
