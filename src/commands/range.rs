use serenity::builder::{CreateEmbed, CreateEmbedFooter};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::models::RangePlan;
use crate::services::trade_service;
use crate::utils::format::{parse_number, price};
use crate::utils::Table;

pub fn range_table(plan: &RangePlan) -> String {
    let mut table = Table::new(vec!["Side", "Entry", "Take Profit", "Stop Loss"]).numeric();
    match &plan.levels {
        Some((buy, sell)) => {
            for levels in [buy, sell] {
                table.add_row([
                    levels.side.label().to_string(),
                    price(Some(levels.entry), 2),
                    price(Some(levels.take_profit), 2),
                    price(Some(levels.stop_loss), 2),
                ]);
            }
        }
        None => {
            for side in ["Buy", "Sell"] {
                table.add_row([side, "not trade", "not trade", "not trade"]);
            }
        }
    }
    table.render()
}

/// `$range <high> <low> <close>`
pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    let [high, low, close] = args else {
        return Err("❌ Usage: `$range <high> <low> <close>`".to_string());
    };
    let high = parse_number(high, "high")?;
    let low = parse_number(low, "low")?;
    let close = parse_number(close, "close")?;
    if high < low {
        return Err("❌ High must be greater than or equal to low".to_string());
    }

    let deps = super::deps(ctx).await?;
    super::gated_prefs(&deps, msg).await?;

    let params = &deps.config.trade;
    let plan = trade_service::range_plan(high, low, close, params);
    tracing::info!("Range plan for {}: spread {:.2}, trade day {}", msg.author.id, plan.spread, plan.trade_day);

    let (verdict, color) = if plan.trade_day {
        ("✅ Trade day", 0x2ecc71)
    } else {
        ("🚫 Not a trade day", 0xe74c3c)
    };

    let embed = CreateEmbed::default()
        .title("📐 Range Trade Levels")
        .description(range_table(&plan))
        .field("Spread (High − Low)", price(Some(plan.spread), 2), true)
        .field("Threshold", price(Some(params.trade_day_threshold), 2), true)
        .field("Verdict", verdict, true)
        .footer(CreateEmbedFooter::new("Levels are offsets from the last close. Not financial advice."))
        .color(color);

    super::send_embed(ctx, msg, embed).await
}
