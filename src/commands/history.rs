//! Actual price history: candlestick chart plus the latest OHLC rows

use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use super::{Deps, IntervalDefault};
use crate::models::{Interval, Market, PricePoint};
use crate::services::chart_service::{self, DEFAULT_HISTORY_CANDLES};
use crate::services::prediction_service;
use crate::utils::format::price;
use crate::utils::Table;

const TABLE_ROWS: usize = 5;

/// Most recent candles first
pub fn history_table(market: Market, interval: Interval, history: &[PricePoint]) -> String {
    let decimals = market.price_decimals();
    let time_format = chart_service::tooltip_format(interval.class());

    let mut table = Table::new(vec!["Date (UTC)", "Open", "High", "Low", "Close"]).numeric();
    for p in history.iter().rev().take(TABLE_ROWS) {
        table.add_row([
            p.timestamp.format(time_format).to_string(),
            price(Some(p.open), decimals),
            price(Some(p.high), decimals),
            price(Some(p.low), decimals),
            price(Some(p.close), decimals),
        ]);
    }
    table.render()
}

pub async fn history_message(deps: &Deps, market: Market, interval: Interval) -> Result<CreateMessage, String> {
    let history = prediction_service::fetch_history(&deps.client, &deps.normalizer(), market, interval).await?;
    if history.is_empty() {
        return Err(format!("❌ No data available for {} ({})", market, interval));
    }

    let intent = chart_service::history_chart(market, interval, &history, DEFAULT_HISTORY_CANDLES);
    let embed = CreateEmbed::default()
        .title(format!("🕯️ {} Actual Price ({})", market, interval.description()))
        .description(history_table(market, interval, &history))
        .field("Candles", history.len().to_string(), true)
        .field("Charted", history.len().min(DEFAULT_HISTORY_CANDLES).to_string(), true)
        .color(0x2ecc71);

    let filename = format!("history_{}.png", super::file_tag(market, interval));
    super::chart_message(embed, intent, &deps.config, filename).await
}

/// `$history [market] [interval]`
pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    let deps = super::deps(ctx).await?;
    let prefs = super::gated_prefs(&deps, msg).await?;

    let (market, interval, rest) = super::parse_target(args, Some(Market::Gold), &prefs, IntervalDefault::Market)?;
    if let Some(extra) = rest.first() {
        return Err(format!("❌ Unknown interval: '{}'. Supported: {}", extra, Interval::supported_list()));
    }

    tracing::info!("History requested by {} for {} {}", msg.author.id, market, interval);
    super::typing(ctx, msg).await;

    let message = history_message(&deps, market, interval).await?;
    super::send(ctx, msg, message).await
}
