//! Prediction table and candlestick chart, shared by `$gold` and `$fx`

use serenity::builder::{CreateEmbed, CreateEmbedFooter, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use super::Deps;
use crate::models::{Interval, Market, PredictionResult};
use crate::services::{chart_service, prediction_service};
use crate::utils::format::{price, signed};
use crate::utils::Table;

/// Rows shown before the table is cut off (embed description limit)
const MAX_TABLE_ROWS: usize = 24;

pub fn prediction_table(result: &PredictionResult) -> String {
    let decimals = result.market.price_decimals();
    let time_format = chart_service::tooltip_format(result.interval.class());

    let mut table = Table::new(vec!["Time (UTC)", "Open", "High", "Low", "Close", "Chg %", "Conf"]).numeric();
    for p in result.predictions.iter().take(MAX_TABLE_ROWS) {
        table.add_row([
            p.price.timestamp.format(time_format).to_string(),
            price(Some(p.price.open), decimals),
            price(Some(p.price.high), decimals),
            price(Some(p.price.low), decimals),
            price(Some(p.price.close), decimals),
            signed(p.change_percent(), 2),
            p.confidence.map_or("-".to_string(), |c| format!("{:.0}%", c)),
        ]);
    }

    let mut rendered = table.render();
    let hidden = result.predictions.len().saturating_sub(MAX_TABLE_ROWS);
    if hidden > 0 {
        rendered.push_str(&format!("\n…and {} more row(s). Use the chart view to see all.", hidden));
    }
    rendered
}

pub fn prediction_embed(result: &PredictionResult) -> CreateEmbed {
    let decimals = result.market.price_decimals();
    let s = &result.summary;

    CreateEmbed::default()
        .title(format!("📈 {} Prediction ({})", result.market, result.interval.description()))
        .description(format!("{}\n{}", result.message, prediction_table(result)))
        .field("Last Close", price(s.last_close, decimals), true)
        .field("Avg Predicted Close", price(s.avg_predicted_close, decimals), true)
        .field("Avg Range", price(s.avg_range, decimals), true)
        .field("Predicted High", price(s.high_predicted, decimals), true)
        .field("Predicted Low", price(s.low_predicted, decimals), true)
        .field("Last H / L", format!("{} / {}", price(s.last_high, decimals), price(s.last_low, decimals)), true)
        .footer(CreateEmbedFooter::new("Predictions are not financial advice."))
        .color(0xf1c40f)
}

/// Table view of a fresh prediction run
pub async fn table_message(deps: &Deps, market: Market, interval: Interval) -> Result<CreateMessage, String> {
    let result = prediction_service::run_prediction(&deps.client, &deps.normalizer(), market, interval).await?;
    Ok(CreateMessage::default().embed(prediction_embed(&result)))
}

/// Candlestick view of a fresh prediction run
pub async fn chart_message(deps: &Deps, market: Market, interval: Interval) -> Result<CreateMessage, String> {
    let result = prediction_service::run_prediction(&deps.client, &deps.normalizer(), market, interval).await?;
    let intent = chart_service::prediction_chart(&result);

    let embed = CreateEmbed::default()
        .title(format!("🕯️ {} Predicted OHLC ({})", result.market, result.interval.description()))
        .description(&result.message)
        .field("Candles", result.predictions.len().to_string(), true)
        .field("Avg Predicted Close", price(result.summary.avg_predicted_close, market.price_decimals()), true)
        .color(0xf1c40f);

    let filename = format!("prediction_{}.png", super::file_tag(market, interval));
    super::chart_message(embed, intent, &deps.config, filename).await
}

pub async fn execute(
    ctx: &Context,
    msg: &Message,
    deps: &Deps,
    market: Market,
    interval: Interval,
    chart: bool,
) -> Result<(), String> {
    tracing::info!(
        "Prediction {} requested by {} for {} {}",
        if chart { "chart" } else { "table" },
        msg.author.id,
        market,
        interval
    );
    super::typing(ctx, msg).await;

    let message = if chart {
        chart_message(deps, market, interval).await?
    } else {
        table_message(deps, market, interval).await?
    };
    super::send(ctx, msg, message).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PredictionPoint, PredictionSummary, PricePoint};
    use chrono::{Duration, TimeZone, Utc};

    fn result(rows: usize) -> PredictionResult {
        let base = Utc.with_ymd_and_hms(2025, 4, 5, 14, 0, 0).unwrap();
        PredictionResult {
            market: Market::Gold,
            interval: Interval::OneHour,
            predictions: (0..rows)
                .map(|i| PredictionPoint {
                    price: PricePoint {
                        timestamp: base + Duration::hours(i as i64),
                        open: 2000.0,
                        high: 2010.0,
                        low: 1995.0,
                        close: 2005.0,
                    },
                    confidence: Some(71.4),
                    change: 5.0,
                    range: 15.0,
                    formatted: None,
                })
                .collect(),
            summary: PredictionSummary::default(),
            message: "ok".to_string(),
        }
    }

    #[test]
    fn test_prediction_table_rows() {
        let table = prediction_table(&result(2));
        assert!(table.contains("Apr 05, 14:00"));
        assert!(table.contains("2005.00"));
        assert!(table.contains("+0.25"));
        assert!(table.contains("71%"));
        assert!(!table.contains("more row"));
    }

    #[test]
    fn test_prediction_table_is_truncated() {
        let table = prediction_table(&result(MAX_TABLE_ROWS + 3));
        assert!(table.contains("…and 3 more row(s)"));
    }
}
