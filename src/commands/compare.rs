use serenity::builder::{CreateEmbed, CreateEmbedFooter, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use super::{Deps, IntervalDefault};
use crate::models::{ComparisonData, Interval, Market, PriceField};
use crate::services::chart_service::{self, DEFAULT_COMPARISON_POINTS};
use crate::services::{deviation_service, prediction_service};
use crate::utils::format::price;

/// Optional trailing `[points] [field]`, in either order
pub fn parse_options(rest: &[&str]) -> Result<(usize, PriceField), String> {
    let mut points = None;
    let mut field = None;

    for arg in rest {
        if let Ok(n) = arg.parse::<usize>() {
            points = Some(n);
        } else {
            field = Some(PriceField::parse(arg)?);
        }
    }

    Ok((
        chart_service::lookback_points(points, DEFAULT_COMPARISON_POINTS),
        field.unwrap_or(PriceField::Close),
    ))
}

fn latest_value(series: &[crate::models::PricePoint], field: PriceField, decimals: usize) -> String {
    price(series.last().map(|p| p.value(field)), decimals)
}

pub fn comparison_embed(
    market: Market,
    interval: Interval,
    field: PriceField,
    data: &ComparisonData,
    deps: &Deps,
) -> CreateEmbed {
    let decimals = market.price_decimals();
    let records = deviation_service::compute_deviations(&data.actual, &data.predicted, field, deps.config.join_policy);
    let mean_abs = (!records.is_empty())
        .then(|| records.iter().map(|r| r.deviation.abs()).sum::<f64>() / records.len() as f64);

    CreateEmbed::default()
        .title(format!("📊 {} Actual vs Predicted {} ({})", market, field, interval.description()))
        .field("Actual Points", data.actual.len().to_string(), true)
        .field("Predicted Points", data.predicted.len().to_string(), true)
        .field("Matched", records.len().to_string(), true)
        .field(format!("Latest Actual {}", field), latest_value(&data.actual, field, decimals), true)
        .field(format!("Latest Predicted {}", field), latest_value(&data.predicted, field, decimals), true)
        .field("Mean |Deviation|", price(mean_abs, decimals), true)
        .footer(CreateEmbedFooter::new(format!("Join: {}", deps.config.join_policy.describe())))
        .color(0x3498db)
}

/// Fetch both series and build the chart message; also used by `$watch`
pub async fn comparison_message(
    deps: &Deps,
    market: Market,
    interval: Interval,
    field: PriceField,
    points: usize,
) -> Result<CreateMessage, String> {
    let data = prediction_service::fetch_comparison(&deps.client, &deps.normalizer(), market, interval).await?;
    if data.is_empty() {
        return Err(format!("❌ No price data available for {} ({})", market, interval));
    }

    let intent = chart_service::comparison_chart(market, interval, field, &data, points);
    let embed = comparison_embed(market, interval, field, &data, deps);
    let filename = format!("compare_{}_{}.png", super::file_tag(market, interval), field.label().to_lowercase());

    super::chart_message(embed, intent, &deps.config, filename).await
}

/// `$compare [market] [interval] [points] [field]`
pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    let deps = super::deps(ctx).await?;
    let prefs = super::gated_prefs(&deps, msg).await?;

    let (market, interval, rest) = super::parse_target(args, Some(Market::Gold), &prefs, IntervalDefault::Analytic)?;
    let (points, field) = parse_options(rest)?;

    tracing::info!(
        "Comparison requested by {} for {} {} ({} points, {})",
        msg.author.id,
        market,
        interval,
        points,
        field
    );
    super::typing(ctx, msg).await;

    let message = comparison_message(&deps, market, interval, field, points).await?;
    super::send(ctx, msg, message).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options() {
        assert_eq!(parse_options(&[]).unwrap(), (DEFAULT_COMPARISON_POINTS, PriceField::Close));
        assert_eq!(parse_options(&["high", "50"]).unwrap(), (50, PriceField::High));
        assert_eq!(parse_options(&["0"]).unwrap(), (1, PriceField::Close));
        assert!(parse_options(&["volume"]).is_err());
    }
}
