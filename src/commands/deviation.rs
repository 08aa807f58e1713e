use serenity::builder::{CreateEmbed, CreateEmbedFooter, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use super::IntervalDefault;
use crate::models::{DeviationReport, Market, PriceField};
use crate::services::chart_service::{self, DEFAULT_DEVIATION_BARS};
use crate::services::deviation_service::format_percent;
use crate::services::prediction_service;
use crate::utils::format::{price, signed};
use crate::utils::Table;

pub fn report_table(report: &DeviationReport, decimals: usize) -> String {
    let mut table = Table::new(vec!["Field", "Matches", "Mean |Dev|", "Mean |%|", "Latest Dev", "Latest %"]).numeric();

    for f in &report.fields {
        let latest = f.latest();
        table.add_row([
            f.field.label().to_string(),
            f.matches().to_string(),
            price(f.mean_abs_deviation, decimals),
            f.mean_abs_percent.map_or("n/a".to_string(), |p| format!("{:.2}%", p)),
            latest.map_or("n/a".to_string(), |r| signed(r.deviation, decimals)),
            latest.map_or("n/a".to_string(), |r| format_percent(r.deviation_percent)),
        ]);
    }

    table.render()
}

/// `$deviation [market] [interval] [field]`
pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    let deps = super::deps(ctx).await?;
    let prefs = super::gated_prefs(&deps, msg).await?;

    let (market, interval, rest) = super::parse_target(args, Some(Market::Gold), &prefs, IntervalDefault::Analytic)?;
    let field = match rest.first() {
        Some(f) => PriceField::parse(f)?,
        None => PriceField::Close,
    };

    tracing::info!("Deviation requested by {} for {} {} ({})", msg.author.id, market, interval, field);
    super::typing(ctx, msg).await;

    let (_, report) = prediction_service::fetch_deviation_report(
        &deps.client,
        &deps.normalizer(),
        market,
        interval,
        deps.config.join_policy,
    )
    .await?;

    let decimals = market.price_decimals();
    let embed = CreateEmbed::default()
        .title(format!("📉 {} Prediction Deviation ({})", market, interval.description()))
        .description(format!(
            "Deviation = actual − predicted, percentage relative to actual.\n{}",
            report_table(&report, decimals)
        ))
        .footer(CreateEmbedFooter::new(format!("Join: {}", report.policy.describe())))
        .color(0x9b59b6);

    let selected = report
        .field(field)
        .filter(|f| f.matches() > 0);

    let message = match selected {
        Some(field_deviation) => {
            let intent = chart_service::deviation_chart(market, interval, field_deviation, DEFAULT_DEVIATION_BARS);
            let filename = format!(
                "deviation_{}_{}.png",
                super::file_tag(market, interval),
                field.label().to_lowercase()
            );
            super::chart_message(embed, intent, &deps.config, filename).await?
        }
        None => CreateMessage::default().embed(embed.field(
            "Chart",
            format!("No matching actual/predicted {} timestamps to chart.", field),
            false,
        )),
    };

    super::send(ctx, msg, message).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JoinPolicy, PricePoint};
    use crate::services::deviation_service::build_report;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_report_table() {
        let t = Utc.with_ymd_and_hms(2025, 4, 5, 10, 0, 0).unwrap();
        let point = |v: f64| PricePoint { timestamp: t, open: v, high: v, low: v, close: v };
        let report = build_report(&[point(10.0)], &[point(9.0)], JoinPolicy::Exact);

        let table = report_table(&report, 2);
        assert!(table.contains("Close"));
        assert!(table.contains("+1.00"));
        assert!(table.contains("+10.00%"));
        assert!(table.contains("10.00%"));

        let empty = build_report(&[], &[], JoinPolicy::Exact);
        assert!(report_table(&empty, 2).contains("n/a"));
    }
}
