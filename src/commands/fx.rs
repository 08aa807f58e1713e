use serenity::model::channel::Message;
use serenity::prelude::Context;

use super::{forecast, IntervalDefault};
use crate::models::{Interval, Market};

/// `$fx [pair] [interval]` or `$fx chart [pair] [interval]`; the pair defaults to the saved one
pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    let deps = super::deps(ctx).await?;
    let prefs = super::gated_prefs(&deps, msg).await?;

    let (chart, args) = match args.first() {
        Some(a) if a.eq_ignore_ascii_case("chart") => (true, &args[1..]),
        _ => (false, args),
    };

    let default_market = Market::Currency(prefs.currency_symbol);
    let (market, interval, rest) = super::parse_target(args, Some(default_market), &prefs, IntervalDefault::Market)?;
    if market == Market::Gold {
        return Err("❌ Use `$gold` for XAUUSD predictions.".to_string());
    }
    if let Some(extra) = rest.first() {
        return Err(format!(
            "❌ Could not read '{}'. Usage: `$fx [chart] [EURUSD|GBPUSD|USDJPY] [interval]`\nIntervals: {}",
            extra,
            Interval::supported_list()
        ));
    }

    forecast::execute(ctx, msg, &deps, market, interval, chart).await
}
