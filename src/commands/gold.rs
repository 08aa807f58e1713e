use serenity::model::channel::Message;
use serenity::prelude::Context;

use super::{forecast, IntervalDefault};
use crate::models::Market;

/// `$gold [interval]` or `$gold chart [interval]`
pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    let deps = super::deps(ctx).await?;
    let prefs = super::gated_prefs(&deps, msg).await?;

    let (chart, args) = match args.first() {
        Some(a) if a.eq_ignore_ascii_case("chart") => (true, &args[1..]),
        _ => (false, args),
    };

    let (market, interval, rest) = super::parse_target(args, Some(Market::Gold), &prefs, IntervalDefault::Market)?;
    if market != Market::Gold {
        return Err("❌ `$gold` only covers XAUUSD. Use `$fx <pair>` for currencies.".to_string());
    }
    if let Some(extra) = rest.first() {
        return Err(format!("❌ Unknown interval: '{}'. Supported: {}", extra, crate::models::Interval::supported_list()));
    }

    forecast::execute(ctx, msg, &deps, market, interval, chart).await
}
