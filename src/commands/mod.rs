pub mod compare;
pub mod defaults;
pub mod deviation;
pub mod disclaimer;
pub mod forecast;
pub mod fx;
pub mod gold;
pub mod help;
pub mod history;
pub mod plan;
pub mod range;
pub mod watch;

use std::sync::Arc;

use serenity::builder::{CreateAttachment, CreateEmbed, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;
use sqlx::mysql::MySqlPool;
use tracing::{debug, warn};

use crate::api::PredictionClient;
use crate::config::AppConfig;
use crate::models::{ChartIntent, Interval, Market, UserPreferences};
use crate::services::normalizer::Normalizer;
use crate::services::{preference_service, render_service};
use crate::utils::check_cooldown;

/// Handles shared by every market command
#[derive(Clone)]
pub struct Deps {
    pub pool: MySqlPool,
    pub client: Arc<PredictionClient>,
    pub config: Arc<AppConfig>,
}

impl Deps {
    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.config.source_zone)
    }
}

pub async fn deps(ctx: &Context) -> Result<Deps, String> {
    let data = ctx.data.read().await;
    Ok(Deps {
        pool: data
            .get::<crate::DatabasePool>()
            .ok_or("Database not initialized".to_string())?
            .clone(),
        client: data
            .get::<crate::PredictionApi>()
            .ok_or("Prediction client not initialized".to_string())?
            .clone(),
        config: data
            .get::<crate::Settings>()
            .ok_or("Configuration not loaded".to_string())?
            .clone(),
    })
}

pub async fn load_prefs(deps: &Deps, msg: &Message) -> Result<UserPreferences, String> {
    preference_service::load_preferences(&deps.pool, msg.author.id.get())
        .await
        .map_err(|e| e.to_string())
}

/// Preferences of a user who has accepted the risk disclaimer
pub async fn gated_prefs(deps: &Deps, msg: &Message) -> Result<UserPreferences, String> {
    let prefs = load_prefs(deps, msg).await?;
    preference_service::require_disclaimer(&prefs).map_err(|e| e.to_string())?;
    Ok(prefs)
}

/// Which stored default interval applies when none is given
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalDefault {
    /// Per-market default (gold or currency)
    Market,
    /// Analytic views (comparison, deviation, watch)
    Analytic,
}

pub fn default_interval(prefs: &UserPreferences, market: Market, which: IntervalDefault) -> Interval {
    match (which, market) {
        (IntervalDefault::Analytic, _) => prefs.analytic_interval,
        (IntervalDefault::Market, Market::Gold) => prefs.gold_interval,
        (IntervalDefault::Market, Market::Currency(_)) => prefs.currency_interval,
    }
}

/// Consume optional leading `[market] [interval]` arguments.
///
/// Returns the chosen market and interval plus the remaining arguments.
pub fn parse_target<'a, 'b>(
    args: &'a [&'b str],
    default_market: Option<Market>,
    prefs: &UserPreferences,
    which: IntervalDefault,
) -> Result<(Market, Interval, &'a [&'b str]), String> {
    let mut rest = args;

    let market = match rest.first().and_then(|a| a.parse::<Market>().ok()) {
        Some(m) => {
            rest = &rest[1..];
            m
        }
        None => default_market.ok_or_else(|| {
            "❌ Choose a market: `gold` or a currency pair (EURUSD, GBPUSD, USDJPY)".to_string()
        })?,
    };

    let interval = match rest.first().and_then(|a| a.parse::<Interval>().ok()) {
        Some(i) => {
            rest = &rest[1..];
            i
        }
        None => default_interval(prefs, market, which),
    };

    Ok((market, interval, rest))
}

/// Render a chart off the async runtime and wrap it as an attachment
pub async fn chart_attachment(
    intent: ChartIntent,
    config: &AppConfig,
    filename: String,
) -> Result<CreateAttachment, String> {
    let (width, height) = (config.chart_width, config.chart_height);
    let png = tokio::task::spawn_blocking(move || render_service::render_png(&intent, width, height))
        .await
        .map_err(|e| format!("Chart task failed: {}", e))?
        .map_err(|e| format!("❌ {}", e))?;

    debug!("Attaching {} ({} bytes)", filename, png.len());
    Ok(CreateAttachment::bytes(png, filename))
}

/// Embed plus chart image as one message
pub async fn chart_message(
    embed: CreateEmbed,
    intent: ChartIntent,
    config: &AppConfig,
    filename: String,
) -> Result<CreateMessage, String> {
    let attachment = chart_attachment(intent, config, filename.clone()).await?;
    Ok(CreateMessage::default()
        .embed(embed.image(format!("attachment://{}", filename)))
        .add_file(attachment))
}

/// File-name-safe tag for a market/interval pair
pub fn file_tag(market: Market, interval: Interval) -> String {
    let market = match market {
        Market::Gold => "xauusd".to_string(),
        Market::Currency(symbol) => symbol.display_name().replace('/', "").to_lowercase(),
    };
    format!("{}_{}", market, interval.as_str())
}

pub async fn send(ctx: &Context, msg: &Message, message: CreateMessage) -> Result<(), String> {
    msg.channel_id
        .send_message(ctx, message)
        .await
        .map_err(|e| e.to_string())?;
    Ok(())
}

pub async fn send_embed(ctx: &Context, msg: &Message, embed: CreateEmbed) -> Result<(), String> {
    send(ctx, msg, CreateMessage::default().embed(embed)).await
}

pub async fn typing(ctx: &Context, msg: &Message) {
    if let Err(e) = msg.channel_id.broadcast_typing(ctx.http.as_ref()).await {
        warn!("Failed to broadcast typing: {}", e);
    }
}

fn is_command(command: &str) -> bool {
    matches!(
        command,
        "$gold"
            | "$fx"
            | "$compare"
            | "$deviation"
            | "$dev"
            | "$plan"
            | "$range"
            | "$defaults"
            | "$disclaimer"
            | "$watch"
            | "$help"
            | "$history"
    )
}

pub async fn handle_message(ctx: &Context, msg: &Message) {
    if msg.author.bot {
        return;
    }

    let parts: Vec<&str> = msg.content.split_whitespace().collect();
    let Some((&command, args)) = parts.split_first() else {
        return;
    };
    let command = command.to_lowercase();
    if !is_command(&command) {
        return;
    }

    if let Err(remaining) = check_cooldown(msg.author.id).await {
        let _ = msg
            .channel_id
            .send_message(
                ctx,
                CreateMessage::default().embed(
                    CreateEmbed::default()
                        .title("Command Cooldown")
                        .description(format!(
                            "⏳ Please wait {} seconds before using another command.",
                            remaining
                        ))
                        .color(0xffa500),
                ),
            )
            .await;
        return;
    }

    let result = match command.as_str() {
        "$gold" => gold::execute(ctx, msg, args).await,
        "$fx" => fx::execute(ctx, msg, args).await,
        "$compare" => compare::execute(ctx, msg, args).await,
        "$deviation" | "$dev" => deviation::execute(ctx, msg, args).await,
        "$plan" => plan::execute(ctx, msg, args).await,
        "$range" => range::execute(ctx, msg, args).await,
        "$defaults" => defaults::execute(ctx, msg, args).await,
        "$disclaimer" => disclaimer::execute(ctx, msg, args).await,
        "$watch" => watch::execute(ctx, msg, args).await,
        "$help" => help::execute(ctx, msg).await,
        "$history" => history::execute(ctx, msg, args).await,
        _ => return,
    };

    if let Err(e) = result {
        warn!("Error executing command {}: {}", command, e);

        let user_message = if e.contains("429") || e.contains("rate limit") {
            "⚠️ **Rate Limited**: Discord is rate limiting us. Please try again in a moment.".to_string()
        } else if e.trim().is_empty() {
            "❌ An error occurred while executing the command.".to_string()
        } else if e.starts_with('❌') || e.starts_with('⚠') {
            e
        } else {
            format!("❌ {}", e)
        };

        let embed = CreateEmbed::default()
            .title("Command Error")
            .description(user_message)
            .color(0xff0000);

        let _ = msg
            .channel_id
            .send_message(ctx, CreateMessage::default().embed(embed))
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Symbol;

    #[test]
    fn test_parse_target_defaults() {
        let prefs = UserPreferences {
            gold_interval: Interval::FourHours,
            analytic_interval: Interval::OneDay,
            ..UserPreferences::default()
        };

        let (market, interval, rest) =
            parse_target(&[], Some(Market::Gold), &prefs, IntervalDefault::Market).unwrap();
        assert_eq!((market, interval), (Market::Gold, Interval::FourHours));
        assert!(rest.is_empty());

        let (_, interval, _) = parse_target(&[], Some(Market::Gold), &prefs, IntervalDefault::Analytic).unwrap();
        assert_eq!(interval, Interval::OneDay);
    }

    #[test]
    fn test_parse_target_explicit_values() {
        let prefs = UserPreferences::default();
        let args = ["gbpusd", "15m", "2034.5", "2036"];
        let (market, interval, rest) = parse_target(&args, None, &prefs, IntervalDefault::Market).unwrap();
        assert_eq!(market, Market::Currency(Symbol::GbpUsd));
        assert_eq!(interval, Interval::FifteenMinutes);
        assert_eq!(rest, &["2034.5", "2036"]);

        let args = ["2034.5"];
        assert!(parse_target(&args, None, &prefs, IntervalDefault::Market).is_err());
        let (_, interval, rest) = parse_target(&args, Some(Market::Gold), &prefs, IntervalDefault::Market).unwrap();
        assert_eq!(interval, Interval::OneHour);
        assert_eq!(rest, &["2034.5"]);
    }

    #[test]
    fn test_file_tag() {
        assert_eq!(file_tag(Market::Gold, Interval::OneWeek), "xauusd_1wk");
        assert_eq!(file_tag(Market::Currency(Symbol::UsdJpy), Interval::OneHour), "usdjpy_1h");
        assert!(is_command("$dev") && !is_command("$ping"));
        assert!(is_command("$history"));
    }
}
