use std::sync::Arc;

use serenity::builder::{CreateEmbed, CreateEmbedFooter, CreateMessage};
use serenity::model::channel::Message;
use serenity::model::id::ChannelId;
use serenity::prelude::Context;
use tracing::{debug, warn};

use super::{compare, IntervalDefault};
use crate::models::{Market, PriceField};
use crate::services::chart_service::DEFAULT_COMPARISON_POINTS;
use crate::services::watch_service::WatchRegistry;

async fn registry(ctx: &Context) -> Result<Arc<WatchRegistry<ChannelId>>, String> {
    let data = ctx.data.read().await;
    data.get::<crate::ChannelWatches>()
        .cloned()
        .ok_or("Watch registry not initialized".to_string())
}

fn failure_message(market: Market, error: &str) -> CreateMessage {
    CreateMessage::default().embed(
        CreateEmbed::default()
            .title(format!("⚠️ {} refresh failed", market))
            .description(error)
            .color(0xff0000),
    )
}

/// `$watch [market] [interval]`, `$watch status` or `$watch stop`
pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    let watches = registry(ctx).await?;
    let channel = msg.channel_id;

    match args.first().map(|a| a.to_lowercase()).as_deref() {
        Some("stop") => {
            let embed = if watches.stop(&channel) {
                CreateEmbed::default()
                    .title("⏹️ Watch Stopped")
                    .description("Periodic refresh for this channel is off.")
                    .color(0x95a5a6)
            } else {
                CreateEmbed::default()
                    .title("No Active Watch")
                    .description("Nothing is being refreshed in this channel.")
                    .color(0x95a5a6)
            };
            return super::send_embed(ctx, msg, embed).await;
        }
        Some("status") => {
            let description = watches
                .describe(&channel)
                .map_or("Nothing is being refreshed in this channel.".to_string(), |label| {
                    format!("Refreshing **{}** in this channel.", label)
                });
            let embed = CreateEmbed::default()
                .title("👀 Watch Status")
                .description(description)
                .footer(CreateEmbedFooter::new(format!(
                    "{} watch(es) running across all channels",
                    watches.active_count()
                )))
                .color(0x3498db);
            return super::send_embed(ctx, msg, embed).await;
        }
        _ => {}
    }

    let deps = super::deps(ctx).await?;
    let prefs = super::gated_prefs(&deps, msg).await?;
    let (market, interval, rest) = super::parse_target(args, Some(Market::Gold), &prefs, IntervalDefault::Analytic)?;
    if !rest.is_empty() {
        return Err("❌ Usage: `$watch [gold|pair] [interval]`, `$watch status` or `$watch stop`".to_string());
    }

    let period = deps.config.refresh_interval;
    let label = format!("{} {}", market, interval);
    let http = Arc::clone(&ctx.http);

    let generation = watches.start(channel, label.clone(), period, move |guard| {
        let http = Arc::clone(&http);
        let deps = deps.clone();
        async move {
            let message = match compare::comparison_message(
                &deps,
                market,
                interval,
                PriceField::Close,
                DEFAULT_COMPARISON_POINTS,
            )
            .await
            {
                Ok(message) => message,
                Err(e) => {
                    warn!("Watch refresh for {} in {} failed: {}", market, guard.key(), e);
                    failure_message(market, &e)
                }
            };

            if !guard.is_current() {
                debug!("Dropping stale refresh (generation {}) for {}", guard.generation(), guard.key());
                return;
            }

            if let Err(e) = guard.key().send_message(&*http, message).await {
                warn!("Failed to post watch refresh to {}: {}", guard.key(), e);
            }
        }
    });

    tracing::info!("User {} started watch #{} on {} for {}", msg.author.id, generation, channel, label);

    let embed = CreateEmbed::default()
        .title("👀 Watch Started")
        .description(format!(
            "Posting **{}** actual vs predicted close every {} minute(s). Use `$watch stop` to end it.",
            label,
            period.as_secs() / 60
        ))
        .color(0x3498db);
    super::send_embed(ctx, msg, embed).await
}
