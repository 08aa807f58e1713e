use serenity::builder::{CreateEmbed, CreateEmbedFooter};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::models::Interval;
use crate::utils::ratelimit::COOLDOWN_SECONDS;

fn uptime_text(started: Option<std::time::Instant>) -> String {
    match started {
        Some(start) => {
            let secs = start.elapsed().as_secs();
            format!("Up {}h {}m", secs / 3600, (secs % 3600) / 60)
        }
        None => "Uptime unknown".to_string(),
    }
}

pub async fn execute(ctx: &Context, msg: &Message) -> Result<(), String> {
    let started = {
        let data = ctx.data.read().await;
        data.get::<crate::BotData>().copied()
    };

    let embed = CreateEmbed::default()
        .title("📖 fxcast Commands Help")
        .description("Gold (XAUUSD) and currency (EUR/USD, GBP/USD, USD/JPY) price predictions.\nMarket commands require `$disclaimer accept` first.")
        .color(0x00b0f4)
        .field(
            "🎯 General",
            "`$help` - Show this help message\n`$disclaimer [accept]` - Read or accept the risk disclaimer",
            false,
        )
        .field(
            "📈 Predictions",
            "`$gold [interval]` - Gold prediction table\n`$gold chart [interval]` - Predicted candlesticks\n`$fx [pair] [interval]` - Currency prediction table\n`$fx chart [pair] [interval]` - Predicted candlesticks\n`$history [market] [interval]` - Actual price candlesticks and latest rows",
            false,
        )
        .field(
            "📊 Analytics",
            "`$compare [market] [interval] [points] [field]` - Actual vs predicted chart\n`$deviation [market] [interval] [field]` - Deviation summary and chart\n`$watch [market] [interval]` / `$watch status` / `$watch stop` - Periodic refresh in this channel",
            false,
        )
        .field(
            "🧮 Calculators",
            "`$plan [market] [interval] <open> <current> [pip]` - Levels from predicted candles\n`$range <high> <low> <close>` - Trade-day range levels",
            false,
        )
        .field(
            "⚙️ Defaults",
            "`$defaults` - Show saved defaults\n`$defaults gold <interval>`\n`$defaults fx <pair> <interval>`\n`$defaults analytic <interval>`",
            false,
        )
        .field(
            "ℹ️ Notes",
            format!(
                "Intervals: {}\nFields: open, high, low, close\n{}-second cooldown between commands",
                Interval::supported_list(),
                COOLDOWN_SECONDS
            ),
            false,
        )
        .footer(CreateEmbedFooter::new(uptime_text(started)));

    msg.channel_id
        .send_message(ctx, serenity::builder::CreateMessage::default().embed(embed))
        .await
        .map_err(|e| format!("Failed to send help message: {}", e))?;

    Ok(())
}
