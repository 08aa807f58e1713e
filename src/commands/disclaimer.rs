use serenity::builder::{CreateEmbed, CreateEmbedFooter};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::services::preference_service;

pub fn disclaimer_embed() -> CreateEmbed {
    CreateEmbed::default()
        .title("⚠️ Risk Disclaimer")
        .description(
            "**EDUCATIONAL ONLY: NOT INVESTMENT ADVICE**\n\n\
             Predictions are computer-generated estimates from historical data and \
             statistical models. They may be inaccurate. Do not trade based solely on them.\n\n\
             • Trading gold and currencies carries a high level of risk\n\
             • Past performance does not guarantee future results\n\
             • You are responsible for your own trading decisions",
        )
        .field("Accept", "Reply `$disclaimer accept` to unlock the market commands.", false)
        .color(0xe67e22)
}

/// `$disclaimer [accept]`
pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    match args.first().map(|a| a.to_lowercase()) {
        None => super::send_embed(ctx, msg, disclaimer_embed()).await,
        Some(sub) if sub == "accept" => {
            let deps = super::deps(ctx).await?;
            let prefs = super::load_prefs(&deps, msg).await?;
            if prefs.disclaimer_accepted {
                let embed = CreateEmbed::default()
                    .title("✅ Disclaimer Already Accepted")
                    .description(format!(
                        "Acceptance code: `{}`",
                        prefs.disclaimer_code.as_deref().unwrap_or("n/a")
                    ))
                    .color(0x2ecc71);
                return super::send_embed(ctx, msg, embed).await;
            }

            let code = preference_service::accept_disclaimer(&deps.pool, msg.author.id.get())
                .await
                .map_err(|e| e.to_string())?;

            let embed = CreateEmbed::default()
                .title("✅ Disclaimer Accepted")
                .description("Market commands are now available. See `$help`.")
                .footer(CreateEmbedFooter::new(format!("Acceptance code: {}", code)))
                .color(0x2ecc71);
            super::send_embed(ctx, msg, embed).await
        }
        Some(other) => Err(format!("❌ Unknown option '{}'. Usage: `$disclaimer [accept]`", other)),
    }
}
