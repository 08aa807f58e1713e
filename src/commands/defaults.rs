use serenity::builder::CreateEmbed;
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::models::{Interval, Symbol, UserPreferences};
use crate::services::preference_service;

/// Requested change to the stored defaults
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultsAction {
    Show,
    Gold(Interval),
    Fx(Symbol, Interval),
    Analytic(Interval),
}

const USAGE: &str = "❌ Usage: `$defaults [show | gold <interval> | fx <pair> <interval> | analytic <interval>]`";

pub fn parse_action(args: &[&str]) -> Result<DefaultsAction, String> {
    let Some((sub, rest)) = args.split_first() else {
        return Ok(DefaultsAction::Show);
    };

    match (sub.to_lowercase().as_str(), rest) {
        ("show", []) => Ok(DefaultsAction::Show),
        ("gold", [interval]) => Ok(DefaultsAction::Gold(interval.parse()?)),
        ("fx", [symbol, interval]) => Ok(DefaultsAction::Fx(symbol.parse()?, interval.parse()?)),
        ("analytic", [interval]) => Ok(DefaultsAction::Analytic(interval.parse()?)),
        _ => Err(USAGE.to_string()),
    }
}

pub fn defaults_embed(prefs: &UserPreferences) -> CreateEmbed {
    CreateEmbed::default()
        .title("⚙️ Your Defaults")
        .field("Gold Interval", prefs.gold_interval.description(), true)
        .field(
            "Currency",
            format!("{} ({})", prefs.currency_symbol.display_name(), prefs.currency_interval.description()),
            true,
        )
        .field("Analytic Interval", prefs.analytic_interval.description(), true)
        .field(
            "Risk Disclaimer",
            if prefs.disclaimer_accepted { "Accepted" } else { "Not accepted" },
            true,
        )
        .color(0x95a5a6)
}

/// `$defaults [show | gold <i> | fx <pair> <i> | analytic <i>]`
pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    let action = parse_action(args)?;
    let deps = super::deps(ctx).await?;
    let user = msg.author.id.get();

    let result = match action {
        DefaultsAction::Show => Ok(()),
        DefaultsAction::Gold(interval) => preference_service::set_gold_interval(&deps.pool, user, interval).await,
        DefaultsAction::Fx(symbol, interval) => {
            preference_service::set_currency_defaults(&deps.pool, user, symbol, interval).await
        }
        DefaultsAction::Analytic(interval) => {
            preference_service::set_analytic_interval(&deps.pool, user, interval).await
        }
    };
    result.map_err(|e| e.to_string())?;

    if action != DefaultsAction::Show {
        tracing::info!("User {} updated defaults: {:?}", user, action);
    }

    let prefs = super::load_prefs(&deps, msg).await?;
    super::send_embed(ctx, msg, defaults_embed(&prefs)).await
}
