use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::id::ChannelId;
use serenity::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use sqlx::mysql::MySqlPool;
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

mod api;
mod commands;
mod config;
mod db;
mod models;
mod services;
mod utils;

use api::PredictionClient;
use config::AppConfig;
use services::watch_service::WatchRegistry;

struct Handler;

struct BotData;

impl TypeMapKey for BotData {
    type Value = Instant;
}

struct DatabasePool;

impl TypeMapKey for DatabasePool {
    type Value = MySqlPool;
}

struct PredictionApi;

impl TypeMapKey for PredictionApi {
    type Value = Arc<PredictionClient>;
}

struct Settings;

impl TypeMapKey for Settings {
    type Value = Arc<AppConfig>;
}

struct ChannelWatches;

impl TypeMapKey for ChannelWatches {
    type Value = Arc<WatchRegistry<ChannelId>>;
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        commands::handle_message(&ctx, &msg).await;
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("{} is connected to {} guild(s)", ready.user.name, ready.guilds.len());
    }
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fxcast=debug,serenity=warn")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("📈 Starting fxcast v{}...", env!("CARGO_PKG_VERSION"));

    let config = match AppConfig::from_env() {
        Ok(c) => Arc::new(c),
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };
    let client = match PredictionClient::new(&config.api_base_url, config.api_timeout) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            error!("Failed to create prediction client: {}", e);
            return;
        }
    };
    info!(
        "Prediction API at {} (timeout {:?}), refresh every {:?}, {}",
        client.base_url(),
        config.api_timeout,
        config.refresh_interval,
        config.join_policy.describe()
    );

    info!("Initializing database...");
    let pool = match db::init_db(&config.database_url).await {
        Ok(p) => {
            info!("Database initialized successfully");
            p
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return;
        }
    };

    let intents = GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MESSAGES;

    let mut discord = match Client::builder(&config.discord_token, intents)
        .event_handler(Handler)
        .await
    {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to create client: {}", e);
            return;
        }
    };

    {
        let mut data = discord.data.write().await;
        data.insert::<BotData>(Instant::now());
        data.insert::<DatabasePool>(pool);
        data.insert::<PredictionApi>(client);
        data.insert::<Settings>(Arc::clone(&config));
        data.insert::<ChannelWatches>(Arc::new(WatchRegistry::new()));
    }

    if let Err(e) = discord.start().await {
        error!("Client error: {}", e);
    }
}
