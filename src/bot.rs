//! Discord bot wiring and event handling.

use log::{error, info, warn};
use poise::{
    Framework, FrameworkOptions, PrefixFrameworkOptions, builtins,
    serenity_prelude::{
        ChannelType, ClientBuilder, Context, FullEvent, GatewayIntents, GuildId,
    },
};

use crate::commands;
use crate::config::Config;
use crate::error::{BotError, Result};
use crate::gemini::GeminiClient;
use crate::provider;
use crate::relay;

/// Shared state available to commands and the event handler.
pub struct Data {
    gemini: GeminiClient,
}

impl Data {
    pub fn gemini(&self) -> &GeminiClient {
        &self.gemini
    }
}

/// Run the Discord bot.
pub async fn run() -> Result<()> {
    info!("Initializing bot");
    let config = Config::from_env()?;

    let gemini = provider::create_client(config.provider, &config)?;

    let intents = GatewayIntents::non_privileged()
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS;

    let discord_token = config.discord_token.clone();

    let framework = Framework::builder()
        .options(FrameworkOptions {
            commands: commands::commands(),
            prefix_options: PrefixFrameworkOptions {
                prefix: Some("!".to_string()),
                ..Default::default()
            },
            event_handler: |ctx, event, _framework, data| Box::pin(event_handler(ctx, event, data)),
            pre_command: |ctx| {
                Box::pin(async move {
                    info!(
                        "User {} invoked command {}",
                        ctx.author().tag(),
                        ctx.command().qualified_name
                    );
                })
            },
            post_command: |ctx| {
                Box::pin(async move {
                    info!("Command {} completed", ctx.command().qualified_name);
                })
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                info!("Bot is ready and connected to Discord");
                builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Commands registered successfully");
                Ok(Data { gemini })
            })
        })
        .build();

    let mut client = ClientBuilder::new(discord_token, intents)
        .framework(framework)
        .await?;

    info!("Starting Discord client");

    tokio::select! {
        result = client.start() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down...");
        }
    }

    Ok(())
}

async fn event_handler(ctx: &Context, event: &FullEvent, data: &Data) -> Result<()> {
    match event {
        FullEvent::Message { new_message } => relay::handle_message(ctx, new_message, data).await,
        FullEvent::CacheReady { guilds } => {
            announce_online(ctx, guilds).await;
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Post an online notice in the first text channel of each guild.
///
/// Channels the bot cannot see or post to are skipped with a warning.
async fn announce_online(ctx: &Context, guilds: &[GuildId]) {
    for guild_id in guilds {
        let channels = match guild_id.channels(&ctx.http).await {
            Ok(channels) => channels,
            Err(e) => {
                warn!("Failed to list channels for guild {guild_id}: {e}");
                continue;
            }
        };

        let mut text_channels: Vec<_> = channels
            .into_values()
            .filter(|channel| channel.kind == ChannelType::Text)
            .collect();
        text_channels.sort_by_key(|channel| channel.position);

        let Some(channel) = text_channels.first() else {
            continue;
        };

        match channel.id.say(&ctx.http, "I'm online!").await {
            Ok(_) => info!("Announced online in {} / {}", guild_id, channel.name),
            Err(e) => warn!(
                "Failed to announce in {} / {}: {e}",
                guild_id, channel.name
            ),
        }
    }
}

async fn on_error(error: poise::FrameworkError<'_, Data, BotError>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!(
                "Command {} failed: {error}",
                ctx.command().qualified_name
            );
            if let Err(e) = ctx.say(error.user_message()).await {
                error!("Failed to report command error: {e}");
            }
        }
        other => {
            if let Err(e) = builtins::on_error(other).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}
