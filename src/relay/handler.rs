//! Main handler for messages addressed to the bot.

use log::{debug, error, info};
use poise::serenity_prelude::{Context, Message as SerenityMessage};

use crate::bot::Data;
use crate::error::Result;

use super::engagement::{classify, strip_bot_mention};
use super::response::{send_chunked_reply, send_prompt_for_question};

/// Relay one inbound message: decide engagement, dispatch to the AI client,
/// and reply. Messages that do not engage the bot are ignored; poise handles
/// command dispatch for them independently.
pub async fn handle_message(
    ctx: &Context,
    new_message: &SerenityMessage,
    data: &Data,
) -> Result<()> {
    let bot_user_id = ctx.cache.current_user().id;

    // The bot's own replies also arrive as message events
    if new_message.author.id == bot_user_id {
        return Ok(());
    }

    let replied_to_bot = new_message
        .referenced_message
        .as_deref()
        .is_some_and(|replied| replied.author.id == bot_user_id);
    let mentions_bot = new_message.mentions_user_id(bot_user_id);

    let Some(engagement) = classify(replied_to_bot, mentions_bot) else {
        return Ok(());
    };

    info!(
        "Received {} from {} in channel {}: {}",
        engagement.describe(),
        new_message.author.tag(),
        new_message.channel_id,
        new_message.content
    );

    if let Err(e) = new_message.channel_id.broadcast_typing(&ctx.http).await {
        debug!("Failed to broadcast typing indicator: {e}");
    }

    let content = strip_bot_mention(&new_message.content, bot_user_id);
    if content.is_empty() {
        return send_prompt_for_question(ctx, new_message).await;
    }

    match data.gemini().send_message(&content).await {
        Ok(reply) => send_chunked_reply(ctx, new_message, &reply).await?,
        Err(e) => {
            error!(
                "Error processing message from {}: {e}",
                new_message.author.tag()
            );
            new_message.reply(&ctx.http, e.user_message()).await?;
        }
    }

    Ok(())
}
