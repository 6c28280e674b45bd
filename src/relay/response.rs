//! Reply sending for the relay pipeline.

use log::info;
use poise::serenity_prelude::{Context, Mentionable, Message as SerenityMessage};

use crate::chunk::chunk_content;
use crate::error::Result;

/// Discord's message limit for standard users.
const MESSAGE_CHUNK_SIZE: usize = 2000;

/// Ask the author for an actual question after a contentless mention.
pub async fn send_prompt_for_question(ctx: &Context, new_message: &SerenityMessage) -> Result<()> {
    let reply = format!(
        "Hello {}! You mentioned me, but didn't give me a question to answer.",
        new_message.author.mention()
    );
    new_message.reply(&ctx.http, reply).await?;

    info!(
        "Prompted {} in channel {} for a question",
        new_message.author.tag(),
        new_message.channel_id
    );
    Ok(())
}

/// Send `reply` as one message per 2000-character chunk, in order.
pub async fn send_chunked_reply(
    ctx: &Context,
    new_message: &SerenityMessage,
    reply: &str,
) -> Result<()> {
    let chunks = chunk_content(reply, MESSAGE_CHUNK_SIZE)?;
    let count = chunks.len();

    for chunk in chunks {
        new_message.reply(&ctx.http, chunk).await?;
    }

    info!(
        "Replied to {} in channel {} with {count} message(s)",
        new_message.author.tag(),
        new_message.channel_id
    );
    Ok(())
}
