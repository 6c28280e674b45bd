//! Poise commands for the model and system-instruction settings.

use strum::VariantNames;

use crate::bot::Data;
use crate::error::{BotError, Result};
use crate::gemini::GeminiModel;

/// Context type for settings commands.
type Context<'a> = poise::Context<'a, Data, BotError>;

/// Show the model currently answering questions.
#[poise::command(slash_command, prefix_command)]
pub async fn show_model(ctx: Context<'_>) -> Result<()> {
    let model = ctx.data().gemini().model().await;
    ctx.say(format!(
        "Current model: **{model}**\nAvailable models: {}",
        GeminiModel::VARIANTS.join(", ")
    ))
    .await?;
    Ok(())
}

/// Switch to a different model.
#[poise::command(slash_command, prefix_command)]
pub async fn set_model(
    ctx: Context<'_>,
    #[description = "Model identifier to switch to"] model: String,
) -> Result<()> {
    match model.parse::<GeminiModel>() {
        Ok(model) => {
            ctx.data().gemini().set_model(model).await;
            ctx.say(format!("Model set to **{model}**")).await?;
        }
        Err(_) => {
            ctx.say(format!(
                "Unknown model `{model}`. Available models: {}",
                GeminiModel::VARIANTS.join(", ")
            ))
            .await?;
        }
    }
    Ok(())
}

/// Show the current system instruction.
#[poise::command(slash_command, prefix_command)]
pub async fn show_system_instruction(ctx: Context<'_>) -> Result<()> {
    let instruction = ctx.data().gemini().system_instruction().await;
    ctx.say(format!("Current system instruction: {instruction}"))
        .await?;
    Ok(())
}

/// Replace the system instruction.
#[poise::command(slash_command, prefix_command)]
pub async fn set_system_instruction(
    ctx: Context<'_>,
    #[description = "New system instruction"]
    #[rest]
    instruction: String,
) -> Result<()> {
    ctx.data().gemini().set_system_instruction(instruction).await;
    ctx.say("System instruction updated").await?;
    Ok(())
}

/// All settings commands.
#[must_use]
pub fn commands() -> Vec<poise::Command<Data, BotError>> {
    vec![
        show_model(),
        set_model(),
        show_system_instruction(),
        set_system_instruction(),
    ]
}
