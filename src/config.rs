use std::env;
use std::fmt::Display;
use std::str::FromStr;

use log::{debug, error, info};

use crate::error::{BotError, Result};
use crate::gemini::GeminiModel;
use crate::provider::Provider;

const DEFAULT_SYSTEM_INSTRUCTION: &str =
    "Answer questions accurately, keeping a professional and rigorous tone.";

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub gemini_api_key: String,
    pub provider: Provider,
    pub model: GeminiModel,
    pub system_instruction: String,
    pub max_output_tokens: u32,
    pub top_k: u32,
    pub top_p: f32,
    pub temperature: f32,
    pub stop_sequences: Vec<String>,
    pub seed: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        debug!("Loading configuration from environment");
        dotenvy::dotenv().ok();

        let discord_token = env::var("DISCORD_TOKEN").map_err(|e| {
            error!("Failed to load DISCORD_TOKEN from environment: {e}");
            e
        })?;

        let gemini_api_key = env::var("GEMINI_API_KEY").map_err(|e| {
            error!("Failed to load GEMINI_API_KEY from environment: {e}");
            e
        })?;

        let provider = env_or("AI_PROVIDER", Provider::Google)?;
        let model = env_or("GEMINI_MODEL", GeminiModel::Flash25Lite)?;
        let system_instruction = env::var("GEMINI_SYSTEM_INSTRUCTION")
            .unwrap_or_else(|_| DEFAULT_SYSTEM_INSTRUCTION.to_string());
        let max_output_tokens = env_or("GEMINI_MAX_OUTPUT_TOKENS", 5000)?;
        let top_k = env_or("GEMINI_TOP_K", 2)?;
        let top_p = env_or("GEMINI_TOP_P", 0.5)?;
        let temperature = env_or("GEMINI_TEMPERATURE", 0.5)?;
        let stop_sequences = env::var("GEMINI_STOP_SEQUENCES")
            .map(|raw| raw.split(',').map(str::to_string).collect())
            .unwrap_or_else(|_| vec!["\n".to_string()]);
        let seed = env_or("GEMINI_SEED", 1)?;

        info!("Configuration loaded successfully");
        debug!("Discord token length: {} characters", discord_token.len());
        debug!(
            "Gemini API key length: {} characters",
            gemini_api_key.len()
        );
        debug!("Provider: {provider}, model: {model}");
        debug!(
            "System instruction length: {} characters",
            system_instruction.len()
        );

        Ok(Self {
            discord_token,
            gemini_api_key,
            provider,
            model,
            system_instruction,
            max_output_tokens,
            top_k,
            top_p,
            temperature,
            stop_sequences,
            seed,
        })
    }
}

/// Reads an optional environment variable, falling back to `default` when
/// unset. A present but unparseable value is a configuration error.
fn env_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|e| {
            error!("Invalid value for {name}: {e}");
            BotError::Config(format!("invalid value for {name}: {e}"))
        }),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(e) => Err(e.into()),
    }
}
