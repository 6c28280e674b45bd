//! Gemini client adapter over the `generateContent` REST API.

use std::fmt;

use log::{debug, error};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};
use tokio::sync::{Mutex, RwLock};

use crate::config::Config;
use crate::error::{BotError, Result};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Oldest session turns are dropped beyond this bound so a long-lived
/// conversation cannot grow its context (and request cost) without limit.
const MAX_HISTORY_MESSAGES: usize = 40;

/// Appended to the configured system instruction so the model answers with a
/// bare JSON object matching the response schema.
const JSON_REPLY_DIRECTIVE: &str =
    "Reply with only a JSON object that strictly follows the provided schema, \
     with no extra text or formatting.";

/// Gemini model identifiers the bot can be switched between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, VariantNames, Display)]
#[strum(ascii_case_insensitive)]
pub enum GeminiModel {
    #[strum(serialize = "gemini-2.5-flash-lite")]
    Flash25Lite,
    #[strum(serialize = "gemini-2.5-flash")]
    Flash25,
    #[strum(serialize = "gemini-2.5-pro")]
    Pro25,
}

/// Why the model stopped generating.
///
/// Anything other than `Stop` is treated as a failed completion; the raw
/// vendor string is preserved for reasons we do not recognize.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Timeout,
    Safety,
    Unrecognized(String),
}

impl From<String> for FinishReason {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "STOP" => FinishReason::Stop,
            "MAX_TOKENS" => FinishReason::MaxTokens,
            "TIMEOUT" => FinishReason::Timeout,
            "SAFETY" => FinishReason::Safety,
            _ => FinishReason::Unrecognized(raw),
        }
    }
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinishReason::Stop => write!(f, "normal stop"),
            FinishReason::MaxTokens => write!(f, "output token limit reached"),
            FinishReason::Timeout => write!(f, "timed out"),
            FinishReason::Safety => write!(f, "blocked by safety filters"),
            FinishReason::Unrecognized(raw) => write!(f, "unrecognized finish reason: {raw}"),
        }
    }
}

/// Role of a conversation turn in the Gemini wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentRole {
    User,
    Model,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// One conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub role: ContentRole,
    pub parts: Vec<Part>,
}

impl Content {
    fn user(text: &str) -> Self {
        Self {
            role: ContentRole::User,
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }

    fn model(text: &str) -> Self {
        Self {
            role: ContentRole::Model,
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    top_k: u32,
    top_p: f32,
    temperature: f32,
    stop_sequences: Vec<String>,
    seed: i64,
    response_mime_type: String,
    response_schema: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: &'a [Content],
    system_instruction: SystemInstruction,
    generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<FinishReason>,
}

/// Shape the model is asked to answer with.
#[derive(Debug, Deserialize)]
struct StructuredReply {
    result: String,
}

fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "result": { "type": "STRING" }
        },
        "required": ["result"]
    })
}

/// Sampling and instruction settings for a generation request.
///
/// Held behind a lock in the client and swapped whole by the command
/// handlers, so an in-flight request keeps the settings it started with.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub model: GeminiModel,
    pub system_instruction: String,
    pub max_output_tokens: u32,
    pub top_k: u32,
    pub top_p: f32,
    pub temperature: f32,
    pub stop_sequences: Vec<String>,
    pub seed: i64,
}

impl GenerationSettings {
    fn from_config(config: &Config) -> Self {
        Self {
            model: config.model,
            system_instruction: config.system_instruction.clone(),
            max_output_tokens: config.max_output_tokens,
            top_k: config.top_k,
            top_p: config.top_p,
            temperature: config.temperature,
            stop_sequences: config.stop_sequences.clone(),
            seed: config.seed,
        }
    }

    fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            max_output_tokens: self.max_output_tokens,
            top_k: self.top_k,
            top_p: self.top_p,
            temperature: self.temperature,
            stop_sequences: self.stop_sequences.clone(),
            seed: self.seed,
            response_mime_type: "application/json".to_string(),
            response_schema: response_schema(),
        }
    }
}

/// Client for the Gemini API holding a long-lived conversation session.
pub struct GeminiClient {
    api_key: String,
    client: reqwest::Client,
    settings: RwLock<GenerationSettings>,
    history: Mutex<Vec<Content>>,
}

impl GeminiClient {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            api_key: config.gemini_api_key.clone(),
            client: reqwest::Client::new(),
            settings: RwLock::new(GenerationSettings::from_config(config)),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Send one message in the ongoing conversation and return the reply.
    ///
    /// The session history is only extended once the request succeeds, so a
    /// failed call leaves the conversation untouched. The history lock is
    /// held for the duration of the call, which serializes concurrent sends
    /// into a consistent turn order.
    pub async fn send_message(&self, message: &str) -> Result<String> {
        let settings = self.settings.read().await.clone();
        let mut history = self.history.lock().await;

        let mut contents = history.clone();
        contents.push(Content::user(message));

        let reply = self.generate(&contents, &settings).await?;

        history.push(Content::user(message));
        history.push(Content::model(&reply));
        let excess = history.len().saturating_sub(MAX_HISTORY_MESSAGES);
        if excess > 0 {
            debug!("Dropping {excess} oldest session turns");
            history.drain(..excess);
        }

        Ok(reply)
    }

    /// One-shot generation outside the conversation session.
    pub async fn generate_content(&self, prompt: &str) -> Result<String> {
        let settings = self.settings.read().await.clone();
        self.generate(&[Content::user(prompt)], &settings).await
    }

    pub async fn model(&self) -> GeminiModel {
        self.settings.read().await.model
    }

    pub async fn set_model(&self, model: GeminiModel) {
        self.settings.write().await.model = model;
    }

    pub async fn system_instruction(&self) -> String {
        self.settings.read().await.system_instruction.clone()
    }

    pub async fn set_system_instruction(&self, instruction: String) {
        self.settings.write().await.system_instruction = instruction;
    }

    async fn generate(&self, contents: &[Content], settings: &GenerationSettings) -> Result<String> {
        debug!(
            "Sending request to Gemini API with {} turns (model: {})",
            contents.len(),
            settings.model
        );

        let request = GenerateContentRequest {
            contents,
            system_instruction: SystemInstruction {
                parts: vec![Part {
                    text: format!("{}\n{JSON_REPLY_DIRECTIVE}", settings.system_instruction),
                }],
            },
            generation_config: settings.generation_config(),
        };

        let url = format!("{GEMINI_API_BASE}/{}:generateContent", settings.model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Failed to read error response: {e}"));
            return Err(BotError::GeminiApi { status, message });
        }

        let api_response: GenerateContentResponse = response.json().await?;

        let candidate = api_response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| BotError::GeminiResponse("No candidates in response".to_string()))?;

        let finish_reason = candidate.finish_reason.ok_or_else(|| {
            BotError::GeminiResponse("Candidate missing finish reason".to_string())
        })?;
        ensure_completed(finish_reason)?;

        let raw_text = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .iter()
                    .map(|part| part.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default();

        debug!("Received response from Gemini API");
        Ok(extract_reply(raw_text))
    }
}

/// Gate a completion on its finish reason; only a normal stop is a success.
fn ensure_completed(reason: FinishReason) -> Result<()> {
    if reason == FinishReason::Stop {
        Ok(())
    } else {
        error!("Unexpected finish reason: {reason}");
        Err(BotError::Completion(reason))
    }
}

/// Pull the `result` field out of a structured reply, falling back to the
/// raw candidate text when the model ignored the schema.
fn extract_reply(raw_text: String) -> String {
    match serde_json::from_str::<StructuredReply>(&raw_text) {
        Ok(parsed) => parsed.result,
        Err(_) => raw_text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_reason_is_success() {
        assert!(ensure_completed(FinishReason::Stop).is_ok());
    }

    #[test]
    fn max_tokens_reason_is_an_error() {
        let result = ensure_completed(FinishReason::MaxTokens);
        assert!(matches!(
            result,
            Err(BotError::Completion(FinishReason::MaxTokens))
        ));
    }

    #[test]
    fn timeout_reason_is_an_error() {
        let result = ensure_completed(FinishReason::Timeout);
        assert!(matches!(
            result,
            Err(BotError::Completion(FinishReason::Timeout))
        ));
    }

    #[test]
    fn raw_reason_strings_map_to_variants() {
        assert_eq!(FinishReason::from("STOP".to_string()), FinishReason::Stop);
        assert_eq!(
            FinishReason::from("MAX_TOKENS".to_string()),
            FinishReason::MaxTokens
        );
        assert_eq!(
            FinishReason::from("SAFETY".to_string()),
            FinishReason::Safety
        );
        assert_eq!(
            FinishReason::from("RECITATION".to_string()),
            FinishReason::Unrecognized("RECITATION".to_string())
        );
    }

    #[test]
    fn finish_reason_deserializes_from_response_json() {
        let candidate: Candidate = serde_json::from_str(
            r#"{"content": {"role": "model", "parts": [{"text": "hi"}]}, "finishReason": "MAX_TOKENS"}"#,
        )
        .expect("candidate should deserialize");
        assert_eq!(candidate.finish_reason, Some(FinishReason::MaxTokens));
    }

    #[test]
    fn structured_reply_is_unwrapped() {
        let text = r#"{"result": "4"}"#.to_string();
        assert_eq!(extract_reply(text), "4");
    }

    #[test]
    fn plain_text_reply_falls_back_to_raw() {
        let text = "just plain text".to_string();
        assert_eq!(extract_reply(text), "just plain text");
    }

    #[test]
    fn model_ids_parse_case_insensitively() {
        let model: GeminiModel = "GEMINI-2.5-PRO".parse().expect("model should parse");
        assert_eq!(model, GeminiModel::Pro25);
        assert_eq!(model.to_string(), "gemini-2.5-pro");
    }

    #[test]
    fn unknown_model_id_is_rejected() {
        assert!("gemini-1.0-ultra".parse::<GeminiModel>().is_err());
    }

    #[test]
    fn variants_list_all_model_ids() {
        assert_eq!(
            GeminiModel::VARIANTS,
            [
                "gemini-2.5-flash-lite",
                "gemini-2.5-flash",
                "gemini-2.5-pro"
            ]
        );
    }
}
