//! Provider selection and client construction.

use log::info;
use strum::{Display, EnumString, VariantNames};

use crate::config::Config;
use crate::error::{BotError, Result};
use crate::gemini::GeminiClient;

/// Hosted model providers the bot knows about.
///
/// Only [`Provider::Google`] has a client today; the others are reserved
/// selectors that fail construction with an explicit error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, VariantNames, Display)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum Provider {
    Google,
    OpenAi,
    Azure,
    Anthropic,
}

/// Build the AI client for the selected provider.
pub fn create_client(provider: Provider, config: &Config) -> Result<GeminiClient> {
    match provider {
        Provider::Google => {
            info!("Using Google Gemini provider");
            Ok(GeminiClient::new(config))
        }
        Provider::OpenAi | Provider::Azure | Provider::Anthropic => {
            Err(BotError::UnsupportedProvider(provider))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names_parse_case_insensitively() {
        assert_eq!("google".parse::<Provider>().ok(), Some(Provider::Google));
        assert_eq!("OpenAI".parse::<Provider>().ok(), Some(Provider::OpenAi));
        assert!("mistral".parse::<Provider>().is_err());
    }

    #[test]
    fn unimplemented_providers_are_explicit_errors() {
        let config = test_config();
        for provider in [Provider::OpenAi, Provider::Azure, Provider::Anthropic] {
            let result = create_client(provider, &config);
            assert!(matches!(
                result,
                Err(BotError::UnsupportedProvider(p)) if p == provider
            ));
        }
    }

    #[test]
    fn google_provider_builds_a_client() {
        let config = test_config();
        assert!(create_client(Provider::Google, &config).is_ok());
    }

    fn test_config() -> Config {
        Config {
            discord_token: "token".to_string(),
            gemini_api_key: "key".to_string(),
            provider: Provider::Google,
            model: crate::gemini::GeminiModel::Flash25Lite,
            system_instruction: "Answer briefly.".to_string(),
            max_output_tokens: 100,
            top_k: 2,
            top_p: 0.5,
            temperature: 0.5,
            stop_sequences: vec!["\n".to_string()],
            seed: 1,
        }
    }
}
