//! OpenAI-compatible chat-completion client

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::AiSettings;
use crate::error::AiError;

/// Hosted providers, told apart by the API key prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Groq,
}

impl Provider {
    pub fn from_key(api_key: &str) -> Self {
        if api_key.starts_with("gsk_") {
            Provider::Groq
        } else {
            Provider::OpenAi
        }
    }

    pub fn base_url(&self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::Groq => "https://api.groq.com/openai/v1",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-4o-mini",
            Provider::Groq => "llama-3.1-8b-instant",
        }
    }
}

/// A single prompt/response exchange with a chat model
#[async_trait]
pub trait ChatCompletionClient: Send + Sync {
    /// Send an optional system prompt plus a user prompt; return the reply text
    async fn complete(&self, system: Option<&str>, prompt: &str) -> Result<String, AiError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// reqwest client for `/chat/completions`
#[derive(Clone, Debug)]
pub struct OpenAiCompatibleClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: SecretString,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiCompatibleClient {
    /// Build a client; provider defaults apply unless the settings override them
    pub fn new(api_key: SecretString, settings: &AiSettings) -> Result<Self, AiError> {
        let provider = Provider::from_key(api_key.expose_secret());
        let base_url = settings
            .base_url
            .as_deref()
            .unwrap_or_else(|| provider.base_url())
            .trim_end_matches('/');
        let model = settings
            .model
            .clone()
            .unwrap_or_else(|| provider.default_model().to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url),
            model,
            api_key,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        })
    }

    /// Read the key from the configured environment variable
    pub fn from_env(settings: &AiSettings) -> Result<Self, AiError> {
        let key = std::env::var(&settings.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AiError::NotConfigured {
                env_var: settings.api_key_env.clone(),
            })?;
        Self::new(SecretString::from(key), settings)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatCompletionClient for OpenAiCompatibleClient {
    async fn complete(&self, system: Option<&str>, prompt: &str) -> Result<String, AiError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });

        let body = ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!(endpoint = %self.endpoint, model = %self.model, "Sending chat completion");
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AiError::Status {
                status: status.as_u16(),
                body: body.chars().take(256).collect(),
            });
        }

        let parsed: ChatResponse = resp.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(AiError::EmptyCompletion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_key_prefix() {
        assert_eq!(Provider::from_key("gsk_abc"), Provider::Groq);
        assert_eq!(Provider::from_key("sk-abc"), Provider::OpenAi);
        assert_eq!(Provider::Groq.default_model(), "llama-3.1-8b-instant");
    }

    #[test]
    fn test_client_endpoint_selection() {
        let settings = AiSettings::default();
        let client =
            OpenAiCompatibleClient::new(SecretString::from("gsk_test".to_string()), &settings)
                .unwrap();
        assert_eq!(
            client.endpoint(),
            "https://api.groq.com/openai/v1/chat/completions"
        );

        let settings = AiSettings {
            base_url: Some("http://localhost:8080/v1/".to_string()),
            model: Some("local-model".to_string()),
            ..AiSettings::default()
        };
        let client =
            OpenAiCompatibleClient::new(SecretString::from("sk-test".to_string()), &settings)
                .unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8080/v1/chat/completions");
        assert_eq!(client.model(), "local-model");
    }

    #[test]
    fn test_missing_key_is_not_configured() {
        let settings = AiSettings {
            api_key_env: "HEALTHSYNC_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..AiSettings::default()
        };
        let err = OpenAiCompatibleClient::from_env(&settings).unwrap_err();
        assert!(matches!(err, AiError::NotConfigured { .. }));
    }
}
