//! Chat-completions client for the hosted generation service

use crate::config::LlmConfig;
use crate::error::{Result, ResumeMatcherError};
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};

/// Single-prompt text generation.
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;

    fn model_name(&self) -> &str;
}

/// Client for any OpenAI-compatible `/chat/completions` endpoint, Groq by default.
#[derive(Debug, Clone)]
pub struct GroqClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl GroqClient {
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(ResumeMatcherError::Configuration(format!(
                "{} is empty",
                config.api_key_env
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    /// Build from the key in the configured environment variable.
    pub fn from_env(config: &LlmConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            ResumeMatcherError::Configuration(format!(
                "{} is not set; add it to the environment or a .env file",
                config.api_key_env
            ))
        })?;
        Self::new(config, api_key.trim().to_string())
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl TextGenerator for GroqClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let start_time = Instant::now();
        let request = ChatCompletionsRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ResumeMatcherError::Generation(format!(
                "HTTP {}: {}",
                status.as_u16(),
                message
            )));
        }

        let parsed: ChatCompletionsResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ResumeMatcherError::Generation("response had no content".to_string()))?;

        debug!(
            "{} responded with {} chars in {:.2?}",
            self.model,
            content.len(),
            start_time.elapsed()
        );
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_ignores_trailing_slash() {
        let config = LlmConfig {
            base_url: "https://api.groq.com/openai/v1/".to_string(),
            ..LlmConfig::default()
        };
        let client = GroqClient::new(&config, "key".to_string()).unwrap();
        assert_eq!(client.endpoint(), "https://api.groq.com/openai/v1/chat/completions");
        assert_eq!(client.model_name(), "llama-3.3-70b-versatile");
    }

    #[test]
    fn test_blank_key_is_rejected() {
        let err = GroqClient::new(&LlmConfig::default(), "  ".to_string()).unwrap_err();
        assert!(matches!(err, ResumeMatcherError::Configuration(_)));
    }

    #[test]
    fn test_request_body_shape() {
        let request = ChatCompletionsRequest {
            model: "m",
            messages: vec![Message { role: "user", content: "hi" }],
            temperature: 0.0,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["temperature"], 0.0);
    }

    #[test]
    fn test_response_without_content() {
        let parsed: ChatCompletionsResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant"}}]}"#).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }
}
