//! Groq insight provider implementation.
//!
//! Calls the Groq chat-completions API (<https://groq.com/>), which speaks
//! the OpenAI-compatible wire format, to turn a dataset summary into a
//! senior-analyst style narrative.

use super::InsightProvider;
use crate::error::{ReportError, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Groq API endpoint.
const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Default model for narrative generation.
const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Default timeout for API requests in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default temperature for narrative responses.
const DEFAULT_TEMPERATURE: f32 = 0.4;

/// Default max tokens for responses.
const DEFAULT_MAX_TOKENS: u32 = 1024;

#[derive(Debug, Serialize)]
struct GroqRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct GroqResponse {
    choices: Option<Vec<Choice>>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<Message>,
}

/// Configuration for the Groq provider.
#[derive(Debug, Clone)]
pub struct GroqConfig {
    /// The model to use (e.g., "llama-3.1-8b-instant").
    pub model: String,
    /// Temperature for response generation (0.0 - 2.0).
    pub temperature: f32,
    /// Maximum tokens in the response.
    pub max_tokens: u32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Base URL for the API (useful for proxies or custom endpoints).
    pub base_url: String,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl GroqConfig {
    /// Create a new configuration builder.
    pub fn builder() -> GroqConfigBuilder {
        GroqConfigBuilder::default()
    }
}

/// Builder for [`GroqConfig`].
#[derive(Default)]
pub struct GroqConfigBuilder {
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    timeout_secs: Option<u64>,
    base_url: Option<String>,
}

impl GroqConfigBuilder {
    /// Set the model to use.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the temperature (0.0 - 2.0).
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum tokens.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the request timeout in seconds.
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    /// Set a custom base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> GroqConfig {
        GroqConfig {
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }
}

/// Groq provider for narrative insight generation.
///
/// # Example
///
/// ```rust,ignore
/// use autoreport::insight::{GroqProvider, GroqConfig};
///
/// // Simple usage with defaults
/// let provider = GroqProvider::new("your-api-key")?;
///
/// // With custom configuration
/// let config = GroqConfig::builder()
///     .model("llama-3.3-70b-versatile")
///     .temperature(0.2)
///     .build();
/// let provider = GroqProvider::with_config("your-api-key", config)?;
/// ```
pub struct GroqProvider {
    api_key: String,
    config: GroqConfig,
    client: Client,
}

impl GroqProvider {
    /// Create a new Groq provider with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, GroqConfig::default())
    }

    /// Create a new Groq provider with custom configuration.
    pub fn with_config(api_key: impl Into<String>, config: GroqConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ReportError::RemoteService(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key: api_key.into(),
            config,
            client,
        })
    }

    fn build_prompt(&self, summary_text: &str) -> String {
        format!(
            "You are a senior data analyst. Write a highly professional insight \
             report based on the summary below.\n\n\
             Summary:\n{}\n\n\
             Include:\n\
             - Key trends\n\
             - Interesting patterns\n\
             - Anomalies\n\
             - Risks\n\
             - Executive recommendations",
            summary_text
        )
    }

    fn call_api(&self, prompt: &str) -> Result<String> {
        let request = GroqRequest {
            model: self.config.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(&self.config.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()?;

        if !response.status().is_success() {
            return Err(ReportError::RemoteService(format!(
                "Groq API error {}: {}",
                response.status(),
                response.text()?
            )));
        }

        let result: GroqResponse = response.json()?;

        // Extract content from the first choice's message, tolerating
        // missing optional fields.
        result
            .choices
            .as_ref()
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.message.as_ref())
            .map(|msg| msg.content.clone())
            .ok_or_else(|| ReportError::RemoteService("no response content from Groq API".into()))
    }
}

impl InsightProvider for GroqProvider {
    fn generate_insights(&self, summary_text: &str) -> Result<String> {
        let prompt = self.build_prompt(summary_text);
        self.call_api(&prompt)
    }

    fn name(&self) -> &str {
        "Groq"
    }

    fn model(&self) -> Option<&str> {
        Some(&self.config.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_response_structure() {
        let json = r#"{
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "Sales trend upward."
                }
            }]
        }"#;

        let response: GroqResponse = serde_json::from_str(json).unwrap();
        let choices = response.choices.unwrap();
        assert_eq!(
            choices[0].message.as_ref().unwrap().content,
            "Sales trend upward."
        );
    }

    #[test]
    fn test_parse_response_with_null_choices() {
        let response: GroqResponse = serde_json::from_str(r#"{"choices": null}"#).unwrap();
        assert!(response.choices.is_none());
    }

    #[test]
    fn test_parse_response_missing_message() {
        let response: GroqResponse =
            serde_json::from_str(r#"{"choices": [{"message": null}]}"#).unwrap();
        assert!(response.choices.unwrap()[0].message.is_none());
    }

    #[test]
    fn test_build_prompt_embeds_summary_and_instructions() {
        let provider = GroqProvider::new("test-key").unwrap();
        let prompt = provider.build_prompt("Total Rows: 3");

        assert!(prompt.contains("Total Rows: 3"));
        assert!(prompt.contains("Key trends"));
        assert!(prompt.contains("Anomalies"));
        assert!(prompt.contains("Executive recommendations"));
    }

    #[test]
    fn test_config_builder_defaults() {
        let config = GroqConfig::builder().build();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_config_builder_custom_values() {
        let config = GroqConfig::builder()
            .model("llama-3.3-70b-versatile")
            .temperature(0.1)
            .max_tokens(256)
            .timeout_secs(10)
            .base_url("http://localhost:9999")
            .build();

        assert_eq!(config.model, "llama-3.3-70b-versatile");
        assert_eq!(config.temperature, 0.1);
        assert_eq!(config.max_tokens, 256);
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.base_url, "http://localhost:9999");
    }

    #[test]
    fn test_provider_name_and_model() {
        let provider = GroqProvider::new("test-key").unwrap();
        assert_eq!(provider.name(), "Groq");
        assert_eq!(provider.model(), Some(DEFAULT_MODEL));
    }
}
