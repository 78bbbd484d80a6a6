//! Answer generator implementations.
//!
//! Concrete [`Generator`]s for the `[generator]` config section:
//! - **[`OllamaGenerator`]**: `POST {base_url}/api/generate` on a local
//!   Ollama server.
//! - **[`OpenAiGenerator`]**: `POST {base_url}/v1/chat/completions`, key
//!   from `OPENAI_API_KEY`.
//!
//! All calls are blocking. Retrying on the busy sentinel is the
//! dispatcher's job, not the client's.
//!
//! # Provider Selection
//!
//! ```rust
//! # use docqa::config::GeneratorConfig;
//! # use docqa::generator::create_generator;
//! let config = GeneratorConfig::default(); // provider = "disabled"
//! assert!(create_generator(&config).unwrap().is_none());
//! ```

use anyhow::{bail, Context, Result};
use docqa_core::dispatch::{GenerationParams, Generator};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::GeneratorConfig;

const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";

/// Build the generator named by `config.provider`.
///
/// Returns `None` for `"disabled"`: the session then answers with the
/// extracted context.
pub fn create_generator(config: &GeneratorConfig) -> Result<Option<Box<dyn Generator>>> {
    match config.provider.as_str() {
        "disabled" => Ok(None),
        "ollama" => Ok(Some(Box::new(OllamaGenerator::new(config)?))),
        "openai" => Ok(Some(Box::new(OpenAiGenerator::new(config)?))),
        other => bail!("Unknown generator provider: {}", other),
    }
}

/// Parameters for a single call, taken from config.
pub fn generation_params(config: &GeneratorConfig) -> GenerationParams {
    GenerationParams {
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    }
}

fn http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("failed to build HTTP client")
}

fn trim_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

// ============ Ollama ============

pub struct OllamaGenerator {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaGenerator {
    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        if config.model.trim().is_empty() {
            bail!("generator.model required for Ollama provider");
        }
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            base_url: trim_base_url(config.base_url.as_deref().unwrap_or(DEFAULT_OLLAMA_URL)),
            model: config.model.clone(),
        })
    }
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    num_predict: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

impl Generator for OllamaGenerator {
    fn name(&self) -> &str {
        "ollama"
    }

    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<Option<String>> {
        let url = format!("{}/api/generate", self.base_url);
        let response = self
            .client
            .post(url)
            .json(&OllamaRequest {
                model: &self.model,
                prompt,
                stream: false,
                options: OllamaOptions {
                    num_predict: params.max_tokens,
                    temperature: params.temperature,
                },
            })
            .send()
            .context("failed to call ollama generate endpoint")?
            .error_for_status()
            .context("ollama generate returned non-success status")?
            .json::<OllamaResponse>()
            .context("failed to decode ollama generate response")?;

        Ok(Some(response.response.trim().to_string()))
    }
}

// ============ OpenAI ============

pub struct OpenAiGenerator {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl OpenAiGenerator {
    /// # Errors
    ///
    /// Returns an error if `OPENAI_API_KEY` is not in the environment.
    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable not set"))?;
        if config.model.trim().is_empty() {
            bail!("generator.model required for OpenAI provider");
        }
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            base_url: trim_base_url(config.base_url.as_deref().unwrap_or(DEFAULT_OPENAI_URL)),
            model: config.model.clone(),
            api_key,
        })
    }
}

impl Generator for OpenAiGenerator {
    fn name(&self) -> &str {
        "openai"
    }

    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<Option<String>> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
        });

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .context("failed to call OpenAI chat completions endpoint")?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().unwrap_or_default();
            bail!("OpenAI API error {}: {}", status, body_text);
        }

        let json: serde_json::Value = response
            .json()
            .context("failed to decode OpenAI response")?;
        parse_openai_response(&json)
    }
}

/// Extract the answer from a chat completions response.
///
/// A `content_filter` finish reason, a refusal, or null content means the
/// prompt was rejected and maps to `None`.
fn parse_openai_response(json: &serde_json::Value) -> Result<Option<String>> {
    let choice = json
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response: missing choices"))?;

    if choice.get("finish_reason").and_then(|f| f.as_str()) == Some("content_filter") {
        return Ok(None);
    }

    let message = choice
        .get("message")
        .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response: missing message"))?;
    if message.get("refusal").is_some_and(|r| !r.is_null()) {
        return Ok(None);
    }

    Ok(message
        .get("content")
        .and_then(|c| c.as_str())
        .map(|c| c.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_disabled() {
        assert!(create_generator(&GeneratorConfig::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_create_unknown_provider() {
        let config = GeneratorConfig {
            provider: "palm".to_string(),
            ..GeneratorConfig::default()
        };
        assert!(create_generator(&config).is_err());
    }

    #[test]
    fn test_ollama_trims_base_url() {
        let config = GeneratorConfig {
            provider: "ollama".to_string(),
            base_url: Some("http://localhost:11434/".to_string()),
            ..GeneratorConfig::default()
        };
        let g = OllamaGenerator::new(&config).unwrap();
        assert_eq!(g.base_url, "http://localhost:11434");
        assert_eq!(g.name(), "ollama");
    }

    #[test]
    fn test_generation_params_from_config() {
        let config = GeneratorConfig {
            temperature: 0.5,
            max_tokens: 1000,
            ..GeneratorConfig::default()
        };
        let p = generation_params(&config);
        assert_eq!(p.temperature, 0.5);
        assert_eq!(p.max_tokens, 1000);
    }

    #[test]
    fn test_parse_openai_answer() {
        let json = json!({
            "choices": [{
                "finish_reason": "stop",
                "message": { "role": "assistant", "content": "  Cats sit on mats. " }
            }]
        });
        assert_eq!(
            parse_openai_response(&json).unwrap(),
            Some("Cats sit on mats.".to_string())
        );
    }

    #[test]
    fn test_parse_openai_rejections() {
        let filtered = json!({
            "choices": [{ "finish_reason": "content_filter", "message": { "content": "partial" } }]
        });
        assert_eq!(parse_openai_response(&filtered).unwrap(), None);

        let null_content = json!({
            "choices": [{ "finish_reason": "stop", "message": { "content": null } }]
        });
        assert_eq!(parse_openai_response(&null_content).unwrap(), None);

        let refusal = json!({
            "choices": [{ "finish_reason": "stop", "message": { "content": null, "refusal": "I can't help with that." } }]
        });
        assert_eq!(parse_openai_response(&refusal).unwrap(), None);
    }

    #[test]
    fn test_parse_openai_malformed() {
        assert!(parse_openai_response(&json!({})).is_err());
        assert!(parse_openai_response(&json!({ "choices": [] })).is_err());
    }
}
