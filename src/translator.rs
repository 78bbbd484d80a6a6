//! Translation service clients.
//!
//! - **[`DisabledTranslator`]**: identity; returns the input unchanged.
//! - **[`LibreTranslateTranslator`]**: `POST {base_url}/translate` against a
//!   LibreTranslate server with automatic source detection.

use anyhow::{bail, Context, Result};
use docqa_core::translate::Translator;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::TranslationConfig;

const DEFAULT_LIBRETRANSLATE_URL: &str = "http://127.0.0.1:5000";

pub fn create_translator(config: &TranslationConfig) -> Result<Box<dyn Translator>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledTranslator)),
        "libretranslate" => Ok(Box::new(LibreTranslateTranslator::new(config)?)),
        other => bail!("Unknown translation provider: {}", other),
    }
}

pub struct DisabledTranslator;

impl Translator for DisabledTranslator {
    fn name(&self) -> &str {
        "disabled"
    }

    fn translate(&self, text: &str, _target: &str) -> Result<String> {
        Ok(text.to_string())
    }
}

pub struct LibreTranslateTranslator {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl LibreTranslateTranslator {
    pub fn new(config: &TranslationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        let base_url = config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_LIBRETRANSLATE_URL)
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            client,
            base_url,
            api_key: std::env::var("LIBRETRANSLATE_API_KEY").ok(),
        })
    }
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

impl Translator for LibreTranslateTranslator {
    fn name(&self) -> &str {
        "libretranslate"
    }

    fn translate(&self, text: &str, target: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }
        let response = self
            .client
            .post(format!("{}/translate", self.base_url))
            .json(&TranslateRequest {
                q: text,
                source: "auto",
                target,
                format: "text",
                api_key: self.api_key.as_deref(),
            })
            .send()
            .context("failed to call translate endpoint")?
            .error_for_status()
            .context("translate endpoint returned non-success status")?
            .json::<TranslateResponse>()
            .context("failed to decode translate response")?;
        Ok(response.translated_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_is_identity() {
        let t = create_translator(&TranslationConfig::default()).unwrap();
        assert_eq!(t.name(), "disabled");
        assert_eq!(t.translate("hola", "en").unwrap(), "hola");
    }

    #[test]
    fn test_unknown_provider() {
        let config = TranslationConfig {
            provider: "deepl".to_string(),
            ..TranslationConfig::default()
        };
        assert!(create_translator(&config).is_err());
    }

    #[test]
    fn test_request_shape() {
        let body = serde_json::to_value(TranslateRequest {
            q: "hello",
            source: "auto",
            target: "es",
            format: "text",
            api_key: None,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "q": "hello", "source": "auto", "target": "es", "format": "text" })
        );
    }

    #[test]
    fn test_unreachable_server_errors() {
        let config = TranslationConfig {
            provider: "libretranslate".to_string(),
            base_url: Some("http://127.0.0.1:9".to_string()),
            timeout_secs: 2,
            ..TranslationConfig::default()
        };
        let t = LibreTranslateTranslator::new(&config).unwrap();
        assert!(t.translate("hola", "en").is_err());
    }
}
