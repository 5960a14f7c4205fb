use std::time::Duration;

use async_trait::async_trait;
use textsnap_config::translate::TranslateConfig;
use textsnap_core::languages::TRANSLATE_LANGUAGES;

use crate::{LanguageCode, ProviderMetadata, TranslateError, Translation, Translator};

/// Client for the public `translate_a/single` endpoint (`client=gtx`).
#[derive(Clone)]
pub struct GoogleTranslator {
    client: reqwest::Client,
    api_url: String,
}

impl GoogleTranslator {
    pub fn new(api_url: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { client, api_url }
    }

    pub fn from_config(config: &TranslateConfig) -> Self {
        Self::new(
            config.api_url.clone(),
            Duration::from_millis(config.server_timeout),
        )
    }
}

/// The response is a nested array; `[0]` holds `[translated, original, ..]`
/// segments, one per sentence.
fn parse_segments(json: &serde_json::Value) -> Option<String> {
    let segments = json.get(0)?.as_array()?;
    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(|t| t.as_str()))
        .collect();
    (!segments.is_empty()).then_some(text)
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(
        &self,
        text: &str,
        from: LanguageCode,
        to: LanguageCode,
    ) -> Result<Translation, TranslateError> {
        let params = [
            ("client", "gtx"),
            ("sl", from.as_str()),
            ("tl", to.as_str()),
            ("dt", "t"),
            ("q", text),
        ];

        let response = self.client.get(&self.api_url).query(&params).send().await?;

        if response.status() == 429 {
            return Err(TranslateError::RateLimitExceeded);
        }

        if !response.status().is_success() {
            return Err(TranslateError::ApiError(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let json: serde_json::Value = response.json().await.map_err(|e| {
            TranslateError::ApiError(format!("Failed to parse response: {}", e))
        })?;

        let translated_text = parse_segments(&json)
            .ok_or_else(|| TranslateError::ApiError("No translation in response".to_string()))?;

        tracing::debug!("Translated {} chars {from} -> {to}", text.chars().count());
        Ok(Translation {
            text: translated_text,
            from,
            to,
            provider: "google".to_string(),
        })
    }

    fn supported_languages(&self) -> Vec<LanguageCode> {
        TRANSLATE_LANGUAGES
            .iter()
            .map(|(code, _)| code.to_string())
            .collect()
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "Google Translate".to_string(),
            requires_api_key: false,
            free_tier_available: true,
        }
    }
}
