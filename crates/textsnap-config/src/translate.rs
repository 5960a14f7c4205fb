use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::languages::TRANSLATE_LANGUAGES;

fn default_server_timeout() -> u64 {
    2000
}

fn default_api_url() -> String {
    "https://translate.googleapis.com/translate_a/single".to_string()
}

/// Every language of the translation table, translated to English.
fn default_destinations() -> BTreeMap<String, String> {
    TRANSLATE_LANGUAGES
        .iter()
        .map(|(_, name)| (name.to_string(), "en".to_string()))
        .collect()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TranslateConfig {
    pub enable_translation: bool,
    /// Request timeout in milliseconds
    #[serde(default = "default_server_timeout")]
    pub server_timeout: u64,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Canonical source language name -> destination language code
    #[serde(default = "default_destinations")]
    pub destinations: BTreeMap<String, String>,
}

impl TranslateConfig {
    /// Destination code configured for a canonical source language name.
    pub fn destination_for(&self, language_name: &str) -> Option<&str> {
        self.destinations
            .get(&language_name.to_lowercase())
            .map(String::as_str)
    }
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            enable_translation: false,
            server_timeout: default_server_timeout(),
            api_url: default_api_url(),
            destinations: default_destinations(),
        }
    }
}
