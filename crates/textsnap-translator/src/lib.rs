pub mod google;
pub mod resolve;

pub use google::GoogleTranslator;
pub use resolve::{LanguagePair, Translated, TranslatedText, resolve_language_pair, translate_text};
pub use textsnap_core::languages;

pub type LanguageCode = String;

/// Translation provider interface
#[async_trait::async_trait]
pub trait Translator: Send + Sync {
    /// Translate text from source to target language
    async fn translate(
        &self,
        text: &str,
        from: LanguageCode,
        to: LanguageCode,
    ) -> Result<Translation, TranslateError>;

    /// Language codes the provider accepts on either side
    fn supported_languages(&self) -> Vec<LanguageCode>;

    /// Provider metadata
    fn metadata(&self) -> ProviderMetadata;
}

#[derive(Debug, Clone)]
pub struct Translation {
    pub text: String,
    pub from: LanguageCode,
    pub to: LanguageCode,
    pub provider: String,
}

#[derive(Debug, Clone)]
pub struct ProviderMetadata {
    pub name: String,
    pub requires_api_key: bool,
    pub free_tier_available: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Source language '{0}' not found in the translate language list")]
    UnsupportedSourceLanguage(String),

    #[error("Destination language '{0}' not found in the language list")]
    UnsupportedDestinationLanguage(String),

    #[error("No destination language configured for '{0}'")]
    MissingDestination(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

impl TranslateError {
    /// Configuration problems the user has to fix, as opposed to transport
    /// or service failures.
    pub fn is_language_mapping(&self) -> bool {
        matches!(
            self,
            TranslateError::UnsupportedSourceLanguage(_)
                | TranslateError::UnsupportedDestinationLanguage(_)
                | TranslateError::MissingDestination(_)
        )
    }
}
