use std::fmt;

use textsnap_config::translate::TranslateConfig;
use textsnap_core::languages::{
    canonical_name, tesseract_language_name, translate_code_for, translate_language_name,
};

use crate::{TranslateError, Translator};

/// Source and destination resolved against both language tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePair {
    /// Canonical name of the OCR language, e.g. `"japanese"`
    pub source_name: String,
    pub source_code: String,
    pub destination_name: String,
    pub destination_code: String,
}

/// Map the single configured OCR language to a translation pair.
///
/// No default is substituted: a language missing from either table, or
/// without a configured destination, is an error naming it.
pub fn resolve_language_pair(
    ocr_language: &str,
    config: &TranslateConfig,
) -> Result<LanguagePair, TranslateError> {
    let display_name = tesseract_language_name(ocr_language)
        .ok_or_else(|| TranslateError::UnsupportedSourceLanguage(ocr_language.to_string()))?;

    let source_name = canonical_name(display_name);
    let source_code = translate_code_for(&source_name)
        .ok_or_else(|| TranslateError::UnsupportedSourceLanguage(display_name.to_string()))?;

    let destination_code = config
        .destination_for(&source_name)
        .ok_or_else(|| TranslateError::MissingDestination(source_name.clone()))?;
    let destination_name = translate_language_name(destination_code).ok_or_else(|| {
        TranslateError::UnsupportedDestinationLanguage(destination_code.to_string())
    })?;

    Ok(LanguagePair {
        source_name,
        source_code: source_code.to_string(),
        destination_name: destination_name.to_string(),
        destination_code: destination_code.trim().to_lowercase(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslatedText {
    Text(String),
    /// The service could not be reached or answered with an error
    Unavailable(String),
}

impl TranslatedText {
    pub fn is_available(&self) -> bool {
        matches!(self, TranslatedText::Text(_))
    }
}

impl fmt::Display for TranslatedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslatedText::Text(text) => write!(f, "{text}"),
            TranslatedText::Unavailable(reason) => write!(f, "Translation unavailable: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translated {
    pub text: TranslatedText,
    pub source_name: String,
    pub destination_name: String,
    pub destination_code: String,
}

/// Translate `text` from the OCR language to its configured destination.
///
/// Language mapping problems are returned as errors before any request is
/// made. Transport and service failures become [`TranslatedText::Unavailable`].
pub async fn translate_text<T>(
    translator: &T,
    text: &str,
    ocr_language: &str,
    config: &TranslateConfig,
) -> Result<Translated, TranslateError>
where
    T: Translator + ?Sized,
{
    let pair = resolve_language_pair(ocr_language, config)?;
    tracing::info!(
        "Translating from {} ({}) to {} ({})",
        pair.source_name,
        pair.source_code,
        pair.destination_name,
        pair.destination_code
    );

    let text = match translator
        .translate(text, pair.source_code.clone(), pair.destination_code.clone())
        .await
    {
        Ok(translation) => {
            tracing::info!("Text successfully translated using {}", translator.metadata().name);
            TranslatedText::Text(translation.text)
        }
        Err(e) => {
            tracing::error!("An error occurred while translating text: {e}");
            TranslatedText::Unavailable(e.to_string())
        }
    };

    Ok(Translated {
        text,
        source_name: pair.source_name,
        destination_name: pair.destination_name,
        destination_code: pair.destination_code,
    })
}
