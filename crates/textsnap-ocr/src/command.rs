use std::fmt;

use textsnap_config::ocr::OcrConfig;
use textsnap_core::languages::is_tesseract_language;

pub const FALLBACK_LANGUAGE: &str = "eng";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharFilter {
    Blacklist(String),
    Whitelist(String),
}

/// Engine arguments derived from one configuration snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    pub language: String,
    pub page_segmentation_mode: u32,
    pub ocr_engine_mode: u32,
    pub preserve_interword_spaces: bool,
    pub char_filter: Option<CharFilter>,
}

/// Languages may be joined with `+`; every part must be a known code.
fn resolve_language(language: &str) -> String {
    let language = language.trim();
    if !language.is_empty() && language.split('+').all(is_tesseract_language) {
        return language.to_string();
    }

    tracing::warn!("Unknown OCR language '{language}', falling back to '{FALLBACK_LANGUAGE}'");
    FALLBACK_LANGUAGE.to_string()
}

pub fn build_command(config: &OcrConfig) -> EngineCommand {
    let char_filter = if config.enable_blacklist_char {
        Some(CharFilter::Blacklist(config.blacklist_char.clone()))
    } else if config.enable_whitelist_char {
        Some(CharFilter::Whitelist(config.whitelist_char.clone()))
    } else {
        None
    };

    let command = EngineCommand {
        language: resolve_language(&config.language),
        page_segmentation_mode: config.page_segmentation_mode,
        ocr_engine_mode: config.ocr_engine_mode,
        preserve_interword_spaces: config.preserve_interword_spaces,
        char_filter,
    };
    tracing::info!("Tesseract configuration ({command})");
    command
}

impl EngineCommand {
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "-l".to_string(),
            self.language.clone(),
            "--psm".to_string(),
            self.page_segmentation_mode.to_string(),
            "--oem".to_string(),
            self.ocr_engine_mode.to_string(),
            "-c".to_string(),
            format!(
                "preserve_interword_spaces={}",
                u8::from(self.preserve_interword_spaces)
            ),
        ];

        match &self.char_filter {
            Some(CharFilter::Blacklist(chars)) => {
                args.push("-c".to_string());
                args.push(format!("tessedit_char_blacklist={chars}"));
            }
            Some(CharFilter::Whitelist(chars)) => {
                args.push("-c".to_string());
                args.push(format!("tessedit_char_whitelist={chars}"));
            }
            None => {}
        }

        args
    }
}

impl fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.args().join(" "))
    }
}
