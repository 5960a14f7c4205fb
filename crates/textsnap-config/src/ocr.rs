use serde::{Deserialize, Serialize};

fn default_tesseract_path() -> String {
    if cfg!(windows) {
        r"C:\Program Files\Tesseract-OCR\tesseract.exe".to_string()
    } else {
        "/usr/bin/tesseract".to_string()
    }
}

fn default_tessdata_path() -> String {
    "tessdata".to_string()
}

fn default_language() -> String {
    "eng".to_string()
}

fn default_page_segmentation_mode() -> u32 {
    6
}

fn default_ocr_engine_mode() -> u32 {
    3
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct OcrConfig {
    /// Path to the tesseract executable
    #[serde(default = "default_tesseract_path")]
    pub tesseract_path: String,
    /// Directory holding `*.traineddata` files, exported as `TESSDATA_PREFIX`
    #[serde(default = "default_tessdata_path")]
    pub tessdata_path: String,
    /// Tesseract language code (e.g. "eng", "jpn", "chi_sim")
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_page_segmentation_mode")]
    pub page_segmentation_mode: u32,
    #[serde(default = "default_ocr_engine_mode")]
    pub ocr_engine_mode: u32,
    /// Use word/box output and rebuild the original spacing
    pub preserve_interword_spaces: bool,
    pub enable_blacklist_char: bool,
    pub blacklist_char: String,
    pub enable_whitelist_char: bool,
    pub whitelist_char: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_path: default_tesseract_path(),
            tessdata_path: default_tessdata_path(),
            language: default_language(),
            page_segmentation_mode: default_page_segmentation_mode(),
            ocr_engine_mode: default_ocr_engine_mode(),
            preserve_interword_spaces: false,
            enable_blacklist_char: false,
            blacklist_char: String::new(),
            enable_whitelist_char: false,
            whitelist_char: String::new(),
        }
    }
}
