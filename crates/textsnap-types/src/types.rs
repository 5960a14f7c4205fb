use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A screen region was captured by the host
    TriggerCapture {
        image: CapturedImage,
        region: CaptureRegion,
    },
    /// Recognise an image file chosen by the user
    OpenFile(PathBuf),
    DownloadLanguage(String),
    CancelDownload,
    ShowResult {
        id: CaptureId,
        result: RecognitionResult,
    },
    StatusUpdate {
        status: String,
        capturing: bool,
    },
    DownloadProgress {
        language: String,
        percent: Option<u8>,
    },
    DownloadFinished {
        language: String,
        success: bool,
    },
}

/// Correlates log lines and results of one capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaptureId(pub Uuid);

impl CaptureId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CaptureId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CaptureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRegion {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Raw RGBA8 pixels handed over by the capture collaborator.
#[derive(Clone, PartialEq, Eq)]
pub struct CapturedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl fmt::Debug for CapturedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapturedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationPayload {
    pub text: String,
    pub source_name: String,
    pub destination_name: String,
    pub destination_code: String,
    /// False when `text` is the "translation unavailable" placeholder
    pub available: bool,
}

/// What the display collaborator receives after a capture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub extracted_text: String,
    pub translation: Option<TranslationPayload>,
}
