use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use image::{GrayImage, Luma};
use tempfile::TempDir;
use textsnap_config::ConfigStore;
use textsnap_core::state::AppState;
use textsnap_ocr::{EngineCommand, Recognizer};
use textsnap_translator::{
    LanguageCode, ProviderMetadata, TranslateError, Translation, Translator,
};
use textsnap_types::{CaptureId, CaptureRegion, CapturedImage, RecognitionResult};

use crate::capture::Orchestrator;
use crate::sink::OutputSink;

mod capture_tests;

/// Returns fixed text and remembers which files it was shown.
pub struct StubRecognizer {
    text: String,
    /// (path, existed while recognising)
    pub seen: Mutex<Vec<(PathBuf, bool)>>,
    pub structured: Mutex<Vec<bool>>,
}

impl Recognizer for StubRecognizer {
    fn recognize(&self, image: &Path, _command: &EngineCommand, structured: bool) -> String {
        self.seen
            .lock()
            .unwrap()
            .push((image.to_path_buf(), image.exists()));
        self.structured.lock().unwrap().push(structured);
        self.text.clone()
    }
}

pub struct StubTranslator {
    fail: bool,
    pub calls: AtomicUsize,
}

impl StubTranslator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Translator for StubTranslator {
    async fn translate(
        &self,
        text: &str,
        from: LanguageCode,
        to: LanguageCode,
    ) -> Result<Translation, TranslateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(TranslateError::ApiError("service down".to_string()));
        }
        Ok(Translation {
            text: format!("{text} ({from}->{to})"),
            from,
            to,
            provider: "stub".to_string(),
        })
    }

    fn supported_languages(&self) -> Vec<LanguageCode> {
        Vec::new()
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "stub".to_string(),
            requires_api_key: false,
            free_tier_available: true,
        }
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub clipboard: Mutex<Vec<String>>,
    pub sounds: Mutex<Vec<PathBuf>>,
    pub displayed: Mutex<Vec<(CaptureId, RecognitionResult)>>,
}

impl OutputSink for RecordingSink {
    fn copy_to_clipboard(&self, text: &str) -> anyhow::Result<()> {
        self.clipboard.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn play_sound(&self, path: &Path) -> anyhow::Result<()> {
        self.sounds.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    fn display(&self, id: CaptureId, result: &RecognitionResult) {
        self.displayed.lock().unwrap().push((id, result.clone()));
    }
}

pub struct Fixture {
    pub dir: TempDir,
    pub state: Arc<AppState>,
    pub recognizer: Arc<StubRecognizer>,
    pub translator: Arc<StubTranslator>,
    pub sink: Arc<RecordingSink>,
    pub orchestrator: Arc<Orchestrator>,
}

pub fn fixture(text: &str) -> Fixture {
    fixture_with(text, false, None)
}

/// Fixture whose orchestrator publishes through `sink` instead of recording.
pub fn fixture_with(
    text: &str,
    fail_translation: bool,
    sink: Option<Arc<dyn OutputSink>>,
) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let state = Arc::new(AppState::new(ConfigStore::new(dir.path().join("config.json"))));
    let recognizer = Arc::new(StubRecognizer {
        text: text.to_string(),
        seen: Mutex::new(Vec::new()),
        structured: Mutex::new(Vec::new()),
    });
    let translator = Arc::new(StubTranslator {
        fail: fail_translation,
        calls: AtomicUsize::new(0),
    });
    let recording = Arc::new(RecordingSink::default());
    let sink = sink.unwrap_or_else(|| recording.clone() as Arc<dyn OutputSink>);

    let orchestrator = Arc::new(Orchestrator::new(
        state.clone(),
        recognizer.clone(),
        translator.clone(),
        sink,
    ));

    Fixture {
        dir,
        state,
        recognizer,
        translator,
        sink: recording,
        orchestrator,
    }
}

/// White page with a dark bar, enough for preprocessing to chew on.
pub fn write_page(dir: &Path, name: &str) -> PathBuf {
    let mut image = GrayImage::from_pixel(60, 40, Luma([235]));
    for y in 15..25 {
        for x in 10..50 {
            image.put_pixel(x, y, Luma([20]));
        }
    }
    let path = dir.join(name);
    image.save(&path).unwrap();
    path
}

pub fn captured_image(width: u32, height: u32) -> CapturedImage {
    CapturedImage {
        width,
        height,
        rgba: vec![255; (width * height * 4) as usize],
    }
}

pub fn region(width: u32, height: u32) -> CaptureRegion {
    CaptureRegion {
        x: 10,
        y: 20,
        width,
        height,
    }
}
