use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, RgbaImage};
use tempfile::TempPath;
use textsnap_config::output::OutputConfig;
use textsnap_core::state::AppState;
use textsnap_core::text::{DefaultPostprocessor, Postprocessor};
use textsnap_ocr::{Recognizer, build_command};
use textsnap_translator::{TranslateError, Translator, translate_text};
use textsnap_types::{
    CaptureId, CaptureRegion, CapturedImage, RecognitionResult, TranslationPayload,
};

use crate::sink::OutputSink;

const STAMP_FORMAT: &str = "%Y_%m_%d_%H%M%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStage {
    Idle,
    Captured,
    Preprocessed,
    Recognized,
    Translated,
    Delivered,
}

#[derive(Debug)]
pub enum CaptureSource {
    Screen {
        image: CapturedImage,
        region: CaptureRegion,
    },
    /// User-selected image; never modified
    File(PathBuf),
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("A capture is already in progress")]
    Busy,

    #[error("Captured pixels do not match a {width}x{height} RGBA image")]
    InvalidCapture { width: u32, height: u32 },

    #[error("Could not create the output folder '{}': {source}", path.display())]
    OutputFolder { path: PathBuf, source: io::Error },

    #[error("Could not create a temporary image: {0}")]
    TempWrite(#[source] io::Error),

    #[error("Could not read '{}': {source}", path.display())]
    ReadSource { path: PathBuf, source: io::Error },

    #[error("Could not write image '{}': {source}", path.display())]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Could not save image to '{}': {source}", path.display())]
    SaveImage { path: PathBuf, source: io::Error },

    #[error(transparent)]
    LanguageMapping(#[from] TranslateError),

    #[error("Capture task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Runs one capture from bitmap to delivered text.
pub struct Orchestrator {
    state: Arc<AppState>,
    recognizer: Arc<dyn Recognizer>,
    translator: Arc<dyn Translator>,
    sink: Arc<dyn OutputSink>,
}

impl Orchestrator {
    pub fn new(
        state: Arc<AppState>,
        recognizer: Arc<dyn Recognizer>,
        translator: Arc<dyn Translator>,
        sink: Arc<dyn OutputSink>,
    ) -> Self {
        Self {
            state,
            recognizer,
            translator,
            sink,
        }
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    pub async fn run(&self, source: CaptureSource) -> Result<RecognitionResult, CaptureError> {
        self.run_announced(source, async {}).await
    }

    /// Same as [`run`](Self::run), awaiting `started` once this capture holds
    /// the single-flight guard. A refused trigger never awaits it.
    pub async fn run_announced(
        &self,
        source: CaptureSource,
        started: impl Future<Output = ()>,
    ) -> Result<RecognitionResult, CaptureError> {
        let _guard = self.state.begin_capture().ok_or(CaptureError::Busy)?;
        started.await;
        let id = CaptureId::new();
        let config = self.state.config();
        let stamp = chrono::Local::now().format(STAMP_FORMAT).to_string();
        trace_stage(id, CaptureStage::Idle);

        let output_dir = prepare_output_folder(&config.output)?;
        let raw_copy = output_dir
            .as_ref()
            .filter(|_| config.output.save_captured_image)
            .map(|dir| dir.join(format!("{stamp}.png")));

        // Dropping `working` deletes the file, whatever path we leave by
        let working =
            tokio::task::spawn_blocking(move || write_working_image(source, raw_copy)).await??;
        trace_stage(id, CaptureStage::Captured);

        let path = working.to_path_buf();
        let preprocess = config.preprocess.clone();
        run_preprocess(id, move || {
            textsnap_preprocess::preprocess_image(&path, &preprocess)
        })
        .await;
        trace_stage(id, CaptureStage::Preprocessed);

        let command = build_command(&config.ocr);
        let structured = config.ocr.preserve_interword_spaces;
        tracing::info!("Running OCR with: {command}");
        let recognizer = Arc::clone(&self.recognizer);
        let path = working.to_path_buf();
        let raw = tokio::task::spawn_blocking(move || {
            recognizer.recognize(&path, &command, structured)
        })
        .await?;

        let text = DefaultPostprocessor::from_config(&config.output).process(&raw);
        let has_text = !text.trim().is_empty();
        trace_stage(id, CaptureStage::Recognized);
        if !has_text {
            tracing::info!("No text found in capture {id}");
        }

        if config.output.copy_to_clipboard && has_text {
            match self.sink.copy_to_clipboard(&text) {
                Ok(()) => tracing::info!("Text copied to clipboard"),
                Err(e) => tracing::warn!("Failed to copy text to clipboard: {e:#}"),
            }
        }

        let translation = if config.translate.enable_translation && has_text {
            let translated = translate_text(
                self.translator.as_ref(),
                &text,
                &config.ocr.language,
                &config.translate,
            )
            .await?;
            trace_stage(id, CaptureStage::Translated);

            Some(TranslationPayload {
                available: translated.text.is_available(),
                text: translated.text.to_string(),
                source_name: translated.source_name,
                destination_name: translated.destination_name,
                destination_code: translated.destination_code,
            })
        } else {
            None
        };

        let enhanced = output_dir
            .as_ref()
            .filter(|_| config.output.save_enhanced_image)
            .map(|dir| dir.join(enhanced_name(&working, &stamp)));
        finish_working_image(working, enhanced)?;

        if config.preferences.enable_sound && has_text {
            let sound = Path::new(&config.preferences.sound_file);
            if let Err(e) = self.sink.play_sound(sound) {
                tracing::warn!("Failed to play sound cue: {e:#}");
            }
        }

        let result = RecognitionResult {
            extracted_text: text,
            translation,
        };
        if config.output.show_popup_window {
            self.sink.display(id, &result);
        }
        trace_stage(id, CaptureStage::Delivered);

        Ok(result)
    }
}

/// Preprocessing is best effort: if the blocking task dies the capture goes
/// on with the image as written.
pub(crate) async fn run_preprocess<F>(id: CaptureId, preprocess: F)
where
    F: FnOnce() + Send + 'static,
{
    if let Err(e) = tokio::task::spawn_blocking(preprocess).await {
        tracing::warn!("Preprocessing for capture {id} did not finish, using the unprocessed image: {e}");
    }
}

fn trace_stage(id: CaptureId, stage: CaptureStage) {
    tracing::debug!("Capture {id}: {stage:?}");
}

/// Output folder when something is to be saved there, created on demand.
fn prepare_output_folder(output: &OutputConfig) -> Result<Option<PathBuf>, CaptureError> {
    if !output.save_captured_image && !output.save_enhanced_image {
        return Ok(None);
    }

    let path = PathBuf::from(&output.output_folder_path);
    if !path.as_os_str().is_empty() {
        fs::create_dir_all(&path).map_err(|source| CaptureError::OutputFolder {
            path: path.clone(),
            source,
        })?;
    }
    Ok(Some(path))
}

fn temp_image(suffix: &str) -> Result<TempPath, CaptureError> {
    tempfile::Builder::new()
        .prefix("textsnap_")
        .suffix(suffix)
        .tempfile()
        .map(|file| file.into_temp_path())
        .map_err(CaptureError::TempWrite)
}

fn write_working_image(
    source: CaptureSource,
    raw_copy: Option<PathBuf>,
) -> Result<TempPath, CaptureError> {
    match source {
        CaptureSource::Screen { image, region } => {
            let CapturedImage {
                width,
                height,
                rgba,
            } = image;
            let image = RgbaImage::from_raw(width, height, rgba)
                .map(DynamicImage::ImageRgba8)
                .ok_or(CaptureError::InvalidCapture { width, height })?;
            tracing::info!(
                "Captured {}x{} region at ({}, {})",
                region.width,
                region.height,
                region.x,
                region.y
            );

            if let Some(path) = raw_copy {
                image
                    .save_with_format(&path, ImageFormat::Png)
                    .map_err(|source| CaptureError::Encode {
                        path: path.clone(),
                        source,
                    })?;
                tracing::info!("Captured image saved to '{}'", path.display());
            }

            let working = temp_image(".png")?;
            image
                .save_with_format(&working, ImageFormat::Png)
                .map_err(|source| CaptureError::Encode {
                    path: working.to_path_buf(),
                    source,
                })?;
            Ok(working)
        }
        CaptureSource::File(path) => {
            tracing::info!("Opening image '{}'", path.display());
            let suffix = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| format!(".{ext}"))
                .unwrap_or_default();

            let working = temp_image(&suffix)?;
            fs::copy(&path, &working)
                .map_err(|source| CaptureError::ReadSource { path, source })?;
            Ok(working)
        }
    }
}

fn enhanced_name(working: &Path, stamp: &str) -> String {
    let ext = working
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("png");
    format!("{stamp}_enhanced.{ext}")
}

/// Keep the working image at `destination`, or delete it.
fn finish_working_image(
    working: TempPath,
    destination: Option<PathBuf>,
) -> Result<(), CaptureError> {
    let Some(destination) = destination else {
        if let Err(e) = working.close() {
            tracing::warn!("Failed to delete temporary image: {e}");
        }
        return Ok(());
    };

    if let Err(e) = working.persist(&destination) {
        // Rename fails across filesystems; the temp file is removed when `e` drops
        fs::copy(&e.path, &destination).map_err(|source| CaptureError::SaveImage {
            path: destination.clone(),
            source,
        })?;
    }
    tracing::info!("Enhanced image saved to '{}'", destination.display());
    Ok(())
}
