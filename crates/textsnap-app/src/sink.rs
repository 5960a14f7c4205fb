use std::path::Path;

use kanal::AsyncSender;
use textsnap_io::ClipboardWriter;
use textsnap_types::{AppEvent, CaptureId, RecognitionResult};

/// Side effects of a finished capture.
pub trait OutputSink: Send + Sync {
    fn copy_to_clipboard(&self, text: &str) -> anyhow::Result<()>;

    fn play_sound(&self, path: &Path) -> anyhow::Result<()>;

    /// Hand the result to whatever shows the popup.
    fn display(&self, id: CaptureId, result: &RecognitionResult);
}

/// System clipboard, audio player and (optionally) the host UI channel.
#[derive(Default)]
pub struct DesktopSink {
    clipboard: ClipboardWriter,
    app_to_ui_tx: Option<AsyncSender<AppEvent>>,
}

impl DesktopSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_display(app_to_ui_tx: AsyncSender<AppEvent>) -> Self {
        Self {
            clipboard: ClipboardWriter::new(),
            app_to_ui_tx: Some(app_to_ui_tx),
        }
    }
}

impl OutputSink for DesktopSink {
    fn copy_to_clipboard(&self, text: &str) -> anyhow::Result<()> {
        self.clipboard.copy_text(text)
    }

    fn play_sound(&self, path: &Path) -> anyhow::Result<()> {
        textsnap_io::play_sound(path)
    }

    fn display(&self, id: CaptureId, result: &RecognitionResult) {
        let Some(tx) = &self.app_to_ui_tx else {
            tracing::debug!("No display attached, result of capture {id} not shown");
            return;
        };

        let event = AppEvent::ShowResult {
            id,
            result: result.clone(),
        };
        match tx.try_send(event) {
            Ok(true) => {}
            Ok(false) => tracing::warn!("Display channel full, dropping result of capture {id}"),
            Err(e) => tracing::warn!("Display channel closed: {e}"),
        }
    }
}
