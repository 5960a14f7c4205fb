use std::sync::Arc;

use kanal::AsyncSender;
use textsnap_types::AppEvent;

use crate::capture::{CaptureError, CaptureSource, Orchestrator};

/// Run the capture in its own task so the loop keeps receiving; a trigger
/// arriving meanwhile is refused by the single-flight guard.
pub fn handle_capture_trigger(
    orchestrator: Arc<Orchestrator>,
    source: CaptureSource,
    app_to_ui_tx: AsyncSender<AppEvent>,
) {
    tokio::spawn(async move {
        let announce = async {
            let _ = app_to_ui_tx
                .send(AppEvent::StatusUpdate {
                    status: "Capturing".to_string(),
                    capturing: true,
                })
                .await;
        };

        let status = match orchestrator.run_announced(source, announce).await {
            Ok(result) if result.extracted_text.trim().is_empty() => "No text found".to_string(),
            Ok(result) => {
                tracing::debug!(">>> [OCR] Got text: {} chars", result.extracted_text.len());
                "Ready".to_string()
            }
            Err(CaptureError::Busy) => {
                tracing::warn!("Capture rejected, another one is running");
                return;
            }
            Err(e) => {
                tracing::error!(">>> [OCR] Failed: {e}");
                format!("Failed: {e}")
            }
        };

        let _ = app_to_ui_tx
            .send(AppEvent::StatusUpdate {
                status,
                capturing: false,
            })
            .await;
    });
}
