use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use textsnap_types::AppEvent;
use tokio_util::sync::CancellationToken;

use crate::capture::{CaptureSource, Orchestrator};

pub mod download_language;
pub mod trigger_capture;

use download_language::handle_download;
use trigger_capture::handle_capture_trigger;

/// App's main loop
pub async fn event_loop(
    orchestrator: Arc<Orchestrator>,
    cancel: CancellationToken,
    ui_to_app_rx: AsyncReceiver<AppEvent>,
    app_to_ui_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let mut active_download: Option<CancellationToken> = None;

    tracing::info!("[EVENT_LOOP] Starting main loop, waiting for events");
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = ui_to_app_rx.recv() => event?,
        };

        tracing::debug!("[EVENT_LOOP] Event received: {:?}", std::mem::discriminant(&event));
        match event {
            AppEvent::TriggerCapture { image, region } => {
                handle_capture_trigger(
                    orchestrator.clone(),
                    CaptureSource::Screen { image, region },
                    app_to_ui_tx.clone(),
                );
            }
            AppEvent::OpenFile(path) => {
                handle_capture_trigger(
                    orchestrator.clone(),
                    CaptureSource::File(path),
                    app_to_ui_tx.clone(),
                );
            }
            AppEvent::DownloadLanguage(code) => {
                if let Some(previous) = active_download.take() {
                    previous.cancel();
                }
                let token = cancel.child_token();
                handle_download(
                    orchestrator.state().clone(),
                    code,
                    token.clone(),
                    app_to_ui_tx.clone(),
                );
                active_download = Some(token);
            }
            AppEvent::CancelDownload => match active_download.take() {
                Some(token) => token.cancel(),
                None => tracing::debug!("No download to cancel"),
            },
            AppEvent::ShowResult { .. }
            | AppEvent::StatusUpdate { .. }
            | AppEvent::DownloadProgress { .. }
            | AppEvent::DownloadFinished { .. } => {
                // UI-only event, ignore in backend
            }
        }
    }

    if let Some(token) = active_download {
        token.cancel();
    }
    tracing::info!("[EVENT_LOOP] Stopped");
    Ok(())
}
