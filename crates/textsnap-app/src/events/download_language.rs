use std::path::PathBuf;
use std::sync::Arc;

use kanal::AsyncSender;
use textsnap_core::state::AppState;
use textsnap_ocr::TessdataDownloader;
use textsnap_types::AppEvent;
use tokio_util::sync::CancellationToken;

pub fn handle_download(
    state: Arc<AppState>,
    code: String,
    cancel: CancellationToken,
    app_to_ui_tx: AsyncSender<AppEvent>,
) {
    let directory = PathBuf::from(state.config().ocr.tessdata_path);

    tokio::spawn(async move {
        let downloader = TessdataDownloader::new(directory);
        let mut last_percent = None;

        let result = downloader
            .download(&code, &cancel, |progress| {
                let percent = progress.percent();
                if percent.is_some() && percent == last_percent {
                    return;
                }
                last_percent = percent;

                // Progress is best effort; a full channel just skips a tick
                let _ = app_to_ui_tx.try_send(AppEvent::DownloadProgress {
                    language: code.clone(),
                    percent,
                });
            })
            .await;

        let success = match result {
            Ok(path) => {
                tracing::info!("Language '{code}' installed at '{}'", path.display());
                true
            }
            Err(e) => {
                tracing::error!("Failed to download language '{code}': {e}");
                false
            }
        };

        let _ = app_to_ui_tx
            .send(AppEvent::DownloadFinished {
                language: code,
                success,
            })
            .await;
    });
}
