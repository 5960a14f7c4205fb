use kanal::AsyncReceiver;
use serde_json::{Value, json};
use textsnap_types::AppEvent;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

/// JSON line for an app-to-host event, `None` for host-to-app events.
pub fn event_json(event: &AppEvent) -> Option<Value> {
    let value = match event {
        AppEvent::ShowResult { id, result } => json!({
            "event": "result",
            "id": id,
            "result": result,
        }),
        AppEvent::StatusUpdate { status, capturing } => json!({
            "event": "status",
            "status": status,
            "capturing": capturing,
        }),
        AppEvent::DownloadProgress { language, percent } => json!({
            "event": "download_progress",
            "language": language,
            "percent": percent,
        }),
        AppEvent::DownloadFinished { language, success } => json!({
            "event": "download_finished",
            "language": language,
            "success": success,
        }),
        AppEvent::TriggerCapture { .. }
        | AppEvent::OpenFile(_)
        | AppEvent::DownloadLanguage(_)
        | AppEvent::CancelDownload => return None,
    };
    Some(value)
}

/// Print results and status for the host, one JSON object per line.
pub async fn host_output(
    app_to_ui_rx: AsyncReceiver<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let mut stdout = tokio::io::stdout();

    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = app_to_ui_rx.recv() => event?,
        };

        if let Some(value) = event_json(&event) {
            stdout.write_all(format!("{value}\n").as_bytes()).await?;
            stdout.flush().await?;
        }
    }

    Ok(())
}
