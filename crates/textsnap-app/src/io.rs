use std::io::BufRead;
use std::path::PathBuf;

use kanal::{AsyncReceiver, AsyncSender};
use textsnap_types::AppEvent;
use tokio_util::sync::CancellationToken;

/// One request line from the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    Open(PathBuf),
    Download(String),
    CancelDownload,
    Quit,
}

impl HostCommand {
    /// Event for the loop; `None` ends the input.
    pub fn into_event(self) -> Option<AppEvent> {
        match self {
            HostCommand::Open(path) => Some(AppEvent::OpenFile(path)),
            HostCommand::Download(code) => Some(AppEvent::DownloadLanguage(code)),
            HostCommand::CancelDownload => Some(AppEvent::CancelDownload),
            HostCommand::Quit => None,
        }
    }
}

/// `open <path>`, `download <code>`, `cancel` or `quit`.
pub fn parse_command(line: &str) -> Option<HostCommand> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match (verb, rest) {
        ("open", path) if !path.is_empty() => Some(HostCommand::Open(PathBuf::from(path))),
        ("download", code) if !code.is_empty() => Some(HostCommand::Download(code.to_string())),
        ("cancel", "") => Some(HostCommand::CancelDownload),
        ("quit" | "exit", "") => Some(HostCommand::Quit),
        _ => None,
    }
}

/// Read stdin on a plain thread so a pending read never holds up runtime
/// shutdown. The channel closes at end of input.
pub fn spawn_stdin_reader() -> AsyncReceiver<String> {
    let (tx, rx) = kanal::bounded(16);

    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to read host input: {e}");
                    break;
                }
            }
        }
    });

    rx.to_async()
}

/// Forward host request lines to the event loop.
pub async fn host_input(
    lines: AsyncReceiver<String>,
    cancel: CancellationToken,
    ui_to_app_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.recv() => line,
        };

        let Ok(line) = line else {
            tracing::info!("Host input closed");
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let Some(command) = parse_command(&line) else {
            tracing::warn!("Unknown command: '{}'", line.trim());
            continue;
        };
        match command.into_event() {
            Some(event) => ui_to_app_tx.send(event).await?,
            None => break,
        }
    }

    Ok(())
}
