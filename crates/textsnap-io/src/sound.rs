use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{Context, bail};

/// Single-quoted PowerShell string literal; embedded quotes are doubled.
fn powershell_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

fn player_command(path: &Path) -> Command {
    if cfg!(target_os = "windows") {
        let mut command = Command::new("powershell");
        command.args([
            "-NoProfile",
            "-Command",
            &format!(
                "(New-Object Media.SoundPlayer {}).PlaySync()",
                powershell_literal(&path.to_string_lossy())
            ),
        ]);
        command
    } else if cfg!(target_os = "macos") {
        let mut command = Command::new("afplay");
        command.arg(path);
        command
    } else {
        let mut command = Command::new("paplay");
        command.arg(path);
        command
    }
}

/// Start playing `path` in the background. The file must exist.
pub fn play_sound(path: &Path) -> Result<(), anyhow::Error> {
    if !path.is_file() {
        bail!("Sound file not found: '{}'", path.display());
    }

    let mut child = player_command(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("Failed to start audio player for '{}'", path.display()))?;

    // Reap the player once it is done
    std::thread::spawn(move || {
        if let Err(e) = child.wait() {
            tracing::warn!("Audio player did not exit cleanly: {e}");
        }
    });

    tracing::debug!("Playing sound '{}'", path.display());
    Ok(())
}
