use std::sync::Mutex;

use anyhow::{Context, anyhow};
use arboard::Clipboard;

/// Something text can be copied into.
trait TextTarget {
    fn set_text(&mut self, text: String) -> anyhow::Result<()>;
}

impl TextTarget for Clipboard {
    fn set_text(&mut self, text: String) -> anyhow::Result<()> {
        Clipboard::set_text(self, text).context("Failed to set clipboard text")
    }
}

type Opener = fn() -> anyhow::Result<Box<dyn TextTarget>>;

fn open_system() -> anyhow::Result<Box<dyn TextTarget>> {
    let clipboard = Clipboard::new().context("Failed to open clipboard")?;
    Ok(Box::new(clipboard))
}

struct CopyRequest {
    text: String,
    reply: kanal::Sender<anyhow::Result<()>>,
}

/// Copies text to the system clipboard from one long-lived handle.
///
/// On X11 and Wayland the owner of the selection has to stay alive to serve
/// paste requests, so the handle lives on a dedicated thread, opened on the
/// first copy and kept until the writer is dropped. A handle that fails to
/// set text is discarded and reopened next time.
pub struct ClipboardWriter {
    open: Opener,
    requests: Mutex<Option<kanal::Sender<CopyRequest>>>,
}

impl Default for ClipboardWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardWriter {
    pub fn new() -> Self {
        Self::with_opener(open_system)
    }

    fn with_opener(open: Opener) -> Self {
        Self {
            open,
            requests: Mutex::new(None),
        }
    }

    /// Replace the system clipboard contents with `text`.
    pub fn copy_text(&self, text: &str) -> anyhow::Result<()> {
        let requests = self.worker()?;
        let (reply, replies) = kanal::bounded(1);
        let request = CopyRequest {
            text: text.to_owned(),
            reply,
        };

        if requests.send(request).is_err() {
            self.reset();
            return Err(anyhow!("Clipboard thread has stopped"));
        }
        let Ok(result) = replies.recv() else {
            self.reset();
            return Err(anyhow!("Clipboard thread has stopped"));
        };
        result?;

        tracing::info!("Text successfully copied to clipboard");
        Ok(())
    }

    fn worker(&self) -> anyhow::Result<kanal::Sender<CopyRequest>> {
        let mut slot = self
            .requests
            .lock()
            .map_err(|_| anyhow!("Clipboard writer lock poisoned"))?;
        if let Some(requests) = slot.as_ref() {
            return Ok(requests.clone());
        }

        let (requests, incoming) = kanal::unbounded();
        let open = self.open;
        std::thread::Builder::new()
            .name("clipboard".to_string())
            .spawn(move || serve(open, incoming))
            .context("Failed to start clipboard thread")?;

        *slot = Some(requests.clone());
        Ok(requests)
    }

    fn reset(&self) {
        if let Ok(mut slot) = self.requests.lock() {
            *slot = None;
        }
    }
}

fn serve(open: Opener, incoming: kanal::Receiver<CopyRequest>) {
    let mut held: Option<Box<dyn TextTarget>> = None;
    while let Ok(CopyRequest { text, reply }) = incoming.recv() {
        let result = copy_with(&mut held, open, text);
        let _ = reply.send(result);
    }
    tracing::debug!("Clipboard writer stopped");
}

fn copy_with(
    held: &mut Option<Box<dyn TextTarget>>,
    open: Opener,
    text: String,
) -> anyhow::Result<()> {
    let mut target = match held.take() {
        Some(target) => target,
        None => open()?,
    };
    target.set_text(text)?;
    *held = Some(target);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static OPENED: AtomicUsize = AtomicUsize::new(0);
    static FAILING_OPENED: AtomicUsize = AtomicUsize::new(0);

    struct Counting;

    impl TextTarget for Counting {
        fn set_text(&mut self, text: String) -> anyhow::Result<()> {
            if text.is_empty() {
                return Err(anyhow!("refused empty text"));
            }
            Ok(())
        }
    }

    fn open_counting() -> anyhow::Result<Box<dyn TextTarget>> {
        OPENED.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(Counting))
    }

    fn open_failing() -> anyhow::Result<Box<dyn TextTarget>> {
        FAILING_OPENED.fetch_add(1, Ordering::SeqCst);
        Err(anyhow!("no display"))
    }

    #[test]
    fn test_handle_is_reused_between_copies() {
        let writer = ClipboardWriter::with_opener(open_counting);
        writer.copy_text("first").unwrap();
        writer.copy_text("second").unwrap();
        assert_eq!(OPENED.load(Ordering::SeqCst), 1);

        // A failed copy drops the handle, the next one opens a fresh handle
        assert!(writer.copy_text("").is_err());
        writer.copy_text("third").unwrap();
        assert_eq!(OPENED.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_open_failure_is_reported_each_time() {
        let writer = ClipboardWriter::with_opener(open_failing);
        let err = writer.copy_text("text").unwrap_err();
        assert!(err.to_string().contains("no display"));
        assert!(writer.copy_text("text").is_err());
        assert_eq!(FAILING_OPENED.load(Ordering::SeqCst), 2);
    }

    #[test]
    #[ignore = "needs a desktop session with a clipboard"]
    fn test_copy_reaches_system_clipboard() {
        let writer = ClipboardWriter::new();
        writer.copy_text("textsnap clipboard check").unwrap();
        let mut reader = Clipboard::new().unwrap();
        assert_eq!(reader.get_text().unwrap(), "textsnap clipboard check");
    }
}
