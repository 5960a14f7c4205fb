use std::sync::atomic::{AtomicBool, Ordering};

use textsnap_config::{Config, ConfigStore};

pub struct AppState {
    pub store: ConfigStore,
    capture_running: AtomicBool,
}

/// Held for the duration of one capture. Dropping it frees the slot.
#[derive(Debug)]
pub struct CaptureGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for CaptureGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl AppState {
    pub fn new(store: ConfigStore) -> Self {
        Self {
            store,
            capture_running: AtomicBool::new(false),
        }
    }

    /// Fresh configuration snapshot for one operation.
    pub fn config(&self) -> Config {
        self.store.load()
    }

    /// Claim the single capture slot, or `None` if a capture is in flight.
    pub fn begin_capture(&self) -> Option<CaptureGuard<'_>> {
        if self
            .capture_running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("Capture already in progress, ignoring trigger");
            return None;
        }

        Some(CaptureGuard {
            flag: &self.capture_running,
        })
    }

    pub fn is_capturing(&self) -> bool {
        self.capture_running.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(ConfigStore::new(dir.path().join("config.json")));
        (dir, state)
    }

    #[test]
    fn test_second_capture_rejected_while_first_runs() {
        let (_dir, state) = state();

        let guard = state.begin_capture();
        assert!(guard.is_some());
        assert!(state.is_capturing());
        assert!(state.begin_capture().is_none());

        drop(guard);
        assert!(!state.is_capturing());
        assert!(state.begin_capture().is_some());
    }

    #[test]
    fn test_config_snapshot_is_complete() {
        let (_dir, state) = state();
        assert_eq!(state.config(), Config::default());
        assert!(state.store.path().exists());
    }
}
