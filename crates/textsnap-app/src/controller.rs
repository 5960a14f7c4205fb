use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use textsnap_types::AppEvent;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::capture::Orchestrator;
use crate::events::event_loop;
use crate::io::{host_input, spawn_stdin_reader};
use crate::ui::host_output;

/// Centralized channel management
pub struct ChannelSet {
    pub app_to_ui: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
    pub ui_to_app: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            app_to_ui: kanal::bounded_async(256), // results and download progress
            ui_to_app: kanal::bounded_async(64),  // host requests
        }
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(channels: ChannelSet) -> Self {
        Self {
            channels,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Where the display sink publishes results.
    pub fn app_to_ui_sender(&self) -> AsyncSender<AppEvent> {
        self.channels.app_to_ui.0.clone()
    }

    pub fn ui_to_app_sender(&self) -> AsyncSender<AppEvent> {
        self.channels.ui_to_app.0.clone()
    }

    pub fn app_to_ui_receiver(&self) -> AsyncReceiver<AppEvent> {
        self.channels.app_to_ui.1.clone()
    }

    /// Event loop only; the host talks to the channels directly.
    pub fn spawn_event_loop(
        &self,
        orchestrator: Arc<Orchestrator>,
        tasks: &mut JoinSet<anyhow::Result<()>>,
    ) {
        tasks.spawn(event_loop(
            orchestrator,
            self.cancel_token.child_token(),
            self.channels.ui_to_app.1.clone(),
            self.channels.app_to_ui.0.clone(),
        ));
    }

    /// Event loop plus a line-based host on stdin/stdout.
    pub fn spawn_tasks(&self, orchestrator: Arc<Orchestrator>) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        self.spawn_event_loop(orchestrator, &mut tasks);

        tasks.spawn(host_output(
            self.app_to_ui_receiver(),
            self.cancel_token.child_token(),
        ));

        tasks.spawn(host_input(
            spawn_stdin_reader(),
            self.cancel_token.child_token(),
            self.ui_to_app_sender(),
        ));

        tasks
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
