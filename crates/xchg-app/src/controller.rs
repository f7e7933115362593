use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use xchg_types::AppEvent;

use crate::events::event_loop;
use crate::io::console_input;
use crate::sampler::sampler_loop;
use crate::state::AppState;
use crate::ui::ui_loop;

/// Centralized channel management
pub struct ChannelSet {
    /// Snapshots and status lines for the console
    pub app_to_ui: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
    /// Samples from the sampler, commands from stdin
    pub to_app: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
    /// Out-of-band tick requests; one pending request is enough
    pub tick_requests: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            app_to_ui: kanal::bounded_async(64),
            to_app: kanal::bounded_async(64),
            tick_requests: kanal::bounded_async(1),
        }
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    state: Arc<AppState>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            channels: ChannelSet::new(),
            state,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn spawn_tasks(&self) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        // Event loop; owns the session and may cancel everything on `quit`
        tasks.spawn(event_loop(
            self.state.clone(),
            self.channels.to_app.1.clone(),
            self.channels.app_to_ui.0.clone(),
            self.channels.tick_requests.0.clone(),
            self.cancel_token.clone(),
        ));

        // Sampler
        tasks.spawn(sampler_loop(
            self.state.clone(),
            self.channels.tick_requests.1.clone(),
            self.channels.to_app.0.clone(),
            self.cancel_token.child_token(),
        ));

        // Console display
        tasks.spawn(ui_loop(
            self.channels.app_to_ui.1.clone(),
            self.cancel_token.child_token(),
        ));

        // Stdin commands
        tasks.spawn(console_input(
            self.channels.to_app.0.clone(),
            self.cancel_token.child_token(),
        ));

        tasks
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
