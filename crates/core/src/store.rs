mod builder;
mod state;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::Instrument;

use crate::conversation::Conversation;
pub use builder::ConversationStoreBuilder;
use state::{Command, StoreState, run_store};

/// A read-only view of the store, published to the rendering layer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WidgetState {
    /// The messages, oldest first.
    pub conversation: Conversation,
    /// Whether an exchange is in flight.
    pub loading: bool,
}

struct Mailbox {
    cmd_tx: mpsc::UnboundedSender<Command>,
    kill_tx: watch::Sender<bool>,
}

impl Mailbox {
    #[inline]
    fn send(&self, cmd: Command) {
        if self.cmd_tx.send(cmd).is_err() {
            error!("the store task has stopped, dropping the command");
        }
    }
}

impl Drop for Mailbox {
    fn drop(&mut self) {
        self.kill_tx.send(true).ok();
    }
}

/// The owner of a conversation.
///
/// The store runs as a background task that owns the messages and the
/// loading flag. Handles only send commands to it, and observe its state
/// through [`WidgetState`] snapshots. Commands are handled in the order
/// they are sent.
///
/// Only one exchange is in flight at a time. Submitting while a response
/// is still streaming supersedes it: the pending assistant message is
/// frozen with the content received so far, and the old exchange can no
/// longer touch the conversation.
///
/// The store stops when the last handle is dropped, abandoning the
/// in-flight exchange if any.
#[derive(Clone)]
pub struct ConversationStore {
    mailbox: Arc<Mailbox>,
    state_rx: watch::Receiver<WidgetState>,
}

impl ConversationStore {
    fn spawn_from_builder(builder: ConversationStoreBuilder) -> Self {
        let ConversationStoreBuilder { client, on_idle } = builder;

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (kill_tx, kill_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(WidgetState::default());

        let state = StoreState::new(client, cmd_tx.clone(), state_tx, on_idle);
        tokio::spawn(
            run_store(state, cmd_rx, kill_rx)
                .instrument(debug_span!("conversation store")),
        );

        Self {
            mailbox: Arc::new(Mailbox { cmd_tx, kill_tx }),
            state_rx,
        }
    }

    /// Submits a user message and starts streaming the response.
    pub fn submit<S: Into<String>>(&self, content: S) {
        self.mailbox.send(Command::Submit(content.into()));
    }

    /// Abandons the in-flight exchange, if any.
    ///
    /// The pending assistant message keeps the content received so far
    /// and becomes complete.
    pub fn cancel(&self) {
        self.mailbox.send(Command::Cancel);
    }

    /// Returns a snapshot of the current state.
    #[inline]
    pub fn state(&self) -> WidgetState {
        self.state_rx.borrow().clone()
    }

    /// Returns whether an exchange is in flight.
    #[inline]
    pub fn is_loading(&self) -> bool {
        self.state_rx.borrow().loading
    }

    /// Returns a receiver that is notified whenever the state changes.
    #[inline]
    pub fn subscribe(&self) -> watch::Receiver<WidgetState> {
        self.state_rx.clone()
    }
}
