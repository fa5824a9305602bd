use chat_widget_core::{
    ConversationStore, ConversationStoreBuilder, WidgetState,
};
use chat_widget_http::{HttpConfig, HttpTransport};
use chat_widget_model::{
    Rating, RelevanceFeedback, Role, SatisfactionFeedback,
};
use tokio::sync::watch;

/// A widget builder.
///
/// See [`Widget`].
pub struct WidgetBuilder {
    config: HttpConfig,
    on_idle: Option<Box<dyn Fn() + Send + Sync>>,
}

impl WidgetBuilder {
    /// Creates a widget builder talking to the backend described by
    /// `config`.
    #[inline]
    pub fn with_config(config: HttpConfig) -> Self {
        Self {
            config,
            on_idle: None,
        }
    }

    /// Attaches a callback to be invoked when a response terminates.
    #[inline]
    pub fn on_idle(
        mut self,
        on_idle: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.on_idle = Some(Box::new(on_idle));
        self
    }

    /// Builds a new widget.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn build(self) -> Widget {
        let transport = HttpTransport::new(self.config);
        let mut store_builder =
            ConversationStoreBuilder::with_transport(transport.clone());
        if let Some(on_idle) = self.on_idle {
            store_builder = store_builder.on_idle(on_idle);
        }

        Widget {
            store: store_builder.build(),
            transport,
        }
    }
}

/// A chat widget, like a floating window that displays messages and has
/// an input box.
///
/// The widget owns a [`ConversationStore`] bound to the HTTP backend, and
/// also sends the feedback that users give about the conversation.
/// Feedback is fire-and-forget: failures are logged and never surface.
pub struct Widget {
    store: ConversationStore,
    transport: HttpTransport,
}

impl Widget {
    /// Sends a message typed by the user, as typed. Blank messages are
    /// ignored.
    pub fn send_message(&self, message: &str) {
        if message.trim().is_empty() {
            debug!("ignoring a blank message");
            return;
        }
        self.store.submit(message);
    }

    /// Closes the widget, abandoning the response being streamed.
    #[inline]
    pub fn close(&self) {
        self.store.cancel();
    }

    /// Returns a snapshot of the current state.
    #[inline]
    pub fn state(&self) -> WidgetState {
        self.store.state()
    }

    /// Returns a receiver that is notified whenever the state changes.
    #[inline]
    pub fn subscribe(&self) -> watch::Receiver<WidgetState> {
        self.store.subscribe()
    }

    /// Rates the whole conversation.
    pub fn rate(&self, rating: Rating) {
        let send_fut = self
            .transport
            .send_satisfaction(&SatisfactionFeedback::now(rating));
        tokio::spawn(async move {
            match send_fut.await {
                Ok(()) => debug!("sent rating: {}", rating.name()),
                Err(err) => error!("failed to send rating: {err}"),
            }
        });
    }

    /// Marks whether the assistant message at `index` was relevant.
    ///
    /// Returns `false` without sending anything if `index` does not name
    /// a complete assistant message.
    pub fn mark_relevance(&self, index: usize, is_relevant: bool) -> bool {
        let rateable = self
            .store
            .state()
            .conversation
            .get(index)
            .is_some_and(|msg| msg.role == Role::Assistant && msg.complete);
        if !rateable {
            warn!("message {index} cannot be marked for relevance");
            return false;
        }

        let send_fut = self
            .transport
            .send_relevance(&RelevanceFeedback::now(index, is_relevant));
        tokio::spawn(async move {
            if let Err(err) = send_fut.await {
                error!("failed to send relevance feedback: {err}");
            }
        });
        true
    }
}
