use chat_widget_model::ChatTransport;

use super::ConversationStore;
use crate::transport_client::TransportClient;

/// [`ConversationStore`] builder.
pub struct ConversationStoreBuilder {
    pub(crate) client: TransportClient,
    pub(crate) on_idle: Option<Box<dyn Fn() + Send + Sync>>,
}

impl ConversationStoreBuilder {
    /// Creates a new builder with the specified transport.
    #[inline]
    pub fn with_transport<T: ChatTransport + 'static>(transport: T) -> Self {
        Self {
            client: TransportClient::new(transport),
            on_idle: None,
        }
    }

    /// Attaches a callback to be invoked when an exchange terminates.
    #[inline]
    pub fn on_idle(
        mut self,
        on_idle: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.on_idle = Some(Box::new(on_idle));
        self
    }

    /// Builds the store and spawns its task.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    #[inline]
    pub fn build(self) -> ConversationStore {
        ConversationStore::spawn_from_builder(self)
    }
}
