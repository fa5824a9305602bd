use std::pin::Pin;
use std::sync::Arc;

use chat_widget_model::{ChatRequest, ChatTransport, Message};
use tracing::Instrument;

use crate::stream::{Outcome, StreamAggregator};

type BoxedExchangeFuture = Pin<Box<dyn Future<Output = Outcome> + Send>>;
type SnapshotFn = Box<dyn FnMut(Message) + Send + 'static>;
type HandlerFn =
    Arc<dyn Fn(ChatRequest, SnapshotFn) -> BoxedExchangeFuture + Send + Sync>;

/// A wrapper around a transport that runs whole exchanges and provides a
/// type-erased interface for the other modules.
#[derive(Clone)]
pub struct TransportClient {
    handler_fn: HandlerFn,
}

impl TransportClient {
    #[inline]
    pub fn new<T: ChatTransport + 'static>(transport: T) -> Self {
        // We have to erase the type `T`, since `TransportClient` doesn't
        // have a generic parameter and we don't want it either.
        let handler_fn: HandlerFn = Arc::new(move |req, on_snapshot| {
            let fut = transport.open(&req);
            Box::pin(
                async move {
                    trace!("opening an exchange: {req:?}");
                    let opened = fut.await;
                    let outcome =
                        StreamAggregator::new().run(opened, on_snapshot).await;
                    trace!("finished an exchange");
                    outcome
                }
                .instrument(trace_span!("transport client exchange")),
            )
        });
        Self { handler_fn }
    }

    /// Runs one exchange, reporting every snapshot of the assistant
    /// message to `on_snapshot`.
    ///
    /// # Cancel safety
    ///
    /// The returned future is cancel safe. Dropping it stops reading the
    /// response, and `on_snapshot` will not be called again.
    #[inline]
    pub fn exchange(
        &self,
        req: ChatRequest,
        on_snapshot: impl FnMut(Message) + Send + 'static,
    ) -> impl Future<Output = Outcome> + Send + 'static {
        (self.handler_fn)(req, Box::new(on_snapshot))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chat_widget_model::MessageKind;
    use chat_widget_test_transport::{
        PresetExchange, PresetStream, TestTransport,
    };

    use super::*;
    use crate::stream::REJECTED_MESSAGE;

    #[tokio::test]
    async fn test_exchange() {
        let mut transport = TestTransport::default();
        transport.add_exchange(PresetExchange::Stream(
            PresetStream::with_records([
                ("text", Some("How ")),
                ("text", Some("are ")),
                ("text", Some("you?")),
            ]),
        ));
        transport.add_exchange(PresetExchange::Rejected);
        let client = TransportClient::new(transport);

        let snapshots = Arc::new(Mutex::new(Vec::new()));
        let outcome = client
            .exchange(
                ChatRequest {
                    messages: vec![Message::user("Hi")],
                },
                {
                    let snapshots = Arc::clone(&snapshots);
                    move |msg| snapshots.lock().unwrap().push(msg)
                },
            )
            .await;
        assert_eq!(
            outcome,
            Outcome::Completed(Message::assistant(
                MessageKind::Text,
                "How are you?",
                true
            ))
        );
        assert_eq!(snapshots.lock().unwrap().len(), 4);

        let outcome = client
            .exchange(
                ChatRequest {
                    messages: vec![
                        Message::user("Hi"),
                        outcome.into_message(),
                        Message::user("Still there?"),
                    ],
                },
                |_| {},
            )
            .await;
        assert_eq!(outcome.message().content, REJECTED_MESSAGE);
    }
}
