use std::future::poll_fn;
use std::pin::pin;

use chat_widget_model::{
    ErrorKind, Message, MessageKind, ResponseBody, TransportError,
};

use super::decoder::{ChunkDecoder, ProtocolRecord};

/// Content of the terminal message when the backend rejects a request.
pub const REJECTED_MESSAGE: &str =
    "Error: Unable to get response from assistant.";

/// Content of the terminal message when the exchange fails in transit.
pub const FAILURE_MESSAGE: &str = "Error: Failed to connect to the assistant.";

/// How an exchange terminated, along with the terminal message that was
/// emitted for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The body was read to the end.
    Completed(Message),
    /// The backend answered with a non-success status.
    Rejected(Message),
    /// Connecting or reading failed.
    Failed(Message),
}

impl Outcome {
    /// Returns the terminal message.
    #[inline]
    pub fn message(&self) -> &Message {
        match self {
            Outcome::Completed(msg)
            | Outcome::Rejected(msg)
            | Outcome::Failed(msg) => msg,
        }
    }

    /// Converts the outcome into its terminal message.
    #[inline]
    pub fn into_message(self) -> Message {
        match self {
            Outcome::Completed(msg)
            | Outcome::Rejected(msg)
            | Outcome::Failed(msg) => msg,
        }
    }

    fn from_error_kind(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Rejected => Outcome::Rejected(Message::assistant(
                MessageKind::Text,
                REJECTED_MESSAGE,
                true,
            )),
            ErrorKind::Failure => Outcome::Failed(Message::assistant(
                MessageKind::Text,
                FAILURE_MESSAGE,
                true,
            )),
        }
    }
}

struct StreamState {
    decoder: ChunkDecoder,
    content: String,
    kind: MessageKind,
    saw_tool_calls: bool,
}

/// Folds the records of one response stream into snapshots of the
/// assistant message.
///
/// Every record with non-empty content appends to the message and yields
/// an incomplete snapshot. The message starts as [`MessageKind::Text`],
/// and is upgraded to [`MessageKind::ToolCalls`] for good as soon as a
/// tool calls record shows up, even if more text records follow.
///
/// One aggregator handles exactly one exchange.
pub struct StreamAggregator {
    state: StreamState,
}

impl Default for StreamAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamAggregator {
    /// Creates an aggregator for a new exchange.
    #[inline]
    pub fn new() -> Self {
        Self {
            state: StreamState {
                decoder: ChunkDecoder::new(),
                content: String::new(),
                kind: MessageKind::Text,
                saw_tool_calls: false,
            },
        }
    }

    /// Returns the current kind of the message.
    #[inline]
    pub fn kind(&self) -> MessageKind {
        self.state.kind
    }

    /// Returns the content accumulated so far.
    #[inline]
    pub fn content(&self) -> &str {
        &self.state.content
    }

    /// Feeds one raw body fragment, emitting a snapshot for each record
    /// that carries content.
    pub fn push_fragment<F>(&mut self, fragment: &[u8], on_snapshot: &mut F)
    where
        F: FnMut(Message),
    {
        for record in self.state.decoder.decode(fragment) {
            if let Some(snapshot) = self.apply(record) {
                on_snapshot(snapshot);
            }
        }
    }

    /// Flushes the decoder and emits the terminal snapshot.
    pub fn finish<F>(mut self, on_snapshot: &mut F) -> Message
    where
        F: FnMut(Message),
    {
        if let Some(record) = self.state.decoder.finish() {
            if let Some(snapshot) = self.apply(record) {
                on_snapshot(snapshot);
            }
        }

        let StreamState { content, kind, .. } = self.state;
        let terminal = Message::assistant(kind, content, true);
        on_snapshot(terminal.clone());
        terminal
    }

    fn apply(&mut self, record: ProtocolRecord) -> Option<Message> {
        trace!("got a record: {record:?}");
        let content = match record {
            ProtocolRecord::Text(content) => content,
            ProtocolRecord::ToolCalls(content) => {
                if !self.state.saw_tool_calls {
                    debug!("upgrading message to tool calls");
                    self.state.saw_tool_calls = true;
                    self.state.kind = MessageKind::ToolCalls;
                }
                content
            }
            ProtocolRecord::Start
            | ProtocolRecord::End
            | ProtocolRecord::Unknown => return None,
        };

        let content = content.filter(|c| !c.is_empty())?;
        self.state.content.push_str(&content);
        Some(Message::assistant(
            self.state.kind,
            self.state.content.clone(),
            false,
        ))
    }

    /// Drives an opened exchange to its end.
    ///
    /// `opened` is the result of opening the exchange. If it is an error,
    /// a single terminal error snapshot is emitted and no body is read.
    /// Otherwise the body is read fragment by fragment, and a terminal
    /// snapshot is emitted once it is exhausted or reading fails.
    ///
    /// Exactly one terminal snapshot (`complete == true`) is emitted, and
    /// it is always the last one.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe. Dropping the future stops reading the
    /// body, and no further snapshots are emitted.
    pub async fn run<B, F>(
        mut self,
        opened: Result<B, B::Error>,
        mut on_snapshot: F,
    ) -> Outcome
    where
        B: ResponseBody,
        F: FnMut(Message),
    {
        let body = match opened {
            Ok(body) => body,
            Err(err) => {
                error!("failed to open the exchange: {err}");
                return self.fail(err.kind(), &mut on_snapshot);
            }
        };

        let mut body = pin!(body);
        loop {
            let fragment_or_err =
                poll_fn(|cx| body.as_mut().poll_next_fragment(cx)).await;
            let fragment = match fragment_or_err {
                Ok(Some(fragment)) => fragment,
                Ok(None) => break,
                Err(err) => {
                    error!("failed to read the response: {err}");
                    // Read errors are failures regardless of their kind.
                    return self.fail(ErrorKind::Failure, &mut on_snapshot);
                }
            };
            trace!("got a fragment of {} bytes", fragment.len());
            self.push_fragment(&fragment, &mut on_snapshot);
        }

        trace!("response body exhausted");
        Outcome::Completed(self.finish(&mut on_snapshot))
    }

    fn fail<F>(self, kind: ErrorKind, on_snapshot: &mut F) -> Outcome
    where
        F: FnMut(Message),
    {
        if !self.state.content.is_empty() {
            debug!(
                "discarding {} bytes of partial content",
                self.state.content.len()
            );
        }
        let outcome = Outcome::from_error_kind(kind);
        on_snapshot(outcome.message().clone());
        outcome
    }
}
