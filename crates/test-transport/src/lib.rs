//! A scripted in-memory transport for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::future::ready;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll, ready};
use std::time::Duration;

use bytes::Bytes;
use chat_widget_model::{
    ChatRequest, ChatTransport, ErrorKind, ResponseBody, Role,
    TransportError,
};
use tokio::time::{Sleep, sleep};

pub use preset::*;

const DEFAULT_DELAY: Duration = Duration::from_millis(1);

#[derive(Debug)]
pub struct Error {
    #[allow(dead_code)]
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

impl StdError for Error {}

impl TransportError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// A body that replays the fragments of a [`PresetStream`], sleeping
/// before each read.
pub struct TestBody {
    fragments: VecDeque<Bytes>,
    failure_after: Option<usize>,
    served: usize,
    delay: Duration,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl ResponseBody for TestBody {
    type Error = crate::Error;

    fn poll_next_fragment(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<Bytes>, Self::Error>> {
        let this = self.get_mut();

        if let Some(sleep) = &mut this.sleep {
            ready!(sleep.as_mut().poll(cx));
            this.sleep = None;

            if this.failure_after == Some(this.served) {
                return Poll::Ready(Err(Error {
                    message: "connection reset",
                    kind: ErrorKind::Failure,
                }));
            }
            let Some(fragment) = this.fragments.pop_front() else {
                return Poll::Ready(Ok(None));
            };
            this.served += 1;
            return Poll::Ready(Ok(Some(fragment)));
        }
        this.sleep = Some(Box::pin(sleep(this.delay)));
        Pin::new(this).poll_next_fragment(cx)
    }
}

/// A local fake transport for testing purpose.
///
/// Before opening exchanges, you need to setup the script, which is how
/// the backend should answer. The exchange is selected by the number of
/// user messages in the request: the first submit gets the first preset,
/// the second submit the second one, and so on. If there are no enough
/// presets, the exchange fails as if the backend were unreachable.
///
/// Clones share the log of received requests.
#[derive(Clone, Default)]
pub struct TestTransport {
    script: Vec<PresetExchange>,
    delay: Option<Duration>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl TestTransport {
    #[inline]
    pub fn add_exchange(&mut self, preset: PresetExchange) {
        self.script.push(preset);
    }

    /// Sets the default delay before each body read.
    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns the requests received so far.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ChatTransport for TestTransport {
    type Error = crate::Error;
    type Body = TestBody;

    fn open(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<Self::Body, Self::Error>> + Send + 'static
    {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(req.clone());

        let step_idx = req
            .messages
            .iter()
            .filter(|msg| msg.role == Role::User)
            .count()
            .saturating_sub(1);
        let result = match self.script.get(step_idx) {
            Some(PresetExchange::Stream(stream)) => Ok(TestBody {
                fragments: stream.fragments.iter().cloned().collect(),
                failure_after: stream.failure_after,
                served: 0,
                delay: stream
                    .delay
                    .or(self.delay)
                    .unwrap_or(DEFAULT_DELAY),
                sleep: None,
            }),
            Some(PresetExchange::Rejected) => Err(Error {
                message: "503 Service Unavailable",
                kind: ErrorKind::Rejected,
            }),
            Some(PresetExchange::Unreachable) => Err(Error {
                message: "connection refused",
                kind: ErrorKind::Failure,
            }),
            None => Err(Error {
                message: "no enough steps",
                kind: ErrorKind::Failure,
            }),
        };
        ready(result)
    }
}
