use std::pin::Pin;
use std::task::{self, Poll};

use bytes::Bytes;

use crate::transport::TransportError;

/// The streamed body of a successful response.
pub trait ResponseBody: Sized + Send + 'static {
    /// The error type that may be returned while reading.
    type Error: TransportError;

    /// Attempts to pull out the next raw fragment of the body.
    ///
    /// # Return value
    ///
    /// There are several possible return values, each indicating a
    /// distinct body state:
    ///
    /// - `Poll::Pending` means that the next fragment has not arrived
    ///   yet. Implementations will ensure that the current task will be
    ///   notified when it may be ready.
    /// - `Poll::Ready(Ok(Some(fragment)))` means a fragment has arrived.
    ///   Fragment boundaries carry no meaning: a fragment may hold
    ///   several records, or end in the middle of one.
    /// - `Poll::Ready(Ok(None))` means the body has been exhausted.
    /// - `Poll::Ready(Err(error))` means reading failed.
    ///
    /// Calling this method after exhaustion should always return `None`.
    fn poll_next_fragment(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> Poll<Result<Option<Bytes>, Self::Error>>;
}
