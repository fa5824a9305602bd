use std::error::Error;

use crate::body::ResponseBody;
use crate::error::ErrorKind;
use crate::message::ChatRequest;

/// The error type for a chat transport.
pub trait TransportError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A type that can open one request/response exchange with the chat
/// backend.
///
/// Once the transport is created, it should behave like a stateless
/// object. It can still have internal state (a connection pool, for
/// example), but callers should not rely on it, and the transport should
/// be prepared for being dropped anytime.
pub trait ChatTransport: Send + Sync {
    /// The error type that may be returned by the transport.
    type Error: TransportError;

    /// The streamed response body type for this transport.
    type Body: ResponseBody<Error = Self::Error>;

    /// Opens an exchange.
    ///
    /// The returned future resolves once the response status is known. A
    /// non-success status must resolve to an error of kind
    /// [`ErrorKind::Rejected`] without reading the body.
    fn open(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<Self::Body, Self::Error>> + Send + 'static;
}
