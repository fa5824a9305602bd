//! A chat transport talking to the widget backend over HTTP.

#[macro_use]
extern crate tracing;

mod body;
mod config;
mod proto;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use chat_widget_model::{
    ChatRequest, ChatTransport, ErrorKind, RelevanceFeedback,
    SatisfactionFeedback, TransportError,
};
use mime::Mime;
use reqwest::{Client, Response, header};
use serde::Serialize;

pub use body::HttpBody;
pub use config::{DEFAULT_BASE_URL, HttpConfig, HttpConfigBuilder};

/// Error type for [`HttpTransport`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    fn from_reqwest(err: reqwest::Error) -> Self {
        let kind = if err.is_status() {
            ErrorKind::Rejected
        } else {
            ErrorKind::Failure
        };
        Self::new(format!("{err}"), kind)
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl TransportError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// HTTP transport for the chat backend.
///
/// Besides chat exchanges, the transport also posts the feedback that
/// users give about the conversation.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    config: Arc<HttpConfig>,
}

impl HttpTransport {
    /// Creates a new `HttpTransport` with the given configuration.
    #[inline]
    pub fn new(config: HttpConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }

    /// Returns the configuration of this transport.
    #[inline]
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Posts a satisfaction rating to `/feedback`.
    pub fn send_satisfaction(
        &self,
        feedback: &SatisfactionFeedback,
    ) -> impl Future<Output = Result<(), Error>> + Send + 'static {
        self.post_json("/feedback", feedback)
    }

    /// Posts a relevance flag to `/feedback/response-relevance`.
    pub fn send_relevance(
        &self,
        feedback: &RelevanceFeedback,
    ) -> impl Future<Output = Result<(), Error>> + Send + 'static {
        self.post_json("/feedback/response-relevance", feedback)
    }

    fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> impl Future<Output = Result<(), Error>> + Send + 'static {
        let resp_fut = self
            .client
            .post(self.config.endpoint(path))
            .json(body)
            .send();
        async move {
            resp_fut
                .await
                .and_then(Response::error_for_status)
                .map(|_| ())
                .map_err(Error::from_reqwest)
        }
    }
}

impl ChatTransport for HttpTransport {
    type Error = Error;
    type Body = HttpBody;

    fn open(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<Self::Body, Self::Error>> + Send + 'static
    {
        let body = proto::create_request(req);
        let resp_fut = self
            .client
            .post(self.config.endpoint("/chat"))
            .header(header::ACCEPT, "text/event-stream")
            .json(&body)
            .send();

        async move {
            let resp = match resp_fut.await {
                Ok(resp) => resp,
                Err(err) => {
                    return Err(Error::new(
                        format!("{err}"),
                        ErrorKind::Failure,
                    ));
                }
            };

            // The body of a rejected exchange is never read.
            let status = resp.status();
            if !status.is_success() {
                return Err(Error::new(
                    format!("unexpected status: {status}"),
                    ErrorKind::Rejected,
                ));
            }

            let content_type = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok());
            if !content_type.map(is_stream_content_type).unwrap_or(false) {
                warn!("unexpected content type: {content_type:?}");
            }

            Ok(HttpBody::from_response(resp))
        }
    }
}

fn is_stream_content_type(content_type: &str) -> bool {
    let Ok(mime) = content_type.parse::<Mime>() else {
        return false;
    };
    matches!(
        (mime.type_().as_str(), mime.subtype().as_str()),
        ("text", "event-stream")
            | ("text", "plain")
            | ("application", "x-ndjson")
            | ("application", "json")
    )
}
