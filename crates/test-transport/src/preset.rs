use std::time::Duration;

use bytes::Bytes;
use serde_json::json;

/// Formats one `data: `-prefixed, newline-terminated record line.
pub fn record_line(ty: &str, content: Option<&str>) -> String {
    let mut record = json!({ "type": ty });
    if let Some(content) = content {
        record["content"] = json!(content);
    }
    format!("data: {record}\n")
}

/// A scripted response body.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PresetStream {
    /// Fragments delivered by the body, one per read.
    pub fragments: Vec<Bytes>,
    /// If set, reading fails once this many fragments have been read.
    pub failure_after: Option<usize>,
    /// Delay before each read, overriding the transport's delay.
    pub delay: Option<Duration>,
}

impl PresetStream {
    /// Creates a `PresetStream` delivering the given raw fragments.
    pub fn with_fragments<I, B>(fragments: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Self {
            fragments: fragments.into_iter().map(Into::into).collect(),
            failure_after: None,
            delay: None,
        }
    }

    /// Creates a `PresetStream` delivering one record line per fragment.
    pub fn with_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        Self::with_fragments(
            records
                .into_iter()
                .map(|(ty, content)| record_line(ty, content)),
        )
    }

    /// Makes reading fail after `fragments` fragments have been read.
    #[inline]
    pub fn with_failure_after(mut self, fragments: usize) -> Self {
        self.failure_after = Some(fragments);
        self
    }

    /// Sets the delay before each read.
    #[inline]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// How the transport answers one exchange.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PresetExchange {
    /// A successful response with a scripted body.
    Stream(PresetStream),
    /// A non-success status.
    Rejected,
    /// The backend cannot be reached at all.
    Unreachable,
}
