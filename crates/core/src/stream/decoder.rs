use std::mem;

use serde::Deserialize;

const DATA_PREFIX: &str = "data: ";

/// The kind of a [`ProtocolRecord`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// The stream has started.
    Start,
    /// A text fragment.
    Text,
    /// A tool calls fragment.
    ToolCalls,
    /// The stream has ended.
    End,
    /// Anything that could not be understood.
    Unknown,
}

/// One decoded record from the response stream.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ProtocolRecord {
    /// Marks the beginning of the stream.
    Start,
    /// A text fragment, content is passed through verbatim.
    Text(Option<String>),
    /// A tool calls fragment, content is passed through verbatim.
    ToolCalls(Option<String>),
    /// Marks the end of the stream.
    End,
    /// A malformed line, or one with an unrecognized type.
    Unknown,
}

impl ProtocolRecord {
    /// Returns the kind of this record.
    #[inline]
    pub fn kind(&self) -> RecordKind {
        match self {
            ProtocolRecord::Start => RecordKind::Start,
            ProtocolRecord::Text(_) => RecordKind::Text,
            ProtocolRecord::ToolCalls(_) => RecordKind::ToolCalls,
            ProtocolRecord::End => RecordKind::End,
            ProtocolRecord::Unknown => RecordKind::Unknown,
        }
    }

    /// Returns the content carried by this record, if any.
    #[inline]
    pub fn content(&self) -> Option<&str> {
        match self {
            ProtocolRecord::Text(content)
            | ProtocolRecord::ToolCalls(content) => content.as_deref(),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct RawRecord {
    #[serde(rename = "type")]
    ty: Option<String>,
    content: Option<String>,
}

impl RawRecord {
    fn into_record(self) -> ProtocolRecord {
        match self.ty.as_deref() {
            Some("start") => ProtocolRecord::Start,
            Some("text") => ProtocolRecord::Text(self.content),
            Some("tool_calls") => ProtocolRecord::ToolCalls(self.content),
            Some("end") => ProtocolRecord::End,
            ty => {
                debug!("dropping record with unrecognized type: {ty:?}");
                ProtocolRecord::Unknown
            }
        }
    }
}

/// Decodes a single line of the stream.
///
/// Returns `None` for blank lines. Lines that cannot be parsed decode to
/// [`ProtocolRecord::Unknown`] instead of failing.
pub fn decode_line(line: &str) -> Option<ProtocolRecord> {
    let line = line.trim_start();
    let payload = line.strip_prefix(DATA_PREFIX).unwrap_or(line).trim();
    if payload.is_empty() {
        return None;
    }

    let record = match serde_json::from_str::<RawRecord>(payload) {
        Ok(raw) => raw.into_record(),
        Err(err) => {
            debug!("dropping malformed record ({err}): {payload:?}");
            ProtocolRecord::Unknown
        }
    };
    Some(record)
}

fn decode_raw_line(line: &[u8]) -> Option<ProtocolRecord> {
    match std::str::from_utf8(line) {
        Ok(line) => decode_line(line),
        Err(err) => {
            debug!("dropping record with invalid UTF-8: {err}");
            Some(ProtocolRecord::Unknown)
        }
    }
}

/// A decoder that splits raw body fragments into records.
///
/// Fragment boundaries don't need to line up with record boundaries. The
/// unterminated tail of a fragment is kept in the decoder and completed
/// by the following fragments. Bytes are buffered as-is, so a multi-byte
/// character split across fragments is decoded correctly.
#[derive(Clone, Debug, Default)]
pub struct ChunkDecoder {
    buf: Vec<u8>,
}

impl ChunkDecoder {
    /// Creates an empty decoder.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a fragment and returns the records it completes, in order.
    pub fn decode(&mut self, fragment: &[u8]) -> Vec<ProtocolRecord> {
        self.buf.extend_from_slice(fragment);

        let mut records = Vec::new();
        let mut consumed = 0;
        while let Some(eol_idx) =
            self.buf[consumed..].iter().position(|b| *b == b'\n')
        {
            let line = &self.buf[consumed..consumed + eol_idx];
            records.extend(decode_raw_line(line));
            consumed += eol_idx + 1;
        }

        // Keep only the unterminated tail.
        self.buf.drain(..consumed);
        records
    }

    /// Decodes whatever is left in the buffer as a final record.
    ///
    /// Call this once the body is exhausted, since the last line of a
    /// stream may not be newline-terminated.
    pub fn finish(&mut self) -> Option<ProtocolRecord> {
        let tail = mem::take(&mut self.buf);
        decode_raw_line(&tail)
    }

    /// Returns the bytes that are waiting for a line terminator.
    #[inline]
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }
}
