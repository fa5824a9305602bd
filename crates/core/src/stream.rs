//! Decoding and aggregation of a streamed chat response.
//!
//! The response body is a sequence of newline-delimited records, each one
//! optionally prefixed with `data: ` and carrying a small JSON object:
//!
//! ```text
//! data: {"type":"start"}
//! data: {"type":"text","content":"Hel"}
//! data: {"type":"text","content":"lo"}
//! data: {"type":"end"}
//! ```
//!
//! [`ChunkDecoder`] turns raw body fragments into [`ProtocolRecord`]s, and
//! [`StreamAggregator`] folds those records into snapshots of the
//! assistant message being received.

mod aggregator;
mod decoder;

pub use aggregator::{
    FAILURE_MESSAGE, Outcome, REJECTED_MESSAGE, StreamAggregator,
};
pub use decoder::{ChunkDecoder, ProtocolRecord, RecordKind, decode_line};
