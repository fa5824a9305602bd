//! Core logic of the chat widget: stream decoding, response aggregation
//! and the conversation store.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

pub mod conversation;
mod store;
pub mod stream;
mod transport_client;

pub use store::{ConversationStore, ConversationStoreBuilder, WidgetState};
