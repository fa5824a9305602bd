//! Shared vocabulary for the chat widget.
//!
//! This crate establishes the types that flow between the transport, the
//! stream aggregator and the rendering layer, so that each of them can be
//! swapped without touching the others. For example, the HTTP transport
//! and the scripted test transport both implement [`ChatTransport`], and
//! the core never knows which one it is talking to.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod body;
mod error;
mod feedback;
mod message;
mod transport;

pub use body::*;
pub use error::*;
pub use feedback::*;
pub use message::*;
pub use transport::*;
