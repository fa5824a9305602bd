//! An out-of-the-box chat widget that streams responses from the backend.
//!
//! The crate includes a CLI tool for chatting in the terminal. And you can
//! also use it as a library to drive your own rendering layer with
//! [`WidgetState`] snapshots.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod widget;

pub use chat_widget_core::WidgetState;
pub use chat_widget_http::{HttpConfig, HttpConfigBuilder};
pub use widget::{Widget, WidgetBuilder};

/// Re-exports of [`chat_widget_core`] crate.
pub mod core {
    pub use chat_widget_core::*;
}

/// Re-exports of [`chat_widget_model`] crate.
pub mod model {
    pub use chat_widget_model::*;
}
