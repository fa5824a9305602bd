use serde::{Deserialize, Serialize};

/// The author of a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Typed by the person using the widget.
    User,
    /// Produced by the chat backend.
    Assistant,
}

/// The kind of content a message carries.
///
/// A message starts as [`MessageKind::Text`] and may be upgraded to
/// [`MessageKind::ToolCalls`] once, never the other way around.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Plain conversational text.
    #[default]
    Text,
    /// Output describing tool invocations.
    ToolCalls,
}

/// A conversational unit.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Message {
    /// Who wrote the message. Fixed at creation.
    pub role: Role,
    /// The kind of the content.
    pub kind: MessageKind,
    /// The text content. Only grows while the message is incomplete.
    pub content: String,
    /// Whether the message has reached its terminal state.
    pub complete: bool,
}

impl Message {
    /// Creates a complete text message written by the user.
    #[inline]
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::User,
            kind: MessageKind::Text,
            content: content.into(),
            complete: true,
        }
    }

    /// Creates the empty, in-progress assistant message that is shown
    /// while a response is streaming in.
    #[inline]
    pub fn assistant_placeholder() -> Self {
        Self {
            role: Role::Assistant,
            kind: MessageKind::Text,
            content: String::new(),
            complete: false,
        }
    }

    /// Creates an assistant message snapshot.
    #[inline]
    pub fn assistant<S: Into<String>>(
        kind: MessageKind,
        content: S,
        complete: bool,
    ) -> Self {
        Self {
            role: Role::Assistant,
            kind,
            content: content.into(),
            complete,
        }
    }
}

/// A request to be sent to the chat backend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChatRequest {
    /// The conversation history, oldest first, ending with the latest
    /// user message.
    pub messages: Vec<Message>,
}
