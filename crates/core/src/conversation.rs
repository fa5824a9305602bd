//! Conversation-related types.

use std::ops::Index;
use std::slice;

use chat_widget_model::{Message, Role};

/// An ordered list of messages.
///
/// At most one message is incomplete at any time, and it is always the
/// last one: the assistant response that is still streaming in.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Returns the number of messages.
    #[inline]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if there are no messages yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns the message at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    /// Returns the last message.
    #[inline]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Returns all messages, oldest first.
    #[inline]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns an iterator over the messages, oldest first.
    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, Message> {
        self.messages.iter()
    }

    /// Returns the index of the incomplete message, if any.
    pub fn pending_index(&self) -> Option<usize> {
        self.messages
            .last()
            .filter(|msg| !msg.complete)
            .map(|_| self.messages.len() - 1)
    }

    /// Appends a message and returns its index.
    pub(crate) fn push(&mut self, msg: Message) -> usize {
        debug_assert!(
            self.pending_index().is_none(),
            "cannot append after an incomplete message"
        );
        self.messages.push(msg);
        self.messages.len() - 1
    }

    /// Replaces the incomplete assistant message at `index`.
    ///
    /// Complete messages are frozen, so replacing one is refused and
    /// `false` is returned.
    pub(crate) fn replace(&mut self, index: usize, msg: Message) -> bool {
        let Some(slot) = self.messages.get_mut(index) else {
            warn!("no message at index {index}");
            return false;
        };
        if slot.complete || slot.role != Role::Assistant {
            warn!("message at index {index} cannot be replaced");
            return false;
        }
        *slot = Message {
            role: Role::Assistant,
            ..msg
        };
        true
    }

    /// Marks the message at `index` as complete, keeping its content.
    pub(crate) fn freeze(&mut self, index: usize) {
        if let Some(slot) = self.messages.get_mut(index) {
            slot.complete = true;
        }
    }

    /// Returns the complete messages, to be sent as request history.
    pub(crate) fn history(&self) -> Vec<Message> {
        self.messages
            .iter()
            .filter(|msg| msg.complete)
            .cloned()
            .collect()
    }
}

impl Index<usize> for Conversation {
    type Output = Message;

    #[inline]
    fn index(&self, index: usize) -> &Message {
        &self.messages[index]
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a Message;
    type IntoIter = slice::Iter<'a, Message>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use chat_widget_model::MessageKind;

    use super::*;

    #[test]
    fn test_replace_in_place() {
        let mut conversation = Conversation::default();
        conversation.push(Message::user("Hi"));
        let index = conversation.push(Message::assistant_placeholder());
        assert_eq!(index, 1);
        assert_eq!(conversation.pending_index(), Some(1));

        assert!(conversation.replace(
            index,
            Message::assistant(MessageKind::Text, "Hel", false)
        ));
        assert!(conversation.replace(
            index,
            Message::assistant(MessageKind::Text, "Hello", true)
        ));
        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation[1].content, "Hello");
        assert_eq!(conversation.pending_index(), None);

        // Terminal messages are frozen.
        assert!(!conversation.replace(
            index,
            Message::assistant(MessageKind::Text, "Hello!", true)
        ));
        assert_eq!(conversation[1].content, "Hello");
        // User messages are never replaced.
        assert!(!conversation.replace(
            0,
            Message::assistant(MessageKind::Text, "x", false)
        ));
        assert!(!conversation.replace(7, Message::user("x")));
    }

    #[test]
    fn test_history_skips_pending() {
        let mut conversation = Conversation::default();
        conversation.push(Message::user("Hi"));
        let index = conversation.push(Message::assistant_placeholder());
        assert_eq!(conversation.history(), vec![Message::user("Hi")]);

        conversation.freeze(index);
        assert_eq!(conversation.history().len(), 2);
        assert!(conversation.iter().all(|msg| msg.complete));
    }
}
