//! Conversation assembly.
//!
//! The history sent to the provider is always:
//!
//! 1. the previous assistant turn, when the caller supplied one,
//! 2. exactly one system message,
//! 3. exactly one user message.

use fleetwise_core::message::Message;

/// Build the ordered message list for one chat turn.
///
/// A blank `last_assistant` turn is treated as absent.
pub fn assemble(prompt: &str, user_message: &str, last_assistant: Option<&str>) -> Vec<Message> {
    let mut messages = Vec::with_capacity(3);

    if let Some(previous) = last_assistant.filter(|m| !m.is_empty()) {
        messages.push(Message::assistant(previous));
    }

    messages.push(Message::system(prompt));
    messages.push(Message::user(user_message));
    messages
}
