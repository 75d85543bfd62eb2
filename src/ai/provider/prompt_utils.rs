//! Prompt formatting utilities for LLM providers.
//!
//! Completion-style endpoints take one prompt string; chat messages are
//! flattened here at the adapter boundary.

use super::{ChatMessage, Role};

/// Flatten chat messages into a single completion prompt.
///
/// System and user messages get a speaker prefix; other roles are emitted as-is.
/// Message order is preserved and the prompt ends with an `Assistant:` cue.
pub fn flatten_messages(messages: &[ChatMessage]) -> String {
    let mut prompt = String::new();

    for message in messages {
        match message.role {
            Role::System => prompt.push_str("System: "),
            Role::User => prompt.push_str("User: "),
            Role::Assistant => {}
        }
        prompt.push_str(&message.content);
        prompt.push_str("\n\n");
    }

    prompt.push_str("Assistant:");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_system_and_user() {
        let messages = vec![
            ChatMessage::system("Be terse."),
            ChatMessage::user("Write a clause."),
        ];
        assert_eq!(
            flatten_messages(&messages),
            "System: Be terse.\n\nUser: Write a clause.\n\nAssistant:"
        );
    }

    #[test]
    fn test_flatten_preserves_order() {
        let messages = vec![
            ChatMessage::user("first"),
            ChatMessage::system("second"),
            ChatMessage {
                role: Role::Assistant,
                content: "third".to_string(),
            },
            ChatMessage::user("fourth"),
        ];
        let prompt = flatten_messages(&messages);

        let positions: Vec<usize> = ["first", "second", "third", "fourth"]
            .iter()
            .map(|needle| prompt.find(needle).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(prompt.contains("\n\nthird\n\n"));
    }

    #[test]
    fn test_flatten_empty() {
        assert_eq!(flatten_messages(&[]), "Assistant:");
    }
}
