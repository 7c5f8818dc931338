//! Reaction value type.
//!
//! A reaction is an aggregate count of one emoji on one message. It lives
//! inline in the owning message's `reactions` list and has no identity
//! beyond (message, emoji key).

use crate::domain::entities::emoji::Emoji;

/// An emoji reaction count on a message.
#[derive(Debug, Clone)]
pub struct Reaction {
    /// Number of users who have reacted with this emoji
    pub count: u64,

    /// ID of the message the reaction is on
    pub message_id: i64,

    /// The emoji reacted with
    pub emoji: Emoji,
}

impl Reaction {
    /// A fresh reaction with a count of one.
    pub fn new(message_id: i64, emoji: Emoji) -> Self {
        Reaction { count: 1, message_id, emoji }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_starts_at_one() {
        let reaction = Reaction::new(42, Emoji::Unicode { name: "\u{1f44c}".into() });
        assert_eq!(reaction.count, 1);
        assert_eq!(reaction.message_id, 42);
    }
}
