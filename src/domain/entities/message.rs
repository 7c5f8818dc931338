//! Message entity.
//!
//! Messages are the most churn-heavy entity, so the registry keeps them in a
//! bounded least-recently-used map and always builds a fresh object on
//! `MESSAGE_CREATE` rather than upserting. The author handle and reaction
//! emoji share the cells the rest of the cache already holds.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::domain::entities::member::MemberRef;
use crate::domain::entities::reaction::Reaction;
use crate::domain::entities::user::UserRef;
use crate::domain::entities::webhook::Webhook;
use crate::shared::error::CacheError;
use crate::shared::payload;

/// Shared handle to a cached message.
pub type MessageRef = Arc<RwLock<Message>>;

/// Whoever sent a message, at the best resolution the cache could manage.
#[derive(Debug, Clone)]
pub enum MessageAuthor {
    /// A plain user (DM messages, or guild messages whose member is not
    /// cached).
    User(UserRef),
    /// A guild member.
    Member(MemberRef),
    /// A webhook impersonating a user.
    Webhook(Arc<Webhook>),
}

impl MessageAuthor {
    /// ID of the underlying user or webhook.
    pub fn id(&self) -> i64 {
        match self {
            MessageAuthor::User(user) => user.read().id,
            MessageAuthor::Member(member) => member.read().user_id(),
            MessageAuthor::Webhook(webhook) => webhook.id,
        }
    }
}

/// Represents a message sent in a channel.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    /// Snowflake ID
    pub id: i64,

    /// Channel the message was sent in
    pub channel_id: i64,

    /// Guild the channel belongs to, if any
    pub guild_id: Option<i64>,

    /// Resolved author
    #[serde(skip)]
    pub author: MessageAuthor,

    /// Message text content
    pub content: Option<String>,

    /// When the message was sent
    pub timestamp: Option<DateTime<Utc>>,

    /// When the message was last edited (None if never edited)
    pub edited_timestamp: Option<DateTime<Utc>>,

    /// Whether this was a text-to-speech message
    pub is_tts: bool,

    /// Whether the message is pinned in its channel
    pub is_pinned: bool,

    /// Attachment payloads, kept raw
    pub attachments: Vec<Value>,

    /// Embed payloads, kept raw
    pub embeds: Vec<Value>,

    /// Message flag bitfield
    pub flags: u64,

    /// Aggregate reaction counts
    #[serde(skip)]
    pub reactions: Vec<Reaction>,
}

impl Message {
    /// Construct a message with an already-resolved author.
    pub fn from_payload(
        payload: &Value,
        channel_id: i64,
        guild_id: Option<i64>,
        author: MessageAuthor,
    ) -> Result<Self, CacheError> {
        let mut message = Message {
            id: payload::require_id(payload, "id")?,
            channel_id,
            guild_id,
            author,
            content: None,
            timestamp: None,
            edited_timestamp: None,
            is_tts: false,
            is_pinned: false,
            attachments: Vec::new(),
            embeds: Vec::new(),
            flags: 0,
            reactions: Vec::new(),
        };
        message.update_state(payload);
        Ok(message)
    }

    /// Apply the fields present in the payload, leaving absent fields
    /// untouched. Reactions are managed by their own operations and are not
    /// touched here.
    pub fn update_state(&mut self, payload: &Value) {
        if payload.get("content").is_some() {
            self.content = payload::string_field(payload, "content");
        }
        if let Some(timestamp) = payload::timestamp_field(payload, "timestamp") {
            self.timestamp = Some(timestamp);
        }
        if payload.get("edited_timestamp").is_some() {
            self.edited_timestamp = payload::timestamp_field(payload, "edited_timestamp");
        }
        if let Some(tts) = payload::bool_field(payload, "tts") {
            self.is_tts = tts;
        }
        if let Some(pinned) = payload::bool_field(payload, "pinned") {
            self.is_pinned = pinned;
        }
        if let Some(attachments) = payload.get("attachments").and_then(Value::as_array) {
            self.attachments = attachments.clone();
        }
        if let Some(embeds) = payload.get("embeds").and_then(Value::as_array) {
            self.embeds = embeds.clone();
        }
        if let Some(flags) = payload::uint_field(payload, "flags") {
            self.flags = flags;
        }
    }

    /// Wrap in a shared handle.
    pub fn into_ref(self) -> MessageRef {
        Arc::new(RwLock::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::user::User;
    use serde_json::json;

    fn some_author() -> MessageAuthor {
        MessageAuthor::User(
            User::from_payload(&json!({"id": "100", "username": "nekokatt"}))
                .unwrap()
                .into_ref(),
        )
    }

    fn message_payload() -> Value {
        json!({
            "id": "334385199974967042",
            "content": "Supa dupa test",
            "timestamp": "2017-07-11T17:27:07.299000+00:00",
            "edited_timestamp": null,
            "tts": false,
            "pinned": false,
            "attachments": [],
            "embeds": []
        })
    }

    #[test]
    fn test_from_payload() {
        let message =
            Message::from_payload(&message_payload(), 290926798999357250, None, some_author())
                .unwrap();
        assert_eq!(message.id, 334385199974967042);
        assert_eq!(message.channel_id, 290926798999357250);
        assert_eq!(message.content.as_deref(), Some("Supa dupa test"));
        assert_eq!(message.author.id(), 100);
        assert!(message.timestamp.is_some());
        assert_eq!(message.edited_timestamp, None);
        assert!(message.reactions.is_empty());
    }

    #[test]
    fn test_update_state_is_partial() {
        let mut message =
            Message::from_payload(&message_payload(), 1, None, some_author()).unwrap();
        message.update_state(&json!({
            "content": "edited",
            "edited_timestamp": "2017-07-11T18:00:00.000000+00:00"
        }));
        assert_eq!(message.content.as_deref(), Some("edited"));
        assert!(message.edited_timestamp.is_some());
        // Untouched fields survive.
        assert!(message.timestamp.is_some());
    }

    #[test]
    fn test_update_does_not_touch_reactions() {
        use crate::domain::entities::emoji::Emoji;

        let mut message =
            Message::from_payload(&message_payload(), 1, None, some_author()).unwrap();
        message
            .reactions
            .push(Reaction::new(message.id, Emoji::Unicode { name: "x".into() }));
        message.update_state(&json!({"content": "edited"}));
        assert_eq!(message.reactions.len(), 1);
    }
}
