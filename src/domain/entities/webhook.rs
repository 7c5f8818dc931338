//! Webhook entity.
//!
//! Webhooks are parsed on demand for message authorship and are not cached:
//! the registry constructs one per payload and hands ownership to the caller.

use serde::Serialize;
use serde_json::Value;

use crate::domain::entities::user::UserRef;
use crate::shared::error::CacheError;
use crate::shared::payload;

/// Represents an incoming webhook.
#[derive(Debug, Clone, Serialize)]
pub struct Webhook {
    /// Snowflake ID
    pub id: i64,

    /// Guild the webhook posts into, if known
    pub guild_id: Option<i64>,

    /// Channel the webhook posts into, if known
    pub channel_id: Option<i64>,

    /// Default display name
    pub name: Option<String>,

    /// Default avatar image hash
    pub avatar_hash: Option<String>,

    /// User who created the webhook, shared with the global user index.
    /// Resolved by the registry after construction.
    #[serde(skip)]
    pub creator: Option<UserRef>,
}

impl Webhook {
    /// Construct a webhook from a gateway payload.
    pub fn from_payload(payload: &Value) -> Result<Self, CacheError> {
        let mut webhook = Webhook {
            id: payload::require_id(payload, "id")?,
            guild_id: None,
            channel_id: None,
            name: None,
            avatar_hash: None,
            creator: None,
        };
        webhook.update_state(payload);
        Ok(webhook)
    }

    /// Apply the fields present in the payload, leaving absent fields
    /// untouched.
    pub fn update_state(&mut self, payload: &Value) {
        if let Some(guild_id) = payload::optional_id(payload, "guild_id") {
            self.guild_id = Some(guild_id);
        }
        if let Some(channel_id) = payload::optional_id(payload, "channel_id") {
            self.channel_id = Some(channel_id);
        }
        if let Some(name) = payload::string_field(payload, "name") {
            self.name = Some(name);
        }
        if let Some(avatar) = payload::string_field(payload, "avatar") {
            self.avatar_hash = Some(avatar);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_payload() {
        let webhook = Webhook::from_payload(&json!({
            "id": "223704706495545344",
            "guild_id": "199737254929760256",
            "channel_id": "199737254929760256",
            "name": "test webhook"
        }))
        .unwrap();
        assert_eq!(webhook.id, 223704706495545344);
        assert_eq!(webhook.guild_id, Some(199737254929760256));
        assert_eq!(webhook.name.as_deref(), Some("test webhook"));
    }

    #[test]
    fn test_missing_id_is_an_error() {
        assert!(Webhook::from_payload(&json!({"name": "x"})).is_err());
    }
}
