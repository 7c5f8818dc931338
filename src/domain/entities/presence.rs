//! Presence value type.
//!
//! Per-(guild, user) status and activity info. A presence has no identity of
//! its own: it hangs off the owning `Member` and is overwritten wholesale on
//! every `PRESENCE_UPDATE`. Snapshots share it by reference.

use serde::Serialize;
use serde_json::Value;

use crate::shared::payload;

/// Online status of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PresenceStatus {
    Online,
    Idle,
    Dnd,
    #[default]
    Offline,
}

impl PresenceStatus {
    /// Convert from the wire string representation.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "online" => Self::Online,
            "idle" => Self::Idle,
            "dnd" => Self::Dnd,
            _ => Self::Offline,
        }
    }
}

/// A member's presence, replaced as a whole on each update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Presence {
    /// Online status
    pub status: PresenceStatus,

    /// Name of the primary activity, if any
    pub activity: Option<String>,

    /// When the activity started (milliseconds since the Unix epoch)
    pub since: Option<i64>,
}

impl Presence {
    /// Construct a presence from a gateway payload. Every field is optional
    /// on the wire, so this cannot fail.
    pub fn from_payload(payload: &Value) -> Self {
        let activity = payload
            .get("game")
            .filter(|game| !game.is_null())
            .and_then(|game| payload::string_field(game, "name"));

        Presence {
            status: payload::string_field(payload, "status")
                .map(|s| PresenceStatus::from_str(&s))
                .unwrap_or_default(),
            activity,
            since: payload::int_field(payload, "since"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_from_str() {
        assert_eq!(PresenceStatus::from_str("online"), PresenceStatus::Online);
        assert_eq!(PresenceStatus::from_str("IDLE"), PresenceStatus::Idle);
        assert_eq!(PresenceStatus::from_str("dnd"), PresenceStatus::Dnd);
        assert_eq!(PresenceStatus::from_str("invisible"), PresenceStatus::Offline);
    }

    #[test]
    fn test_from_payload() {
        let presence = Presence::from_payload(&json!({
            "status": "online",
            "game": {"name": "with fire"},
            "since": 91879201
        }));
        assert_eq!(presence.status, PresenceStatus::Online);
        assert_eq!(presence.activity.as_deref(), Some("with fire"));
        assert_eq!(presence.since, Some(91879201));
    }

    #[test]
    fn test_from_empty_payload() {
        let presence = Presence::from_payload(&json!({}));
        assert_eq!(presence.status, PresenceStatus::Offline);
        assert_eq!(presence.activity, None);
        assert_eq!(presence.since, None);
    }

    #[test]
    fn test_null_game_is_no_activity() {
        let presence = Presence::from_payload(&json!({"status": "idle", "game": null}));
        assert_eq!(presence.activity, None);
    }
}
