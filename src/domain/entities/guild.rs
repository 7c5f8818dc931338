//! Guild entity.
//!
//! A guild is the root of the ownership tree: it strongly owns its
//! channels, members, roles, and emoji, so dropping the guild from the
//! registry releases the whole subtree at once. Scalar fields update in
//! place; the owned maps are managed by the registry's parse and delete
//! operations, never by `update_state`.
//!
//! Snapshots clone the struct. The owned maps are maps of `Arc`s, so a
//! snapshot copies the map shape (which entities were present) while
//! sharing the entity cells themselves.

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::entities::channel::GuildChannelRef;
use crate::domain::entities::emoji::GuildEmojiRef;
use crate::domain::entities::member::MemberRef;
use crate::domain::entities::role::RoleRef;
use crate::shared::error::CacheError;
use crate::shared::payload;

/// Shared handle to a cached guild.
pub type GuildRef = Arc<RwLock<Guild>>;

/// Represents a guild (a server).
#[derive(Debug, Clone, Serialize)]
pub struct Guild {
    /// Snowflake ID
    pub id: i64,

    /// Guild name
    pub name: Option<String>,

    /// Icon image hash
    pub icon_hash: Option<String>,

    /// Enabled feature flags, as sent on the wire
    pub features: Vec<String>,

    /// ID of the owning user
    pub owner_id: Option<i64>,

    /// Whether the guild is currently unavailable due to an outage. While
    /// set, the owned maps hold the last known state.
    pub is_unavailable: bool,

    /// Total member count as reported by the server, which may exceed the
    /// number of cached members
    pub member_count: Option<u64>,

    /// Channels owned by this guild, keyed by channel ID
    #[serde(skip)]
    pub channels: HashMap<i64, GuildChannelRef>,

    /// Members, keyed by user ID
    #[serde(skip)]
    pub members: HashMap<i64, MemberRef>,

    /// Roles, keyed by role ID
    #[serde(skip)]
    pub roles: HashMap<i64, RoleRef>,

    /// Custom emoji, keyed by emoji ID
    #[serde(skip)]
    pub emojis: HashMap<i64, GuildEmojiRef>,
}

impl Guild {
    /// Construct a guild from a gateway payload. Nested channel, member,
    /// role, and emoji arrays are ingested by the registry, not here.
    pub fn from_payload(payload: &Value) -> Result<Self, CacheError> {
        let mut guild = Guild {
            id: payload::require_id(payload, "id")?,
            name: None,
            icon_hash: None,
            features: Vec::new(),
            owner_id: None,
            is_unavailable: false,
            member_count: None,
            channels: HashMap::new(),
            members: HashMap::new(),
            roles: HashMap::new(),
            emojis: HashMap::new(),
        };
        guild.update_state(payload);
        Ok(guild)
    }

    /// Apply the scalar fields present in the payload, leaving absent
    /// fields untouched.
    pub fn update_state(&mut self, payload: &Value) {
        if let Some(name) = payload::string_field(payload, "name") {
            self.name = Some(name);
        }
        if payload.get("icon").is_some() {
            self.icon_hash = payload::string_field(payload, "icon");
        }
        if let Some(features) = payload::string_list(payload, "features") {
            self.features = features;
        }
        if let Some(owner_id) = payload::optional_id(payload, "owner_id") {
            self.owner_id = Some(owner_id);
        }
        if let Some(unavailable) = payload::bool_field(payload, "unavailable") {
            self.is_unavailable = unavailable;
        }
        if let Some(member_count) = payload::uint_field(payload, "member_count") {
            self.member_count = Some(member_count);
        }
    }

    /// Wrap in a shared handle.
    pub fn into_ref(self) -> GuildRef {
        Arc::new(RwLock::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn guild_payload() -> Value {
        json!({
            "id": "41771983423143937",
            "name": "Discord Developers",
            "icon": "86e39f7ae3307e811784e2ffd11a7310",
            "features": ["ANIMATED_ICON", "BANNER"],
            "owner_id": "80351110224678912",
            "member_count": 26
        })
    }

    #[test]
    fn test_from_payload() {
        let guild = Guild::from_payload(&guild_payload()).unwrap();
        assert_eq!(guild.id, 41771983423143937);
        assert_eq!(guild.name.as_deref(), Some("Discord Developers"));
        assert_eq!(guild.owner_id, Some(80351110224678912));
        assert_eq!(guild.member_count, Some(26));
        assert!(!guild.is_unavailable);
        assert!(guild.channels.is_empty());
    }

    #[test]
    fn test_update_state_is_partial() {
        let mut guild = Guild::from_payload(&guild_payload()).unwrap();
        guild.update_state(&json!({"name": "Renamed"}));
        assert_eq!(guild.name.as_deref(), Some("Renamed"));
        assert_eq!(guild.owner_id, Some(80351110224678912));
        assert_eq!(guild.features.len(), 2);
    }

    #[test]
    fn test_unavailable_flag() {
        let guild = Guild::from_payload(&json!({"id": "9", "unavailable": true})).unwrap();
        assert!(guild.is_unavailable);
    }

    #[test]
    fn test_snapshot_shares_owned_cells() {
        use crate::domain::entities::role::Role;

        let mut guild = Guild::from_payload(&guild_payload()).unwrap();
        let role = Role::from_payload(&json!({"id": "5", "name": "old"}), guild.id)
            .unwrap()
            .into_ref();
        guild.roles.insert(5, role.clone());

        let snapshot = guild.clone();
        role.write().name = Some("new".into());
        assert_eq!(
            snapshot.roles[&5].read().name.as_deref(),
            Some("new")
        );
    }
}
