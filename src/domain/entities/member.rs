//! Member entity.
//!
//! A member is a user's guild-scoped identity: it wraps the globally shared
//! `UserRef` and layers the per-guild state on top (nickname, role ids,
//! voice flags, presence). Members are owned by exactly one guild's
//! `members` map and are keyed by the wrapped user's id.
//!
//! Snapshots clone the struct; the `user` handle and `presence` are shared
//! by reference, so a snapshot observes later mutations of those two.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::domain::entities::presence::Presence;
use crate::domain::entities::user::UserRef;
use crate::shared::payload;

/// Shared handle to a cached member.
pub type MemberRef = Arc<RwLock<Member>>;

/// Represents a user within a specific guild.
#[derive(Debug, Clone, Serialize)]
pub struct Member {
    /// The wrapped global user
    #[serde(skip)]
    pub user: UserRef,

    /// Owning guild ID
    pub guild_id: i64,

    /// Per-guild nickname
    pub nick: Option<String>,

    /// IDs of roles held in the owning guild. May transiently contain ids
    /// that no longer resolve to a cached role.
    pub role_ids: Vec<i64>,

    /// When the user joined the guild
    pub joined_at: Option<DateTime<Utc>>,

    /// When the user started boosting the guild
    pub premium_since: Option<DateTime<Utc>>,

    /// Whether the member is deafened in voice channels
    pub is_deaf: bool,

    /// Whether the member is muted in voice channels
    pub is_mute: bool,

    /// Latest known presence, shared with snapshots
    pub presence: Option<Arc<Presence>>,
}

impl Member {
    /// Construct a member wrapping an already-resolved user.
    pub fn from_payload(payload: &Value, guild_id: i64, user: UserRef) -> Self {
        let mut member = Member {
            user,
            guild_id,
            nick: None,
            role_ids: Vec::new(),
            joined_at: None,
            premium_since: None,
            is_deaf: false,
            is_mute: false,
            presence: None,
        };
        member.update_state(payload);
        member
    }

    /// ID of the wrapped user.
    pub fn user_id(&self) -> i64 {
        self.user.read().id
    }

    /// Apply the fields present in the payload, leaving absent fields
    /// untouched.
    pub fn update_state(&mut self, payload: &Value) {
        if payload.get("nick").is_some() {
            // Present-but-null means the nickname was removed.
            self.nick = payload::string_field(payload, "nick");
        }
        if let Some(roles) = payload::id_list(payload, "roles") {
            self.role_ids = roles;
        }
        if let Some(joined_at) = payload::timestamp_field(payload, "joined_at") {
            self.joined_at = Some(joined_at);
        }
        if payload.get("premium_since").is_some() {
            self.premium_since = payload::timestamp_field(payload, "premium_since");
        }
        if let Some(deaf) = payload::bool_field(payload, "deaf") {
            self.is_deaf = deaf;
        }
        if let Some(mute) = payload::bool_field(payload, "mute") {
            self.is_mute = mute;
        }
    }

    /// Replace the full role id list.
    pub fn replace_roles(&mut self, role_ids: Vec<i64>) {
        self.role_ids = role_ids;
    }

    /// Drop a single role id if held. Used when the role itself is deleted.
    pub fn remove_role(&mut self, role_id: i64) {
        self.role_ids.retain(|&id| id != role_id);
    }

    /// Swap in a new presence, returning the one it replaced.
    pub fn set_presence(&mut self, presence: Arc<Presence>) -> Option<Arc<Presence>> {
        self.presence.replace(presence)
    }

    /// Wrap in a shared handle.
    pub fn into_ref(self) -> MemberRef {
        Arc::new(RwLock::new(self))
    }
}
