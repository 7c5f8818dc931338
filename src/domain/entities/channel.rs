//! Channel entities.
//!
//! Guild channels (text, voice, category, news, store) are owned by their
//! guild's `channels` map; a weak global index allows lookup without the
//! guild id. Direct-message channels (type codes 1 and 3) have no guild and
//! live in a bounded least-recently-used map of their own.

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::domain::entities::user::UserRef;
use crate::shared::error::CacheError;
use crate::shared::payload;

/// Shared handle to a cached guild channel.
pub type GuildChannelRef = Arc<RwLock<GuildChannel>>;

/// Shared handle to a cached direct-message channel.
pub type DmChannelRef = Arc<RwLock<DmChannel>>;

/// Wire type codes that denote direct-message channels (DM and group DM).
pub fn is_dm_channel_type(type_code: i64) -> bool {
    matches!(type_code, 1 | 3)
}

/// A single permission overwrite on a guild channel.
#[derive(Debug, Clone, Serialize)]
pub struct PermissionOverwrite {
    /// ID of the role or user the overwrite targets
    pub id: i64,

    /// Target kind, "role" or "member"
    pub kind: String,

    /// Permissions explicitly allowed
    pub allow: u64,

    /// Permissions explicitly denied
    pub deny: u64,
}

impl PermissionOverwrite {
    fn from_payload(payload: &Value) -> Option<Self> {
        Some(PermissionOverwrite {
            id: payload::optional_id(payload, "id")?,
            kind: payload::string_field(payload, "type").unwrap_or_default(),
            allow: payload::uint_field(payload, "allow").unwrap_or(0),
            deny: payload::uint_field(payload, "deny").unwrap_or(0),
        })
    }
}

/// A channel belonging to a guild.
#[derive(Debug, Clone, Serialize)]
pub struct GuildChannel {
    /// Snowflake ID
    pub id: i64,

    /// Owning guild ID
    pub guild_id: i64,

    /// Wire type code (0 text, 2 voice, 4 category, 5 news, 6 store)
    pub channel_type: i64,

    /// Channel name
    pub name: Option<String>,

    /// Sorting position
    pub position: i32,

    /// Channel topic
    pub topic: Option<String>,

    /// Whether the channel is age-restricted
    pub is_nsfw: bool,

    /// Parent category channel ID
    pub parent_id: Option<i64>,

    /// ID of the most recent message, if any
    pub last_message_id: Option<i64>,

    /// Permission overwrites, replaced wholesale when present
    pub permission_overwrites: Vec<PermissionOverwrite>,
}

impl GuildChannel {
    /// Construct a guild channel from a gateway payload.
    pub fn from_payload(payload: &Value, guild_id: i64) -> Result<Self, CacheError> {
        let mut channel = GuildChannel {
            id: payload::require_id(payload, "id")?,
            guild_id,
            channel_type: payload::int_field(payload, "type").unwrap_or(0),
            name: None,
            position: 0,
            topic: None,
            is_nsfw: false,
            parent_id: None,
            last_message_id: None,
            permission_overwrites: Vec::new(),
        };
        channel.update_state(payload);
        Ok(channel)
    }

    /// Apply the fields present in the payload, leaving absent fields
    /// untouched.
    pub fn update_state(&mut self, payload: &Value) {
        if let Some(name) = payload::string_field(payload, "name") {
            self.name = Some(name);
        }
        if let Some(position) = payload::int_field(payload, "position") {
            self.position = position as i32;
        }
        if payload.get("topic").is_some() {
            self.topic = payload::string_field(payload, "topic");
        }
        if let Some(nsfw) = payload::bool_field(payload, "nsfw") {
            self.is_nsfw = nsfw;
        }
        if payload.get("parent_id").is_some() {
            self.parent_id = payload::optional_id(payload, "parent_id");
        }
        if let Some(last_message_id) = payload::optional_id(payload, "last_message_id") {
            self.last_message_id = Some(last_message_id);
        }
        if let Some(overwrites) = payload.get("permission_overwrites").and_then(Value::as_array) {
            self.permission_overwrites = overwrites
                .iter()
                .filter_map(PermissionOverwrite::from_payload)
                .collect();
        }
    }

    /// Wrap in a shared handle.
    pub fn into_ref(self) -> GuildChannelRef {
        Arc::new(RwLock::new(self))
    }
}

/// A direct-message channel (one-to-one or group).
#[derive(Debug, Clone, Serialize)]
pub struct DmChannel {
    /// Snowflake ID
    pub id: i64,

    /// Wire type code (1 DM, 3 group DM)
    pub channel_type: i64,

    /// Group DM name, if any
    pub name: Option<String>,

    /// User who owns a group DM
    pub owner_id: Option<i64>,

    /// ID of the most recent message, if any
    pub last_message_id: Option<i64>,

    /// Recipients, sharing the global user cells
    #[serde(skip)]
    pub recipients: Vec<UserRef>,
}

impl DmChannel {
    /// Construct a direct-message channel. Recipients are resolved by the
    /// caller so that they share the global user cells.
    pub fn from_payload(payload: &Value, recipients: Vec<UserRef>) -> Result<Self, CacheError> {
        let mut channel = DmChannel {
            id: payload::require_id(payload, "id")?,
            channel_type: payload::int_field(payload, "type").unwrap_or(1),
            name: None,
            owner_id: None,
            last_message_id: None,
            recipients,
        };
        channel.update_state(payload);
        Ok(channel)
    }

    /// Apply the fields present in the payload, leaving absent fields
    /// untouched. Recipients are not touched here.
    pub fn update_state(&mut self, payload: &Value) {
        if payload.get("name").is_some() {
            self.name = payload::string_field(payload, "name");
        }
        if let Some(owner_id) = payload::optional_id(payload, "owner_id") {
            self.owner_id = Some(owner_id);
        }
        if let Some(last_message_id) = payload::optional_id(payload, "last_message_id") {
            self.last_message_id = Some(last_message_id);
        }
    }

    /// Wrap in a shared handle.
    pub fn into_ref(self) -> DmChannelRef {
        Arc::new(RwLock::new(self))
    }
}

/// Either kind of cached channel.
#[derive(Debug, Clone)]
pub enum Channel {
    Guild(GuildChannelRef),
    Dm(DmChannelRef),
}

impl Channel {
    /// Snowflake ID of the underlying channel.
    pub fn id(&self) -> i64 {
        match self {
            Channel::Guild(channel) => channel.read().id,
            Channel::Dm(channel) => channel.read().id,
        }
    }

    /// Owning guild ID, if this is a guild channel.
    pub fn guild_id(&self) -> Option<i64> {
        match self {
            Channel::Guild(channel) => Some(channel.read().guild_id),
            Channel::Dm(_) => None,
        }
    }
}
