//! Emoji entity and variants.
//!
//! Three disjoint shapes arrive on the wire:
//! - unicode emoji: no id, just a code point sequence; never cached;
//! - unknown custom emoji: id and name but no resolvable guild (reaction
//!   payloads); never cached;
//! - guild emoji: id plus owning guild; cached globally (weakly) and in the
//!   guild's `emojis` map.
//!
//! Equality is by logical key (name for unicode, id for custom) so that a
//! partial reaction payload matches the fully-resolved guild emoji already
//! recorded on a message.

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::shared::error::CacheError;
use crate::shared::payload;

/// Shared handle to a cached guild emoji.
pub type GuildEmojiRef = Arc<RwLock<GuildEmoji>>;

/// A custom emoji owned by a guild.
#[derive(Debug, Clone, Serialize)]
pub struct GuildEmoji {
    /// Snowflake ID
    pub id: i64,

    /// Owning guild ID
    pub guild_id: i64,

    /// Emoji name
    pub name: Option<String>,

    /// Roles allowed to use this emoji (empty means everyone)
    pub role_ids: Vec<i64>,

    /// Whether the emoji is animated
    pub is_animated: bool,

    /// Whether an integration manages this emoji
    pub is_managed: bool,
}

impl GuildEmoji {
    /// Construct a guild emoji from a gateway payload.
    pub fn from_payload(payload: &Value, guild_id: i64) -> Result<Self, CacheError> {
        let mut emoji = GuildEmoji {
            id: payload::require_id(payload, "id")?,
            guild_id,
            name: None,
            role_ids: Vec::new(),
            is_animated: false,
            is_managed: false,
        };
        emoji.update_state(payload);
        Ok(emoji)
    }

    /// Apply the fields present in the payload, leaving absent fields
    /// untouched.
    pub fn update_state(&mut self, payload: &Value) {
        if let Some(name) = payload::string_field(payload, "name") {
            self.name = Some(name);
        }
        if let Some(roles) = payload::id_list(payload, "roles") {
            self.role_ids = roles;
        }
        if let Some(animated) = payload::bool_field(payload, "animated") {
            self.is_animated = animated;
        }
        if let Some(managed) = payload::bool_field(payload, "managed") {
            self.is_managed = managed;
        }
    }

    /// Wrap in a shared handle.
    pub fn into_ref(self) -> GuildEmojiRef {
        Arc::new(RwLock::new(self))
    }
}

/// Any emoji shape a payload can describe.
#[derive(Debug, Clone)]
pub enum Emoji {
    /// A plain unicode emoji; `name` is the code point sequence.
    Unicode { name: String },
    /// A custom emoji whose guild could not be resolved.
    Unknown { id: i64, name: Option<String> },
    /// A cached guild emoji.
    Guild(GuildEmojiRef),
}

/// Logical identity of an emoji, used for matching reactions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EmojiKey {
    Unicode(String),
    Custom(i64),
}

impl Emoji {
    /// The logical key used for reaction matching.
    pub fn key(&self) -> EmojiKey {
        match self {
            Emoji::Unicode { name } => EmojiKey::Unicode(name.clone()),
            Emoji::Unknown { id, .. } => EmojiKey::Custom(*id),
            Emoji::Guild(emoji) => EmojiKey::Custom(emoji.read().id),
        }
    }

    /// Display name of the emoji, if known.
    pub fn name(&self) -> Option<String> {
        match self {
            Emoji::Unicode { name } => Some(name.clone()),
            Emoji::Unknown { name, .. } => name.clone(),
            Emoji::Guild(emoji) => emoji.read().name.clone(),
        }
    }
}

impl PartialEq for Emoji {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}
