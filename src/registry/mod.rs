//! # State Registry
//!
//! The cache proper: a relational, in-memory view of gateway state. The
//! [`StateRegistry`] trait is the seam between the gateway layer and the
//! storage model, and [`InMemoryRegistry`] is its only implementation.
//!
//! Operation families:
//! - **get_**: pure lookups, `Option` on miss.
//! - **parse_**: idempotent upserts from raw payloads. Parsing the same
//!   entity twice updates the existing cell in place, so every holder of a
//!   ref observes the change.
//! - **update_**: diff-producing mutations, returning the pre-mutation
//!   snapshot alongside the live ref. `None` when the entity (or its
//!   parent) is not cached.
//! - **delete_**: cascading removals, returning the detached entity.
//!
//! Every method is one critical section over the registry's single lock;
//! there is no cross-call transaction.

mod lru;
mod memory;

use std::sync::Arc;

use serde_json::Value;

use crate::domain::entities::{
    Channel, DmChannel, DmChannelRef, Emoji, Guild, GuildChannel, GuildChannelRef, GuildEmojiRef,
    GuildRef, Member, MemberRef, Message, MessageRef, Presence, Reaction, Role, RoleRef, UserRef,
    Webhook,
};
use crate::shared::error::CacheError;

pub use lru::LruMap;
pub use memory::InMemoryRegistry;

/// Pre/post pair produced by a channel update, split by channel kind.
#[derive(Debug, Clone)]
pub enum ChannelDiff {
    Guild { old: GuildChannel, new: GuildChannelRef },
    Dm { old: DmChannel, new: DmChannelRef },
}

impl ChannelDiff {
    /// The live side of the diff as a [`Channel`].
    pub fn live(&self) -> Channel {
        match self {
            ChannelDiff::Guild { new, .. } => Channel::Guild(new.clone()),
            ChannelDiff::Dm { new, .. } => Channel::Dm(new.clone()),
        }
    }
}

/// Result of applying a presence update to a cached member.
#[derive(Debug, Clone)]
pub struct PresenceDiff {
    /// The member the presence belongs to
    pub member: MemberRef,

    /// Presence replaced by the update, if one was held
    pub old: Option<Arc<Presence>>,

    /// The presence now held by the member
    pub new: Arc<Presence>,
}

/// The cache interface the gateway reconciles events into.
///
/// Implementations are internally synchronized; methods take `&self` and
/// may be called from any thread.
pub trait StateRegistry: Send + Sync {
    /// Look up a guild by its ID.
    fn get_guild_by_id(&self, guild_id: i64) -> Option<GuildRef>;

    /// Look up any channel by its ID, checking guild channels before
    /// direct-message channels.
    fn get_channel_by_id(&self, channel_id: i64) -> Option<Channel>;

    /// Look up a user by ID. The bot's own account is checked first.
    fn get_user_by_id(&self, user_id: i64) -> Option<UserRef>;

    /// Look up a member by user and guild ID.
    fn get_member_by_id(&self, user_id: i64, guild_id: i64) -> Option<MemberRef>;

    /// Look up a role within a guild.
    fn get_role_by_id(&self, guild_id: i64, role_id: i64) -> Option<RoleRef>;

    /// Look up a guild emoji by its ID.
    fn get_emoji_by_id(&self, emoji_id: i64) -> Option<GuildEmojiRef>;

    /// Look up a message by its ID, refreshing its cache recency.
    fn get_message_by_id(&self, message_id: i64) -> Option<MessageRef>;

    /// The bot's own user, once known.
    fn me(&self) -> Option<UserRef>;

    /// Upsert the bot's own user into its dedicated slot.
    fn parse_bot_user(&self, payload: &Value) -> Result<UserRef, CacheError>;

    /// Upsert a user. Payloads carrying bot-account fields, or the bot's
    /// own ID, are routed to the "me" slot.
    fn parse_user(&self, payload: &Value) -> Result<UserRef, CacheError>;

    /// Upsert a guild, ingesting any nested role, emoji, member, channel,
    /// and presence arrays. An `unavailable` payload for an already-cached
    /// guild only flips the availability flag.
    fn parse_guild(&self, payload: &Value) -> Result<GuildRef, CacheError>;

    /// Upsert a channel of either kind. `guild_id` is injected into the
    /// payload's ID when the payload omits it. Returns `None` for a guild
    /// channel whose guild is not cached.
    fn parse_channel(&self, payload: &Value, guild_id: Option<i64>)
        -> Result<Option<Channel>, CacheError>;

    /// Upsert a member of a guild. Returns `None` when the guild is not
    /// cached.
    fn parse_member(&self, payload: &Value, guild_id: i64) -> Result<Option<MemberRef>, CacheError>;

    /// Upsert a role in a guild. Returns `None` when the guild is not
    /// cached.
    fn parse_role(&self, payload: &Value, guild_id: i64) -> Result<Option<RoleRef>, CacheError>;

    /// Resolve an emoji payload to the matching [`Emoji`] variant. Only
    /// guild emoji (ID present, guild cached) end up in the cache.
    fn parse_emoji(&self, payload: &Value, guild_id: Option<i64>) -> Result<Emoji, CacheError>;

    /// Cache a newly created message. Always builds a fresh object and
    /// bumps the owning channel's `last_message_id`. Returns `None` when
    /// the channel is not cached.
    fn parse_message(&self, payload: &Value) -> Result<Option<MessageRef>, CacheError>;

    /// Build a detached reaction snapshot from a reaction payload.
    fn parse_reaction(&self, payload: &Value) -> Result<Reaction, CacheError>;

    /// Record a presence for a member. Returns `None` when the member is
    /// not cached.
    fn parse_presence(&self, user_id: i64, guild_id: i64, payload: &Value) -> Option<Arc<Presence>>;

    /// Build a webhook from a payload. Webhooks are never cached; the
    /// creator sub-payload, when present, shares the global user cell.
    fn parse_webhook(&self, payload: &Value) -> Result<Arc<Webhook>, CacheError>;

    /// Apply a guild update, returning the pre-update snapshot and the
    /// live ref. `None` when the guild is not cached.
    fn update_guild(&self, payload: &Value) -> Result<Option<(Guild, GuildRef)>, CacheError>;

    /// Apply a channel update. `None` when the channel is not cached.
    fn update_channel(&self, payload: &Value) -> Result<Option<ChannelDiff>, CacheError>;

    /// Apply a member update. `None` when the guild or member is not
    /// cached.
    fn update_member(&self, payload: &Value, guild_id: i64)
        -> Result<Option<(Member, MemberRef)>, CacheError>;

    /// Apply a role update. `None` when the guild or role is not cached.
    fn update_role(&self, payload: &Value, guild_id: i64)
        -> Result<Option<(Role, RoleRef)>, CacheError>;

    /// Apply a message edit. `None` when the message is not cached.
    fn update_message(&self, payload: &Value) -> Result<Option<(Message, MessageRef)>, CacheError>;

    /// Replace a guild's full emoji set, returning (old set, new set).
    /// `None` when the guild is not cached.
    fn update_guild_emojis(&self, emoji_payloads: &[Value], guild_id: i64)
        -> Result<Option<(Vec<GuildEmojiRef>, Vec<GuildEmojiRef>)>, CacheError>;

    /// Apply a presence update to the member named by the payload, also
    /// applying the payload's role list. `None` when the guild or member
    /// is not cached.
    fn update_member_presence(&self, payload: &Value) -> Result<Option<PresenceDiff>, CacheError>;

    /// Remove a guild and everything it owns.
    fn delete_guild(&self, guild_id: i64) -> Option<GuildRef>;

    /// Remove a channel of either kind.
    fn delete_channel(&self, channel_id: i64) -> Option<Channel>;

    /// Remove a message from the cache.
    fn delete_message(&self, message_id: i64) -> Option<MessageRef>;

    /// Remove a member from its guild.
    fn delete_member(&self, user_id: i64, guild_id: i64) -> Option<MemberRef>;

    /// Remove a guild emoji.
    fn delete_emoji(&self, emoji_id: i64) -> Option<GuildEmojiRef>;

    /// Remove a role, stripping its ID from every member of the guild.
    fn delete_role(&self, guild_id: i64, role_id: i64) -> Option<RoleRef>;

    /// Record one more reaction with the given emoji on a message,
    /// returning a snapshot of the updated count. `None` when the message
    /// is not cached.
    fn add_reaction(&self, message_id: i64, emoji: Emoji) -> Option<Reaction>;

    /// Record one fewer reaction, dropping the entry at zero. For a cached
    /// message with no matching reaction, returns a zero-count snapshot.
    /// `None` when the message is not cached.
    fn remove_reaction(&self, message_id: i64, emoji: Emoji) -> Option<Reaction>;

    /// Clear every reaction on a message. Counts are zeroed before the
    /// list is cleared so that snapshots held elsewhere read as empty.
    fn remove_all_reactions(&self, message_id: i64) -> Option<MessageRef>;

    /// Flip a guild's availability flag, if the guild is cached.
    fn set_guild_unavailability(&self, guild_id: i64, unavailable: bool);

    /// Drop dead weak entries from the user, emoji, and channel indexes.
    fn sweep(&self);
}
