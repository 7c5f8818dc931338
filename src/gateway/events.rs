//! Event vocabulary.
//!
//! [`EventKind`] is the closed set of gateway event names the adapter
//! understands, resolved by a static match. [`Event`] is the outbound
//! notification stream: one `Raw` per recognised payload, one
//! `Passthrough` per unrecognised one, and a typed variant per handled
//! event carrying the refs and snapshots the registry produced.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::entities::{
    Channel, DmChannel, DmChannelRef, Guild, GuildChannel, GuildChannelRef, GuildEmojiRef,
    GuildRef, Member, MemberRef, Message, MessageRef, Presence, Reaction, Role, RoleRef, UserRef,
};
use std::sync::Arc;

/// A gateway event name the adapter knows how to reconcile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ChannelCreate,
    ChannelUpdate,
    ChannelDelete,
    ChannelPinsUpdate,
    GuildCreate,
    GuildUpdate,
    GuildDelete,
    GuildBanAdd,
    GuildBanRemove,
    GuildEmojisUpdate,
    GuildMemberAdd,
    GuildMemberUpdate,
    GuildMemberRemove,
    GuildRoleCreate,
    GuildRoleUpdate,
    GuildRoleDelete,
    MessageCreate,
    MessageUpdate,
    MessageDelete,
    MessageDeleteBulk,
    MessageReactionAdd,
    MessageReactionRemove,
    MessageReactionRemoveAll,
    PresenceUpdate,
    TypingStart,
    UserUpdate,
    WebhooksUpdate,
}

impl EventKind {
    /// The canonical wire name (upper snake case).
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::ChannelCreate => "CHANNEL_CREATE",
            EventKind::ChannelUpdate => "CHANNEL_UPDATE",
            EventKind::ChannelDelete => "CHANNEL_DELETE",
            EventKind::ChannelPinsUpdate => "CHANNEL_PINS_UPDATE",
            EventKind::GuildCreate => "GUILD_CREATE",
            EventKind::GuildUpdate => "GUILD_UPDATE",
            EventKind::GuildDelete => "GUILD_DELETE",
            EventKind::GuildBanAdd => "GUILD_BAN_ADD",
            EventKind::GuildBanRemove => "GUILD_BAN_REMOVE",
            EventKind::GuildEmojisUpdate => "GUILD_EMOJIS_UPDATE",
            EventKind::GuildMemberAdd => "GUILD_MEMBER_ADD",
            EventKind::GuildMemberUpdate => "GUILD_MEMBER_UPDATE",
            EventKind::GuildMemberRemove => "GUILD_MEMBER_REMOVE",
            EventKind::GuildRoleCreate => "GUILD_ROLE_CREATE",
            EventKind::GuildRoleUpdate => "GUILD_ROLE_UPDATE",
            EventKind::GuildRoleDelete => "GUILD_ROLE_DELETE",
            EventKind::MessageCreate => "MESSAGE_CREATE",
            EventKind::MessageUpdate => "MESSAGE_UPDATE",
            EventKind::MessageDelete => "MESSAGE_DELETE",
            EventKind::MessageDeleteBulk => "MESSAGE_DELETE_BULK",
            EventKind::MessageReactionAdd => "MESSAGE_REACTION_ADD",
            EventKind::MessageReactionRemove => "MESSAGE_REACTION_REMOVE",
            EventKind::MessageReactionRemoveAll => "MESSAGE_REACTION_REMOVE_ALL",
            EventKind::PresenceUpdate => "PRESENCE_UPDATE",
            EventKind::TypingStart => "TYPING_START",
            EventKind::UserUpdate => "USER_UPDATE",
            EventKind::WebhooksUpdate => "WEBHOOKS_UPDATE",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse failure for an event name outside the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEventName;

impl FromStr for EventKind {
    type Err = UnknownEventName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.to_ascii_uppercase().as_str() {
            "CHANNEL_CREATE" => EventKind::ChannelCreate,
            "CHANNEL_UPDATE" => EventKind::ChannelUpdate,
            "CHANNEL_DELETE" => EventKind::ChannelDelete,
            "CHANNEL_PINS_UPDATE" => EventKind::ChannelPinsUpdate,
            "GUILD_CREATE" => EventKind::GuildCreate,
            "GUILD_UPDATE" => EventKind::GuildUpdate,
            "GUILD_DELETE" => EventKind::GuildDelete,
            "GUILD_BAN_ADD" => EventKind::GuildBanAdd,
            "GUILD_BAN_REMOVE" => EventKind::GuildBanRemove,
            "GUILD_EMOJIS_UPDATE" => EventKind::GuildEmojisUpdate,
            "GUILD_MEMBER_ADD" => EventKind::GuildMemberAdd,
            "GUILD_MEMBER_UPDATE" => EventKind::GuildMemberUpdate,
            "GUILD_MEMBER_REMOVE" => EventKind::GuildMemberRemove,
            "GUILD_ROLE_CREATE" => EventKind::GuildRoleCreate,
            "GUILD_ROLE_UPDATE" => EventKind::GuildRoleUpdate,
            "GUILD_ROLE_DELETE" => EventKind::GuildRoleDelete,
            "MESSAGE_CREATE" => EventKind::MessageCreate,
            "MESSAGE_UPDATE" => EventKind::MessageUpdate,
            "MESSAGE_DELETE" => EventKind::MessageDelete,
            "MESSAGE_DELETE_BULK" => EventKind::MessageDeleteBulk,
            "MESSAGE_REACTION_ADD" => EventKind::MessageReactionAdd,
            "MESSAGE_REACTION_REMOVE" => EventKind::MessageReactionRemove,
            "MESSAGE_REACTION_REMOVE_ALL" => EventKind::MessageReactionRemoveAll,
            "PRESENCE_UPDATE" => EventKind::PresenceUpdate,
            "TYPING_START" => EventKind::TypingStart,
            "USER_UPDATE" => EventKind::UserUpdate,
            "WEBHOOKS_UPDATE" => EventKind::WebhooksUpdate,
            _ => return Err(UnknownEventName),
        };
        Ok(kind)
    }
}

/// A reacting or banned party, at whatever resolution the cache had.
#[derive(Debug, Clone)]
pub enum UserOrMember {
    User(UserRef),
    Member(MemberRef),
}

/// Outbound notification published by the adapter.
#[derive(Debug, Clone)]
pub enum Event {
    /// Verbatim payload of a recognised event, emitted before its handler
    /// runs.
    Raw { kind: EventKind, payload: Value },

    /// Verbatim payload of an unrecognised event.
    Passthrough { name: String, payload: Value },

    DmChannelCreated { channel: DmChannelRef },
    GuildChannelCreated { channel: GuildChannelRef },
    DmChannelUpdated { old: DmChannel, new: DmChannelRef },
    GuildChannelUpdated { old: GuildChannel, new: GuildChannelRef },
    ChannelDeleted { channel: Channel },
    ChannelPinsUpdated { channel: Channel, last_pin_timestamp: Option<DateTime<Utc>> },

    GuildCreated { guild: GuildRef },
    GuildAvailable { guild: GuildRef },
    GuildUpdated { old: Guild, new: GuildRef },
    GuildUnavailable { guild: GuildRef },
    GuildLeft { guild: GuildRef },
    GuildEmojisUpdated { guild: GuildRef, old: Vec<GuildEmojiRef>, new: Vec<GuildEmojiRef> },

    BanAdded { guild: GuildRef, user: UserOrMember },
    BanRemoved { guild: GuildRef, user: UserRef },

    MemberAdded { member: MemberRef },
    MemberUpdated { old: Member, new: MemberRef },
    MemberRemoved { member: MemberRef },

    RoleCreated { role: RoleRef },
    RoleUpdated { old: Role, new: RoleRef },
    RoleDeleted { role: RoleRef },

    MessageCreated { message: MessageRef },
    MessageUpdated { old: Message, new: MessageRef },
    MessageDeleted { message: MessageRef },
    MessagesBulkDeleted { channel: Channel, messages: HashMap<i64, Option<MessageRef>> },

    ReactionAdded { reaction: Reaction, user: UserOrMember },
    ReactionRemoved { reaction: Reaction, user: UserOrMember },
    AllReactionsRemoved { message: MessageRef },

    PresenceUpdated { member: MemberRef, presence: Arc<Presence> },
    TypingStarted { channel: Channel, user: Option<UserRef> },
    OwnUserUpdated { user: UserRef },
    WebhooksUpdated { channel: Channel },
}
