//! # Domain Entities
//!
//! Core domain entities mirroring the chat platform's object model. Every
//! cached entity lives in an `Arc<RwLock<T>>` cell so that one update is
//! observed everywhere the entity is referenced.
//!
//! ## Core Entities
//!
//! - **Guild**: A community owning channels, members, roles, and emoji
//! - **Channel**: A guild channel or a direct-message channel
//! - **User**: A global user account, shared across guilds
//! - **Member**: A user's membership in a specific guild
//! - **Role**: A set of permissions assignable to guild members
//! - **Message**: A text message sent in a channel
//!
//! ## Supporting Entities
//!
//! - **Emoji**: Unicode, unknown-custom, or cached guild emoji
//! - **Reaction**: Aggregate emoji reaction counts on messages
//! - **Presence**: Per-member status and activity
//! - **Webhook**: Incoming webhooks, parsed but never cached
//!
//! Entities parse their own scalar fields from gateway payloads; resolving
//! nested entities (a message's author, a member's user) is the registry's
//! job so that entities hold no registry back-references.

mod channel;
mod emoji;
mod guild;
mod member;
mod message;
mod presence;
mod reaction;
mod role;
mod user;
mod webhook;

pub use channel::{
    is_dm_channel_type, Channel, DmChannel, DmChannelRef, GuildChannel, GuildChannelRef,
    PermissionOverwrite,
};
pub use emoji::{Emoji, EmojiKey, GuildEmoji, GuildEmojiRef};
pub use guild::{Guild, GuildRef};
pub use member::{Member, MemberRef};
pub use message::{Message, MessageAuthor, MessageRef};
pub use presence::{Presence, PresenceStatus};
pub use reaction::Reaction;
pub use role::{Role, RoleRef};
pub use user::{User, UserRef};
pub use webhook::Webhook;
