//! In-memory state registry implementation.
//!
//! All indexes live inside a single `RegistryInner` guarded by one
//! `parking_lot::RwLock`; every trait method is exactly one critical
//! section. Message lookups refresh cache recency, so they take the write
//! lock too.
//!
//! Retention model:
//! - guilds are held strongly and own their channels, members, roles, and
//!   emoji;
//! - the global user, emoji, and guild-channel indexes hold `Weak` refs,
//!   so those entries live only as long as an owner (guild, member,
//!   message, or caller) keeps them alive;
//! - messages and direct-message channels sit in bounded LRU maps;
//! - the bot's own user has a dedicated strong slot.
//!
//! Internal methods on `RegistryInner` take `&mut self`, which keeps the
//! lock non-reentrant by construction.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::CacheSettings;
use crate::domain::entities::{
    is_dm_channel_type, Channel, DmChannel, DmChannelRef, Emoji, Guild, GuildChannel, GuildEmoji,
    GuildEmojiRef, GuildRef, Member, MemberRef, Message, MessageAuthor, MessageRef, Presence,
    Reaction, Role, RoleRef, User, UserRef, Webhook,
};
use crate::registry::{ChannelDiff, LruMap, PresenceDiff, StateRegistry};
use crate::shared::error::CacheError;
use crate::shared::payload;

/// The in-memory cache behind [`StateRegistry`].
pub struct InMemoryRegistry {
    inner: RwLock<RegistryInner>,
}

struct RegistryInner {
    guilds: HashMap<i64, GuildRef>,
    guild_channels: HashMap<i64, Weak<RwLock<GuildChannel>>>,
    dm_channels: LruMap<i64, DmChannelRef>,
    users: HashMap<i64, Weak<RwLock<User>>>,
    me: Option<UserRef>,
    emojis: HashMap<i64, Weak<RwLock<GuildEmoji>>>,
    messages: LruMap<i64, MessageRef>,
}

impl InMemoryRegistry {
    /// Create a registry sized by the given cache settings.
    pub fn new(settings: &CacheSettings) -> Self {
        InMemoryRegistry {
            inner: RwLock::new(RegistryInner {
                guilds: HashMap::new(),
                guild_channels: HashMap::new(),
                dm_channels: LruMap::new(settings.dm_channel_cache_size),
                users: HashMap::new(),
                me: None,
                emojis: HashMap::new(),
                messages: LruMap::new(settings.message_cache_size),
            }),
        }
    }
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        InMemoryRegistry::new(&CacheSettings {
            message_cache_size: 100,
            dm_channel_cache_size: 100,
        })
    }
}

impl RegistryInner {
    fn get_guild(&self, guild_id: i64) -> Option<GuildRef> {
        self.guilds.get(&guild_id).cloned()
    }

    fn get_channel(&mut self, channel_id: i64) -> Option<Channel> {
        if let Some(channel) = self.guild_channels.get(&channel_id).and_then(Weak::upgrade) {
            return Some(Channel::Guild(channel));
        }
        self.dm_channels.get(&channel_id).cloned().map(Channel::Dm)
    }

    fn get_user(&self, user_id: i64) -> Option<UserRef> {
        if let Some(me) = &self.me {
            if me.read().id == user_id {
                return Some(me.clone());
            }
        }
        self.users.get(&user_id).and_then(Weak::upgrade)
    }

    fn get_member(&self, user_id: i64, guild_id: i64) -> Option<MemberRef> {
        self.guilds
            .get(&guild_id)?
            .read()
            .members
            .get(&user_id)
            .cloned()
    }

    fn parse_bot_user(&mut self, payload: &Value) -> Result<UserRef, CacheError> {
        let user_id = payload::require_id(payload, "id")?;
        match &self.me {
            Some(me) if me.read().id == user_id => {
                me.write().update_state(payload);
                Ok(me.clone())
            }
            _ => {
                let me = User::from_payload(payload)?.into_ref();
                debug!(user_id, "caching own user");
                self.me = Some(me.clone());
                Ok(me)
            }
        }
    }

    fn parse_user(&mut self, payload: &Value) -> Result<UserRef, CacheError> {
        let user_id = payload::require_id(payload, "id")?;
        let is_me = self
            .me
            .as_ref()
            .is_some_and(|me| me.read().id == user_id);
        if is_me || User::payload_is_bot_account(payload) {
            return self.parse_bot_user(payload);
        }

        if let Some(user) = self.users.get(&user_id).and_then(Weak::upgrade) {
            user.write().update_state(payload);
            return Ok(user);
        }

        let user = User::from_payload(payload)?.into_ref();
        self.users.insert(user_id, Arc::downgrade(&user));
        Ok(user)
    }

    fn parse_guild(&mut self, payload: &Value) -> Result<GuildRef, CacheError> {
        let guild_id = payload::require_id(payload, "id")?;
        let unavailable = payload::bool_field(payload, "unavailable").unwrap_or(false);

        if let Some(guild) = self.get_guild(guild_id) {
            if unavailable {
                // An outage notice for a known guild only flips the flag;
                // the last known state is kept.
                guild.write().is_unavailable = true;
            } else {
                guild.write().update_state(payload);
                guild.write().is_unavailable = false;
                self.ingest_guild_collections(&guild, guild_id, payload)?;
            }
            return Ok(guild);
        }

        let guild = Guild::from_payload(payload)?.into_ref();
        self.guilds.insert(guild_id, guild.clone());
        if !unavailable {
            self.ingest_guild_collections(&guild, guild_id, payload)?;
        }
        Ok(guild)
    }

    /// Ingest the nested arrays of a guild payload. Roles and channels come
    /// before members so that member role ids and message channels resolve.
    fn ingest_guild_collections(
        &mut self,
        guild: &GuildRef,
        guild_id: i64,
        payload: &Value,
    ) -> Result<(), CacheError> {
        if let Some(roles) = payload.get("roles").and_then(Value::as_array) {
            for role_payload in roles {
                self.parse_role(role_payload, guild_id)?;
            }
        }
        if let Some(emojis) = payload.get("emojis").and_then(Value::as_array) {
            for emoji_payload in emojis {
                self.parse_emoji(emoji_payload, Some(guild_id))?;
            }
        }
        if let Some(channels) = payload.get("channels").and_then(Value::as_array) {
            for channel_payload in channels {
                self.parse_channel(channel_payload, Some(guild_id))?;
            }
        }
        if let Some(members) = payload.get("members").and_then(Value::as_array) {
            for member_payload in members {
                self.parse_member(member_payload, guild_id)?;
            }
        }
        if let Some(presences) = payload.get("presences").and_then(Value::as_array) {
            for presence_payload in presences {
                let user_id = presence_payload
                    .get("user")
                    .and_then(|user| payload::optional_id(user, "id"));
                if let Some(user_id) = user_id {
                    self.parse_presence(user_id, guild_id, presence_payload);
                }
            }
        }
        debug!(
            guild_id,
            channels = guild.read().channels.len(),
            members = guild.read().members.len(),
            roles = guild.read().roles.len(),
            "ingested guild"
        );
        Ok(())
    }

    fn parse_channel(
        &mut self,
        payload: &Value,
        guild_id: Option<i64>,
    ) -> Result<Option<Channel>, CacheError> {
        let channel_id = payload::require_id(payload, "id")?;
        let type_code = payload::int_field(payload, "type").unwrap_or(0);

        if is_dm_channel_type(type_code) {
            if let Some(channel) = self.dm_channels.get(&channel_id).cloned() {
                channel.write().update_state(payload);
                return Ok(Some(Channel::Dm(channel)));
            }
            let mut recipients = Vec::new();
            if let Some(entries) = payload.get("recipients").and_then(Value::as_array) {
                for entry in entries {
                    recipients.push(self.parse_user(entry)?);
                }
            }
            let channel = DmChannel::from_payload(payload, recipients)?.into_ref();
            self.dm_channels.insert(channel_id, channel.clone());
            return Ok(Some(Channel::Dm(channel)));
        }

        // Guild channel: the guild must already be cached, and a missing
        // guild_id field is filled in from the argument.
        let guild_id = guild_id.or_else(|| payload::optional_id(payload, "guild_id"));
        let guild = match guild_id.and_then(|id| self.get_guild(id)) {
            Some(guild) => guild,
            None => return Ok(None),
        };
        let owning_guild_id = guild.read().id;

        let existing = guild.read().channels.get(&channel_id).cloned();
        if let Some(channel) = existing {
            channel.write().update_state(payload);
            return Ok(Some(Channel::Guild(channel)));
        }

        let channel = GuildChannel::from_payload(payload, owning_guild_id)?.into_ref();
        guild.write().channels.insert(channel_id, channel.clone());
        self.guild_channels
            .insert(channel_id, Arc::downgrade(&channel));
        Ok(Some(Channel::Guild(channel)))
    }

    fn parse_member(
        &mut self,
        payload: &Value,
        guild_id: i64,
    ) -> Result<Option<MemberRef>, CacheError> {
        let guild = match self.get_guild(guild_id) {
            Some(guild) => guild,
            None => return Ok(None),
        };

        let user_payload = payload::require(payload, "user")?;
        let user = self.parse_user(user_payload)?;
        let user_id = user.read().id;

        let existing = guild.read().members.get(&user_id).cloned();
        if let Some(member) = existing {
            member.write().update_state(payload);
            return Ok(Some(member));
        }

        let member = Member::from_payload(payload, guild_id, user).into_ref();
        guild.write().members.insert(user_id, member.clone());
        Ok(Some(member))
    }

    fn parse_role(&mut self, payload: &Value, guild_id: i64) -> Result<Option<RoleRef>, CacheError> {
        let guild = match self.get_guild(guild_id) {
            Some(guild) => guild,
            None => return Ok(None),
        };
        let role_id = payload::require_id(payload, "id")?;

        let existing = guild.read().roles.get(&role_id).cloned();
        if let Some(role) = existing {
            role.write().update_state(payload);
            return Ok(Some(role));
        }

        let role = Role::from_payload(payload, guild_id)?.into_ref();
        guild.write().roles.insert(role_id, role.clone());
        Ok(Some(role))
    }

    fn parse_emoji(
        &mut self,
        payload: &Value,
        guild_id: Option<i64>,
    ) -> Result<Emoji, CacheError> {
        let emoji_id = payload::optional_id(payload, "id");
        let Some(emoji_id) = emoji_id else {
            // No id means a plain unicode emoji.
            let name = payload::string_field(payload, "name")
                .ok_or(CacheError::MissingField("name"))?;
            return Ok(Emoji::Unicode { name });
        };

        let guild_id = guild_id.or_else(|| payload::optional_id(payload, "guild_id"));
        let guild = guild_id.and_then(|id| self.get_guild(id));
        let Some(guild) = guild else {
            return Ok(Emoji::Unknown {
                id: emoji_id,
                name: payload::string_field(payload, "name"),
            });
        };
        let owning_guild_id = guild.read().id;

        let existing = guild.read().emojis.get(&emoji_id).cloned();
        if let Some(emoji) = existing {
            emoji.write().update_state(payload);
            return Ok(Emoji::Guild(emoji));
        }

        let emoji = GuildEmoji::from_payload(payload, owning_guild_id)?.into_ref();
        guild.write().emojis.insert(emoji_id, emoji.clone());
        self.emojis.insert(emoji_id, Arc::downgrade(&emoji));
        Ok(Emoji::Guild(emoji))
    }

    fn parse_message(&mut self, payload: &Value) -> Result<Option<MessageRef>, CacheError> {
        let channel_id = payload::require_id(payload, "channel_id")?;
        let channel = match self.get_channel(channel_id) {
            Some(channel) => channel,
            None => return Ok(None),
        };
        let guild_id = channel.guild_id();

        let author = self.resolve_author(payload, channel_id, guild_id)?;
        let mut message = Message::from_payload(payload, channel_id, guild_id, author)?;

        if let Some(entries) = payload.get("reactions").and_then(Value::as_array) {
            for entry in entries {
                let emoji_payload = payload::require(entry, "emoji")?;
                let emoji = self.parse_emoji(emoji_payload, guild_id)?;
                message.reactions.push(Reaction {
                    count: payload::uint_field(entry, "count").unwrap_or(1),
                    message_id: message.id,
                    emoji,
                });
            }
        }

        let message_id = message.id;
        let message = message.into_ref();
        // Always a fresh object; a duplicate create replaces the old cell.
        self.messages.insert(message_id, message.clone());

        match channel {
            Channel::Guild(channel) => channel.write().last_message_id = Some(message_id),
            Channel::Dm(channel) => channel.write().last_message_id = Some(message_id),
        }
        Ok(Some(message))
    }

    /// Pick the best author representation the cache can offer: webhook if
    /// the payload says so, the cached member for guild messages, the bare
    /// user otherwise.
    fn resolve_author(
        &mut self,
        payload: &Value,
        channel_id: i64,
        guild_id: Option<i64>,
    ) -> Result<MessageAuthor, CacheError> {
        if let Some(webhook_id) = payload::optional_id(payload, "webhook_id") {
            let mut webhook = Webhook {
                id: webhook_id,
                guild_id,
                channel_id: Some(channel_id),
                name: None,
                avatar_hash: None,
                creator: None,
            };
            if let Some(author) = payload.get("author") {
                webhook.name = payload::string_field(author, "username");
                webhook.avatar_hash = payload::string_field(author, "avatar");
            }
            return Ok(MessageAuthor::Webhook(Arc::new(webhook)));
        }

        let author_payload = payload::require(payload, "author")?;
        let user = self.parse_user(author_payload)?;
        let user_id = user.read().id;

        if let Some(guild_id) = guild_id {
            if let Some(member) = self.get_member(user_id, guild_id) {
                return Ok(MessageAuthor::Member(member));
            }
        }
        Ok(MessageAuthor::User(user))
    }

    fn parse_reaction(&mut self, payload: &Value) -> Result<Reaction, CacheError> {
        let message_id = payload::require_id(payload, "message_id")?;
        let emoji_payload = payload::require(payload, "emoji")?;
        let guild_id = payload::optional_id(payload, "guild_id");
        let emoji = self.parse_emoji(emoji_payload, guild_id)?;
        Ok(Reaction {
            count: payload::uint_field(payload, "count").unwrap_or(1),
            message_id,
            emoji,
        })
    }

    fn parse_presence(
        &mut self,
        user_id: i64,
        guild_id: i64,
        payload: &Value,
    ) -> Option<Arc<Presence>> {
        let member = self.get_member(user_id, guild_id)?;
        let presence = Arc::new(Presence::from_payload(payload));
        member.write().set_presence(presence.clone());
        Some(presence)
    }

    fn parse_webhook(&mut self, payload: &Value) -> Result<Arc<Webhook>, CacheError> {
        let mut webhook = Webhook::from_payload(payload)?;
        if let Some(user_payload) = payload.get("user") {
            webhook.creator = Some(self.parse_user(user_payload)?);
        }
        Ok(Arc::new(webhook))
    }

    fn update_guild(&mut self, payload: &Value) -> Result<Option<(Guild, GuildRef)>, CacheError> {
        let guild_id = payload::require_id(payload, "id")?;
        let Some(guild) = self.get_guild(guild_id) else {
            return Ok(None);
        };
        let old = guild.read().clone();
        guild.write().update_state(payload);
        Ok(Some((old, guild)))
    }

    fn update_channel(&mut self, payload: &Value) -> Result<Option<ChannelDiff>, CacheError> {
        let channel_id = payload::require_id(payload, "id")?;
        match self.get_channel(channel_id) {
            Some(Channel::Guild(channel)) => {
                let old = channel.read().clone();
                channel.write().update_state(payload);
                Ok(Some(ChannelDiff::Guild { old, new: channel }))
            }
            Some(Channel::Dm(channel)) => {
                let old = channel.read().clone();
                channel.write().update_state(payload);
                Ok(Some(ChannelDiff::Dm { old, new: channel }))
            }
            None => Ok(None),
        }
    }

    fn update_member(
        &mut self,
        payload: &Value,
        guild_id: i64,
    ) -> Result<Option<(Member, MemberRef)>, CacheError> {
        let user_payload = payload::require(payload, "user")?;
        let user_id = payload::require_id(user_payload, "id")?;
        let Some(member) = self.get_member(user_id, guild_id) else {
            return Ok(None);
        };
        let old = member.read().clone();
        member.write().update_state(payload);
        member.read().user.write().update_state(user_payload);
        Ok(Some((old, member)))
    }

    fn update_role(
        &mut self,
        payload: &Value,
        guild_id: i64,
    ) -> Result<Option<(Role, RoleRef)>, CacheError> {
        let role_id = payload::require_id(payload, "id")?;
        let role = self
            .get_guild(guild_id)
            .and_then(|guild| guild.read().roles.get(&role_id).cloned());
        let Some(role) = role else {
            return Ok(None);
        };
        let old = role.read().clone();
        role.write().update_state(payload);
        Ok(Some((old, role)))
    }

    fn update_message(
        &mut self,
        payload: &Value,
    ) -> Result<Option<(Message, MessageRef)>, CacheError> {
        let message_id = payload::require_id(payload, "id")?;
        let Some(message) = self.messages.get(&message_id).cloned() else {
            return Ok(None);
        };
        let old = message.read().clone();
        message.write().update_state(payload);
        Ok(Some((old, message)))
    }

    fn update_guild_emojis(
        &mut self,
        emoji_payloads: &[Value],
        guild_id: i64,
    ) -> Result<Option<(Vec<GuildEmojiRef>, Vec<GuildEmojiRef>)>, CacheError> {
        let Some(guild) = self.get_guild(guild_id) else {
            return Ok(None);
        };
        let old: Vec<GuildEmojiRef> = guild.read().emojis.values().cloned().collect();

        // Upsert through parse_emoji so surviving emoji keep their cells,
        // then swap the owned set wholesale. Evicted emoji stay alive only
        // through the old snapshot returned to the caller.
        let mut new_set = HashMap::new();
        for emoji_payload in emoji_payloads {
            if let Emoji::Guild(emoji) = self.parse_emoji(emoji_payload, Some(guild_id))? {
                let emoji_id = emoji.read().id;
                new_set.insert(emoji_id, emoji);
            }
        }
        let new: Vec<GuildEmojiRef> = new_set.values().cloned().collect();
        guild.write().emojis = new_set;
        Ok(Some((old, new)))
    }

    fn update_member_presence(
        &mut self,
        payload: &Value,
    ) -> Result<Option<PresenceDiff>, CacheError> {
        let guild_id = payload::require_id(payload, "guild_id")?;
        let user_payload = payload::require(payload, "user")?;
        let user_id = payload::require_id(user_payload, "id")?;

        let Some(guild) = self.get_guild(guild_id) else {
            return Ok(None);
        };
        let Some(member) = guild.read().members.get(&user_id).cloned() else {
            return Ok(None);
        };

        if let Some(role_ids) = payload::id_list(payload, "roles") {
            for role_id in &role_ids {
                if !guild.read().roles.contains_key(role_id) {
                    warn!(guild_id, user_id, role_id, "presence names an uncached role");
                }
            }
            member.write().replace_roles(role_ids);
        }

        let new = Arc::new(Presence::from_payload(payload));
        let old = member.write().set_presence(new.clone());
        Ok(Some(PresenceDiff { member, old, new }))
    }

    fn delete_guild(&mut self, guild_id: i64) -> Option<GuildRef> {
        self.guilds.remove(&guild_id)
    }

    fn delete_channel(&mut self, channel_id: i64) -> Option<Channel> {
        if let Some(channel) = self
            .guild_channels
            .remove(&channel_id)
            .and_then(|weak| weak.upgrade())
        {
            let guild_id = channel.read().guild_id;
            if let Some(guild) = self.get_guild(guild_id) {
                guild.write().channels.remove(&channel_id);
            }
            return Some(Channel::Guild(channel));
        }
        self.dm_channels.remove(&channel_id).map(Channel::Dm)
    }

    fn delete_message(&mut self, message_id: i64) -> Option<MessageRef> {
        self.messages.remove(&message_id)
    }

    fn delete_member(&mut self, user_id: i64, guild_id: i64) -> Option<MemberRef> {
        let guild = self.get_guild(guild_id)?;
        let member = guild.write().members.remove(&user_id);
        member
    }

    fn delete_emoji(&mut self, emoji_id: i64) -> Option<GuildEmojiRef> {
        let emoji = self.emojis.remove(&emoji_id).and_then(|weak| weak.upgrade())?;
        let guild_id = emoji.read().guild_id;
        if let Some(guild) = self.get_guild(guild_id) {
            guild.write().emojis.remove(&emoji_id);
        }
        Some(emoji)
    }

    fn delete_role(&mut self, guild_id: i64, role_id: i64) -> Option<RoleRef> {
        let guild = self.get_guild(guild_id)?;
        let role = guild.write().roles.remove(&role_id)?;
        // Cascade: members must never point at a deleted role. O(members),
        // but role deletion is rare.
        for member in guild.read().members.values() {
            member.write().remove_role(role_id);
        }
        Some(role)
    }

    fn add_reaction(&mut self, message_id: i64, emoji: Emoji) -> Option<Reaction> {
        let message = self.messages.get(&message_id).cloned()?;
        let mut message = message.write();
        let key = emoji.key();
        if let Some(reaction) = message
            .reactions
            .iter_mut()
            .find(|reaction| reaction.emoji.key() == key)
        {
            reaction.count += 1;
            return Some(reaction.clone());
        }
        let reaction = Reaction::new(message_id, emoji);
        message.reactions.push(reaction.clone());
        Some(reaction)
    }

    fn remove_reaction(&mut self, message_id: i64, emoji: Emoji) -> Option<Reaction> {
        let message = self.messages.get(&message_id).cloned()?;
        let mut message = message.write();
        let key = emoji.key();
        let index = message
            .reactions
            .iter()
            .position(|reaction| reaction.emoji.key() == key);
        let Some(index) = index else {
            // The message is cached but nobody reacted with this emoji;
            // report an already-zero count.
            return Some(Reaction {
                count: 0,
                message_id,
                emoji,
            });
        };
        message.reactions[index].count = message.reactions[index].count.saturating_sub(1);
        let snapshot = message.reactions[index].clone();
        if snapshot.count == 0 {
            message.reactions.remove(index);
        }
        Some(snapshot)
    }

    fn remove_all_reactions(&mut self, message_id: i64) -> Option<MessageRef> {
        let message = self.messages.get(&message_id).cloned()?;
        {
            let mut message = message.write();
            // Zero first so snapshots taken earlier observe the clearing.
            for reaction in &mut message.reactions {
                reaction.count = 0;
            }
            message.reactions.clear();
        }
        Some(message)
    }

    fn set_guild_unavailability(&mut self, guild_id: i64, unavailable: bool) {
        if let Some(guild) = self.get_guild(guild_id) {
            guild.write().is_unavailable = unavailable;
        }
    }

    fn sweep(&mut self) {
        self.users.retain(|_, weak| weak.strong_count() > 0);
        self.emojis.retain(|_, weak| weak.strong_count() > 0);
        self.guild_channels.retain(|_, weak| weak.strong_count() > 0);
    }
}

impl StateRegistry for InMemoryRegistry {
    fn get_guild_by_id(&self, guild_id: i64) -> Option<GuildRef> {
        self.inner.read().get_guild(guild_id)
    }

    fn get_channel_by_id(&self, channel_id: i64) -> Option<Channel> {
        // Write lock: a DM hit refreshes LRU recency.
        self.inner.write().get_channel(channel_id)
    }

    fn get_user_by_id(&self, user_id: i64) -> Option<UserRef> {
        self.inner.read().get_user(user_id)
    }

    fn get_member_by_id(&self, user_id: i64, guild_id: i64) -> Option<MemberRef> {
        self.inner.read().get_member(user_id, guild_id)
    }

    fn get_role_by_id(&self, guild_id: i64, role_id: i64) -> Option<RoleRef> {
        self.inner
            .read()
            .get_guild(guild_id)?
            .read()
            .roles
            .get(&role_id)
            .cloned()
    }

    fn get_emoji_by_id(&self, emoji_id: i64) -> Option<GuildEmojiRef> {
        self.inner.read().emojis.get(&emoji_id).and_then(Weak::upgrade)
    }

    fn get_message_by_id(&self, message_id: i64) -> Option<MessageRef> {
        self.inner.write().messages.get(&message_id).cloned()
    }

    fn me(&self) -> Option<UserRef> {
        self.inner.read().me.clone()
    }

    fn parse_bot_user(&self, payload: &Value) -> Result<UserRef, CacheError> {
        self.inner.write().parse_bot_user(payload)
    }

    fn parse_user(&self, payload: &Value) -> Result<UserRef, CacheError> {
        self.inner.write().parse_user(payload)
    }

    fn parse_guild(&self, payload: &Value) -> Result<GuildRef, CacheError> {
        self.inner.write().parse_guild(payload)
    }

    fn parse_channel(
        &self,
        payload: &Value,
        guild_id: Option<i64>,
    ) -> Result<Option<Channel>, CacheError> {
        self.inner.write().parse_channel(payload, guild_id)
    }

    fn parse_member(&self, payload: &Value, guild_id: i64) -> Result<Option<MemberRef>, CacheError> {
        self.inner.write().parse_member(payload, guild_id)
    }

    fn parse_role(&self, payload: &Value, guild_id: i64) -> Result<Option<RoleRef>, CacheError> {
        self.inner.write().parse_role(payload, guild_id)
    }

    fn parse_emoji(&self, payload: &Value, guild_id: Option<i64>) -> Result<Emoji, CacheError> {
        self.inner.write().parse_emoji(payload, guild_id)
    }

    fn parse_message(&self, payload: &Value) -> Result<Option<MessageRef>, CacheError> {
        self.inner.write().parse_message(payload)
    }

    fn parse_reaction(&self, payload: &Value) -> Result<Reaction, CacheError> {
        self.inner.write().parse_reaction(payload)
    }

    fn parse_presence(&self, user_id: i64, guild_id: i64, payload: &Value) -> Option<Arc<Presence>> {
        self.inner.write().parse_presence(user_id, guild_id, payload)
    }

    fn parse_webhook(&self, payload: &Value) -> Result<Arc<Webhook>, CacheError> {
        self.inner.write().parse_webhook(payload)
    }

    fn update_guild(&self, payload: &Value) -> Result<Option<(Guild, GuildRef)>, CacheError> {
        self.inner.write().update_guild(payload)
    }

    fn update_channel(&self, payload: &Value) -> Result<Option<ChannelDiff>, CacheError> {
        self.inner.write().update_channel(payload)
    }

    fn update_member(
        &self,
        payload: &Value,
        guild_id: i64,
    ) -> Result<Option<(Member, MemberRef)>, CacheError> {
        self.inner.write().update_member(payload, guild_id)
    }

    fn update_role(
        &self,
        payload: &Value,
        guild_id: i64,
    ) -> Result<Option<(Role, RoleRef)>, CacheError> {
        self.inner.write().update_role(payload, guild_id)
    }

    fn update_message(&self, payload: &Value) -> Result<Option<(Message, MessageRef)>, CacheError> {
        self.inner.write().update_message(payload)
    }

    fn update_guild_emojis(
        &self,
        emoji_payloads: &[Value],
        guild_id: i64,
    ) -> Result<Option<(Vec<GuildEmojiRef>, Vec<GuildEmojiRef>)>, CacheError> {
        self.inner.write().update_guild_emojis(emoji_payloads, guild_id)
    }

    fn update_member_presence(&self, payload: &Value) -> Result<Option<PresenceDiff>, CacheError> {
        self.inner.write().update_member_presence(payload)
    }

    fn delete_guild(&self, guild_id: i64) -> Option<GuildRef> {
        self.inner.write().delete_guild(guild_id)
    }

    fn delete_channel(&self, channel_id: i64) -> Option<Channel> {
        self.inner.write().delete_channel(channel_id)
    }

    fn delete_message(&self, message_id: i64) -> Option<MessageRef> {
        self.inner.write().delete_message(message_id)
    }

    fn delete_member(&self, user_id: i64, guild_id: i64) -> Option<MemberRef> {
        self.inner.write().delete_member(user_id, guild_id)
    }

    fn delete_emoji(&self, emoji_id: i64) -> Option<GuildEmojiRef> {
        self.inner.write().delete_emoji(emoji_id)
    }

    fn delete_role(&self, guild_id: i64, role_id: i64) -> Option<RoleRef> {
        self.inner.write().delete_role(guild_id, role_id)
    }

    fn add_reaction(&self, message_id: i64, emoji: Emoji) -> Option<Reaction> {
        self.inner.write().add_reaction(message_id, emoji)
    }

    fn remove_reaction(&self, message_id: i64, emoji: Emoji) -> Option<Reaction> {
        self.inner.write().remove_reaction(message_id, emoji)
    }

    fn remove_all_reactions(&self, message_id: i64) -> Option<MessageRef> {
        self.inner.write().remove_all_reactions(message_id)
    }

    fn set_guild_unavailability(&self, guild_id: i64, unavailable: bool) {
        self.inner.write().set_guild_unavailability(guild_id, unavailable);
    }

    fn sweep(&self) {
        self.inner.write().sweep();
    }
}
