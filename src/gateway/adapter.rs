//! Gateway event adapter.
//!
//! Consumes raw gateway dispatches, reconciles them into the state
//! registry, and publishes [`Event`]s on a broadcast channel. The contract
//! per payload:
//! 1. an unrecognised name publishes `Passthrough` and is warned about
//!    once per distinct name;
//! 2. a recognised name publishes `Raw` before its handler runs, so
//!    subscribers always see the verbatim payload even when the typed
//!    event is suppressed;
//! 3. a handler that cannot resolve a parent entity warns and suppresses
//!    the typed event;
//! 4. a malformed payload aborts only that event, with a diagnostic.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashSet;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::config::GatewaySettings;
use crate::domain::entities::Channel;
use crate::gateway::events::{Event, EventKind, UserOrMember};
use crate::registry::{ChannelDiff, StateRegistry};
use crate::shared::error::CacheError;
use crate::shared::payload;

/// Reconciles gateway dispatches into the registry and fans out typed
/// events.
pub struct EventAdapter {
    registry: Arc<dyn StateRegistry>,
    events_tx: broadcast::Sender<Event>,
    unknown_events: DashSet<String>,
}

impl EventAdapter {
    /// Create an adapter publishing into a broadcast channel sized by the
    /// gateway settings.
    pub fn new(registry: Arc<dyn StateRegistry>, settings: &GatewaySettings) -> Self {
        let (events_tx, _) = broadcast::channel(settings.event_buffer_size);
        EventAdapter {
            registry,
            events_tx,
            unknown_events: DashSet::new(),
        }
    }

    /// Subscribe to the outbound event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events_tx.subscribe()
    }

    /// Shared handle to the registry this adapter reconciles into.
    pub fn registry(&self) -> Arc<dyn StateRegistry> {
        self.registry.clone()
    }

    /// Consume one gateway dispatch.
    pub async fn consume(&self, name: &str, payload: Value) {
        let Ok(kind) = name.parse::<EventKind>() else {
            if self.unknown_events.insert(name.to_string()) {
                warn!(event = name, "received unrecognised event, ignoring it in the future");
            }
            self.emit(Event::Passthrough {
                name: name.to_string(),
                payload,
            });
            return;
        };

        self.emit(Event::Raw {
            kind,
            payload: payload.clone(),
        });

        if let Err(error) = self.handle(kind, &payload) {
            warn!(event = kind.name(), %error, "dropping malformed gateway event");
        }
    }

    fn emit(&self, event: Event) {
        // Send only fails when nobody is subscribed, which is fine.
        let _ = self.events_tx.send(event);
    }

    fn handle(&self, kind: EventKind, payload: &Value) -> Result<(), CacheError> {
        match kind {
            EventKind::ChannelCreate => self.handle_channel_create(payload),
            EventKind::ChannelUpdate => self.handle_channel_update(payload),
            EventKind::ChannelDelete => self.handle_channel_delete(payload),
            EventKind::ChannelPinsUpdate => self.handle_channel_pins_update(payload),
            EventKind::GuildCreate => self.handle_guild_create(payload),
            EventKind::GuildUpdate => self.handle_guild_update(payload),
            EventKind::GuildDelete => self.handle_guild_delete(payload),
            EventKind::GuildBanAdd => self.handle_guild_ban_add(payload),
            EventKind::GuildBanRemove => self.handle_guild_ban_remove(payload),
            EventKind::GuildEmojisUpdate => self.handle_guild_emojis_update(payload),
            EventKind::GuildMemberAdd => self.handle_guild_member_add(payload),
            EventKind::GuildMemberUpdate => self.handle_guild_member_update(payload),
            EventKind::GuildMemberRemove => self.handle_guild_member_remove(payload),
            EventKind::GuildRoleCreate => self.handle_guild_role_create(payload),
            EventKind::GuildRoleUpdate => self.handle_guild_role_update(payload),
            EventKind::GuildRoleDelete => self.handle_guild_role_delete(payload),
            EventKind::MessageCreate => self.handle_message_create(payload),
            EventKind::MessageUpdate => self.handle_message_update(payload),
            EventKind::MessageDelete => self.handle_message_delete(payload),
            EventKind::MessageDeleteBulk => self.handle_message_delete_bulk(payload),
            EventKind::MessageReactionAdd => self.handle_message_reaction_add(payload),
            EventKind::MessageReactionRemove => self.handle_message_reaction_remove(payload),
            EventKind::MessageReactionRemoveAll => self.handle_message_reaction_remove_all(payload),
            EventKind::PresenceUpdate => self.handle_presence_update(payload),
            EventKind::TypingStart => self.handle_typing_start(payload),
            EventKind::UserUpdate => self.handle_user_update(payload),
            EventKind::WebhooksUpdate => self.handle_webhooks_update(payload),
        }
    }

    fn handle_channel_create(&self, payload: &Value) -> Result<(), CacheError> {
        let guild_id = payload::optional_id(payload, "guild_id");
        match self.registry.parse_channel(payload, guild_id)? {
            Some(Channel::Dm(channel)) => self.emit(Event::DmChannelCreated { channel }),
            Some(Channel::Guild(channel)) => self.emit(Event::GuildChannelCreated { channel }),
            None => warn!(
                guild_id,
                "ignoring CHANNEL_CREATE for a channel in an unknown guild"
            ),
        }
        Ok(())
    }

    fn handle_channel_update(&self, payload: &Value) -> Result<(), CacheError> {
        let channel_id = payload::require_id(payload, "id")?;
        match self.registry.update_channel(payload)? {
            Some(ChannelDiff::Dm { old, new }) => self.emit(Event::DmChannelUpdated { old, new }),
            Some(ChannelDiff::Guild { old, new }) => {
                self.emit(Event::GuildChannelUpdated { old, new })
            }
            None => warn!(channel_id, "ignoring CHANNEL_UPDATE for unknown channel"),
        }
        Ok(())
    }

    fn handle_channel_delete(&self, payload: &Value) -> Result<(), CacheError> {
        let channel_id = payload::require_id(payload, "id")?;
        // Refresh the metadata so the final detached snapshot is current.
        self.registry.parse_channel(payload, None)?;
        if let Some(channel) = self.registry.delete_channel(channel_id) {
            self.emit(Event::ChannelDeleted { channel });
        }
        Ok(())
    }

    fn handle_channel_pins_update(&self, payload: &Value) -> Result<(), CacheError> {
        let channel_id = payload::require_id(payload, "channel_id")?;
        match self.registry.get_channel_by_id(channel_id) {
            Some(channel) => self.emit(Event::ChannelPinsUpdated {
                channel,
                last_pin_timestamp: payload::timestamp_field(payload, "last_pin_timestamp"),
            }),
            None => warn!(channel_id, "ignoring CHANNEL_PINS_UPDATE for unknown channel"),
        }
        Ok(())
    }

    fn handle_guild_create(&self, payload: &Value) -> Result<(), CacheError> {
        let guild_id = payload::require_id(payload, "id")?;
        let unavailable = payload::bool_field(payload, "unavailable").unwrap_or(false);
        let was_already_loaded = self.registry.get_guild_by_id(guild_id).is_some();
        let guild = self.registry.parse_guild(payload)?;

        if !was_already_loaded {
            self.emit(Event::GuildCreated { guild: guild.clone() });
        }
        if !unavailable {
            self.emit(Event::GuildAvailable { guild });
        }
        Ok(())
    }

    fn handle_guild_update(&self, payload: &Value) -> Result<(), CacheError> {
        match self.registry.update_guild(payload)? {
            Some((old, new)) => self.emit(Event::GuildUpdated { old, new }),
            None => {
                warn!("ignoring GUILD_UPDATE for a guild not previously cached, amending cache");
                self.registry.parse_guild(payload)?;
            }
        }
        Ok(())
    }

    fn handle_guild_delete(&self, payload: &Value) -> Result<(), CacheError> {
        if payload::bool_field(payload, "unavailable").unwrap_or(false) {
            self.handle_guild_unavailable(payload)
        } else {
            self.handle_guild_leave(payload)
        }
    }

    fn handle_guild_unavailable(&self, payload: &Value) -> Result<(), CacheError> {
        let guild_id = payload::require_id(payload, "id")?;
        self.registry.set_guild_unavailability(guild_id, true);

        let guild = match self.registry.get_guild_by_id(guild_id) {
            Some(guild) => guild,
            // Inconsistent state; parse what we were given so later events
            // for this guild resolve.
            None => self.registry.parse_guild(payload)?,
        };
        self.emit(Event::GuildUnavailable { guild });
        Ok(())
    }

    fn handle_guild_leave(&self, payload: &Value) -> Result<(), CacheError> {
        let guild_id = payload::require_id(payload, "id")?;
        let guild = self.registry.parse_guild(payload)?;
        self.registry.delete_guild(guild_id);
        self.emit(Event::GuildLeft { guild });
        Ok(())
    }

    fn handle_guild_ban_add(&self, payload: &Value) -> Result<(), CacheError> {
        let guild_id = payload::require_id(payload, "guild_id")?;
        let user = self.registry.parse_user(payload::require(payload, "user")?)?;
        let user_id = user.read().id;

        let Some(guild) = self.registry.get_guild_by_id(guild_id) else {
            warn!(user_id, guild_id, "ignoring GUILD_BAN_ADD in unknown guild");
            return Ok(());
        };

        // The member may not be cached in a large guild, and after a ban it
        // can no longer be fetched, so fall back to the bare user.
        let user = match self.registry.delete_member(user_id, guild_id) {
            Some(member) => UserOrMember::Member(member),
            None => UserOrMember::User(user),
        };
        self.emit(Event::BanAdded { guild, user });
        Ok(())
    }

    fn handle_guild_ban_remove(&self, payload: &Value) -> Result<(), CacheError> {
        let guild_id = payload::require_id(payload, "guild_id")?;
        let user = self.registry.parse_user(payload::require(payload, "user")?)?;

        match self.registry.get_guild_by_id(guild_id) {
            Some(guild) => self.emit(Event::BanRemoved { guild, user }),
            None => warn!(guild_id, "ignoring GUILD_BAN_REMOVE in unknown guild"),
        }
        Ok(())
    }

    fn handle_guild_emojis_update(&self, payload: &Value) -> Result<(), CacheError> {
        let guild_id = payload::require_id(payload, "guild_id")?;
        let Some(guild) = self.registry.get_guild_by_id(guild_id) else {
            warn!(guild_id, "ignoring GUILD_EMOJIS_UPDATE for unknown guild");
            return Ok(());
        };

        let emoji_payloads = payload
            .get("emojis")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        if let Some((old, new)) = self.registry.update_guild_emojis(&emoji_payloads, guild_id)? {
            self.emit(Event::GuildEmojisUpdated { guild, old, new });
        }
        Ok(())
    }

    fn handle_guild_member_add(&self, payload: &Value) -> Result<(), CacheError> {
        let guild_id = payload::require_id(payload, "guild_id")?;
        match self.registry.parse_member(payload, guild_id)? {
            Some(member) => self.emit(Event::MemberAdded { member }),
            None => warn!(guild_id, "ignoring GUILD_MEMBER_ADD for unknown guild"),
        }
        Ok(())
    }

    fn handle_guild_member_update(&self, payload: &Value) -> Result<(), CacheError> {
        let guild_id = payload::require_id(payload, "guild_id")?;
        if self.registry.get_guild_by_id(guild_id).is_none() {
            warn!(guild_id, "ignoring GUILD_MEMBER_UPDATE for unknown guild");
            return Ok(());
        }

        match self.registry.update_member(payload, guild_id)? {
            Some((old, new)) => self.emit(Event::MemberUpdated { old, new }),
            None => {
                warn!(guild_id, "ignoring GUILD_MEMBER_UPDATE for unknown member, amending cache");
                self.registry.parse_member(payload, guild_id)?;
            }
        }
        Ok(())
    }

    fn handle_guild_member_remove(&self, payload: &Value) -> Result<(), CacheError> {
        let guild_id = payload::require_id(payload, "guild_id")?;
        let user_payload = payload::require(payload, "user")?;
        let user_id = payload::require_id(user_payload, "id")?;
        if let Some(member) = self.registry.delete_member(user_id, guild_id) {
            self.emit(Event::MemberRemoved { member });
        }
        Ok(())
    }

    fn handle_guild_role_create(&self, payload: &Value) -> Result<(), CacheError> {
        let guild_id = payload::require_id(payload, "guild_id")?;
        let role_payload = payload::require(payload, "role")?;
        match self.registry.parse_role(role_payload, guild_id)? {
            Some(role) => self.emit(Event::RoleCreated { role }),
            None => warn!(guild_id, "ignoring GUILD_ROLE_CREATE for unknown guild"),
        }
        Ok(())
    }

    fn handle_guild_role_update(&self, payload: &Value) -> Result<(), CacheError> {
        let guild_id = payload::require_id(payload, "guild_id")?;
        let role_payload = payload::require(payload, "role")?;
        match self.registry.update_role(role_payload, guild_id)? {
            Some((old, new)) => self.emit(Event::RoleUpdated { old, new }),
            None => warn!(guild_id, "ignoring GUILD_ROLE_UPDATE for unknown role or guild"),
        }
        Ok(())
    }

    fn handle_guild_role_delete(&self, payload: &Value) -> Result<(), CacheError> {
        let guild_id = payload::require_id(payload, "guild_id")?;
        let role_id = payload::require_id(payload, "role_id")?;
        match self.registry.delete_role(guild_id, role_id) {
            Some(role) => self.emit(Event::RoleDeleted { role }),
            None => warn!(guild_id, role_id, "ignoring GUILD_ROLE_DELETE for unknown role or guild"),
        }
        Ok(())
    }

    fn handle_message_create(&self, payload: &Value) -> Result<(), CacheError> {
        match self.registry.parse_message(payload)? {
            Some(message) => self.emit(Event::MessageCreated { message }),
            None => {
                let channel_id = payload::optional_id(payload, "channel_id");
                warn!(channel_id, "ignoring MESSAGE_CREATE in unknown channel");
            }
        }
        Ok(())
    }

    fn handle_message_update(&self, payload: &Value) -> Result<(), CacheError> {
        // Uncached messages get edited all the time; not even worth a log.
        if let Some((old, new)) = self.registry.update_message(payload)? {
            self.emit(Event::MessageUpdated { old, new });
        }
        Ok(())
    }

    fn handle_message_delete(&self, payload: &Value) -> Result<(), CacheError> {
        let message_id = payload::require_id(payload, "id")?;
        if let Some(message) = self.registry.delete_message(message_id) {
            self.emit(Event::MessageDeleted { message });
        }
        Ok(())
    }

    fn handle_message_delete_bulk(&self, payload: &Value) -> Result<(), CacheError> {
        let channel_id = payload::require_id(payload, "channel_id")?;
        let ids = payload::id_list(payload, "ids").unwrap_or_default();
        let messages: HashMap<i64, _> = ids
            .into_iter()
            .map(|id| (id, self.registry.delete_message(id)))
            .collect();

        match self.registry.get_channel_by_id(channel_id) {
            Some(channel) => self.emit(Event::MessagesBulkDeleted { channel, messages }),
            None => warn!(channel_id, "ignoring MESSAGE_DELETE_BULK for unknown channel"),
        }
        Ok(())
    }

    fn handle_message_reaction_add(&self, payload: &Value) -> Result<(), CacheError> {
        let message_id = payload::require_id(payload, "message_id")?;
        if self.registry.get_message_by_id(message_id).is_none() {
            // Uncached message; nothing to reconcile.
            return Ok(());
        }

        let emoji = self
            .registry
            .parse_emoji(payload::require(payload, "emoji")?, None)?;
        let Some(reaction) = self.registry.add_reaction(message_id, emoji) else {
            return Ok(());
        };

        match self.resolve_reacting_user(payload)? {
            Some(user) => self.emit(Event::ReactionAdded { reaction, user }),
            None => warn!(message_id, "ignoring MESSAGE_REACTION_ADD by unknown user"),
        }
        Ok(())
    }

    fn handle_message_reaction_remove(&self, payload: &Value) -> Result<(), CacheError> {
        let message_id = payload::require_id(payload, "message_id")?;
        if self.registry.get_message_by_id(message_id).is_none() {
            return Ok(());
        }

        let emoji = self
            .registry
            .parse_emoji(payload::require(payload, "emoji")?, None)?;
        let Some(reaction) = self.registry.remove_reaction(message_id, emoji) else {
            return Ok(());
        };

        match self.resolve_reacting_user(payload)? {
            Some(user) => self.emit(Event::ReactionRemoved { reaction, user }),
            None => warn!(message_id, "ignoring MESSAGE_REACTION_REMOVE by unknown user"),
        }
        Ok(())
    }

    /// Member resolution when the reaction happened in a guild, bare user
    /// otherwise.
    fn resolve_reacting_user(&self, payload: &Value) -> Result<Option<UserOrMember>, CacheError> {
        let user_id = payload::require_id(payload, "user_id")?;
        let resolved = match payload::optional_id(payload, "guild_id") {
            Some(guild_id) => self
                .registry
                .get_member_by_id(user_id, guild_id)
                .map(UserOrMember::Member),
            None => self.registry.get_user_by_id(user_id).map(UserOrMember::User),
        };
        Ok(resolved)
    }

    fn handle_message_reaction_remove_all(&self, payload: &Value) -> Result<(), CacheError> {
        let message_id = payload::require_id(payload, "message_id")?;
        if let Some(message) = self.registry.remove_all_reactions(message_id) {
            self.emit(Event::AllReactionsRemoved { message });
        }
        Ok(())
    }

    fn handle_presence_update(&self, payload: &Value) -> Result<(), CacheError> {
        match self.registry.update_member_presence(payload)? {
            Some(diff) => self.emit(Event::PresenceUpdated {
                member: diff.member,
                presence: diff.new,
            }),
            None => warn!("ignoring PRESENCE_UPDATE for unknown guild or member"),
        }
        Ok(())
    }

    fn handle_typing_start(&self, payload: &Value) -> Result<(), CacheError> {
        let channel_id = payload::require_id(payload, "channel_id")?;
        let user_id = payload::require_id(payload, "user_id")?;

        let Some(channel) = self.registry.get_channel_by_id(channel_id) else {
            warn!(user_id, channel_id, "ignoring TYPING_START in unknown channel");
            return Ok(());
        };

        let user = self.registry.get_user_by_id(user_id);
        if user.is_none() {
            debug!(user_id, channel_id, "TYPING_START by a user not in the cache");
        }
        self.emit(Event::TypingStarted { channel, user });
        Ok(())
    }

    fn handle_user_update(&self, payload: &Value) -> Result<(), CacheError> {
        let user = self.registry.parse_bot_user(payload)?;
        self.emit(Event::OwnUserUpdated { user });
        Ok(())
    }

    fn handle_webhooks_update(&self, payload: &Value) -> Result<(), CacheError> {
        let channel_id = payload::require_id(payload, "channel_id")?;
        match self.registry.get_channel_by_id(channel_id) {
            Some(channel) => self.emit(Event::WebhooksUpdated { channel }),
            None => warn!(channel_id, "ignoring WEBHOOKS_UPDATE in unknown channel"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::InMemoryRegistry;
    use serde_json::json;
    use tokio::sync::broadcast::Receiver;

    fn adapter() -> (EventAdapter, Receiver<Event>) {
        let registry = Arc::new(InMemoryRegistry::default());
        let adapter = EventAdapter::new(registry, &GatewaySettings { event_buffer_size: 64 });
        let events = adapter.subscribe();
        (adapter, events)
    }

    fn drain(events: &mut Receiver<Event>) -> Vec<Event> {
        let mut out = Vec::new();
        while let Ok(event) = events.try_recv() {
            out.push(event);
        }
        out
    }

    #[tokio::test]
    async fn test_unknown_event_is_passed_through() {
        let (adapter, mut events) = adapter();
        adapter.consume("VOICE_STATE_UPDATE", json!({"a": 1})).await;

        let received = drain(&mut events);
        assert_eq!(received.len(), 1);
        assert!(matches!(
            &received[0],
            Event::Passthrough { name, .. } if name == "VOICE_STATE_UPDATE"
        ));
        // Only warned once, but still passed through every time.
        adapter.consume("VOICE_STATE_UPDATE", json!({"a": 2})).await;
        assert_eq!(drain(&mut events).len(), 1);
        assert_eq!(adapter.unknown_events.len(), 1);
    }

    #[tokio::test]
    async fn test_raw_precedes_typed() {
        let (adapter, mut events) = adapter();
        adapter
            .consume("GUILD_CREATE", json!({"id": "100", "name": "g"}))
            .await;

        let received = drain(&mut events);
        assert!(matches!(
            received[0],
            Event::Raw { kind: EventKind::GuildCreate, .. }
        ));
        assert!(matches!(received[1], Event::GuildCreated { .. }));
        assert!(matches!(received[2], Event::GuildAvailable { .. }));
    }

    #[tokio::test]
    async fn test_absent_parent_suppresses_typed_event() {
        let (adapter, mut events) = adapter();
        adapter
            .consume(
                "CHANNEL_CREATE",
                json!({"id": "301", "type": 0, "guild_id": "100"}),
            )
            .await;

        let received = drain(&mut events);
        // Raw got through, the typed event did not.
        assert_eq!(received.len(), 1);
        assert!(matches!(received[0], Event::Raw { .. }));
    }

    #[tokio::test]
    async fn test_malformed_payload_aborts_only_that_event() {
        let (adapter, mut events) = adapter();
        adapter.consume("GUILD_CREATE", json!({"name": "no id"})).await;
        assert_eq!(drain(&mut events).len(), 1); // just the raw event

        // The stream still works afterwards.
        adapter
            .consume("GUILD_CREATE", json!({"id": "100", "name": "g"}))
            .await;
        assert_eq!(drain(&mut events).len(), 3);
    }

    #[tokio::test]
    async fn test_guild_create_available_split() {
        let (adapter, mut events) = adapter();
        adapter
            .consume("GUILD_CREATE", json!({"id": "100", "unavailable": true}))
            .await;
        let received = drain(&mut events);
        // Known-to-be-unavailable guild: created, but not available.
        assert_eq!(received.len(), 2);
        assert!(matches!(received[1], Event::GuildCreated { .. }));

        adapter
            .consume("GUILD_CREATE", json!({"id": "100", "name": "g"}))
            .await;
        let received = drain(&mut events);
        // Already loaded: only raw + available this time.
        assert_eq!(received.len(), 2);
        assert!(matches!(received[1], Event::GuildAvailable { .. }));
    }
}
