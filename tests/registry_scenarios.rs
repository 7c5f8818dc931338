//! End-to-end scenarios driving the event adapter and inspecting the
//! registry it reconciles into.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::sync::broadcast::Receiver;

use chat_client::config::{CacheSettings, GatewaySettings};
use chat_client::domain::entities::{Channel, MessageAuthor, PresenceStatus};
use chat_client::gateway::{Event, EventAdapter, EventKind};
use chat_client::registry::{InMemoryRegistry, StateRegistry};

fn harness_with(settings: CacheSettings) -> (EventAdapter, Arc<InMemoryRegistry>, Receiver<Event>) {
    let registry = Arc::new(InMemoryRegistry::new(&settings));
    let adapter = EventAdapter::new(
        registry.clone(),
        &GatewaySettings { event_buffer_size: 256 },
    );
    let events = adapter.subscribe();
    (adapter, registry, events)
}

fn harness() -> (EventAdapter, Arc<InMemoryRegistry>, Receiver<Event>) {
    harness_with(CacheSettings {
        message_cache_size: 100,
        dm_channel_cache_size: 100,
    })
}

fn drain(events: &mut Receiver<Event>) -> Vec<Event> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

fn guild_create_payload() -> Value {
    json!({
        "id": "100",
        "name": "rust hideout",
        "owner_id": "401",
        "roles": [
            {"id": "201", "name": "everyone", "permissions": "104324161"},
            {"id": "202", "name": "crustaceans", "color": 15158332}
        ],
        "channels": [
            {"id": "301", "type": 0, "name": "general", "topic": "chat"},
            {"id": "302", "type": 2, "name": "voice"}
        ],
        "members": [
            {"user": {"id": "401", "username": "mia"}, "roles": ["202"], "nick": "captain"},
            {"user": {"id": "402", "username": "rex"}, "roles": []}
        ],
        "presences": [
            {"user": {"id": "401"}, "status": "online"}
        ]
    })
}

fn message_payload(message_id: &str) -> Value {
    json!({
        "id": message_id,
        "channel_id": "301",
        "author": {"id": "401", "username": "mia"},
        "content": "hello there",
        "timestamp": "2019-10-10T05:22:33.023456+00:00"
    })
}

#[tokio::test]
async fn guild_lifecycle_end_to_end() {
    let (adapter, registry, mut events) = harness();

    adapter.consume("GUILD_CREATE", guild_create_payload()).await;
    let received = drain(&mut events);
    assert!(matches!(received[0], Event::Raw { kind: EventKind::GuildCreate, .. }));
    assert!(matches!(received[1], Event::GuildCreated { .. }));
    assert!(matches!(received[2], Event::GuildAvailable { .. }));

    // Everything nested got ingested and wired together.
    let guild = registry.get_guild_by_id(100).unwrap();
    assert_eq!(guild.read().roles.len(), 2);
    assert_eq!(guild.read().channels.len(), 2);
    assert_eq!(guild.read().members.len(), 2);
    let member = registry.get_member_by_id(401, 100).unwrap();
    assert_eq!(member.read().nick.as_deref(), Some("captain"));
    assert_eq!(member.read().role_ids, vec![202]);
    assert!(member.read().presence.is_some());

    // Deleting a role strips it from members.
    adapter
        .consume("GUILD_ROLE_DELETE", json!({"guild_id": "100", "role_id": "202"}))
        .await;
    let received = drain(&mut events);
    assert!(matches!(received[1], Event::RoleDeleted { .. }));
    assert!(member.read().role_ids.is_empty());
    assert!(registry.get_role_by_id(100, 202).is_none());

    // Leaving the guild drops the whole subtree.
    adapter.consume("GUILD_DELETE", json!({"id": "100"})).await;
    let received = drain(&mut events);
    assert!(matches!(received[1], Event::GuildLeft { .. }));
    assert!(registry.get_guild_by_id(100).is_none());
    assert!(registry.get_channel_by_id(301).is_none());
}

#[tokio::test]
async fn guild_unavailability_round_trip() {
    let (adapter, registry, mut events) = harness();
    adapter.consume("GUILD_CREATE", guild_create_payload()).await;
    drain(&mut events);

    adapter
        .consume("GUILD_DELETE", json!({"id": "100", "unavailable": true}))
        .await;
    let received = drain(&mut events);
    assert!(matches!(received[1], Event::GuildUnavailable { .. }));

    let guild = registry.get_guild_by_id(100).unwrap();
    assert!(guild.read().is_unavailable);
    // Cached state survives the outage.
    assert_eq!(guild.read().members.len(), 2);

    // The guild coming back is an availability flip, not a new guild.
    adapter.consume("GUILD_CREATE", guild_create_payload()).await;
    let received = drain(&mut events);
    assert_eq!(received.len(), 2);
    assert!(matches!(received[1], Event::GuildAvailable { .. }));
    assert!(!guild.read().is_unavailable);
}

#[tokio::test]
async fn guild_update_diff_and_amend_on_miss() {
    let (adapter, registry, mut events) = harness();
    adapter.consume("GUILD_CREATE", guild_create_payload()).await;
    drain(&mut events);

    adapter
        .consume("GUILD_UPDATE", json!({"id": "100", "name": "renamed"}))
        .await;
    let received = drain(&mut events);
    let Event::GuildUpdated { old, new } = &received[1] else {
        panic!("expected a guild update diff");
    };
    assert_eq!(old.name.as_deref(), Some("rust hideout"));
    assert_eq!(new.read().name.as_deref(), Some("renamed"));

    // An update for an unknown guild amends the cache instead.
    adapter
        .consume("GUILD_UPDATE", json!({"id": "999", "name": "mystery"}))
        .await;
    let received = drain(&mut events);
    assert_eq!(received.len(), 1); // raw only
    assert!(registry.get_guild_by_id(999).is_some());
}

#[tokio::test]
async fn message_cache_eviction_at_capacity() {
    let (adapter, registry, mut events) = harness_with(CacheSettings {
        message_cache_size: 3,
        dm_channel_cache_size: 3,
    });
    adapter.consume("GUILD_CREATE", guild_create_payload()).await;
    drain(&mut events);

    for id in ["901", "902", "903", "904"] {
        adapter.consume("MESSAGE_CREATE", message_payload(id)).await;
    }
    // Capacity + 1 creates evict exactly the oldest.
    assert!(registry.get_message_by_id(901).is_none());
    assert!(registry.get_message_by_id(902).is_some());
    assert!(registry.get_message_by_id(904).is_some());

    let Channel::Guild(channel) = registry.get_channel_by_id(301).unwrap() else {
        panic!("expected a guild channel");
    };
    assert_eq!(channel.read().last_message_id, Some(904));
}

#[tokio::test]
async fn message_authored_by_cached_member() {
    let (adapter, registry, mut events) = harness();
    adapter.consume("GUILD_CREATE", guild_create_payload()).await;
    adapter.consume("MESSAGE_CREATE", message_payload("901")).await;
    drain(&mut events);

    let message = registry.get_message_by_id(901).unwrap();
    let MessageAuthor::Member(member) = &message.read().author else {
        panic!("expected the cached member as author");
    };
    // Same cell as the registry's member, not a copy.
    assert!(Arc::ptr_eq(member, &registry.get_member_by_id(401, 100).unwrap()));
}

#[tokio::test]
async fn message_update_and_bulk_delete() {
    let (adapter, registry, mut events) = harness();
    adapter.consume("GUILD_CREATE", guild_create_payload()).await;
    adapter.consume("MESSAGE_CREATE", message_payload("901")).await;
    adapter.consume("MESSAGE_CREATE", message_payload("902")).await;
    drain(&mut events);

    adapter
        .consume(
            "MESSAGE_UPDATE",
            json!({"id": "901", "channel_id": "301", "content": "edited"}),
        )
        .await;
    let received = drain(&mut events);
    let Event::MessageUpdated { old, new } = &received[1] else {
        panic!("expected a message diff");
    };
    assert_eq!(old.content.as_deref(), Some("hello there"));
    assert_eq!(new.read().content.as_deref(), Some("edited"));

    // Bulk delete reports cached deletions and misses alike.
    adapter
        .consume(
            "MESSAGE_DELETE_BULK",
            json!({"channel_id": "301", "ids": ["901", "902", "999"]}),
        )
        .await;
    let received = drain(&mut events);
    let Event::MessagesBulkDeleted { messages, .. } = &received[1] else {
        panic!("expected a bulk delete event");
    };
    assert_eq!(messages.len(), 3);
    assert!(messages[&901].is_some());
    assert!(messages[&999].is_none());
    assert!(registry.get_message_by_id(901).is_none());
}

#[tokio::test]
async fn reaction_flow_end_to_end() {
    let (adapter, registry, mut events) = harness();
    adapter.consume("GUILD_CREATE", guild_create_payload()).await;
    adapter.consume("MESSAGE_CREATE", message_payload("901")).await;
    drain(&mut events);

    let add = json!({
        "message_id": "901",
        "channel_id": "301",
        "guild_id": "100",
        "user_id": "401",
        "emoji": {"id": null, "name": "\u{1f980}"}
    });
    adapter.consume("MESSAGE_REACTION_ADD", add.clone()).await;
    adapter.consume("MESSAGE_REACTION_ADD", add.clone()).await;
    let received = drain(&mut events);
    let Event::ReactionAdded { reaction, .. } = &received[3] else {
        panic!("expected a reaction event");
    };
    assert_eq!(reaction.count, 2);

    adapter.consume("MESSAGE_REACTION_REMOVE", add).await;
    let received = drain(&mut events);
    let Event::ReactionRemoved { reaction, .. } = &received[1] else {
        panic!("expected a reaction removal");
    };
    assert_eq!(reaction.count, 1);

    adapter
        .consume("MESSAGE_REACTION_REMOVE_ALL", json!({"message_id": "901", "channel_id": "301"}))
        .await;
    let received = drain(&mut events);
    assert!(matches!(received[1], Event::AllReactionsRemoved { .. }));
    let message = registry.get_message_by_id(901).unwrap();
    assert!(message.read().reactions.is_empty());
}

#[tokio::test]
async fn reaction_on_uncached_message_is_silent() {
    let (adapter, _registry, mut events) = harness();
    adapter
        .consume(
            "MESSAGE_REACTION_ADD",
            json!({"message_id": "901", "user_id": "1", "emoji": {"id": null, "name": "x"}}),
        )
        .await;
    let received = drain(&mut events);
    assert_eq!(received.len(), 1); // raw only
}

#[tokio::test]
async fn presence_update_applies_role_list() {
    let (adapter, registry, mut events) = harness();
    adapter.consume("GUILD_CREATE", guild_create_payload()).await;
    drain(&mut events);

    adapter
        .consume(
            "PRESENCE_UPDATE",
            json!({
                "guild_id": "100",
                "user": {"id": "402"},
                "roles": ["201", "202"],
                "status": "dnd",
                "game": {"name": "rustc"}
            }),
        )
        .await;
    let received = drain(&mut events);
    let Event::PresenceUpdated { member, presence } = &received[1] else {
        panic!("expected a presence event");
    };
    assert_eq!(presence.status, PresenceStatus::Dnd);
    assert_eq!(presence.activity.as_deref(), Some("rustc"));
    assert_eq!(member.read().role_ids, vec![201, 202]);
    assert!(Arc::ptr_eq(member, &registry.get_member_by_id(402, 100).unwrap()));
}

#[tokio::test]
async fn ban_falls_back_to_bare_user() {
    let (adapter, registry, mut events) = harness();
    adapter.consume("GUILD_CREATE", guild_create_payload()).await;
    drain(&mut events);

    // A cached member is evicted and handed over as the member.
    adapter
        .consume(
            "GUILD_BAN_ADD",
            json!({"guild_id": "100", "user": {"id": "402", "username": "rex"}}),
        )
        .await;
    let received = drain(&mut events);
    assert!(matches!(
        received[1],
        Event::BanAdded { user: chat_client::gateway::UserOrMember::Member(_), .. }
    ));
    assert!(registry.get_member_by_id(402, 100).is_none());

    // A user who was never a cached member comes through as a bare user.
    adapter
        .consume(
            "GUILD_BAN_ADD",
            json!({"guild_id": "100", "user": {"id": "777", "username": "drifter"}}),
        )
        .await;
    let received = drain(&mut events);
    assert!(matches!(
        received[1],
        Event::BanAdded { user: chat_client::gateway::UserOrMember::User(_), .. }
    ));
}

#[tokio::test]
async fn dm_channel_lifecycle() {
    let (adapter, registry, mut events) = harness();
    adapter
        .consume(
            "CHANNEL_CREATE",
            json!({"id": "800", "type": 1, "recipients": [{"id": "55", "username": "pen"}]}),
        )
        .await;
    let received = drain(&mut events);
    assert!(matches!(received[1], Event::DmChannelCreated { .. }));

    adapter.consume("CHANNEL_DELETE", json!({"id": "800", "type": 1})).await;
    let received = drain(&mut events);
    assert!(matches!(received[1], Event::ChannelDeleted { channel: Channel::Dm(_) }));
    assert!(registry.get_channel_by_id(800).is_none());
}

#[tokio::test]
async fn weak_users_reclaimed_after_guild_leaves() {
    let (adapter, registry, mut events) = harness();
    adapter.consume("GUILD_CREATE", guild_create_payload()).await;
    drain(&mut events);
    assert!(registry.get_user_by_id(402).is_some());

    adapter.consume("GUILD_DELETE", json!({"id": "100"})).await;
    drain(&mut events);

    // The broadcast ring still holds the emitted events (and through them
    // the guild subtree); drop it before sweeping.
    drop(events);
    drop(adapter);

    registry.sweep();
    // Nothing holds the member, so the user cell is gone too.
    assert!(registry.get_user_by_id(402).is_none());
}

#[tokio::test]
async fn own_user_survives_sweep() {
    let (adapter, registry, mut events) = harness();
    adapter
        .consume("USER_UPDATE", json!({"id": "9", "username": "bot", "verified": true}))
        .await;
    drain(&mut events);

    registry.sweep();
    let me = registry.me().unwrap();
    assert_eq!(me.read().id, 9);
    assert!(Arc::ptr_eq(&me, &registry.get_user_by_id(9).unwrap()));
}

#[tokio::test]
async fn unknown_event_passthrough() {
    let (adapter, _registry, mut events) = harness();
    adapter.consume("GUILD_JOIN_REQUEST_UPDATE", json!({"x": 1})).await;
    adapter.consume("GUILD_JOIN_REQUEST_UPDATE", json!({"x": 2})).await;

    let received = drain(&mut events);
    assert_eq!(received.len(), 2);
    for event in &received {
        assert!(matches!(event, Event::Passthrough { name, .. } if name == "GUILD_JOIN_REQUEST_UPDATE"));
    }
}
