//! Role entity.
//!
//! A role is owned by exactly one guild's `roles` map. Deleting a role
//! cascades through the registry: the id is stripped from every member of
//! the owning guild. A member may transiently hold a role id that no longer
//! resolves; lookups treat that as unresolvable rather than an error.

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::shared::error::CacheError;
use crate::shared::payload;

/// Shared handle to a cached role.
pub type RoleRef = Arc<RwLock<Role>>;

/// Represents a role within a guild.
#[derive(Debug, Clone, Serialize)]
pub struct Role {
    /// Snowflake ID
    pub id: i64,

    /// Owning guild ID
    pub guild_id: i64,

    /// Role name
    pub name: Option<String>,

    /// Display color (0xRRGGBB; 0 means no color)
    pub color: u32,

    /// Whether members are listed separately in the sidebar
    pub is_hoisted: bool,

    /// Sorting position
    pub position: i32,

    /// Permission bitfield
    pub permissions: u64,

    /// Whether an integration manages this role
    pub is_managed: bool,

    /// Whether the role can be mentioned
    pub is_mentionable: bool,
}

impl Role {
    /// Construct a role from a gateway payload.
    pub fn from_payload(payload: &Value, guild_id: i64) -> Result<Self, CacheError> {
        let mut role = Role {
            id: payload::require_id(payload, "id")?,
            guild_id,
            name: None,
            color: 0,
            is_hoisted: false,
            position: 0,
            permissions: 0,
            is_managed: false,
            is_mentionable: false,
        };
        role.update_state(payload);
        Ok(role)
    }

    /// Apply the fields present in the payload, leaving absent fields
    /// untouched.
    pub fn update_state(&mut self, payload: &Value) {
        if let Some(name) = payload::string_field(payload, "name") {
            self.name = Some(name);
        }
        if let Some(color) = payload::uint_field(payload, "color") {
            self.color = color as u32;
        }
        if let Some(hoist) = payload::bool_field(payload, "hoist") {
            self.is_hoisted = hoist;
        }
        if let Some(position) = payload::int_field(payload, "position") {
            self.position = position as i32;
        }
        if let Some(permissions) = payload::uint_field(payload, "permissions") {
            self.permissions = permissions;
        }
        if let Some(managed) = payload::bool_field(payload, "managed") {
            self.is_managed = managed;
        }
        if let Some(mentionable) = payload::bool_field(payload, "mentionable") {
            self.is_mentionable = mentionable;
        }
    }

    /// Wrap in a shared handle.
    pub fn into_ref(self) -> RoleRef {
        Arc::new(RwLock::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn role_payload() -> Value {
        json!({
            "id": "41771983423143936",
            "name": "WE DEM BOYZZ!!!!!!",
            "color": 3447003,
            "hoist": true,
            "position": 1,
            "permissions": "66321471",
            "managed": false,
            "mentionable": false
        })
    }

    #[test]
    fn test_from_payload() {
        let role = Role::from_payload(&role_payload(), 1).unwrap();
        assert_eq!(role.id, 41771983423143936);
        assert_eq!(role.guild_id, 1);
        assert_eq!(role.name.as_deref(), Some("WE DEM BOYZZ!!!!!!"));
        assert_eq!(role.color, 3447003);
        assert!(role.is_hoisted);
        assert_eq!(role.permissions, 66321471);
    }

    #[test]
    fn test_update_state_is_partial() {
        let mut role = Role::from_payload(&role_payload(), 1).unwrap();
        role.update_state(&json!({"name": "admins"}));
        assert_eq!(role.name.as_deref(), Some("admins"));
        assert_eq!(role.color, 3447003);
        assert_eq!(role.position, 1);
    }

    #[test]
    fn test_missing_id_is_an_error() {
        assert!(Role::from_payload(&json!({"name": "x"}), 1).is_err());
    }
}
