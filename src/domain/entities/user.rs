//! User entity.
//!
//! A user is global identity shared across every guild it is visible in: the
//! registry guarantees at most one cached `User` cell per id, and members,
//! message authors, and direct lookups all hand out clones of the same
//! `UserRef`. Retention is weak: a user with no remaining holders becomes
//! eligible for collection. The bot's own account ("me") is the one
//! exception: it lives in a dedicated strong slot and is never evicted.

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::shared::error::CacheError;
use crate::shared::payload;

/// Shared handle to a cached user.
pub type UserRef = Arc<RwLock<User>>;

/// Represents a user account.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Snowflake ID
    pub id: i64,

    /// Account name
    pub username: Option<String>,

    /// 4-digit discriminator
    pub discriminator: Option<u16>,

    /// Avatar image hash (None if the user has no avatar)
    pub avatar_hash: Option<String>,

    /// Whether the account is a bot
    pub is_bot: bool,

    /// Whether multi-factor auth is enabled. Only ever populated on the
    /// bot's own account.
    pub is_mfa_enabled: Option<bool>,

    /// Whether the email address is verified. Only ever populated on the
    /// bot's own account.
    pub is_verified: Option<bool>,

    /// Account email. Only ever populated on the bot's own account.
    pub email: Option<String>,

    /// Chosen locale. Only ever populated on the bot's own account.
    pub locale: Option<String>,
}

impl User {
    /// Construct a user from a gateway payload.
    pub fn from_payload(payload: &Value) -> Result<Self, CacheError> {
        let mut user = User {
            id: payload::require_id(payload, "id")?,
            username: None,
            discriminator: None,
            avatar_hash: None,
            // Not expected to ever change, so only read at construction.
            is_bot: payload::bool_field(payload, "bot").unwrap_or(false),
            is_mfa_enabled: None,
            is_verified: None,
            email: None,
            locale: None,
        };
        user.update_state(payload);
        Ok(user)
    }

    /// Apply the fields present in the payload, leaving absent fields
    /// untouched.
    pub fn update_state(&mut self, payload: &Value) {
        if let Some(username) = payload::string_field(payload, "username") {
            self.username = Some(username);
        }
        if let Some(discriminator) = payload::string_field(payload, "discriminator") {
            if let Ok(parsed) = discriminator.parse() {
                self.discriminator = Some(parsed);
            }
        }
        if payload.get("avatar").is_some() {
            // Present-but-null means the avatar was removed.
            self.avatar_hash = payload::string_field(payload, "avatar");
        }
        if let Some(mfa) = payload::bool_field(payload, "mfa_enabled") {
            self.is_mfa_enabled = Some(mfa);
        }
        if let Some(verified) = payload::bool_field(payload, "verified") {
            self.is_verified = Some(verified);
        }
        if let Some(email) = payload::string_field(payload, "email") {
            self.email = Some(email);
        }
        if let Some(locale) = payload::string_field(payload, "locale") {
            self.locale = Some(locale);
        }
    }

    /// Whether a payload carries the fields only present on the bot's own
    /// account (used to route `parse_user` to the "me" singleton).
    pub fn payload_is_bot_account(payload: &Value) -> bool {
        payload::has_field(payload, "mfa_enabled") || payload::has_field(payload, "verified")
    }

    /// Wrap in a shared handle.
    pub fn into_ref(self) -> UserRef {
        Arc::new(RwLock::new(self))
    }
}
