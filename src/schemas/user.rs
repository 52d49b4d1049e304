use serde::{Deserialize, Serialize};

use crate::core::time::{format_offset, format_primitive};
use crate::db::types::UserRole;
use crate::services::presence::PresenceEntry;

#[derive(Debug, Deserialize)]
pub(crate) struct UserCreate {
    pub(crate) email: String,
    #[serde(alias = "fullname")]
    pub(crate) full_name: String,
    pub(crate) password: String,
    pub(crate) role: UserRole,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserLogin {
    pub(crate) email: String,
    pub(crate) password: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserResponse {
    pub(crate) id: String,
    pub(crate) email: String,
    pub(crate) full_name: String,
    pub(crate) role: UserRole,
    pub(crate) is_active: bool,
    pub(crate) created_at: String,
}

impl UserResponse {
    pub(crate) fn from_db(user: crate::db::models::User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            is_active: user.is_active,
            created_at: format_primitive(user.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct OnlineUserResponse {
    pub(crate) user_id: String,
    pub(crate) full_name: String,
    pub(crate) email: String,
    pub(crate) role: UserRole,
    pub(crate) last_seen: String,
}

impl OnlineUserResponse {
    pub(crate) fn from_entry(entry: PresenceEntry) -> Self {
        Self {
            user_id: entry.user_id,
            full_name: entry.full_name,
            email: entry.email,
            role: entry.role,
            last_seen: format_offset(entry.last_seen),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct OnlineUsersResponse {
    pub(crate) count: usize,
    pub(crate) users: Vec<OnlineUserResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_create_accepts_legacy_fullname_alias() {
        let payload: UserCreate = serde_json::from_str(
            r#"{"email": "a@b.fr", "fullname": "Alice B", "password": "secret123", "role": "ecole"}"#,
        )
        .expect("parse");

        assert_eq!(payload.full_name, "Alice B");
        assert_eq!(payload.role, UserRole::Ecole);
    }

    #[test]
    fn user_create_rejects_unknown_role() {
        let result = serde_json::from_str::<UserCreate>(
            r#"{"email": "a@b.fr", "full_name": "Alice", "password": "x", "role": "superuser"}"#,
        );

        assert!(result.is_err());
    }
}
