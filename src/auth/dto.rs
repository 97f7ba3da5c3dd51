use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::store::UserRecord;

/// Request body for user registration. The confirmation field is checked
/// against the password and then discarded; it is never persisted.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub dni: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Payload returned on successful login.
#[derive(Debug, Serialize)]
pub struct LoginData {
    pub token: String,
    pub user: PublicUser,
}

/// Outward-facing user representation: the record with the password
/// hash stripped.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub active: bool,
    pub avatar: Option<String>,
    pub dni: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<UserRecord> for PublicUser {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            active: user.active,
            avatar: user.avatar,
            dni: user.dni,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_has_no_password_field() {
        let record = UserRecord {
            id: Uuid::new_v4(),
            name: "Ana".into(),
            email: "a@x.com".into(),
            password_hash: "hash-value".into(),
            avatar: None,
            dni: None,
            active: true,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };
        let public: PublicUser = record.into();
        let json = serde_json::to_string(&public).unwrap();
        assert!(json.contains("a@x.com"));
        assert!(!json.contains("password"));
        assert!(!json.contains("hash-value"));
    }

    #[test]
    fn register_request_uses_camel_case() {
        let body = r#"{
            "name": "Ana",
            "email": "a@x.com",
            "password": "secret123",
            "passwordConfirmation": "secret123"
        }"#;
        let req: RegisterRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.password_confirmation, "secret123");
        assert!(req.active.is_none());
    }
}
