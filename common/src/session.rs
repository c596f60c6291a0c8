//! Session user and login history records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::role::Role;
use crate::wire;

/// The signed-in account as returned by `POST /login` and mirrored in storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    #[serde(alias = "_id", deserialize_with = "wire::id")]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
    #[serde(default, deserialize_with = "wire::lenient_bool")]
    pub is_verified: bool,
    #[serde(default, deserialize_with = "wire::opt_id", skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_id", skip_serializing_if = "Option::is_none")]
    pub establishment_id: Option<String>,
}

impl SessionUser {
    pub fn display_name(&self) -> &str {
        if self.username.is_empty() {
            &self.email
        } else {
            &self.username
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionEventKind {
    Login,
    Logout,
}

/// One entry of the `sessionHistory` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEvent {
    pub event: SessionEventKind,
    pub at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_from_login_payload() {
        let json = r#"{
            "_id": 17, "username": "ana", "email": "ana@example.com",
            "role": "Super Admin", "isVerified": "true", "establishmentId": 3
        }"#;
        let u: SessionUser = serde_json::from_str(json).unwrap();
        assert_eq!(u.id, "17");
        assert_eq!(u.role, Role::SuperAdmin);
        assert!(u.is_verified);
        assert_eq!(u.establishment_id.as_deref(), Some("3"));
        assert_eq!(u.device_id, None);
    }

    #[test]
    fn test_missing_verified_is_false() {
        let json = r#"{"id":"u1","role":"User","isVerified":null}"#;
        let u: SessionUser = serde_json::from_str(json).unwrap();
        assert!(!u.is_verified);
        assert_eq!(u.display_name(), "");
    }

    #[test]
    fn test_user_round_trips_in_camel_case() {
        let u = SessionUser {
            id: "9".into(),
            username: "bo".into(),
            email: "bo@example.com".into(),
            role: Role::Admin,
            is_verified: true,
            device_id: Some("dev-1".into()),
            establishment_id: None,
        };
        let json = serde_json::to_string(&u).unwrap();
        assert!(json.contains("\"isVerified\":true"));
        assert!(json.contains("\"deviceId\":\"dev-1\""));
        assert!(!json.contains("establishmentId"));
    }
}
