//! Data-transfer objects for the account and establishment screens.

use serde::{Deserialize, Serialize};

use crate::auth::{validate_email, validate_password};
use crate::error::{Error, Result};
use crate::role::Role;
use crate::wire;

// ─── Accounts ────────────────────────────────────────────────────────────────

/// A row of the account-management tables (`/api/users` and `/admin`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(alias = "_id", deserialize_with = "wire::id")]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, deserialize_with = "wire::lenient_bool")]
    pub is_verified: bool,
    #[serde(default, deserialize_with = "wire::opt_id", skip_serializing_if = "Option::is_none")]
    pub establishment_id: Option<String>,
}

/// Body of an account create/update call.  A `None` password leaves the
/// existing one untouched on update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDraft {
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub establishment_id: Option<String>,
}

impl AccountDraft {
    pub fn from_account(a: &Account) -> Self {
        Self {
            username: a.username.clone(),
            email: a.email.clone(),
            password: None,
            role: a.role,
            is_verified: Some(a.is_verified),
            establishment_id: a.establishment_id.clone(),
        }
    }

    /// Check the form before it is sent.  A new account needs a password;
    /// an edit may leave it blank.
    pub fn validate(&self, creating: bool) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(Error::Invalid("Username is required.".into()));
        }
        validate_email(&self.email)?;
        match self.password.as_deref() {
            Some(pw) => validate_password(pw, pw),
            None if creating => Err(Error::Invalid("A password is required for new accounts.".into())),
            None => Ok(()),
        }
    }
}

// ─── Establishments ──────────────────────────────────────────────────────────

/// A monitored site grouping one or more sensor stations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Establishment {
    #[serde(alias = "_id", deserialize_with = "wire::id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_id", skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstablishmentDraft {
    pub name: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

impl EstablishmentDraft {
    pub fn from_establishment(e: &Establishment) -> Self {
        Self {
            name: e.name.clone(),
            location: e.location.clone(),
            description: e.description.clone(),
            device_id: e.device_id.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Invalid("Establishment name is required.".into()));
        }
        if self.location.trim().is_empty() {
            return Err(Error::Invalid("Location is required.".into()));
        }
        Ok(())
    }
}

/// `Some(trimmed)` unless the input is blank.
pub fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_tolerates_missing_fields() {
        let a: Account = serde_json::from_str(r#"{"_id":"a1","email":"x@y.z"}"#).unwrap();
        assert_eq!(a.id, "a1");
        assert_eq!(a.role, None);
        assert!(!a.is_verified);
    }

    #[test]
    fn test_draft_omits_unset_password() {
        let a = Account {
            id: "1".into(),
            username: "kai".into(),
            email: "kai@example.com".into(),
            role: Some(Role::User),
            is_verified: true,
            establishment_id: Some("e2".into()),
        };
        let json = serde_json::to_value(AccountDraft::from_account(&a)).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["role"], "User");
        assert_eq!(json["establishmentId"], "e2");
        assert_eq!(json["isVerified"], true);
    }

    #[test]
    fn test_establishment_numeric_ids() {
        let e: Establishment =
            serde_json::from_str(r#"{"id":5,"name":"Lake","location":"North","deviceId":77}"#)
                .unwrap();
        assert_eq!(e.id, "5");
        assert_eq!(e.device_id.as_deref(), Some("77"));
    }

    #[test]
    fn test_account_draft_password_rules() {
        let mut d = AccountDraft {
            username: "kai".into(),
            email: "kai@example.com".into(),
            ..Default::default()
        };
        assert!(d.validate(false).is_ok());
        assert!(matches!(d.validate(true), Err(Error::Invalid(_))));
        d.password = Some("short".into());
        assert!(d.validate(false).is_err());
        d.password = Some("long-enough-pw".into());
        assert!(d.validate(true).is_ok());
        d.email = "nope".into();
        assert!(d.validate(true).is_err());
    }

    #[test]
    fn test_establishment_draft_requires_name_and_location() {
        let mut d = EstablishmentDraft { name: " ".into(), location: "North".into(), ..Default::default() };
        assert!(d.validate().is_err());
        d.name = "Lake".into();
        assert!(d.validate().is_ok());
        d.location.clear();
        assert!(d.validate().is_err());
        assert_eq!(non_blank("  x "), Some("x".to_string()));
        assert_eq!(non_blank("   "), None);
    }
}
