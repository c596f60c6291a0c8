//! Typed client-side store.
//!
//! Every piece of state the dashboard keeps between reloads (session user,
//! token, role, notification caches, login history) goes through
//! [`SessionStore`], which owns the key names and their JSON encoding.  The
//! backing medium is abstracted by [`KeyValueStore`]: `localStorage` in the
//! browser, [`MemoryStore`] natively and in tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::{Error, Result};
use crate::notification::{Notification, NotificationScope};
use crate::role::Role;
use crate::session::{SessionEvent, SessionEventKind, SessionUser};

/// Storage key names.  These are shared with older deployments of the
/// dashboard, so they must not change.
pub mod keys {
    pub const USER: &str = "user";
    pub const TOKEN: &str = "token";
    pub const USER_ROLE: &str = "userRole";
    pub const ACCESS_MODAL: &str = "showAccessModalOnLoad";
    pub const SUPER_ADMIN_NOTIFICATIONS: &str = "superAdminNotifications";
    pub const ADMIN_NOTIFICATIONS: &str = "adminNotifications";
    pub const USER_NOTIFICATIONS_PREFIX: &str = "userNotifications_";
    pub const SESSION_HISTORY: &str = "sessionHistory";
}

const SESSION_HISTORY_CAP: usize = 50;

/// A string key/value medium.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str);
}

/// In-memory store, cheap to clone (clones share the same map).
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    map: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self
            .map
            .lock()
            .map_err(|_| Error::Storage("memory store poisoned".into()))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        if let Ok(mut map) = self.map.lock() {
            map.remove(key);
        }
    }
}

/// Typed accessors over a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct SessionStore<S> {
    inner: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn backend(&self) -> &S {
        &self.inner
    }

    /// Raw value, treating the literal strings older code wrote for missing
    /// values (`"undefined"`, `"null"`, empty) as absent.
    fn raw(&self, key: &str) -> Option<String> {
        self.inner
            .get(key)
            .filter(|v| !matches!(v.trim(), "" | "undefined" | "null"))
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Ignoring malformed {key} in storage: {e}");
                None
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let text = serde_json::to_string(value)?;
        self.inner.set(key, &text)
    }

    // ── session ──────────────────────────────────────────────────────

    pub fn user(&self) -> Option<SessionUser> {
        self.read_json(keys::USER)
    }

    pub fn token(&self) -> Option<String> {
        self.raw(keys::TOKEN)
    }

    /// The top-level `userRole` entry.  An unrecognised role reads as no role.
    pub fn role(&self) -> Option<Role> {
        let raw = self.raw(keys::USER_ROLE)?;
        // Some writers stored the role JSON-encoded, others as a bare string.
        let name = serde_json::from_str::<String>(&raw).unwrap_or(raw);
        match name.parse() {
            Ok(role) => Some(role),
            Err(e) => {
                warn!("{e}");
                None
            }
        }
    }

    /// Persist a fresh login.  `user` and `userRole` are written from the
    /// same value so the two copies of the role agree.
    pub fn sign_in(&self, user: &SessionUser, token: &str) -> Result<()> {
        self.write_json(keys::USER, user)?;
        self.inner.set(keys::TOKEN, token)?;
        self.inner.set(keys::USER_ROLE, user.role.as_str())?;
        self.record_session(SessionEventKind::Login, Some(user.display_name()))
    }

    /// Replace the stored user (e.g. after verification was granted).
    pub fn update_user(&self, user: &SessionUser) -> Result<()> {
        self.write_json(keys::USER, user)?;
        self.inner.set(keys::USER_ROLE, user.role.as_str())
    }

    pub fn sign_out(&self) {
        let who = self.user().map(|u| u.display_name().to_string());
        if let Err(e) = self.record_session(SessionEventKind::Logout, who.as_deref()) {
            warn!("Cannot record logout: {e}");
        }
        for key in [keys::USER, keys::TOKEN, keys::USER_ROLE, keys::ACCESS_MODAL] {
            self.inner.remove(key);
        }
    }

    // ── access-restricted modal flag ─────────────────────────────────

    pub fn access_modal_pending(&self) -> bool {
        self.raw(keys::ACCESS_MODAL).as_deref() == Some("true")
    }

    pub fn set_access_modal(&self, show: bool) -> Result<()> {
        if show {
            self.inner.set(keys::ACCESS_MODAL, "true")
        } else {
            self.inner.remove(keys::ACCESS_MODAL);
            Ok(())
        }
    }

    /// Read the flag and clear it, so the modal opens once per navigation.
    pub fn take_access_modal(&self) -> bool {
        let pending = self.access_modal_pending();
        self.inner.remove(keys::ACCESS_MODAL);
        pending
    }

    // ── notification caches ──────────────────────────────────────────

    pub fn cached_notifications(&self, scope: &NotificationScope) -> Vec<Notification> {
        self.read_json(&scope.storage_key()).unwrap_or_default()
    }

    pub fn cache_notifications(
        &self,
        scope: &NotificationScope,
        items: &[Notification],
    ) -> Result<()> {
        self.write_json(&scope.storage_key(), items)
    }

    // ── session history ──────────────────────────────────────────────

    pub fn session_history(&self) -> Vec<SessionEvent> {
        self.read_json(keys::SESSION_HISTORY).unwrap_or_default()
    }

    pub fn record_session(&self, kind: SessionEventKind, user: Option<&str>) -> Result<()> {
        let mut history = self.session_history();
        history.push(SessionEvent {
            event: kind,
            at: Utc::now(),
            user: user.map(str::to_string),
        });
        if history.len() > SESSION_HISTORY_CAP {
            let excess = history.len() - SESSION_HISTORY_CAP;
            history.drain(..excess);
        }
        self.write_json(keys::SESSION_HISTORY, &history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::NotificationStatus;

    fn store() -> SessionStore<MemoryStore> {
        SessionStore::new(MemoryStore::new())
    }

    fn user(role: Role) -> SessionUser {
        SessionUser {
            id: "42".into(),
            username: "marta".into(),
            email: "marta@example.com".into(),
            role,
            is_verified: false,
            device_id: None,
            establishment_id: None,
        }
    }

    #[test]
    fn test_literal_null_strings_read_as_absent() {
        let s = store();
        s.backend().set(keys::USER, "undefined").unwrap();
        s.backend().set(keys::TOKEN, "null").unwrap();
        s.backend().set(keys::USER_ROLE, "").unwrap();
        assert!(s.user().is_none());
        assert!(s.token().is_none());
        assert!(s.role().is_none());
    }

    #[test]
    fn test_malformed_json_reads_as_absent() {
        let s = store();
        s.backend().set(keys::USER, "{not json").unwrap();
        s.backend().set(keys::ADMIN_NOTIFICATIONS, "[1,2").unwrap();
        assert!(s.user().is_none());
        assert!(s.cached_notifications(&NotificationScope::Admin).is_empty());
    }

    #[test]
    fn test_sign_in_keeps_role_copies_consistent() {
        let s = store();
        s.sign_in(&user(Role::SuperAdmin), "tok").unwrap();
        assert_eq!(s.role(), Some(Role::SuperAdmin));
        assert_eq!(s.user().unwrap().role, Role::SuperAdmin);
        assert_eq!(s.token().as_deref(), Some("tok"));
        assert_eq!(s.backend().get(keys::USER_ROLE).as_deref(), Some("Super Admin"));
    }

    #[test]
    fn test_role_accepts_json_encoded_string() {
        let s = store();
        s.backend().set(keys::USER_ROLE, "\"Admin\"").unwrap();
        assert_eq!(s.role(), Some(Role::Admin));
        s.backend().set(keys::USER_ROLE, "Janitor").unwrap();
        assert_eq!(s.role(), None);
    }

    #[test]
    fn test_sign_out_clears_session_and_logs_history() {
        let s = store();
        s.sign_in(&user(Role::User), "tok").unwrap();
        s.set_access_modal(true).unwrap();
        s.sign_out();
        assert!(s.user().is_none());
        assert!(s.role().is_none());
        assert!(!s.access_modal_pending());
        let history = s.session_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].event, SessionEventKind::Login);
        assert_eq!(history[1].event, SessionEventKind::Logout);
        assert_eq!(history[1].user.as_deref(), Some("marta"));
    }

    #[test]
    fn test_take_access_modal_is_one_shot() {
        let s = store();
        s.set_access_modal(true).unwrap();
        assert!(s.take_access_modal());
        assert!(!s.take_access_modal());
    }

    #[test]
    fn test_session_history_is_capped() {
        let s = store();
        for _ in 0..(SESSION_HISTORY_CAP + 7) {
            s.record_session(SessionEventKind::Login, None).unwrap();
        }
        assert_eq!(s.session_history().len(), SESSION_HISTORY_CAP);
    }

    #[test]
    fn test_notification_cache_is_scoped() {
        let s = store();
        let n = Notification {
            id: "n1".into(),
            kind: "access_request".into(),
            message: "please".into(),
            read: false,
            status: Some(NotificationStatus::Pending),
            created_at: None,
            from_user_id: Some("42".into()),
        };
        let scope = NotificationScope::User("42".into());
        s.cache_notifications(&scope, &[n.clone()]).unwrap();
        assert_eq!(s.cached_notifications(&scope), vec![n]);
        assert!(s.cached_notifications(&NotificationScope::User("7".into())).is_empty());
        assert!(s.backend().get("userNotifications_42").is_some());
    }
}
