//! Notification feeds: wire types, local feed state and the poller that
//! keeps a feed in step with the backend.

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

use crate::api::BackendClient;
use crate::error::Result;
use crate::session::SessionUser;
use crate::store::{keys, KeyValueStore, SessionStore};
use crate::wire;

pub const KIND_ACCESS_REQUEST: &str = "access_request";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Pending,
    Approved,
    Declined,
}

/// Unknown status strings read as "no status" rather than failing the list.
fn lenient_status<'de, D>(d: D) -> std::result::Result<Option<NotificationStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(d)?;
    Ok(raw.and_then(|s| match s.to_ascii_lowercase().as_str() {
        "pending" => Some(NotificationStatus::Pending),
        "approved" => Some(NotificationStatus::Approved),
        "declined" | "rejected" => Some(NotificationStatus::Declined),
        _ => None,
    }))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(alias = "_id", deserialize_with = "wire::id")]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, deserialize_with = "wire::lenient_bool")]
    pub read: bool,
    #[serde(default, deserialize_with = "lenient_status", skip_serializing_if = "Option::is_none")]
    pub status: Option<NotificationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_id", skip_serializing_if = "Option::is_none")]
    pub from_user_id: Option<String>,
}

impl Notification {
    pub fn is_access_request(&self) -> bool {
        self.kind == KIND_ACCESS_REQUEST
    }

    /// Approve/decline buttons only make sense while the request is open.
    pub fn is_actionable(&self) -> bool {
        self.is_access_request() && matches!(self.status, None | Some(NotificationStatus::Pending))
    }
}

/// Body of `POST <scope base>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_user_id: Option<String>,
}

impl NewNotification {
    pub fn access_request(user: &SessionUser) -> Self {
        Self {
            kind: KIND_ACCESS_REQUEST.to_string(),
            message: format!(
                "{} ({}) is requesting access to the monitoring dashboard.",
                user.display_name(),
                user.email
            ),
            from_user_id: Some(user.id.clone()),
        }
    }
}

// ─── Scope ───────────────────────────────────────────────────────────────────

/// Whose feed: the Super Admin inbox, the Admin inbox or one user's.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NotificationScope {
    SuperAdmin,
    Admin,
    User(String),
}

impl NotificationScope {
    pub fn for_user(user: &SessionUser) -> Self {
        match user.role {
            crate::role::Role::SuperAdmin => Self::SuperAdmin,
            crate::role::Role::Admin => Self::Admin,
            crate::role::Role::User => Self::User(user.id.clone()),
        }
    }

    pub fn storage_key(&self) -> String {
        match self {
            Self::SuperAdmin => keys::SUPER_ADMIN_NOTIFICATIONS.to_string(),
            Self::Admin => keys::ADMIN_NOTIFICATIONS.to_string(),
            Self::User(id) => format!("{}{id}", keys::USER_NOTIFICATIONS_PREFIX),
        }
    }

    pub fn base_path(&self) -> String {
        match self {
            Self::SuperAdmin => "/api/admin/notifications".to_string(),
            Self::Admin => "/api/notifications/admin".to_string(),
            Self::User(id) => format!("/api/notifications/user/{id}"),
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Self::User(_))
    }
}

// ─── Feed ────────────────────────────────────────────────────────────────────

/// In-memory list, newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationFeed {
    items: Vec<Notification>,
}

impl NotificationFeed {
    pub fn new(items: Vec<Notification>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn replace_all(&mut self, items: Vec<Notification>) {
        self.items = items;
    }

    /// Insert at the top; an item with the same id is replaced.
    pub fn push_front(&mut self, n: Notification) {
        self.items.retain(|i| i.id != n.id);
        self.items.insert(0, n);
    }

    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_read(&mut self) {
        for n in &mut self.items {
            n.read = true;
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn set_status(&mut self, id: &str, status: NotificationStatus) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.status = Some(status);
                n.read = true;
                true
            }
            None => false,
        }
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }
}

// ─── Poller ──────────────────────────────────────────────────────────────────

/// Where the feed contents of the last refresh came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Backend,
    Cache,
}

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub items: Vec<Notification>,
    pub source: Source,
    /// Set when the backend call failed.
    pub error: Option<String>,
}

/// Drives one scope's feed: fetch, cache, and the REST-backed actions.
#[derive(Debug, Clone)]
pub struct NotificationPoller<S> {
    client: BackendClient,
    store: SessionStore<S>,
    scope: NotificationScope,
}

impl<S: KeyValueStore> NotificationPoller<S> {
    pub fn new(client: BackendClient, store: SessionStore<S>, scope: NotificationScope) -> Self {
        Self { client, store, scope }
    }

    pub fn scope(&self) -> &NotificationScope {
        &self.scope
    }

    /// Cached copy from the last successful fetch, for first paint.
    pub fn cached(&self) -> Vec<Notification> {
        self.store.cached_notifications(&self.scope)
    }

    /// Fetch the scope's list.  Success mirrors it into the cache; failure
    /// serves the cache instead.
    pub async fn refresh(&self) -> Snapshot {
        match self.client.notifications(&self.scope).await {
            Ok(items) => {
                if let Err(e) = self.store.cache_notifications(&self.scope, &items) {
                    warn!("Cannot cache {} notifications: {e}", self.scope.storage_key());
                }
                Snapshot { items, source: Source::Backend, error: None }
            }
            Err(e) => {
                warn!("Notification fetch for {} failed, using cache: {e}", self.scope.base_path());
                Snapshot {
                    items: self.cached(),
                    source: Source::Cache,
                    error: Some(e.user_message()),
                }
            }
        }
    }

    /// Apply a refresh to `feed` and report where the data came from.
    pub async fn refresh_into(&self, feed: &mut NotificationFeed) -> Snapshot {
        let snap = self.refresh().await;
        feed.replace_all(snap.items.clone());
        snap
    }

    /// Mirror `feed` into the scope's cache key.
    pub fn persist(&self, feed: &NotificationFeed) {
        if let Err(e) = self.store.cache_notifications(&self.scope, feed.items()) {
            warn!("Cannot cache {} notifications: {e}", self.scope.storage_key());
        }
    }

    /// Send `action` to the backend.  The caller patches whatever feed is
    /// current once this returns, then calls [`persist`](Self::persist).
    pub async fn perform(&self, action: &FeedAction) -> Result<()> {
        match action {
            FeedAction::MarkRead(id) => self.client.mark_read(&self.scope, id).await,
            FeedAction::MarkAllRead => self.client.mark_all_read(&self.scope).await,
            FeedAction::Delete(id) => self.client.delete_notification(&self.scope, id).await,
            FeedAction::DeleteAll => self.client.delete_all_notifications(&self.scope).await,
            FeedAction::Approve(id) => {
                self.client.approve(id).await?;
                info!("Access request {id} approved");
                Ok(())
            }
            FeedAction::Decline(id) => {
                self.client.decline(id).await?;
                info!("Access request {id} declined");
                Ok(())
            }
        }
    }
}

// ─── Actions ─────────────────────────────────────────────────────────────────

/// A user action on the feed.  The REST call and the local patch are kept
/// apart so the patch always lands on the feed as it is after the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedAction {
    MarkRead(String),
    MarkAllRead,
    Delete(String),
    DeleteAll,
    Approve(String),
    Decline(String),
}

impl FeedAction {
    pub fn apply(&self, feed: &mut NotificationFeed) {
        match self {
            FeedAction::MarkRead(id) => {
                feed.mark_read(id);
            }
            FeedAction::MarkAllRead => feed.mark_all_read(),
            FeedAction::Delete(id) => {
                feed.remove(id);
            }
            FeedAction::DeleteAll => feed.clear(),
            FeedAction::Approve(id) => {
                feed.set_status(id, NotificationStatus::Approved);
            }
            FeedAction::Decline(id) => {
                feed.set_status(id, NotificationStatus::Declined);
            }
        }
    }
}

// ─── Access requests ─────────────────────────────────────────────────────────

/// Ask the Super Admin for dashboard access on behalf of `user`.
///
/// The request lands in the Super Admin inbox.  The returned pending copy is
/// also added to the user's cached feed; the caller puts it on screen.
pub async fn submit_access_request<S: KeyValueStore>(
    client: &BackendClient,
    store: &SessionStore<S>,
    user: &SessionUser,
) -> Result<Notification> {
    let body = NewNotification::access_request(user);
    let created = client
        .create_notification(&NotificationScope::SuperAdmin, &body)
        .await?;
    let doc = created.get("notification").unwrap_or(&created);
    let id = doc
        .get("_id")
        .or_else(|| doc.get("id"))
        .and_then(wire::value_to_id)
        .unwrap_or_else(|| format!("local-{}", Utc::now().timestamp_millis()));

    let pending = Notification {
        id,
        kind: KIND_ACCESS_REQUEST.to_string(),
        message: "Your access request was sent to the administrator.".to_string(),
        read: true,
        status: Some(NotificationStatus::Pending),
        created_at: Some(Utc::now().to_rfc3339()),
        from_user_id: Some(user.id.clone()),
    };
    let scope = NotificationScope::User(user.id.clone());
    let mut cached = NotificationFeed::new(store.cached_notifications(&scope));
    cached.push_front(pending.clone());
    store.cache_notifications(&scope, cached.items())?;
    info!("Access request submitted for {}", user.display_name());
    Ok(pending)
}

/// True when `items` show an approved access request for `user_id`.
/// Items without a sender are taken to be the user's own (user-scope feed).
pub fn access_granted(items: &[Notification], user_id: &str) -> bool {
    items.iter().any(|n| {
        n.is_access_request()
            && n.status == Some(NotificationStatus::Approved)
            && n.from_user_id.as_deref().map_or(true, |id| id == user_id)
    })
}

/// The session user with verification granted, if `items` approve a still
/// unverified User.  `None` means nothing to change.
pub fn apply_approval(user: &SessionUser, items: &[Notification]) -> Option<SessionUser> {
    if user.role != crate::role::Role::User || user.is_verified || !access_granted(items, &user.id) {
        return None;
    }
    Some(SessionUser { is_verified: true, ..user.clone() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;

    fn n(id: &str, read: bool) -> Notification {
        Notification {
            id: id.into(),
            kind: "alert".into(),
            message: format!("msg {id}"),
            read,
            status: None,
            created_at: None,
            from_user_id: None,
        }
    }

    #[test]
    fn test_mark_all_read_clears_unread() {
        let mut feed = NotificationFeed::new(vec![n("1", false), n("2", true), n("3", false)]);
        assert_eq!(feed.unread_count(), 2);
        feed.mark_all_read();
        assert!(feed.items().iter().all(|n| n.read));
        assert_eq!(feed.unread_count(), 0);
    }

    #[test]
    fn test_push_front_dedups() {
        let mut feed = NotificationFeed::new(vec![n("1", false), n("2", false)]);
        feed.push_front(n("2", true));
        assert_eq!(feed.items().len(), 2);
        assert_eq!(feed.items()[0].id, "2");
        assert!(feed.items()[0].read);
    }

    #[test]
    fn test_remove_and_status() {
        let mut feed = NotificationFeed::new(vec![n("1", false), n("2", false)]);
        assert!(feed.remove("1"));
        assert!(!feed.remove("1"));
        assert!(feed.set_status("2", NotificationStatus::Approved));
        assert_eq!(feed.items()[0].status, Some(NotificationStatus::Approved));
        assert_eq!(feed.unread_count(), 0);
        assert!(!feed.mark_read("nope"));
        feed.clear();
        assert!(feed.is_empty());
    }

    #[test]
    fn test_wire_decoding() {
        let raw = r#"[
            {"_id": "a", "type": "access_request", "message": "m", "read": "false",
             "status": "pending", "createdAt": "2024-06-01T10:00:00Z", "fromUserId": 7},
            {"id": 9, "type": "alert", "status": "weird"}
        ]"#;
        let list: Vec<Notification> = serde_json::from_str(raw).unwrap();
        assert_eq!(list[0].id, "a");
        assert!(!list[0].read);
        assert_eq!(list[0].from_user_id.as_deref(), Some("7"));
        assert!(list[0].is_actionable());
        assert_eq!(list[1].id, "9");
        assert_eq!(list[1].status, None);
        assert!(!list[1].is_actionable());
    }

    #[test]
    fn test_scope_keys_and_paths() {
        let user = SessionUser {
            id: "42".into(),
            username: "ines".into(),
            email: "ines@example.com".into(),
            role: Role::User,
            is_verified: false,
            device_id: None,
            establishment_id: None,
        };
        let scope = NotificationScope::for_user(&user);
        assert_eq!(scope.storage_key(), "userNotifications_42");
        assert_eq!(scope.base_path(), "/api/notifications/user/42");
        assert_eq!(NotificationScope::SuperAdmin.storage_key(), "superAdminNotifications");
        assert_eq!(NotificationScope::Admin.storage_key(), "adminNotifications");

        let body = serde_json::to_value(NewNotification::access_request(&user)).unwrap();
        assert_eq!(body["type"], "access_request");
        assert_eq!(body["fromUserId"], "42");
    }

    fn request(id: &str, from: Option<&str>, status: NotificationStatus) -> Notification {
        Notification {
            id: id.into(),
            kind: KIND_ACCESS_REQUEST.into(),
            message: "access".into(),
            read: false,
            status: Some(status),
            created_at: None,
            from_user_id: from.map(str::to_string),
        }
    }

    fn unverified(id: &str) -> SessionUser {
        SessionUser {
            id: id.into(),
            username: "ines".into(),
            email: "ines@example.com".into(),
            role: Role::User,
            is_verified: false,
            device_id: None,
            establishment_id: None,
        }
    }

    #[test]
    fn test_approval_marks_user_verified() {
        let user = unverified("42");
        assert_eq!(apply_approval(&user, &[request("r1", Some("42"), NotificationStatus::Pending)]), None);

        let approved = [n("x", false), request("r1", Some("42"), NotificationStatus::Approved)];
        let updated = apply_approval(&user, &approved).unwrap();
        assert!(updated.is_verified);
        assert_eq!(updated.id, "42");

        // Already verified: nothing to write.
        assert_eq!(apply_approval(&updated, &approved), None);
    }

    #[test]
    fn test_approval_ignores_other_users_and_declines() {
        let user = unverified("42");
        assert!(!access_granted(&[request("r1", Some("7"), NotificationStatus::Approved)], "42"));
        assert!(!access_granted(&[request("r1", Some("42"), NotificationStatus::Declined)], "42"));
        assert!(access_granted(&[request("r1", None, NotificationStatus::Approved)], "42"));

        let admin = SessionUser { role: Role::Admin, ..user };
        assert_eq!(apply_approval(&admin, &[request("r1", None, NotificationStatus::Approved)]), None);
    }

    #[test]
    fn test_actions_patch_the_current_feed() {
        // Two deletes whose REST calls overlapped, with a refresh landing
        // between them: each patch applies to the feed as it is then.
        let mut feed = NotificationFeed::new(vec![n("a", false), n("b", false), n("c", false)]);
        FeedAction::Delete("b".into()).apply(&mut feed);
        feed.push_front(n("d", false));
        FeedAction::Delete("a".into()).apply(&mut feed);
        let ids: Vec<_> = feed.items().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["d", "c"]);

        FeedAction::Approve("c".into()).apply(&mut feed);
        assert_eq!(feed.items()[1].status, Some(NotificationStatus::Approved));
        FeedAction::MarkAllRead.apply(&mut feed);
        assert_eq!(feed.unread_count(), 0);
        FeedAction::DeleteAll.apply(&mut feed);
        assert!(feed.is_empty());
    }
}
