//! Route authorization.
//!
//! A static allow-list maps each protected path to the roles that may see
//! it.  [`authorize`] turns the stored role into a render/redirect decision;
//! [`apply_guard`] also maintains the one-shot access-restricted modal flag.

use crate::error::Result;
use crate::role::Role;
use crate::session::SessionUser;
use crate::store::{KeyValueStore, SessionStore};

pub const LOGIN: &str = "/login";
pub const USER_HOME: &str = "/userDB";

/// A guarded page and the roles allowed to open it.
#[derive(Debug, Clone, Copy)]
pub struct RouteRule {
    pub path: &'static str,
    pub allowed: &'static [Role],
}

const EVERYONE: &[Role] = &[Role::User, Role::Admin, Role::SuperAdmin];
const STAFF: &[Role] = &[Role::Admin, Role::SuperAdmin];

pub const ROUTES: &[RouteRule] = &[
    RouteRule { path: "/dashboard", allowed: EVERYONE },
    RouteRule { path: "/userDB", allowed: &[Role::User] },
    RouteRule { path: "/adminDB", allowed: &[Role::Admin] },
    RouteRule { path: "/superadminDB", allowed: &[Role::SuperAdmin] },
    RouteRule { path: "/accountmanagement", allowed: &[Role::SuperAdmin] },
    RouteRule { path: "/establishments", allowed: STAFF },
    RouteRule { path: "/history", allowed: EVERYONE },
    RouteRule { path: "/calendar", allowed: EVERYONE },
    RouteRule { path: "/notifications", allowed: EVERYONE },
    RouteRule { path: "/profile", allowed: EVERYONE },
];

/// Roles allowed on `path`.  Unknown paths allow nobody.
pub fn allowed_roles(path: &str) -> &'static [Role] {
    let path = normalize(path);
    ROUTES
        .iter()
        .find(|r| r.path == path)
        .map(|r| r.allowed)
        .unwrap_or(&[])
}

pub fn is_allowed(role: Role, path: &str) -> bool {
    allowed_roles(path).contains(&role)
}

/// Guarded paths visible to `role`, in table order (used for navigation).
pub fn visible_routes(role: Role) -> impl Iterator<Item = &'static str> {
    ROUTES
        .iter()
        .filter(move |r| r.allowed.contains(&role))
        .map(|r| r.path)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Render,
    Redirect(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardDecision {
    pub decision: Decision,
    /// Whether the access-restricted modal should open on the next page.
    pub access_modal: bool,
}

/// Decide what to do with a navigation to `path`.
pub fn authorize(path: &str, role: Option<Role>, user: Option<&SessionUser>) -> GuardDecision {
    let path = normalize(path);
    let decision = match role {
        None => Decision::Redirect(LOGIN),
        Some(role) if !is_allowed(role, path) => Decision::Redirect(role.redirect_home()),
        Some(_) => Decision::Render,
    };
    let verified = user.map(|u| u.is_verified).unwrap_or(false);
    let access_modal = role == Some(Role::User) && path == USER_HOME && !verified;
    GuardDecision {
        decision,
        access_modal,
    }
}

/// [`authorize`] against the stored session, updating the modal flag.
pub fn apply_guard<S: KeyValueStore>(store: &SessionStore<S>, path: &str) -> Result<GuardDecision> {
    let user = store.user();
    let decision = authorize(path, store.role(), user.as_ref());
    store.set_access_modal(decision.access_modal)?;
    Ok(decision)
}

fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn user(role: Role, verified: bool) -> SessionUser {
        SessionUser {
            id: "1".into(),
            username: "u".into(),
            email: "u@example.com".into(),
            role,
            is_verified: verified,
            device_id: None,
            establishment_id: None,
        }
    }

    #[test]
    fn test_no_role_redirects_to_login() {
        let d = authorize("/dashboard", None, None);
        assert_eq!(d.decision, Decision::Redirect("/login"));
        assert!(!d.access_modal);
    }

    #[test]
    fn test_admin_cannot_manage_accounts() {
        let u = user(Role::Admin, true);
        let d = authorize("/accountmanagement", Some(Role::Admin), Some(&u));
        assert_eq!(d.decision, Decision::Redirect("/adminDB"));
    }

    #[test]
    fn test_every_forbidden_route_redirects_home() {
        for role in Role::ALL {
            let u = user(role, true);
            for rule in ROUTES {
                let d = authorize(rule.path, Some(role), Some(&u));
                if rule.allowed.contains(&role) {
                    assert_eq!(d.decision, Decision::Render, "{role} on {}", rule.path);
                } else {
                    assert_eq!(
                        d.decision,
                        Decision::Redirect(role.redirect_home()),
                        "{role} on {}",
                        rule.path
                    );
                }
            }
        }
    }

    #[test]
    fn test_unknown_path_is_forbidden() {
        let d = authorize("/nowhere", Some(Role::Admin), None);
        assert_eq!(d.decision, Decision::Redirect("/adminDB"));
    }

    #[test]
    fn test_access_modal_only_for_unverified_user_home() {
        let unverified = user(Role::User, false);
        let verified = user(Role::User, true);
        assert!(authorize("/userDB", Some(Role::User), Some(&unverified)).access_modal);
        assert!(authorize("/userDB", Some(Role::User), None).access_modal);
        assert!(!authorize("/userDB", Some(Role::User), Some(&verified)).access_modal);
        assert!(!authorize("/dashboard", Some(Role::User), Some(&unverified)).access_modal);
        let admin = user(Role::Admin, false);
        assert!(!authorize("/userDB", Some(Role::Admin), Some(&admin)).access_modal);
    }

    #[test]
    fn test_unverified_user_still_reaches_history() {
        let unverified = user(Role::User, false);
        for path in ["/history", "/calendar", "/dashboard"] {
            let d = authorize(path, Some(Role::User), Some(&unverified));
            assert_eq!(d.decision, Decision::Render, "{path}");
            assert!(!d.access_modal, "{path}");
        }
    }

    #[test]
    fn test_apply_guard_sets_and_clears_flag() {
        let store = SessionStore::new(MemoryStore::new());
        store.sign_in(&user(Role::User, false), "t").unwrap();

        let d = apply_guard(&store, "/userDB").unwrap();
        assert_eq!(d.decision, Decision::Render);
        assert!(store.access_modal_pending());

        apply_guard(&store, "/history").unwrap();
        assert!(!store.access_modal_pending());
    }

    #[test]
    fn test_trailing_slash_and_query_are_ignored() {
        assert!(is_allowed(Role::SuperAdmin, "/accountmanagement/"));
        assert!(is_allowed(Role::User, "/history?range=24h"));
    }

    #[test]
    fn test_visible_routes() {
        let admin: Vec<_> = visible_routes(Role::Admin).collect();
        assert!(admin.contains(&"/establishments"));
        assert!(!admin.contains(&"/accountmanagement"));
    }
}
