//! Application-wide reactive state, provided once at the root as context.

use leptos::logging::{error, log, warn};
use leptos::prelude::*;

use hydrowatch_common::config::ClientConfig;
use hydrowatch_common::notification::{
    apply_approval, NotificationFeed, NotificationPoller, NotificationScope,
};
use hydrowatch_common::session::SessionUser;
use hydrowatch_common::BackendClient;

use crate::storage::{session_store, BrowserStore};

#[derive(Debug, Clone, Copy)]
pub struct AppContext {
    /// Backend location and polling periods, fetched from the server.
    pub config: RwSignal<Option<ClientConfig>>,
    /// Signed-in user, mirrored from storage after hydration.
    pub user: RwSignal<Option<SessionUser>>,
    /// Notification feed for the signed-in user's scope.
    pub feed: RwSignal<NotificationFeed>,
    /// Set while the feed shows the cached copy because the backend failed.
    pub feed_notice: RwSignal<Option<String>>,
}

impl AppContext {
    pub fn provide() -> Self {
        let ctx = Self {
            config: RwSignal::new(None),
            user: RwSignal::new(None),
            feed: RwSignal::new(NotificationFeed::default()),
            feed_notice: RwSignal::new(None),
        };
        provide_context(ctx);
        ctx
    }

    pub fn client_for(config: &ClientConfig) -> BackendClient {
        BackendClient::new(config.backend_url.clone()).with_token(session_store().token())
    }

    /// REST client once the configuration has arrived (tracked).
    pub fn client(&self) -> Option<BackendClient> {
        self.config.with(|c| c.as_ref().map(Self::client_for))
    }

    pub fn client_untracked(&self) -> Option<BackendClient> {
        self.config.with_untracked(|c| c.as_ref().map(Self::client_for))
    }

    pub fn scope_untracked(&self) -> Option<NotificationScope> {
        self.user.with_untracked(|u| u.as_ref().map(NotificationScope::for_user))
    }

    pub fn poller(&self) -> Option<NotificationPoller<BrowserStore>> {
        let client = self.client_untracked()?;
        let scope = self.scope_untracked()?;
        Some(NotificationPoller::new(client, session_store(), scope))
    }

    pub fn sign_in(&self, user: SessionUser, token: &str) -> hydrowatch_common::Result<()> {
        session_store().sign_in(&user, token)?;
        self.user.set(Some(user));
        Ok(())
    }

    /// Pick up an approved access request from the feed: the stored user
    /// becomes verified without signing in again.
    pub fn sync_approval(&self) {
        let Some(user) = self.user.get_untracked() else { return };
        let Some(verified) = self.feed.with_untracked(|f| apply_approval(&user, f.items())) else {
            return;
        };
        if let Err(e) = session_store().update_user(&verified) {
            error!("Cannot store verified user: {e}");
        }
        log!("Access granted to {}", verified.display_name());
        self.user.set(Some(verified));
    }

    pub fn sign_out(&self) {
        session_store().sign_out();
        self.user.set(None);
        self.feed.set(NotificationFeed::default());
        self.feed_notice.set(None);
    }
}

pub fn use_app() -> AppContext {
    expect_context::<AppContext>()
}

/// Restore the session and keep the notification feed fresh.
///
/// Polling restarts whenever the user or the configuration changes and
/// stops on sign-out.
pub fn start_background_tasks(ctx: AppContext) {
    Effect::new(move |_| {
        ctx.user.set(session_store().user());
    });

    Effect::new(move |_| {
        let Some(config) = ctx.config.get() else { return };
        let Some(user) = ctx.user.get() else { return };

        let scope = NotificationScope::for_user(&user);
        let poller = NotificationPoller::new(
            AppContext::client_for(&config),
            session_store(),
            scope.clone(),
        );
        ctx.feed.set(NotificationFeed::new(poller.cached()));

        let tick = move || {
            let poller = poller.clone();
            leptos::task::spawn_local(async move {
                let snap = poller.refresh().await;
                if let Some(e) = &snap.error {
                    warn!("Notification refresh failed, showing cached copy: {e}");
                }
                ctx.feed.update(|f| f.replace_all(snap.items));
                ctx.feed_notice.set(snap.error);
                ctx.sync_approval();
            });
        };
        tick();

        match set_interval_with_handle(tick, config.poll_interval(&scope)) {
            Ok(handle) => on_cleanup(move || handle.clear()),
            Err(e) => error!("Cannot start notification polling: {e:?}"),
        }
    });
}
