//! Notification feed with per-item and bulk actions.

use leptos::logging::warn;
use leptos::prelude::*;

use hydrowatch_common::notification::{FeedAction, Notification, NotificationScope, NotificationStatus};

use crate::state::{use_app, AppContext};

/// Run `action` against the backend, then patch the live feed.
fn perform(ctx: AppContext, set_error: WriteSignal<Option<String>>, action: FeedAction) {
    let Some(poller) = ctx.poller() else {
        set_error.set(Some("You are not signed in.".into()));
        return;
    };
    leptos::task::spawn_local(async move {
        match poller.perform(&action).await {
            Ok(()) => {
                ctx.feed.update(|f| action.apply(f));
                ctx.feed.with_untracked(|f| poller.persist(f));
                set_error.set(None);
            }
            Err(e) => {
                warn!("{action:?} failed: {e}");
                set_error.set(Some(e.user_message()));
            }
        }
    });
}

fn status_label(status: Option<NotificationStatus>) -> Option<&'static str> {
    status.map(|s| match s {
        NotificationStatus::Pending => "Pending",
        NotificationStatus::Approved => "Approved",
        NotificationStatus::Declined => "Declined",
    })
}

/// The signed-in user's notifications.  `limit` shows only the newest few.
#[component]
pub fn NotificationList(#[prop(optional)] limit: Option<usize>) -> impl IntoView {
    let ctx = use_app();
    let (error, set_error) = signal(Option::<String>::None);
    let can_review = move || {
        ctx.user
            .with(|u| u.as_ref().map(NotificationScope::for_user))
            == Some(NotificationScope::SuperAdmin)
    };

    let item_view = move |n: Notification| {
        let id = n.id.clone();
        let (id_read, id_delete, id_approve, id_decline) =
            (id.clone(), id.clone(), id.clone(), id);
        let actionable = n.is_actionable();
        let class = if n.read { "notification read" } else { "notification unread" };
        view! {
            <li class=class>
                <div class="notification-body">
                    <span class="notification-kind">{n.kind.replace('_', " ")}</span>
                    <p>{n.message.clone()}</p>
                    {n.created_at.clone().map(|t| view! { <time>{t}</time> })}
                    {status_label(n.status).map(|s| view! { <span class="status">{s}</span> })}
                </div>
                <div class="notification-actions">
                    <Show when=move || actionable && can_review()>
                        <button class="btn btn-ok" on:click={
                            let id = id_approve.clone();
                            move |_| perform(ctx, set_error, FeedAction::Approve(id.clone()))
                        }>"Approve"</button>
                        <button class="btn btn-danger" on:click={
                            let id = id_decline.clone();
                            move |_| perform(ctx, set_error, FeedAction::Decline(id.clone()))
                        }>"Decline"</button>
                    </Show>
                    {(!n.read).then(|| view! {
                        <button class="btn btn-link" on:click=move |_| {
                            perform(ctx, set_error, FeedAction::MarkRead(id_read.clone()))
                        }>"Mark read"</button>
                    })}
                    <button class="btn btn-link" on:click=move |_| {
                        perform(ctx, set_error, FeedAction::Delete(id_delete.clone()))
                    }>"Delete"</button>
                </div>
            </li>
        }
    };

    view! {
        <section class="notification-list">
            <header class="notification-header">
                <h2>"Notifications"</h2>
                <div class="notification-bulk">
                    <button class="btn" on:click=move |_| perform(ctx, set_error, FeedAction::MarkAllRead)>
                        "Mark all read"
                    </button>
                    <button class="btn btn-danger" on:click=move |_| perform(ctx, set_error, FeedAction::DeleteAll)>
                        "Delete all"
                    </button>
                </div>
            </header>
            {move || ctx.feed_notice.get().map(|msg| view! {
                <p class="banner banner-warn">"Showing saved notifications: " {msg}</p>
            })}
            {move || error.get().map(|msg| view! { <p class="banner banner-error">{msg}</p> })}
            {move || {
                let items: Vec<Notification> = ctx.feed.with(|f| {
                    let items = f.items();
                    items[..limit.unwrap_or(items.len()).min(items.len())].to_vec()
                });
                if items.is_empty() {
                    view! { <p class="empty">"No notifications."</p> }.into_any()
                } else {
                    view! {
                        <ul>{items.into_iter().map(item_view).collect_view()}</ul>
                    }
                    .into_any()
                }
            }}
        </section>
    }
}
