//! Full notification feed for the signed-in role.

use leptos::prelude::*;

use crate::components::notification_list::NotificationList;
use crate::state::use_app;

#[component]
pub fn NotificationsPage() -> impl IntoView {
    let ctx = use_app();
    let unread = move || ctx.feed.with(|f| f.unread_count());

    view! {
        <div class="notifications-page">
            <header class="page-header">
                <h1>"Notifications"</h1>
                <span class="subtitle">{move || format!("{} unread", unread())}</span>
            </header>
            <NotificationList/>
        </div>
    }
}
