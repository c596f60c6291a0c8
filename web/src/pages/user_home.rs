//! User home (`/userDB`).

use leptos::prelude::*;
use leptos_router::components::A;

use crate::components::access_modal::AccessModal;
use crate::components::gauge::{GaugeGrid, LinkIndicator, SensorWarning};
use crate::components::notification_list::NotificationList;
use crate::live::SensorHub;
use crate::state::use_app;

/// Live readings for verified users; unverified users get the access dialog.
#[component]
pub fn UserHome() -> impl IntoView {
    let ctx = use_app();
    SensorHub::provide(ctx);

    let verified = move || ctx.user.with(|u| u.as_ref().is_some_and(|u| u.is_verified));
    let greeting = move || {
        ctx.user
            .with(|u| u.as_ref().map(|u| format!("Welcome, {}", u.display_name())))
            .unwrap_or_default()
    };

    view! {
        <div class="home-page">
            <header class="page-header">
                <h1>{greeting}</h1>
                <LinkIndicator/>
            </header>
            <Show
                when=verified
                fallback=|| view! {
                    <div class="restricted">
                        <p>"Your account is waiting for administrator approval."</p>
                    </div>
                }
            >
                <GaugeGrid/>
                <p><A href="/history">"View history and export readings"</A></p>
            </Show>
            <NotificationList limit=5/>
            <SensorWarning/>
            <AccessModal/>
        </div>
    }
}
