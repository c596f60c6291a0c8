//! Super Admin home (`/superadminDB`).

use leptos::logging::warn;
use leptos::prelude::*;
use leptos_router::components::A;

use crate::components::gauge::{GaugeGrid, LinkIndicator, SensorWarning};
use crate::components::notification_list::NotificationList;
use crate::live::SensorHub;
use crate::state::use_app;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Totals {
    users: usize,
    admins: usize,
    establishments: usize,
}

#[component]
pub fn SuperAdminHome() -> impl IntoView {
    let ctx = use_app();
    SensorHub::provide(ctx);

    let (totals, set_totals) = signal(Option::<Totals>::None);
    let (error, set_error) = signal(Option::<String>::None);

    Effect::new(move |_| {
        let Some(client) = ctx.client() else { return };
        leptos::task::spawn_local(async move {
            let result = async {
                Ok::<_, hydrowatch_common::Error>(Totals {
                    users: client.users().await?.len(),
                    admins: client.admins().await?.len(),
                    establishments: client.establishments().await?.len(),
                })
            }
            .await;
            match result {
                Ok(t) => set_totals.set(Some(t)),
                Err(e) => {
                    warn!("Cannot load account totals: {e}");
                    set_error.set(Some(e.user_message()));
                }
            }
        });
    });

    let pending = move || ctx.feed.with(|f| f.items().iter().filter(|n| n.is_actionable()).count());

    view! {
        <div class="home-page">
            <header class="page-header">
                <h1>"System overview"</h1>
                <LinkIndicator/>
            </header>
            {move || error.get().map(|m| view! { <p class="banner banner-error">{m}</p> })}
            <div class="stat-row">
                {move || totals.get().map(|t| view! {
                    <A href="/accountmanagement" attr:class="stat-card">
                        <span class="stat-value">{t.users}</span>
                        <span class="stat-label">"Users"</span>
                    </A>
                    <A href="/accountmanagement" attr:class="stat-card">
                        <span class="stat-value">{t.admins}</span>
                        <span class="stat-label">"Admins"</span>
                    </A>
                    <A href="/establishments" attr:class="stat-card">
                        <span class="stat-value">{t.establishments}</span>
                        <span class="stat-label">"Establishments"</span>
                    </A>
                })}
                <A href="/notifications" attr:class="stat-card">
                    <span class="stat-value">{pending}</span>
                    <span class="stat-label">"Pending access requests"</span>
                </A>
            </div>
            <GaugeGrid/>
            <NotificationList limit=10/>
            <SensorWarning/>
        </div>
    }
}
