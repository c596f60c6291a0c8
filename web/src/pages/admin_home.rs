//! Admin home (`/adminDB`).

use leptos::prelude::*;
use leptos_router::components::A;

use crate::components::gauge::{GaugeGrid, LinkIndicator, SensorWarning};
use crate::components::notification_list::NotificationList;
use crate::live::SensorHub;
use crate::state::use_app;

#[component]
pub fn AdminHome() -> impl IntoView {
    SensorHub::provide(use_app());

    view! {
        <div class="home-page">
            <header class="page-header">
                <h1>"Administrator overview"</h1>
                <LinkIndicator/>
            </header>
            <nav class="quick-links">
                <A href="/establishments">"Establishments"</A>
                <A href="/history">"History"</A>
                <A href="/calendar">"Calendar"</A>
            </nav>
            <GaugeGrid/>
            <NotificationList limit=10/>
            <SensorWarning/>
        </div>
    }
}
