//! Dashboard – every sensor gauge on one live connection.

use leptos::prelude::*;

use crate::components::gauge::{GaugeGrid, LinkIndicator, SensorWarning};
use crate::live::SensorHub;
use crate::state::use_app;

#[component]
pub fn DashboardPage() -> impl IntoView {
    SensorHub::provide(use_app());

    view! {
        <div class="dashboard-page">
            <header class="page-header">
                <h1>"Water quality"</h1>
                <LinkIndicator/>
            </header>
            <GaugeGrid/>
            <SensorWarning/>
        </div>
    }
}
