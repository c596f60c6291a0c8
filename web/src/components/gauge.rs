//! Dial gauge for one sensor, fed by the page's [`SensorHub`].

use leptos::prelude::*;

use hydrowatch_common::sensor::SensorKind;

use crate::live::use_sensor_hub;

/// One gauge per sensor kind; the thresholds and colours come from the kind.
#[component]
pub fn SensorGauge(kind: SensorKind) -> impl IntoView {
    let live = use_sensor_hub().value(kind);

    let radius = 70.0;
    let stroke_width = 12.0;
    // Three-quarter dial, opening at the bottom.
    let arc = 2.0 * std::f64::consts::PI * radius * 0.75;
    let circumference = 2.0 * std::f64::consts::PI * radius;

    let value = move || live.get().value();
    let band = move || value().map(|v| kind.classify(v));
    let dash_offset = move || {
        let fraction = value().map(|v| kind.gauge_fraction(v)).unwrap_or(0.0);
        format!("{:.2}", arc * (1.0 - fraction))
    };
    let color = move || band().map(|b| b.color).unwrap_or("#9aa5b1");
    let label = move || band().map(|b| b.label).unwrap_or("No data");
    let reading = move || match value() {
        Some(v) => format!("{v:.2}"),
        None => "--".to_string(),
    };
    let freshness = move || if live.get().is_live() { "live" } else { "last known" };

    view! {
        <div class="gauge-card">
            <h3 class="gauge-title">{kind.name()}</h3>
            <svg class="gauge-svg" viewBox="0 0 180 180">
                <circle
                    class="gauge-track"
                    cx="90" cy="90" r=radius.to_string()
                    fill="none"
                    stroke="#e4e7eb"
                    stroke-width=stroke_width.to_string()
                    stroke-dasharray=format!("{arc} {circumference}")
                    transform="rotate(135 90 90)"
                />
                <circle
                    class="gauge-value"
                    cx="90" cy="90" r=radius.to_string()
                    fill="none"
                    stroke=color
                    stroke-width=stroke_width.to_string()
                    stroke-linecap="round"
                    stroke-dasharray=format!("{arc} {circumference}")
                    stroke-dashoffset=dash_offset
                    transform="rotate(135 90 90)"
                />
                <text x="90" y="88" class="gauge-reading" text-anchor="middle">{reading}</text>
                <text x="90" y="110" class="gauge-unit" text-anchor="middle">{kind.unit()}</text>
            </svg>
            <div class="gauge-band" style:color=color>{label}</div>
            <div class="gauge-freshness">{freshness}</div>
        </div>
    }
}

/// Every sensor, in catalogue order.
#[component]
pub fn GaugeGrid() -> impl IntoView {
    view! {
        <div class="gauge-grid">
            {SensorKind::ALL
                .into_iter()
                .map(|kind| view! { <SensorGauge kind=kind/> })
                .collect_view()}
        </div>
    }
}

/// Popup for readings that cross an alert threshold.
#[component]
pub fn SensorWarning() -> impl IntoView {
    let hub = use_sensor_hub();
    move || {
        hub.warning.get().map(|text| {
            view! {
                <div class="modal-backdrop">
                    <div class="modal warning-modal" role="alertdialog">
                        <h3>"Water quality warning"</h3>
                        <p>{text}</p>
                        <button class="btn" on:click=move |_| hub.warning.set(None)>"Dismiss"</button>
                    </div>
                </div>
            }
        })
    }
}

/// Connection indicator for the live stream.
#[component]
pub fn LinkIndicator() -> impl IntoView {
    use crate::live::LinkStatus;
    let hub = use_sensor_hub();
    let (class, text) = (
        move || match hub.status.get() {
            LinkStatus::Connecting => "link link-connecting",
            LinkStatus::Connected => "link link-up",
            LinkStatus::Disconnected => "link link-down",
        },
        move || match hub.status.get() {
            LinkStatus::Connecting => "Connecting…",
            LinkStatus::Connected => "Live",
            LinkStatus::Disconnected => "Offline, showing last known values",
        },
    );
    view! { <span class=class>{text}</span> }
}
