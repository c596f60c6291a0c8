//! History (`/history`): per-sensor charts for a time range, plus CSV export.

use leptos::logging::{log, warn};
use leptos::prelude::*;

use hydrowatch_common::history::{export_file_name, fetch_all, to_csv, TimeRange};
use hydrowatch_common::sensor::{Reading, SensorKind};

use crate::browser::download_text;
use crate::components::chart::SeriesChart;
use crate::state::use_app;

#[derive(Debug, Clone, PartialEq)]
enum ExportState {
    Idle,
    Running,
    Failed(String),
}

#[component]
pub fn HistoryPage() -> impl IntoView {
    let ctx = use_app();
    let range = RwSignal::new(TimeRange::default());
    // `None` shows every sensor.
    let only = RwSignal::new(Option::<SensorKind>::None);
    let (series, set_series) = signal(Vec::<(SensorKind, Result<Vec<Reading>, String>)>::new());
    let (loading, set_loading) = signal(false);
    let export = RwSignal::new(ExportState::Idle);

    Effect::new(move |_| {
        let range = range.get();
        let kinds: Vec<SensorKind> = match only.get() {
            Some(k) => vec![k],
            None => SensorKind::ALL.to_vec(),
        };
        let Some(client) = ctx.client() else { return };
        set_loading.set(true);
        leptos::task::spawn_local(async move {
            let mut out = Vec::with_capacity(kinds.len());
            for kind in kinds {
                let result = client.series(kind, range).await.map_err(|e| {
                    warn!("Series {kind} ({range}) failed: {e}");
                    e.user_message()
                });
                out.push((kind, result));
            }
            set_series.set(out);
            set_loading.set(false);
        });
    });

    let run_export = move |_| {
        let Some(client) = ctx.client_untracked() else { return };
        let range = range.get_untracked();
        export.set(ExportState::Running);
        leptos::task::spawn_local(async move {
            let outcome = match fetch_all(&client, range).await {
                Ok(sheets) => download_text(&export_file_name(range), "text/csv", &to_csv(&sheets)),
                Err(e) => Err(e.user_message()),
            };
            match outcome {
                Ok(()) => {
                    log!("Exported {range} readings");
                    export.set(ExportState::Idle);
                }
                Err(msg) => export.set(ExportState::Failed(msg)),
            }
        });
    };

    view! {
        <div class="history-page">
            <header class="page-header">
                <h1>"History"</h1>
                <div class="filters">
                    <select on:change=move |ev| {
                        if let Ok(r) = event_target_value(&ev).parse::<TimeRange>() {
                            range.set(r);
                        }
                    }>
                        {TimeRange::ALL.into_iter().map(|r| view! {
                            <option value=r.as_str() selected=move || range.get() == r>{r.label()}</option>
                        }).collect_view()}
                    </select>
                    <select on:change=move |ev| {
                        let slug = event_target_value(&ev);
                        only.set(SensorKind::ALL.into_iter().find(|k| k.slug() == slug));
                    }>
                        <option value="">"All sensors"</option>
                        {SensorKind::ALL.into_iter().map(|k| view! {
                            <option value=k.slug()>{k.name()}</option>
                        }).collect_view()}
                    </select>
                    <button
                        class="btn btn-primary"
                        disabled=move || export.get() == ExportState::Running
                        on:click=run_export
                    >
                        {move || if export.get() == ExportState::Running { "Exporting…" } else { "Export CSV" }}
                    </button>
                </div>
            </header>
            {move || match export.get() {
                ExportState::Failed(msg) => Some(view! {
                    <p class="banner banner-error">"Export failed: " {msg}</p>
                }),
                _ => None,
            }}
            <Show when=move || loading.get()>
                <p class="loading">"Loading readings…"</p>
            </Show>
            <div class="chart-grid">
                {move || series.get().into_iter().map(|(kind, result)| match result {
                    Ok(readings) => view! { <SeriesChart kind=kind series=readings/> }.into_any(),
                    Err(msg) => view! {
                        <div class="chart-card">
                            <h3>{kind.name()}</h3>
                            <p class="error">{msg}</p>
                        </div>
                    }.into_any(),
                }).collect_view()}
            </div>
        </div>
    }
}
