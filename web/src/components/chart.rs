//! SVG line chart for a history series.

use leptos::prelude::*;

use hydrowatch_common::history::chart_path;
use hydrowatch_common::sensor::{Reading, SensorKind};

const WIDTH: f64 = 400.0;
const HEIGHT: f64 = 150.0;

#[component]
pub fn SeriesChart(kind: SensorKind, series: Vec<Reading>) -> impl IntoView {
    let path = chart_path(&series, WIDTH, HEIGHT);
    let (lo, hi) = series.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
        (lo.min(r.value), hi.max(r.value))
    });
    let latest = series.last().map(|r| r.value);
    let first_ts = series.first().and_then(|r| r.timestamp);
    let last_ts = series.last().and_then(|r| r.timestamp);
    let fmt_ts = |t: Option<chrono::DateTime<chrono::Utc>>| {
        t.map(|t| t.format("%Y-%m-%d %H:%M").to_string()).unwrap_or_default()
    };

    view! {
        <div class="chart-card">
            <div class="chart-head">
                <h3>{kind.name()}</h3>
                {latest.map(|v| {
                    let band = kind.classify(v);
                    view! {
                        <span class="chart-latest" style:color=band.color>
                            {format!("{v:.2} {}", kind.unit())}" · "{band.label}
                        </span>
                    }
                })}
            </div>
            {if series.is_empty() {
                view! { <p class="empty">"No data for this range."</p> }.into_any()
            } else {
                view! {
                    <svg class="chart-svg" viewBox=format!("0 0 {WIDTH} {HEIGHT}") preserveAspectRatio="none">
                        <line x1="0" y1="37" x2="400" y2="37" class="grid-line" />
                        <line x1="0" y1="75" x2="400" y2="75" class="grid-line" />
                        <line x1="0" y1="112" x2="400" y2="112" class="grid-line" />
                        <path class="chart-line" d=path fill="none" stroke="#1f6feb" stroke-width="2" />
                    </svg>
                    <div class="chart-labels">
                        <span>{fmt_ts(first_ts)}</span>
                        <span>{format!("min {lo:.2} · max {hi:.2}")}</span>
                        <span>{fmt_ts(last_ts)}</span>
                    </div>
                }
                .into_any()
            }}
        </div>
    }
}
