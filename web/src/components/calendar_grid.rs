//! Monthly calendar grid component with event markers.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use leptos::prelude::*;

use hydrowatch_common::calendar::{CalendarEvent, MonthGrid};

/// Props for the calendar grid.
#[component]
pub fn CalendarGrid(
    /// Month being displayed.
    grid: MonthGrid,
    /// Events keyed by day (only days with events are present).
    events: BTreeMap<NaiveDate, Vec<CalendarEvent>>,
    /// Currently selected day.
    selected: ReadSignal<Option<NaiveDate>>,
    on_select: WriteSignal<Option<NaiveDate>>,
) -> impl IntoView {
    let cells: Vec<_> = (1..=grid.days)
        .filter_map(|day_num| grid.date(day_num).map(|d| (day_num, d)))
        .map(|(day_num, date)| {
            let count = events.get(&date).map(Vec::len).unwrap_or(0);
            let class = move || {
                let mut class = String::from("cal-cell");
                if count > 0 {
                    class.push_str(" has-data");
                }
                if selected.get() == Some(date) {
                    class.push_str(" highlighted");
                }
                class
            };

            view! {
                <button class=class on:click=move |_| on_select.set(Some(date))>
                    <span class="cal-day-num">{day_num}</span>
                    {(count > 0).then(|| view! {
                        <span class="cal-day-stats">
                            {count}{if count == 1 { " event" } else { " events" }}
                        </span>
                    })}
                </button>
            }
        })
        .collect();

    // Empty cells for padding before the 1st
    let padding: Vec<_> = (0..grid.leading_blanks)
        .map(|_| view! { <div class="cal-cell empty"></div> })
        .collect();

    view! {
        <div class="calendar">
            <div class="cal-header">
                <h2>{grid.label()}</h2>
            </div>
            <div class="cal-weekdays">
                <span>"Mon"</span><span>"Tue"</span><span>"Wed"</span>
                <span>"Thu"</span><span>"Fri"</span><span>"Sat"</span><span>"Sun"</span>
            </div>
            <div class="cal-grid">
                {padding}
                {cells}
            </div>
        </div>
    }
}
