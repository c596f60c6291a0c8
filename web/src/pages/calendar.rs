//! Calendar page – month navigation, events per day, add and delete.

use chrono::Datelike;
use leptos::ev::SubmitEvent;
use leptos::logging::{error, warn};
use leptos::prelude::*;

use hydrowatch_common::calendar::{
    events_by_date, next_month, prev_month, validate_new_event, CalendarEvent, MonthGrid,
};

use crate::browser::today;
use crate::components::calendar_grid::CalendarGrid;
use crate::state::use_app;

#[component]
pub fn CalendarPage() -> impl IntoView {
    let ctx = use_app();
    let now = today();
    let month = RwSignal::new((now.year(), now.month()));
    let (selected, set_selected) = signal(Option::<chrono::NaiveDate>::None);
    let (events, set_events) = signal(Vec::<CalendarEvent>::new());
    let (error_msg, set_error) = signal(Option::<String>::None);

    let title = RwSignal::new(String::new());
    let description = RwSignal::new(String::new());

    Effect::new(move |_| {
        let Some(client) = ctx.client() else { return };
        leptos::task::spawn_local(async move {
            match client.events().await {
                Ok(list) => set_events.set(list),
                Err(e) => {
                    warn!("Cannot load events: {e}");
                    set_error.set(Some(e.user_message()));
                }
            }
        });
    });

    let go_prev = move |_| month.update(|(y, m)| (*y, *m) = prev_month(*y, *m));
    let go_next = move |_| month.update(|(y, m)| (*y, *m) = next_month(*y, *m));

    let add_event = move |ev: SubmitEvent| {
        ev.prevent_default();
        let date = selected
            .get_untracked()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let new_event =
            match validate_new_event(&title.get_untracked(), &date, &description.get_untracked()) {
                Ok(e) => e,
                Err(e) => return set_error.set(Some(e.user_message())),
            };
        let Some(client) = ctx.client_untracked() else { return };
        leptos::task::spawn_local(async move {
            match client.create_event(&new_event).await {
                Ok(created) => {
                    set_events.update(|list| list.push(created));
                    title.set(String::new());
                    description.set(String::new());
                    set_error.set(None);
                }
                Err(e) => set_error.set(Some(e.user_message())),
            }
        });
    };

    let remove = move |id: String| {
        let Some(client) = ctx.client_untracked() else { return };
        leptos::task::spawn_local(async move {
            match client.delete_event(&id).await {
                Ok(()) => set_events.update(|list| list.retain(|e| e.id != id)),
                Err(e) => set_error.set(Some(e.user_message())),
            }
        });
    };

    let day_events = move || {
        let day = selected.get()?;
        Some(events.with(|list| {
            list.iter()
                .filter(|e| e.day() == Some(day))
                .cloned()
                .collect::<Vec<_>>()
        }))
    };

    view! {
        <div class="calendar-page">
            <div class="cal-nav">
                <button on:click=go_prev class="cal-nav-btn">"← Prev"</button>
                <button on:click=go_next class="cal-nav-btn">"Next →"</button>
            </div>
            {move || error_msg.get().map(|m| view! { <p class="banner banner-error">{m}</p> })}

            {move || {
                let (y, m) = month.get();
                match MonthGrid::new(y, m) {
                    Ok(grid) => view! {
                        <CalendarGrid
                            grid=grid
                            events=events.with(|list| events_by_date(list))
                            selected=selected
                            on_select=set_selected
                        />
                    }.into_any(),
                    Err(e) => {
                        error!("Cannot lay out {y}-{m}: {e}");
                        view! { <p class="error">{e.user_message()}</p> }.into_any()
                    }
                }
            }}

            {move || selected.get().map(|day| view! {
                <section class="day-panel">
                    <h2>{day.format("%A %-d %B %Y").to_string()}</h2>
                    <ul class="event-list">
                        {day_events().unwrap_or_default().into_iter().map(|e| {
                            let id = e.id.clone();
                            view! {
                                <li class="event-item">
                                    <strong>{e.title}</strong>
                                    {e.description.map(|d| view! { <p>{d}</p> })}
                                    <button class="btn btn-small btn-danger" on:click=move |_| remove(id.clone())>"Delete"</button>
                                </li>
                            }
                        }).collect_view()}
                    </ul>
                    <form class="edit-form" on:submit=add_event>
                        <label>"Title"<input type="text" required bind:value=title/></label>
                        <label>"Description"<textarea bind:value=description></textarea></label>
                        <button class="btn btn-primary" type="submit">"Add event"</button>
                    </form>
                </section>
            })}
        </div>
    }
}
