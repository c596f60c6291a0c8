//! Establishments CRUD (`/establishments`).

use leptos::ev::SubmitEvent;
use leptos::logging::warn;
use leptos::prelude::*;

use hydrowatch_common::model::{non_blank, Establishment, EstablishmentDraft};

use crate::state::use_app;

#[component]
pub fn EstablishmentsPage() -> impl IntoView {
    let ctx = use_app();
    let reload = RwSignal::new(0u32);
    let (rows, set_rows) = signal(Vec::<Establishment>::new());
    let (error, set_error) = signal(Option::<String>::None);

    let editing = RwSignal::new(Option::<String>::None);
    let name = RwSignal::new(String::new());
    let location = RwSignal::new(String::new());
    let description = RwSignal::new(String::new());
    let device = RwSignal::new(String::new());

    let reset_form = move || {
        editing.set(None);
        name.set(String::new());
        location.set(String::new());
        description.set(String::new());
        device.set(String::new());
    };

    Effect::new(move |_| {
        reload.track();
        let Some(client) = ctx.client() else { return };
        leptos::task::spawn_local(async move {
            match client.establishments().await {
                Ok(list) => set_rows.set(list),
                Err(e) => {
                    warn!("Cannot load establishments: {e}");
                    set_error.set(Some(e.user_message()));
                }
            }
        });
    });

    let start_edit = move |e: Establishment| {
        let draft = EstablishmentDraft::from_establishment(&e);
        editing.set(Some(e.id));
        name.set(draft.name);
        location.set(draft.location);
        description.set(draft.description.unwrap_or_default());
        device.set(draft.device_id.unwrap_or_default());
    };

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let draft = EstablishmentDraft {
            name: name.get_untracked().trim().to_string(),
            location: location.get_untracked().trim().to_string(),
            description: non_blank(&description.get_untracked()),
            device_id: non_blank(&device.get_untracked()),
        };
        if let Err(e) = draft.validate() {
            return set_error.set(Some(e.user_message()));
        }
        let Some(client) = ctx.client_untracked() else { return };
        let id = editing.get_untracked();
        leptos::task::spawn_local(async move {
            let result = match id.as_deref() {
                Some(id) => client.update_establishment(id, &draft).await,
                None => client.create_establishment(&draft).await,
            };
            match result {
                Ok(_) => {
                    set_error.set(None);
                    reset_form();
                    reload.update(|n| *n += 1);
                }
                Err(e) => set_error.set(Some(e.user_message())),
            }
        });
    };

    let remove = move |id: String| {
        let Some(client) = ctx.client_untracked() else { return };
        leptos::task::spawn_local(async move {
            match client.delete_establishment(&id).await {
                Ok(()) => set_rows.update(|rows| rows.retain(|e| e.id != id)),
                Err(e) => set_error.set(Some(e.user_message())),
            }
        });
    };

    view! {
        <div class="establishments-page">
            <header class="page-header">
                <h1>"Establishments"</h1>
                <span class="subtitle">{move || format!("{} sites", rows.with(Vec::len))}</span>
            </header>
            {move || error.get().map(|m| view! { <p class="banner banner-error">{m}</p> })}

            <div class="card-grid">
                {move || rows.get().into_iter().map(|e| {
                    let id = e.id.clone();
                    let row = e.clone();
                    view! {
                        <div class="site-card">
                            <h3>{e.name}</h3>
                            <p class="site-location">{e.location}</p>
                            {e.description.map(|d| view! { <p class="site-description">{d}</p> })}
                            {e.device_id.map(|d| view! { <p class="site-device">"Device " {d}</p> })}
                            <div class="row-actions">
                                <button class="btn btn-small" on:click=move |_| start_edit(row.clone())>"Edit"</button>
                                <button class="btn btn-small btn-danger" on:click=move |_| remove(id.clone())>"Delete"</button>
                            </div>
                        </div>
                    }
                }).collect_view()}
            </div>

            <form class="edit-form" on:submit=submit>
                <h2>{move || if editing.get().is_some() { "Edit establishment" } else { "New establishment" }}</h2>
                <label>"Name"<input type="text" required bind:value=name/></label>
                <label>"Location"<input type="text" required bind:value=location/></label>
                <label>"Description"<textarea bind:value=description></textarea></label>
                <label>"Device ID"<input type="text" bind:value=device/></label>
                <div class="form-actions">
                    <button class="btn btn-primary" type="submit">"Save"</button>
                    <button class="btn" type="button" on:click=move |_| reset_form()>"Cancel"</button>
                </div>
            </form>
        </div>
    }
}
