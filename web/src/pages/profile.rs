//! Profile (`/profile`): who is signed in and recent session activity.

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use hydrowatch_common::guard::LOGIN;
use hydrowatch_common::session::{SessionEvent, SessionEventKind};

use crate::storage::session_store;
use crate::state::use_app;

#[component]
pub fn ProfilePage() -> impl IntoView {
    let ctx = use_app();
    let navigate = use_navigate();
    let (history, set_history) = signal(Vec::<SessionEvent>::new());

    // localStorage is only readable after hydration.
    Effect::new(move |_| {
        ctx.user.track();
        let mut events = session_store().session_history();
        events.reverse();
        set_history.set(events);
    });

    let sign_out = move |_| {
        ctx.sign_out();
        navigate(LOGIN, Default::default());
    };

    view! {
        <div class="profile-page">
            <header class="page-header"><h1>"Profile"</h1></header>
            {move || ctx.user.get().map(|u| view! {
                <dl class="profile-details">
                    <dt>"Username"</dt><dd>{u.username.clone()}</dd>
                    <dt>"Email"</dt><dd>{u.email.clone()}</dd>
                    <dt>"Role"</dt><dd>{u.role.as_str()}</dd>
                    <dt>"Verified"</dt><dd>{if u.is_verified { "Yes" } else { "Pending approval" }}</dd>
                    {u.establishment_id.clone().map(|e| view! { <dt>"Establishment"</dt><dd>{e}</dd> })}
                    {u.device_id.clone().map(|d| view! { <dt>"Device"</dt><dd>{d}</dd> })}
                </dl>
            })}
            <button class="btn btn-danger" on:click=sign_out>"Sign out"</button>

            <h2>"Session history"</h2>
            <ul class="session-history">
                {move || history.get().into_iter().map(|e| {
                    let what = match e.event {
                        SessionEventKind::Login => "Signed in",
                        SessionEventKind::Logout => "Signed out",
                    };
                    view! {
                        <li>
                            <span class="session-when">{e.at.format("%Y-%m-%d %H:%M").to_string()}</span>
                            " "{what}
                            {e.user.map(|u| format!(" as {u}"))}
                        </li>
                    }
                }).collect_view()}
            </ul>
        </div>
    }
}
