//! "Access restricted" dialog for users the administrator has not verified.

use leptos::logging::warn;
use leptos::prelude::*;

use hydrowatch_common::notification::submit_access_request;

use crate::state::use_app;
use crate::storage::session_store;

#[derive(Debug, Clone, PartialEq)]
enum RequestState {
    Idle,
    Sending,
    Sent,
    Failed(String),
}

/// Opens once per navigation when the guard flagged it.
#[component]
pub fn AccessModal() -> impl IntoView {
    let ctx = use_app();
    let (open, set_open) = signal(false);
    let (state, set_state) = signal(RequestState::Idle);

    Effect::new(move |_| {
        if session_store().take_access_modal() {
            set_open.set(true);
        }
    });

    // Approval arrives through the notification feed while the dialog is up.
    Effect::new(move |_| {
        if ctx.user.with(|u| u.as_ref().is_some_and(|u| u.is_verified)) {
            set_open.set(false);
        }
    });

    let request = move |_| {
        let Some(client) = ctx.client_untracked() else {
            set_state.set(RequestState::Failed("Configuration not loaded yet.".into()));
            return;
        };
        let Some(user) = ctx.user.get_untracked() else {
            set_state.set(RequestState::Failed("You are not signed in.".into()));
            return;
        };
        set_state.set(RequestState::Sending);
        leptos::task::spawn_local(async move {
            match submit_access_request(&client, &session_store(), &user).await {
                Ok(pending) => {
                    ctx.feed.update(|f| f.push_front(pending));
                    set_state.set(RequestState::Sent);
                }
                Err(e) => {
                    warn!("Access request failed: {e}");
                    set_state.set(RequestState::Failed(e.user_message()));
                }
            }
        });
    };

    move || {
        open.get().then(|| {
            view! {
                <div class="modal-backdrop">
                    <div class="modal" role="dialog">
                        <h3>"Access restricted"</h3>
                        <p>
                            "Your account has not been verified yet. The readings on your home "
                            "page stay hidden until an administrator grants access."
                        </p>
                        {move || match state.get() {
                            RequestState::Idle => view! {
                                <button class="btn btn-primary" on:click=request>"Request access"</button>
                            }.into_any(),
                            RequestState::Sending => view! {
                                <button class="btn btn-primary" disabled>"Sending…"</button>
                            }.into_any(),
                            RequestState::Sent => view! {
                                <p class="banner banner-ok">
                                    "Request sent. You will be notified once it is reviewed."
                                </p>
                            }.into_any(),
                            RequestState::Failed(msg) => view! {
                                <p class="banner banner-error">{msg}</p>
                                <button class="btn btn-primary" on:click=request>"Try again"</button>
                            }.into_any(),
                        }}
                        <button class="btn btn-link" on:click=move |_| set_open.set(false)>"Close"</button>
                    </div>
                </div>
            }
        })
    }
}
