//! Route guard wrapper.

use leptos::logging::error;
use leptos::prelude::*;
use leptos_router::components::Redirect;
use leptos_router::hooks::use_location;

use hydrowatch_common::guard::{self, apply_guard, Decision};

use crate::storage::session_store;

/// Renders `children` only when the stored role may open the current path.
///
/// The role lives in `localStorage`, which the server cannot see, so the
/// decision is taken after hydration.  Until then a neutral placeholder is
/// shown.
#[component]
pub fn Protected(children: ChildrenFn) -> impl IntoView {
    let location = use_location();
    let (mounted, set_mounted) = signal(false);
    Effect::new(move |_| set_mounted.set(true));

    move || {
        if !mounted.get() {
            return view! { <div class="page-loading">"Loading…"</div> }.into_any();
        }
        let path = location.pathname.get();
        match apply_guard(&session_store(), &path) {
            Ok(g) => match g.decision {
                Decision::Render => children().into_any(),
                Decision::Redirect(to) => view! { <Redirect path=to/> }.into_any(),
            },
            Err(e) => {
                error!("Route guard failed on {path}: {e}");
                view! { <Redirect path=guard::LOGIN/> }.into_any()
            }
        }
    }
}
