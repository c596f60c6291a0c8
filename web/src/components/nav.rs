//! Top navigation bar component.

use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;

use hydrowatch_common::guard::visible_routes;

use crate::state::use_app;

fn link_label(path: &str) -> &'static str {
    match path {
        "/dashboard" => "Dashboard",
        "/userDB" | "/adminDB" | "/superadminDB" => "Home",
        "/accountmanagement" => "Accounts",
        "/establishments" => "Establishments",
        "/history" => "History",
        "/calendar" => "Calendar",
        "/notifications" => "Notifications",
        "/profile" => "Profile",
        _ => "?",
    }
}

/// Site-wide navigation bar: the links the signed-in role may open, the
/// unread badge and sign-out.
#[component]
pub fn Nav() -> impl IntoView {
    let ctx = use_app();
    let navigate = use_navigate();

    let role = move || ctx.user.with(|u| u.as_ref().map(|u| u.role));
    let unread = move || ctx.feed.with(|f| f.unread_count());

    let sign_out = move |_| {
        ctx.sign_out();
        navigate("/login", Default::default());
    };

    view! {
        <nav class="nav-bar">
            <div class="nav-brand">
                <A href="/dashboard" attr:class="nav-logo">"💧 HydroWatch"</A>
            </div>
            {move || match role() {
                None => view! {
                    <div class="nav-links">
                        <A href="/login" attr:class="nav-link">"Sign in"</A>
                        <A href="/signup" attr:class="nav-link">"Sign up"</A>
                    </div>
                }
                .into_any(),
                Some(role) => {
                    let links = visible_routes(role)
                        .map(|path| {
                            let badge = (path == "/notifications").then(|| {
                                view! {
                                    <Show when=move || { unread() > 0 }>
                                        <span class="badge">{unread}</span>
                                    </Show>
                                }
                            });
                            view! {
                                <A href=path attr:class="nav-link">{link_label(path)}{badge}</A>
                            }
                        })
                        .collect_view();
                    view! {
                        <div class="nav-links">{links}</div>
                        <div class="nav-user">
                            <span class="nav-role">{role.as_str()}</span>
                            <button class="btn btn-link" on:click=sign_out.clone()>"Sign out"</button>
                        </div>
                    }
                    .into_any()
                }
            }}
        </nav>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydrowatch_common::guard::ROUTES;

    #[test]
    fn test_every_guarded_route_has_a_label() {
        for rule in ROUTES {
            assert_ne!(link_label(rule.path), "?", "{} has no nav label", rule.path);
        }
    }
}
