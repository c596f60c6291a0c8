//! Root Leptos application component with routing.

use leptos::logging::error;
use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::{Redirect, Route, Router, Routes};
use leptos_router::StaticSegment;

use hydrowatch_common::config::ClientConfig;

use crate::components::nav::Nav;
use crate::components::protected::Protected;
use crate::pages::{
    accounts::AccountsPage, admin_home::AdminHome, auth::ForgotPasswordPage, auth::LoginPage,
    auth::SignupPage, auth::VerifyPage, calendar::CalendarPage, dashboard::DashboardPage,
    establishments::EstablishmentsPage, history::HistoryPage, notifications::NotificationsPage,
    profile::ProfilePage, super_admin_home::SuperAdminHome, user_home::UserHome,
};
use crate::state::{start_background_tasks, AppContext};

// ─── Server function ─────────────────────────────────────────────────────────

/// Backend location and polling periods, as loaded from `hydrowatch.conf`.
#[server(GetClientConfig, "/api")]
pub async fn get_client_config() -> Result<ClientConfig, ServerFnError> {
    use_context::<ClientConfig>().ok_or_else(|| ServerFnError::new("Missing client configuration"))
}

// ─── Shell ───────────────────────────────────────────────────────────────────

/// HTML document rendered around the app on the server.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// The root `<App/>` component.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();
    let ctx = AppContext::provide();

    Effect::new(move |_| {
        leptos::task::spawn_local(async move {
            match get_client_config().await {
                Ok(config) => ctx.config.set(Some(config)),
                Err(e) => error!("Cannot load client configuration: {e}"),
            }
        });
    });
    start_background_tasks(ctx);

    view! {
        <Stylesheet id="leptos" href="/pkg/hydrowatch-web.css"/>
        <Title text="HydroWatch – Water Quality Monitor"/>
        <Meta name="description" content="Real-time water quality monitoring dashboard"/>

        <Router>
            <Nav/>
            <main class="main-content">
                <Routes fallback=|| view! { <p class="error">"Page not found."</p> }>
                    <Route path=StaticSegment("") view=|| view! { <Redirect path="/dashboard"/> }/>
                    <Route path=StaticSegment("login") view=LoginPage/>
                    <Route path=StaticSegment("signup") view=SignupPage/>
                    <Route path=StaticSegment("verify") view=VerifyPage/>
                    <Route path=StaticSegment("forgot-password") view=ForgotPasswordPage/>

                    <Route path=StaticSegment("dashboard") view=|| view! { <Protected><DashboardPage/></Protected> }/>
                    <Route path=StaticSegment("userDB") view=|| view! { <Protected><UserHome/></Protected> }/>
                    <Route path=StaticSegment("adminDB") view=|| view! { <Protected><AdminHome/></Protected> }/>
                    <Route path=StaticSegment("superadminDB") view=|| view! { <Protected><SuperAdminHome/></Protected> }/>
                    <Route path=StaticSegment("accountmanagement") view=|| view! { <Protected><AccountsPage/></Protected> }/>
                    <Route path=StaticSegment("establishments") view=|| view! { <Protected><EstablishmentsPage/></Protected> }/>
                    <Route path=StaticSegment("history") view=|| view! { <Protected><HistoryPage/></Protected> }/>
                    <Route path=StaticSegment("calendar") view=|| view! { <Protected><CalendarPage/></Protected> }/>
                    <Route path=StaticSegment("notifications") view=|| view! { <Protected><NotificationsPage/></Protected> }/>
                    <Route path=StaticSegment("profile") view=|| view! { <Protected><ProfilePage/></Protected> }/>
                </Routes>
            </main>
        </Router>
    }
}
