//! Server entry-point – Axum + Leptos SSR.

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use anyhow::Context;
    use axum::Router;
    use leptos::config::get_configuration;
    use leptos::prelude::*;
    use leptos_axum::{generate_route_list, LeptosRoutes};
    use tower_http::services::ServeDir;

    use hydrowatch_common::config::{self, ClientConfig, CONF_ENV};
    use hydrowatch_web::app::{shell, App};

    // ── Tracing ──────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hydrowatch_web=info,hydrowatch_common=info,tower_http=info".into()),
        )
        .init();

    // ── Configuration ────────────────────────────────────────────────────
    let conf_path = ClientConfig::resolve_path(std::env::args().nth(1), std::env::var(CONF_ENV).ok());
    let client_config = config::load(&conf_path)
        .with_context(|| format!("Cannot load {}", conf_path.display()))?;
    tracing::info!(
        "Backend at {}, notifications every {}s (users {}s)",
        client_config.backend_url,
        client_config.notification_poll_secs,
        client_config.user_notification_poll_secs,
    );

    let conf = get_configuration(None).context("Cannot read Leptos options")?;
    let leptos_options = conf.leptos_options;
    let addr = leptos_options.site_addr;
    let site_root = leptos_options.site_root.clone();

    // ── Routes ───────────────────────────────────────────────────────────
    let routes = generate_route_list(App);

    let app = Router::new()
        .leptos_routes_with_context(
            &leptos_options,
            routes,
            move || provide_context(client_config.clone()),
            {
                let options = leptos_options.clone();
                move || shell(options.clone())
            },
        )
        // WASM bundle and stylesheet
        .nest_service("/pkg", ServeDir::new(format!("{site_root}/pkg")))
        .fallback(leptos_axum::file_and_error_handler(shell))
        .with_state(leptos_options);

    tracing::info!("HydroWatch listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Cannot bind {addr}"))?;
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

#[cfg(not(feature = "ssr"))]
fn main() {
    // This binary is only built with the `ssr` feature.
    // The WASM entry point is `lib::hydrate()`.
}
