//! HydroWatch Web – Leptos dashboard for water-quality monitoring.

pub mod app;
pub mod browser;
pub mod components;
pub mod live;
pub mod pages;
pub mod state;
pub mod storage;

/// Entry-point called from the WASM bundle to hydrate the server-rendered HTML.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    leptos::mount::hydrate_body(app::App);
}
