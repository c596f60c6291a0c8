//! Client logic of the HydroWatch dashboard, free of any UI framework so it
//! can be tested natively and compiled to `wasm32` alike.

pub mod api;
pub mod auth;
pub mod calendar;
pub mod config;
pub mod error;
pub mod guard;
pub mod history;
pub mod model;
pub mod notification;
pub mod role;
pub mod sensor;
pub mod session;
pub mod socketio;
pub mod store;
mod wire;

pub use api::BackendClient;
pub use error::{Error, Result};
pub use role::Role;
pub use wire::value_to_f64;
