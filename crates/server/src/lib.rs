//! HTTP surface of the project hub: axum router, JWT middleware, handlers,
//! error mapping and OpenAPI document.

pub mod errors;
pub mod openapi;
pub mod routes;
pub mod startup;

pub use startup::{build_app, build_state, run};
