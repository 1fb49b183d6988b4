//! # Postboard API Server
//!
//! Actix-web application: configuration, telemetry, middleware and the
//! HTTP handlers. `main.rs` wires these together.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod state;
pub mod telemetry;

pub use config::AppConfig;
pub use state::AppState;
