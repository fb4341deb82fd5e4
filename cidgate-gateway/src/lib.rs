//! CidGate HTTP Gateway library
//!
//! Re-exports the application state, configuration, and router for
//! integration testing and embedding.

pub mod config;
pub mod content_api;
pub mod state;

pub use config::{ConfigError, GatewayConfig};
pub use content_api::routes;
pub use state::AppState;
