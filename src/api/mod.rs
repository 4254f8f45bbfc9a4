//! HTTP layer: admin endpoints, key verification and health probes

pub mod admin;
pub mod auth;
pub mod health;
pub mod router;
pub mod state;
pub mod types;

pub use router::create_router;
pub use state::AppState;
