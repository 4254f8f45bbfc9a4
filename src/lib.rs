//! Tenant registry
//!
//! Multi-tenant data-access layer over spaces, projects, users and API keys:
//! - A storage-agnostic [`domain::Querier`] contract with PostgreSQL and
//!   in-memory adapters
//! - Cancellation and deadlines through [`domain::QueryContext`]
//! - API key issuance and verification
//! - An admin HTTP API and a migration CLI

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
