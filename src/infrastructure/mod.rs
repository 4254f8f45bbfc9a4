//! Infrastructure layer - storage adapters and supporting services

pub mod api_key;
pub mod in_memory;
pub mod logging;
pub mod postgres;
