//! In-memory storage backend

mod querier;

pub use querier::InMemoryQuerier;
