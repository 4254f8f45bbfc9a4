//! Shared handler state

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{DomainError, Querier, QueryContext};
use crate::infrastructure::api_key::ApiKeyService;
use crate::infrastructure::in_memory::InMemoryQuerier;
use crate::infrastructure::postgres::PostgresQuerier;

/// Backing store, kept alongside the trait object for readiness probes
#[derive(Clone)]
enum Store {
    Postgres(PostgresQuerier),
    InMemory,
}

#[derive(Clone)]
pub struct AppState {
    pub querier: Arc<dyn Querier>,
    pub api_keys: ApiKeyService<dyn Querier>,
    request_timeout: Duration,
    store: Store,
}

impl AppState {
    pub fn postgres(querier: PostgresQuerier, request_timeout: Duration) -> Self {
        let store = Store::Postgres(querier.clone());
        Self::build(Arc::new(querier), request_timeout, store)
    }

    pub fn in_memory(querier: InMemoryQuerier, request_timeout: Duration) -> Self {
        Self::build(Arc::new(querier), request_timeout, Store::InMemory)
    }

    fn build(querier: Arc<dyn Querier>, request_timeout: Duration, store: Store) -> Self {
        Self {
            api_keys: ApiKeyService::new(Arc::clone(&querier)),
            querier,
            request_timeout,
            store,
        }
    }

    /// Fresh context bounded by the request timeout
    pub fn context(&self) -> QueryContext {
        QueryContext::background().with_timeout(self.request_timeout)
    }

    pub fn store_name(&self) -> &'static str {
        match self.store {
            Store::Postgres(_) => "postgres",
            Store::InMemory => "in_memory",
        }
    }

    /// Check that the store can serve queries
    pub async fn ping(&self, ctx: &QueryContext) -> Result<(), DomainError> {
        match &self.store {
            Store::Postgres(querier) => querier.ping(ctx).await,
            Store::InMemory => ctx.check(),
        }
    }
}
