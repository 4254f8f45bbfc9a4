//! Issuing and authenticating API keys

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::{
    ApiKey, ApiKeyRepository, CreateApiKeyParams, DomainError, ProjectId, QueryContext,
};

use super::generator::{verify_secret, ApiKeyGenerator};

/// A stored key together with its plaintext secret
#[derive(Debug)]
pub struct IssuedApiKey {
    pub api_key: ApiKey,
    /// Only available at issuance
    pub secret: String,
}

/// Key issuance and authentication over any [`ApiKeyRepository`]
///
/// `R` may be unsized so the service can share an `Arc<dyn Querier>`.
#[derive(Debug)]
pub struct ApiKeyService<R: ?Sized> {
    repository: Arc<R>,
    generator: ApiKeyGenerator,
}

impl<R: ?Sized> Clone for ApiKeyService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            generator: self.generator.clone(),
        }
    }
}

impl<R> ApiKeyService<R>
where
    R: ApiKeyRepository + ?Sized,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            generator: ApiKeyGenerator::live(),
        }
    }

    pub fn with_generator(mut self, generator: ApiKeyGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Generate and store a key for a project
    pub async fn issue(
        &self,
        ctx: &QueryContext,
        project_id: ProjectId,
        name: impl Into<String>,
    ) -> Result<IssuedApiKey, DomainError> {
        let generated = self.generator.generate();

        let api_key = self
            .repository
            .create_api_key(
                ctx,
                CreateApiKeyParams {
                    project_id,
                    name: name.into(),
                    key_prefix: generated.key_prefix,
                    key_hash: generated.key_hash,
                },
            )
            .await?;

        info!(id = %api_key.id, project_id = %project_id, prefix = %api_key.key_prefix, "API key issued");

        Ok(IssuedApiKey {
            api_key,
            secret: generated.secret,
        })
    }

    /// Resolve a presented secret to its key and record the usage
    ///
    /// Returns `Ok(None)` for malformed, unknown or mismatching secrets.
    pub async fn authenticate(
        &self,
        ctx: &QueryContext,
        secret: &str,
    ) -> Result<Option<ApiKey>, DomainError> {
        let Some(prefix) = self.generator.lookup_prefix(secret) else {
            debug!("Rejected API key with unexpected format");
            return Ok(None);
        };

        let api_key = match self.repository.get_api_key_by_prefix(ctx, prefix).await {
            Ok(key) => key,
            Err(e) if e.is_not_found() => {
                debug!(prefix, "No API key with prefix");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        if !verify_secret(secret, &api_key.key_hash) {
            debug!(prefix, "API key hash mismatch");
            return Ok(None);
        }

        match self.repository.update_api_key_last_used(ctx, api_key.id).await {
            Ok(()) => Ok(Some(api_key)),
            Err(e) if e.is_not_found() => {
                debug!(id = %api_key.id, "API key deleted during verification");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
