//! The complete data-access contract
//!
//! [`Querier`] names every operation over spaces, projects, users and API keys.
//! It is implemented automatically for any type implementing the four entity
//! repositories, so storage adapters can be swapped without touching callers.

use crate::domain::api_key::ApiKeyRepository;
use crate::domain::project::ProjectRepository;
use crate::domain::space::SpaceRepository;
use crate::domain::user::UserRepository;

/// Full data-access contract over all entities
pub trait Querier:
    SpaceRepository + ProjectRepository + UserRepository + ApiKeyRepository
{
}

impl<T> Querier for T where
    T: SpaceRepository + ProjectRepository + UserRepository + ApiKeyRepository
{
}

/// Compile-time check that an adapter satisfies the full contract.
///
/// ```ignore
/// assert_querier!(PostgresQuerier);
/// ```
macro_rules! assert_querier {
    ($adapter:ty) => {
        const _: fn() = || {
            fn implements_querier<T: $crate::domain::Querier + ?Sized>() {}
            implements_querier::<$adapter>();
        };
    };
}

pub(crate) use assert_querier;
