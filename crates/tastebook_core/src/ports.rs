//! crates/tastebook_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's storage
//! backends. These traits form the boundary of the core: pages and services
//! are written against them, and concrete adapters (remote REST store,
//! offline directory store) are injected at startup.

use async_trait::async_trait;

use crate::domain::{Recipe, RecipeDraft, User};

//=========================================================================================
// Generic Store Error and Result Types
//=========================================================================================

/// A generic error type for all store operations.
/// This abstracts away the specific failures of external backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Network failure: {0}")]
    Network(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

//=========================================================================================
// Store Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Fetches the full collection. A transport failure is an error, never a
    /// silent empty list; callers decide their own fallback policy.
    async fn list_all(&self) -> StoreResult<Vec<Recipe>>;

    /// Fails with `StoreError::NotFound` when the backend has no record.
    async fn get_by_id(&self, id: &str) -> StoreResult<Recipe>;

    /// Normalizes the draft, persists it, and returns the created record
    /// with its store-assigned id.
    async fn create(&self, draft: RecipeDraft) -> StoreResult<Recipe>;

    /// Full-record replace, not a partial merge. The draft is normalized the
    /// same way as on create.
    async fn update(&self, id: &str, draft: RecipeDraft) -> StoreResult<Recipe>;

    /// Fails with `StoreError::NotFound` when the record is absent.
    async fn delete(&self, id: &str) -> StoreResult<()>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list_all(&self) -> StoreResult<Vec<User>>;

    async fn get_by_id(&self, id: &str) -> StoreResult<User>;

    /// Case-folded lookup; `NotFound` when no user carries the address.
    async fn get_by_email(&self, email: &str) -> StoreResult<User>;

    /// Persists a new user and returns it with its store-assigned id.
    async fn create(&self, user: User) -> StoreResult<User>;

    /// Full-record replace keyed on `user.id`.
    async fn update(&self, user: User) -> StoreResult<User>;
}
