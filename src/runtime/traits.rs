//! Trait abstractions for per-key state
//!
//! These traits keep the runtime and the upload endpoints independent of
//! where stages and tokens live, and enable testing with failing stores.

use crate::state_machine::Stage;
use crate::uploads::UploadTicket;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
#[allow(dead_code)] // In-memory stores never fail; other backends and test mocks do
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("unreadable record for {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

/// Storage for each user's dialog stage
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Get a user's stage; `None` if the user has never been seen
    async fn get(&self, user_id: &str) -> Result<Option<Stage>, StoreError>;

    /// Replace a user's stage
    async fn set(&self, user_id: &str, stage: Stage) -> Result<(), StoreError>;

    /// Forget a user
    #[allow(dead_code)] // API completeness
    async fn delete(&self, user_id: &str) -> Result<(), StoreError>;
}

/// Storage for issued upload tokens
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self, token: &str) -> Result<Option<UploadTicket>, StoreError>;

    async fn set(&self, token: &str, ticket: UploadTicket) -> Result<(), StoreError>;

    /// Remove a token, returning its ticket if it was present
    async fn delete(&self, token: &str) -> Result<Option<UploadTicket>, StoreError>;

    /// Remove every ticket issued before `cutoff`, returning the count
    async fn remove_issued_before(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: StateStore + ?Sized> StateStore for Arc<T> {
    async fn get(&self, user_id: &str) -> Result<Option<Stage>, StoreError> {
        (**self).get(user_id).await
    }

    async fn set(&self, user_id: &str, stage: Stage) -> Result<(), StoreError> {
        (**self).set(user_id, stage).await
    }

    async fn delete(&self, user_id: &str) -> Result<(), StoreError> {
        (**self).delete(user_id).await
    }
}

#[async_trait]
impl<T: TokenStore + ?Sized> TokenStore for Arc<T> {
    async fn get(&self, token: &str) -> Result<Option<UploadTicket>, StoreError> {
        (**self).get(token).await
    }

    async fn set(&self, token: &str, ticket: UploadTicket) -> Result<(), StoreError> {
        (**self).set(token, ticket).await
    }

    async fn delete(&self, token: &str) -> Result<Option<UploadTicket>, StoreError> {
        (**self).delete(token).await
    }

    async fn remove_issued_before(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        (**self).remove_issued_before(cutoff).await
    }
}
