//! Mock implementations for testing

use super::traits::*;
use super::{ConversationRuntime, MemoryTokenStore};
use crate::links::LinkBuilder;
use crate::state_machine::Stage;
use crate::uploads::UploadTickets;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Build a runtime over the given state store with an in-memory token store
pub fn runtime_with<S: StateStore + 'static>(
    states: Arc<S>,
) -> (ConversationRuntime, Arc<S>, Arc<MemoryTokenStore>) {
    let tokens = Arc::new(MemoryTokenStore::default());
    let uploads = Arc::new(UploadTickets::new(
        tokens.clone(),
        LinkBuilder::new("http://localhost:8086"),
        Duration::from_secs(3600),
    ));
    let runtime = ConversationRuntime::new(states.clone(), uploads);
    (runtime, states, tokens)
}

/// State store whose records can never be read back
#[derive(Default)]
pub struct FailingStateStore {
    written: Mutex<HashMap<String, Stage>>,
}

impl FailingStateStore {
    pub fn last_set(&self, user_id: &str) -> Option<Stage> {
        self.written.lock().unwrap().get(user_id).cloned()
    }
}

#[async_trait]
impl StateStore for FailingStateStore {
    async fn get(&self, user_id: &str) -> Result<Option<Stage>, StoreError> {
        Err(StoreError::Corrupt {
            key: user_id.to_string(),
            reason: "unknown stage".to_string(),
        })
    }

    async fn set(&self, user_id: &str, stage: Stage) -> Result<(), StoreError> {
        self.written
            .lock()
            .unwrap()
            .insert(user_id.to_string(), stage);
        Ok(())
    }

    async fn delete(&self, user_id: &str) -> Result<(), StoreError> {
        self.written.lock().unwrap().remove(user_id);
        Ok(())
    }
}

/// Token store that is always down
pub struct UnavailableTokenStore;

#[async_trait]
impl TokenStore for UnavailableTokenStore {
    async fn get(&self, _token: &str) -> Result<Option<crate::uploads::UploadTicket>, StoreError> {
        Err(StoreError::Unavailable("token store offline".to_string()))
    }

    async fn set(
        &self,
        _token: &str,
        _ticket: crate::uploads::UploadTicket,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("token store offline".to_string()))
    }

    async fn delete(
        &self,
        _token: &str,
    ) -> Result<Option<crate::uploads::UploadTicket>, StoreError> {
        Err(StoreError::Unavailable("token store offline".to_string()))
    }

    async fn remove_issued_before(
        &self,
        _cutoff: chrono::DateTime<chrono::Utc>,
    ) -> Result<usize, StoreError> {
        Err(StoreError::Unavailable("token store offline".to_string()))
    }
}
