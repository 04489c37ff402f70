//! In-process stores
//!
//! Contents are lost on restart.

use super::traits::{StateStore, StoreError, TokenStore};
use crate::state_machine::Stage;
use crate::uploads::UploadTicket;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryStateStore {
    stages: RwLock<HashMap<String, Stage>>,
}

impl MemoryStateStore {
    #[allow(dead_code)] // Used in tests
    pub async fn len(&self) -> usize {
        self.stages.read().await.len()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, user_id: &str) -> Result<Option<Stage>, StoreError> {
        Ok(self.stages.read().await.get(user_id).cloned())
    }

    async fn set(&self, user_id: &str, stage: Stage) -> Result<(), StoreError> {
        self.stages.write().await.insert(user_id.to_string(), stage);
        Ok(())
    }

    async fn delete(&self, user_id: &str) -> Result<(), StoreError> {
        self.stages.write().await.remove(user_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryTokenStore {
    tickets: RwLock<HashMap<String, UploadTicket>>,
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self, token: &str) -> Result<Option<UploadTicket>, StoreError> {
        Ok(self.tickets.read().await.get(token).cloned())
    }

    async fn set(&self, token: &str, ticket: UploadTicket) -> Result<(), StoreError> {
        self.tickets.write().await.insert(token.to_string(), ticket);
        Ok(())
    }

    async fn delete(&self, token: &str) -> Result<Option<UploadTicket>, StoreError> {
        Ok(self.tickets.write().await.remove(token))
    }

    async fn remove_issued_before(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut tickets = self.tickets.write().await;
        let before = tickets.len();
        tickets.retain(|_, ticket| ticket.issued_at >= cutoff);
        Ok(before - tickets.len())
    }
}
