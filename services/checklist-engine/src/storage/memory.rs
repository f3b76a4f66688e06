use super::ChecklistStore;
use crate::errors::Result;
use async_trait::async_trait;
use checklist_core::{ChecklistItem, ItemStatus, UserId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

type RowKey = (UserId, String);

/// Process-local store for development and tests. Same contract as the
/// Postgres store; contents are lost on restart.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    rows: Arc<RwLock<HashMap<RowKey, ChecklistItem>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl ChecklistStore for InMemoryStore {
    async fn insert_checklist(&self, items: &[ChecklistItem]) -> Result<u64> {
        let mut rows = self.rows.write().await;
        let mut inserted = 0;

        for item in items {
            let key = (item.user_id.clone(), item.control_id.clone());
            if !rows.contains_key(&key) {
                rows.insert(key, item.clone());
                inserted += 1;
            }
        }

        debug!("Inserted {} of {} checklist rows in memory", inserted, items.len());
        Ok(inserted)
    }

    async fn select_checklist(&self, user_id: &UserId) -> Result<Vec<ChecklistItem>> {
        let rows = self.rows.read().await;

        let mut items: Vec<ChecklistItem> = rows
            .values()
            .filter(|item| &item.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            a.standard
                .cmp(&b.standard)
                .then_with(|| a.control_id.cmp(&b.control_id))
        });

        Ok(items)
    }

    async fn update_item(
        &self,
        user_id: &UserId,
        control_id: &str,
        status: ItemStatus,
        notes: &str,
    ) -> Result<Option<ChecklistItem>> {
        let mut rows = self.rows.write().await;

        let key = (user_id.clone(), control_id.to_string());
        Ok(rows.get_mut(&key).map(|item| {
            item.status = status;
            item.notes = notes.to_string();
            item.clone()
        }))
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
