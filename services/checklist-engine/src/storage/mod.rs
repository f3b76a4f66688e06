pub mod memory;
pub mod postgres;

use crate::errors::Result;
use async_trait::async_trait;
use checklist_core::{ChecklistItem, ItemStatus, UserId};

pub use memory::InMemoryStore;
pub use postgres::Database;

/// Persistent checklist rows keyed by (user id, control id).
#[async_trait]
pub trait ChecklistStore: Send + Sync {
    /// Insert generated items. Rows that already exist for the same user and
    /// control are left untouched. Returns the number of rows inserted.
    async fn insert_checklist(&self, items: &[ChecklistItem]) -> Result<u64>;

    /// All rows for a user, ordered by standard then control id.
    async fn select_checklist(&self, user_id: &UserId) -> Result<Vec<ChecklistItem>>;

    /// Overwrite status and notes of one row. `None` when the row does not exist.
    async fn update_item(
        &self,
        user_id: &UserId,
        control_id: &str,
        status: ItemStatus,
        notes: &str,
    ) -> Result<Option<ChecklistItem>>;

    async fn health_check(&self) -> Result<()>;

    fn backend_name(&self) -> &'static str;
}
