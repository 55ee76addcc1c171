// Content repository access
// The agent consumes this contract; it does not own the backing store.

pub mod memory;

pub use memory::MemoryRepository;

use crate::errors::RepositoryError;
use crate::models::Item;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Repository accessor contract consumed by the schedule runner
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Resolve an absolute item path to an item, or `None` if absent
    async fn resolve(&self, path: &str) -> Result<Option<Item>, RepositoryError>;

    /// All descendants of an item, in the store's own traversal order
    async fn descendants_of(&self, id: Uuid) -> Result<Vec<Item>, RepositoryError>;

    /// Delete an item (and any subtree beneath it)
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// Write a single field value back to an item
    async fn update_field(
        &self,
        id: Uuid,
        name: &str,
        value: Value,
    ) -> Result<(), RepositoryError>;
}

/// Maps database names to repository handles.
///
/// An unknown name is not an error at sweep time; the runner degenerates to
/// "no schedules found".
#[derive(Default)]
pub struct RepositoryRegistry {
    databases: HashMap<String, Arc<dyn ItemRepository>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, repository: Arc<dyn ItemRepository>) {
        self.databases.insert(name.into(), repository);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ItemRepository>> {
        self.databases.get(name).cloned()
    }
}
