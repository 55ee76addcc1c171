// In-memory item repository
// Backs the agent binary (seeded from a JSON tree) and the test suites.

use crate::errors::RepositoryError;
use crate::models::{Item, ItemKind};
use crate::repository::ItemRepository;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

struct StoredItem {
    item: Item,
    parent: Option<Uuid>,
    children: Vec<Uuid>,
}

/// Tree-shaped in-memory item store.
///
/// Traversal order is insertion order, but callers must not rely on that;
/// the repository contract leaves ordering to the implementation.
#[derive(Default)]
pub struct MemoryRepository {
    items: RwLock<HashMap<Uuid, StoredItem>>,
}

/// One node of a JSON seed tree
#[derive(Debug, Deserialize)]
pub struct SeedNode {
    pub name: String,
    pub kind: ItemKind,
    #[serde(default)]
    pub fields: HashMap<String, Value>,
    #[serde(default)]
    pub children: Vec<SeedNode>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository from a JSON array of seed trees
    pub fn from_json(data: &str) -> Result<Self, RepositoryError> {
        let roots: Vec<SeedNode> =
            serde_json::from_str(data).map_err(|e| RepositoryError::InvalidSeed(e.to_string()))?;

        let mut items = HashMap::new();
        for root in roots {
            Self::seed_node(&mut items, None, "", root);
        }
        Ok(Self {
            items: RwLock::new(items),
        })
    }

    fn seed_node(
        items: &mut HashMap<Uuid, StoredItem>,
        parent: Option<Uuid>,
        parent_path: &str,
        node: SeedNode,
    ) {
        let path = format!("{}/{}", parent_path, node.name);
        let mut item = Item::new(node.name, node.kind, path.clone());
        item.fields = node.fields;
        let id = item.id;

        if let Some(parent_id) = parent {
            if let Some(stored) = items.get_mut(&parent_id) {
                stored.children.push(id);
            }
        }
        items.insert(
            id,
            StoredItem {
                item,
                parent,
                children: Vec::new(),
            },
        );

        for child in node.children {
            Self::seed_node(items, Some(id), &path, child);
        }
    }

    /// Insert an item under an optional parent, returning its id
    pub async fn insert(
        &self,
        parent: Option<Uuid>,
        item: Item,
    ) -> Result<Uuid, RepositoryError> {
        let mut items = self.items.write().await;
        if let Some(parent_id) = parent {
            let stored = items
                .get_mut(&parent_id)
                .ok_or_else(|| RepositoryError::NotFound(parent_id.to_string()))?;
            stored.children.push(item.id);
        }
        let id = item.id;
        items.insert(
            id,
            StoredItem {
                item,
                parent,
                children: Vec::new(),
            },
        );
        Ok(id)
    }

    /// Fetch a single item by id
    pub async fn item(&self, id: Uuid) -> Option<Item> {
        self.items.read().await.get(&id).map(|s| s.item.clone())
    }

    pub async fn contains(&self, id: Uuid) -> bool {
        self.items.read().await.contains_key(&id)
    }

    fn collect_descendants(items: &HashMap<Uuid, StoredItem>, id: Uuid, out: &mut Vec<Item>) {
        if let Some(stored) = items.get(&id) {
            for child_id in &stored.children {
                if let Some(child) = items.get(child_id) {
                    out.push(child.item.clone());
                    Self::collect_descendants(items, *child_id, out);
                }
            }
        }
    }

    fn collect_subtree_ids(items: &HashMap<Uuid, StoredItem>, id: Uuid, out: &mut Vec<Uuid>) {
        out.push(id);
        if let Some(stored) = items.get(&id) {
            for child_id in &stored.children {
                Self::collect_subtree_ids(items, *child_id, out);
            }
        }
    }
}

#[async_trait]
impl ItemRepository for MemoryRepository {
    async fn resolve(&self, path: &str) -> Result<Option<Item>, RepositoryError> {
        let items = self.items.read().await;
        Ok(items
            .values()
            .find(|stored| stored.item.path == path)
            .map(|stored| stored.item.clone()))
    }

    async fn descendants_of(&self, id: Uuid) -> Result<Vec<Item>, RepositoryError> {
        let items = self.items.read().await;
        if !items.contains_key(&id) {
            return Err(RepositoryError::NotFound(id.to_string()));
        }
        let mut out = Vec::new();
        Self::collect_descendants(&items, id, &mut out);
        Ok(out)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut items = self.items.write().await;
        if !items.contains_key(&id) {
            return Err(RepositoryError::NotFound(id.to_string()));
        }

        let mut doomed = Vec::new();
        Self::collect_subtree_ids(&items, id, &mut doomed);

        let parent = items.get(&id).and_then(|stored| stored.parent);
        if let Some(parent_id) = parent {
            if let Some(stored) = items.get_mut(&parent_id) {
                stored.children.retain(|child| *child != id);
            }
        }
        for victim in doomed {
            items.remove(&victim);
        }
        Ok(())
    }

    async fn update_field(
        &self,
        id: Uuid,
        name: &str,
        value: Value,
    ) -> Result<(), RepositoryError> {
        let mut items = self.items.write().await;
        let stored = items
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        stored.item.fields.insert(name.to_string(), value);
        Ok(())
    }
}
