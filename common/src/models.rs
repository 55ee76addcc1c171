use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

// ============================================================================
// Item Model
// ============================================================================

/// Well-known field names on schedule items
pub mod fields {
    /// Serialized `ScheduleTiming` (recurrence + validity window)
    pub const TIMING: &str = "timing";
    /// Declared task kind, resolved through the task registry
    pub const TASK: &str = "task";
    /// Opaque parameter blob handed to the task
    pub const PARAMS: &str = "params";
    /// Delete the item once its window has passed
    pub const AUTO_REMOVE: &str = "auto_remove";
    /// Execute by handing off to a background worker
    pub const ASYNC: &str = "async";
    /// RFC 3339 timestamp of the last execution, written back by the agent
    pub const LAST_RUN: &str = "last_run";
}

/// Type tag carried by every repository item.
///
/// The agent only acts on `Schedule` items; everything else in the tree is
/// traversal structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemKind {
    Schedule,
    Folder,
    Other(String),
}

impl From<String> for ItemKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "schedule" => ItemKind::Schedule,
            "folder" => ItemKind::Folder,
            _ => ItemKind::Other(tag),
        }
    }
}

impl From<ItemKind> for String {
    fn from(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Schedule => "schedule".to_string(),
            ItemKind::Folder => "folder".to_string(),
            ItemKind::Other(tag) => tag,
        }
    }
}

/// One node of the content tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub kind: ItemKind,
    /// Absolute path within the repository, e.g. `/system/tasks/schedules/nightly`
    pub path: String,
    #[serde(default)]
    pub fields: HashMap<String, Value>,
}

impl Item {
    pub fn new(name: impl Into<String>, kind: ItemKind, path: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            path: path.into(),
            fields: HashMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Read a boolean field, treating absence as `false`
    pub fn bool_field(&self, name: &str) -> bool {
        self.fields
            .get(name)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Read a string field
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}
