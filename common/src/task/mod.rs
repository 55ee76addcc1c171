// Task execution for schedule items
// Provides the task trait, the kind registry, and built-in task kinds.

pub mod command;
pub mod http;
pub mod log;

pub use command::CommandTask;
pub use http::HttpRequestTask;
pub use log::LogMessageTask;

use crate::errors::TaskError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// A concrete task kind a schedule item can declare.
///
/// Parameters are the item's opaque `params` field; each implementation
/// deserializes its own shape and faults on anything else.
#[async_trait]
pub trait ScheduleTask: Send + Sync {
    async fn execute(&self, params: &Value) -> Result<(), TaskError>;
}

/// Registry resolving declared task kinds to implementations.
///
/// Items name their task by a kind string; dispatch goes through this map
/// rather than anything open-ended.
#[derive(Default)]
pub struct TaskRegistry {
    tasks: HashMap<String, Arc<dyn ScheduleTask>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in task kinds
    pub fn with_builtins(http_timeout_seconds: u64) -> Result<Self, TaskError> {
        let mut registry = Self::new();
        registry.register("http_request", Arc::new(HttpRequestTask::new(http_timeout_seconds)?));
        registry.register("command", Arc::new(CommandTask::new()));
        registry.register("log_message", Arc::new(LogMessageTask::new()));
        Ok(registry)
    }

    pub fn register(&mut self, kind: impl Into<String>, task: Arc<dyn ScheduleTask>) {
        self.tasks.insert(kind.into(), task);
    }

    /// Resolve a declared kind, faulting on unregistered kinds
    pub fn get(&self, kind: &str) -> Result<Arc<dyn ScheduleTask>, TaskError> {
        self.tasks
            .get(kind)
            .cloned()
            .ok_or_else(|| TaskError::UnknownKind(kind.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_builtin_kinds_are_registered() {
        let registry = TaskRegistry::with_builtins(30).unwrap();
        assert!(registry.get("http_request").is_ok());
        assert!(registry.get("command").is_ok());
        assert!(registry.get("log_message").is_ok());
    }

    #[test]
    fn test_unknown_kind_faults() {
        let registry = TaskRegistry::new();
        assert!(matches!(
            registry.get("publish"),
            Err(TaskError::UnknownKind(_))
        ));
    }
}
