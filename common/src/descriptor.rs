// Schedule descriptors
//
// A descriptor wraps one schedule-kind item for the duration of a sweep.
// Due-ness and expiry come from the item's timing field and persisted
// last-run timestamp; execution is delegated to the task registry. The
// descriptor holds no state of its own between sweeps.

use crate::errors::{AgentError, RepositoryError, ScheduleError, TaskError};
use crate::models::{fields, Item};
use crate::repository::ItemRepository;
use crate::schedule::ScheduleTiming;
use crate::task::TaskRegistry;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;

pub struct ScheduleDescriptor {
    item: Item,
    repository: Arc<dyn ItemRepository>,
    registry: Arc<TaskRegistry>,
}

impl ScheduleDescriptor {
    pub fn from_item(
        item: Item,
        repository: Arc<dyn ItemRepository>,
        registry: Arc<TaskRegistry>,
    ) -> Self {
        Self {
            item,
            repository,
            registry,
        }
    }

    pub fn name(&self) -> &str {
        &self.item.name
    }

    pub fn is_asynchronous(&self) -> bool {
        self.item.bool_field(fields::ASYNC)
    }

    pub fn auto_remove(&self) -> bool {
        self.item.bool_field(fields::AUTO_REMOVE)
    }

    /// Parse the timing field. A missing field means the item is inert
    /// (never due, never expired); a malformed one is a fault.
    fn timing(&self) -> Result<Option<ScheduleTiming>, ScheduleError> {
        match self.item.fields.get(fields::TIMING) {
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| ScheduleError::InvalidTiming {
                    item: self.item.name.clone(),
                    reason: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    fn last_run(&self) -> Option<DateTime<Utc>> {
        self.item
            .str_field(fields::LAST_RUN)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> Result<bool, ScheduleError> {
        match self.timing()? {
            Some(timing) => timing.is_due(self.last_run(), now),
            None => Ok(false),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> Result<bool, ScheduleError> {
        match self.timing()? {
            Some(timing) => Ok(timing.is_expired(now)),
            None => Ok(false),
        }
    }

    /// Execute the item's declared task.
    ///
    /// Synchronous items are awaited; asynchronous items are handed off to a
    /// spawned task and this call returns once the handoff is made. In both
    /// cases the last-run timestamp is written back once execution has
    /// started successfully.
    pub async fn execute(&self, now: DateTime<Utc>) -> Result<(), AgentError> {
        let kind = self
            .item
            .str_field(fields::TASK)
            .ok_or_else(|| TaskError::MissingKind(self.item.name.clone()))?;
        let task = self.registry.get(kind)?;
        let params = self
            .item
            .fields
            .get(fields::PARAMS)
            .cloned()
            .unwrap_or(Value::Null);

        if self.is_asynchronous() {
            let name = self.item.name.clone();
            tokio::spawn(async move {
                if let Err(e) = task.execute(&params).await {
                    error!(schedule = %name, error = %e, "Asynchronous schedule execution failed");
                }
            });
        } else {
            task.execute(&params).await?;
        }

        self.touch_last_run(now).await?;
        Ok(())
    }

    /// Delete the backing item from the repository
    pub async fn remove(&self) -> Result<(), RepositoryError> {
        self.repository.delete(self.item.id).await
    }

    async fn touch_last_run(&self, now: DateTime<Utc>) -> Result<(), RepositoryError> {
        self.repository
            .update_field(self.item.id, fields::LAST_RUN, json!(now.to_rfc3339()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemKind;
    use crate::repository::MemoryRepository;
    use crate::task::ScheduleTask;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingTask {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ScheduleTask for RecordingTask {
        async fn execute(&self, _params: &Value) -> Result<(), TaskError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingTask;

    #[async_trait]
    impl ScheduleTask for FailingTask {
        async fn execute(&self, _params: &Value) -> Result<(), TaskError> {
            Err(TaskError::HttpRequestFailed("boom".to_string()))
        }
    }

    async fn setup(item: Item) -> (Arc<MemoryRepository>, Arc<TaskRegistry>, ScheduleDescriptor) {
        let repo = Arc::new(MemoryRepository::new());
        repo.insert(None, item.clone()).await.unwrap();

        let mut registry = TaskRegistry::new();
        registry.register("recording", Arc::new(RecordingTask::default()));
        registry.register("failing", Arc::new(FailingTask));
        let registry = Arc::new(registry);

        let descriptor = ScheduleDescriptor::from_item(item, repo.clone(), registry.clone());
        (repo, registry, descriptor)
    }

    fn schedule_item(name: &str) -> Item {
        Item::new(name, ItemKind::Schedule, format!("/{name}"))
            .with_field(fields::TASK, json!("recording"))
            .with_field(
                fields::TIMING,
                json!({ "recurrence": { "type": "interval", "every_seconds": 60 } }),
            )
    }

    #[tokio::test]
    async fn test_item_without_timing_is_never_due_or_expired() {
        let item = Item::new("bare", ItemKind::Schedule, "/bare");
        let (_, _, descriptor) = setup(item).await;
        let now = Utc::now();
        assert!(!descriptor.is_due(now).unwrap());
        assert!(!descriptor.is_expired(now).unwrap());
    }

    #[tokio::test]
    async fn test_malformed_timing_is_a_fault() {
        let item = Item::new("broken", ItemKind::Schedule, "/broken")
            .with_field(fields::TIMING, json!("not a timing"));
        let (_, _, descriptor) = setup(item).await;
        assert!(descriptor.is_due(Utc::now()).is_err());
    }

    #[tokio::test]
    async fn test_execute_persists_last_run() {
        let item = schedule_item("sync");
        let id = item.id;
        let (repo, _, descriptor) = setup(item).await;

        let now = Utc::now();
        descriptor.execute(now).await.unwrap();

        let stored = repo.item(id).await.unwrap();
        let persisted = stored.str_field(fields::LAST_RUN).unwrap();
        assert_eq!(persisted, now.to_rfc3339());
    }

    #[tokio::test]
    async fn test_failed_sync_execution_leaves_last_run_untouched() {
        let item = schedule_item("flaky").with_field(fields::TASK, json!("failing"));
        let id = item.id;
        let (repo, _, descriptor) = setup(item).await;

        assert!(descriptor.execute(Utc::now()).await.is_err());
        let stored = repo.item(id).await.unwrap();
        assert!(stored.str_field(fields::LAST_RUN).is_none());
    }

    #[tokio::test]
    async fn test_unknown_task_kind_faults() {
        let item = schedule_item("mystery").with_field(fields::TASK, json!("publish"));
        let (_, _, descriptor) = setup(item).await;
        let err = descriptor.execute(Utc::now()).await.unwrap_err();
        assert!(matches!(err, AgentError::Task(TaskError::UnknownKind(_))));
    }

    #[tokio::test]
    async fn test_missing_task_kind_faults() {
        let mut item = schedule_item("kindless");
        item.fields.remove(fields::TASK);
        let (_, _, descriptor) = setup(item).await;
        let err = descriptor.execute(Utc::now()).await.unwrap_err();
        assert!(matches!(err, AgentError::Task(TaskError::MissingKind(_))));
    }

    #[tokio::test]
    async fn test_async_execution_returns_after_handoff() {
        let item = schedule_item("bg").with_field(fields::ASYNC, json!(true));
        let id = item.id;
        let (repo, _, descriptor) = setup(item).await;

        descriptor.execute(Utc::now()).await.unwrap();
        // Last run is recorded at handoff, not at background completion
        let stored = repo.item(id).await.unwrap();
        assert!(stored.str_field(fields::LAST_RUN).is_some());

        // Let the spawned task drain before the runtime shuts down
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn test_remove_deletes_backing_item() {
        let item = schedule_item("doomed");
        let id = item.id;
        let (repo, _, descriptor) = setup(item).await;

        descriptor.remove().await.unwrap();
        assert!(!repo.contains(id).await);
    }

    #[tokio::test]
    async fn test_due_respects_persisted_last_run() {
        let item = schedule_item("paced").with_field(
            fields::LAST_RUN,
            json!(Utc::now().to_rfc3339()),
        );
        let (_, _, descriptor) = setup(item).await;
        assert!(!descriptor.is_due(Utc::now()).unwrap());
    }
}
