// Schedule sweep runner
//
// One sweep: discover schedule items under the configured root, execute the
// ones that are due, auto-remove expired ones, and account progress on the
// caller's job status. A fault in any single descriptor is logged and
// absorbed; the sweep always completes and `run` never returns an error.

use crate::descriptor::ScheduleDescriptor;
use crate::errors::AgentError;
use crate::models::ItemKind;
use crate::repository::RepositoryRegistry;
use crate::task::TaskRegistry;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{error, info};

/// Job category recognized as a valid progress target
pub const JOB_CATEGORY_SCHEDULE: &str = "schedule";

/// Progress counters for a monitoring job.
///
/// Owned by the caller; the runner only mutates the counters, and only when
/// the category is `"schedule"`. Counters are atomic so a monitor may read
/// them while a sweep is in flight.
#[derive(Debug)]
pub struct JobStatus {
    category: String,
    total: AtomicUsize,
    processed: AtomicUsize,
    failed: AtomicUsize,
}

impl JobStatus {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            total: AtomicUsize::new(0),
            processed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        }
    }

    /// A status recognized by the runner as a progress target
    pub fn schedule() -> Self {
        Self::new(JOB_CATEGORY_SCHEDULE)
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Descriptor count discovered at sweep start (snapshot)
    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    /// Descriptors visited so far, counted regardless of outcome
    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::SeqCst)
    }

    /// Descriptors whose processing faulted
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    fn set_total(&self, total: usize) {
        self.total.store(total, Ordering::SeqCst);
    }

    fn add_processed(&self) {
        self.processed.fetch_add(1, Ordering::SeqCst);
    }

    fn add_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Configuration for one runner instance.
///
/// `log_activity` is an explicit per-runner flag; it gates info-level
/// activity logging but never error logging.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub database_name: String,
    pub schedule_root: String,
    pub log_activity: bool,
}

/// Executes one sweep of due schedules under a configured root
pub struct ScheduleRunner {
    config: RunnerConfig,
    repositories: Arc<RepositoryRegistry>,
    registry: Arc<TaskRegistry>,
}

impl ScheduleRunner {
    pub fn new(
        config: RunnerConfig,
        repositories: Arc<RepositoryRegistry>,
        registry: Arc<TaskRegistry>,
    ) -> Self {
        Self {
            config,
            repositories,
            registry,
        }
    }

    /// Run one sweep.
    ///
    /// Absorbs every per-descriptor fault; an unresolvable database or root
    /// degenerates to an empty sweep rather than an error.
    pub async fn run(&self, job: Option<&JobStatus>) {
        if self.config.log_activity {
            info!(database = %self.config.database_name, "Schedule agent started");
        }

        let schedules = self.discover().await;
        if self.config.log_activity {
            info!(count = schedules.len(), "Examining schedules");
        }

        let job = job.filter(|status| status.category() == JOB_CATEGORY_SCHEDULE);
        if let Some(status) = job {
            // Snapshot of the discovered count, taken before any execution
            status.set_total(schedules.len());
        }

        let now = Utc::now();
        for descriptor in &schedules {
            if let Err(e) = self.process(descriptor, now).await {
                error!(schedule = %descriptor.name(), error = %e, "Schedule processing failed");
                if let Some(status) = job {
                    status.add_failed();
                }
            }
            // Visited once per descriptor, on the fault path too
            if let Some(status) = job {
                status.add_processed();
            }
        }
    }

    /// Collect schedule descriptors under the configured root.
    ///
    /// An unknown database, an unresolvable root, or a failed traversal all
    /// yield an empty set.
    async fn discover(&self) -> Vec<ScheduleDescriptor> {
        let Some(repository) = self.repositories.get(&self.config.database_name) else {
            return Vec::new();
        };
        let root = match repository.resolve(&self.config.schedule_root).await {
            Ok(Some(root)) => root,
            Ok(None) | Err(_) => return Vec::new(),
        };
        let descendants = match repository.descendants_of(root.id).await {
            Ok(items) => items,
            Err(_) => return Vec::new(),
        };

        descendants
            .into_iter()
            .filter(|item| item.kind == ItemKind::Schedule)
            .map(|item| {
                ScheduleDescriptor::from_item(item, repository.clone(), self.registry.clone())
            })
            .collect()
    }

    async fn process(
        &self,
        descriptor: &ScheduleDescriptor,
        now: DateTime<Utc>,
    ) -> Result<(), AgentError> {
        if descriptor.is_due(now)? {
            if self.config.log_activity {
                info!(
                    schedule = %descriptor.name(),
                    asynchronous = descriptor.is_asynchronous(),
                    "Starting schedule"
                );
            }
            descriptor.execute(now).await?;
            if self.config.log_activity {
                info!(schedule = %descriptor.name(), "Ended schedule");
            }
        } else if self.config.log_activity {
            info!(schedule = %descriptor.name(), "Not due");
        }

        // Expiry is checked after the due branch, whether or not it ran
        if descriptor.auto_remove() && descriptor.is_expired(now)? {
            if self.config.log_activity {
                info!(schedule = %descriptor.name(), "Schedule is expired, auto removing item");
            }
            descriptor.remove().await?;
        }
        Ok(())
    }
}
