// Error handling framework

use thiserror::Error;

/// Content repository errors
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Seed data is invalid: {0}")]
    InvalidSeed(String),

    #[error("Storage backend failed: {0}")]
    StorageFailed(String),
}

/// Schedule timing errors
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Invalid cron expression '{expression}': {reason}")]
    InvalidCronExpression { expression: String, reason: String },

    #[error("Invalid timing field on item '{item}': {reason}")]
    InvalidTiming { item: String, reason: String },
}

/// Task execution errors
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("Unknown task kind: {0}")]
    UnknownKind(String),

    #[error("Item declares no task kind: {0}")]
    MissingKind(String),

    #[error("Invalid task parameters: {0}")]
    InvalidParameters(String),

    #[error("HTTP request failed: {0}")]
    HttpRequestFailed(String),

    #[error("Command failed with status {status}: {command}")]
    CommandFailed { command: String, status: i32 },

    #[error("Command could not be spawned: {0}")]
    SpawnFailed(String),
}

/// Umbrella error for a single descriptor iteration.
///
/// Everything that can go wrong while checking, executing, or removing one
/// schedule descriptor funnels into this type; the sweep runner absorbs it.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Task(#[from] TaskError),
}
