// Diagnostic task kind that only writes a log line

use crate::errors::TaskError;
use crate::task::ScheduleTask;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

#[derive(Debug, Deserialize)]
struct LogParams {
    message: String,
}

/// Writes a configured message to the log. Useful for wiring checks and as
/// the simplest possible schedule target.
#[derive(Default)]
pub struct LogMessageTask;

impl LogMessageTask {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ScheduleTask for LogMessageTask {
    async fn execute(&self, params: &Value) -> Result<(), TaskError> {
        let params: LogParams = serde_json::from_value(params.clone())
            .map_err(|e| TaskError::InvalidParameters(e.to_string()))?;
        info!(message = %params.message, "Scheduled log message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_logs_and_succeeds() {
        let task = LogMessageTask::new();
        assert!(task.execute(&json!({ "message": "hello" })).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_message_faults() {
        let task = LogMessageTask::new();
        assert!(matches!(
            task.execute(&json!({})).await,
            Err(TaskError::InvalidParameters(_))
        ));
    }
}
