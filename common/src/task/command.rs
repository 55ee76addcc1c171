// Local process task kind

use crate::errors::TaskError;
use crate::task::ScheduleTask;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::process::Command;

#[derive(Debug, Deserialize)]
struct CommandParams {
    program: String,
    #[serde(default)]
    args: Vec<String>,
}

/// Runs a local process and treats a non-zero exit status as a fault
#[derive(Default)]
pub struct CommandTask;

impl CommandTask {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ScheduleTask for CommandTask {
    async fn execute(&self, params: &Value) -> Result<(), TaskError> {
        let params: CommandParams = serde_json::from_value(params.clone())
            .map_err(|e| TaskError::InvalidParameters(e.to_string()))?;

        let status = Command::new(&params.program)
            .args(&params.args)
            .status()
            .await
            .map_err(|e| TaskError::SpawnFailed(format!("{}: {}", params.program, e)))?;

        if !status.success() {
            return Err(TaskError::CommandFailed {
                command: params.program,
                status: status.code().unwrap_or(-1),
            });
        }

        tracing::debug!(program = %params.program, "Command task completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_successful_command() {
        let task = CommandTask::new();
        let result = task.execute(&json!({ "program": "true" })).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_failing_command_faults() {
        let task = CommandTask::new();
        let result = task.execute(&json!({ "program": "false" })).await;
        assert!(matches!(result, Err(TaskError::CommandFailed { .. })));
    }

    #[tokio::test]
    async fn test_missing_program_faults() {
        let task = CommandTask::new();
        let result = task
            .execute(&json!({ "program": "/no/such/binary/anywhere" }))
            .await;
        assert!(matches!(result, Err(TaskError::SpawnFailed(_))));
    }

    #[tokio::test]
    async fn test_invalid_params_fault() {
        let task = CommandTask::new();
        let result = task.execute(&json!({ "args": ["x"] })).await;
        assert!(matches!(result, Err(TaskError::InvalidParameters(_))));
    }
}
