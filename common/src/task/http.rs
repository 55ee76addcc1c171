// HTTP request task kind

use crate::errors::TaskError;
use crate::task::ScheduleTask;
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
enum HttpMethod {
    Get,
    Post,
    Put,
}

#[derive(Debug, Deserialize)]
struct HttpParams {
    method: HttpMethod,
    url: String,
    #[serde(default)]
    headers: HashMap<String, String>,
    #[serde(default)]
    body: Option<String>,
}

/// Fires an HTTP request at a configured endpoint.
///
/// Non-2xx responses are faults; the response body is discarded.
pub struct HttpRequestTask {
    client: Client,
}

impl HttpRequestTask {
    pub fn new(timeout_seconds: u64) -> Result<Self, TaskError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| {
                TaskError::HttpRequestFailed(format!("Failed to create HTTP client: {}", e))
            })?;
        Ok(Self { client })
    }

    fn convert_method(method: &HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
        }
    }
}

#[async_trait]
impl ScheduleTask for HttpRequestTask {
    async fn execute(&self, params: &Value) -> Result<(), TaskError> {
        let params: HttpParams = serde_json::from_value(params.clone())
            .map_err(|e| TaskError::InvalidParameters(e.to_string()))?;

        let mut request = self
            .client
            .request(Self::convert_method(&params.method), &params.url);
        for (name, value) in &params.headers {
            request = request.header(name, value);
        }
        if let Some(body) = params.body {
            request = request.body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TaskError::HttpRequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TaskError::HttpRequestFailed(format!(
                "{} returned {}",
                params.url, status
            )));
        }

        tracing::debug!(url = %params.url, status = %status, "HTTP task completed");
        Ok(())
    }
}
