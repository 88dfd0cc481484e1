//! # HTTP Execution Client
//!
//! Calls a job endpoint with `POST <endpoint url>`, authenticating with the
//! environment's API key. Non-2xx answers become [`ExecutionClientError::Api`],
//! except gateway statuses (502, 503, 504) without the endpoint's own error
//! body, which come from an intermediary and are reported as transport errors.
//! Failures to reach the endpoint or to decode its answer keep their own kinds
//! so the caller can redeliver.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, warn};

use super::error::{ClientResult, ExecutionClientError};
use super::traits::{ExecutionClient, ExecutionClientFactory};
use super::types::{ErrorBody, ExecuteJobRequest, ExecuteJobResponse};
use crate::config::ClientConfig;

pub const JOB_ACTION_HEADER: &str = "x-job-action";
pub const EXECUTE_JOB_ACTION: &str = "EXECUTE_JOB";

/// Shares one connection pool across the per-invocation clients it builds.
#[derive(Debug, Clone)]
pub struct HttpExecutionClientFactory {
    client: Client,
}

impl HttpExecutionClientFactory {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                ExecutionClientError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client })
    }
}

impl ExecutionClientFactory for HttpExecutionClientFactory {
    fn client_for(
        &self,
        api_key: &str,
        endpoint_url: &str,
    ) -> ClientResult<Box<dyn ExecutionClient>> {
        let endpoint = Url::parse(endpoint_url).map_err(|e| {
            ExecutionClientError::Configuration(format!(
                "Invalid endpoint URL '{endpoint_url}': {e}"
            ))
        })?;

        Ok(Box::new(HttpExecutionClient {
            client: self.client.clone(),
            endpoint,
            api_key: api_key.to_string(),
        }))
    }
}

pub struct HttpExecutionClient {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl std::fmt::Debug for HttpExecutionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpExecutionClient")
            .field("endpoint", &self.endpoint.as_str())
            .finish()
    }
}

#[async_trait]
impl ExecutionClient for HttpExecutionClient {
    async fn execute_job(&self, request: &ExecuteJobRequest) -> ClientResult<ExecuteJobResponse> {
        debug!(
            endpoint = %self.endpoint,
            job = %request.job.id,
            version = %request.job.version,
            execution_id = %request.context.id,
            cached_tasks = request.tasks.len(),
            "Executing job on endpoint"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .header(JOB_ACTION_HEADER, EXECUTE_JOB_ACTION)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return response.json::<ExecuteJobResponse>().await.map_err(|e| {
                ExecutionClientError::InvalidResponse(format!(
                    "Failed to parse execute job response: {e}"
                ))
            });
        }

        let body = response.text().await.map_err(|e| {
            ExecutionClientError::Transport(format!(
                "Failed to read HTTP {status} response body: {e}"
            ))
        })?;
        let error = api_error_from_body(status, &body, &self.endpoint);
        warn!(
            endpoint = %self.endpoint,
            status = %status,
            error = %error,
            recognized = error.is_recognized(),
            "Job endpoint call failed"
        );
        Err(error)
    }
}

fn is_gateway_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
    )
}

/// Build the failure record for a non-2xx answer, preferring the endpoint's
/// own `{message, stack}` body.
fn api_error_from_body(status: StatusCode, body: &str, endpoint: &Url) -> ExecutionClientError {
    let fallback_stack = format!("POST {endpoint} responded with HTTP {status}");

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { message, stack }) => ExecutionClientError::api(
            Some(status.as_u16()),
            message,
            stack.unwrap_or(fallback_stack),
        ),
        Err(_) if is_gateway_status(status) => {
            ExecutionClientError::Transport(format!("POST {endpoint} answered HTTP {status}"))
        }
        Err(_) => {
            let message = match body.trim() {
                "" => format!("HTTP {status}"),
                text => format!("HTTP {status}: {text}"),
            };
            ExecutionClientError::api(Some(status.as_u16()), message, fallback_stack)
        }
    }
}
