use async_trait::async_trait;

use super::error::ClientResult;
use super::types::{ExecuteJobRequest, ExecuteJobResponse};

/// A job endpoint able to replay an execution.
#[async_trait]
pub trait ExecutionClient: Send + Sync {
    async fn execute_job(&self, request: &ExecuteJobRequest) -> ClientResult<ExecuteJobResponse>;
}

/// Builds a client for one environment's API key and one endpoint URL.
///
/// The resumer asks for a fresh client on every invocation and drops it on
/// every exit path.
pub trait ExecutionClientFactory: Send + Sync {
    fn client_for(&self, api_key: &str, endpoint_url: &str)
        -> ClientResult<Box<dyn ExecutionClient>>;
}
