//! Recording execution client. Returns scripted results in order and keeps
//! every request and credential pair it was asked for.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use execution_resumer::client::{
    ClientResult, ExecuteJobRequest, ExecuteJobResponse, ExecutionClient, ExecutionClientFactory,
};

type Hook = Box<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Recorder {
    responses: Mutex<VecDeque<ClientResult<ExecuteJobResponse>>>,
    requests: Mutex<Vec<ExecuteJobRequest>>,
    credentials: Mutex<Vec<(String, String)>>,
    before_respond: Mutex<Option<Hook>>,
}

#[derive(Default)]
pub struct RecordingClientFactory {
    recorder: Arc<Recorder>,
}

impl RecordingClientFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next call. Unscripted calls answer with an
    /// empty response.
    pub fn respond_with(&self, result: ClientResult<ExecuteJobResponse>) {
        self.recorder.responses.lock().push_back(result);
    }

    /// Run `hook` during every call, before the result is returned
    pub fn before_respond(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.recorder.before_respond.lock() = Some(Box::new(hook));
    }

    pub fn requests(&self) -> Vec<ExecuteJobRequest> {
        self.recorder.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.recorder.requests.lock().len()
    }

    /// `(api_key, endpoint_url)` per client built
    pub fn credentials(&self) -> Vec<(String, String)> {
        self.recorder.credentials.lock().clone()
    }
}

impl ExecutionClientFactory for RecordingClientFactory {
    fn client_for(
        &self,
        api_key: &str,
        endpoint_url: &str,
    ) -> ClientResult<Box<dyn ExecutionClient>> {
        self.recorder
            .credentials
            .lock()
            .push((api_key.to_string(), endpoint_url.to_string()));
        Ok(Box::new(RecordingClient {
            recorder: self.recorder.clone(),
        }))
    }
}

struct RecordingClient {
    recorder: Arc<Recorder>,
}

#[async_trait]
impl ExecutionClient for RecordingClient {
    async fn execute_job(&self, request: &ExecuteJobRequest) -> ClientResult<ExecuteJobResponse> {
        self.recorder.requests.lock().push(request.clone());
        if let Some(hook) = self.recorder.before_respond.lock().as_ref() {
            hook();
        }
        self.recorder
            .responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(ExecuteJobResponse::default()))
    }
}
