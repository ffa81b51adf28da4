use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use thiserror::Error;
use url::Url;
use xpath_core::{JobId, JobRequest, ValidationError};

use crate::client::{ClientSettings, SEARCH_PATH};
use crate::types::{SearchBody, SearchReply};
use crate::EngineError;

const STATUS_ACCEPTED: &str = "OK";

/// Proof that the backend accepted a job; needed to open its push channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub job_id: JobId,
    pub request: JobRequest,
    /// Acknowledgement text sent by the server.
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    ServerRejected(String),
    #[error("server answered with http status {0}")]
    HttpStatus(u16),
    #[error("search request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Transport(String),
    #[error("unexpected answer from server: {0}")]
    MalformedReply(String),
}

impl SubmitError {
    /// The request never got a usable answer from the server.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            SubmitError::HttpStatus(_)
                | SubmitError::Timeout
                | SubmitError::Transport(_)
                | SubmitError::MalformedReply(_)
        )
    }
}

#[async_trait::async_trait]
pub trait JobLauncher: Send + Sync {
    /// Starts a job. Invalid requests fail before any network call.
    async fn submit(&self, job_id: JobId, request: &JobRequest) -> Result<JobHandle, SubmitError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestLauncher {
    client: reqwest::Client,
    endpoint: Url,
    request_timeout: Duration,
}

impl ReqwestLauncher {
    pub fn new(settings: &ClientSettings) -> Result<Self, EngineError> {
        Self::with_client(settings.build_client()?, settings)
    }

    pub(crate) fn with_client(
        client: reqwest::Client,
        settings: &ClientSettings,
    ) -> Result<Self, EngineError> {
        Ok(Self {
            client,
            endpoint: settings.endpoint(SEARCH_PATH)?,
            request_timeout: settings.request_timeout,
        })
    }
}

#[async_trait::async_trait]
impl JobLauncher for ReqwestLauncher {
    async fn submit(&self, job_id: JobId, request: &JobRequest) -> Result<JobHandle, SubmitError> {
        let request = request.validated()?;
        let body = serde_json::to_vec(&SearchBody::from(&request))
            .map_err(|err| SubmitError::Transport(err.to_string()))?;

        engine_debug!("Job {} POST {}", job_id, self.endpoint);
        let response = self
            .client
            .post(self.endpoint.clone())
            .timeout(self.request_timeout)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubmitError::HttpStatus(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        let reply: SearchReply = serde_json::from_slice(&bytes)
            .map_err(|err| SubmitError::MalformedReply(err.to_string()))?;

        if reply.status != STATUS_ACCEPTED {
            engine_warn!(
                "Job {} rejected with status {}: {}",
                job_id,
                reply.status,
                reply.msg
            );
            let message = if reply.msg.trim().is_empty() {
                format!("search rejected by server ({})", reply.status)
            } else {
                reply.msg
            };
            return Err(SubmitError::ServerRejected(message));
        }

        Ok(JobHandle {
            job_id,
            request,
            message: reply.msg,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> SubmitError {
    if err.is_timeout() {
        return SubmitError::Timeout;
    }
    SubmitError::Transport(err.to_string())
}
