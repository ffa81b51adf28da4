use serde::{Deserialize, Serialize};
use thiserror::Error;
use xpath_core::{JobId, JobRequest, StreamEvent, StreamFailure, StreamStatus};

use crate::{JobHandle, SubmitError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Submitted {
        job_id: JobId,
        result: Result<JobHandle, SubmitError>,
    },
    StreamAttached {
        job_id: JobId,
    },
    Stream {
        job_id: JobId,
        event: StreamEvent,
    },
    StreamFailed {
        job_id: JobId,
        failure: StreamFailure,
    },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid server url {url}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("failed to build http client: {0}")]
    Client(String),
    #[error("failed to start engine runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Body of `POST /searchxpath`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SearchBody<'a> {
    pub shortname: &'a str,
    pub xpath: &'a str,
    pub merge: bool,
}

impl<'a> From<&'a JobRequest> for SearchBody<'a> {
    fn from(request: &'a JobRequest) -> Self {
        Self {
            shortname: &request.router_id,
            xpath: &request.path_expression,
            merge: request.merge,
        }
    }
}

/// Acknowledgement of `POST /searchxpath`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchReply {
    pub status: String,
    #[serde(default)]
    pub msg: String,
}

/// JSON body of one push-channel message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WireEvent {
    pub status: String,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub payload: Option<String>,
}

impl WireEvent {
    /// Converts to a stream event. Unknown statuses yield `None`.
    pub fn into_stream_event(self) -> Option<StreamEvent> {
        let status = StreamStatus::from_wire(&self.status)?;
        let payload = self.payload.filter(|payload| !payload.is_empty());
        Some(StreamEvent {
            status,
            message: self.msg,
            payload,
        })
    }
}
