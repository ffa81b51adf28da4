use std::sync::{mpsc, Arc};
use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use url::Url;
use xpath_core::{JobId, StreamFailure, StreamStatus};

use crate::client::{ClientSettings, STREAM_PATH};
use crate::sse::SseDecoder;
use crate::{EngineError, EngineEvent, JobHandle, WireEvent};

const EVENT_STREAM: &str = "text/event-stream";

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// How a subscription ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEnd {
    /// END or ERROR was delivered.
    Terminal(StreamStatus),
    /// Reported to the sink as `EngineEvent::StreamFailed`.
    Failed(StreamFailure),
    /// Closed by the owner; nothing more was delivered.
    Cancelled,
}

/// A running push-channel consumer for one job.
pub struct StreamSubscription {
    job_id: JobId,
    cancel: CancellationToken,
    task: JoinHandle<StreamEnd>,
}

impl StreamSubscription {
    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Stops delivery and releases the connection.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn finished(self) -> StreamEnd {
        match self.task.await {
            Ok(end) => end,
            Err(err) => StreamEnd::Failed(StreamFailure::Transport(err.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StreamConsumer {
    client: reqwest::Client,
    endpoint: Url,
    idle_timeout: Duration,
}

impl StreamConsumer {
    pub fn new(settings: &ClientSettings) -> Result<Self, EngineError> {
        Self::with_client(settings.build_client()?, settings)
    }

    pub(crate) fn with_client(
        client: reqwest::Client,
        settings: &ClientSettings,
    ) -> Result<Self, EngineError> {
        Ok(Self {
            client,
            endpoint: settings.endpoint(STREAM_PATH)?,
            idle_timeout: settings.idle_timeout,
        })
    }

    /// Opens the push channel of an accepted job on the current tokio runtime.
    pub fn attach(&self, handle: &JobHandle, sink: Arc<dyn ProgressSink>) -> StreamSubscription {
        let job_id = handle.job_id;
        let cancel = CancellationToken::new();
        let consumer = self.clone();
        let token = cancel.clone();
        let task = tokio::spawn(async move { consumer.consume(job_id, sink.as_ref(), token).await });
        StreamSubscription {
            job_id,
            cancel,
            task,
        }
    }

    /// Delivers events in arrival order until a terminal event, a failure or
    /// cancellation. Exactly one of those ends the call.
    pub async fn consume(
        &self,
        job_id: JobId,
        sink: &dyn ProgressSink,
        cancel: CancellationToken,
    ) -> StreamEnd {
        let end = tokio::select! {
            biased;
            _ = cancel.cancelled() => StreamEnd::Cancelled,
            end = self.run(job_id, sink) => end,
        };

        match &end {
            StreamEnd::Terminal(status) => {
                engine_info!("Stream for job {} closed after {:?}", job_id, status);
            }
            StreamEnd::Failed(failure) => {
                engine_warn!("Stream for job {} failed: {:?}", job_id, failure);
                sink.emit(EngineEvent::StreamFailed {
                    job_id,
                    failure: failure.clone(),
                });
            }
            StreamEnd::Cancelled => {
                engine_info!("Stream for job {} cancelled", job_id);
            }
        }
        end
    }

    /// Opens and immediately drops the push channel of an accepted job nobody
    /// will follow. The server keeps an accepted search pending until its
    /// channel has been opened once.
    pub async fn release(&self, handle: &JobHandle) {
        let request = self
            .client
            .get(self.endpoint.clone())
            .header(ACCEPT, EVENT_STREAM)
            .header(CACHE_CONTROL, "no-cache")
            .send();
        match timeout(self.idle_timeout, request).await {
            Ok(Ok(response)) => {
                engine_debug!(
                    "Released stream of job {} with status {}",
                    handle.job_id,
                    response.status()
                );
            }
            Ok(Err(err)) => {
                engine_warn!("Failed to release stream of job {}: {}", handle.job_id, err);
            }
            Err(_) => {
                engine_warn!("Timed out releasing stream of job {}", handle.job_id);
            }
        }
    }

    async fn run(&self, job_id: JobId, sink: &dyn ProgressSink) -> StreamEnd {
        engine_debug!("Job {} GET {}", job_id, self.endpoint);
        let request = self
            .client
            .get(self.endpoint.clone())
            .header(ACCEPT, EVENT_STREAM)
            .header(CACHE_CONTROL, "no-cache")
            .send();

        let response = match timeout(self.idle_timeout, request).await {
            Err(_) => return StreamEnd::Failed(StreamFailure::IdleTimeout(self.idle_timeout)),
            Ok(Err(err)) => return StreamEnd::Failed(StreamFailure::Transport(err.to_string())),
            Ok(Ok(response)) => response,
        };

        let status = response.status();
        if !status.is_success() {
            return StreamEnd::Failed(StreamFailure::HttpStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !is_event_stream(&content_type) {
            return StreamEnd::Failed(StreamFailure::NotEventStream(content_type));
        }

        sink.emit(EngineEvent::StreamAttached { job_id });

        let mut decoder = SseDecoder::new();
        let mut body = response.bytes_stream();
        loop {
            let chunk = match timeout(self.idle_timeout, body.next()).await {
                Err(_) => return StreamEnd::Failed(StreamFailure::IdleTimeout(self.idle_timeout)),
                Ok(None) => {
                    if decoder.has_pending() {
                        engine_debug!("Job {} stream ended inside an event", job_id);
                    }
                    return StreamEnd::Failed(StreamFailure::Disconnected);
                }
                Ok(Some(Err(err))) => {
                    return StreamEnd::Failed(StreamFailure::Transport(err.to_string()))
                }
                Ok(Some(Ok(chunk))) => chunk,
            };

            for message in decoder.feed(&chunk) {
                if !message.is_default_event() {
                    engine_debug!("Job {} skipping event type {:?}", job_id, message.event);
                    continue;
                }
                let wire: WireEvent = match serde_json::from_str(&message.data) {
                    Ok(wire) => wire,
                    Err(err) => {
                        engine_error!(
                            "Job {} sent undecodable event {:?}: {}",
                            job_id,
                            message.data,
                            err
                        );
                        return StreamEnd::Failed(StreamFailure::Protocol(err.to_string()));
                    }
                };
                let label = wire.status.clone();
                let Some(event) = wire.into_stream_event() else {
                    engine_debug!("Job {} ignoring unknown status {}", job_id, label);
                    continue;
                };

                let status = event.status;
                sink.emit(EngineEvent::Stream { job_id, event });
                if status.is_terminal() {
                    return StreamEnd::Terminal(status);
                }
            }
        }
    }
}

fn is_event_stream(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .is_some_and(|mime| mime.eq_ignore_ascii_case(EVENT_STREAM))
}
