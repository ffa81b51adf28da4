use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use xpath_core::{Effect, Msg, Severity};
use xpath_engine::{EngineEvent, EngineHandle, SubmitError};

/// Executes core effects against the engine.
///
/// Notifications are not engine work; they are handed back to the caller.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn run(&self, effects: Vec<Effect>) -> Vec<(Severity, String)> {
        let mut notifications = Vec::new();
        for effect in effects {
            match effect {
                Effect::SubmitSearch { job_id, request } => {
                    engine_info!(
                        "SubmitSearch job_id={} router={} xpath_len={}",
                        job_id,
                        request.router_id,
                        request.path_expression.len()
                    );
                    self.engine.submit(job_id, request);
                }
                Effect::OpenStream { job_id } => {
                    engine_debug!("OpenStream job_id={}", job_id);
                    self.engine.open_stream(job_id);
                }
                Effect::CloseStream { job_id } => {
                    engine_debug!("CloseStream job_id={}", job_id);
                    self.engine.close_stream(job_id);
                }
                Effect::Notify { severity, message } => notifications.push((severity, message)),
            }
        }
        notifications
    }

    /// Waits up to `wait` for the next engine event, already mapped to a message.
    pub fn next_msg(&self, wait: Duration) -> Result<Option<Msg>, RecvTimeoutError> {
        match self.engine.recv_timeout(wait) {
            Ok(event) => Ok(Some(map_engine_event(event))),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

pub fn map_engine_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Submitted { job_id, result } => match result {
            Ok(handle) => Msg::SubmitAccepted {
                job_id,
                message: handle.message,
            },
            Err(SubmitError::ServerRejected(message)) => Msg::SubmitRejected { job_id, message },
            Err(err) => {
                engine_warn!("Submit of job {} failed: {}", job_id, err);
                Msg::SubmitFailed {
                    job_id,
                    message: err.to_string(),
                }
            }
        },
        EngineEvent::StreamAttached { job_id } => Msg::StreamAttached { job_id },
        EngineEvent::Stream { job_id, event } => Msg::StreamEvent { job_id, event },
        EngineEvent::StreamFailed { job_id, failure } => Msg::StreamFailed { job_id, failure },
    }
}
