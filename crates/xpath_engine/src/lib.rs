//! XPath browser engine: HTTP submit, push-channel consumption and effect execution.
mod client;
mod engine;
mod launch;
mod sse;
mod stream;
mod types;

pub use client::ClientSettings;
pub use engine::EngineHandle;
pub use launch::{JobHandle, JobLauncher, ReqwestLauncher, SubmitError};
pub use sse::{SseDecoder, SseMessage};
pub use stream::{ChannelProgressSink, ProgressSink, StreamConsumer, StreamEnd, StreamSubscription};
pub use types::{EngineError, EngineEvent, SearchReply, WireEvent};
