use std::fmt;
use std::time::Duration;

/// Status carried by every message on the push channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    Ok,
    Xpath,
    End,
    Error,
}

impl StreamStatus {
    /// Maps the wire label to a status. Unknown labels yield `None`.
    pub fn from_wire(label: &str) -> Option<Self> {
        match label {
            "OK" => Some(Self::Ok),
            "XPATH" => Some(Self::Xpath),
            "END" => Some(Self::End),
            "ERROR" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::End | Self::Error)
    }
}

/// One decoded progress message for a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEvent {
    pub status: StreamStatus,
    pub message: String,
    pub payload: Option<String>,
}

impl StreamEvent {
    pub fn new(status: StreamStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }
}

/// Why a push channel ended without a terminal event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFailure {
    /// The server closed the connection before END or ERROR.
    Disconnected,
    /// Nothing arrived within the idle timeout.
    IdleTimeout(Duration),
    /// The stream endpoint answered with a non-success status.
    HttpStatus(u16),
    /// The stream endpoint did not answer with an event stream.
    NotEventStream(String),
    Transport(String),
    /// A message could not be decoded. The detail is for logs only.
    Protocol(String),
}

impl fmt::Display for StreamFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamFailure::Disconnected => write!(f, "connection to the server was lost"),
            StreamFailure::IdleTimeout(timeout) => {
                write!(f, "no progress received for {}s", timeout.as_secs())
            }
            StreamFailure::HttpStatus(code) => write!(f, "stream refused with http status {code}"),
            StreamFailure::NotEventStream(content_type) => {
                write!(f, "stream answered with unexpected content type {content_type}")
            }
            StreamFailure::Transport(message) => write!(f, "stream transport error: {message}"),
            StreamFailure::Protocol(_) => write!(f, "received a malformed message from the server"),
        }
    }
}
