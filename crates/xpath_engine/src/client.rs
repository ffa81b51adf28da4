use std::time::Duration;

use url::Url;

use crate::EngineError;

pub(crate) const SEARCH_PATH: &str = "searchxpath";
pub(crate) const STREAM_PATH: &str = "stream";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Base url of the backend, e.g. `http://127.0.0.1:8081`.
    pub server_url: String,
    pub connect_timeout: Duration,
    /// Whole-request limit for the submit call.
    pub request_timeout: Duration,
    /// Longest silence tolerated on the push channel.
    pub idle_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8081".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(30),
        }
    }
}

impl ClientSettings {
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, EngineError> {
        let invalid = |message: String| EngineError::InvalidUrl {
            url: self.server_url.clone(),
            message,
        };
        let mut base = Url::parse(self.server_url.trim()).map_err(|err| invalid(err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid("url cannot be a base".to_string()));
        }
        // Keep any path prefix of the base url.
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(path).map_err(|err| invalid(err.to_string()))
    }

    /// Client without a whole-request timeout; the push channel is long-lived.
    pub(crate) fn build_client(&self) -> Result<reqwest::Client, EngineError> {
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .build()
            .map_err(|err| EngineError::Client(err.to_string()))
    }
}
