use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Parameters of one search job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequest {
    pub router_id: String,
    pub path_expression: String,
    pub merge: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("router must not be empty")]
    EmptyRouter,
    #[error("xpath must not be empty")]
    EmptyPath,
}

impl JobRequest {
    pub fn new(router_id: impl Into<String>, path_expression: impl Into<String>, merge: bool) -> Self {
        Self {
            router_id: router_id.into(),
            path_expression: path_expression.into(),
            merge,
        }
    }

    /// Returns a copy with surrounding whitespace removed, or the first empty field.
    pub fn validated(&self) -> Result<JobRequest, ValidationError> {
        let router_id = self.router_id.trim();
        if router_id.is_empty() {
            return Err(ValidationError::EmptyRouter);
        }
        let path_expression = self.path_expression.trim();
        if path_expression.is_empty() {
            return Err(ValidationError::EmptyPath);
        }
        Ok(JobRequest::new(router_id, path_expression, self.merge))
    }
}
