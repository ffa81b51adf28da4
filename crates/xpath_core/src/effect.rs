#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SubmitSearch {
        job_id: crate::JobId,
        request: crate::JobRequest,
    },
    OpenStream { job_id: crate::JobId },
    /// Release the push channel of a job. A no-op if none is open.
    CloseStream { job_id: crate::JobId },
    Notify { severity: Severity, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Information,
    Warning,
    Error,
}
