#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the router field.
    RouterChanged(String),
    /// User edited the xpath field.
    XpathChanged(String),
    /// User toggled the merge checkbox.
    MergeToggled(bool),
    /// User pressed the search trigger.
    SearchClicked,
    /// User asked to stop the running search.
    CancelClicked,
    /// Server accepted the submit.
    SubmitAccepted {
        job_id: crate::JobId,
        message: String,
    },
    /// Server answered the submit with a non-OK status.
    SubmitRejected {
        job_id: crate::JobId,
        message: String,
    },
    /// Submit never got a usable answer.
    SubmitFailed {
        job_id: crate::JobId,
        message: String,
    },
    /// Push channel is open.
    StreamAttached { job_id: crate::JobId },
    /// One message from the push channel, in arrival order.
    StreamEvent {
        job_id: crate::JobId,
        event: crate::StreamEvent,
    },
    /// Push channel ended without a terminal message.
    StreamFailed {
        job_id: crate::JobId,
        failure: crate::StreamFailure,
    },
}
