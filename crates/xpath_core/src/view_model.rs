use crate::{JobId, Phase, RenderedView};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub router: String,
    pub xpath: String,
    pub merge: bool,
    pub job_id: Option<JobId>,
    pub phase: Phase,
    pub trigger_enabled: bool,
    pub cancel_enabled: bool,
    pub progress_log: Vec<String>,
    pub xpath_count: Option<u64>,
    pub last_error: Option<String>,
    pub result: Option<RenderedView>,
    pub dirty: bool,
}
