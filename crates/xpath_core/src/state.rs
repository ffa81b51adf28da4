use crate::render::render;
use crate::view_model::AppViewModel;
use crate::{JobRequest, ResultTree, ValidationError};

pub type JobId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Streaming,
    Completed,
    Failed,
    Cancelled,
}

impl Phase {
    /// A job is in flight; the search trigger stays disabled.
    pub fn is_active(self) -> bool {
        matches!(self, Phase::Submitting | Phase::Streaming)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Completed | Phase::Failed | Phase::Cancelled)
    }
}

/// Raw field contents as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchForm {
    pub router: String,
    pub xpath: String,
    pub merge: bool,
}

impl SearchForm {
    pub fn to_request(&self) -> Result<JobRequest, ValidationError> {
        JobRequest::new(self.router.as_str(), self.xpath.as_str(), self.merge).validated()
    }
}

/// Everything known about the current job. Replaced wholesale by the next job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobState {
    pub job_id: Option<JobId>,
    pub request: Option<JobRequest>,
    pub phase: Phase,
    pub progress_log: Vec<String>,
    pub xpath_count: Option<u64>,
    pub last_error: Option<String>,
    pub result_tree: Option<ResultTree>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    form: SearchForm,
    job: JobState,
    next_job_id: JobId,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            form: SearchForm::default(),
            job: JobState::default(),
            next_job_id: 1,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            router: self.form.router.clone(),
            xpath: self.form.xpath.clone(),
            merge: self.form.merge,
            job_id: self.job.job_id,
            phase: self.job.phase,
            trigger_enabled: !self.job.phase.is_active(),
            cancel_enabled: self.job.phase.is_active(),
            progress_log: self.job.progress_log.clone(),
            xpath_count: self.job.xpath_count,
            last_error: self.job.last_error.clone(),
            result: self.job.result_tree.as_ref().map(render),
            dirty: self.dirty,
        }
    }

    pub fn job(&self) -> &JobState {
        &self.job
    }

    pub fn result_tree(&self) -> Option<&ResultTree> {
        self.job.result_tree.as_ref()
    }

    /// Returns whether a re-render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn form_mut(&mut self) -> &mut SearchForm {
        &mut self.form
    }

    pub(crate) fn form(&self) -> &SearchForm {
        &self.form
    }

    pub(crate) fn job_mut(&mut self) -> &mut JobState {
        &mut self.job
    }

    /// True when `job_id` is the current job and it still accepts input.
    pub(crate) fn is_live(&self, job_id: JobId) -> bool {
        self.job.job_id == Some(job_id) && self.job.phase.is_active()
    }

    /// Drops the previous job and starts a new one in `Submitting`.
    pub(crate) fn begin_job(&mut self, request: JobRequest) -> JobId {
        let job_id = self.next_job_id;
        self.next_job_id += 1;
        self.job = JobState {
            job_id: Some(job_id),
            request: Some(request),
            phase: Phase::Submitting,
            ..JobState::default()
        };
        self.dirty = true;
        job_id
    }

    pub(crate) fn reset_job(&mut self) {
        self.job = JobState::default();
        self.dirty = true;
    }
}
