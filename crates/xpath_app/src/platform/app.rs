use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use engine_logging::{engine_error, engine_info};
use xpath_core::{update, AppState, AppViewModel, JobRequest, Msg, Phase, Severity, StreamFailure};
use xpath_engine::EngineHandle;

use super::effects::EffectRunner;

const PUMP_INTERVAL: Duration = Duration::from_millis(100);

/// Output side of the controller.
pub trait Presenter {
    /// Called after every message that changed visible state.
    fn render(&mut self, view: &AppViewModel);
    fn notify(&mut self, severity: Severity, message: &str);
}

/// Owns the state of one UI instance and the engine serving it.
pub struct Controller<P: Presenter> {
    state: AppState,
    runner: EffectRunner,
    presenter: P,
}

impl<P: Presenter> Controller<P> {
    pub fn new(engine: EngineHandle, presenter: P) -> Self {
        Self {
            state: AppState::new(),
            runner: EffectRunner::new(engine),
            presenter,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn into_presenter(self) -> P {
        self.presenter
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;

        let notifications = self.runner.run(effects);
        if was_dirty {
            let view = self.state.view();
            self.presenter.render(&view);
        }
        for (severity, message) in notifications {
            self.presenter.notify(severity, &message);
        }
    }

    /// Handles at most one engine event. Returns false once the engine is gone.
    pub fn pump(&mut self, wait: Duration) -> bool {
        match self.runner.next_msg(wait) {
            Ok(Some(msg)) => {
                self.dispatch(msg);
                true
            }
            Ok(None) => true,
            Err(RecvTimeoutError::Timeout) => true,
            Err(RecvTimeoutError::Disconnected) => {
                if let Some(job_id) = self.state.job().job_id {
                    engine_error!("Engine stopped while job {} was running", job_id);
                    self.dispatch(Msg::StreamFailed {
                        job_id,
                        failure: StreamFailure::Transport("engine stopped".to_string()),
                    });
                }
                false
            }
        }
    }

    /// Fills the form from `request`, triggers the search and drives it to an end.
    pub fn run_job(&mut self, request: &JobRequest) -> Phase {
        self.dispatch(Msg::RouterChanged(request.router_id.clone()));
        self.dispatch(Msg::XpathChanged(request.path_expression.clone()));
        self.dispatch(Msg::MergeToggled(request.merge));
        self.dispatch(Msg::SearchClicked);

        while self.state.job().phase.is_active() {
            if !self.pump(PUMP_INTERVAL) {
                break;
            }
        }

        let phase = self.state.job().phase;
        engine_info!("Job {:?} finished in phase {:?}", self.state.job().job_id, phase);
        phase
    }

    pub fn cancel(&mut self) {
        self.dispatch(Msg::CancelClicked);
    }
}
