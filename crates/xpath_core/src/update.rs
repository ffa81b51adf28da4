use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};

use crate::{
    parse_result_tree, AppState, Effect, JobId, Msg, Phase, Severity, StreamEvent, StreamStatus,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::RouterChanged(router) => {
            if state.form().router != router {
                state.form_mut().router = router;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::XpathChanged(xpath) => {
            if state.form().xpath != xpath {
                state.form_mut().xpath = xpath;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::MergeToggled(merge) => {
            if state.form().merge != merge {
                state.form_mut().merge = merge;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::SearchClicked => start_search(&mut state),
        Msg::CancelClicked => cancel(&mut state),
        Msg::SubmitAccepted { job_id, message } => {
            if !accepts_submit_reply(&state, job_id) {
                return (state, Vec::new());
            }
            engine_info!("Job {} accepted: {}", job_id, message);
            vec![
                Effect::OpenStream { job_id },
                Effect::Notify {
                    severity: Severity::Information,
                    message: "XPath search started".to_string(),
                },
            ]
        }
        Msg::SubmitRejected { job_id, message } | Msg::SubmitFailed { job_id, message } => {
            if !accepts_submit_reply(&state, job_id) {
                return (state, Vec::new());
            }
            engine_warn!("Job {} was not started: {}", job_id, message);
            let job = state.job_mut();
            job.phase = Phase::Idle;
            job.last_error = Some(message.clone());
            state.mark_dirty();
            vec![Effect::Notify {
                severity: Severity::Error,
                message,
            }]
        }
        Msg::StreamAttached { job_id } => {
            if state.is_live(job_id) && state.job().phase == Phase::Submitting {
                state.job_mut().phase = Phase::Streaming;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::StreamEvent { job_id, event } => {
            if !state.is_live(job_id) {
                engine_debug!("Ignoring {:?} for inactive job {}", event.status, job_id);
                return (state, Vec::new());
            }
            apply_stream_event(&mut state, job_id, event)
        }
        Msg::StreamFailed { job_id, failure } => {
            if !state.is_live(job_id) {
                return (state, Vec::new());
            }
            engine_error!("Stream for job {} failed: {:?}", job_id, failure);
            fail(&mut state, job_id, failure.to_string())
        }
    };

    (state, effects)
}

fn start_search(state: &mut AppState) -> Vec<Effect> {
    if state.job().phase.is_active() {
        // Trigger is disabled while a job runs.
        return Vec::new();
    }
    state.reset_job();

    match state.form().to_request() {
        Ok(request) => {
            let job_id = state.begin_job(request.clone());
            engine_info!(
                "Job {} submitting router={} xpath={} merge={}",
                job_id,
                request.router_id,
                request.path_expression,
                request.merge
            );
            vec![Effect::SubmitSearch { job_id, request }]
        }
        Err(err) => {
            let message = err.to_string();
            state.job_mut().last_error = Some(message.clone());
            vec![Effect::Notify {
                severity: Severity::Error,
                message,
            }]
        }
    }
}

fn cancel(state: &mut AppState) -> Vec<Effect> {
    let Some(job_id) = state.job().job_id else {
        return Vec::new();
    };
    if !state.is_live(job_id) {
        return Vec::new();
    }
    engine_info!("Job {} cancelled by user", job_id);
    let job = state.job_mut();
    job.phase = Phase::Cancelled;
    job.result_tree = None;
    state.mark_dirty();
    vec![
        Effect::CloseStream { job_id },
        Effect::Notify {
            severity: Severity::Warning,
            message: "XPath search cancelled".to_string(),
        },
    ]
}

fn accepts_submit_reply(state: &AppState, job_id: JobId) -> bool {
    state.is_live(job_id) && state.job().phase == Phase::Submitting
}

fn apply_stream_event(state: &mut AppState, job_id: JobId, event: StreamEvent) -> Vec<Effect> {
    match event.status {
        StreamStatus::Ok => {
            let job = state.job_mut();
            job.progress_log.push(event.message);
            job.phase = Phase::Streaming;
            state.mark_dirty();
            Vec::new()
        }
        StreamStatus::Xpath => {
            match event.message.trim().parse::<u64>() {
                Ok(count) => {
                    state.job_mut().xpath_count = Some(count);
                    state.mark_dirty();
                }
                Err(_) => {
                    engine_warn!("Job {} sent a non-numeric xpath count {:?}", job_id, event.message);
                }
            }
            Vec::new()
        }
        StreamStatus::End => match parse_result_tree(event.payload.as_deref()) {
            Ok(tree) => {
                engine_info!(
                    "Job {} completed with {} result nodes",
                    job_id,
                    tree.node_count()
                );
                let job = state.job_mut();
                job.result_tree = Some(tree);
                job.phase = Phase::Completed;
                state.mark_dirty();
                vec![
                    Effect::CloseStream { job_id },
                    Effect::Notify {
                        severity: Severity::Information,
                        message: event.message,
                    },
                ]
            }
            Err(err) => {
                engine_error!("Job {} sent an unusable result: {}", job_id, err);
                fail(
                    state,
                    job_id,
                    "received a malformed result from the server".to_string(),
                )
            }
        },
        StreamStatus::Error => fail(state, job_id, event.message),
    }
}

fn fail(state: &mut AppState, job_id: JobId, message: String) -> Vec<Effect> {
    let job = state.job_mut();
    job.phase = Phase::Failed;
    job.last_error = Some(message.clone());
    job.result_tree = None;
    state.mark_dirty();
    vec![
        Effect::CloseStream { job_id },
        Effect::Notify {
            severity: Severity::Error,
            message,
        },
    ]
}
