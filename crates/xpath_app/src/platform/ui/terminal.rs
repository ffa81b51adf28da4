use std::io::Write;

use chrono::Local;
use engine_logging::engine_warn;
use xpath_core::{AppViewModel, JobId, Phase, Severity};

use super::render::{notification_line, progress_line, result_lines, status_line};
use crate::platform::Presenter;

/// Prints incremental job output to a writer.
///
/// Progress lines are printed once each; the status line only when it changes.
pub struct TerminalPresenter<W: Write> {
    out: W,
    show_tree: bool,
    job_id: Option<JobId>,
    printed_progress: usize,
    last_status: Option<String>,
    tree_printed: bool,
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W, show_tree: bool) -> Self {
        Self {
            out,
            show_tree,
            job_id: None,
            printed_progress: 0,
            last_status: None,
            tree_printed: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) {
        if let Err(err) = writeln!(self.out, "{line}") {
            engine_warn!("Failed to write terminal output: {}", err);
        }
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn render(&mut self, view: &AppViewModel) {
        if view.job_id != self.job_id {
            self.job_id = view.job_id;
            self.printed_progress = 0;
            self.tree_printed = false;
        }

        let fresh: Vec<String> = view
            .progress_log
            .iter()
            .skip(self.printed_progress)
            .map(|message| progress_line(message))
            .collect();
        self.printed_progress = view.progress_log.len();
        for line in fresh {
            self.write_line(&line);
        }

        let status = status_line(view);
        if self.last_status.as_deref() != Some(status.as_str()) {
            self.write_line(&status);
            self.last_status = Some(status);
        }

        if self.show_tree && view.phase == Phase::Completed && !self.tree_printed {
            self.tree_printed = true;
            for line in result_lines(view) {
                self.write_line(&line);
            }
        }

        let _ = self.out.flush();
    }

    fn notify(&mut self, severity: Severity, message: &str) {
        let line = notification_line(severity, message, &Local::now());
        self.write_line(&line);
    }
}
