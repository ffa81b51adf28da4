use chrono::{DateTime, TimeZone};
use xpath_core::{AppViewModel, Phase, Severity};

pub fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "Idle",
        Phase::Submitting => "Submitting",
        Phase::Streaming => "Streaming",
        Phase::Completed => "Completed",
        Phase::Failed => "Failed",
        Phase::Cancelled => "Cancelled",
    }
}

pub fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Information => "info",
        Severity::Warning => "warning",
        Severity::Error => "error",
    }
}

/// One-line summary, e.g. `Job 2 | Streaming | XPath matches: 3`.
pub fn status_line(view: &AppViewModel) -> String {
    let mut parts = Vec::with_capacity(4);
    if let Some(job_id) = view.job_id {
        parts.push(format!("Job {job_id}"));
    }
    parts.push(phase_label(view.phase).to_string());
    if let Some(count) = view.xpath_count {
        parts.push(format!("XPath matches: {count}"));
    }
    if let Some(error) = &view.last_error {
        parts.push(format!("Error: {error}"));
    }
    parts.join(" | ")
}

pub fn progress_line(message: &str) -> String {
    format!("  > {message}")
}

pub fn notification_line<Tz>(severity: Severity, message: &str, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "[{}] {}: {}",
        at.format("%H:%M:%S"),
        severity_label(severity),
        message
    )
}

/// Outline of the result, or a placeholder when there is nothing to show.
pub fn result_lines(view: &AppViewModel) -> Vec<String> {
    match &view.result {
        Some(result) if !result.is_empty() => result.lines(),
        Some(_) => vec!["(no matching nodes)".to_string()],
        None => Vec::new(),
    }
}
