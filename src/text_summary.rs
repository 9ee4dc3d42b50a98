//! Text summary builder for CLI output.
//!
//! This module formats human-readable lines describing one dispatch for text mode.

use crate::model::{DispatchOutcome, DispatchReport};

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

/// Build a text summary from a dispatch report.
pub(crate) fn build_text_summary(report: &DispatchReport) -> TextSummary {
    let mut lines = Vec::new();

    lines.push(format!("Topic: {}", report.topic));
    lines.push(format!("Type:  {}", report.message_type));
    lines.push(format!(
        "Goal:  map '{}' x {:.2} y {:.2}",
        report.request.target_map.trim(),
        report.request.target_x,
        report.request.target_y
    ));

    if let Some(payload) = report.payload.as_deref() {
        lines.push("Payload:".to_string());
        lines.extend(payload.lines().map(|l| format!("  {l}")));
    }

    match (&report.outcome, report.dry_run) {
        (DispatchOutcome::Sent, true) => lines.push("Dry run: goal not published".to_string()),
        (DispatchOutcome::Sent, false) => lines.push("Goal published!".to_string()),
        (DispatchOutcome::Failed(reason), _) => lines.push(format!("Error: {reason}")),
    }

    TextSummary { lines }
}
