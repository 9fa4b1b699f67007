use crate::case::model::CaseId;
use crate::event::model::{Screenshot, TestExecution, TestState};
use crate::result::model::{ResultEntry, ResultStatus};
use crate::run::model::{RunEnvironment, RunMode, TESTED_BY};

/// Everything besides the test itself that ends up in a result comment.
pub struct CommentContext<'a> {
    pub mode: RunMode,
    pub environment: &'a RunEnvironment,
    pub spec_name: &'a str,
    pub custom_comment: Option<&'a str>,
}

pub fn build_results(
    execution: &TestExecution,
    case_ids: &[CaseId],
    screenshot: Option<&Screenshot>,
    context: &CommentContext,
) -> Vec<ResultEntry> {
    if execution.state == TestState::Pending || case_ids.is_empty() {
        return vec![];
    }

    let (status, screenshot_path) = match execution.state {
        TestState::Passed => (ResultStatus::Passed, None),
        _ => (
            ResultStatus::Failed,
            screenshot.map(|screenshot| screenshot.path.clone()),
        ),
    };
    let comment = build_comment(execution, context);
    let elapsed_secs = elapsed_seconds(execution.duration_ms());

    case_ids
        .iter()
        .map(|case_id| {
            ResultEntry::builder()
                .case_id(*case_id)
                .status(status)
                .comment(comment.clone())
                .maybe_elapsed_secs(elapsed_secs)
                .maybe_screenshot_path(screenshot_path.clone())
                .build()
        })
        .collect()
}

/// A created run already carries the environment in its description, so
/// only reused runs repeat it per result.
pub fn build_comment(execution: &TestExecution, context: &CommentContext) -> String {
    let mut lines = vec![TESTED_BY.to_string()];
    if context.mode == RunMode::Reuse {
        lines.extend(context.environment.summary_lines());
        lines.push(format!("Spec: {}", context.spec_name));
        if let Some(custom) = context.custom_comment.filter(|c| !c.is_empty()) {
            lines.push(custom.to_string());
        }
    }
    if let Some(error) = execution.error() {
        lines.push(format!("Error: {}", error));
    }
    lines.join("\n")
}

/// Rounds half up to whole seconds. TestRail rejects `0s`, so that is `None`.
pub fn elapsed_seconds(duration_ms: u64) -> Option<u64> {
    let secs = duration_ms.saturating_add(500) / 1000;
    (secs > 0).then_some(secs)
}
