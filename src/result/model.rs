use crate::case::model::CaseId;
use bon::Builder;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResultStatus {
    Passed,
    Failed,
}

/// One result line of a batch submission.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Builder)]
pub struct ResultEntry {
    pub case_id: CaseId,
    pub status: ResultStatus,
    pub comment: String,
    /// Whole seconds; `None` when the test took less than half a second.
    pub elapsed_secs: Option<u64>,
    pub screenshot_path: Option<String>,
}

impl ResultEntry {
    pub fn elapsed(&self) -> Option<String> {
        self.elapsed_secs.map(|secs| format!("{}s", secs))
    }
}
