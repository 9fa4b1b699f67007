use crate::case::model::CaseId;
use crate::config::StatusCodes;
use crate::result::model::{ResultEntry, ResultStatus};
use bon::Builder;
use serde::{Deserialize, Serialize};

/// A run we ask TestRail to create; cases are added spec by spec later on.
#[derive(Clone, Debug, PartialEq, Builder)]
pub struct NewRun {
    #[builder(into)]
    pub name: String,
    #[builder(into)]
    pub description: String,
    pub milestone_id: Option<u64>,
    pub suite_id: Option<u64>,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct AddRunRequest {
    pub name: String,
    pub description: String,
    pub include_all: bool,
    pub case_ids: Vec<CaseId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suite_id: Option<u64>,
}

impl From<&NewRun> for AddRunRequest {
    fn from(run: &NewRun) -> Self {
        Self {
            name: run.name.clone(),
            description: run.description.clone(),
            include_all: false,
            case_ids: vec![],
            milestone_id: run.milestone_id,
            suite_id: run.suite_id,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct CreatedRun {
    pub id: u64,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Plan {
    pub id: u64,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct UpdatePlanRequest<'a> {
    pub description: &'a str,
}

#[derive(Serialize, Debug)]
pub struct UpdateRunRequest<'a> {
    pub include_all: bool,
    pub case_ids: &'a [CaseId],
}

#[derive(Serialize, Debug, PartialEq)]
pub struct AddResultsRequest {
    pub results: Vec<ResultPayload>,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct ResultPayload {
    pub case_id: CaseId,
    pub status_id: u32,
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed: Option<String>,
}

impl ResultPayload {
    pub fn from_entry(entry: &ResultEntry, status_codes: &StatusCodes) -> Self {
        Self {
            case_id: entry.case_id,
            status_id: match entry.status {
                ResultStatus::Passed => status_codes.passed,
                ResultStatus::Failed => status_codes.failed,
            },
            comment: entry.comment.trim().to_string(),
            elapsed: entry.elapsed(),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct CreatedResult {
    pub id: u64,
}
