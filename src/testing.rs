use crate::case::model::CaseId;
use crate::event::model::{
    BrowserDetails, RunStartDetails, RunnerConfig, Screenshot, SystemDetails, TestExecution,
    TestState, TestTitle,
};
use crate::http::HttpError;
use crate::result::model::ResultEntry;
use crate::run::model::RunEnvironment;
use crate::testrail::model::{NewRun, Plan};
use crate::testrail::service::TestManagement;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateRun { project_id: u64, run: NewRun },
    FetchPlan(u64),
    UpdatePlan(u64, String),
    UpdateRunCases { run_id: u64, case_ids: Vec<u64> },
    CloseRun(u64),
    SubmitResults { run_id: u64, entries: Vec<ResultEntry> },
    AttachScreenshot { result_id: u64, path: String },
}

/// In-memory stand-in for TestRail that records every call it receives.
/// Each `fail_*` switch makes the matching call answer with a 400.
#[derive(Clone, Default)]
pub struct RecordingClient {
    pub(crate) calls: Arc<Mutex<Vec<Call>>>,
    pub fail_create: bool,
    pub fail_submit: bool,
    pub fail_fetch_plan: bool,
    pub fail_update_plan: bool,
    pub fail_update_run: bool,
    pub fail_close: bool,
    pub fail_attach: bool,
    pub plan_description: Option<String>,
}

impl RecordingClient {
    pub const CREATED_RUN_ID: u64 = 812;
    pub const FIRST_RESULT_ID: u64 = 1000;

    pub fn failing_create() -> Self {
        Self {
            fail_create: true,
            ..Default::default()
        }
    }

    pub fn failing_submit() -> Self {
        Self {
            fail_submit: true,
            ..Default::default()
        }
    }

    pub fn with_plan_description(description: &str) -> Self {
        Self {
            plan_description: Some(description.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn rejected(message: &str) -> HttpError {
        HttpError::Status {
            status_code: 400,
            status_text: "Bad Request".to_string(),
            message: message.to_string(),
        }
    }
}

impl TestManagement for RecordingClient {
    async fn create_run(&self, project_id: u64, run: &NewRun) -> Result<u64, HttpError> {
        self.record(Call::CreateRun {
            project_id,
            run: run.clone(),
        });
        if self.fail_create {
            return Err(Self::rejected("Field :project_id is not a valid project."));
        }
        Ok(Self::CREATED_RUN_ID)
    }

    async fn fetch_plan(&self, plan_id: u64) -> Result<Plan, HttpError> {
        self.record(Call::FetchPlan(plan_id));
        if self.fail_fetch_plan {
            return Err(Self::rejected("Field :plan_id is not a valid test plan."));
        }
        Ok(Plan {
            id: plan_id,
            description: self.plan_description.clone(),
        })
    }

    async fn update_plan(&self, plan_id: u64, description: &str) -> Result<(), HttpError> {
        self.record(Call::UpdatePlan(plan_id, description.to_string()));
        if self.fail_update_plan {
            return Err(Self::rejected("Field :description is too long."));
        }
        Ok(())
    }

    async fn update_run_cases(&self, run_id: u64, case_ids: &[CaseId]) -> Result<(), HttpError> {
        self.record(Call::UpdateRunCases {
            run_id,
            case_ids: case_ids.iter().map(CaseId::value).collect(),
        });
        if self.fail_update_run {
            return Err(Self::rejected("Field :case_ids contains an invalid case."));
        }
        Ok(())
    }

    async fn close_run(&self, run_id: u64) -> Result<(), HttpError> {
        self.record(Call::CloseRun(run_id));
        if self.fail_close {
            return Err(Self::rejected("Field :run_id is not a valid test run."));
        }
        Ok(())
    }

    async fn submit_results(
        &self,
        run_id: u64,
        entries: &[ResultEntry],
    ) -> Result<Vec<u64>, HttpError> {
        self.record(Call::SubmitResults {
            run_id,
            entries: entries.to_vec(),
        });
        if self.fail_submit {
            return Err(Self::rejected("Field :results cannot be empty."));
        }
        Ok((0..entries.len() as u64)
            .map(|index| Self::FIRST_RESULT_ID + index)
            .collect())
    }

    async fn attach_screenshot(&self, result_id: u64, path: &str) -> Result<(), HttpError> {
        self.record(Call::AttachScreenshot {
            result_id,
            path: path.to_string(),
        });
        if self.fail_attach {
            return Err(Self::rejected("Field :attachment is not a valid image."));
        }
        Ok(())
    }
}

pub fn case_ids(ids: &[u64]) -> Vec<CaseId> {
    ids.iter().filter_map(|id| CaseId::new(*id)).collect()
}

pub fn run_start_details() -> RunStartDetails {
    RunStartDetails {
        cypress_version: "13.6.0".to_string(),
        browser: BrowserDetails {
            name: "chrome".to_string(),
            display_name: "Chrome".to_string(),
            version: "120.0".to_string(),
        },
        system: SystemDetails {
            os_name: "linux".to_string(),
            os_version: "Ubuntu 22.04".to_string(),
        },
        config: RunnerConfig {
            base_url: Some("https://shop.local".to_string()),
        },
        run_url: None,
    }
}

pub fn environment() -> RunEnvironment {
    RunEnvironment::from_details(&run_start_details())
}

pub fn test_execution(
    test_id: &str,
    title: &str,
    state: TestState,
    duration: u64,
    error: Option<&str>,
) -> TestExecution {
    TestExecution {
        test_id: test_id.to_string(),
        title: TestTitle::Plain(title.to_string()),
        state,
        duration: Some(duration),
        display_error: error.map(str::to_string),
    }
}

pub fn screenshot(test_id: &str, path: &str, attempt: u32) -> Screenshot {
    Screenshot {
        test_id: test_id.to_string(),
        path: path.to_string(),
        test_attempt_index: attempt,
        taken_at: None,
    }
}
