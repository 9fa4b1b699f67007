use crate::case::model::CaseId;
use crate::config::{ReporterConfig, StatusCodes};
use crate::http::{ApiClient, Credentials, HttpError};
use crate::result::model::ResultEntry;
use crate::testrail::model::{
    AddResultsRequest, AddRunRequest, CreatedResult, CreatedRun, NewRun, Plan, ResultPayload,
    UpdatePlanRequest, UpdateRunRequest,
};
use serde_json::{json, Value};
use std::future::Future;
use tracing::debug;

/// The operations the reporter needs from a test-management service.
///
/// Every call is a single request; nothing is retried.
pub trait TestManagement: Clone + Send + Sync + 'static {
    fn create_run(
        &self,
        project_id: u64,
        run: &NewRun,
    ) -> impl Future<Output = Result<u64, HttpError>> + Send;

    fn fetch_plan(&self, plan_id: u64) -> impl Future<Output = Result<Plan, HttpError>> + Send;

    fn update_plan(
        &self,
        plan_id: u64,
        description: &str,
    ) -> impl Future<Output = Result<(), HttpError>> + Send;

    /// Replaces the full case list of the run.
    fn update_run_cases(
        &self,
        run_id: u64,
        case_ids: &[CaseId],
    ) -> impl Future<Output = Result<(), HttpError>> + Send;

    fn close_run(&self, run_id: u64) -> impl Future<Output = Result<(), HttpError>> + Send;

    /// Returns the created result IDs in the order TestRail answered with.
    fn submit_results(
        &self,
        run_id: u64,
        entries: &[ResultEntry],
    ) -> impl Future<Output = Result<Vec<u64>, HttpError>> + Send;

    fn attach_screenshot(
        &self,
        result_id: u64,
        path: &str,
    ) -> impl Future<Output = Result<(), HttpError>> + Send;
}

#[derive(Clone)]
pub struct TestRailClient {
    api: ApiClient,
    status_codes: StatusCodes,
}

impl TestRailClient {
    pub fn new(api: ApiClient, status_codes: StatusCodes) -> Self {
        Self { api, status_codes }
    }

    pub fn from_config(config: &ReporterConfig) -> Self {
        let api = ApiClient::new(
            &config.domain,
            Credentials {
                username: config.username.clone(),
                password: config.password.clone(),
            },
        );
        Self::new(api, config.status_codes)
    }

    pub fn result_payload(&self, entries: &[ResultEntry]) -> AddResultsRequest {
        AddResultsRequest {
            results: entries
                .iter()
                .map(|entry| ResultPayload::from_entry(entry, &self.status_codes))
                .collect(),
        }
    }
}

impl TestManagement for TestRailClient {
    async fn create_run(&self, project_id: u64, run: &NewRun) -> Result<u64, HttpError> {
        let created: CreatedRun = self
            .api
            .post(&format!("add_run/{}", project_id), &AddRunRequest::from(run))
            .await?;
        Ok(created.id)
    }

    async fn fetch_plan(&self, plan_id: u64) -> Result<Plan, HttpError> {
        self.api.get(&format!("get_plan/{}", plan_id)).await
    }

    async fn update_plan(&self, plan_id: u64, description: &str) -> Result<(), HttpError> {
        let _: Value = self
            .api
            .post(
                &format!("update_plan/{}", plan_id),
                &UpdatePlanRequest { description },
            )
            .await?;
        Ok(())
    }

    async fn update_run_cases(&self, run_id: u64, case_ids: &[CaseId]) -> Result<(), HttpError> {
        let _: Value = self
            .api
            .post(
                &format!("update_run/{}", run_id),
                &UpdateRunRequest {
                    include_all: false,
                    case_ids,
                },
            )
            .await?;
        Ok(())
    }

    async fn close_run(&self, run_id: u64) -> Result<(), HttpError> {
        let _: Value = self
            .api
            .post(&format!("close_run/{}", run_id), &json!({}))
            .await?;
        Ok(())
    }

    async fn submit_results(
        &self,
        run_id: u64,
        entries: &[ResultEntry],
    ) -> Result<Vec<u64>, HttpError> {
        let payload = self.result_payload(entries);
        debug!(run_id, count = payload.results.len(), "submitting results");
        let created: Vec<CreatedResult> = self
            .api
            .post(&format!("add_results_for_cases/{}", run_id), &payload)
            .await?;
        Ok(created.into_iter().map(|result| result.id).collect())
    }

    async fn attach_screenshot(&self, result_id: u64, path: &str) -> Result<(), HttpError> {
        self.api
            .post_file(&format!("add_attachment_to_result/{}", result_id), path)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::model::ResultStatus;
    use httpmock::prelude::*;

    fn client(server: &MockServer) -> TestRailClient {
        let api = ApiClient::new(
            &server.base_url(),
            Credentials {
                username: "ci@example.com".to_string(),
                password: "secret".to_string(),
            },
        );
        TestRailClient::new(api, StatusCodes { passed: 1, failed: 5 })
    }

    fn entry(case_id: u64, status: ResultStatus, elapsed_secs: Option<u64>) -> ResultEntry {
        ResultEntry::builder()
            .case_id(CaseId::new(case_id).unwrap())
            .status(status)
            .comment("Tested by Cypress\n".to_string())
            .maybe_elapsed_secs(elapsed_secs)
            .build()
    }

    #[test]
    fn payload_maps_status_and_omits_zero_elapsed() {
        let server_less = TestRailClient::new(
            ApiClient::new(
                "example.testrail.io",
                Credentials {
                    username: "u".to_string(),
                    password: "p".to_string(),
                },
            ),
            StatusCodes { passed: 1, failed: 4 },
        );
        let payload = server_less.result_payload(&[
            entry(10, ResultStatus::Passed, Some(1)),
            entry(20, ResultStatus::Failed, None),
        ]);
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"results": [
                {"case_id": 10, "status_id": 1, "comment": "Tested by Cypress", "elapsed": "1s"},
                {"case_id": 20, "status_id": 4, "comment": "Tested by Cypress"}
            ]})
        );
    }

    #[tokio::test]
    async fn create_run_sends_empty_case_list() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/index.php").json_body(json!({
                    "name": "Nightly",
                    "description": "Tested by Cypress",
                    "include_all": false,
                    "case_ids": [],
                    "suite_id": 3
                }));
                then.status(200).json_body(json!({"id": 812, "name": "Nightly"}));
            })
            .await;

        let run = NewRun::builder()
            .name("Nightly")
            .description("Tested by Cypress")
            .suite_id(3)
            .build();
        let run_id = client(&server).create_run(1, &run).await.unwrap();
        mock.assert_async().await;
        assert_eq!(run_id, 812);
    }

    #[tokio::test]
    async fn submit_results_returns_ids_in_response_order() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/index.php");
                then.status(200)
                    .json_body(json!([{"id": 1001, "test_id": 5}, {"id": 1002, "test_id": 6}]));
            })
            .await;

        let ids = client(&server)
            .submit_results(
                812,
                &[
                    entry(10, ResultStatus::Passed, None),
                    entry(20, ResultStatus::Failed, None),
                ],
            )
            .await
            .unwrap();
        assert_eq!(ids, vec![1001, 1002]);
    }

    #[tokio::test]
    async fn plan_without_description() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/index.php");
                then.status(200).json_body(json!({"id": 9, "description": null}));
            })
            .await;

        let plan = client(&server).fetch_plan(9).await.unwrap();
        assert_eq!(plan, Plan { id: 9, description: None });
    }

    #[tokio::test]
    async fn close_run_surfaces_remote_errors() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/index.php");
                then.status(403)
                    .json_body(json!({"error": "You are not allowed to close runs."}));
            })
            .await;

        let error = client(&server).close_run(812).await.unwrap_err();
        assert!(matches!(error, HttpError::Status { status_code: 403, .. }));
        assert_eq!(
            error.to_string(),
            "403 Forbidden >> You are not allowed to close runs."
        );
    }
}
