use crate::case::model::CaseId;
use crate::case::parser::extract_case_ids;
use crate::config::ReporterConfig;
use crate::event::model::{RunStartDetails, SpecDetails, SpecResults};
use crate::result::model::ResultEntry;
use crate::result::service::{build_results, CommentContext};
use crate::run::model::{RunEnvironment, RunMode};
use crate::run::service::RunLifecycle;
use crate::screenshot::select_failure_screenshot;
use crate::testrail::service::TestManagement;
use chrono::Local;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error, PartialEq)]
pub enum ReportError {
    #[error("{0} received before before:run")]
    NotStarted(&'static str),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SpecReport {
    pub spec: String,
    pub run_id: Option<u64>,
    pub submitted: usize,
}

/// Reacts to the runner's lifecycle events and reports into TestRail.
///
/// Remote failures are logged and swallowed; only events arriving out of
/// order are returned as errors.
pub struct Reporter<C: TestManagement> {
    client: C,
    lifecycle: RunLifecycle,
    screenshots: bool,
    environment: Option<RunEnvironment>,
    uploads: Vec<JoinHandle<()>>,
}

impl<C: TestManagement> Reporter<C> {
    pub fn new(client: C, lifecycle: RunLifecycle, screenshots: bool) -> Self {
        Self {
            client,
            lifecycle,
            screenshots,
            environment: None,
            uploads: vec![],
        }
    }

    pub fn from_config(client: C, config: &ReporterConfig) -> Self {
        Self::new(
            client,
            RunLifecycle::from_config(config),
            config.screenshots,
        )
    }

    pub fn lifecycle(&self) -> &RunLifecycle {
        &self.lifecycle
    }

    /// Only the first `before:run` counts, whether or not the run could be created.
    pub async fn on_run_start(&mut self, details: &RunStartDetails) {
        if self.environment.is_some() {
            warn!("before:run received twice, ignoring");
            return;
        }
        let environment = RunEnvironment::from_details(details);
        self.log_banner(&environment);
        self.lifecycle
            .start(
                &self.client,
                &environment,
                details.run_url.as_deref(),
                Local::now().naive_local(),
            )
            .await;
        self.environment = Some(environment);
    }

    pub async fn on_spec_finish(
        &mut self,
        spec: &SpecDetails,
        results: &SpecResults,
    ) -> Result<SpecReport, ReportError> {
        let Some(environment) = self.environment.as_ref() else {
            return Err(ReportError::NotStarted("after:spec"));
        };

        let found: Vec<(usize, Vec<CaseId>)> = results
            .tests
            .iter()
            .enumerate()
            .map(|(index, test)| (index, extract_case_ids(&test.title())))
            .collect();

        let context = CommentContext {
            mode: self.lifecycle.mode(),
            environment,
            spec_name: &spec.name,
            custom_comment: self.lifecycle.settings().custom_comment.as_deref(),
        };
        let entries: Vec<ResultEntry> = found
            .iter()
            .flat_map(|(index, case_ids)| {
                let test = &results.tests[*index];
                let screenshot = select_failure_screenshot(&test.test_id, &results.screenshots);
                build_results(test, case_ids, screenshot, &context)
            })
            .collect();

        if self.lifecycle.mode() == RunMode::Create {
            let spec_cases: Vec<CaseId> = found
                .into_iter()
                .flat_map(|(_, case_ids)| case_ids)
                .collect();
            self.lifecycle.record_cases(&self.client, &spec_cases).await;
        }

        let submitted = self.submit(&entries).await;
        Ok(SpecReport {
            spec: spec.name.clone(),
            run_id: self.lifecycle.run_id(),
            submitted,
        })
    }

    pub async fn on_run_finish(&mut self) -> Result<(), ReportError> {
        if self.environment.is_none() {
            return Err(ReportError::NotStarted("after:run"));
        }
        self.lifecycle.finish(&self.client).await;

        let pending = std::mem::take(&mut self.uploads);
        if !pending.is_empty() {
            debug!(batches = pending.len(), "waiting for screenshot uploads");
        }
        for outcome in join_all(pending).await {
            if let Err(err) = outcome {
                error!("screenshot upload task failed: {}", err);
            }
        }
        Ok(())
    }

    async fn submit(&mut self, entries: &[ResultEntry]) -> usize {
        if entries.is_empty() {
            debug!("no reportable results in spec");
            return 0;
        }
        let Some(run_id) = self.lifecycle.active_run_id() else {
            error!(
                "Could not send list of TestRail results: no active run for {}",
                case_list(entries)
            );
            return 0;
        };

        match self.client.submit_results(run_id, entries).await {
            Ok(result_ids) => {
                info!("Results sent to TestRail for: {}", case_list(entries));
                if self.screenshots {
                    self.spawn_uploads(entries, &result_ids);
                }
                entries.len()
            }
            Err(err) => {
                error!("Could not send list of TestRail results: {}", err);
                0
            }
        }
    }

    /// TestRail answers a batch without case IDs, so result IDs are matched
    /// to entries by position.
    fn spawn_uploads(&mut self, entries: &[ResultEntry], result_ids: &[u64]) {
        if entries.len() != result_ids.len() {
            warn!(
                sent = entries.len(),
                received = result_ids.len(),
                "result count mismatch, not attaching screenshots"
            );
            return;
        }
        let uploads: Vec<(CaseId, u64, String)> = entries
            .iter()
            .zip(result_ids)
            .filter_map(|(entry, result_id)| {
                entry
                    .screenshot_path
                    .clone()
                    .map(|path| (entry.case_id, *result_id, path))
            })
            .collect();
        if uploads.is_empty() {
            return;
        }

        let client = self.client.clone();
        self.uploads.push(tokio::spawn(async move {
            join_all(uploads.iter().map(|(case_id, result_id, path)| {
                let client = &client;
                async move {
                    debug!("sending screenshot to TestRail for TestCase {}", case_id);
                    if let Err(err) = client.attach_screenshot(*result_id, path).await {
                        error!(
                            result_id,
                            "Could not attach screenshot for TestCase {}: {}", case_id, err
                        );
                    }
                }
            }))
            .await;
        }));
    }

    fn log_banner(&self, environment: &RunEnvironment) {
        info!("Starting TestRail Integration v{}", env!("CARGO_PKG_VERSION"));
        info!("Cypress: {}", environment.cypress_version);
        info!("Browser: {}", environment.browser);
        info!("System: {}", environment.system);
        info!("Base URL: {}", environment.base_url);
        let settings = self.lifecycle.settings();
        match self.lifecycle.mode() {
            RunMode::Create => {
                info!("TestRail Mode: Create Run");
                info!("TestRail Project ID: {:?}", settings.project_id);
                info!("TestRail Milestone ID: {:?}", settings.milestone_id);
                info!("TestRail Suite ID: {:?}", settings.suite_id);
                info!("TestRail Run Name: {:?}", settings.run_name);
            }
            RunMode::Reuse => {
                info!("TestRail Mode: Use existing Run");
                info!("TestRail Run ID: {:?}", self.lifecycle.run_id());
                info!("TestRail Plan ID: {:?}", settings.plan_id);
            }
        }
        info!("Screenshots: {}", self.screenshots);
    }
}

fn case_list(entries: &[ResultEntry]) -> String {
    entries
        .iter()
        .map(|entry| entry.case_id.to_string())
        .collect::<Vec<String>>()
        .join(",")
}
