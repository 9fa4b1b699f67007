use crate::case::model::CaseId;
use crate::config::ReporterConfig;
use crate::run::model::{
    dashboard_link, dashboard_placeholder, RunEnvironment, RunMode, RunPhase, RunState,
    DATETIME_PLACEHOLDER, DEFAULT_RUN_NAME, TESTED_BY,
};
use crate::testrail::model::NewRun;
use crate::testrail::service::TestManagement;
use chrono::NaiveDateTime;
use tracing::{debug, error, info, warn};

/// Where a created run goes in TestRail and how it is labelled.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunSettings {
    pub project_id: Option<u64>,
    pub milestone_id: Option<u64>,
    pub suite_id: Option<u64>,
    pub plan_id: Option<u64>,
    pub run_name: Option<String>,
    pub custom_comment: Option<String>,
}

impl RunSettings {
    pub fn from_config(config: &ReporterConfig) -> Self {
        Self {
            project_id: config.project_id,
            milestone_id: config.milestone_id,
            suite_id: config.suite_id,
            plan_id: config.plan_id,
            run_name: config.run_name.clone(),
            custom_comment: config.custom_comment.clone(),
        }
    }
}

/// Owns the run state: creates or adopts the run, keeps its case list in
/// sync and closes it at the end when asked to.
pub struct RunLifecycle {
    state: RunState,
    settings: RunSettings,
}

impl RunLifecycle {
    pub fn new(run_id: Option<u64>, close_on_finish: bool, settings: RunSettings) -> Self {
        Self {
            state: RunState::new(run_id, close_on_finish),
            settings,
        }
    }

    pub fn from_config(config: &ReporterConfig) -> Self {
        Self::new(
            config.run_id,
            config.close_run,
            RunSettings::from_config(config),
        )
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn mode(&self) -> RunMode {
        self.state.mode
    }

    pub fn run_id(&self) -> Option<u64> {
        self.state.run_id
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    pub fn run_name(&self, started_at: NaiveDateTime) -> String {
        let template = self.settings.run_name.as_deref().unwrap_or(DEFAULT_RUN_NAME);
        template.replacen(
            DATETIME_PLACEHOLDER,
            &started_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            1,
        )
    }

    pub fn run_description(&self, environment: &RunEnvironment) -> String {
        let mut lines = vec![TESTED_BY.to_string()];
        lines.extend(environment.summary_lines());
        if let Some(custom) = self.settings.custom_comment.as_deref() {
            lines.push(custom.to_string());
        }
        lines.join("\n")
    }

    pub async fn start<C: TestManagement>(
        &mut self,
        client: &C,
        environment: &RunEnvironment,
        run_url: Option<&str>,
        started_at: NaiveDateTime,
    ) {
        if self.state.phase != RunPhase::Uninitialized {
            warn!(run_id = ?self.state.run_id, "run already started, ignoring");
            return;
        }

        match self.state.mode {
            RunMode::Reuse => self.state.phase = RunPhase::Active,
            RunMode::Create => self.create_run(client, environment, started_at).await,
        }

        if let (Some(plan_id), Some(run_url)) = (self.settings.plan_id, run_url) {
            self.link_dashboard_run(client, plan_id, &environment.browser_name, run_url)
                .await;
        }
    }

    async fn create_run<C: TestManagement>(
        &mut self,
        client: &C,
        environment: &RunEnvironment,
        started_at: NaiveDateTime,
    ) {
        let Some(project_id) = self.settings.project_id else {
            error!("Could not create TestRail run: no project ID configured");
            return;
        };
        let run = NewRun::builder()
            .name(self.run_name(started_at))
            .description(self.run_description(environment))
            .maybe_milestone_id(self.settings.milestone_id)
            .maybe_suite_id(self.settings.suite_id)
            .build();

        match client.create_run(project_id, &run).await {
            Ok(run_id) => {
                info!("TestRun created in TestRail: {}", run.name);
                debug!("New TestRail Run: R{}", run_id);
                self.state.run_id = Some(run_id);
                self.state.phase = RunPhase::Active;
            }
            Err(err) => {
                error!("Could not create TestRail run for project P{}: {}", project_id, err);
            }
        }
    }

    /// Swaps the "pending" dashboard placeholder in the plan description for
    /// a link to the dashboard run. Plans without the placeholder are left alone.
    async fn link_dashboard_run<C: TestManagement>(
        &self,
        client: &C,
        plan_id: u64,
        browser_name: &str,
        run_url: &str,
    ) {
        let plan = match client.fetch_plan(plan_id).await {
            Ok(plan) => plan,
            Err(err) => {
                error!("Could not load TestRail plan P{}: {}", plan_id, err);
                return;
            }
        };

        let placeholder = dashboard_placeholder(browser_name);
        let description = plan.description.unwrap_or_default();
        if !description.contains(&placeholder) {
            debug!(plan_id, "plan has no pending dashboard placeholder");
            return;
        }

        let updated = description.replace(&placeholder, &dashboard_link(browser_name, run_url));
        match client.update_plan(plan_id, &updated).await {
            Ok(()) => info!("TestPlan updated in TestRail"),
            Err(err) => error!("Could not update TestRail plan for plan ID {}: {}", plan_id, err),
        }
    }

    /// Adds the cases of a finished spec to a created run. Always pushes the
    /// whole accumulated list since TestRail replaces it on every update.
    pub async fn record_cases<C: TestManagement>(&mut self, client: &C, case_ids: &[CaseId]) {
        if self.state.mode != RunMode::Create {
            return;
        }
        let added = self.state.append_cases(case_ids);
        debug!(added, total = self.state.case_ids.len(), "recorded cases");

        let Some(run_id) = self.active_run_id() else {
            error!("Could not add TestRail test cases: the run was never created");
            return;
        };
        match client.update_run_cases(run_id, &self.state.case_ids).await {
            Ok(()) => info!("TestRun updated in TestRail: {}", run_id),
            Err(err) => error!("Could not add TestRail test cases to run R{}: {}", run_id, err),
        }
    }

    pub async fn finish<C: TestManagement>(&mut self, client: &C) {
        if self.state.mode != RunMode::Create {
            return;
        }
        if !self.state.close_on_finish {
            info!("Skipping closing of Test Run");
            return;
        }
        let Some(run_id) = self.active_run_id() else {
            warn!("Skipping closing of Test Run: no active run");
            return;
        };
        match client.close_run(run_id).await {
            Ok(()) => {
                self.state.phase = RunPhase::Closed;
                info!("TestRail Run: R{} is now closed", run_id);
            }
            Err(err) => error!("Could not close TestRail run R{}: {}", run_id, err),
        }
    }

    /// The run results can be written to, if any.
    pub fn active_run_id(&self) -> Option<u64> {
        match self.state.phase {
            RunPhase::Active => self.state.run_id,
            _ => None,
        }
    }
}
