use crate::case::model::CaseId;
use crate::event::model::RunStartDetails;
use serde::{Deserialize, Serialize};

pub const TESTED_BY: &str = "Tested by Cypress";
pub const DEFAULT_RUN_NAME: &str = "Cypress Run (__datetime__)";
pub const DATETIME_PLACEHOLDER: &str = "__datetime__";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Eq, PartialEq)]
pub enum RunMode {
    /// A new run is created at start and filled with the cases we discover.
    Create,
    /// Results go into a run that somebody else owns.
    Reuse,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Eq, PartialEq)]
pub enum RunPhase {
    Uninitialized,
    Active,
    Closed,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RunState {
    pub mode: RunMode,
    pub phase: RunPhase,
    pub run_id: Option<u64>,
    pub case_ids: Vec<CaseId>,
    pub close_on_finish: bool,
}

impl RunState {
    pub fn new(run_id: Option<u64>, close_on_finish: bool) -> Self {
        Self {
            mode: if run_id.is_some() {
                RunMode::Reuse
            } else {
                RunMode::Create
            },
            phase: RunPhase::Uninitialized,
            run_id,
            case_ids: Vec::new(),
            close_on_finish,
        }
    }

    /// Appends unseen case IDs, keeping the order of discovery.
    /// Returns how many were new.
    pub fn append_cases(&mut self, case_ids: &[CaseId]) -> usize {
        let before = self.case_ids.len();
        for case_id in case_ids {
            if !self.case_ids.contains(case_id) {
                self.case_ids.push(*case_id);
            }
        }
        self.case_ids.len() - before
    }
}

/// What the runner told us about the machine the tests run on.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RunEnvironment {
    pub cypress_version: String,
    pub browser: String,
    pub browser_name: String,
    pub system: String,
    pub base_url: String,
}

impl RunEnvironment {
    pub fn from_details(details: &RunStartDetails) -> Self {
        Self {
            cypress_version: details.cypress_version.clone(),
            browser: format!(
                "{} ({})",
                details.browser.display_name, details.browser.version
            ),
            browser_name: details.browser.name.clone(),
            system: format!(
                "{} ({})",
                details.system.os_name, details.system.os_version
            ),
            base_url: details.config.base_url.clone().unwrap_or_default(),
        }
    }

    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("Cypress: {}", self.cypress_version),
            format!("Browser: {}", self.browser),
            format!("Base URL: {}", self.base_url),
            format!("System: {}", self.system),
        ]
    }
}

pub fn dashboard_placeholder(browser_name: &str) -> String {
    format!(
        "Cypress Dashboard Run - {} - Execution start pending (this will update when it starts)",
        browser_name
    )
}

pub fn dashboard_link(browser_name: &str, run_url: &str) -> String {
    format!("[Cypress Dashboard Run - {}]({})", browser_name, run_url)
}
