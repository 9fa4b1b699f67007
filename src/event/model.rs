use serde::{Deserialize, Serialize};

/// Payload of the runner's `before:run` event.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunStartDetails {
    pub cypress_version: String,
    pub browser: BrowserDetails,
    pub system: SystemDetails,
    #[serde(default)]
    pub config: RunnerConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_url: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BrowserDetails {
    pub name: String,
    pub display_name: String,
    pub version: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SystemDetails {
    pub os_name: String,
    pub os_version: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunnerConfig {
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Payload of the runner's `after:spec` event.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SpecFinished {
    pub spec: SpecDetails,
    pub results: SpecResults,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SpecDetails {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SpecResults {
    #[serde(default)]
    pub tests: Vec<TestExecution>,
    #[serde(default)]
    pub screenshots: Vec<Screenshot>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestExecution {
    pub test_id: String,
    pub title: TestTitle,
    pub state: TestState,
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub display_error: Option<String>,
}

impl TestExecution {
    pub fn title(&self) -> String {
        self.title.joined()
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration.unwrap_or(0)
    }

    pub fn error(&self) -> Option<&str> {
        self.display_error
            .as_deref()
            .map(str::trim)
            .filter(|error| !error.is_empty())
    }
}

/// The runner sends either a plain title or the whole describe chain.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum TestTitle {
    Plain(String),
    Chain(Vec<String>),
}

impl TestTitle {
    pub fn joined(&self) -> String {
        match self {
            TestTitle::Plain(title) => title.clone(),
            TestTitle::Chain(parts) => parts.join(" "),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TestState {
    Passed,
    Failed,
    Pending,
    Skipped,
    #[serde(other)]
    Other,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Screenshot {
    pub test_id: String,
    pub path: String,
    #[serde(default)]
    pub test_attempt_index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taken_at: Option<String>,
}
