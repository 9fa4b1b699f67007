use thiserror::Error;
use tracing::warn;

pub const ENV_DOMAIN: &str = "TESTRAIL_DOMAIN";
pub const ENV_USERNAME: &str = "TESTRAIL_USERNAME";
pub const ENV_PASSWORD: &str = "TESTRAIL_PASSWORD";
pub const ENV_PROJECT_ID: &str = "TESTRAIL_PROJECT_ID";
pub const ENV_MILESTONE_ID: &str = "TESTRAIL_MILESTONE_ID";
pub const ENV_SUITE_ID: &str = "TESTRAIL_SUITE_ID";
pub const ENV_RUN_ID: &str = "TESTRAIL_RUN_ID";
pub const ENV_PLAN_ID: &str = "TESTRAIL_PLAN_ID";
pub const ENV_RUN_NAME: &str = "TESTRAIL_RUN_NAME";
pub const ENV_RUN_CLOSE: &str = "TESTRAIL_RUN_CLOSE";
pub const ENV_SCREENSHOTS: &str = "TESTRAIL_SCREENSHOTS";
pub const ENV_STATUS_PASSED: &str = "TESTRAIL_STATUS_PASSED";
pub const ENV_STATUS_FAILED: &str = "TESTRAIL_STATUS_FAILED";
pub const ENV_CUSTOM_COMMENT: &str = "TESTRAIL_CUSTOM_COMMENT";
pub const ENV_LISTEN_ADDR: &str = "RELAY_LISTEN_ADDR";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_STATUS_PASSED: u32 = 1;
pub const DEFAULT_STATUS_FAILED: u32 = 5;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
    #[error("either TESTRAIL_PROJECT_ID or TESTRAIL_RUN_ID must be set")]
    NoProjectOrRun,
}

/// TestRail status codes used for the two result states we report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusCodes {
    pub passed: u32,
    pub failed: u32,
}

impl Default for StatusCodes {
    fn default() -> Self {
        Self {
            passed: DEFAULT_STATUS_PASSED,
            failed: DEFAULT_STATUS_FAILED,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReporterConfig {
    pub domain: String,
    pub username: String,
    pub password: String,
    pub project_id: Option<u64>,
    pub milestone_id: Option<u64>,
    pub suite_id: Option<u64>,
    pub run_id: Option<u64>,
    pub plan_id: Option<u64>,
    pub run_name: Option<String>,
    pub close_run: bool,
    pub screenshots: bool,
    pub status_codes: StatusCodes,
    pub custom_comment: Option<String>,
}

impl ReporterConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`; blank values count as unset.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let domain = get(ENV_DOMAIN).ok_or(ConfigError::Missing(ENV_DOMAIN))?;
        let username = get(ENV_USERNAME).ok_or(ConfigError::Missing(ENV_USERNAME))?;
        let password = get(ENV_PASSWORD).ok_or(ConfigError::Missing(ENV_PASSWORD))?;

        let project_id = parse_id(ENV_PROJECT_ID, get(ENV_PROJECT_ID), 'P')?;
        let run_id = parse_id(ENV_RUN_ID, get(ENV_RUN_ID), 'R')?;
        if project_id.is_none() && run_id.is_none() {
            return Err(ConfigError::NoProjectOrRun);
        }

        let status_codes = StatusCodes {
            passed: parse_status(ENV_STATUS_PASSED, get(ENV_STATUS_PASSED))?
                .unwrap_or(DEFAULT_STATUS_PASSED),
            failed: parse_status(ENV_STATUS_FAILED, get(ENV_STATUS_FAILED))?
                .unwrap_or(DEFAULT_STATUS_FAILED),
        };

        Ok(Self {
            domain,
            username,
            password,
            project_id,
            milestone_id: parse_id(ENV_MILESTONE_ID, get(ENV_MILESTONE_ID), 'M')?,
            suite_id: parse_id(ENV_SUITE_ID, get(ENV_SUITE_ID), 'S')?,
            run_id,
            plan_id: parse_id(ENV_PLAN_ID, get(ENV_PLAN_ID), 'P')?,
            run_name: get(ENV_RUN_NAME),
            close_run: parse_flag(ENV_RUN_CLOSE, get(ENV_RUN_CLOSE))?,
            screenshots: parse_flag(ENV_SCREENSHOTS, get(ENV_SCREENSHOTS))?,
            status_codes,
            custom_comment: get(ENV_CUSTOM_COMMENT),
        })
    }

    /// A configured run ID means results go into that run instead of a new one.
    pub fn reuses_run(&self) -> bool {
        self.run_id.is_some()
    }
}

/// Whether the relay reports anything at all. Decided once at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum ReporterMode {
    Disabled,
    Enabled(Box<ReporterConfig>),
}

impl ReporterMode {
    pub fn from_env() -> Self {
        Self::resolve(ReporterConfig::from_env())
    }

    pub fn resolve(config: Result<ReporterConfig, ConfigError>) -> Self {
        match config {
            Ok(config) => ReporterMode::Enabled(Box::new(config)),
            Err(err) => {
                warn!("TestRail reporting disabled: {}", err);
                ReporterMode::Disabled
            }
        }
    }
}

pub fn listen_addr() -> String {
    std::env::var(ENV_LISTEN_ADDR)
        .ok()
        .filter(|addr| !addr.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
}

/// TestRail shows IDs with a one-letter prefix (`R12`, `P3`); accept both forms.
fn parse_id(
    name: &'static str,
    value: Option<String>,
    prefix: char,
) -> Result<Option<u64>, ConfigError> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let digits = raw
        .strip_prefix(prefix)
        .or_else(|| raw.strip_prefix(prefix.to_ascii_lowercase()))
        .unwrap_or(&raw);
    match digits.parse::<u64>() {
        Ok(id) if id > 0 => Ok(Some(id)),
        _ => Err(ConfigError::Invalid { name, value: raw }),
    }
}

fn parse_status(name: &'static str, value: Option<String>) -> Result<Option<u32>, ConfigError> {
    value
        .map(|raw| {
            raw.parse::<u32>()
                .map_err(|_| ConfigError::Invalid { name, value: raw })
        })
        .transpose()
}

fn parse_flag(name: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    let Some(raw) = value else {
        return Ok(false);
    };
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid { name, value: raw }),
    }
}
