use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

pub const DEFAULT_ISSUE_TYPE: &str = "Chore";
pub const DEFAULT_TARGET_BRANCH: &str = "main";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

#[derive(Clone)]
pub struct AppConfig {
    pub github_token: String,
    pub github_api_url: String,
    pub source_org: String,
    pub target_org: String,
    pub target_repo: String,
    pub target_branch: String,
    pub jira_token: String,
    pub jira_base_url: String,
    pub jira_username: String,
    pub jira_account_id: String,
    pub jira_project_key: String,
    pub jira_issue_type: String,
    pub jira_board_id: Option<String>,
    pub jira_sprint_field: Option<String>,
    pub workspace_root: PathBuf,
}

/// Board and custom field needed to attach a new issue to the active sprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SprintSettings {
    pub board_id: u64,
    pub field_name: String,
}

impl AppConfig {
    pub fn load(workspace_hint: &Path) -> AppResult<Self> {
        Self::from_lookup(workspace_hint, |name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(workspace_hint: &Path, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let require = |name: &'static str| {
            read(name).ok_or_else(|| AppError::Configuration(format!("{name} env var must be set")))
        };

        // Tokens are checked before anything else so the user sees the most likely mistake first.
        let github_token = read("GITHUB_TOKEN").ok_or(AppError::MissingToken("GITHUB_TOKEN"))?;
        let jira_token = read("JIRA_TOKEN").ok_or(AppError::MissingToken("JIRA_TOKEN"))?;

        Ok(Self {
            github_token,
            github_api_url: read("GITHUB_API_URL")
                .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
            source_org: require("SOURCE_GITHUB_ORG")?,
            target_org: require("TARGET_GITHUB_ORG")?,
            target_repo: require("TARGET_GITHUB_REPO")?,
            target_branch: read("TARGET_GITHUB_BRANCH")
                .unwrap_or_else(|| DEFAULT_TARGET_BRANCH.to_string()),
            jira_token,
            jira_base_url: require("JIRA_URL")?,
            jira_username: require("JIRA_USER_NAME")?,
            jira_account_id: require("JIRA_ACCOUNT_ID")?,
            jira_project_key: require("JIRA_PROJECT_NAME")?,
            jira_issue_type: read("JIRA_ISSUE_TYPE")
                .unwrap_or_else(|| DEFAULT_ISSUE_TYPE.to_string()),
            jira_board_id: read("JIRA_BOARD_ID"),
            jira_sprint_field: read("JIRA_SPRINT_FIELD_NAME"),
            workspace_root: workspace_hint.to_path_buf(),
        })
    }

    pub fn sprint_settings(&self) -> AppResult<SprintSettings> {
        let raw_board_id = self.jira_board_id.as_deref().ok_or_else(|| {
            AppError::Configuration(
                "JIRA_BOARD_ID env var must be set to add issues to the current sprint"
                    .to_string(),
            )
        })?;
        let board_id = raw_board_id.parse::<u64>().map_err(|_| {
            AppError::Configuration(format!(
                "JIRA_BOARD_ID must be a numeric board id, got '{raw_board_id}'"
            ))
        })?;
        let field_name = self.jira_sprint_field.clone().ok_or_else(|| {
            AppError::Configuration(
                "JIRA_SPRINT_FIELD_NAME env var must be set to add issues to the current sprint"
                    .to_string(),
            )
        })?;
        Ok(SprintSettings {
            board_id,
            field_name,
        })
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("github_token", &mask_secret(&self.github_token))
            .field("github_api_url", &self.github_api_url)
            .field("source_org", &self.source_org)
            .field("target_org", &self.target_org)
            .field("target_repo", &self.target_repo)
            .field("target_branch", &self.target_branch)
            .field("jira_token", &mask_secret(&self.jira_token))
            .field("jira_base_url", &self.jira_base_url)
            .field("jira_username", &self.jira_username)
            .field("jira_account_id", &self.jira_account_id)
            .field("jira_project_key", &self.jira_project_key)
            .field("jira_issue_type", &self.jira_issue_type)
            .field("jira_board_id", &self.jira_board_id)
            .field("jira_sprint_field", &self.jira_sprint_field)
            .field("workspace_root", &self.workspace_root)
            .finish()
    }
}

fn mask_secret(token: &str) -> String {
    match token.chars().count() {
        0 => "<not set>".to_string(),
        len if len > 6 => {
            let prefix: String = token.chars().take(3).collect();
            let suffix: String = token.chars().skip(len - 3).collect();
            format!("{prefix}***{suffix}")
        }
        _ => "***".to_string(),
    }
}
