use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueKey(String);

impl IssueKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Tracker project prefix, used to spot titles that already reference an issue.
#[derive(Debug, Clone)]
pub struct ProjectKey {
    key: String,
    pattern: Regex,
}

impl ProjectKey {
    pub fn new(key: &str) -> AppResult<Self> {
        let key = key.trim();
        if key.is_empty() {
            return Err(AppError::Configuration(
                "project key must not be empty".to_string(),
            ));
        }
        let pattern = Regex::new(&format!(r"^{}-\d+", regex::escape(key)))
            .map_err(|err| AppError::Configuration(format!("invalid project key '{key}': {err}")))?;
        Ok(Self {
            key: key.to_string(),
            pattern,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    pub fn find_in_title(&self, title: &str) -> Option<IssueKey> {
        self.pattern
            .find(title)
            .map(|found| IssueKey::new(found.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IssueDraft {
    pub project_key: String,
    pub issue_type: String,
    pub assignee_account_id: String,
    pub reporter_account_id: String,
    pub summary: String,
    pub description: String,
    /// Additional tracker fields keyed by field id, e.g. the sprint custom field.
    pub extra_fields: Map<String, Value>,
}

impl IssueDraft {
    pub fn assign_sprint(&mut self, field_name: &str, sprint: &Sprint) {
        self.extra_fields
            .insert(field_name.to_string(), Value::from(sprint.id));
    }
}

#[derive(Debug, Clone)]
pub struct Ticket {
    pub key: IssueKey,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprint {
    pub id: u64,
    pub name: String,
    pub state: String,
}
