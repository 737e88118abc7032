use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{CodeHostService, IssueTrackerService, VersionControlService};

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub version_control: Arc<dyn VersionControlService>,
    pub issue_tracker: Arc<dyn IssueTrackerService>,
    pub code_host: Arc<dyn CodeHostService>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        version_control: Arc<dyn VersionControlService>,
        issue_tracker: Arc<dyn IssueTrackerService>,
        code_host: Arc<dyn CodeHostService>,
    ) -> Self {
        Self {
            config,
            version_control,
            issue_tracker,
            code_host,
        }
    }
}
