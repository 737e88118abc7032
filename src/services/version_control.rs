use async_trait::async_trait;

use crate::domain::branch::BranchName;
use crate::error::AppResult;

#[async_trait]
pub trait VersionControlService: Send + Sync {
    /// Summary of unstaged changes; empty when the working tree is clean.
    async fn diff_stat(&self) -> AppResult<String>;
    async fn current_branch(&self) -> AppResult<BranchName>;
    async fn last_commit_message(&self) -> AppResult<String>;
    async fn amend_commit_message(&self, message: &str) -> AppResult<()>;
    /// Overwrites the remote branch of the same name.
    async fn force_push(&self, branch: &BranchName) -> AppResult<()>;
}
