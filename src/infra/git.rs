use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::domain::branch::BranchName;
use crate::error::{AppError, AppResult};
use crate::services::VersionControlService;

const REMOTE: &str = "origin";

pub struct GitCli {
    workspace_root: PathBuf,
}

impl GitCli {
    pub fn new(workspace_root: PathBuf) -> Self {
        Self { workspace_root }
    }

    async fn git(&self, args: &[&str]) -> AppResult<String> {
        debug!(?args, "running git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workspace_root)
            .output()
            .await
            .map_err(|err| AppError::VersionControl(format!("failed to run git: {err}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::VersionControl(format!(
                "`git {}` failed ({}): {}",
                args.join(" "),
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl VersionControlService for GitCli {
    async fn diff_stat(&self) -> AppResult<String> {
        self.git(&["diff", "--stat"]).await
    }

    async fn current_branch(&self) -> AppResult<BranchName> {
        let output = self.git(&["rev-parse", "--abbrev-ref", "HEAD"]).await?;
        let name = output.trim();
        if name.is_empty() || name == "HEAD" {
            return Err(AppError::VersionControl(
                "HEAD is detached; check out a branch first".to_string(),
            ));
        }
        Ok(BranchName::new(name))
    }

    async fn last_commit_message(&self) -> AppResult<String> {
        self.git(&["log", "-1", "--pretty=%B"]).await
    }

    async fn amend_commit_message(&self, message: &str) -> AppResult<()> {
        self.git(&["commit", "--amend", "-m", message]).await?;
        Ok(())
    }

    async fn force_push(&self, branch: &BranchName) -> AppResult<()> {
        self.git(&["push", REMOTE, branch.as_str(), "-f"]).await?;
        Ok(())
    }
}
