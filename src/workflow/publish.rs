use serde_json::Map;
use tracing::{debug, info, warn};

use crate::context::AppContext;
use crate::domain::change::ChangeDescriptor;
use crate::domain::pull_request::{PullRequest, PullRequestDraft};
use crate::domain::ticket::{IssueDraft, IssueKey, ProjectKey, Ticket};
use crate::error::{AppError, AppResult};
use crate::services::VersionControlService;

#[derive(Debug)]
pub struct PublishOutcome {
    pub change: ChangeDescriptor,
    /// Present only when the run had to create an issue.
    pub ticket: Option<Ticket>,
    pub pull_request: PullRequest,
}

pub async fn publish_change(
    ctx: &AppContext,
    add_to_current_sprint: bool,
) -> AppResult<PublishOutcome> {
    let project = ProjectKey::new(&ctx.config.jira_project_key)?;
    let sprint_settings = if add_to_current_sprint {
        Some(ctx.config.sprint_settings()?)
    } else {
        None
    };

    let mut change = inspect_change(ctx.version_control.as_ref()).await?;

    let ticket = match project.find_in_title(&change.title) {
        Some(existing) => {
            info!(key = existing.as_str(), "commit already references an issue");
            None
        }
        None => {
            let mut draft = issue_draft(ctx, &project, &change);
            if let Some(settings) = &sprint_settings {
                match ctx
                    .issue_tracker
                    .find_active_sprint(settings.board_id)
                    .await?
                {
                    Some(sprint) => {
                        debug!(
                            sprint_id = sprint.id,
                            sprint = %sprint.name,
                            state = %sprint.state,
                            "attaching issue to sprint"
                        );
                        draft.assign_sprint(&settings.field_name, &sprint);
                    }
                    None => warn!(
                        board_id = settings.board_id,
                        "no active sprint found; creating issue without one"
                    ),
                }
            }

            let ticket = ctx.issue_tracker.create_issue(draft).await?;
            info!(key = ticket.key.as_str(), "created issue");
            tag_commit(ctx.version_control.as_ref(), &mut change, &ticket.key).await?;
            Some(ticket)
        }
    };

    ctx.version_control.force_push(&change.branch).await?;
    info!(branch = %change.branch, "force-pushed branch");

    let pull_request = ctx
        .code_host
        .create_pull_request(PullRequestDraft {
            owner: ctx.config.target_org.clone(),
            repo: ctx.config.target_repo.clone(),
            head: change.branch.qualified_head(&ctx.config.source_org),
            base: ctx.config.target_branch.clone(),
            title: change.title.clone(),
            body: change.body.clone(),
        })
        .await?;
    info!(number = pull_request.number, url = %pull_request.html_url, "opened pull request");

    Ok(PublishOutcome {
        change,
        ticket,
        pull_request,
    })
}

/// Reads the branch and HEAD commit, refusing to continue with unstaged changes.
pub async fn inspect_change(
    version_control: &dyn VersionControlService,
) -> AppResult<ChangeDescriptor> {
    let diff = version_control.diff_stat().await?;
    if !diff.trim().is_empty() {
        return Err(AppError::DirtyWorkingTree(diff));
    }

    let branch = version_control.current_branch().await?;
    let message = version_control.last_commit_message().await?;
    let change = ChangeDescriptor::from_commit_message(branch, &message);
    if change.title.is_empty() {
        return Err(AppError::VersionControl(
            "latest commit has an empty message".to_string(),
        ));
    }
    debug!(branch = %change.branch, title = %change.title, "inspected HEAD commit");
    Ok(change)
}

pub async fn tag_commit(
    version_control: &dyn VersionControlService,
    change: &mut ChangeDescriptor,
    key: &IssueKey,
) -> AppResult<()> {
    change.prepend_issue_key(key);
    version_control
        .amend_commit_message(&change.commit_message())
        .await
}

fn issue_draft(ctx: &AppContext, project: &ProjectKey, change: &ChangeDescriptor) -> IssueDraft {
    IssueDraft {
        project_key: project.as_str().to_string(),
        issue_type: ctx.config.jira_issue_type.clone(),
        assignee_account_id: ctx.config.jira_account_id.clone(),
        reporter_account_id: ctx.config.jira_account_id.clone(),
        summary: change.title.clone(),
        description: change.body.clone(),
        extra_fields: Map::new(),
    }
}
