use async_trait::async_trait;

use crate::domain::ticket::{IssueDraft, Sprint, Ticket};
use crate::error::AppResult;

#[async_trait]
pub trait IssueTrackerService: Send + Sync {
    async fn find_active_sprint(&self, board_id: u64) -> AppResult<Option<Sprint>>;
    async fn create_issue(&self, draft: IssueDraft) -> AppResult<Ticket>;
}
