use clap::Args;

use crate::context::AppContext;
use crate::error::AppResult;
use crate::workflow::publish::{PublishOutcome, publish_change};

#[derive(Args, Debug, Clone)]
pub struct PublishArgs {
    /// Add a newly created issue to the board's active sprint.
    #[arg(long = "add-to-current-sprint", alias = "addToCurrentSprint")]
    pub add_to_current_sprint: bool,
}

pub async fn run(ctx: &AppContext, args: PublishArgs) -> AppResult<PublishOutcome> {
    publish_change(ctx, args.add_to_current_sprint).await
}
