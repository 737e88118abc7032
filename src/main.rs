mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod services;
mod workflow;

use std::sync::Arc;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cmd::publish::{self, PublishArgs};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::infra::git::GitCli;
use crate::infra::github::GitHubClient;
use crate::infra::jira::JiraClient;

#[derive(Parser)]
#[command(
    name = "autopr",
    author,
    version,
    about = "Ticket, tag, push and open a pull request for the latest commit"
)]
struct Cli {
    #[command(flatten)]
    publish: PublishArgs,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();

    let cwd = std::env::current_dir()?;
    let config = AppConfig::load(&cwd)?;
    debug!(?config, "loaded configuration");

    let git = Arc::new(GitCli::new(config.workspace_root.clone()));
    let issue_tracker = Arc::new(JiraClient::new(
        config.jira_base_url.clone(),
        config.jira_username.clone(),
        config.jira_token.clone(),
    ));
    let code_host = Arc::new(GitHubClient::new(
        config.github_api_url.clone(),
        config.github_token.clone(),
    ));

    let context = AppContext::new(config, git, issue_tracker, code_host);

    let outcome = publish::run(&context, cli.publish).await?;

    println!("Commit: {} ({})", outcome.change.title, outcome.change.branch);
    if let Some(ticket) = &outcome.ticket {
        match &ticket.url {
            Some(url) => println!("Created {}: {url}", ticket.key.as_str()),
            None => println!("Created {}", ticket.key.as_str()),
        }
    }
    println!("PR: {}", outcome.pull_request.html_url);

    Ok(())
}
