use async_trait::async_trait;
use reqwest::{
    Client,
    header::{ACCEPT, AUTHORIZATION, USER_AGENT},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::pull_request::{PullRequest, PullRequestDraft};
use crate::error::{AppError, AppResult};
use crate::services::CodeHostService;

const USER_AGENT_VALUE: &str = "autopr";
const API_VERSION: &str = "2022-11-28";

pub struct GitHubClient {
    http: Client,
    api_base: String,
    token: String,
}

impl GitHubClient {
    pub fn new(api_base: String, token: String) -> Self {
        Self {
            http: Client::new(),
            api_base,
            token,
        }
    }

    fn pulls_endpoint(&self, owner: &str, repo: &str) -> String {
        format!(
            "{}/repos/{owner}/{repo}/pulls",
            self.api_base.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl CodeHostService for GitHubClient {
    async fn create_pull_request(&self, draft: PullRequestDraft) -> AppResult<PullRequest> {
        debug!(head = %draft.head, base = %draft.base, "creating pull request");
        let request_body = CreatePullRequest {
            title: &draft.title,
            head: &draft.head,
            base: &draft.base,
            body: &draft.body,
        };

        let response = self
            .http
            .post(self.pulls_endpoint(&draft.owner, &draft.repo))
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, USER_AGENT_VALUE)
            .header("X-GitHub-Api-Version", API_VERSION)
            .json(&request_body)
            .send()
            .await
            .map_err(|err| AppError::CodeHost(format!("failed to call GitHub: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::CodeHost(format!(
                "GitHub responded with {status}: {body}"
            )));
        }

        let payload: CreatePullRequestResponse = response.json().await.map_err(|err| {
            AppError::CodeHost(format!("failed to parse GitHub response: {err}"))
        })?;

        Ok(PullRequest {
            number: payload.number,
            html_url: payload.html_url,
        })
    }
}

#[derive(Serialize)]
struct CreatePullRequest<'a> {
    title: &'a str,
    head: &'a str,
    base: &'a str,
    body: &'a str,
}

#[derive(Deserialize)]
struct CreatePullRequestResponse {
    number: u64,
    html_url: String,
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use super::*;

    fn draft() -> PullRequestDraft {
        PullRequestDraft {
            owner: "acme".to_string(),
            repo: "widgets".to_string(),
            head: "me:fix-bug".to_string(),
            base: "main".to_string(),
            title: "ABC-123: Fix bug".to_string(),
            body: "Details here".to_string(),
        }
    }

    #[tokio::test]
    async fn opens_pull_request_against_target_repo() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/repos/acme/widgets/pulls")
            .match_header("authorization", "Bearer ghp_token")
            .match_header("user-agent", USER_AGENT_VALUE)
            .match_body(Matcher::Json(json!({
                "title": "ABC-123: Fix bug",
                "head": "me:fix-bug",
                "base": "main",
                "body": "Details here"
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"number":7,"html_url":"https://github.com/acme/widgets/pull/7","state":"open"}"#)
            .create_async()
            .await;

        let client = GitHubClient::new(server.url(), "ghp_token".to_string());
        let pr = client.create_pull_request(draft()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(pr.number, 7);
        assert_eq!(pr.html_url, "https://github.com/acme/widgets/pull/7");
    }

    #[tokio::test]
    async fn reports_validation_failures() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/repos/acme/widgets/pulls")
            .with_status(422)
            .with_body(r#"{"message":"Validation Failed"}"#)
            .create_async()
            .await;

        let client = GitHubClient::new(server.url(), "ghp_token".to_string());
        let err = client.create_pull_request(draft()).await.unwrap_err();
        assert!(matches!(err, AppError::CodeHost(msg) if msg.contains("422") && msg.contains("Validation Failed")));
    }
}
