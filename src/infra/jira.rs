use async_trait::async_trait;
use base64::prelude::{BASE64_STANDARD, Engine as _};
use reqwest::{
    Client, Response,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::ticket::{IssueDraft, IssueKey, Sprint, Ticket};
use crate::error::{AppError, AppResult};
use crate::services::IssueTrackerService;

pub struct JiraClient {
    http: Client,
    base_url: String,
    username: String,
    token: String,
}

impl JiraClient {
    pub fn new(base_url: String, username: String, token: String) -> Self {
        Self {
            http: Client::new(),
            base_url,
            username,
            token,
        }
    }

    fn auth_header(username: &str, token: &str) -> String {
        let credentials = format!("{username}:{token}");
        let encoded = BASE64_STANDARD.encode(credentials);
        format!("Basic {encoded}")
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn browse_url(&self, key: &str) -> String {
        self.endpoint(&format!("/browse/{key}"))
    }

    async fn ensure_success(response: Response) -> AppResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unable to read response>".to_string());
        Err(AppError::IssueTracker(format!(
            "Jira responded with {status}: {body}"
        )))
    }
}

#[async_trait]
impl IssueTrackerService for JiraClient {
    async fn find_active_sprint(&self, board_id: u64) -> AppResult<Option<Sprint>> {
        debug!(board_id, "looking up active sprint");
        let response = self
            .http
            .get(self.endpoint(&format!(
                "/rest/agile/1.0/board/{board_id}/sprint?state=active"
            )))
            .header(AUTHORIZATION, Self::auth_header(&self.username, &self.token))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| AppError::IssueTracker(format!("failed to call Jira: {err}")))?;

        let payload: JiraSprintPage = Self::ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|err| {
                AppError::IssueTracker(format!("failed to parse Jira sprint list: {err}"))
            })?;

        Ok(payload.values.into_iter().next().map(|sprint| Sprint {
            id: sprint.id,
            name: sprint.name,
            state: sprint.state,
        }))
    }

    async fn create_issue(&self, draft: IssueDraft) -> AppResult<Ticket> {
        if draft.summary.trim().is_empty() {
            return Err(AppError::IssueTracker(
                "issue summary must not be empty".to_string(),
            ));
        }

        debug!(project = %draft.project_key, summary = %draft.summary, "creating Jira issue");
        let request_body = JiraCreateIssueRequest::from_draft(draft);

        let response = self
            .http
            .post(self.endpoint("/rest/api/3/issue"))
            .header(AUTHORIZATION, Self::auth_header(&self.username, &self.token))
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|err| AppError::IssueTracker(format!("failed to call Jira: {err}")))?;

        let payload: JiraCreateIssueResponse = Self::ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|err| {
                AppError::IssueTracker(format!("failed to parse Jira response: {err}"))
            })?;

        let url = self.browse_url(&payload.key);
        Ok(Ticket {
            key: IssueKey::new(payload.key),
            url: Some(url),
        })
    }
}

#[derive(Serialize)]
struct JiraCreateIssueRequest {
    fields: JiraCreateIssueFields,
}

impl JiraCreateIssueRequest {
    fn from_draft(draft: IssueDraft) -> Self {
        Self {
            fields: JiraCreateIssueFields {
                project: JiraProject {
                    key: draft.project_key,
                },
                summary: draft.summary.trim().to_string(),
                description: JiraDescription::from_text(&draft.description),
                issuetype: JiraIssueType {
                    name: draft.issue_type,
                },
                assignee: JiraUser {
                    account_id: draft.assignee_account_id,
                },
                reporter: JiraUser {
                    account_id: draft.reporter_account_id,
                },
                extra: draft.extra_fields,
            },
        }
    }
}

#[derive(Serialize)]
struct JiraCreateIssueFields {
    project: JiraProject,
    summary: String,
    description: JiraDescription,
    issuetype: JiraIssueType,
    assignee: JiraUser,
    reporter: JiraUser,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Serialize)]
struct JiraProject {
    key: String,
}

#[derive(Serialize)]
struct JiraIssueType {
    name: String,
}

#[derive(Serialize)]
struct JiraUser {
    #[serde(rename = "accountId")]
    account_id: String,
}

/// Atlassian document body; API v3 rejects plain-string descriptions.
#[derive(Serialize)]
struct JiraDescription {
    #[serde(rename = "type")]
    doc_type: &'static str,
    version: u8,
    content: Vec<JiraDocNode>,
}

impl JiraDescription {
    fn from_text(description: &str) -> Self {
        let cleaned = description.replace('\r', "");
        let content = cleaned
            .split("\n\n")
            .map(str::trim)
            .filter(|section| !section.is_empty())
            .map(JiraDocNode::paragraph)
            .collect();

        Self {
            doc_type: "doc",
            version: 1,
            content,
        }
    }
}

#[derive(Serialize)]
struct JiraDocNode {
    #[serde(rename = "type")]
    node_type: &'static str,
    content: Vec<JiraInline>,
}

impl JiraDocNode {
    fn paragraph(section: &str) -> Self {
        let mut content = Vec::new();
        for (index, line) in section.lines().enumerate() {
            if index > 0 {
                content.push(JiraInline::HardBreak);
            }
            content.push(JiraInline::Text {
                text: line.to_string(),
            });
        }
        Self {
            node_type: "paragraph",
            content,
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum JiraInline {
    Text { text: String },
    HardBreak,
}

#[derive(Deserialize)]
struct JiraCreateIssueResponse {
    key: String,
}

#[derive(Deserialize)]
struct JiraSprintPage {
    #[serde(default)]
    values: Vec<JiraSprint>,
}

#[derive(Deserialize)]
struct JiraSprint {
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    state: String,
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use super::*;

    fn draft() -> IssueDraft {
        IssueDraft {
            project_key: "ABC".to_string(),
            issue_type: "Chore".to_string(),
            assignee_account_id: "acc-1".to_string(),
            reporter_account_id: "acc-1".to_string(),
            summary: "Fix bug".to_string(),
            description: "Details here".to_string(),
            extra_fields: Map::new(),
        }
    }

    fn client(server: &mockito::Server) -> JiraClient {
        JiraClient::new(
            format!("{}/", server.url()),
            "me@acme.test".to_string(),
            "secret".to_string(),
        )
    }

    #[test]
    fn description_splits_paragraphs_and_keeps_line_breaks() {
        let doc = serde_json::to_value(JiraDescription::from_text("one\ntwo\n\nthree")).unwrap();
        assert_eq!(
            doc,
            json!({
                "type": "doc",
                "version": 1,
                "content": [
                    {
                        "type": "paragraph",
                        "content": [
                            {"type": "text", "text": "one"},
                            {"type": "hardBreak"},
                            {"type": "text", "text": "two"}
                        ]
                    },
                    {
                        "type": "paragraph",
                        "content": [{"type": "text", "text": "three"}]
                    }
                ]
            })
        );
    }

    #[test]
    fn empty_description_is_an_empty_document() {
        let doc = serde_json::to_value(JiraDescription::from_text("  ")).unwrap();
        assert_eq!(doc["content"], json!([]));
    }

    #[test]
    fn extra_fields_are_flattened_into_issue_fields() {
        let mut draft = draft();
        draft
            .extra_fields
            .insert("customfield_10020".to_string(), json!(37));
        let body = serde_json::to_value(JiraCreateIssueRequest::from_draft(draft)).unwrap();
        assert_eq!(body["fields"]["customfield_10020"], json!(37));
        assert_eq!(body["fields"]["assignee"], json!({"accountId": "acc-1"}));
        assert_eq!(body["fields"]["issuetype"], json!({"name": "Chore"}));
    }

    #[tokio::test]
    async fn creates_issue_and_builds_browse_url() {
        let mut server = mockito::Server::new_async().await;
        let expected_auth = JiraClient::auth_header("me@acme.test", "secret");
        let mock = server
            .mock("POST", "/rest/api/3/issue")
            .match_header("authorization", expected_auth.as_str())
            .match_body(Matcher::PartialJson(json!({
                "fields": {
                    "project": {"key": "ABC"},
                    "summary": "Fix bug",
                    "reporter": {"accountId": "acc-1"}
                }
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"10001","key":"ABC-123","self":"https://x/rest/api/3/issue/10001"}"#)
            .create_async()
            .await;

        let ticket = client(&server).create_issue(draft()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(ticket.key.as_str(), "ABC-123");
        assert_eq!(ticket.url, Some(format!("{}/browse/ABC-123", server.url())));
    }

    #[tokio::test]
    async fn create_issue_reports_error_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/rest/api/3/issue")
            .with_status(400)
            .with_body(r#"{"errors":{"issuetype":"invalid"}}"#)
            .create_async()
            .await;

        let err = client(&server).create_issue(draft()).await.unwrap_err();
        assert!(matches!(err, AppError::IssueTracker(msg) if msg.contains("400") && msg.contains("issuetype")));
    }

    #[tokio::test]
    async fn finds_first_active_sprint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/agile/1.0/board/42/sprint")
            .match_query(Matcher::UrlEncoded("state".into(), "active".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"maxResults":50,"startAt":0,"isLast":true,"values":[
                    {"id":37,"state":"active","name":"Sprint 12"},
                    {"id":38,"state":"active","name":"Sprint 13"}
                ]}"#,
            )
            .create_async()
            .await;

        let sprint = client(&server).find_active_sprint(42).await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            sprint,
            Some(Sprint {
                id: 37,
                name: "Sprint 12".to_string(),
                state: "active".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn no_active_sprint_yields_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/agile/1.0/board/42/sprint")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"maxResults":50,"startAt":0,"isLast":true,"values":[]}"#)
            .create_async()
            .await;

        let sprint = client(&server).find_active_sprint(42).await.unwrap();
        assert_eq!(sprint, None);
    }
}
