use crate::domain::branch::BranchName;
use crate::domain::ticket::IssueKey;

/// The branch and HEAD commit message the run is publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeDescriptor {
    pub branch: BranchName,
    pub title: String,
    pub body: String,
}

impl ChangeDescriptor {
    pub fn from_commit_message(branch: BranchName, message: &str) -> Self {
        let cleaned = message.replace('\r', "");
        let mut lines = cleaned.trim().lines();
        let title = lines.next().unwrap_or_default().trim().to_string();
        let body = lines
            .skip_while(|line| line.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
            .trim_end()
            .to_string();

        Self {
            branch,
            title,
            body,
        }
    }

    pub fn prepend_issue_key(&mut self, key: &IssueKey) {
        self.title = format!("{}: {}", key.as_str(), self.title);
    }

    pub fn commit_message(&self) -> String {
        if self.body.is_empty() {
            self.title.clone()
        } else {
            format!("{}\n\n{}", self.title, self.body)
        }
    }
}
