use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchName(pub String);

impl BranchName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Head reference for a cross-repository pull request, e.g. `me:fix-login`.
    pub fn qualified_head(&self, owner: &str) -> String {
        format!("{}:{}", owner.trim(), self.0)
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualifies_head_with_owner() {
        let branch = BranchName::new("fix-login");
        assert_eq!(branch.qualified_head("me"), "me:fix-login");
    }
}
