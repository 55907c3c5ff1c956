use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RepoError, RepoResult};

/// Repository settings.
///
/// Every field has a default, so an empty TOML document is a valid
/// configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Author recorded on every commit.
    pub author: String,
    /// Branch created by `init` and checked out first.
    pub default_branch: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            author: "docgit".into(),
            default_branch: "master".into(),
        }
    }
}

impl RepositoryConfig {
    pub fn from_toml_str(text: &str) -> RepoResult<Self> {
        toml::from_str(text).map_err(|e| RepoError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> RepoResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| RepoError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_default_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_branch = branch.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = RepositoryConfig::default();
        assert_eq!(c.author, "docgit");
        assert_eq!(c.default_branch, "master");
        assert_eq!(RepositoryConfig::from_toml_str("").unwrap(), c);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = RepositoryConfig::from_toml_str("author = \"lab\"").unwrap();
        assert_eq!(c.author, "lab");
        assert_eq!(c.default_branch, "master");
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        assert!(matches!(
            RepositoryConfig::from_toml_str("author = "),
            Err(RepoError::Config(_))
        ));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        assert!(matches!(
            RepositoryConfig::load("/nonexistent/docgit.toml"),
            Err(RepoError::Config(_))
        ));
    }
}
