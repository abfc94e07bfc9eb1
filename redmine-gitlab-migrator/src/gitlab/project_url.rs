//! GitLab project URL handling.

use super::GitlabError;
use url::{form_urlencoded, Position, Url};

/// A GitLab project: its instance and its namespaced path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPath {
    instance_url: String,
    path: String,
}

impl ProjectPath {
    /// Parses a project URL such as `https://gitlab.example.com/group/project`.
    ///
    /// A trailing `.git` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`GitlabError::InvalidProjectUrl`] if the URL is not http(s) or
    /// lacks a namespace and project name.
    pub fn parse(url: &str) -> Result<Self, GitlabError> {
        let invalid = |reason: &str| GitlabError::InvalidProjectUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let parsed = Url::parse(url).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }

        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();
        if segments.len() < 2 {
            return Err(invalid("expected '<namespace>/<project>'"));
        }

        let path = segments.join("/");
        let path = path.strip_suffix(".git").unwrap_or(&path).to_string();

        Ok(Self {
            instance_url: parsed[..Position::BeforePath].to_string(),
            path,
        })
    }

    /// Root of the GitLab instance.
    #[must_use]
    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    /// `namespace/project` path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Base of the v4 REST API.
    #[must_use]
    pub fn api_url(&self) -> String {
        format!("{}/api/v4", self.instance_url)
    }

    /// Project endpoint, addressed by its URL-encoded path.
    #[must_use]
    pub fn project_api_url(&self) -> String {
        let encoded: String = form_urlencoded::byte_serialize(self.path.as_bytes()).collect();
        format!("{}/projects/{}", self.api_url(), encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_namespaced_path() {
        let project =
            ProjectPath::parse("https://gitlab.example.com/group/sub/my-project").unwrap();
        assert_eq!(project.path(), "group/sub/my-project");
        assert_eq!(
            project.project_api_url(),
            "https://gitlab.example.com/api/v4/projects/group%2Fsub%2Fmy-project"
        );
    }

    #[test]
    fn strips_git_suffix_and_trailing_slash() {
        let project = ProjectPath::parse("https://gitlab.example.com:8443/team/app.git/").unwrap();
        assert_eq!(project.instance_url(), "https://gitlab.example.com:8443");
        assert_eq!(project.path(), "team/app");
    }

    #[test]
    fn rejects_url_without_namespace() {
        let result = ProjectPath::parse("https://gitlab.example.com/app");
        assert!(matches!(result, Err(GitlabError::InvalidProjectUrl { .. })));
    }
}
