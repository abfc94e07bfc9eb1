//! Redmine project URL handling.

use super::RedmineError;
use url::{Position, Url};

/// A canonical Redmine project location.
///
/// Category URLs (`https://example.com/project/dev/foobar/`) are reduced to the
/// category-less form (`https://example.com/projects/foobar`); API endpoints
/// only answer on the latter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectUrl {
    instance_url: String,
    project_name: String,
}

impl ProjectUrl {
    /// Parses and canonicalizes a project URL.
    ///
    /// # Errors
    ///
    /// Returns [`RedmineError::InvalidProjectUrl`] if the URL is not http(s)
    /// or does not point at a project.
    pub fn parse(url: &str) -> Result<Self, RedmineError> {
        let invalid = |reason: &str| RedmineError::InvalidProjectUrl {
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

        let (prefix, project_name) = match segments.as_slice() {
            [prefix @ .., "projects", name] => (prefix, *name),
            [prefix @ .., "project", _category, name] => (prefix, *name),
            _ => return Err(invalid("expected '/projects/<name>' or '/project/<category>/<name>'")),
        };

        if !is_valid_identifier(project_name) {
            return Err(invalid("project identifier contains unsupported characters"));
        }

        let mut instance_url = parsed[..Position::BeforePath].to_string();
        for segment in prefix {
            instance_url.push('/');
            instance_url.push_str(segment);
        }

        Ok(Self {
            instance_url,
            project_name: project_name.to_string(),
        })
    }

    /// Root of the Redmine instance, without trailing slash.
    #[must_use]
    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    /// Project identifier.
    #[must_use]
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Canonical, category-less project URL.
    #[must_use]
    pub fn public_url(&self) -> String {
        format!("{}/projects/{}", self.instance_url, self.project_name)
    }
}

fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}
