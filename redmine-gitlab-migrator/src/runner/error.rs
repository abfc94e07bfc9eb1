//! Runner error types.

/// Errors that can occur during a migration run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration loading errors.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// Redmine read errors.
    #[error(transparent)]
    Redmine(#[from] crate::redmine::RedmineError),

    /// GitLab write errors.
    #[error(transparent)]
    Gitlab(#[from] crate::gitlab::GitlabError),

    /// The configured fallback assignee has no GitLab account.
    #[error("Fallback assignee '{login}' does not exist on GitLab")]
    UnknownFallbackAssignee { login: String },

    /// A dry-run payload could not be rendered.
    #[error("Failed to render preview of {resource}: {source}")]
    Preview {
        resource: String,
        #[source]
        source: serde_json::Error,
    },
}
