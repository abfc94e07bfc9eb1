//! Runner configuration.

use crate::config::MigrationConfig;
use std::path::Path;

/// Settings and credentials for a migration run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Settings loaded from the configuration file.
    settings: MigrationConfig,
    /// Redmine API key.
    redmine_key: String,
    /// GitLab access token; must belong to an administrator for `sudo`.
    gitlab_token: String,
    /// Whether to print payloads instead of writing to GitLab.
    dry_run: bool,
}

impl RunnerConfig {
    /// Creates a new configuration for a run.
    pub fn new(
        settings: MigrationConfig,
        redmine_key: String,
        gitlab_token: String,
        dry_run: bool,
    ) -> Self {
        Self {
            settings,
            redmine_key,
            gitlab_token,
            dry_run,
        }
    }

    /// Returns the file settings.
    pub fn settings(&self) -> &MigrationConfig {
        &self.settings
    }

    /// Returns the Redmine API key.
    pub fn redmine_key(&self) -> &str {
        &self.redmine_key
    }

    /// Returns the GitLab access token.
    pub fn gitlab_token(&self) -> &str {
        &self.gitlab_token
    }

    /// Returns whether dry-run mode is enabled.
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns the GitLab username used for unmappable assignees.
    pub fn fallback_assignee(&self) -> Option<&str> {
        self.settings.fallback_assignee.as_deref()
    }

    /// Returns the directory receiving attachments, when downloads are on.
    pub fn downloads_dir(&self) -> Option<&Path> {
        self.settings
            .download_attachments
            .then_some(self.settings.downloads_dir.as_path())
    }
}
