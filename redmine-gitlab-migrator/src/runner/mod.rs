//! Orchestrates the migration commands.
//!
//! Every command is strictly sequential: each request is awaited before the
//! next one starts, and the first error ends the run.

mod config;
mod error;

pub use config::RunnerConfig;
pub use error::RunnerError;

use crate::convert::{convert_issue, convert_version, ConversionContext, UserMapper};
use crate::gitlab::{GitlabProject, GitlabUserIndex, MilestoneIndex};
use crate::redmine::{Issue, RedmineClient, RedmineProject, Version};
use crate::summary::{ProcessingResult, RunSummary};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{info, info_span, warn, Instrument};

/// Runs migration commands between one Redmine and one GitLab project.
pub struct Runner {
    config: RunnerConfig,
    redmine: RedmineProject,
    gitlab: GitlabProject,
}

impl Runner {
    /// Builds a runner talking to both services over HTTP.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if a project URL or a credential is unusable.
    pub fn new(config: RunnerConfig) -> Result<Self, RunnerError> {
        let settings = config.settings();
        let client = RedmineClient::with_api_key(config.redmine_key(), settings.page_size)?;
        let redmine =
            RedmineProject::new(client, &settings.redmine_project_url, config.redmine_key())?
                .with_issue_limit(settings.issue_limit);
        let gitlab =
            GitlabProject::with_token(&settings.gitlab_project_url, config.gitlab_token())?;
        Ok(Self::with_projects(config, redmine, gitlab))
    }

    /// Builds a runner over already configured project accessors.
    #[must_use]
    pub fn with_projects(
        config: RunnerConfig,
        redmine: RedmineProject,
        gitlab: GitlabProject,
    ) -> Self {
        Self {
            config,
            redmine,
            gitlab,
        }
    }

    /// Reports which Redmine participants have no GitLab account.
    ///
    /// Missing accounts are recorded as failures in the summary.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if either service cannot be queried.
    pub async fn check_users(&self) -> Result<RunSummary, RunnerError> {
        let mut summary = RunSummary::new(self.config.dry_run());
        let participants = self.redmine.participants().await?;
        let accounts = self
            .gitlab
            .users_index(participants.iter().map(|user| user.login.as_str()))
            .await?;

        for user in &participants {
            let result = match accounts.get(&user.login) {
                Some(account) => {
                    info!(login = %user.login, gitlab_id = account.id, "User found");
                    ProcessingResult::UserMapped {
                        login: user.login.clone(),
                        gitlab_id: account.id,
                    }
                }
                None => {
                    warn!(login = %user.login, redmine_id = user.id, "User missing on GitLab");
                    ProcessingResult::UserMissing {
                        login: user.login.clone(),
                    }
                }
            };
            summary.record_result(&result);
        }

        Ok(summary)
    }

    /// Migrates Redmine versions into GitLab milestones.
    ///
    /// Versions whose name is already a milestone title are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] on the first failed request.
    pub async fn migrate_roadmap(&self) -> Result<RunSummary, RunnerError> {
        let mut summary = RunSummary::new(self.config.dry_run());
        let versions = self.redmine.versions().await?;
        let existing = self.gitlab.milestones_index().await?;
        info!(
            versions = versions.len(),
            existing = existing.len(),
            "Migrating roadmap"
        );

        for version in &versions {
            let span = info_span!("version", id = version.id, name = %version.name);
            let result = self
                .migrate_version(version, &existing)
                .instrument(span)
                .await?;
            summary.record_result(&result);
        }

        Ok(summary)
    }

    /// Migrates Redmine issues with their notes and closing state.
    ///
    /// Attachments are saved locally when downloads are enabled.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] on the first failed request, or if the
    /// fallback assignee does not exist on GitLab.
    pub async fn migrate_issues(&self) -> Result<RunSummary, RunnerError> {
        let mut summary = RunSummary::new(self.config.dry_run());
        let issues = self.redmine.issues().await?;
        let redmine_users = self.redmine.users_index().await?;

        let fallback_login = self.config.fallback_assignee();
        let logins: BTreeSet<&str> = redmine_users
            .values()
            .map(|user| user.login.as_str())
            .chain(fallback_login)
            .collect();
        let gitlab_users = self.gitlab.users_index(logins).await?;
        let fallback_assignee = fallback_assignee_id(&gitlab_users, fallback_login)?;
        let milestones = self.gitlab.milestones_index().await?;

        let context = ConversionContext {
            users: UserMapper::new(&redmine_users, &gitlab_users, fallback_assignee),
            milestones: &milestones,
        };

        info!(
            count = issues.len(),
            users = gitlab_users.len(),
            milestones = milestones.len(),
            "Migrating issues"
        );
        for issue in issues {
            let span = info_span!("issue", redmine_id = issue.id);
            let result = self.migrate_issue(issue, &context).instrument(span).await?;
            summary.record_result(&result);
        }

        Ok(summary)
    }

    async fn migrate_version(
        &self,
        version: &Version,
        existing: &MilestoneIndex,
    ) -> Result<ProcessingResult, RunnerError> {
        if existing.contains_key(&version.name) {
            info!("Milestone already exists, skipping");
            return Ok(ProcessingResult::MilestoneSkipped {
                title: version.name.clone(),
                reason: "milestone already exists".to_string(),
            });
        }

        let converted = convert_version(version);
        if self.config.dry_run() {
            let resource = format!("milestone \"{}\"", version.name);
            print_preview(&resource, &converted)?;
            return Ok(ProcessingResult::Previewed { resource });
        }

        let created = self.gitlab.create_milestone(&converted.milestone).await?;
        if converted.must_close {
            self.gitlab.close_milestone(created.id).await?;
        }
        info!(
            milestone_id = created.id,
            closed = converted.must_close,
            "Milestone created"
        );

        Ok(ProcessingResult::MilestoneCreated {
            title: created.title,
            id: created.id,
            closed: converted.must_close,
        })
    }

    async fn migrate_issue(
        &self,
        issue: &Issue,
        context: &ConversionContext<'_>,
    ) -> Result<ProcessingResult, RunnerError> {
        let converted = convert_issue(issue, context);
        if self.config.dry_run() {
            let resource = format!("issue #{}", issue.id);
            print_preview(&resource, &converted)?;
            return Ok(ProcessingResult::Previewed { resource });
        }

        let created = self
            .gitlab
            .create_issue(&converted.issue, converted.meta.sudo_user.as_deref())
            .await?;
        for note in &converted.meta.notes {
            self.gitlab
                .create_note(created.iid, &note.note, note.sudo_user.as_deref())
                .await?;
        }
        if converted.meta.must_close {
            self.gitlab.close_issue(created.iid).await?;
        }

        let attachments = match self.config.downloads_dir() {
            Some(dir) => self.redmine.download_attachments(issue, dir).await?.len(),
            None => 0,
        };

        info!(
            iid = created.iid,
            url = created.web_url.as_deref().unwrap_or_default(),
            notes = converted.meta.notes.len(),
            closed = converted.meta.must_close,
            attachments,
            "Issue created"
        );

        Ok(ProcessingResult::IssueCreated {
            redmine_id: issue.id,
            iid: created.iid,
            notes: converted.meta.notes.len(),
            closed: converted.meta.must_close,
            attachments,
        })
    }
}

fn fallback_assignee_id(
    users: &GitlabUserIndex,
    login: Option<&str>,
) -> Result<Option<u64>, RunnerError> {
    login
        .map(|login| {
            users
                .get(login)
                .map(|user| user.id)
                .ok_or_else(|| RunnerError::UnknownFallbackAssignee {
                    login: login.to_string(),
                })
        })
        .transpose()
}

fn print_preview<T: Serialize>(resource: &str, payload: &T) -> Result<(), RunnerError> {
    let rendered =
        serde_json::to_string_pretty(payload).map_err(|source| RunnerError::Preview {
            resource: resource.to_string(),
            source,
        })?;
    println!("\n[DRY RUN] Would create {resource}:");
    for line in rendered.lines() {
        println!("  {line}");
    }
    Ok(())
}
