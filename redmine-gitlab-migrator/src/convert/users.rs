//! Redmine to GitLab user resolution.

use crate::gitlab::GitlabUserIndex;
use crate::redmine::{NamedRef, RedmineUserIndex};
use tracing::{debug, warn};

/// Resolves Redmine user ids to GitLab accounts through the login name.
///
/// Users missing from either index are never an error: authors fall back to
/// the token owner and assignees to the configured fallback account.
#[derive(Debug, Clone, Copy)]
pub struct UserMapper<'a> {
    redmine: &'a RedmineUserIndex,
    gitlab: &'a GitlabUserIndex,
    fallback_assignee: Option<u64>,
}

impl<'a> UserMapper<'a> {
    #[must_use]
    pub fn new(
        redmine: &'a RedmineUserIndex,
        gitlab: &'a GitlabUserIndex,
        fallback_assignee: Option<u64>,
    ) -> Self {
        Self {
            redmine,
            gitlab,
            fallback_assignee,
        }
    }

    /// Redmine login of a user id.
    #[must_use]
    pub fn login(&self, redmine_id: u64) -> Option<&'a str> {
        self.redmine
            .get(&redmine_id)
            .map(|user| user.login.as_str())
    }

    /// GitLab id of the account sharing the Redmine user's login.
    #[must_use]
    pub fn gitlab_id(&self, redmine_id: u64) -> Option<u64> {
        self.login(redmine_id)
            .and_then(|login| self.gitlab.get(login))
            .map(|user| user.id)
    }

    /// GitLab username to impersonate for content written by `user`.
    ///
    /// Returns `None` (write as the token owner) when the user is unknown on
    /// either side, logging a warning naming `context`.
    #[must_use]
    pub fn sudo_user(&self, user: &NamedRef, context: &str) -> Option<String> {
        let resolved = self
            .login(user.id)
            .and_then(|login| self.gitlab.get(login))
            .map(|account| account.username.clone());
        if resolved.is_none() {
            warn!(
                redmine_user_id = user.id,
                redmine_user = %user.name,
                context,
                "Redmine user is unknown, attributing to current admin"
            );
        }
        resolved
    }

    /// GitLab assignee for an issue.
    ///
    /// Unassigned issues and unmapped assignees get the fallback assignee.
    #[must_use]
    pub fn assignee(&self, issue_id: u64, assigned_to: Option<&NamedRef>) -> Option<u64> {
        match assigned_to {
            Some(user) => self.gitlab_id(user.id).or_else(|| {
                warn!(
                    issue_id,
                    redmine_user_id = user.id,
                    redmine_user = %user.name,
                    fallback = ?self.fallback_assignee,
                    "Assignee has no GitLab account, using fallback assignee"
                );
                self.fallback_assignee
            }),
            None => {
                debug!(issue_id, fallback = ?self.fallback_assignee, "Issue is unassigned");
                self.fallback_assignee
            }
        }
    }
}
