//! Conversion of Redmine records into GitLab payloads.
//!
//! Every function here is pure: the only inputs besides the source record are
//! the read-only user and milestone indexes, and the only side effect is a
//! `tracing` warning when a lookup degrades to a fallback.

mod labels;
mod notes;
mod relations;
mod users;

pub use labels::{issue_labels, IssueLabel, CRITICAL_PRIORITIES};
pub use notes::{convert_notes, ConvertedNote, MIGRATION_MARKER};
pub use relations::relations_to_string;
pub use users::UserMapper;

use crate::gitlab::{MilestoneIndex, NewIssue, NewMilestone};
use crate::redmine::{Attachment, Issue, Version, VersionStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

/// Out-of-band data accompanying an issue payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueMeta {
    /// GitLab username to create the issue as; `None` uses the token owner.
    pub sudo_user: Option<String>,
    /// Notes to add once the issue exists, in journal order.
    pub notes: Vec<ConvertedNote>,
    /// Whether the issue must be closed after creation.
    pub must_close: bool,
}

/// A Redmine issue converted for GitLab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertedIssue {
    pub redmine_id: u64,
    pub issue: NewIssue,
    pub meta: IssueMeta,
    /// Source attachments; not uploaded, only downloaded on request.
    pub attachments: Vec<Attachment>,
}

/// A Redmine version converted into a GitLab milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertedMilestone {
    pub milestone: NewMilestone,
    /// Whether the milestone must be closed after creation.
    pub must_close: bool,
}

/// Lookup tables shared by all issue conversions of a run.
#[derive(Debug, Clone, Copy)]
pub struct ConversionContext<'a> {
    pub users: UserMapper<'a>,
    pub milestones: &'a MilestoneIndex,
}

/// Converts a Redmine issue into a GitLab issue payload plus metadata.
#[must_use]
pub fn convert_issue(issue: &Issue, context: &ConversionContext<'_>) -> ConvertedIssue {
    let close_text = issue
        .closed_on
        .map(|closed_on| format!(", closed on {}", short_date(&closed_on)))
        .unwrap_or_default();

    let relations = relations_to_string(&issue.relations, issue.id);
    let relations_text = if relations.is_empty() {
        String::new()
    } else {
        format!(", {relations}")
    };

    let description = format!(
        "{}\n\n*(from redmine: created on {}{}{})*",
        issue.description.as_deref().unwrap_or_default(),
        short_date(&issue.created_on),
        close_text,
        relations_text
    );

    let milestone_id = issue.fixed_version.as_ref().and_then(|version| {
        let found = context.milestones.get(&version.name).map(|m| m.id);
        if found.is_none() {
            warn!(
                issue_id = issue.id,
                version = %version.name,
                "No milestone for target version, leaving milestone unset"
            );
        }
        found
    });

    let users = context.users;
    let payload = NewIssue {
        title: format!("[RM-{}] {}", issue.id, issue.subject),
        description,
        labels: issue_labels(issue)
            .iter()
            .map(ToString::to_string)
            .collect(),
        milestone_id,
        assignee_id: users.assignee(issue.id, issue.assigned_to.as_ref()),
        created_at: issue.created_on,
    };

    let meta = IssueMeta {
        sudo_user: users.sudo_user(&issue.author, &format!("issue #{}", issue.id)),
        notes: convert_notes(&issue.journals, users).collect(),
        must_close: issue.closed_on.is_some(),
    };

    ConvertedIssue {
        redmine_id: issue.id,
        issue: payload,
        meta,
        attachments: issue.attachments.clone(),
    }
}

/// Converts a Redmine version into a GitLab milestone.
///
/// The issues targeting the version are not carried over.
#[must_use]
pub fn convert_version(version: &Version) -> ConvertedMilestone {
    ConvertedMilestone {
        milestone: NewMilestone {
            title: version.name.clone(),
            description: format!(
                "{}\n\n*(from redmine: created on {})*",
                version.description.as_deref().unwrap_or_default(),
                short_date(&version.created_on)
            ),
            due_date: version.due_date,
        },
        must_close: version.status == VersionStatus::Closed,
    }
}

fn short_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d").to_string()
}
