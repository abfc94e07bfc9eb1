//! Label synthesis from Redmine classification fields.

use crate::redmine::Issue;
use std::fmt;

/// Priorities that collapse into the single `Critical` severity.
pub const CRITICAL_PRIORITIES: [&str; 2] = ["Urgent", "Immediate"];

/// A GitLab label derived from one of the three Redmine classification fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IssueLabel {
    /// From the tracker (Bug, Feature, Support...).
    Type(String),
    /// From the status.
    Status(String),
    /// From the priority, after severity collapsing.
    Priority(String),
}

impl IssueLabel {
    /// Builds a priority label; `Urgent` and `Immediate` become `Critical`.
    #[must_use]
    pub fn priority(name: &str) -> Self {
        if CRITICAL_PRIORITIES.contains(&name) {
            Self::Priority("Critical".to_string())
        } else {
            Self::Priority(name.to_string())
        }
    }
}

impl fmt::Display for IssueLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(name) => write!(f, "Type:{name}"),
            Self::Status(name) => write!(f, "Status:{name}"),
            Self::Priority(name) => write!(f, "Priority:{name}"),
        }
    }
}

/// Returns the tracker, status and priority labels of an issue.
#[must_use]
pub fn issue_labels(issue: &Issue) -> Vec<IssueLabel> {
    vec![
        IssueLabel::Type(issue.tracker.name.clone()),
        IssueLabel::Status(issue.status.name.clone()),
        IssueLabel::priority(&issue.priority.name),
    ]
}
