//! Processing result types.

/// Result of processing a single user, milestone or issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingResult {
    /// A Redmine login has a GitLab account of the same name.
    UserMapped {
        /// Shared login.
        login: String,
        /// GitLab account id.
        gitlab_id: u64,
    },

    /// A Redmine login has no GitLab account.
    UserMissing {
        /// Redmine login.
        login: String,
    },

    /// A milestone was created from a Redmine version.
    MilestoneCreated {
        /// Milestone title.
        title: String,
        /// GitLab milestone id.
        id: u64,
        /// Whether the milestone was closed afterwards.
        closed: bool,
    },

    /// A version was not migrated.
    MilestoneSkipped {
        /// Version name.
        title: String,
        /// Reason for skipping.
        reason: String,
    },

    /// An issue was created from a Redmine issue.
    IssueCreated {
        /// Source issue id.
        redmine_id: u64,
        /// Project-scoped id of the new issue.
        iid: u64,
        /// Number of notes added.
        notes: usize,
        /// Whether the issue was closed afterwards.
        closed: bool,
        /// Number of attachments saved locally.
        attachments: usize,
    },

    /// A payload was printed instead of sent.
    Previewed {
        /// Human readable resource name.
        resource: String,
    },
}
