//! Run summary types.

use super::result::ProcessingResult;

/// Summary of a complete run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of Redmine participants checked against GitLab.
    pub users_checked: usize,

    /// Number of participants without a GitLab account.
    pub users_missing: usize,

    /// Number of milestones created.
    pub milestones_created: usize,

    /// Number of milestones closed after creation.
    pub milestones_closed: usize,

    /// Number of versions skipped (e.g., title already taken).
    pub milestones_skipped: usize,

    /// Number of issues created.
    pub issues_created: usize,

    /// Number of issues closed after creation.
    pub issues_closed: usize,

    /// Number of notes added to created issues.
    pub notes_created: usize,

    /// Number of attachments saved locally.
    pub attachments_downloaded: usize,

    /// Number of payloads printed in dry-run mode.
    pub previewed: usize,

    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Updates the summary with a processing result.
    pub fn record_result(&mut self, result: &ProcessingResult) {
        match result {
            ProcessingResult::UserMapped { .. } => self.users_checked += 1,
            ProcessingResult::UserMissing { .. } => {
                self.users_checked += 1;
                self.users_missing += 1;
            }
            ProcessingResult::MilestoneCreated { closed, .. } => {
                self.milestones_created += 1;
                if *closed {
                    self.milestones_closed += 1;
                }
            }
            ProcessingResult::MilestoneSkipped { .. } => self.milestones_skipped += 1,
            ProcessingResult::IssueCreated {
                notes,
                closed,
                attachments,
                ..
            } => {
                self.issues_created += 1;
                self.notes_created += notes;
                self.attachments_downloaded += attachments;
                if *closed {
                    self.issues_closed += 1;
                }
            }
            ProcessingResult::Previewed { .. } => self.previewed += 1,
        }
    }

    /// Returns true if any failures occurred.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.users_missing > 0
    }

    /// Returns true if all operations were successful.
    #[must_use]
    pub fn all_success(&self) -> bool {
        !self.has_failures()
    }
}
