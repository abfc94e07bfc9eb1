//! Journal to note conversion.

use super::UserMapper;
use crate::gitlab::NewNote;
use crate::redmine::Journal;
use serde::Serialize;

/// Appended to every migrated note body.
pub const MIGRATION_MARKER: &str = "*(migrated from redmine)*";

/// A note payload and the user to post it as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertedNote {
    pub note: NewNote,
    /// GitLab username to impersonate; `None` posts as the token owner.
    pub sudo_user: Option<String>,
}

/// Converts journals carrying text into notes.
///
/// Journals without notes (bare status or field changes) are skipped.
pub fn convert_notes<'a>(
    journals: &'a [Journal],
    users: UserMapper<'a>,
) -> impl Iterator<Item = ConvertedNote> + 'a {
    journals.iter().filter_map(move |journal| {
        let text = journal.notes.as_deref().unwrap_or_default();
        if text.is_empty() {
            return None;
        }
        let context = format!("journal #{}", journal.id);
        Some(ConvertedNote {
            note: NewNote {
                body: format!("{text}\n\n{MIGRATION_MARKER}"),
                created_at: journal.created_on,
            },
            sudo_user: users.sudo_user(&journal.user, &context),
        })
    })
}
