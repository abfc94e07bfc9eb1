//! Relation stringification.
//!
//! GitLab has no typed issue relations for the migrated data; relations are
//! rendered as `#<id>` mentions in the description instead.

use crate::redmine::Relation;

/// Renders relations as `"<type> #<other issue>"`, comma separated.
///
/// The other issue is whichever side of the relation is not `issue_id`, so
/// the same relation reads correctly from both ends.
#[must_use]
pub fn relations_to_string(relations: &[Relation], issue_id: u64) -> String {
    relations
        .iter()
        .map(|relation| {
            let other = if relation.issue_id == issue_id {
                relation.issue_to_id
            } else {
                relation.issue_id
            };
            format!("{} #{}", relation.relation_type, other)
        })
        .collect::<Vec<_>>()
        .join(", ")
}
