//! Redmine REST resources, as returned by the JSON API.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Id of the built-in Redmine anonymous user.
pub const ANONYMOUS_USER_ID: u64 = 2;

/// A `{id, name}` reference to another resource (tracker, status, user...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

/// Issue as returned by the detail endpoint with all includes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: u64,
    pub subject: String,
    #[serde(default)]
    pub description: Option<String>,
    pub tracker: NamedRef,
    pub status: NamedRef,
    pub priority: NamedRef,
    pub author: NamedRef,
    #[serde(default)]
    pub assigned_to: Option<NamedRef>,
    #[serde(default)]
    pub watchers: Vec<NamedRef>,
    #[serde(default)]
    pub journals: Vec<Journal>,
    #[serde(default)]
    pub relations: Vec<Relation>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub fixed_version: Option<NamedRef>,
    pub created_on: DateTime<Utc>,
    #[serde(default)]
    pub closed_on: Option<DateTime<Utc>>,
}

/// Only the id is read from listing entries; details are fetched per issue.
#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct IssueRef {
    pub id: u64,
}

/// A change record on an issue. Status-only changes carry no notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journal {
    pub id: u64,
    pub user: NamedRef,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_on: DateTime<Utc>,
}

/// A formal relation between two issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub id: u64,
    pub issue_id: u64,
    pub issue_to_id: u64,
    pub relation_type: String,
    #[serde(default)]
    pub delay: Option<i64>,
}

/// File attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: u64,
    pub filename: String,
    pub content_url: String,
    #[serde(default)]
    pub filesize: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub login: String,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub mail: Option<String>,
}

/// Sharing state of a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionStatus {
    Open,
    Locked,
    Closed,
}

/// A project version (release target).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: VersionStatus,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    pub created_on: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VersionList {
    pub versions: Vec<Version>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_issue_with_optional_fields_missing() {
        let issue: Issue = serde_json::from_value(json!({
            "id": 7,
            "subject": "Broken link",
            "description": null,
            "tracker": { "id": 1, "name": "Bug" },
            "status": { "id": 1, "name": "New" },
            "priority": { "id": 2, "name": "Normal" },
            "author": { "id": 5, "name": "Jane Doe" },
            "created_on": "2019-05-04T10:11:12Z"
        }))
        .unwrap();

        assert_eq!(issue.id, 7);
        assert_eq!(issue.description, None);
        assert!(issue.assigned_to.is_none());
        assert!(issue.journals.is_empty());
        assert!(issue.closed_on.is_none());
    }

    #[test]
    fn parses_version_status_and_due_date() {
        let version: Version = serde_json::from_value(json!({
            "id": 3,
            "name": "1.0",
            "description": "First release",
            "status": "closed",
            "due_date": "2020-03-01",
            "created_on": "2019-12-01T08:00:00Z"
        }))
        .unwrap();

        assert_eq!(version.status, VersionStatus::Closed);
        assert_eq!(
            version.due_date,
            Some(NaiveDate::from_ymd_opt(2020, 3, 1).unwrap())
        );
    }
}
