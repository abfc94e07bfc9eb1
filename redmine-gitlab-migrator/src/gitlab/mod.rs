//! GitLab destination accessor.
//!
//! Creates milestones, issues and notes in a single GitLab project. Issues and
//! notes can be created on behalf of another user through the `sudo`
//! parameter, which requires an administrator token.

mod error;
mod models;
mod project_url;

pub use error::GitlabError;
pub use models::{
    CreatedIssue, CreatedNote, GitlabUser, Milestone, NewIssue, NewMilestone, NewNote,
};
pub use project_url::ProjectPath;

use crate::client::{query, HttpClient, Query, Transport};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{debug, info};

/// Header carrying the GitLab access token.
pub const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// Page size used for GitLab listings.
const PER_PAGE: usize = 100;

/// GitLab users by username.
pub type GitlabUserIndex = HashMap<String, GitlabUser>;

/// Project milestones by title.
pub type MilestoneIndex = HashMap<String, Milestone>;

/// A GitLab project and the transport used to reach it.
pub struct GitlabProject {
    transport: Box<dyn Transport>,
    project: ProjectPath,
}

impl GitlabProject {
    /// Creates an accessor for the project at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`GitlabError::InvalidProjectUrl`] if `url` cannot be parsed.
    pub fn new(transport: Box<dyn Transport>, url: &str) -> Result<Self, GitlabError> {
        let project = ProjectPath::parse(url)?;
        info!(
            project = %project.path(),
            instance = %project.instance_url(),
            "Using GitLab project"
        );
        Ok(Self { transport, project })
    }

    /// Creates an accessor authenticated with an access token.
    ///
    /// # Errors
    ///
    /// Returns [`GitlabError`] if the URL or the token is invalid.
    pub fn with_token(url: &str, token: &str) -> Result<Self, GitlabError> {
        let http = HttpClient::new(TOKEN_HEADER, token)?;
        Self::new(Box::new(http), url)
    }

    /// Returns the project location.
    #[must_use]
    pub fn project(&self) -> &ProjectPath {
        &self.project
    }

    /// Looks up the given logins and indexes the accounts that exist.
    ///
    /// Usernames match case-insensitively and the index is keyed by the
    /// requested login. Logins without a GitLab account are left out.
    ///
    /// # Errors
    ///
    /// Returns [`GitlabError`] if a lookup request fails.
    pub async fn users_index<'a>(
        &self,
        logins: impl IntoIterator<Item = &'a str>,
    ) -> Result<GitlabUserIndex, GitlabError> {
        let url = format!("{}/users", self.project.api_url());
        let mut index = GitlabUserIndex::new();

        for login in logins {
            if index.contains_key(login) {
                continue;
            }
            let users: Vec<GitlabUser> = self.get(&url, query(&[("username", login)])).await?;
            let found = users
                .into_iter()
                .find(|user| user.username.eq_ignore_ascii_case(login));
            match found {
                Some(user) => {
                    index.insert(login.to_string(), user);
                }
                None => debug!(login, "No GitLab account"),
            }
        }
        Ok(index)
    }

    /// Returns all milestones of the project, open and closed.
    ///
    /// # Errors
    ///
    /// Returns [`GitlabError`] if a page request fails.
    pub async fn milestones(&self) -> Result<Vec<Milestone>, GitlabError> {
        let url = format!("{}/milestones", self.project.project_api_url());
        let mut milestones = Vec::new();

        let per_page = PER_PAGE.to_string();
        for page in 1u32.. {
            let page = page.to_string();
            let page_query = query(&[("per_page", per_page.as_str()), ("page", page.as_str())]);
            let batch: Vec<Milestone> = self.get(&url, page_query).await?;
            let last = batch.len() < PER_PAGE;
            milestones.extend(batch);
            if last {
                break;
            }
        }
        Ok(milestones)
    }

    /// Returns the project milestones indexed by title.
    ///
    /// # Errors
    ///
    /// Returns [`GitlabError`] if the listing fails.
    pub async fn milestones_index(&self) -> Result<MilestoneIndex, GitlabError> {
        Ok(self
            .milestones()
            .await?
            .into_iter()
            .map(|milestone| (milestone.title.clone(), milestone))
            .collect())
    }

    /// Creates a milestone.
    ///
    /// # Errors
    ///
    /// Returns [`GitlabError`] if the request fails.
    pub async fn create_milestone(
        &self,
        milestone: &NewMilestone,
    ) -> Result<Milestone, GitlabError> {
        let url = format!("{}/milestones", self.project.project_api_url());
        self.post(&url, Query::new(), milestone).await
    }

    /// Closes a milestone.
    ///
    /// # Errors
    ///
    /// Returns [`GitlabError`] if the request fails.
    pub async fn close_milestone(&self, milestone_id: u64) -> Result<Milestone, GitlabError> {
        let url = format!(
            "{}/milestones/{}",
            self.project.project_api_url(),
            milestone_id
        );
        self.put(&url, Query::new(), &json!({ "state_event": "close" }))
            .await
    }

    /// Creates an issue, impersonating `sudo_user` when given.
    ///
    /// # Errors
    ///
    /// Returns [`GitlabError`] if the request fails.
    pub async fn create_issue(
        &self,
        issue: &NewIssue,
        sudo_user: Option<&str>,
    ) -> Result<CreatedIssue, GitlabError> {
        let url = format!("{}/issues", self.project.project_api_url());
        self.post(&url, sudo_query(sudo_user), issue).await
    }

    /// Adds a note to an issue, impersonating `sudo_user` when given.
    ///
    /// # Errors
    ///
    /// Returns [`GitlabError`] if the request fails.
    pub async fn create_note(
        &self,
        issue_iid: u64,
        note: &NewNote,
        sudo_user: Option<&str>,
    ) -> Result<CreatedNote, GitlabError> {
        let url = format!(
            "{}/issues/{}/notes",
            self.project.project_api_url(),
            issue_iid
        );
        self.post(&url, sudo_query(sudo_user), note).await
    }

    /// Closes an issue.
    ///
    /// # Errors
    ///
    /// Returns [`GitlabError`] if the request fails.
    pub async fn close_issue(&self, issue_iid: u64) -> Result<CreatedIssue, GitlabError> {
        let url = format!("{}/issues/{}", self.project.project_api_url(), issue_iid);
        self.put(&url, Query::new(), &json!({ "state_event": "close" }))
            .await
    }

    async fn get<T: DeserializeOwned>(&self, url: &str, query: Query) -> Result<T, GitlabError> {
        let response = self.transport.get(url, &query).await?;
        decode(url, response)
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        url: &str,
        query: Query,
        body: &B,
    ) -> Result<T, GitlabError> {
        let body = encode(url, body)?;
        let response = self.transport.post(url, &query, &body).await?;
        decode(url, response)
    }

    async fn put<T: DeserializeOwned>(
        &self,
        url: &str,
        query: Query,
        body: &Value,
    ) -> Result<T, GitlabError> {
        let response = self.transport.put(url, &query, body).await?;
        decode(url, response)
    }
}

fn sudo_query(sudo_user: Option<&str>) -> Query {
    sudo_user
        .map(|user| query(&[("sudo", user)]))
        .unwrap_or_default()
}

fn encode<B: Serialize>(url: &str, body: &B) -> Result<Value, GitlabError> {
    serde_json::to_value(body).map_err(|source| GitlabError::InvalidPayload {
        url: url.to_string(),
        source,
    })
}

fn decode<T: DeserializeOwned>(url: &str, value: Value) -> Result<T, GitlabError> {
    serde_json::from_value(value).map_err(|source| GitlabError::UnexpectedResponse {
        url: url.to_string(),
        source,
    })
}
