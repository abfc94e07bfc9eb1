//! Redmine source accessor.
//!
//! This module reads issues, participants and versions of a single Redmine
//! project. Issue details are fetched once per run and kept in memory.

mod client;
mod error;
mod models;
mod project_url;

pub use client::{unwrap_single_key, RedmineClient, API_KEY_HEADER, PAGE_MAX_SIZE};
pub use error::RedmineError;
pub use models::{
    Attachment, Issue, Journal, NamedRef, Relation, User, Version, VersionStatus,
    ANONYMOUS_USER_ID,
};
pub use project_url::ProjectUrl;

use client::decode;
use futures::TryStreamExt;
use models::{IssueRef, VersionList};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::pin::pin;
use tokio::sync::OnceCell;
use tracing::{debug, info, info_span, Instrument};

/// Redmine users by numeric id.
pub type RedmineUserIndex = HashMap<u64, User>;

/// Associations requested with each issue detail.
const ISSUE_INCLUDES: &str = "journals,watchers,relations,children,attachments";

/// An attachment written to the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedAttachment {
    /// Source attachment id.
    pub id: u64,
    /// Local path of the file.
    pub path: PathBuf,
    /// Number of bytes written.
    pub bytes: u64,
}

/// A Redmine project and the client used to read it.
pub struct RedmineProject {
    client: RedmineClient,
    url: ProjectUrl,
    api_key: String,
    issue_limit: Option<usize>,
    issues: OnceCell<Vec<Issue>>,
}

impl RedmineProject {
    /// Creates an accessor for the project at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`RedmineError::InvalidProjectUrl`] if `url` is not a project URL.
    pub fn new(client: RedmineClient, url: &str, api_key: &str) -> Result<Self, RedmineError> {
        let url = ProjectUrl::parse(url)?;
        info!(
            project = %url.public_url(),
            instance = %url.instance_url(),
            "Using Redmine project"
        );
        Ok(Self {
            client,
            url,
            api_key: api_key.to_string(),
            issue_limit: None,
            issues: OnceCell::new(),
        })
    }

    /// Caps the number of issues read from the project.
    #[must_use]
    pub fn with_issue_limit(mut self, issue_limit: Option<usize>) -> Self {
        self.issue_limit = issue_limit;
        self
    }

    /// Returns the canonical project location.
    #[must_use]
    pub fn url(&self) -> &ProjectUrl {
        &self.url
    }

    /// Returns every issue of the project (open and closed) with journals,
    /// watchers, relations and attachments.
    ///
    /// The list is fetched on first call and reused afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`RedmineError`] if the listing or a detail request fails.
    pub async fn issues(&self) -> Result<&[Issue], RedmineError> {
        self.issues
            .get_or_try_init(|| self.fetch_issues())
            .await
            .map(Vec::as_slice)
    }

    async fn fetch_issues(&self) -> Result<Vec<Issue>, RedmineError> {
        let listing_url = format!("{}/issues.json", self.url.public_url());
        let span = info_span!("fetch_issues", url = %listing_url);

        async {
            let (ids, truncated) = self.issue_ids(&listing_url).await?;
            if truncated {
                info!(
                    limit = ids.len(),
                    "Issue limit reached, remaining issues are ignored"
                );
            }
            info!(count = ids.len(), "Fetching issue details");

            let query = vec![("include".to_string(), ISSUE_INCLUDES.to_string())];
            let mut issues = Vec::with_capacity(ids.len());
            for id in ids {
                let url = format!("{}/issues/{}.json", self.url.instance_url(), id);
                let issue: Issue = self.client.get(&url, &query).await?;
                debug!(issue_id = issue.id, "Fetched issue");
                issues.push(issue);
            }
            Ok(issues)
        }
        .instrument(span)
        .await
    }

    /// Lists issue ids, stopping at the configured limit.
    ///
    /// The flag is set when the listing still had issues past the limit.
    async fn issue_ids(&self, listing_url: &str) -> Result<(Vec<u64>, bool), RedmineError> {
        let query = vec![("status_id".to_string(), "*".to_string())];
        let limit = self.issue_limit.unwrap_or(usize::MAX);
        let mut listing = pin!(self.client.list(listing_url, query));
        let mut ids = Vec::new();

        while let Some(item) = listing.try_next().await? {
            if ids.len() == limit {
                return Ok((ids, true));
            }
            let issue: IssueRef = decode(listing_url, item)?;
            ids.push(issue.id);
        }
        Ok((ids, false))
    }

    /// Returns the users taking part in issues of the project.
    ///
    /// Authors, assignees, watchers and journal authors are included; the
    /// anonymous user is not.
    ///
    /// # Errors
    ///
    /// Returns [`RedmineError`] if issues or users cannot be fetched.
    pub async fn participants(&self) -> Result<Vec<User>, RedmineError> {
        let ids = participant_ids(self.issues().await?);
        info!(count = ids.len(), "Fetching participants");

        let mut users = Vec::with_capacity(ids.len());
        for id in ids {
            let url = format!("{}/users/{}.json", self.url.instance_url(), id);
            let user: User = self.client.get(&url, &[]).await?;
            users.push(user);
        }
        Ok(users)
    }

    /// Returns the participants indexed by id.
    ///
    /// # Errors
    ///
    /// Returns [`RedmineError`] if participants cannot be fetched.
    pub async fn users_index(&self) -> Result<RedmineUserIndex, RedmineError> {
        Ok(self
            .participants()
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect())
    }

    /// Returns the versions of the project.
    ///
    /// # Errors
    ///
    /// Returns [`RedmineError`] if the request fails.
    pub async fn versions(&self) -> Result<Vec<Version>, RedmineError> {
        let url = format!("{}/versions.json", self.url.public_url());
        let list: VersionList = self.client.get_raw(&url, &[]).await?;
        Ok(list.versions)
    }

    /// Downloads the attachments of `issue` into `<downloads_dir>/<issue id>/`.
    ///
    /// # Errors
    ///
    /// Returns [`RedmineError`] on the first failed download.
    pub async fn download_attachments(
        &self,
        issue: &Issue,
        downloads_dir: &Path,
    ) -> Result<Vec<DownloadedAttachment>, RedmineError> {
        let mut downloaded = Vec::with_capacity(issue.attachments.len());
        for attachment in &issue.attachments {
            let path = attachment_path(downloads_dir, issue.id, attachment);
            let bytes = self
                .client
                .download(&attachment.content_url, &self.api_key, &path)
                .await?;
            debug!(issue_id = issue.id, file = %path.display(), bytes, "Downloaded attachment");
            downloaded.push(DownloadedAttachment {
                id: attachment.id,
                path,
                bytes,
            });
        }
        Ok(downloaded)
    }
}

/// Collects the ids of every user referenced by `issues`, without the
/// anonymous user.
#[must_use]
pub fn participant_ids(issues: &[Issue]) -> BTreeSet<u64> {
    issues
        .iter()
        .flat_map(|issue| {
            issue
                .watchers
                .iter()
                .chain(std::iter::once(&issue.author))
                .chain(issue.assigned_to.iter())
                .chain(issue.journals.iter().map(|journal| &journal.user))
                .map(|user| user.id)
        })
        .filter(|id| *id != ANONYMOUS_USER_ID)
        .collect()
}

/// Local path of an attachment; only the file name part of the source name is
/// kept.
#[must_use]
pub fn attachment_path(downloads_dir: &Path, issue_id: u64, attachment: &Attachment) -> PathBuf {
    let file_name = Path::new(&attachment.filename)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("attachment-{}", attachment.id));
    downloads_dir.join(issue_id.to_string()).join(file_name)
}
