#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod client;
pub mod config;
pub mod convert;
pub mod gitlab;
pub mod redmine;
pub mod runner;
pub mod summary;

pub use client::{ClientError, HttpClient, PaginationError, Transport};
pub use config::{ConfigError, MigrationConfig, DEFAULT_CONFIG_FILE};
pub use convert::{
    convert_issue, convert_notes, convert_version, issue_labels, relations_to_string,
    ConversionContext, ConvertedIssue, ConvertedMilestone, ConvertedNote, IssueLabel,
    IssueMeta, UserMapper,
};
pub use gitlab::{GitlabError, GitlabProject, GitlabUserIndex, MilestoneIndex, ProjectPath};
pub use redmine::{
    participant_ids, ProjectUrl, RedmineClient, RedmineError, RedmineProject, RedmineUserIndex,
};
pub use runner::{Runner, RunnerConfig, RunnerError};
pub use summary::{ProcessingResult, RunSummary};
