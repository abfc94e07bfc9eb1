//! Migrator settings deserialization.

use crate::config::ConfigError;
use crate::gitlab::ProjectPath;
use crate::redmine::{ProjectUrl, PAGE_MAX_SIZE};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Parsed settings from a `migrator.toml` file.
///
/// Credentials are not part of the file; they are passed on the command line
/// or through the environment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct MigrationConfig {
    /// Redmine project to read from.
    pub redmine_project_url: String,

    /// GitLab project to write to.
    pub gitlab_project_url: String,

    /// GitLab username assigned to issues whose assignee cannot be mapped.
    pub fallback_assignee: Option<String>,

    /// Maximum number of issues read from Redmine.
    pub issue_limit: Option<usize>,

    /// Number of items requested per Redmine page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Whether issue attachments are saved locally.
    #[serde(default)]
    pub download_attachments: bool,

    /// Directory receiving downloaded attachments.
    #[serde(default = "default_downloads_dir")]
    pub downloads_dir: PathBuf,
}

pub fn default_page_size() -> u32 {
    PAGE_MAX_SIZE
}

pub fn default_downloads_dir() -> PathBuf {
    PathBuf::from("downloads")
}

impl MigrationConfig {
    /// Loads and validates the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is missing, unreadable, malformed
    /// or holds invalid values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::MissingFile {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        let config = Self::parse(&content, path)?;
        config.validate(path)?;
        Ok(config)
    }

    /// Parses settings from TOML text without validating them.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TomlError`] if `content` is not valid TOML for
    /// this structure. `path` is only used in the error.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::TomlError {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for the first invalid value.
    pub fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::ValidationError {
            path: path.display().to_string(),
            message,
        };

        ProjectUrl::parse(&self.redmine_project_url)
            .map_err(|e| invalid(format!("redmine-project-url: {e}")))?;
        ProjectPath::parse(&self.gitlab_project_url)
            .map_err(|e| invalid(format!("gitlab-project-url: {e}")))?;

        if !(1..=PAGE_MAX_SIZE).contains(&self.page_size) {
            return Err(invalid(format!(
                "page-size must be between 1 and {PAGE_MAX_SIZE}, got {}",
                self.page_size
            )));
        }

        if self.issue_limit == Some(0) {
            return Err(invalid("issue-limit must be greater than 0".to_string()));
        }

        if self
            .fallback_assignee
            .as_deref()
            .is_some_and(|login| login.trim().is_empty())
        {
            return Err(invalid("fallback-assignee cannot be empty".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const MINIMAL: &str = r#"
redmine-project-url = "https://redmine.example.com/projects/widgets"
gitlab-project-url = "https://gitlab.example.com/acme/widgets"
"#;

    #[test]
    fn applies_defaults() {
        let config = MigrationConfig::parse(MINIMAL, Path::new("migrator.toml")).unwrap();

        assert_eq!(config.page_size, 100);
        assert!(!config.download_attachments);
        assert_eq!(config.downloads_dir, PathBuf::from("downloads"));
        assert_eq!(config.fallback_assignee, None);
        assert_eq!(config.issue_limit, None);
    }

    #[test]
    fn loads_full_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("migrator.toml");
        fs::write(
            &path,
            r#"
redmine-project-url = "https://redmine.example.com/project/tools/widgets/"
gitlab-project-url = "https://gitlab.example.com/acme/widgets.git"
fallback-assignee = "triage-bot"
issue-limit = 25
page-size = 50
download-attachments = true
downloads-dir = "out/files"
"#,
        )
        .unwrap();

        let config = MigrationConfig::load(&path).unwrap();

        assert_eq!(config.fallback_assignee.as_deref(), Some("triage-bot"));
        assert_eq!(config.issue_limit, Some(25));
        assert_eq!(config.page_size, 50);
        assert!(config.download_attachments);
        assert_eq!(config.downloads_dir, PathBuf::from("out/files"));
    }

    #[test]
    fn missing_file() {
        let temp = TempDir::new().unwrap();
        let result = MigrationConfig::load(&temp.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::MissingFile { .. })));
    }

    #[test]
    fn malformed_toml() {
        let result = MigrationConfig::parse("redmine-project-url = ", Path::new("x.toml"));
        assert!(matches!(result, Err(ConfigError::TomlError { .. })));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let content = format!("{MINIMAL}\nredmine-api-key = \"secret\"\n");
        let result = MigrationConfig::parse(&content, Path::new("x.toml"));
        assert!(matches!(result, Err(ConfigError::TomlError { .. })));
    }

    #[test]
    fn rejects_out_of_range_page_size() {
        for page_size in [0, 101] {
            let content = format!("{MINIMAL}\npage-size = {page_size}\n");
            let config = MigrationConfig::parse(&content, Path::new("x.toml")).unwrap();
            assert!(matches!(
                config.validate(Path::new("x.toml")),
                Err(ConfigError::ValidationError { .. })
            ));
        }
    }

    #[test]
    fn rejects_zero_issue_limit() {
        let content = format!("{MINIMAL}\nissue-limit = 0\n");
        let config = MigrationConfig::parse(&content, Path::new("x.toml")).unwrap();
        assert!(matches!(
            config.validate(Path::new("x.toml")),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn rejects_blank_fallback_assignee() {
        let content = format!("{MINIMAL}\nfallback-assignee = \"  \"\n");
        let config = MigrationConfig::parse(&content, Path::new("x.toml")).unwrap();
        assert!(matches!(
            config.validate(Path::new("x.toml")),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn rejects_non_project_urls() {
        let content = r#"
redmine-project-url = "https://redmine.example.com/issues"
gitlab-project-url = "https://gitlab.example.com/acme/widgets"
"#;
        let config = MigrationConfig::parse(content, Path::new("x.toml")).unwrap();
        let err = config.validate(Path::new("x.toml")).unwrap_err();
        assert!(err.to_string().contains("redmine-project-url"));

        let content = r#"
redmine-project-url = "https://redmine.example.com/projects/widgets"
gitlab-project-url = "ftp://gitlab.example.com/acme/widgets"
"#;
        let config = MigrationConfig::parse(content, Path::new("x.toml")).unwrap();
        let err = config.validate(Path::new("x.toml")).unwrap_err();
        assert!(err.to_string().contains("gitlab-project-url"));
    }
}
