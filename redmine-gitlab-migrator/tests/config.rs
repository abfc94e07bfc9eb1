use std::path::PathBuf;

use redmine_gitlab_migrator::{ConfigError, MigrationConfig};

fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/config")
}

#[test]
fn load_config_from_fixture() {
    let config = MigrationConfig::load(&fixtures_root().join("migrator.toml")).unwrap();

    assert_eq!(
        config.redmine_project_url,
        "https://redmine.example.com/project/tools/widgets/"
    );
    assert_eq!(config.fallback_assignee.as_deref(), Some("triage-bot"));
    assert_eq!(config.issue_limit, Some(500));
    assert_eq!(config.page_size, 100);
    assert!(config.download_attachments);
    assert_eq!(config.downloads_dir, PathBuf::from("downloads"));
}

#[test]
fn load_config_rejects_out_of_range_page_size() {
    let result = MigrationConfig::load(&fixtures_root().join("bad-page-size.toml"));

    assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
}

#[test]
fn load_config_rejects_malformed_toml() {
    let result = MigrationConfig::load(&fixtures_root().join("malformed.toml"));

    assert!(matches!(result, Err(ConfigError::TomlError { .. })));
}

#[test]
fn load_config_reports_missing_file() {
    let result = MigrationConfig::load(&fixtures_root().join("absent.toml"));

    assert!(matches!(result, Err(ConfigError::MissingFile { .. })));
}
