//! Migrator configuration loading.
//!
//! Settings live in a kebab-case TOML file, `migrator.toml` by default:
//!
//! ```toml
//! redmine-project-url = "https://redmine.example.com/projects/widgets"
//! gitlab-project-url = "https://gitlab.example.com/acme/widgets"
//! fallback-assignee = "triage-bot"
//! issue-limit = 500
//! page-size = 100
//! download-attachments = true
//! downloads-dir = "downloads"
//! ```

mod error;
mod settings;

pub use error::ConfigError;
pub use settings::{default_downloads_dir, default_page_size, MigrationConfig};

/// Configuration file read when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "migrator.toml";
