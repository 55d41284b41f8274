use std::path::PathBuf;

use smotree_core::export::DEFAULT_MARKER_PREFIX;

/// Author recorded when neither `--author` nor `SMOTREE_USER_NAME` is set.
pub const DEFAULT_AUTHOR: &str = "Anonymous";

/// CLI configuration loaded from environment variables.
///
/// All fields have defaults suitable for a single local user.
#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    /// SQLite URL (default: `sqlite://smotree.db`).
    pub database_url: String,
    /// Directory exports are written to (default: `.`).
    pub export_dir: PathBuf,
    /// Product name in marker names and sequence titles (default: `SmoTree`).
    pub marker_prefix: String,
    /// Default comment author.
    pub user_name: Option<String>,
}

impl CliConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default               |
    /// |-------------------------|-----------------------|
    /// | `DATABASE_URL`          | `sqlite://smotree.db` |
    /// | `SMOTREE_EXPORT_DIR`    | `.`                   |
    /// | `SMOTREE_MARKER_PREFIX` | `SmoTree`             |
    /// | `SMOTREE_USER_NAME`     | unset                 |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = non_empty("DATABASE_URL").unwrap_or_else(|| "sqlite://smotree.db".into());
        let export_dir = non_empty("SMOTREE_EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let marker_prefix =
            non_empty("SMOTREE_MARKER_PREFIX").unwrap_or_else(|| DEFAULT_MARKER_PREFIX.into());
        let user_name = non_empty("SMOTREE_USER_NAME").map(|v| v.trim().to_string());

        Self {
            database_url,
            export_dir,
            marker_prefix,
            user_name,
        }
    }

    /// Pick the author for a new comment: explicit value, then configured user.
    pub fn author(&self, explicit: Option<String>) -> String {
        explicit
            .or_else(|| self.user_name.clone())
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string())
    }
}
