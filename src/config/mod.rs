use crate::errors::{GatorError, GatorResult};

pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub current_user: Option<String>,
    pub log_level: String,
}

impl Config {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<std::path::PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    pub fn from_env() -> GatorResult<Self> {
        let exe_dir = Self::exe_dir();

        // Try to load .env from executable's directory first
        if let Some(ref dir) = exe_dir {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        // Fall back to current directory
        dotenvy::dotenv().ok();

        // Default db_path is relative to executable directory
        let db_path = std::env::var("GATOR_DB_PATH").unwrap_or_else(|_| {
            exe_dir
                .map(|d| d.join("gator.db").to_string_lossy().into_owned())
                .unwrap_or_else(|| "./gator.db".to_string())
        });

        let current_user = std::env::var("GATOR_USER")
            .ok()
            .filter(|name| !name.trim().is_empty());

        let log_level =
            std::env::var("GATOR_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());

        Ok(Self {
            db_path,
            current_user,
            log_level,
        })
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_overrides(mut self, db_path: Option<String>, user: Option<String>) -> Self {
        if let Some(db_path) = db_path {
            self.db_path = db_path;
        }
        if let Some(user) = user.filter(|name| !name.trim().is_empty()) {
            self.current_user = Some(user);
        }
        self
    }

    /// Name of the user follow-scoped commands act on.
    pub fn require_user(&self) -> GatorResult<&str> {
        self.current_user.as_deref().ok_or_else(|| {
            GatorError::Config(
                "no current user; pass --user <name> or set GATOR_USER".to_string(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            db_path: "gator.db".to_string(),
            current_user: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }

    #[test]
    fn test_overrides_replace_env_values() {
        let config = config().with_overrides(Some("/tmp/other.db".to_string()), Some("kahya".to_string()));
        assert_eq!(config.db_path, "/tmp/other.db");
        assert_eq!(config.current_user.as_deref(), Some("kahya"));
    }

    #[test]
    fn test_blank_user_override_is_ignored() {
        let config = config().with_overrides(None, Some("  ".to_string()));
        assert!(config.current_user.is_none());
        assert_eq!(config.db_path, "gator.db");
    }

    #[test]
    fn test_require_user_without_user_fails() {
        let result = config().require_user().map(str::to_string);
        assert!(matches!(result, Err(GatorError::Config(_))));
    }
}
