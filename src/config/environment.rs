//! Environment variable loading.

use std::env;
use std::path::Path;

use crate::observability::LogLevel;

/// Loads an optional `.env` file and reads the variables the framework
/// cares about.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentLoader {
    env_file: Option<String>,
}

impl EnvironmentLoader {
    /// Initialize the environment loader.
    ///
    /// # Arguments
    /// * `env_file` - Path to a .env file. Only an explicitly given file is
    ///   loaded, so a stray `.env` in the working folder never changes
    ///   behaviour.
    pub fn new(env_file: Option<&Path>) -> Self {
        if let Some(path) = env_file {
            if path.exists() {
                if let Err(e) = dotenv::from_path(path) {
                    tracing::warn!("Failed to load .env file {}: {}", path.display(), e);
                }
            }
        }

        Self {
            env_file: env_file.map(|p| p.to_string_lossy().to_string()),
        }
    }

    /// The .env file given at construction, if any.
    pub fn env_file(&self) -> Option<&str> {
        self.env_file.as_deref()
    }

    /// Name of the variable holding the default log level for `app_name`,
    /// e.g. `XPM_LOG_LEVEL` for `xpm`.
    pub fn log_level_var(app_name: &str) -> String {
        let prefix: String = app_name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect();
        format!("{}_LOG_LEVEL", prefix)
    }

    /// Default log level for `app_name` from the environment.
    ///
    /// Unparsable values are ignored with a warning.
    pub fn log_level(&self, app_name: &str) -> Option<LogLevel> {
        let var = Self::log_level_var(app_name);
        let value = env::var(&var).ok()?;
        match value.parse() {
            Ok(level) => Some(level),
            Err(e) => {
                tracing::warn!("Ignoring {}: {}", var, e);
                None
            }
        }
    }

    /// Whether `NO_COLOR` is set to a non-empty value.
    pub fn no_color(&self) -> bool {
        env::var("NO_COLOR").map(|v| !v.is_empty()).unwrap_or(false)
    }
}
