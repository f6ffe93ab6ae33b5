use std::env;
use std::path::PathBuf;

pub const ENV_NAVIGATION_TIMEOUT_MS: &str = "PROSPECT_NAVIGATION_TIMEOUT_MS";
pub const ENV_USER_AGENTS_FILE: &str = "PROSPECT_USER_AGENTS_FILE";

const DEFAULT_NAVIGATION_TIMEOUT_MS: u64 = 30_000;

/// Environment-derived settings, read once at startup and passed by value
/// into the session configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub navigation_timeout_ms: u64,
    pub user_agents_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            navigation_timeout_ms: DEFAULT_NAVIGATION_TIMEOUT_MS,
            user_agents_file: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let navigation_timeout_ms = lookup(ENV_NAVIGATION_TIMEOUT_MS)
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_NAVIGATION_TIMEOUT_MS);
        let user_agents_file = lookup(ENV_USER_AGENTS_FILE)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        Self {
            navigation_timeout_ms,
            user_agents_file,
        }
    }
}
