//! Environment-driven settings
//!
//! The command line only takes the three generate arguments, so everything
//! else is read from the environment:
//!
//! - `ROS_RECIPE_GITHUB_URL` - base URL archives are fetched from
//! - `ROS_RECIPE_HTTP_TIMEOUT` - download timeout in seconds (default: none)
//! - `ROS_RECIPE_KEEP_SOURCES` - keep the archive and extracted tree
//! - `ROS_RECIPE_STRICT_LICENSE` - fail on licenses without a known checksum

use std::time::Duration;

/// Default archive host
pub const DEFAULT_GITHUB_URL: &str = "https://github.com";

const MIN_TIMEOUT_SECS: u64 = 5;
const MAX_TIMEOUT_SECS: u64 = 600;

/// Settings for one generator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Base URL the source archive is fetched from, without trailing slash.
    pub github_url: String,
    /// Download timeout. `None` blocks until the transfer ends.
    pub http_timeout: Option<Duration>,
    /// Leave the archive and extracted directory behind.
    pub keep_sources: bool,
    /// Treat a license missing from the digest table as an error.
    pub strict_license: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            github_url: DEFAULT_GITHUB_URL.to_string(),
            http_timeout: None,
            keep_sources: false,
            strict_license: false,
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let github_url = lookup("ROS_RECIPE_GITHUB_URL")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_GITHUB_URL.to_string());

        // Clamp to a sane range; garbage means no timeout
        let http_timeout = lookup("ROS_RECIPE_HTTP_TIMEOUT")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(|secs| Duration::from_secs(secs.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS)));

        Self {
            github_url,
            http_timeout,
            keep_sources: lookup("ROS_RECIPE_KEEP_SOURCES").is_some_and(|v| is_truthy(&v)),
            strict_license: lookup("ROS_RECIPE_STRICT_LICENSE").is_some_and(|v| is_truthy(&v)),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
