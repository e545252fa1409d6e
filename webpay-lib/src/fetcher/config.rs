//! Configuration for manifest downloads.

use serde::{Deserialize, Serialize};

use crate::{Result, WebPayError};

/// Settings shared by every manifest fetch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Largest manifest body accepted, in bytes.
    #[serde(default = "default_max_manifest_bytes")]
    pub max_manifest_bytes: usize,

    /// Redirects followed before giving up.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// User-Agent header. The HTTP client default is used when unset.
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_timeout() -> u64 {
    10
}

fn default_max_manifest_bytes() -> usize {
    1024 * 1024 // 1 MiB
}

fn default_max_redirects() -> usize {
    5
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_manifest_bytes: default_max_manifest_bytes(),
            max_redirects: default_max_redirects(),
            user_agent: None,
        }
    }
}

impl FetcherConfig {
    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the body size cap.
    pub fn with_max_manifest_bytes(mut self, bytes: usize) -> Self {
        self.max_manifest_bytes = bytes;
        self
    }

    /// Set the redirect limit.
    pub fn with_max_redirects(mut self, redirects: usize) -> Self {
        self.max_redirects = redirects;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Timeout in milliseconds, as reported in errors.
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_secs.saturating_mul(1000)
    }

    /// Reject settings that would make every fetch fail.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(WebPayError::Config("timeout_secs must be positive".into()));
        }
        if self.max_manifest_bytes == 0 {
            return Err(WebPayError::Config(
                "max_manifest_bytes must be positive".into(),
            ));
        }
        Ok(())
    }
}
