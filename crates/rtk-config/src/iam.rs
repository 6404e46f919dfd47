//! Identity service (IAM) configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default bound on the auth status call.
const fn default_timeout_secs() -> u64 {
    5
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IamConfig {
    /// Base URL of the identity service (e.g., `https://iam.example.com`).
    #[serde(default)]
    pub base_url: String,

    /// Timeout for the `/auth/status/` call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for IamConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl IamConfig {
    /// Whether an identity service has been pointed at.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty()
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_is_not_configured() {
        let config = IamConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn configured_when_base_url_set() {
        let config = IamConfig {
            base_url: "https://iam.example.com".into(),
            ..Default::default()
        };
        assert!(config.is_configured());
    }
}
