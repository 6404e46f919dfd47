//! Local database configuration.

use serde::{Deserialize, Serialize};

fn default_path() -> String {
    "risktool.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path of the local libSQL database file.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_points_at_local_file() {
        assert_eq!(DatabaseConfig::default().path, "risktool.db");
    }
}
