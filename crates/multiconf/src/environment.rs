//! Deployment environment classification of the `ENV` value.
//!
//! The literal sets are data, not code: they default to the table below and
//! can be replaced through the builder, or deserialized from a config value.
//!
//! | Environment   | Values (case-insensitive)     |
//! |---------------|-------------------------------|
//! | `Local`       | `loc`                         |
//! | `Development` | `dev`                         |
//! | `Testing`     | `test`, `testing`             |
//! | `Staging`     | `stage`, `staging`            |
//! | `Production`  | `prod`, `production`, `live`  |

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Local,
    Development,
    Testing,
    Staging,
    Production,
}

impl AppEnvironment {
    pub const ALL: [AppEnvironment; 5] = [
        AppEnvironment::Local,
        AppEnvironment::Development,
        AppEnvironment::Testing,
        AppEnvironment::Staging,
        AppEnvironment::Production,
    ];
}

/// Accepted `ENV` values per environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentSets {
    pub local: Vec<String>,
    pub development: Vec<String>,
    pub testing: Vec<String>,
    pub staging: Vec<String>,
    pub production: Vec<String>,
}

impl Default for EnvironmentSets {
    fn default() -> Self {
        fn set(values: &[&str]) -> Vec<String> {
            values.iter().map(|v| v.to_string()).collect()
        }
        Self {
            local: set(&["loc"]),
            development: set(&["dev"]),
            testing: set(&["test", "testing"]),
            staging: set(&["stage", "staging"]),
            production: set(&["prod", "production", "live"]),
        }
    }
}

impl EnvironmentSets {
    pub fn values(&self, environment: AppEnvironment) -> &[String] {
        match environment {
            AppEnvironment::Local => &self.local,
            AppEnvironment::Development => &self.development,
            AppEnvironment::Testing => &self.testing,
            AppEnvironment::Staging => &self.staging,
            AppEnvironment::Production => &self.production,
        }
    }

    /// Whether `raw` (compared lower-cased) belongs to `environment`.
    pub fn matches(&self, environment: AppEnvironment, raw: &str) -> bool {
        let raw = raw.trim().to_lowercase();
        self.values(environment)
            .iter()
            .any(|value| value.to_lowercase() == raw)
    }

    /// First environment whose set contains `raw`.
    pub fn classify(&self, raw: &str) -> Option<AppEnvironment> {
        AppEnvironment::ALL
            .into_iter()
            .find(|environment| self.matches(*environment, raw))
    }
}
