//! Coordinator configuration

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// How an imported sequence baseline combines with the local counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AugmentPolicy {
    /// Keep the larger of the local counter and the imported value
    #[default]
    Monotonic,
    /// Replace the local counter with the imported value
    Overwrite,
}

/// Configuration for a transaction coordinator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Identifier used in log output
    pub coordinator_id: String,

    /// Policy applied when importing sequence state from metadata
    pub augment_policy: AugmentPolicy,

    /// Restart the transaction into a new epoch when the chain reports a
    /// transaction retry error
    pub restart_on_retry_error: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            coordinator_id: "coordinator".to_string(),
            augment_policy: AugmentPolicy::Monotonic,
            restart_on_retry_error: true,
        }
    }
}

impl CoordinatorConfig {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            CoordinatorConfig::from_json(r#"{ "augment_policy": "overwrite" }"#).unwrap();

        assert_eq!(config.augment_policy, AugmentPolicy::Overwrite);
        assert!(config.restart_on_retry_error);
        assert_eq!(config.coordinator_id, "coordinator");
    }

    #[test]
    fn test_invalid_policy_rejected() {
        assert!(CoordinatorConfig::from_json(r#"{ "augment_policy": "merge" }"#).is_err());
    }
}
