//! Configuration for flowquery
//!
//! Settings that shape evaluation and the conventions of the JSON object model.

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, Result};

/// Default bound on operations executed per evaluation
pub const DEFAULT_MAX_OPERATIONS: u64 = 10_000;

/// Query engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Maximum operations executed while forcing one evaluation.
    /// Operations that keep pushing work can otherwise loop forever.
    /// `None` removes the bound.
    pub max_operations: Option<u64>,
    /// Property holding an object's identifier (matched by `#id` filters)
    pub identity_property: String,
    /// Property holding an object's type name(s) (matched by `instanceof`)
    pub type_property: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_operations: Some(DEFAULT_MAX_OPERATIONS),
            identity_property: "__identity".to_string(),
            type_property: "__type".to_string(),
        }
    }
}

impl QueryConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the operation bound
    pub fn with_max_operations(mut self, max_operations: Option<u64>) -> Self {
        self.max_operations = max_operations;
        self
    }

    /// Load configuration from a TOML string
    #[cfg(feature = "toml-config")]
    pub fn from_toml(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Serialize configuration to TOML
    #[cfg(feature = "toml-config")]
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.max_operations == Some(0) {
            return Err(QueryError::Config {
                message: "max_operations must be positive".to_string(),
            });
        }

        if self.identity_property.is_empty() {
            return Err(QueryError::Config {
                message: "identity_property must not be empty".to_string(),
            });
        }

        if self.type_property.is_empty() {
            return Err(QueryError::Config {
                message: "type_property must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = QueryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_operations, Some(DEFAULT_MAX_OPERATIONS));
        assert_eq!(config.identity_property, "__identity");
    }

    #[test]
    fn test_zero_limit_is_invalid() {
        let config = QueryConfig::new().with_max_operations(Some(0));
        assert!(matches!(config.validate(), Err(QueryError::Config { .. })));

        let unbounded = QueryConfig::new().with_max_operations(None);
        assert!(unbounded.validate().is_ok());
    }

    #[test]
    fn test_empty_property_names_are_invalid() {
        let config = QueryConfig {
            identity_property: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = QueryConfig::new().with_max_operations(Some(50));
        let json = config.to_json().unwrap();
        let parsed = QueryConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let parsed = QueryConfig::from_json(r#"{"type_property": "kind"}"#).unwrap();
        assert_eq!(parsed.type_property, "kind");
        assert_eq!(parsed.identity_property, "__identity");
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_from_toml() {
        let parsed = QueryConfig::from_toml(
            r#"
            max_operations = 100
            identity_property = "id"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.max_operations, Some(100));
        assert_eq!(parsed.identity_property, "id");
        assert_eq!(parsed.type_property, "__type");
    }
}
