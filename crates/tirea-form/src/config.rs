//! Rendering configuration.

use crate::FormResult;
use serde::{Deserialize, Serialize};

/// Host-supplied settings for a form.
///
/// ```
/// use tirea_form::FormConfig;
///
/// let config = FormConfig::from_json(r#"{"name": "profile", "collapseNestedObjects": true}"#).unwrap();
/// assert_eq!(config.name, "profile");
/// assert!(config.collapse_nested_objects);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormConfig {
    /// Namespace for generated field identifiers.
    pub name: String,
    /// Whether expandable nested objects start collapsed.
    pub collapse_nested_objects: bool,
}

impl FormConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_collapse_nested_objects(mut self, collapse: bool) -> Self {
        self.collapse_nested_objects = collapse;
        self
    }

    /// Parse configuration from JSON text. Missing fields take their defaults.
    pub fn from_json(text: &str) -> FormResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            name: "form".to_string(),
            collapse_nested_objects: false,
        }
    }
}
