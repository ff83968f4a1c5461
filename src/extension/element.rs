use serde::de::DeserializeOwned;
use toml::{Table, Value};

use crate::extension::error::ConfigurationError;

/// Declarative description of one extension object.
///
/// The factory picks the implementation from one attribute (conventionally
/// `class`) and reads whatever other parameters it needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    name: String,
    attributes: Table,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Table::new(),
        }
    }

    pub fn from_table(name: impl Into<String>, attributes: Table) -> Self {
        Self {
            name: name.into(),
            attributes,
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// String attribute; non-string values are treated as absent.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn param<P: DeserializeOwned>(&self, key: &str) -> Result<Option<P>, ConfigurationError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };

        value
            .clone()
            .try_into()
            .map(Some)
            .map_err(|err: toml::de::Error| ConfigurationError::InvalidParameter {
                element: self.name.clone(),
                key: key.to_string(),
                reason: err.message().to_string(),
            })
    }

    pub fn require<P: DeserializeOwned>(&self, key: &str) -> Result<P, ConfigurationError> {
        self.param(key)?
            .ok_or_else(|| ConfigurationError::MissingParameter {
                element: self.name.clone(),
                key: key.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> Element {
        let table: Table = toml::from_str(
            r#"
            class = "Widget"
            width = 4
            label = 7
            "#,
        )
        .expect("valid table");
        Element::from_table("shapes.primary", table)
    }

    #[test]
    fn attribute_reads_strings_only() {
        let element = widget();

        assert_eq!(element.attribute("class"), Some("Widget"));
        assert_eq!(element.attribute("width"), None);
        assert_eq!(element.attribute("missing"), None);
    }

    #[test]
    fn param_deserializes_typed_values() {
        let element = widget();

        assert_eq!(element.param::<u32>("width").unwrap(), Some(4));
        assert_eq!(element.param::<u32>("height").unwrap(), None);
        assert_eq!(element.require::<u32>("width").unwrap(), 4);
    }

    #[test]
    fn param_reports_invalid_values() {
        let err = widget().param::<String>("label").unwrap_err();

        assert!(matches!(
            err,
            ConfigurationError::InvalidParameter { ref key, .. } if key == "label"
        ));
    }

    #[test]
    fn require_reports_missing_values() {
        let err = widget().require::<u32>("height").unwrap_err();

        assert_eq!(
            err.to_string(),
            "element `shapes.primary` is missing parameter `height`"
        );
    }

    #[test]
    fn builder_overrides_attributes() {
        let element = Element::new("inline")
            .with("class", "Square")
            .with("class", "Widget");

        assert_eq!(element.attribute("class"), Some("Widget"));
        assert_eq!(element.name(), "inline");
    }
}
