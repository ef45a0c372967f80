//! Configured property values.

use super::descriptor::{PropertyDescriptor, PropertyKind};
use super::expression::Expression;
use crate::error::{ConveyorError, Result};
use crate::value::Body;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// The concrete configuration supplied for a stage's declared properties,
/// plus the variable scopes visible to its expressions.
#[derive(Debug, Clone, Default)]
pub struct PropertyValues {
    values: Body,
    variables: BTreeMap<String, Body>,
}

impl PropertyValues {
    /// Create an empty value set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property's raw value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Register a variable scope, such as `account`, visible to expressions.
    pub fn with_scope(&mut self, scope: impl Into<String>, bindings: Body) -> &mut Self {
        self.variables.insert(scope.into(), bindings);
        self
    }

    /// The raw value for a property, if configured.
    pub fn raw(&self, name: &str) -> Option<&JsonValue> {
        self.values.get(name)
    }

    /// Deserialize a required property into a concrete type.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let raw = self.values.get(name).ok_or_else(|| {
            ConveyorError::MissingProperty {
                name: name.to_string(),
            }
        })?;
        serde_json::from_value(raw.clone()).map_err(|e| ConveyorError::PropertyType {
            name: name.to_string(),
            expected: std::any::type_name::<T>().to_string(),
            actual: format!("{} ({e})", json_type_name(raw)),
        })
    }

    /// Deserialize an optional property.
    pub fn get_opt<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        match self.values.get(name) {
            None | Some(JsonValue::Null) => Ok(None),
            Some(_) => self.get(name).map(Some),
        }
    }

    /// Wrap a property's raw value as an expression for later evaluation.
    pub fn as_expression(&self, name: &str) -> Result<Expression> {
        let raw = self.values.get(name).ok_or_else(|| {
            ConveyorError::MissingProperty {
                name: name.to_string(),
            }
        })?;
        Ok(Expression::new(raw.clone(), self.variables.clone()))
    }

    /// Wrap a named entry of a table row as an expression.
    ///
    /// Table properties evaluate row by row, with each row an ordered
    /// map of entry names to raw values.
    pub fn expression_for(&self, row: &Body, name: &str) -> Result<Expression> {
        let raw = row.get(name).ok_or_else(|| ConveyorError::MissingProperty {
            name: name.to_string(),
        })?;
        Ok(Expression::new(raw.clone(), self.variables.clone()))
    }

    /// Fill in declared defaults for unconfigured properties.
    pub fn apply_defaults(&mut self, descriptors: &[PropertyDescriptor]) {
        for descriptor in descriptors {
            if self.values.contains_key(&descriptor.name) {
                continue;
            }
            if let Some(default) = &descriptor.default_value {
                self.values
                    .insert(descriptor.name.clone(), default.clone());
            }
        }
    }

    /// Validate configured values against their declarations.
    ///
    /// Required properties must be present and every configured value
    /// must match its declared shape. Expression-enabled properties are
    /// exempt from the shape check since their raw value is a string to
    /// evaluate later.
    pub fn validate(&self, descriptors: &[PropertyDescriptor]) -> Result<()> {
        for descriptor in descriptors {
            match self.values.get(&descriptor.name) {
                None | Some(JsonValue::Null) => {
                    if descriptor.required {
                        return Err(ConveyorError::MissingProperty {
                            name: descriptor.name.clone(),
                        });
                    }
                }
                Some(raw) => {
                    if descriptor.expression_enabled {
                        continue;
                    }
                    if !descriptor.kind.matches(raw) {
                        return Err(ConveyorError::PropertyType {
                            name: descriptor.name.clone(),
                            expected: descriptor.kind.as_str().to_string(),
                            actual: json_type_name(raw).to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// The registered variable scopes.
    pub fn variables(&self) -> &BTreeMap<String, Body> {
        &self.variables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyBuilder;
    use serde_json::json;

    fn declared() -> Vec<PropertyDescriptor> {
        let mut builder = PropertyBuilder::new();
        builder
            .describe("count", "Number of documents to create")
            .kind(PropertyKind::Integer)
            .required()
            .add();
        builder
            .describe("echo", "Echoed value")
            .default_value("nothing yet")
            .add();
        builder.into_descriptors()
    }

    #[test]
    fn get_deserializes_configured_values() {
        let mut values = PropertyValues::new();
        values.set("count", 7);
        assert_eq!(values.get::<i64>("count").unwrap(), 7);
    }

    #[test]
    fn missing_required_property_is_e105() {
        let values = PropertyValues::new();
        let err = values.validate(&declared()).unwrap_err();
        assert_eq!(err.code(), "E105");
    }

    #[test]
    fn wrong_shape_is_e106() {
        let mut values = PropertyValues::new();
        values.set("count", "seven");
        let err = values.validate(&declared()).unwrap_err();
        assert_eq!(err.code(), "E106");
    }

    #[test]
    fn negative_integers_pass_shape_validation() {
        let mut values = PropertyValues::new();
        values.set("count", -3);
        assert!(values.validate(&declared()).is_ok());
    }

    #[test]
    fn defaults_fill_unset_properties_only() {
        let mut values = PropertyValues::new();
        values.set("count", 1);
        values.apply_defaults(&declared());
        assert_eq!(values.raw("echo"), Some(&json!("nothing yet")));
        assert_eq!(values.raw("count"), Some(&json!(1)));
    }

    #[test]
    fn expressions_carry_registered_scopes() {
        let mut account = Body::new();
        account.insert("user_id".into(), json!("carol"));
        let mut values = PropertyValues::new();
        values.set("who", "account.user_id");
        values.with_scope("account", account);
        let expr = values.as_expression("who").unwrap();
        assert_eq!(expr.eval(None).unwrap(), json!("carol"));
    }

    #[test]
    fn table_rows_resolve_entry_expressions() {
        let values = PropertyValues::new();
        let mut row = Body::new();
        row.insert("child_prop".into(), json!("literal"));
        let expr = values.expression_for(&row, "child_prop").unwrap();
        assert_eq!(expr.eval(None).unwrap(), json!("literal"));
        assert!(values.expression_for(&row, "absent").is_err());
    }
}
