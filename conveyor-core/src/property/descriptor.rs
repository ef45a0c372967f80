//! Property descriptors and the declaration builder.

use super::values::PropertyValues;
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;

/// Declared shape of a property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropertyKind {
    /// A string scalar.
    #[default]
    String,
    /// An integer scalar.
    Integer,
    /// A floating-point scalar.
    Number,
    /// A boolean scalar.
    Boolean,
    /// A single nested record of named children.
    Composite,
    /// An ordered list of composite rows.
    Table,
}

impl PropertyKind {
    /// Human-readable name, used in type-mismatch diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Composite => "composite",
            Self::Table => "table",
        }
    }

    /// Check whether a configured raw value matches this shape.
    pub fn matches(&self, value: &JsonValue) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.as_i64().is_some(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Composite => value.is_object(),
            Self::Table => value.is_array(),
        }
    }
}

/// Sensitivity level for a property's configured value.
///
/// Indicates to the host how the value should be stored and displayed;
/// the engine itself only records it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sensitivity {
    /// Plain configuration data.
    #[default]
    None,
    /// Should be encrypted at rest by security-conscious installations.
    Medium,
    /// Masked on input and always encrypted.
    High,
}

/// Callback producing candidate values for a property from the partially
/// configured property set.
pub trait Suggestions: Send + Sync {
    /// Suggest values given what has been configured so far.
    fn suggest(&self, values: &PropertyValues) -> Vec<JsonValue>;
}

impl<F> Suggestions for F
where
    F: Fn(&PropertyValues) -> Vec<JsonValue> + Send + Sync,
{
    fn suggest(&self, values: &PropertyValues) -> Vec<JsonValue> {
        self(values)
    }
}

/// A declared property.
#[derive(Clone)]
pub struct PropertyDescriptor {
    /// Property name (the key configuration is stored under).
    pub name: String,
    /// Display label.
    pub label: String,
    /// Longer description.
    pub description: String,
    /// Declared shape.
    pub kind: PropertyKind,
    /// Whether configuration must supply a value (or a default exists).
    pub required: bool,
    /// Default raw value, applied when configuration omits the property.
    pub default_value: Option<JsonValue>,
    /// Sensitivity level.
    pub sensitivity: Sensitivity,
    /// Whether the value is an expression to be evaluated at document time.
    pub expression_enabled: bool,
    /// Child descriptors for composite and table shapes (one level).
    pub children: Vec<PropertyDescriptor>,
    /// Optional suggestion callback.
    pub suggestions: Option<Arc<dyn Suggestions>>,
}

impl fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("default_value", &self.default_value)
            .field("sensitivity", &self.sensitivity)
            .field("children", &self.children)
            .field("has_suggestions", &self.suggestions.is_some())
            .finish()
    }
}

/// Builder collecting a stage's property declarations.
///
/// ```ignore
/// builder.describe("count", "Number of documents to create")
///     .kind(PropertyKind::Integer)
///     .required()
///     .add();
/// ```
#[derive(Debug, Default)]
pub struct PropertyBuilder {
    descriptors: Vec<PropertyDescriptor>,
}

impl PropertyBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start describing a property.
    pub fn describe(&mut self, name: impl Into<String>, label: impl Into<String>) -> PropertyDecl<'_> {
        PropertyDecl {
            builder: self,
            descriptor: PropertyDescriptor {
                name: name.into(),
                label: label.into(),
                description: String::new(),
                kind: PropertyKind::String,
                required: false,
                default_value: None,
                sensitivity: Sensitivity::None,
                expression_enabled: false,
                children: Vec::new(),
                suggestions: None,
            },
        }
    }

    /// All declared properties.
    pub fn descriptors(&self) -> &[PropertyDescriptor] {
        &self.descriptors
    }

    /// Find a descriptor by name.
    pub fn find(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    /// Consume the builder, yielding the declarations.
    pub fn into_descriptors(self) -> Vec<PropertyDescriptor> {
        self.descriptors
    }
}

/// In-progress property declaration; finished with [`PropertyDecl::add`]
/// (register on the builder) or [`PropertyDecl::build`] (yield a child
/// descriptor for a composite or table parent).
pub struct PropertyDecl<'a> {
    builder: &'a mut PropertyBuilder,
    descriptor: PropertyDescriptor,
}

impl PropertyDecl<'_> {
    /// Set the shape (default: string).
    #[must_use]
    pub fn kind(mut self, kind: PropertyKind) -> Self {
        self.descriptor.kind = kind;
        self
    }

    /// Set the longer description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.descriptor.description = description.into();
        self
    }

    /// Mark the property required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.descriptor.required = true;
        self
    }

    /// Set a default value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<JsonValue>) -> Self {
        self.descriptor.default_value = Some(value.into());
        self
    }

    /// Set the sensitivity level.
    #[must_use]
    pub fn sensitivity(mut self, sensitivity: Sensitivity) -> Self {
        self.descriptor.sensitivity = sensitivity;
        self
    }

    /// Mask input and raise sensitivity to high.
    #[must_use]
    pub fn obfuscate(mut self) -> Self {
        self.descriptor.sensitivity = Sensitivity::High;
        self
    }

    /// Allow the value to be an expression evaluated at document time.
    #[must_use]
    pub fn expression(mut self) -> Self {
        self.descriptor.expression_enabled = true;
        self
    }

    /// Add a child descriptor (for composite and table shapes).
    #[must_use]
    pub fn with_entry(mut self, child: PropertyDescriptor) -> Self {
        self.descriptor.children.push(child);
        self
    }

    /// Attach a suggestion callback.
    #[must_use]
    pub fn with_suggestions(mut self, suggestions: impl Suggestions + 'static) -> Self {
        self.descriptor.suggestions = Some(Arc::new(suggestions));
        self
    }

    /// Register the property on the builder.
    pub fn add(self) {
        self.builder.descriptors.push(self.descriptor);
    }

    /// Yield the descriptor without registering it, for use as a child
    /// of a composite or table property.
    pub fn build(self) -> PropertyDescriptor {
        self.descriptor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_registers_declarations() {
        let mut builder = PropertyBuilder::new();
        builder
            .describe("count", "Number of documents to create")
            .kind(PropertyKind::Integer)
            .required()
            .add();
        builder
            .describe("passphrase", "The user's passphrase")
            .required()
            .obfuscate()
            .add();

        assert_eq!(builder.descriptors().len(), 2);
        let count = builder.find("count").unwrap();
        assert_eq!(count.kind, PropertyKind::Integer);
        assert!(count.required);
        assert_eq!(
            builder.find("passphrase").unwrap().sensitivity,
            Sensitivity::High
        );
    }

    #[test]
    fn composite_declares_children_without_registering_them() {
        let mut builder = PropertyBuilder::new();
        let child_a = builder.describe("child_file", "child_file").required().build();
        let child_b = builder.describe("child_prop", "child_prop").required().build();
        builder
            .describe("parent_prop", "parent_prop")
            .kind(PropertyKind::Composite)
            .required()
            .with_entry(child_a)
            .with_entry(child_b)
            .add();

        assert_eq!(builder.descriptors().len(), 1);
        let parent = builder.find("parent_prop").unwrap();
        assert_eq!(parent.children.len(), 2);
        assert_eq!(parent.children[0].name, "child_file");
    }

    #[test]
    fn kind_matching() {
        assert!(PropertyKind::Integer.matches(&json!(5)));
        assert!(!PropertyKind::Integer.matches(&json!(5.5)));
        assert!(PropertyKind::Number.matches(&json!(5.5)));
        assert!(PropertyKind::Table.matches(&json!([{"a": 1}])));
        assert!(!PropertyKind::Composite.matches(&json!("text")));
    }
}
