//! Declared document schemas for stage views.
//!
//! A stage may describe the shape of the documents it consumes or
//! produces. Input schemas are enforced by the runner before each
//! document reaches the stage; output schemas are descriptive, for
//! upstream tooling to inspect.

use crate::document::Document;
use crate::error::DataError;
use crate::view::ViewDirection;

/// Declared type of a schema column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// A string value.
    String,
    /// An integer value.
    Integer,
    /// A floating-point value.
    Number,
    /// A boolean value.
    Boolean,
    /// Any JSON value.
    Any,
}

/// A single named column.
#[derive(Debug, Clone)]
pub struct Column {
    /// Key the column is stored under in the document body.
    pub name: String,
    /// Declared type.
    pub kind: ColumnKind,
}

/// The declared schema of one view's documents.
#[derive(Debug, Clone)]
pub struct ViewSchema {
    view: String,
    columns: Vec<Column>,
}

impl ViewSchema {
    /// The view this schema applies to.
    pub fn view(&self) -> &str {
        &self.view
    }

    /// The declared columns, in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Check a document against the schema.
    ///
    /// Validation is presence-only: every declared column must exist as
    /// a top-level key. Column kinds are advisory and not enforced, and
    /// keys beyond the declared columns are allowed.
    pub fn validate(&self, document: &Document) -> Result<(), DataError> {
        for column in &self.columns {
            if !document.contains_key(&column.name) {
                return Err(DataError::new(format!(
                    "Data map does not contain key:{}",
                    column.name
                ))
                .for_document(document.clone())
                .with_reason(format!(
                    "documents on view '{}' must carry the declared columns",
                    self.view
                ))
                .with_resolution("add the missing key to the incoming documents"));
            }
        }
        Ok(())
    }
}

/// Collects the schemas a stage declares for its views.
#[derive(Debug, Default)]
pub struct SchemaProvider {
    inputs: Vec<ViewSchema>,
    outputs: Vec<ViewSchema>,
}

impl SchemaProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start describing a schema for the named view.
    pub fn schema_builder(
        &mut self,
        direction: ViewDirection,
        view: impl Into<String>,
    ) -> SchemaDecl<'_> {
        SchemaDecl {
            provider: self,
            direction,
            schema: ViewSchema {
                view: view.into(),
                columns: Vec::new(),
            },
        }
    }

    /// The schema declared for an input view, if any.
    pub fn input_schema(&self, view: &str) -> Option<&ViewSchema> {
        self.inputs.iter().find(|s| s.view == view)
    }

    /// The schema declared for an output view, if any.
    pub fn output_schema(&self, view: &str) -> Option<&ViewSchema> {
        self.outputs.iter().find(|s| s.view == view)
    }

    /// All declared input schemas.
    pub fn input_schemas(&self) -> &[ViewSchema] {
        &self.inputs
    }

    /// All declared output schemas.
    pub fn output_schemas(&self) -> &[ViewSchema] {
        &self.outputs
    }
}

/// In-progress schema declaration, registered with [`SchemaDecl::add`].
#[derive(Debug)]
pub struct SchemaDecl<'a> {
    provider: &'a mut SchemaProvider,
    direction: ViewDirection,
    schema: ViewSchema,
}

impl SchemaDecl<'_> {
    /// Declare a column.
    #[must_use]
    pub fn column(mut self, name: impl Into<String>, kind: ColumnKind) -> Self {
        self.schema.columns.push(Column {
            name: name.into(),
            kind,
        });
        self
    }

    /// Register the schema on the provider.
    pub fn add(self) {
        match self.direction {
            ViewDirection::Input => self.provider.inputs.push(self.schema),
            ViewDirection::Output | ViewDirection::Error => {
                self.provider.outputs.push(self.schema)
            }
        }
    }
}
