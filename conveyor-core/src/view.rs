//! View declarations.
//!
//! A view is a named, directional, typed channel through which documents
//! (or bytes) enter or leave a stage. Stages declare their views once,
//! before configuration; the host binds concrete channels to the declared
//! names before execution.

use std::fmt;

/// Payload kind carried by a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    /// Structured documents.
    Document,
    /// A raw byte channel.
    Binary,
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document => write!(f, "document"),
            Self::Binary => write!(f, "binary"),
        }
    }
}

/// Direction of a view relative to the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewDirection {
    /// Documents flow into the stage.
    Input,
    /// Documents flow out of the stage.
    Output,
    /// Diverted documents that failed processing.
    Error,
}

impl ViewDirection {
    /// The conventional default view name for this direction ("input0",
    /// "output0", "error0").
    pub fn default_name(&self, index: u32) -> String {
        match self {
            Self::Input => format!("input{index}"),
            Self::Output => format!("output{index}"),
            Self::Error => format!("error{index}"),
        }
    }
}

impl fmt::Display for ViewDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => write!(f, "input"),
            Self::Output => write!(f, "output"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Cardinality bounds for the views a stage declares per direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cardinality {
    /// Minimum number of bound views.
    pub min: u32,
    /// Maximum number of bound views.
    pub max: u32,
}

impl Cardinality {
    /// Create new bounds.
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Exactly `n` views.
    pub fn exactly(n: u32) -> Self {
        Self { min: n, max: n }
    }

    /// No views at all.
    pub fn none() -> Self {
        Self { min: 0, max: 0 }
    }

    /// Check whether a bound count satisfies these bounds.
    pub fn accepts(&self, count: u32) -> bool {
        count >= self.min && count <= self.max
    }
}

/// A declared view: name, direction, payload kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewDescriptor {
    /// View name, unique within its direction.
    pub name: String,
    /// The direction.
    pub direction: ViewDirection,
    /// The payload kind.
    pub kind: ViewKind,
}

/// Builder collecting a stage's view declarations.
///
/// ```ignore
/// builder.describe("output_male").add(ViewDirection::Output);
/// builder.describe("raw").kind(ViewKind::Binary).add(ViewDirection::Input);
/// ```
#[derive(Debug, Default)]
pub struct ViewBuilder {
    descriptors: Vec<ViewDescriptor>,
}

impl ViewBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start describing a view with the given name.
    pub fn describe(&mut self, name: impl Into<String>) -> ViewDecl<'_> {
        ViewDecl {
            builder: self,
            name: name.into(),
            kind: ViewKind::Document,
        }
    }

    /// All declared views.
    pub fn descriptors(&self) -> &[ViewDescriptor] {
        &self.descriptors
    }

    /// Declared views for one direction, in declaration order.
    pub fn declared(&self, direction: ViewDirection) -> Vec<&ViewDescriptor> {
        self.descriptors
            .iter()
            .filter(|d| d.direction == direction)
            .collect()
    }

    /// Consume the builder, yielding the declarations.
    pub fn into_descriptors(self) -> Vec<ViewDescriptor> {
        self.descriptors
    }
}

/// In-progress view declaration; finished with [`ViewDecl::add`].
#[derive(Debug)]
pub struct ViewDecl<'a> {
    builder: &'a mut ViewBuilder,
    name: String,
    kind: ViewKind,
}

impl ViewDecl<'_> {
    /// Set the payload kind (default: document).
    #[must_use]
    pub fn kind(mut self, kind: ViewKind) -> Self {
        self.kind = kind;
        self
    }

    /// Register the view under the given direction.
    pub fn add(self, direction: ViewDirection) {
        self.builder.descriptors.push(ViewDescriptor {
            name: self.name,
            direction,
            kind: self.kind,
        });
    }
}
