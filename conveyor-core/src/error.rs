//! Error types for Conveyor.
//!
//! Two families exist and never mix:
//!
//! - [`ConveyorError`] is fatal. Configuration and environment problems
//!   surface before or instead of document processing and halt the run.
//! - [`DataError`] is scoped to a single document. The runner converts it
//!   into an error-view write and moves on to the next document.
//!
//! Fatal errors carry stable `Exxx` codes and an actionable resolution
//! hint distinct from the diagnostic message.

use crate::document::Document;
use crate::view::ViewDirection;
use thiserror::Error;

/// The fatal error type for Conveyor operations.
#[derive(Error, Debug)]
pub enum ConveyorError {
    // =========================================================================
    // Configuration Errors (E100-E199)
    // =========================================================================
    /// The number of bound views for a direction is outside the declared bounds.
    #[error(
        "E101: {direction} view count {bound} outside declared bounds [{min}, {max}] for stage '{stage}'"
    )]
    CardinalityViolation {
        /// The stage whose contract was violated.
        stage: String,
        /// The view direction being bound.
        direction: ViewDirection,
        /// Declared minimum.
        min: u32,
        /// Declared maximum.
        max: u32,
        /// Number of views the host actually bound.
        bound: u32,
    },

    /// A declared view has no corresponding host channel.
    #[error("E102: declared {direction} view '{name}' has no bound host channel")]
    UnboundView {
        /// The declared view name.
        name: String,
        /// The view direction.
        direction: ViewDirection,
    },

    /// The host supplied a channel for a name the stage never declared.
    #[error("E103: host channel '{name}' does not match any declared {direction} view")]
    UnknownChannel {
        /// The channel name.
        name: String,
        /// The channel direction.
        direction: ViewDirection,
    },

    /// Lookup of a view by name failed after binding.
    #[error("E104: no {direction} view named '{name}'")]
    UnknownView {
        /// The requested view name.
        name: String,
        /// The requested direction.
        direction: ViewDirection,
    },

    /// A required property was not configured.
    #[error("E105: required property '{name}' is missing")]
    MissingProperty {
        /// The property name.
        name: String,
    },

    /// A property value has the wrong type.
    #[error("E106: property '{name}' expected {expected}, got {actual}")]
    PropertyType {
        /// The property name.
        name: String,
        /// The expected type.
        expected: String,
        /// The actual type found.
        actual: String,
    },

    /// Invalid static configuration.
    #[error("E107: invalid configuration '{field}': {cause}")]
    InvalidConfig {
        /// The offending configuration field.
        field: String,
        /// Description of the problem.
        cause: String,
    },

    /// A bound channel's payload kind does not match the declared view kind.
    #[error("E108: view '{name}' declared as {declared} but bound to a {bound} channel")]
    KindMismatch {
        /// The view name.
        name: String,
        /// The declared payload kind.
        declared: String,
        /// The bound channel's payload kind.
        bound: String,
    },

    // =========================================================================
    // Environment Errors (E200-E299)
    // =========================================================================
    /// A required platform capability is unavailable.
    #[error("E201: required capability '{capability}' is unavailable: {cause}")]
    CapabilityUnavailable {
        /// The missing capability.
        capability: String,
        /// Reason it is unavailable.
        cause: String,
    },

    /// I/O failure not attributable to a single document.
    #[error("E202: I/O error while {context}: {cause}")]
    Io {
        /// What was being done when the failure occurred.
        context: String,
        /// The underlying cause.
        cause: String,
    },

    // =========================================================================
    // Stage Errors (E300-E399)
    // =========================================================================
    /// A stage's execution phase failed fatally.
    #[error("E301: stage '{stage}' failed: {cause}")]
    StageExecution {
        /// The failing stage's title.
        stage: String,
        /// Reason for the failure.
        cause: String,
    },
}

impl ConveyorError {
    /// Get the stable error code (e.g. "E101").
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::CardinalityViolation { .. } => "E101",
            Self::UnboundView { .. } => "E102",
            Self::UnknownChannel { .. } => "E103",
            Self::UnknownView { .. } => "E104",
            Self::MissingProperty { .. } => "E105",
            Self::PropertyType { .. } => "E106",
            Self::InvalidConfig { .. } => "E107",
            Self::KindMismatch { .. } => "E108",
            Self::CapabilityUnavailable { .. } => "E201",
            Self::Io { .. } => "E202",
            Self::StageExecution { .. } => "E301",
        }
    }

    /// Check if this is a configuration error (surfaced before execution).
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::CardinalityViolation { .. }
                | Self::UnboundView { .. }
                | Self::UnknownChannel { .. }
                | Self::MissingProperty { .. }
                | Self::PropertyType { .. }
                | Self::InvalidConfig { .. }
                | Self::KindMismatch { .. }
        )
    }

    /// Check if this is an environment error (platform capability, I/O).
    #[must_use]
    pub fn is_environment_error(&self) -> bool {
        matches!(self, Self::CapabilityUnavailable { .. } | Self::Io { .. })
    }

    /// An actionable hint for resolving the error, distinct from the
    /// diagnostic message.
    #[must_use]
    pub fn resolution(&self) -> &'static str {
        match self {
            Self::CardinalityViolation { .. } | Self::UnboundView { .. } => {
                "Rewire the pipeline so the bound views match the stage's declared contract"
            }
            Self::UnknownChannel { .. } | Self::UnknownView { .. } => {
                "Check the view names declared by the stage against the pipeline wiring"
            }
            Self::MissingProperty { .. } | Self::PropertyType { .. } | Self::InvalidConfig { .. } => {
                "Correct the stage settings and reconfigure"
            }
            Self::KindMismatch { .. } => {
                "Bind a channel of the payload kind the view declares (document or binary)"
            }
            Self::CapabilityUnavailable { .. } => "Contact the stage developer",
            Self::Io { .. } => "Check that the resource exists and is readable",
            Self::StageExecution { .. } => "Inspect the stage logs for the underlying cause",
        }
    }
}

/// Result type alias using [`ConveyorError`].
pub type Result<T> = std::result::Result<T, ConveyorError>;

/// A per-document failure.
///
/// Returned from a stage's `process` step instead of being thrown; the
/// runner diverts the offending document to the stage's error view and
/// continues with the next document. Never unwinds past a single
/// document's processing.
#[derive(Debug, Clone)]
pub struct DataError {
    /// Human-readable diagnostic.
    pub message: String,
    /// Why the document was rejected.
    pub reason: Option<String>,
    /// How a downstream user can fix it.
    pub resolution: Option<String>,
    /// The offending document, when one exists.
    pub document: Option<Document>,
}

impl DataError {
    /// Create a new data error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            reason: None,
            resolution: None,
            document: None,
        }
    }

    /// Attach the offending document.
    #[must_use]
    pub fn for_document(mut self, document: Document) -> Self {
        self.document = Some(document);
        self
    }

    /// Attach a reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attach a resolution hint.
    #[must_use]
    pub fn with_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.resolution = Some(resolution.into());
        self
    }

    /// Synthesize the document that gets written to the error view.
    ///
    /// The offending document's content is nested under `"original"` so the
    /// diagnostic fields never collide with user data. The original header
    /// is preserved for correlation.
    #[must_use]
    pub fn into_error_document(self) -> Document {
        let mut body = serde_json::Map::new();
        body.insert("error".to_string(), self.message.into());
        if let Some(reason) = self.reason {
            body.insert("reason".to_string(), reason.into());
        }
        if let Some(resolution) = self.resolution {
            body.insert("resolution".to_string(), resolution.into());
        }
        match self.document {
            Some(doc) => {
                let header = doc.header();
                body.insert(
                    "original".to_string(),
                    serde_json::Value::Object(doc.into_body()),
                );
                Document::for_header(header, body)
            }
            None => Document::with_body(body),
        }
    }
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(reason) = &self.reason {
            write!(f, " ({reason})")?;
        }
        Ok(())
    }
}
