//! Prelude for convenient imports.
//!
//! ```ignore
//! use conveyor_core::prelude::*;
//! ```

// Documents and values
pub use crate::document::{Document, Header};
pub use crate::value::{Body, Value};

// Error handling
pub use crate::error::{ConveyorError, DataError, Result};

// Views and channels
pub use crate::channel::{
    BinaryPayload, BinarySink, BinarySource, BytesPayload, DocumentSink, DocumentSource,
    InputChannel, OutputChannel,
};
pub use crate::view::{Cardinality, ViewBuilder, ViewDescriptor, ViewDirection, ViewKind};
pub use crate::viewset::{HostChannels, ViewSet};

// Properties
pub use crate::property::{
    Expression, PropertyBuilder, PropertyDescriptor, PropertyKind, PropertyValues, Sensitivity,
    Suggestions,
};

// Schemas
pub use crate::schema::{Column, ColumnKind, SchemaProvider, ViewSchema};

// Stage lifecycle
pub use crate::account::Account;
pub use crate::runner::StageRunner;
pub use crate::stage::{
    BinaryWriteStage, ExecuteStage, ProcessStage, Stage, StageCategory, StageInfo, ViewContract,
};
