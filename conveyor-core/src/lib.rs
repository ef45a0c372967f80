//! Conveyor Core Library
//!
//! This crate provides the foundational types and traits for the
//! conveyor document routing engine.
//!
//! # Overview
//!
//! Conveyor moves JSON-like documents and opaque byte streams between
//! pipeline stages through named, direction-typed views. A stage
//! declares its views, properties, and schemas up front; the host binds
//! channels to the declared views, validates configuration, and drives
//! the stage through a configure → run → cleanup lifecycle.
//!
//! # Key Components
//!
//! - **Document**: An ordered body of key/value pairs plus an opaque
//!   correlation header
//! - **Views**: Named attachment points with declared direction, payload
//!   kind, and cardinality bounds
//! - **Stages**: The lifecycle trait plus execution capability traits
//! - **Runner**: The host-side driver enforcing lifecycle ordering
//!
//! # Example
//!
//! ```ignore
//! use conveyor_core::prelude::*;
//!
//! let views = StageRunner::run_process(&mut stage, values, channels)?;
//! for doc in views.output_documents("output0")? {
//!     println!("{}", serde_json::to_string(doc)?);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod account;
pub mod channel;
pub mod document;
pub mod error;
pub mod prelude;
pub mod property;
pub mod runner;
pub mod schema;
pub mod stage;
pub mod testing;
pub mod value;
pub mod view;
pub mod viewset;

// Re-export key types at crate root for convenience
pub use document::{Document, Header};
pub use error::{ConveyorError, DataError, Result};
pub use property::{PropertyBuilder, PropertyValues};
pub use runner::StageRunner;
pub use stage::{ExecuteStage, ProcessStage, Stage, StageInfo};
pub use value::{Body, Value};
pub use viewset::{HostChannels, ViewSet};
