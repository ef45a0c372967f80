//! Standard stages for the Conveyor engine.
//!
//! This crate provides the built-in stages that form Conveyor's standard library:
//!
//! ## Sources (`generate::*`)
//! - [`generate::DocGenerator`] - Generates a configurable number of documents
//! - [`generate::SingleDocGenerator`] - Generates exactly one document
//!
//! ## Sinks (`consume::*`)
//! - [`consume::DocConsumer`] - Drains and counts an input stream
//!
//! ## Flow Control
//! - [`merge::MergeStreams`] - 2→1 merge with a processed stamp
//! - [`route::GenderRouter`] - Field-based fan-out to named outputs
//! - [`schema_gate::SchemaGate`] - Declared-schema pass-through
//!
//! ## Transforms
//! - [`charcount::CharacterCounter`] - Letter frequencies over a binary stream
//! - [`currency::CurrencyConverter`] - File- or source-backed rate conversion
//!
//! ## Configuration Demos
//! - [`props_demo::PropertyShowcase`] - Scalar, composite and table properties
//! - [`suggest_demo::EchoSuggest`] - Property suggestion callbacks
//! - [`account::TokenStamper`] - Stage backed by a [`account::TokenAccount`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod account;
pub mod charcount;
pub mod consume;
pub mod currency;
pub mod generate;
pub mod merge;
pub mod props_demo;
pub mod registry;
pub mod route;
pub mod schema_gate;
pub mod suggest_demo;

pub use account::{TokenAccount, TokenStamper};
pub use charcount::CharacterCounter;
pub use consume::DocConsumer;
pub use currency::{CurrencyConverter, FileRates, RateSource};
pub use generate::{DocGenerator, SingleDocGenerator};
pub use merge::MergeStreams;
pub use props_demo::PropertyShowcase;
pub use registry::all_stages;
pub use route::GenderRouter;
pub use schema_gate::SchemaGate;
pub use suggest_demo::EchoSuggest;
