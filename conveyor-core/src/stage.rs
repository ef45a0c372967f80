//! Stage metadata and lifecycle traits.
//!
//! A stage is a single pipeline unit with a declare → configure →
//! execute → cleanup lifecycle, driven entirely by the host. The
//! "process-per-document vs. execute-once" dichotomy is expressed as
//! capability traits on top of the shared [`Stage`] lifecycle rather
//! than an inheritance hierarchy.

use crate::error::{DataError, Result};
use crate::property::{PropertyBuilder, PropertyValues};
use crate::schema::SchemaProvider;
use crate::view::{Cardinality, ViewBuilder, ViewDirection, ViewKind};
use crate::viewset::ViewSet;
use serde_json::Value as JsonValue;
use std::io::Read;
use std::sync::Arc;

/// Category of a stage, for host-side organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageCategory {
    /// Produces documents (idempotent sources).
    Read,
    /// Consumes documents as a terminal unit.
    Write,
    /// Transforms documents in flight.
    Transform,
    /// Flow control / routing.
    Flow,
}

/// The contract for one view direction: payload kind plus cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewContract {
    /// Payload kind of views in this direction.
    pub kind: ViewKind,
    /// Bounds on how many views a stage instance binds.
    pub cardinality: Cardinality,
}

impl ViewContract {
    /// Document views with the given bounds.
    pub fn documents(min: u32, max: u32) -> Self {
        Self {
            kind: ViewKind::Document,
            cardinality: Cardinality::new(min, max),
        }
    }

    /// Binary views with the given bounds.
    pub fn binary(min: u32, max: u32) -> Self {
        Self {
            kind: ViewKind::Binary,
            cardinality: Cardinality::new(min, max),
        }
    }

    /// No views in this direction.
    pub fn none() -> Self {
        Self {
            kind: ViewKind::Document,
            cardinality: Cardinality::none(),
        }
    }
}

/// Metadata about a stage type.
#[derive(Debug, Clone)]
pub struct StageInfo {
    /// Display title (e.g. "Doc Generator").
    pub title: String,
    /// What the stage is for.
    pub purpose: String,
    /// Stage author.
    pub author: String,
    /// Link to documentation.
    pub doc_link: String,
    /// Version of the stage implementation.
    pub version: u32,
    /// Category.
    pub category: StageCategory,
    /// Input view contract.
    pub inputs: ViewContract,
    /// Output view contract.
    pub outputs: ViewContract,
    /// Error view contract.
    pub errors: ViewContract,
}

impl StageInfo {
    /// Create metadata with defaults: version 1, transform category,
    /// one document input/output/error view.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            purpose: String::new(),
            author: String::new(),
            doc_link: String::new(),
            version: 1,
            category: StageCategory::Transform,
            inputs: ViewContract::documents(1, 1),
            outputs: ViewContract::documents(1, 1),
            errors: ViewContract::documents(1, 1),
        }
    }

    /// Set the purpose.
    #[must_use]
    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = purpose.into();
        self
    }

    /// Set the author.
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Set the documentation link.
    #[must_use]
    pub fn with_doc_link(mut self, doc_link: impl Into<String>) -> Self {
        self.doc_link = doc_link.into();
        self
    }

    /// Set the version.
    #[must_use]
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Set the category.
    #[must_use]
    pub fn with_category(mut self, category: StageCategory) -> Self {
        self.category = category;
        self
    }

    /// Set the input contract.
    #[must_use]
    pub fn with_inputs(mut self, contract: ViewContract) -> Self {
        self.inputs = contract;
        self
    }

    /// Set the output contract.
    #[must_use]
    pub fn with_outputs(mut self, contract: ViewContract) -> Self {
        self.outputs = contract;
        self
    }

    /// Set the error contract.
    #[must_use]
    pub fn with_errors(mut self, contract: ViewContract) -> Self {
        self.errors = contract;
        self
    }

    /// The contract for a direction.
    pub fn contract(&self, direction: ViewDirection) -> ViewContract {
        match direction {
            ViewDirection::Input => self.inputs,
            ViewDirection::Output => self.outputs,
            ViewDirection::Error => self.errors,
        }
    }

    /// Declare the default views implied by this contract: `min` views
    /// per direction under the conventional names.
    pub fn default_views(&self, builder: &mut ViewBuilder) {
        for direction in [
            ViewDirection::Input,
            ViewDirection::Output,
            ViewDirection::Error,
        ] {
            let contract = self.contract(direction);
            for i in 0..contract.cardinality.min {
                builder
                    .describe(direction.default_name(i))
                    .kind(contract.kind)
                    .add(direction);
            }
        }
    }
}

/// The shared lifecycle every stage implements.
///
/// The host calls, in order: [`Stage::define_views`],
/// [`Stage::define_properties`], [`Stage::define_schemas`] (once each,
/// before configuration), then [`Stage::configure`] once, then drives the
/// execution capability, then [`Stage::cleanup`] exactly once (including
/// on failure paths).
pub trait Stage {
    /// Metadata about this stage.
    fn info(&self) -> StageInfo;

    /// Declare named views. The default declares the minimum number of
    /// views per direction from the [`StageInfo`] contract, under the
    /// conventional `input0`/`output0`/`error0` names.
    fn define_views(&self, builder: &mut ViewBuilder) {
        self.info().default_views(builder);
    }

    /// Declare configuration properties.
    fn define_properties(&self, builder: &mut PropertyBuilder) {
        let _ = builder;
    }

    /// Declare view schemas.
    fn define_schemas(&self, provider: &mut SchemaProvider) {
        let _ = provider;
    }

    /// Consume configured property values. Called once, before any
    /// document is processed. Failure here is fatal.
    fn configure(&mut self, values: &PropertyValues) -> Result<()>;

    /// Release resources and report run totals. Called exactly once.
    fn cleanup(&mut self) -> Result<()> {
        Ok(())
    }

    /// Suggest candidate values for a property, given the partially
    /// configured property set.
    fn suggest(&self, property: &str, values: &PropertyValues) -> Vec<JsonValue> {
        let _ = (property, values);
        Vec::new()
    }
}

/// Capability: run-to-completion execution.
///
/// The host calls [`ExecuteStage::execute`] once; the stage pulls from
/// its input views (if any) and writes to its output views until done.
pub trait ExecuteStage: Stage {
    /// Run the stage to completion.
    fn execute(&mut self, views: &mut ViewSet) -> Result<()>;
}

/// Capability: per-document processing.
///
/// The host feeds documents one at a time, in input order. Returning
/// `Err` diverts the offending document to the error view; processing of
/// subsequent documents continues. Output and error writes for one
/// document complete before the next document is delivered.
pub trait ProcessStage: Stage {
    /// Process a single document from the named input view.
    fn process(
        &mut self,
        document: crate::document::Document,
        input_view: &str,
        views: &mut ViewSet,
    ) -> std::result::Result<(), DataError>;
}

/// Capability: binary-channel processing.
///
/// The host hands the stage each bound binary input as a byte stream
/// plus its correlation header. The stage must fully consume (and
/// release) the stream before handing a lazy payload to its binary
/// output view.
pub trait BinaryWriteStage: Stage {
    /// Process one binary input stream.
    fn process_binary(
        &mut self,
        header: Arc<crate::document::Header>,
        input: &mut dyn Read,
        views: &mut ViewSet,
    ) -> std::result::Result<(), DataError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_builder() {
        let info = StageInfo::new("Two Ins/Outs")
            .with_purpose("Accepts two inputs, sends to two outputs.")
            .with_category(StageCategory::Flow)
            .with_inputs(ViewContract::documents(2, 2))
            .with_outputs(ViewContract::documents(2, 2));

        assert_eq!(info.title, "Two Ins/Outs");
        assert_eq!(info.version, 1);
        assert_eq!(info.inputs.cardinality, Cardinality::exactly(2));
        assert_eq!(info.contract(ViewDirection::Error).cardinality.min, 1);
    }

    #[test]
    fn default_views_follow_contract_minimums() {
        let info = StageInfo::new("Doc Generator")
            .with_inputs(ViewContract::documents(0, 1))
            .with_outputs(ViewContract::documents(1, 1))
            .with_errors(ViewContract::documents(1, 1));

        let mut builder = ViewBuilder::new();
        info.default_views(&mut builder);

        assert!(builder.declared(ViewDirection::Input).is_empty());
        assert_eq!(builder.declared(ViewDirection::Output)[0].name, "output0");
        assert_eq!(builder.declared(ViewDirection::Error)[0].name, "error0");
    }

    #[test]
    fn binary_contract_views_carry_kind() {
        let info = StageInfo::new("Character Counter")
            .with_inputs(ViewContract::binary(1, 1))
            .with_outputs(ViewContract::binary(1, 1));

        let mut builder = ViewBuilder::new();
        info.default_views(&mut builder);
        assert_eq!(
            builder.declared(ViewDirection::Output)[0].kind,
            ViewKind::Binary
        );
    }
}
