//! Harness for exercising a single stage in isolation.
//!
//! The tester asks the stage for its declared views, fabricates a
//! matching channel for each one, and drives the stage through the full
//! runner lifecycle. Tests only supply the inputs they care about;
//! every other declared view gets an empty channel so binding succeeds.

use crate::channel::{
    BinarySink, BinarySource, DocumentSink, DocumentSource, InputChannel, OutputChannel,
};
use crate::document::Document;
use crate::error::Result;
use crate::property::PropertyValues;
use crate::stage::{BinaryWriteStage, ExecuteStage, ProcessStage, Stage};
use crate::runner::StageRunner;
use crate::value::Body;
use crate::view::{ViewBuilder, ViewDescriptor, ViewDirection, ViewKind};
use crate::viewset::{HostChannels, ViewSet};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Builds the host side of a single-stage run.
#[derive(Default)]
pub struct StageTester {
    properties: PropertyValues,
    inputs: BTreeMap<String, Vec<Document>>,
    binary_inputs: BTreeMap<String, Vec<u8>>,
}

impl StageTester {
    /// Start with no configuration and no input documents.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property value.
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.properties.set(name, value);
        self
    }

    /// Register a variable scope visible to the stage's expressions.
    #[must_use]
    pub fn scope(mut self, scope: impl Into<String>, bindings: Body) -> Self {
        self.properties.with_scope(scope, bindings);
        self
    }

    /// Queue documents on a named input view.
    #[must_use]
    pub fn input(mut self, view: impl Into<String>, documents: Vec<Document>) -> Self {
        self.inputs.insert(view.into(), documents);
        self
    }

    /// Queue bytes on a named binary input view.
    #[must_use]
    pub fn binary_input(mut self, view: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.binary_inputs.insert(view.into(), bytes);
        self
    }

    /// Drive a run-to-completion stage.
    pub fn run_execute<S: ExecuteStage>(mut self, stage: &mut S) -> Result<TestOutcome> {
        let channels = self.channels_for(stage);
        let views = StageRunner::run_execute(stage, self.properties, channels)?;
        Ok(TestOutcome { views })
    }

    /// Drive a per-document stage.
    pub fn run_process<S: ProcessStage>(mut self, stage: &mut S) -> Result<TestOutcome> {
        let channels = self.channels_for(stage);
        let views = StageRunner::run_process(stage, self.properties, channels)?;
        Ok(TestOutcome { views })
    }

    /// Drive a binary stage.
    pub fn run_binary<S: BinaryWriteStage>(mut self, stage: &mut S) -> Result<TestOutcome> {
        let channels = self.channels_for(stage);
        let views = StageRunner::run_binary(stage, self.properties, channels)?;
        Ok(TestOutcome { views })
    }

    /// Ask for suggestions with the configuration gathered so far.
    pub fn suggest<S: Stage>(&self, stage: &S, property: &str) -> Vec<JsonValue> {
        StageRunner::suggest(stage, property, &self.properties)
    }

    fn channels_for<S: Stage + ?Sized>(&mut self, stage: &S) -> HostChannels {
        let mut builder = ViewBuilder::new();
        stage.define_views(&mut builder);

        let mut channels = HostChannels::default();
        for descriptor in builder.into_descriptors() {
            match descriptor.direction {
                ViewDirection::Input => channels.inputs.push(self.input_channel(&descriptor)),
                ViewDirection::Output => channels.outputs.push(Self::output_channel(&descriptor)),
                ViewDirection::Error => channels.errors.push(Self::output_channel(&descriptor)),
            }
        }
        channels
    }

    fn input_channel(&mut self, descriptor: &ViewDescriptor) -> InputChannel {
        match descriptor.kind {
            ViewKind::Document => InputChannel::Document(DocumentSource::new(
                descriptor.name.clone(),
                self.inputs.remove(&descriptor.name).unwrap_or_default(),
            )),
            ViewKind::Binary => InputChannel::Binary(BinarySource::from_bytes(
                descriptor.name.clone(),
                self.binary_inputs.remove(&descriptor.name).unwrap_or_default(),
            )),
        }
    }

    fn output_channel(descriptor: &ViewDescriptor) -> OutputChannel {
        match descriptor.kind {
            ViewKind::Document => OutputChannel::Document(DocumentSink::new(descriptor.name.clone())),
            ViewKind::Binary => OutputChannel::Binary(BinarySink::new(descriptor.name.clone())),
        }
    }
}

/// The bound views after a completed run, for assertions.
#[derive(Debug)]
pub struct TestOutcome {
    views: ViewSet,
}

impl TestOutcome {
    /// Documents written to a named output view.
    pub fn output(&self, view: &str) -> Result<&[Document]> {
        self.views.output_documents(view)
    }

    /// Documents diverted to a named error view.
    pub fn errors(&self, view: &str) -> Result<&[Document]> {
        self.views.error_documents(view)
    }

    /// Drain the payload handed to a named binary output view.
    pub fn binary_output(&mut self, view: &str) -> Result<Vec<u8>> {
        self.views.binary_output(view)?.drain()
    }

    /// The underlying view set, for anything the accessors don't cover.
    pub fn views(&mut self) -> &mut ViewSet {
        &mut self.views
    }
}
