//! The host-side driver for a single stage instance.
//!
//! The runner owns the lifecycle ordering: views, properties and schemas
//! are declared first, configuration is validated and applied, channels
//! are bound, and only then is the stage's execution capability driven.
//! Cleanup runs exactly once on every path, including configuration
//! failures and mid-run fatal errors.

use crate::channel::InputChannel;
use crate::error::Result;
use crate::property::{PropertyBuilder, PropertyValues};
use crate::schema::SchemaProvider;
use crate::stage::{BinaryWriteStage, ExecuteStage, ProcessStage, Stage};
use crate::view::ViewBuilder;
use crate::viewset::{HostChannels, ViewSet};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

/// Drives stages through their declare, configure, run, cleanup cycle.
pub struct StageRunner;

impl StageRunner {
    /// Run a run-to-completion stage.
    pub fn run_execute<S: ExecuteStage + ?Sized>(
        stage: &mut S,
        values: PropertyValues,
        channels: HostChannels,
    ) -> Result<ViewSet> {
        let (mut views, _schemas) = match Self::prepare(stage, values, channels) {
            Ok(prepared) => prepared,
            Err(e) => return Err(Self::abort(stage, e)),
        };
        let outcome = stage.execute(&mut views);
        Self::finish(stage, outcome)?;
        Ok(views)
    }

    /// Run a per-document stage, draining every bound input in order.
    ///
    /// Documents failing schema validation or rejected by the stage are
    /// diverted to the error view; the run continues with the next
    /// document. Writes for one document complete before the next is
    /// delivered.
    pub fn run_process<S: ProcessStage + ?Sized>(
        stage: &mut S,
        values: PropertyValues,
        channels: HostChannels,
    ) -> Result<ViewSet> {
        let (mut views, schemas) = match Self::prepare(stage, values, channels) {
            Ok(prepared) => prepared,
            Err(e) => return Err(Self::abort(stage, e)),
        };

        let outcome = Self::drive_documents(stage, &mut views, &schemas);
        Self::finish(stage, outcome)?;
        Ok(views)
    }

    /// Run a binary stage over each bound binary input stream.
    pub fn run_binary<S: BinaryWriteStage + ?Sized>(
        stage: &mut S,
        values: PropertyValues,
        channels: HostChannels,
    ) -> Result<ViewSet> {
        let (mut views, _schemas) = match Self::prepare(stage, values, channels) {
            Ok(prepared) => prepared,
            Err(e) => return Err(Self::abort(stage, e)),
        };

        let outcome = (|| {
            for (descriptor, channel) in views.take_inputs() {
                let InputChannel::Binary(source) = channel else {
                    continue;
                };
                debug!(view = %descriptor.name, "processing binary input");
                let (header, mut reader) = source.into_parts();
                if let Err(error) = stage.process_binary(header, reader.as_mut(), &mut views) {
                    views.write_error(error)?;
                }
            }
            Ok(())
        })();
        Self::finish(stage, outcome)?;
        Ok(views)
    }

    /// Candidate values for a property, from the partially configured
    /// property set. A callback attached to the property descriptor wins
    /// over the stage-level hook.
    pub fn suggest<S: Stage + ?Sized>(
        stage: &S,
        property: &str,
        values: &PropertyValues,
    ) -> Vec<JsonValue> {
        let mut builder = PropertyBuilder::new();
        stage.define_properties(&mut builder);
        if let Some(descriptor) = builder.find(property) {
            if let Some(suggestions) = &descriptor.suggestions {
                return suggestions.suggest(values);
            }
        }
        stage.suggest(property, values)
    }

    fn prepare<S: Stage + ?Sized>(
        stage: &mut S,
        mut values: PropertyValues,
        channels: HostChannels,
    ) -> Result<(ViewSet, SchemaProvider)> {
        let info = stage.info();
        debug!(stage = %info.title, "preparing stage");

        let mut view_builder = ViewBuilder::new();
        stage.define_views(&mut view_builder);

        let mut property_builder = PropertyBuilder::new();
        stage.define_properties(&mut property_builder);
        let descriptors = property_builder.into_descriptors();
        values.apply_defaults(&descriptors);
        values.validate(&descriptors)?;

        let mut schemas = SchemaProvider::new();
        stage.define_schemas(&mut schemas);

        let views = ViewSet::bind(&info, view_builder.into_descriptors(), channels)?;
        stage.configure(&values)?;
        Ok((views, schemas))
    }

    fn drive_documents<S: ProcessStage + ?Sized>(
        stage: &mut S,
        views: &mut ViewSet,
        schemas: &SchemaProvider,
    ) -> Result<()> {
        for (descriptor, channel) in views.take_inputs() {
            let InputChannel::Document(mut source) = channel else {
                continue;
            };
            let schema = schemas.input_schema(&descriptor.name);
            while let Some(document) = source.next() {
                if let Some(schema) = schema {
                    if let Err(error) = schema.validate(&document) {
                        views.write_error(error)?;
                        continue;
                    }
                }
                let original = document.clone();
                if let Err(error) = stage.process(document, &descriptor.name, views) {
                    let error = if error.document.is_none() {
                        error.for_document(original)
                    } else {
                        error
                    };
                    views.write_error(error)?;
                }
            }
        }
        Ok(())
    }

    /// Cleanup after a failed prepare, keeping the prepare error.
    fn abort<S: Stage + ?Sized>(stage: &mut S, error: crate::error::ConveyorError) -> crate::error::ConveyorError {
        if let Err(cleanup) = stage.cleanup() {
            warn!(error = %cleanup, "cleanup failed after configuration error");
        }
        error
    }

    /// Run cleanup exactly once, preserving the primary error when both
    /// the run and cleanup fail.
    fn finish<S: Stage + ?Sized>(stage: &mut S, outcome: Result<()>) -> Result<()> {
        let cleanup = stage.cleanup();
        match (outcome, cleanup) {
            (Ok(()), Ok(())) => Ok(()),
            (Ok(()), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(primary), Err(cleanup)) => {
                warn!(error = %cleanup, "cleanup failed after run error");
                Err(primary)
            }
        }
    }
}
