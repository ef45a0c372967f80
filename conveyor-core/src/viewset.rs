//! The set of views bound to a stage instance.
//!
//! Binding happens once, before any document is processed: declared view
//! names are matched against host-provided channels, cardinality bounds
//! are enforced, and a miswired pipeline fails fast with a configuration
//! error instead of partway through a run. After binding the set is
//! immutable in shape; only channel contents change.

use crate::channel::{
    BinaryPayload, BinarySink, DocumentSink, DocumentSource, InputChannel, OutputChannel,
};
use crate::document::Document;
use crate::error::{ConveyorError, DataError, Result};
use crate::stage::StageInfo;
use crate::view::{ViewDescriptor, ViewDirection, ViewKind};

/// The channels a host supplies for one stage instance.
#[derive(Default)]
pub struct HostChannels {
    /// Input channels, one per bound input view.
    pub inputs: Vec<InputChannel>,
    /// Output channels, one per bound output view.
    pub outputs: Vec<OutputChannel>,
    /// Error channels, one per bound error view.
    pub errors: Vec<OutputChannel>,
}

/// The bound views of a running stage.
pub struct ViewSet {
    inputs: Vec<(ViewDescriptor, InputChannel)>,
    outputs: Vec<(ViewDescriptor, OutputChannel)>,
    errors: Vec<(ViewDescriptor, OutputChannel)>,
}

impl std::fmt::Debug for ViewSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewSet")
            .field(
                "inputs",
                &self.inputs.iter().map(|(d, _)| &d.name).collect::<Vec<_>>(),
            )
            .field(
                "outputs",
                &self.outputs.iter().map(|(d, _)| &d.name).collect::<Vec<_>>(),
            )
            .field(
                "errors",
                &self.errors.iter().map(|(d, _)| &d.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ViewSet {
    /// Bind host channels to declared views, enforcing the stage's
    /// cardinality contract. Fails with a configuration error on any
    /// mismatch; nothing is processed after a failed bind.
    pub fn bind(
        info: &StageInfo,
        declared: Vec<ViewDescriptor>,
        channels: HostChannels,
    ) -> Result<Self> {
        let HostChannels {
            inputs,
            outputs,
            errors,
        } = channels;

        let declared_for = |direction: ViewDirection| -> Vec<ViewDescriptor> {
            declared
                .iter()
                .filter(|d| d.direction == direction)
                .cloned()
                .collect()
        };

        let bound_inputs = Self::bind_inputs(info, declared_for(ViewDirection::Input), inputs)?;
        let bound_outputs =
            Self::bind_outputs(info, declared_for(ViewDirection::Output), outputs)?;
        let bound_errors = Self::bind_outputs_for(
            info,
            ViewDirection::Error,
            declared_for(ViewDirection::Error),
            errors,
        )?;

        Ok(Self {
            inputs: bound_inputs,
            outputs: bound_outputs,
            errors: bound_errors,
        })
    }

    fn check_cardinality(
        info: &StageInfo,
        direction: ViewDirection,
        bound: usize,
    ) -> Result<()> {
        let contract = info.contract(direction);
        let bound = bound as u32;
        if !contract.cardinality.accepts(bound) {
            return Err(ConveyorError::CardinalityViolation {
                stage: info.title.clone(),
                direction,
                min: contract.cardinality.min,
                max: contract.cardinality.max,
                bound,
            });
        }
        Ok(())
    }

    fn bind_inputs(
        info: &StageInfo,
        declared: Vec<ViewDescriptor>,
        mut channels: Vec<InputChannel>,
    ) -> Result<Vec<(ViewDescriptor, InputChannel)>> {
        Self::check_cardinality(info, ViewDirection::Input, channels.len())?;

        for channel in &channels {
            if !declared.iter().any(|d| d.name == channel.name()) {
                return Err(ConveyorError::UnknownChannel {
                    name: channel.name().to_string(),
                    direction: ViewDirection::Input,
                });
            }
        }

        let mut bound = Vec::with_capacity(declared.len());
        for descriptor in declared {
            let position = channels
                .iter()
                .position(|c| c.name() == descriptor.name)
                .ok_or_else(|| ConveyorError::UnboundView {
                    name: descriptor.name.clone(),
                    direction: ViewDirection::Input,
                })?;
            let channel = channels.remove(position);
            if channel.kind() != descriptor.kind {
                return Err(ConveyorError::KindMismatch {
                    name: descriptor.name.clone(),
                    declared: descriptor.kind.to_string(),
                    bound: channel.kind().to_string(),
                });
            }
            bound.push((descriptor, channel));
        }
        Ok(bound)
    }

    fn bind_outputs(
        info: &StageInfo,
        declared: Vec<ViewDescriptor>,
        channels: Vec<OutputChannel>,
    ) -> Result<Vec<(ViewDescriptor, OutputChannel)>> {
        Self::bind_outputs_for(info, ViewDirection::Output, declared, channels)
    }

    fn bind_outputs_for(
        info: &StageInfo,
        direction: ViewDirection,
        declared: Vec<ViewDescriptor>,
        mut channels: Vec<OutputChannel>,
    ) -> Result<Vec<(ViewDescriptor, OutputChannel)>> {
        Self::check_cardinality(info, direction, channels.len())?;

        for channel in &channels {
            if !declared.iter().any(|d| d.name == channel.name()) {
                return Err(ConveyorError::UnknownChannel {
                    name: channel.name().to_string(),
                    direction,
                });
            }
        }

        let mut bound = Vec::with_capacity(declared.len());
        for descriptor in declared {
            let position = channels
                .iter()
                .position(|c| c.name() == descriptor.name)
                .ok_or_else(|| ConveyorError::UnboundView {
                    name: descriptor.name.clone(),
                    direction,
                })?;
            let channel = channels.remove(position);
            if channel.kind() != descriptor.kind {
                return Err(ConveyorError::KindMismatch {
                    name: descriptor.name.clone(),
                    declared: descriptor.kind.to_string(),
                    bound: channel.kind().to_string(),
                });
            }
            bound.push((descriptor, channel));
        }
        Ok(bound)
    }

    // =========================================================================
    // Input access
    // =========================================================================

    /// Names of the bound document input views, in declaration order.
    pub fn document_input_names(&self) -> Vec<String> {
        self.inputs
            .iter()
            .filter(|(d, _)| d.kind == ViewKind::Document)
            .map(|(d, _)| d.name.clone())
            .collect()
    }

    /// A document input view by name.
    pub fn input(&mut self, name: &str) -> Result<&mut DocumentSource> {
        self.inputs
            .iter_mut()
            .find(|(d, _)| d.name == name)
            .and_then(|(_, c)| match c {
                InputChannel::Document(source) => Some(source),
                InputChannel::Binary(_) => None,
            })
            .ok_or_else(|| ConveyorError::UnknownView {
                name: name.to_string(),
                direction: ViewDirection::Input,
            })
    }

    /// The single document input view (convenience for 1-input stages).
    pub fn sole_input(&mut self) -> Result<&mut DocumentSource> {
        let name = self
            .document_input_names()
            .into_iter()
            .next()
            .ok_or_else(|| ConveyorError::UnknownView {
                name: ViewDirection::Input.default_name(0),
                direction: ViewDirection::Input,
            })?;
        self.input(&name)
    }

    /// Detach all input channels, leaving outputs and errors in place.
    ///
    /// The runner uses this to iterate inputs while the stage writes to
    /// the remaining views.
    pub fn take_inputs(&mut self) -> Vec<(ViewDescriptor, InputChannel)> {
        std::mem::take(&mut self.inputs)
    }

    // =========================================================================
    // Output access
    // =========================================================================

    /// A document output view by name.
    pub fn output(&mut self, name: &str) -> Result<&mut DocumentSink> {
        Self::document_sink(&mut self.outputs, name, ViewDirection::Output)
    }

    /// Write to the single document output view (convenience).
    pub fn write_output(&mut self, document: Document) -> Result<()> {
        let sink = Self::first_document_sink(&mut self.outputs, ViewDirection::Output)?;
        sink.write(document);
        Ok(())
    }

    /// A binary output view by name.
    pub fn binary_output(&mut self, name: &str) -> Result<&mut BinarySink> {
        self.outputs
            .iter_mut()
            .find(|(d, _)| d.name == name)
            .and_then(|(_, c)| match c {
                OutputChannel::Binary(sink) => Some(sink),
                OutputChannel::Document(_) => None,
            })
            .ok_or_else(|| ConveyorError::UnknownView {
                name: name.to_string(),
                direction: ViewDirection::Output,
            })
    }

    /// Hand a lazy payload to the single binary output view.
    pub fn write_binary_output(&mut self, payload: Box<dyn BinaryPayload>) -> Result<()> {
        let sink = self
            .outputs
            .iter_mut()
            .find_map(|(_, c)| match c {
                OutputChannel::Binary(sink) => Some(sink),
                OutputChannel::Document(_) => None,
            })
            .ok_or_else(|| ConveyorError::UnknownView {
                name: ViewDirection::Output.default_name(0),
                direction: ViewDirection::Output,
            })?;
        sink.write(payload);
        Ok(())
    }

    // =========================================================================
    // Error routing
    // =========================================================================

    /// A document error view by name.
    pub fn error_view(&mut self, name: &str) -> Result<&mut DocumentSink> {
        Self::document_sink(&mut self.errors, name, ViewDirection::Error)
    }

    /// Divert a per-document failure to the first error view.
    ///
    /// The error document carries the diagnostic plus the offending
    /// content, nested so downstream can tell them apart.
    pub fn write_error(&mut self, error: DataError) -> Result<()> {
        let sink = Self::first_document_sink(&mut self.errors, ViewDirection::Error)?;
        sink.write(error.into_error_document());
        Ok(())
    }

    fn document_sink<'a>(
        slots: &'a mut [(ViewDescriptor, OutputChannel)],
        name: &str,
        direction: ViewDirection,
    ) -> Result<&'a mut DocumentSink> {
        slots
            .iter_mut()
            .find(|(d, _)| d.name == name)
            .and_then(|(_, c)| match c {
                OutputChannel::Document(sink) => Some(sink),
                OutputChannel::Binary(_) => None,
            })
            .ok_or_else(|| ConveyorError::UnknownView {
                name: name.to_string(),
                direction,
            })
    }

    fn first_document_sink(
        slots: &mut [(ViewDescriptor, OutputChannel)],
        direction: ViewDirection,
    ) -> Result<&mut DocumentSink> {
        slots
            .iter_mut()
            .find_map(|(_, c)| match c {
                OutputChannel::Document(sink) => Some(sink),
                OutputChannel::Binary(_) => None,
            })
            .ok_or_else(|| ConveyorError::UnknownView {
                name: direction.default_name(0),
                direction,
            })
    }

    // =========================================================================
    // Host-side inspection (after the run)
    // =========================================================================

    /// A read-only document output sink by name.
    pub fn output_documents(&self, name: &str) -> Result<&[Document]> {
        self.outputs
            .iter()
            .find(|(d, _)| d.name == name)
            .and_then(|(_, c)| match c {
                OutputChannel::Document(sink) => Some(sink.documents()),
                OutputChannel::Binary(_) => None,
            })
            .ok_or_else(|| ConveyorError::UnknownView {
                name: name.to_string(),
                direction: ViewDirection::Output,
            })
    }

    /// A read-only error sink by name.
    pub fn error_documents(&self, name: &str) -> Result<&[Document]> {
        self.errors
            .iter()
            .find(|(d, _)| d.name == name)
            .and_then(|(_, c)| match c {
                OutputChannel::Document(sink) => Some(sink.documents()),
                OutputChannel::Binary(_) => None,
            })
            .ok_or_else(|| ConveyorError::UnknownView {
                name: name.to_string(),
                direction: ViewDirection::Error,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::{StageInfo, ViewContract};
    use crate::view::ViewBuilder;

    fn declared_default(info: &StageInfo) -> Vec<ViewDescriptor> {
        let mut builder = ViewBuilder::new();
        info.default_views(&mut builder);
        builder.into_descriptors()
    }

    fn pass_through_info() -> StageInfo {
        StageInfo::new("Pass Through")
    }

    #[test]
    fn bind_succeeds_with_matching_channels() {
        let info = pass_through_info();
        let channels = HostChannels {
            inputs: vec![InputChannel::Document(DocumentSource::new(
                "input0",
                vec![],
            ))],
            outputs: vec![OutputChannel::Document(DocumentSink::new("output0"))],
            errors: vec![OutputChannel::Document(DocumentSink::new("error0"))],
        };

        let mut views = ViewSet::bind(&info, declared_default(&info), channels).unwrap();
        assert!(views.output("output0").is_ok());
        assert!(views.error_view("error0").is_ok());
    }

    #[test]
    fn bind_fails_fast_on_cardinality_violation() {
        let info = pass_through_info();
        // No output channel for a stage that requires exactly one.
        let channels = HostChannels {
            inputs: vec![InputChannel::Document(DocumentSource::new(
                "input0",
                vec![],
            ))],
            outputs: vec![],
            errors: vec![OutputChannel::Document(DocumentSink::new("error0"))],
        };

        let err = ViewSet::bind(&info, declared_default(&info), channels).unwrap_err();
        assert_eq!(err.code(), "E101");
        assert!(err.is_config_error());
    }

    #[test]
    fn bind_rejects_channel_with_undeclared_name() {
        let info = pass_through_info();
        let channels = HostChannels {
            inputs: vec![InputChannel::Document(DocumentSource::new(
                "input0",
                vec![],
            ))],
            outputs: vec![OutputChannel::Document(DocumentSink::new("out_left"))],
            errors: vec![OutputChannel::Document(DocumentSink::new("error0"))],
        };

        let err = ViewSet::bind(&info, declared_default(&info), channels).unwrap_err();
        assert_eq!(err.code(), "E103");
    }

    #[test]
    fn bind_rejects_kind_mismatch() {
        let info = StageInfo::new("Binary Out")
            .with_inputs(ViewContract::none())
            .with_outputs(ViewContract::binary(1, 1))
            .with_errors(ViewContract::documents(1, 1));

        let channels = HostChannels {
            inputs: vec![],
            outputs: vec![OutputChannel::Document(DocumentSink::new("output0"))],
            errors: vec![OutputChannel::Document(DocumentSink::new("error0"))],
        };

        let err = ViewSet::bind(&info, declared_default(&info), channels).unwrap_err();
        assert_eq!(err.code(), "E108");
    }

    #[test]
    fn lookup_of_unknown_view_fails() {
        let info = pass_through_info();
        let channels = HostChannels {
            inputs: vec![InputChannel::Document(DocumentSource::new(
                "input0",
                vec![],
            ))],
            outputs: vec![OutputChannel::Document(DocumentSink::new("output0"))],
            errors: vec![OutputChannel::Document(DocumentSink::new("error0"))],
        };

        let mut views = ViewSet::bind(&info, declared_default(&info), channels).unwrap();
        let err = views.output("output_extra").unwrap_err();
        assert_eq!(err.code(), "E104");
    }

    #[test]
    fn write_error_synthesizes_error_document() {
        let info = pass_through_info();
        let channels = HostChannels {
            inputs: vec![InputChannel::Document(DocumentSource::new(
                "input0",
                vec![],
            ))],
            outputs: vec![OutputChannel::Document(DocumentSink::new("output0"))],
            errors: vec![OutputChannel::Document(DocumentSink::new("error0"))],
        };

        let mut views = ViewSet::bind(&info, declared_default(&info), channels).unwrap();
        views
            .write_error(DataError::new("bad record").with_reason("missing field"))
            .unwrap();

        let errors = views.error_documents("error0").unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].get("error").and_then(|v| v.as_string()),
            Some("bad record".to_string())
        );
    }
}
