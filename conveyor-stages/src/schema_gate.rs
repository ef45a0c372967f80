//! Schema-enforcing pass-through stage.

use conveyor_core::prelude::*;

/// Passes documents through unchanged, but declares a three-column
/// schema which the runner enforces on the way in.
///
/// # Views
/// - Input: "input0" - Documents that must carry colA, colB and colC
/// - Output: "output0" - Valid documents, unmodified
/// - Error: "error0" - Documents missing a declared column
#[derive(Debug, Default)]
pub struct SchemaGate;

const COLUMNS: [&str; 3] = ["colA", "colB", "colC"];

impl Stage for SchemaGate {
    fn info(&self) -> StageInfo {
        StageInfo::new("Schema Gate").with_purpose("Enforces a declared document shape.")
    }

    fn define_schemas(&self, provider: &mut SchemaProvider) {
        let mut input = provider.schema_builder(ViewDirection::Input, "input0");
        for column in COLUMNS {
            input = input.column(column, ColumnKind::String);
        }
        input.add();

        let mut output = provider.schema_builder(ViewDirection::Output, "output0");
        for column in COLUMNS {
            output = output.column(column, ColumnKind::String);
        }
        output.add();
    }

    fn configure(&mut self, _values: &PropertyValues) -> Result<()> {
        Ok(())
    }
}

impl ProcessStage for SchemaGate {
    fn process(
        &mut self,
        document: Document,
        _input_view: &str,
        views: &mut ViewSet,
    ) -> std::result::Result<(), DataError> {
        views
            .write_output(document)
            .map_err(|e| DataError::new(e.to_string()))
    }
}
