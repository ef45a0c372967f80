//! Stream merge stage.

use conveyor_core::prelude::*;

/// Merges two document streams into one output.
///
/// # Views
/// - Input: "input0", "input1" - The streams to merge
/// - Output: "output0" - Every document, stamped `processed="True"`
///
/// Each input document is forwarded as a derived copy, so the output
/// shares the original's header but edits never leak back upstream.
#[derive(Debug, Default)]
pub struct MergeStreams {
    merged: u64,
}

impl Stage for MergeStreams {
    fn info(&self) -> StageInfo {
        StageInfo::new("Merge Streams")
            .with_purpose("Merges two document streams into one.")
            .with_category(StageCategory::Flow)
            .with_inputs(ViewContract::documents(2, 2))
            .with_outputs(ViewContract::documents(1, 1))
            .with_errors(ViewContract::documents(1, 1))
    }

    fn configure(&mut self, _values: &PropertyValues) -> Result<()> {
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        tracing::info!(merged = self.merged, "merge finished");
        Ok(())
    }
}

impl ProcessStage for MergeStreams {
    fn process(
        &mut self,
        document: Document,
        input_view: &str,
        views: &mut ViewSet,
    ) -> std::result::Result<(), DataError> {
        tracing::debug!(view = %input_view, "merging document");
        let mut out = document.derive();
        out.set("processed", "True");
        self.merged += 1;
        views
            .write_output(out)
            .map_err(|e| DataError::new(e.to_string()))
    }
}
