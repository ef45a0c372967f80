//! Document generator stages.
//!
//! Sources that fabricate documents rather than reading them from an
//! input view. Useful as the head of a pipeline and as the simplest
//! possible examples of the run-to-completion lifecycle.

use conveyor_core::prelude::*;
use serde_json::json;

/// Generates a configurable number of documents.
///
/// # Views
/// - Output: "output0" - The generated documents, in index order
/// - Error: "error0" - A single error document when `count` is negative
///
/// Document `i` (1-based) carries `"key" -> "value{i}"`. A negative
/// count produces no output documents and exactly one error document;
/// the run still completes normally and cleanup still reports totals.
#[derive(Debug, Default)]
pub struct DocGenerator {
    count: i64,
    generated: u64,
}

impl Stage for DocGenerator {
    fn info(&self) -> StageInfo {
        StageInfo::new("Doc Generator")
            .with_purpose("Generates a configurable number of documents.")
            .with_category(StageCategory::Read)
            .with_inputs(ViewContract::none())
            .with_outputs(ViewContract::documents(1, 1))
            .with_errors(ViewContract::documents(1, 1))
    }

    fn define_properties(&self, builder: &mut PropertyBuilder) {
        builder
            .describe("count", "Number of documents")
            .description("How many documents should be generated.")
            .kind(PropertyKind::Integer)
            .required()
            .add();
    }

    fn configure(&mut self, values: &PropertyValues) -> Result<()> {
        self.count = values.get("count")?;
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        tracing::info!(generated = self.generated, "doc generator finished");
        Ok(())
    }
}

impl ExecuteStage for DocGenerator {
    fn execute(&mut self, views: &mut ViewSet) -> Result<()> {
        if self.count < 0 {
            views.write_error(
                DataError::new(format!("Count is negative: {}", self.count))
                    .with_reason("cannot generate a negative number of documents")
                    .with_resolution("Set the count property to zero or greater"),
            )?;
            return Ok(());
        }
        for i in 1..=self.count {
            let mut document = Document::new();
            document.set("key", format!("value{i}"));
            views.write_output(document)?;
            self.generated += 1;
        }
        Ok(())
    }
}

/// Generates exactly one `{"key": "value"}` document.
#[derive(Debug, Default)]
pub struct SingleDocGenerator;

impl Stage for SingleDocGenerator {
    fn info(&self) -> StageInfo {
        StageInfo::new("Single Doc Generator")
            .with_purpose("Generates one document.")
            .with_category(StageCategory::Read)
            .with_inputs(ViewContract::none())
            .with_outputs(ViewContract::documents(1, 1))
            .with_errors(ViewContract::documents(1, 1))
    }

    fn configure(&mut self, _values: &PropertyValues) -> Result<()> {
        Ok(())
    }
}

impl ExecuteStage for SingleDocGenerator {
    fn execute(&mut self, views: &mut ViewSet) -> Result<()> {
        let mut document = Document::new();
        document.set("key", json!("value"));
        views.write_output(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conveyor_core::testing::StageTester;

    #[test]
    fn generates_count_documents_in_order() {
        let mut stage = DocGenerator::default();
        let outcome = StageTester::new()
            .property("count", 3)
            .run_execute(&mut stage)
            .unwrap();

        let docs = outcome.output("output0").unwrap();
        assert_eq!(docs.len(), 3);
        for (i, doc) in docs.iter().enumerate() {
            assert_eq!(
                doc.get("key").and_then(|v| v.as_string()),
                Some(format!("value{}", i + 1))
            );
        }
        assert!(outcome.errors("error0").unwrap().is_empty());
    }

    #[test]
    fn zero_count_generates_nothing() {
        let mut stage = DocGenerator::default();
        let outcome = StageTester::new()
            .property("count", 0)
            .run_execute(&mut stage)
            .unwrap();
        assert!(outcome.output("output0").unwrap().is_empty());
        assert!(outcome.errors("error0").unwrap().is_empty());
    }

    #[test]
    fn negative_count_is_one_error_document_and_a_clean_run() {
        let mut stage = DocGenerator::default();
        let outcome = StageTester::new()
            .property("count", -2)
            .run_execute(&mut stage)
            .unwrap();

        assert!(outcome.output("output0").unwrap().is_empty());
        let errors = outcome.errors("error0").unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].get("error").and_then(|v| v.as_string()).as_deref(),
            Some("Count is negative: -2")
        );
        assert!(errors[0].contains_key("reason"));
        assert!(errors[0].contains_key("resolution"));
    }

    #[test]
    fn missing_count_fails_before_execution() {
        let mut stage = DocGenerator::default();
        let err = StageTester::new().run_execute(&mut stage).unwrap_err();
        assert_eq!(err.code(), "E105");
    }

    #[test]
    fn single_doc_generator_emits_exactly_one() {
        let mut stage = SingleDocGenerator;
        let outcome = StageTester::new().run_execute(&mut stage).unwrap();
        let docs = outcome.output("output0").unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(
            docs[0].get("key").and_then(|v| v.as_string()).as_deref(),
            Some("value")
        );
    }
}
