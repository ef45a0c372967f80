//! Terminal consumer stage.

use conveyor_core::prelude::*;

/// Drains its input view and counts what it saw.
///
/// # Views
/// - Input: "input0" - The documents to consume
///
/// Declares zero output views; a terminal unit is a legal cardinality.
/// The total is reported once, at cleanup.
#[derive(Debug, Default)]
pub struct DocConsumer {
    consumed: u64,
}

impl DocConsumer {
    /// Documents consumed so far.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }
}

impl Stage for DocConsumer {
    fn info(&self) -> StageInfo {
        StageInfo::new("Doc Consumer")
            .with_purpose("Consumes documents, ignoring their content.")
            .with_category(StageCategory::Write)
            .with_inputs(ViewContract::documents(1, 1))
            .with_outputs(ViewContract::none())
            .with_errors(ViewContract::documents(1, 1))
    }

    fn configure(&mut self, _values: &PropertyValues) -> Result<()> {
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        tracing::info!(consumed = self.consumed, "doc consumer finished");
        Ok(())
    }
}

impl ExecuteStage for DocConsumer {
    fn execute(&mut self, views: &mut ViewSet) -> Result<()> {
        let source = views.sole_input()?;
        while let Some(document) = source.next() {
            tracing::debug!(fields = document.len(), "consumed document");
            self.consumed += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conveyor_core::testing::StageTester;

    fn docs(n: usize) -> Vec<Document> {
        (0..n)
            .map(|i| {
                let mut d = Document::new();
                d.set("n", i as i64);
                d
            })
            .collect()
    }

    #[test]
    fn drains_and_counts_the_input() {
        let mut stage = DocConsumer::default();
        StageTester::new()
            .input("input0", docs(5))
            .run_execute(&mut stage)
            .unwrap();
        assert_eq!(stage.consumed(), 5);
    }

    #[test]
    fn empty_input_is_a_clean_run() {
        let mut stage = DocConsumer::default();
        StageTester::new().run_execute(&mut stage).unwrap();
        assert_eq!(stage.consumed(), 0);
    }
}
