//! Suggestion callback demonstration stage.

use conveyor_core::prelude::*;
use serde_json::json;

/// Suggests a value for one property from another.
///
/// Declares `name` and `echo`; asking for suggestions on `echo` returns
/// whatever `name` currently holds. Executing the stage writes a single
/// document carrying the configured echo value.
#[derive(Debug, Default)]
pub struct EchoSuggest {
    echo: String,
}

impl Stage for EchoSuggest {
    fn info(&self) -> StageInfo {
        StageInfo::new("Echo Suggest")
            .with_purpose("Echoes a suggested value back as a document.")
            .with_category(StageCategory::Read)
            .with_inputs(ViewContract::none())
    }

    fn define_properties(&self, builder: &mut PropertyBuilder) {
        builder.describe("name", "Name").add();
        builder
            .describe("echo", "Echo")
            .with_suggestions(|values: &PropertyValues| {
                values
                    .raw("name")
                    .into_iter()
                    .cloned()
                    .collect()
            })
            .add();
    }

    fn configure(&mut self, values: &PropertyValues) -> Result<()> {
        self.echo = values.get_opt("echo")?.unwrap_or_default();
        Ok(())
    }
}

impl ExecuteStage for EchoSuggest {
    fn execute(&mut self, views: &mut ViewSet) -> Result<()> {
        let mut document = Document::new();
        document.set("echo", json!(self.echo));
        views.write_output(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conveyor_core::testing::StageTester;

    #[test]
    fn echo_suggestions_mirror_the_name_property() {
        let tester = StageTester::new().property("name", "picked");
        let suggestions = tester.suggest(&EchoSuggest::default(), "echo");
        assert_eq!(suggestions, vec![json!("picked")]);
    }

    #[test]
    fn no_name_means_no_suggestions() {
        let tester = StageTester::new();
        assert!(tester.suggest(&EchoSuggest::default(), "echo").is_empty());
    }

    #[test]
    fn execute_writes_the_configured_echo() {
        let mut stage = EchoSuggest::default();
        let outcome = StageTester::new()
            .property("echo", "picked")
            .run_execute(&mut stage)
            .unwrap();
        let docs = outcome.output("output0").unwrap();
        assert_eq!(
            docs[0].get("echo").and_then(|v| v.as_string()).as_deref(),
            Some("picked")
        );
    }
}
