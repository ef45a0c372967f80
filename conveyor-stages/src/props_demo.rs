//! Property shape demonstration stage.

use conveyor_core::prelude::*;
use serde_json::Value as JsonValue;

/// Exercises every property shape the engine supports.
///
/// Declares a masked password, a file path, a composite with two
/// children and a table with two columns. All of them are evaluated
/// once at configure time, against a null document context, and the
/// evaluated tree is emitted for every input document.
#[derive(Debug, Default)]
pub struct PropertyShowcase {
    evaluated: Body,
}

fn config_error(name: &str, error: DataError) -> ConveyorError {
    ConveyorError::InvalidConfig {
        field: name.to_string(),
        cause: error.to_string(),
    }
}

impl Stage for PropertyShowcase {
    fn info(&self) -> StageInfo {
        StageInfo::new("Property Showcase")
            .with_purpose("Demonstrates scalar, composite and table properties.")
            .with_inputs(ViewContract::documents(1, 1))
    }

    fn define_properties(&self, builder: &mut PropertyBuilder) {
        builder
            .describe("password_prop", "Password")
            .required()
            .obfuscate()
            .add();
        builder
            .describe("file_prop", "File")
            .description("A file path, possibly an expression.")
            .expression()
            .add();

        let first = builder.describe("child_file", "Child file").build();
        let second = builder.describe("child_prop", "Child property").build();
        builder
            .describe("parent_prop", "Composite")
            .kind(PropertyKind::Composite)
            .with_entry(first)
            .with_entry(second)
            .add();

        let col_a = builder.describe("table_file", "Table file").build();
        let col_b = builder.describe("table_prop", "Table property").build();
        builder
            .describe("table_param", "Table")
            .kind(PropertyKind::Table)
            .with_entry(col_a)
            .with_entry(col_b)
            .add();
    }

    fn configure(&mut self, values: &PropertyValues) -> Result<()> {
        let password: String = values.get("password_prop")?;

        let file = match values.raw("file_prop") {
            Some(_) => values
                .as_expression("file_prop")?
                .eval(None)
                .map_err(|e| config_error("file_prop", e))?,
            None => JsonValue::Null,
        };

        let composite = match values.raw("parent_prop") {
            Some(_) => JsonValue::Object(
                values
                    .as_expression("parent_prop")?
                    .eval_map(None)
                    .map_err(|e| config_error("parent_prop", e))?,
            ),
            None => JsonValue::Null,
        };

        let table = match values.raw("table_param") {
            Some(_) => {
                let rows = values
                    .as_expression("table_param")?
                    .eval_rows(None)
                    .map_err(|e| config_error("table_param", e))?;
                JsonValue::Array(rows.into_iter().map(JsonValue::Object).collect())
            }
            None => JsonValue::Null,
        };

        self.evaluated.insert("password_prop".to_string(), password.into());
        self.evaluated.insert("file_prop".to_string(), file);
        self.evaluated.insert("parent_prop".to_string(), composite);
        self.evaluated.insert("table_param".to_string(), table);
        Ok(())
    }
}

impl ProcessStage for PropertyShowcase {
    fn process(
        &mut self,
        document: Document,
        _input_view: &str,
        views: &mut ViewSet,
    ) -> std::result::Result<(), DataError> {
        let out = Document::for_header(document.header(), self.evaluated.clone());
        views
            .write_output(out)
            .map_err(|e| DataError::new(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conveyor_core::testing::StageTester;
    use serde_json::json;

    #[test]
    fn emits_the_evaluated_tree_per_document() {
        let mut stage = PropertyShowcase::default();
        let outcome = StageTester::new()
            .property("password_prop", "hunter2")
            .property("file_prop", "/tmp/demo.txt")
            .property(
                "parent_prop",
                json!({ "child_file": "a.txt", "child_prop": "alpha" }),
            )
            .property(
                "table_param",
                json!([
                    { "table_file": "1.txt", "table_prop": "one" },
                    { "table_file": "2.txt", "table_prop": "two" }
                ]),
            )
            .input("input0", vec![Document::new(), Document::new()])
            .run_process(&mut stage)
            .unwrap();

        let docs = outcome.output("output0").unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(
            docs[0].get("parent_prop.child_prop").and_then(|v| v.as_string()).as_deref(),
            Some("alpha")
        );
        let table = docs[0].field("table_param").unwrap();
        assert_eq!(table[0]["table_prop"], json!("one"));
        assert_eq!(table[1]["table_prop"], json!("two"));
    }

    #[test]
    fn table_row_order_is_preserved() {
        let rows: Vec<JsonValue> = (0..8)
            .map(|i| json!({ "table_file": format!("{i}.txt"), "table_prop": i.to_string() }))
            .collect();

        let mut stage = PropertyShowcase::default();
        let outcome = StageTester::new()
            .property("password_prop", "pw")
            .property("table_param", JsonValue::Array(rows))
            .input("input0", vec![Document::new()])
            .run_process(&mut stage)
            .unwrap();

        let table = outcome.output("output0").unwrap()[0]
            .field("table_param")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap();
        for (i, row) in table.iter().enumerate() {
            assert_eq!(row["table_prop"], json!(i.to_string()));
        }
    }

    #[test]
    fn wrong_composite_shape_is_a_config_error() {
        let mut stage = PropertyShowcase::default();
        let err = StageTester::new()
            .property("password_prop", "pw")
            .property("parent_prop", "not an object")
            .run_process(&mut stage)
            .unwrap_err();
        assert_eq!(err.code(), "E106");
    }
}
