//! Field fan-out routing stage.

use conveyor_core::prelude::*;

/// Routes documents to one of two named outputs on the `gender` field.
///
/// # Views
/// - Input: "input0", "input1" - The streams to route
/// - Output: "output_male" - Documents with `gender == "male"`
/// - Output: "output_female" - Documents with `gender == "female"`
/// - Error: "error0" - Documents with a missing or unknown gender
///
/// Routed documents are forwarded as derived copies stamped
/// `processed="True"`. Every document goes to exactly one view.
/// Per-label totals are kept on the instance and logged once at
/// cleanup, never mid-run.
#[derive(Debug, Default)]
pub struct GenderRouter {
    male: u64,
    female: u64,
    unknown: u64,
}

impl Stage for GenderRouter {
    fn info(&self) -> StageInfo {
        StageInfo::new("Gender Router")
            .with_purpose("Routes documents by their gender field.")
            .with_category(StageCategory::Flow)
            .with_inputs(ViewContract::documents(2, 2))
            .with_outputs(ViewContract::documents(2, 2))
            .with_errors(ViewContract::documents(1, 1))
    }

    fn define_views(&self, builder: &mut ViewBuilder) {
        builder.describe("input0").add(ViewDirection::Input);
        builder.describe("input1").add(ViewDirection::Input);
        builder.describe("output_male").add(ViewDirection::Output);
        builder.describe("output_female").add(ViewDirection::Output);
        builder.describe("error0").add(ViewDirection::Error);
    }

    fn configure(&mut self, _values: &PropertyValues) -> Result<()> {
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        tracing::info!(
            male = self.male,
            female = self.female,
            unknown = self.unknown,
            "gender router finished"
        );
        Ok(())
    }
}

impl ProcessStage for GenderRouter {
    fn process(
        &mut self,
        document: Document,
        _input_view: &str,
        views: &mut ViewSet,
    ) -> std::result::Result<(), DataError> {
        let gender = document.get("gender").and_then(|v| v.as_string());
        let target = match gender.as_deref() {
            Some("male") => {
                self.male += 1;
                "output_male"
            }
            Some("female") => {
                self.female += 1;
                "output_female"
            }
            other => {
                self.unknown += 1;
                let label = other.unwrap_or("<missing>").to_string();
                return Err(DataError::new(format!("unroutable gender: {label}"))
                    .for_document(document)
                    .with_reason("gender must be 'male' or 'female'")
                    .with_resolution("Correct the gender field on the incoming documents"));
            }
        };
        let mut out = document.derive();
        out.set("processed", "True");
        views
            .output(target)
            .map_err(|e| DataError::new(e.to_string()))?
            .write(out);
        Ok(())
    }
}
