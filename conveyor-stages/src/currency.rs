//! Currency conversion stage.

use conveyor_core::prelude::*;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Supplies exchange rates relative to the base currency.
///
/// The default implementation reads them from a JSON file named by the
/// `input_file` property; tests and embedders can inject their own.
pub trait RateSource: Send {
    /// The rate for a currency code, if known.
    fn rate(&self, currency: &str) -> Option<f64>;
}

/// Rates loaded from a JSON object of `{"CODE": rate}` entries.
#[derive(Debug, Clone)]
pub struct FileRates {
    rates: HashMap<String, f64>,
}

impl FileRates {
    /// Load rates from a JSON file. The file handle is closed before
    /// this returns.
    pub fn load(path: &Path) -> std::result::Result<Self, DataError> {
        let file = File::open(path).map_err(|e| {
            DataError::new(format!("cannot open rates file {}: {e}", path.display()))
                .with_resolution("Check that the rates file exists and is readable")
        })?;
        let rates = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            DataError::new(format!("malformed rates file {}: {e}", path.display()))
                .with_resolution("The rates file must be a JSON object of currency to rate")
        })?;
        Ok(Self { rates })
    }
}

impl RateSource for FileRates {
    fn rate(&self, currency: &str) -> Option<f64> {
        self.rates.get(currency).copied()
    }
}

/// Converts an amount into a target currency.
///
/// # Views
/// - Input: "input0" - Documents carrying `to` and `amount`
/// - Output: "output0" - One `{CODE: converted}` document each
/// - Error: "error0" - Unknown currencies and unreadable rate files
///
/// The `input_file` property is an expression, so the rates file can be
/// named per document. A rate source injected through
/// [`CurrencyConverter::with_source`] takes precedence over the file.
pub struct CurrencyConverter {
    source: Option<Box<dyn RateSource>>,
    input_file: Option<Expression>,
    cached: Option<(String, FileRates)>,
    converted: u64,
}

impl Default for CurrencyConverter {
    fn default() -> Self {
        Self {
            source: None,
            input_file: None,
            cached: None,
            converted: 0,
        }
    }
}

impl CurrencyConverter {
    /// Convert using an injected rate source instead of a file.
    pub fn with_source(source: impl RateSource + 'static) -> Self {
        Self {
            source: Some(Box::new(source)),
            ..Self::default()
        }
    }

    fn file_rate(&mut self, document: &Document, currency: &str) -> std::result::Result<Option<f64>, DataError> {
        let expression = self.input_file.as_ref().ok_or_else(|| {
            DataError::new("no rate source configured")
                .with_resolution("Set the input_file property or inject a rate source")
        })?;
        let path = expression.eval_string(Some(document))?;
        if self.cached.as_ref().map_or(true, |(p, _)| *p != path) {
            let rates = FileRates::load(Path::new(&path))?;
            self.cached = Some((path, rates));
        }
        match &self.cached {
            Some((_, rates)) => Ok(rates.rate(currency)),
            None => Ok(None),
        }
    }
}

impl Stage for CurrencyConverter {
    fn info(&self) -> StageInfo {
        StageInfo::new("Currency Converter")
            .with_purpose("Converts amounts into a target currency.")
    }

    fn define_properties(&self, builder: &mut PropertyBuilder) {
        builder
            .describe("input_file", "Rates file")
            .description("Path of the JSON file holding exchange rates.")
            .expression()
            .add();
    }

    fn configure(&mut self, values: &PropertyValues) -> Result<()> {
        if self.source.is_none() {
            self.input_file = Some(values.as_expression("input_file")?);
        }
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        tracing::info!(converted = self.converted, "currency converter finished");
        Ok(())
    }
}

impl ProcessStage for CurrencyConverter {
    fn process(
        &mut self,
        document: Document,
        _input_view: &str,
        views: &mut ViewSet,
    ) -> std::result::Result<(), DataError> {
        let to = document
            .get("to")
            .and_then(|v| v.as_string())
            .ok_or_else(|| DataError::new("document has no target currency").for_document(document.clone()))?;
        let amount = document
            .get("amount")
            .and_then(|v| v.as_f64())
            .ok_or_else(|| DataError::new("document has no numeric amount").for_document(document.clone()))?;

        let rate = match &self.source {
            Some(source) => source.rate(&to),
            None => self.file_rate(&document, &to)?,
        };
        let rate = rate.ok_or_else(|| {
            DataError::new(format!("no exchange rate for currency: {to}"))
                .for_document(document.clone())
                .with_resolution("Add the currency to the rates source")
        })?;

        let mut body = Body::new();
        body.insert(to, serde_json::json!(amount * rate));
        let out = Document::for_header(document.header(), body);
        self.converted += 1;
        views
            .write_output(out)
            .map_err(|e| DataError::new(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conveyor_core::testing::StageTester;
    use std::io::Write as _;

    struct FixedRates;

    impl RateSource for FixedRates {
        fn rate(&self, currency: &str) -> Option<f64> {
            match currency {
                "EUR" => Some(0.5),
                "GBP" => Some(0.25),
                _ => None,
            }
        }
    }

    fn order(to: &str, amount: f64) -> Document {
        let mut d = Document::new();
        d.set("to", to);
        d.set("amount", serde_json::json!(amount));
        d
    }

    #[test]
    fn converts_with_an_injected_source() {
        let mut stage = CurrencyConverter::with_source(FixedRates);
        let outcome = StageTester::new()
            .input("input0", vec![order("EUR", 10.0), order("GBP", 8.0)])
            .run_process(&mut stage)
            .unwrap();

        let docs = outcome.output("output0").unwrap();
        assert_eq!(docs[0].get("EUR").and_then(|v| v.as_f64()), Some(5.0));
        assert_eq!(docs[1].get("GBP").and_then(|v| v.as_f64()), Some(2.0));
    }

    #[test]
    fn unknown_currency_goes_to_the_error_view() {
        let mut stage = CurrencyConverter::with_source(FixedRates);
        let outcome = StageTester::new()
            .input("input0", vec![order("JPY", 10.0), order("EUR", 1.0)])
            .run_process(&mut stage)
            .unwrap();

        assert_eq!(outcome.output("output0").unwrap().len(), 1);
        let errors = outcome.errors("error0").unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0]
            .get("error")
            .and_then(|v| v.as_string())
            .is_some_and(|m| m.contains("JPY")));
    }

    #[test]
    fn loads_rates_from_the_named_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", r#"{"EUR": 2.0}"#).unwrap();
        let path = file.path().to_string_lossy().into_owned();

        let mut stage = CurrencyConverter::default();
        let outcome = StageTester::new()
            .property("input_file", path)
            .input("input0", vec![order("EUR", 3.0)])
            .run_process(&mut stage)
            .unwrap();

        let docs = outcome.output("output0").unwrap();
        assert_eq!(docs[0].get("EUR").and_then(|v| v.as_f64()), Some(6.0));
    }

    #[test]
    fn missing_rates_file_is_a_per_document_error() {
        let mut stage = CurrencyConverter::default();
        let outcome = StageTester::new()
            .property("input_file", "/nonexistent/rates.json")
            .input("input0", vec![order("EUR", 3.0)])
            .run_process(&mut stage)
            .unwrap();

        assert!(outcome.output("output0").unwrap().is_empty());
        assert_eq!(outcome.errors("error0").unwrap().len(), 1);
    }
}
