//! Deferred property expressions.
//!
//! An expression wraps a raw property value and evaluates it against an
//! optional document. Scalars evaluate by a small set of rules:
//!
//! * `"$field"` and `"$.path.to.field"` reference the document body and
//!   require a document to be supplied,
//! * `"scope.name"` where `scope` is a registered variable scope looks
//!   up the named variable,
//! * anything else is a literal and evaluates to itself.
//!
//! Objects evaluate entry-wise and arrays element-wise, both preserving
//! order, so composite and table properties nest these rules.

use crate::document::Document;
use crate::error::DataError;
use crate::value::Body;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// A property value held back for evaluation against documents.
///
/// Evaluation is pure: the same expression against the same document
/// always yields the same value.
#[derive(Debug, Clone)]
pub struct Expression {
    source: JsonValue,
    variables: BTreeMap<String, Body>,
}

impl Expression {
    pub(crate) fn new(source: JsonValue, variables: BTreeMap<String, Body>) -> Self {
        Self { source, variables }
    }

    /// The raw value backing this expression.
    pub fn source(&self) -> &JsonValue {
        &self.source
    }

    /// Evaluate against an optional document.
    ///
    /// Document references fail with a data error when no document is
    /// supplied; literals and variable references evaluate either way.
    pub fn eval(&self, document: Option<&Document>) -> Result<JsonValue, DataError> {
        self.eval_value(&self.source, document)
    }

    /// Evaluate, coercing the result to a string.
    pub fn eval_string(&self, document: Option<&Document>) -> Result<String, DataError> {
        match self.eval(document)? {
            JsonValue::String(s) => Ok(s),
            JsonValue::Number(n) => Ok(n.to_string()),
            JsonValue::Bool(b) => Ok(b.to_string()),
            other => Err(DataError::new(format!(
                "expected a string value, evaluated to {other}"
            ))),
        }
    }

    /// Evaluate, requiring an integer result.
    pub fn eval_i64(&self, document: Option<&Document>) -> Result<i64, DataError> {
        let value = self.eval(document)?;
        value.as_i64().ok_or_else(|| {
            DataError::new(format!("expected an integer value, evaluated to {value}"))
        })
    }

    /// Evaluate a composite shape into an ordered map.
    pub fn eval_map(&self, document: Option<&Document>) -> Result<Body, DataError> {
        match self.eval(document)? {
            JsonValue::Object(map) => Ok(map),
            other => Err(DataError::new(format!(
                "expected a composite value, evaluated to {other}"
            ))),
        }
    }

    /// Evaluate a table shape into ordered rows.
    pub fn eval_rows(&self, document: Option<&Document>) -> Result<Vec<Body>, DataError> {
        match self.eval(document)? {
            JsonValue::Array(rows) => rows
                .into_iter()
                .map(|row| match row {
                    JsonValue::Object(map) => Ok(map),
                    other => Err(DataError::new(format!(
                        "expected a table row, evaluated to {other}"
                    ))),
                })
                .collect(),
            other => Err(DataError::new(format!(
                "expected a table value, evaluated to {other}"
            ))),
        }
    }

    fn eval_value(
        &self,
        value: &JsonValue,
        document: Option<&Document>,
    ) -> Result<JsonValue, DataError> {
        match value {
            JsonValue::String(text) => self.eval_scalar(text, document),
            JsonValue::Object(map) => {
                let mut out = Body::new();
                for (key, entry) in map {
                    out.insert(key.clone(), self.eval_value(entry, document)?);
                }
                Ok(JsonValue::Object(out))
            }
            JsonValue::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.eval_value(item, document)?);
                }
                Ok(JsonValue::Array(out))
            }
            other => Ok(other.clone()),
        }
    }

    fn eval_scalar(
        &self,
        text: &str,
        document: Option<&Document>,
    ) -> Result<JsonValue, DataError> {
        if let Some(path) = text.strip_prefix('$') {
            let path = path.strip_prefix('.').unwrap_or(path);
            let document = document.ok_or_else(|| {
                DataError::new(format!(
                    "expression '{text}' references a document field but no document is available"
                ))
            })?;
            return document
                .get(path)
                .map(|v| v.into_inner())
                .ok_or_else(|| {
                    DataError::new(format!("document does not contain field '{path}'"))
                        .with_reason(format!("expression '{text}' did not resolve"))
                        .with_resolution("supply documents carrying the referenced field")
                });
        }
        if let Some((scope, name)) = text.split_once('.') {
            if let Some(bindings) = self.variables.get(scope) {
                return bindings.get(name).cloned().ok_or_else(|| {
                    DataError::new(format!("variable '{name}' is not defined in scope '{scope}'"))
                });
            }
        }
        Ok(JsonValue::String(text.to_owned()))
    }
}
