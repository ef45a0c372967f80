//! The document: the atomic unit of data flowing through a stage.
//!
//! A document is an opaque correlation header plus an ordered body
//! mapping. Bodies are ordered maps, so generated output is stable and
//! table-shaped data keeps its row order.
//!
//! Ownership rule: a document is exclusively owned by whichever component
//! holds it. Once written to a view it belongs to the view; the producer
//! must not touch it again. A derived copy gets its own body but shares
//! the header, so mutating a derived copy never affects the original.

use crate::value::{Body, Value};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use uuid::Uuid;

/// Opaque correlation token attached to every document.
///
/// Headers are shared by reference between a document and its derived
/// copies, so a downstream stage can correlate an error document with the
/// input that produced it.
#[derive(Debug, PartialEq, Eq)]
pub struct Header {
    id: Uuid,
}

impl Header {
    fn fresh() -> Arc<Self> {
        Arc::new(Self { id: Uuid::new_v4() })
    }

    /// The unique id of this header.
    pub fn id(&self) -> Uuid {
        self.id
    }
}

/// The unit of data exchanged over document views.
#[derive(Debug, Clone)]
pub struct Document {
    header: Arc<Header>,
    body: Body,
}

impl Document {
    /// Create an empty document with a fresh header.
    pub fn new() -> Self {
        Self {
            header: Header::fresh(),
            body: Body::new(),
        }
    }

    /// Create a document from a plain mapping, with a fresh header.
    pub fn with_body(body: Body) -> Self {
        Self {
            header: Header::fresh(),
            body,
        }
    }

    /// Create a document carrying an existing header.
    ///
    /// Used when a stage produces a new document in response to an input
    /// document and wants downstream correlation preserved.
    pub fn for_header(header: Arc<Header>, body: Body) -> Self {
        Self { header, body }
    }

    /// Derive a shallow copy: fresh body clone, shared header.
    ///
    /// The copy can be mutated freely without affecting the original.
    #[must_use]
    pub fn derive(&self) -> Self {
        Self {
            header: Arc::clone(&self.header),
            body: self.body.clone(),
        }
    }

    /// The document's header, shared by reference.
    pub fn header(&self) -> Arc<Header> {
        Arc::clone(&self.header)
    }

    /// Get a body field by dotted path.
    pub fn get(&self, path: &str) -> Option<Value> {
        Value(JsonValue::Object(self.body.clone())).get_field(path)
    }

    /// Get a top-level body field without cloning the whole body.
    pub fn field(&self, key: &str) -> Option<&JsonValue> {
        self.body.get(key)
    }

    /// Set a top-level body field, replacing any existing value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) {
        self.body.insert(key.into(), value.into());
    }

    /// Check whether a top-level key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.body.contains_key(key)
    }

    /// Number of top-level body fields.
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check whether the body is empty.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Borrow the body.
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Consume the document, keeping only its body.
    pub fn into_body(self) -> Body {
        self.body
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for Document {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.body.serialize(serializer)
    }
}

impl From<Body> for Document {
    fn from(body: Body) -> Self {
        Self::with_body(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(pairs: &[(&str, JsonValue)]) -> Document {
        let mut body = Body::new();
        for (k, v) in pairs {
            body.insert((*k).to_string(), v.clone());
        }
        Document::with_body(body)
    }

    #[test]
    fn body_keys_keep_insertion_order() {
        let d = doc(&[("z", json!(1)), ("a", json!(2)), ("m", json!(3))]);
        let keys: Vec<&String> = d.body().keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn derived_copy_shares_header() {
        let original = doc(&[("gender", json!("male"))]);
        let copy = original.derive();
        assert_eq!(original.header().id(), copy.header().id());
    }

    #[test]
    fn mutating_derived_copy_leaves_original_untouched() {
        let original = doc(&[("name", json!("ada"))]);
        let mut copy = original.derive();
        copy.set("processed", "True");

        assert!(copy.contains_key("processed"));
        assert!(!original.contains_key("processed"));
        assert_eq!(original.len(), 1);
    }

    #[test]
    fn for_header_preserves_correlation() {
        let input = doc(&[("amount", json!(10))]);
        let header = input.header();

        let mut body = Body::new();
        body.insert("EUR".to_string(), json!(8.5));
        let output = Document::for_header(input.header(), body);

        assert_eq!(output.header().id(), header.id());
    }

    #[test]
    fn fresh_documents_get_distinct_headers() {
        assert_ne!(Document::new().header().id(), Document::new().header().id());
    }

    #[test]
    fn dotted_get_traverses_nested_maps() {
        let d = doc(&[("result", json!({"status": "ok"}))]);
        assert_eq!(
            d.get("result.status").and_then(|v| v.as_string()),
            Some("ok".to_string())
        );
    }
}
