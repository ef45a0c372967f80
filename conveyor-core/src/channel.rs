//! Host-provided channels backing bound views.
//!
//! Channels are the concrete endpoints the host wires to a stage's
//! declared views. Writes are synchronous handoffs; nothing here blocks
//! indefinitely. Document sinks record what was written so the host (or
//! the test harness) can drain them after the run.

use crate::document::{Document, Header};
use crate::error::{ConveyorError, Result};
use crate::view::ViewKind;
use std::collections::VecDeque;
use std::io::{Read, Write};
use std::sync::Arc;

/// A FIFO of documents feeding a stage's input view.
pub struct DocumentSource {
    name: String,
    queue: VecDeque<Document>,
}

impl DocumentSource {
    /// Create a source for the named view, seeded with documents in
    /// delivery order.
    pub fn new(name: impl Into<String>, documents: Vec<Document>) -> Self {
        Self {
            name: name.into(),
            queue: documents.into(),
        }
    }

    /// The bound view name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check whether another document is available.
    pub fn has_next(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Pull the next document, transferring ownership to the caller.
    pub fn next(&mut self) -> Option<Document> {
        self.queue.pop_front()
    }
}

/// Records documents written to an output or error view.
#[derive(Debug)]
pub struct DocumentSink {
    name: String,
    written: Vec<Document>,
}

impl DocumentSink {
    /// Create a sink for the named view.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            written: Vec::new(),
        }
    }

    /// The bound view name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Write a document. Ownership transfers to the view.
    pub fn write(&mut self, document: Document) {
        self.written.push(document);
    }

    /// Documents written so far, in write order.
    pub fn documents(&self) -> &[Document] {
        &self.written
    }

    /// Number of documents written.
    pub fn len(&self) -> usize {
        self.written.len()
    }

    /// Check whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.written.is_empty()
    }

    /// Drain everything written, leaving the sink empty.
    pub fn drain(&mut self) -> Vec<Document> {
        std::mem::take(&mut self.written)
    }
}

/// A byte stream feeding a binary input view, with the correlation header
/// of the exchange it belongs to.
pub struct BinarySource {
    name: String,
    header: Arc<Header>,
    reader: Box<dyn Read + Send>,
}

impl BinarySource {
    /// Create a binary source over a reader.
    pub fn new(name: impl Into<String>, header: Arc<Header>, reader: Box<dyn Read + Send>) -> Self {
        Self {
            name: name.into(),
            header,
            reader,
        }
    }

    /// Create a binary source over an in-memory byte buffer.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(name, Document::new().header(), Box::new(std::io::Cursor::new(bytes)))
    }

    /// The bound view name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The correlation header.
    pub fn header(&self) -> Arc<Header> {
        Arc::clone(&self.header)
    }

    /// Split into header and reader, consuming the source.
    pub fn into_parts(self) -> (Arc<Header>, Box<dyn Read + Send>) {
        (self.header, self.reader)
    }
}

/// A lazily produced binary output.
///
/// The header is available as soon as the payload is handed to the sink;
/// the payload bytes are produced only when the host drains the channel.
/// A stage must release its input resources before handing over the
/// payload.
pub trait BinaryPayload: Send {
    /// The correlation header for this payload.
    fn header(&self) -> Arc<Header>;

    /// Produce the payload bytes into the host's writer.
    fn write(&mut self, writer: &mut dyn Write) -> std::io::Result<()>;
}

/// An owned-bytes payload, sufficient for most stages.
pub struct BytesPayload {
    header: Arc<Header>,
    bytes: Vec<u8>,
}

impl BytesPayload {
    /// Create a payload from fully materialized bytes.
    pub fn new(header: Arc<Header>, bytes: Vec<u8>) -> Self {
        Self { header, bytes }
    }
}

impl BinaryPayload for BytesPayload {
    fn header(&self) -> Arc<Header> {
        Arc::clone(&self.header)
    }

    fn write(&mut self, writer: &mut dyn Write) -> std::io::Result<()> {
        writer.write_all(&self.bytes)
    }
}

/// Holds the payload written to a binary output view until the host
/// drains it.
pub struct BinarySink {
    name: String,
    payload: Option<Box<dyn BinaryPayload>>,
}

impl BinarySink {
    /// Create a sink for the named view.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: None,
        }
    }

    /// The bound view name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hand over the lazy payload. Replaces any previous payload.
    pub fn write(&mut self, payload: Box<dyn BinaryPayload>) {
        self.payload = Some(payload);
    }

    /// Check whether a payload is ready.
    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    /// The payload's header, if one was handed over.
    pub fn header(&self) -> Option<Arc<Header>> {
        self.payload.as_ref().map(|p| p.header())
    }

    /// Drain the payload, producing its bytes now.
    pub fn drain(&mut self) -> Result<Vec<u8>> {
        let mut payload = self.payload.take().ok_or_else(|| ConveyorError::Io {
            context: format!("draining binary view '{}'", self.name),
            cause: "no payload was written".to_string(),
        })?;
        let mut bytes = Vec::new();
        payload.write(&mut bytes).map_err(|e| ConveyorError::Io {
            context: format!("draining binary view '{}'", self.name),
            cause: e.to_string(),
        })?;
        Ok(bytes)
    }
}

/// An input channel of either payload kind.
pub enum InputChannel {
    /// Document input.
    Document(DocumentSource),
    /// Binary input.
    Binary(BinarySource),
}

impl InputChannel {
    /// The bound view name.
    pub fn name(&self) -> &str {
        match self {
            Self::Document(s) => s.name(),
            Self::Binary(s) => s.name(),
        }
    }

    /// The payload kind of this channel.
    pub fn kind(&self) -> ViewKind {
        match self {
            Self::Document(_) => ViewKind::Document,
            Self::Binary(_) => ViewKind::Binary,
        }
    }
}

/// An output (or error) channel of either payload kind.
pub enum OutputChannel {
    /// Document output.
    Document(DocumentSink),
    /// Binary output.
    Binary(BinarySink),
}

impl OutputChannel {
    /// The bound view name.
    pub fn name(&self) -> &str {
        match self {
            Self::Document(s) => s.name(),
            Self::Binary(s) => s.name(),
        }
    }

    /// The payload kind of this channel.
    pub fn kind(&self) -> ViewKind {
        match self {
            Self::Document(_) => ViewKind::Document,
            Self::Binary(_) => ViewKind::Binary,
        }
    }
}
