use std::fmt;
use std::ops::Range;

use serde::Serialize;

use crate::error::MaskError;

/// Names the buffer a [`SpanRef`] points into.
///
/// Container-backed buffers use the stream's directory entry id; buffers that only exist in
/// memory (an inflated HWP section, a nested OLE object) use [`BufferId::SCRATCH`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BufferId(pub u32);

impl BufferId {
    pub const SCRATCH: BufferId = BufferId(u32::MAX);
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == BufferId::SCRATCH {
            f.write_str("scratch")
        } else {
            write!(f, "stream#{}", self.0)
        }
    }
}

/// A byte range relative to the start of a named buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanRef {
    pub buffer: BufferId,
    pub start: usize,
    pub len: usize,
}

impl SpanRef {
    pub fn new(buffer: BufferId, start: usize, len: usize) -> Self {
        Self { buffer, start, len }
    }

    pub fn end(&self) -> usize {
        self.start.saturating_add(self.len)
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }
}

impl fmt::Display for SpanRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}..{}]", self.buffer, self.start, self.end())
    }
}

/// An in-memory copy of one stream, mutated only through same-length writes.
///
/// Every successful write is remembered so the container layer can flush exactly the touched
/// ranges back through the sector chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamBuffer {
    id: BufferId,
    bytes: Vec<u8>,
    dirty: Vec<SpanRef>,
}

impl StreamBuffer {
    pub fn new(id: BufferId, bytes: Vec<u8>) -> Self {
        Self {
            id,
            bytes,
            dirty: Vec::new(),
        }
    }

    pub fn scratch(bytes: Vec<u8>) -> Self {
        Self::new(BufferId::SCRATCH, bytes)
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// A span over this buffer.
    pub fn span(&self, start: usize, len: usize) -> SpanRef {
        SpanRef::new(self.id, start, len)
    }

    /// Overwrite `span` with `replacement`; see [`crate::write_same_length`].
    pub fn write(&mut self, span: SpanRef, replacement: &[u8]) -> Result<(), MaskError> {
        crate::mask::write_same_length(self, span, replacement)
    }

    pub fn dirty_spans(&self) -> &[SpanRef] {
        &self.dirty
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    pub(crate) fn mark_dirty(&mut self, span: SpanRef) {
        self.dirty.push(span);
    }
}
