use thiserror::Error;

use crate::span::{BufferId, SpanRef};

/// A write that would have broken the same-length invariant. The write is refused and the
/// original bytes stay in place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaskError {
    #[error("replacement for {span} is {actual} bytes, expected {expected}")]
    LengthMismatch {
        span: SpanRef,
        expected: usize,
        actual: usize,
    },
    #[error("span {span} targets a different buffer than {target}")]
    ForeignSpan { span: SpanRef, target: BufferId },
    #[error("span {span} lies outside a {buffer_len}-byte buffer")]
    OutOfBounds { span: SpanRef, buffer_len: usize },
}
