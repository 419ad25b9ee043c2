//! Shared building blocks for same-length redaction inside legacy binary office containers.
//!
//! Every format codec in the workspace decodes text out of a stream buffer, asks a
//! [`SensitivityOracle`] which character ranges are sensitive, and writes masked bytes back through
//! [`StreamBuffer::write`]. That write is the only mutation path and it refuses any replacement
//! whose length differs from the bytes it replaces, so record headers, piece tables and sector
//! chains downstream of the edit stay valid.

mod config;
mod error;
mod mask;
mod oracle;
mod report;
mod span;
mod text;

#[cfg(test)]
mod fuzz_tests;

pub use config::RedactionConfig;
pub use error::MaskError;
pub use mask::{mask, redact_decoded, redact_text_span, write_same_length, MaskContext};
pub use oracle::{
    locate_raw_spans, LiteralOracle, NormalizedText, RawSpan, SensitiveSpan, SensitivityOracle,
};
pub use report::{RedactionReport, RedactionWarning};
pub use span::{BufferId, SpanRef, StreamBuffer};
pub use text::{
    decode_ansi, decode_codepage_indexed, decode_utf16le_indexed, encode_char,
    encoding_for_codepage, fit_to_width, CharSlot, DecodedText, TextEncoding,
};
