//! HWP 5.0 body text redaction.
//!
//! An HWP document is a compound file whose `BodyText/Section<N>` streams hold tagged records,
//! raw-deflated when the `FileHeader` says so. Paragraph text (`HWPTAG_PARA_TEXT`) is decoded
//! with its inline controls skipped, masked in place, and the section is recompressed into the
//! space the original stream occupied.

pub mod bindata;
mod error;
mod file_header;
pub mod para_text;
pub mod records;
pub mod section;

#[cfg(test)]
mod fuzz_tests;

pub use bindata::{find_embedded_cfb, is_body_section, is_ole_bindata};
pub use error::HwpError;
pub use file_header::FileHeader;
pub use para_text::decode_para_text;
pub use records::{parse_records, split_header, HwpRecord, HwpRecordIter, HwpTag};
pub use section::{
    deflate_to_fit, inflate, inflate_with_limit, redact_section_records, redact_section_stream,
    RedactedSection,
};
