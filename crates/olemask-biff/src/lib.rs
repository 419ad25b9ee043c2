//! BIFF5 and BIFF8 workbook string redaction.
//!
//! Walks the record stream of a `Workbook` and masks text in place: shared strings (`SST`, with
//! their `CONTINUE` records), inline cell labels, page headers and footers, text boxes (`TXO`)
//! and chart text. Every write keeps the byte footprint of the string it replaces, so record
//! lengths, `SST` offsets in `EXTSST` and the enclosing compound file stay valid.

mod biff5;
pub mod chart;
mod error;
pub mod records;
pub mod sst;
pub mod strings;
mod workbook;


pub use error::BiffError;
pub use records::{
    coalesce_with_continue, detect_biff_version, detect_codepage, has_filepass, iterate_records,
    read_record, write_back_merged, BiffRecord, BiffRecordIter, BiffRecordKind, BiffVersion,
    Coalesced, Segment,
};
pub use sst::{redact_sst, SstOutcome};
pub use strings::{redact_string, DecodePath, DecodedXlString, TextRun, XlUnicodeString};
pub use workbook::redact_workbook;
