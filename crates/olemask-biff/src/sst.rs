//! Shared string table (`SST`) redaction.
//!
//! The SST payload and its `CONTINUE` records are coalesced into one scratch buffer, every string
//! is parsed and masked there, and the merged bytes are split back over the original fragments.
//! Payload layout: `cstTotal: u32`, `cstUnique: u32`, then `cstUnique` XLUnicodeRichExtendedStrings.

use olemask_core::{MaskContext, RedactionReport, StreamBuffer};

use crate::records::{coalesce_with_continue, write_back_merged, BiffRecord};
use crate::strings::{redact_string, XlUnicodeString};

/// Outcome of one SST pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SstOutcome {
    pub hits: usize,
    pub strings: usize,
    /// Offset of the first record after the SST and its `CONTINUE` records.
    pub next_offset: usize,
}

pub fn redact_sst(
    ctx: &MaskContext<'_>,
    stream: &mut StreamBuffer,
    record: &BiffRecord,
    codepage: u16,
    site: &str,
    report: &mut RedactionReport,
) -> SstOutcome {
    let Some(coalesced) = coalesce_with_continue(stream.bytes(), record.offset) else {
        return SstOutcome {
            hits: 0,
            strings: 0,
            next_offset: record.end(),
        };
    };
    let next_offset = coalesced.next_offset;
    let fragment_ends = coalesced.fragment_ends();

    let Some(header) = coalesced.merged.get(4..8) else {
        report.warn(site, format!("SST at offset {} is shorter than its header", record.offset));
        return SstOutcome {
            hits: 0,
            strings: 0,
            next_offset,
        };
    };
    let unique = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;

    let mut scratch = StreamBuffer::scratch(coalesced.merged.clone());
    let mut pos = 8usize;
    let mut hits = 0usize;
    let mut strings = 0usize;
    for index in 0..unique {
        let Some((string, used)) =
            XlUnicodeString::parse_continued(scratch.bytes(), &fragment_ends, pos)
        else {
            report.warn(
                site,
                format!(
                    "SST string {index} of {unique} does not parse at merged offset {pos}; \
                     the rest of the table is left unscanned"
                ),
            );
            break;
        };
        hits += redact_string(ctx, &mut scratch, &string, codepage, site);
        strings += 1;
        pos += used;
    }

    if scratch.is_dirty() {
        if let Err(err) = write_back_merged(stream, &coalesced.segments, scratch.bytes()) {
            report.warn(site, format!("SST write-back refused: {err}"));
            return SstOutcome {
                hits: 0,
                strings,
                next_offset,
            };
        }
    }
    log::debug!("{site}: SST with {strings} of {unique} strings scanned, {hits} hits");
    SstOutcome {
        hits,
        strings,
        next_offset,
    }
}
