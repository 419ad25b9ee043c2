//! BIFF5 (Excel 5/95) string records.
//!
//! BIFF5 stores text as code-page bytes behind a length prefix, with no option-flags byte and no
//! shared string table. Records whose layout is not modelled here are scanned for printable runs.

use olemask_core::{
    decode_codepage_indexed, redact_decoded, DecodedText, MaskContext, StreamBuffer,
};

use crate::chart::redact_printable_runs;
use crate::records::{coalesce_with_continue, BiffRecord, BiffRecordKind};

/// Mask one BIFF5 record. Returns the hits and the offset of the next record to visit.
pub(crate) fn redact_record(
    ctx: &MaskContext<'_>,
    stream: &mut StreamBuffer,
    record: &BiffRecord,
    codepage: u16,
    site: &str,
) -> (usize, usize) {
    let hits = match record.kind() {
        // rw, col, ixfe, then a 16-bit count.
        BiffRecordKind::Label | BiffRecordKind::RString => {
            redact_counted(ctx, stream, record, record.data_start + 6, 2, codepage, site)
        }
        BiffRecordKind::Header | BiffRecordKind::Footer => {
            redact_counted(ctx, stream, record, record.data_start, 1, codepage, site)
        }
        // Series id, then an 8-bit count.
        BiffRecordKind::SeriesText => {
            redact_counted(ctx, stream, record, record.data_start + 2, 1, codepage, site)
        }
        BiffRecordKind::Txo => return redact_txo(ctx, stream, record, codepage, site),
        BiffRecordKind::Bof
        | BiffRecordKind::Eof
        | BiffRecordKind::CodePage
        | BiffRecordKind::FilePass => 0,
        _ => redact_printable_runs(
            ctx,
            stream,
            record.data_start,
            record.data_end,
            codepage,
            site,
        ),
    };
    (hits, record.end())
}

/// A byte string preceded by a little-endian count of `width` bytes at `offset`.
fn redact_counted(
    ctx: &MaskContext<'_>,
    stream: &mut StreamBuffer,
    record: &BiffRecord,
    offset: usize,
    width: usize,
    codepage: u16,
    site: &str,
) -> usize {
    let payload = &stream.bytes()[..record.data_end];
    let cch = match payload.get(offset..offset + width) {
        Some([n]) => *n as usize,
        Some([lo, hi]) => u16::from_le_bytes([*lo, *hi]) as usize,
        _ => return 0,
    };
    let start = offset + width;
    let end = (start + cch).min(record.data_end);
    if end < start + cch {
        log::debug!(
            "{site}: BIFF5 record 0x{:04X} at offset {} declares {cch} characters past its end",
            record.opcode,
            record.offset
        );
    }
    if start >= end {
        return 0;
    }
    let decoded = decode_codepage_indexed(&stream.bytes()[start..end], start, codepage);
    redact_decoded(ctx, stream, &decoded, site)
}

/// BIFF5 `TXO`: `cchText` at payload offset 10, the text as plain code-page bytes in the
/// following `CONTINUE` records.
fn redact_txo(
    ctx: &MaskContext<'_>,
    stream: &mut StreamBuffer,
    record: &BiffRecord,
    codepage: u16,
    site: &str,
) -> (usize, usize) {
    let Some(coalesced) = coalesce_with_continue(stream.bytes(), record.offset) else {
        return (0, record.end());
    };
    let Some(cch) = record.payload(stream.bytes()).get(10..12) else {
        return (0, coalesced.next_offset);
    };
    let mut remaining = u16::from_le_bytes([cch[0], cch[1]]) as usize;

    let mut decoded = DecodedText::new();
    for segment in coalesced.segments.iter().skip(1) {
        if remaining == 0 {
            break;
        }
        let take = remaining.min(segment.len());
        remaining -= take;
        decoded.append(decode_codepage_indexed(
            &stream.bytes()[segment.start..segment.start + take],
            segment.start,
            codepage,
        ));
    }
    (
        redact_decoded(ctx, stream, &decoded, site),
        coalesced.next_offset,
    )
}
