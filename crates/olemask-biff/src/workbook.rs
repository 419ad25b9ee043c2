//! Whole-stream redaction for a `Workbook` or `Book` stream (or a chart workbook inside an OLE
//! object).

use olemask_core::{
    decode_codepage_indexed, decode_utf16le_indexed, redact_decoded, DecodedText, MaskContext,
    RedactionReport, StreamBuffer,
};

use crate::biff5;
use crate::chart;
use crate::records::{
    coalesce_with_continue, detect_biff_version, detect_codepage, has_filepass, read_record,
    BiffRecord, BiffRecordKind, BiffVersion, CODEPAGE_UTF16,
};
use crate::sst::redact_sst;
use crate::strings::{redact_string, XlUnicodeString, STR_FLAG_HIGH_BYTE};

/// Mask every sensitive string in a workbook stream in place.
///
/// Encrypted workbooks (`FILEPASS` in the globals) are left untouched with a warning. Strings are
/// decoded with the workbook's `CODEPAGE`, or the configured single-byte code page when the
/// workbook declares none or declares UTF-16. The leading BOF selects BIFF5 or BIFF8 string
/// layouts. Returns the number of spans masked.
pub fn redact_workbook(
    ctx: &MaskContext<'_>,
    stream: &mut StreamBuffer,
    site: &str,
    report: &mut RedactionReport,
) -> usize {
    if has_filepass(stream.bytes()) {
        report.warn(site, "workbook is encrypted (FILEPASS); left unchanged");
        return 0;
    }
    let codepage = match detect_codepage(stream.bytes()) {
        Some(cp) if cp != CODEPAGE_UTF16 => cp,
        _ => ctx.config.single_byte_codepage,
    };
    let version = detect_biff_version(stream.bytes());
    if version == BiffVersion::Biff5 {
        log::debug!("{site}: BIFF5 workbook, decoding strings with code page {codepage}");
    }

    let mut hits = 0usize;
    let mut offset = 0usize;
    while let Some(record) = read_record(stream.bytes(), offset) {
        if record.is_truncated() {
            report.warn(
                site,
                format!(
                    "record 0x{:04X} at offset {} declares {} bytes but only {} remain",
                    record.opcode,
                    record.offset,
                    record.declared_len,
                    record.payload_len()
                ),
            );
        }

        if version == BiffVersion::Biff5 {
            let (record_hits, next) = biff5::redact_record(ctx, stream, &record, codepage, site);
            hits += record_hits;
            offset = next;
            continue;
        }

        let mut next = record.end();
        hits += match record.kind() {
            BiffRecordKind::Sst => {
                let outcome = redact_sst(ctx, stream, &record, codepage, site, report);
                next = outcome.next_offset;
                outcome.hits
            }
            BiffRecordKind::Label | BiffRecordKind::RString => {
                redact_label(ctx, stream, &record, codepage, site)
            }
            BiffRecordKind::Header | BiffRecordKind::Footer => {
                redact_header_footer(ctx, stream, &record, codepage, site)
            }
            BiffRecordKind::Txo => {
                let (txo_hits, after) = redact_txo(ctx, stream, &record, codepage, site);
                next = after;
                txo_hits
            }
            BiffRecordKind::SeriesText => {
                chart::redact_series_text(ctx, stream, &record, codepage, site)
            }
            BiffRecordKind::FrtWrapper => {
                chart::redact_frt_wrapper(ctx, stream, &record, codepage, site)
            }
            BiffRecordKind::ChartStringLike(_) => {
                chart::scan_string_like(ctx, stream, &record, codepage, site)
            }
            _ => 0,
        };
        offset = next;
    }
    hits
}

/// `LABEL` and `RSTRING`: `rw`, `col`, `ixfe` (6 bytes) then an XLUnicodeString. `RSTRING`
/// carries its formatting runs after the string.
fn redact_label(
    ctx: &MaskContext<'_>,
    stream: &mut StreamBuffer,
    record: &BiffRecord,
    codepage: u16,
    site: &str,
) -> usize {
    redact_string_in_record(ctx, stream, record, record.data_start + 6, codepage, site)
}

/// `HEADER`/`FOOTER`: an empty payload means "no header"; otherwise one XLUnicodeString.
fn redact_header_footer(
    ctx: &MaskContext<'_>,
    stream: &mut StreamBuffer,
    record: &BiffRecord,
    codepage: u16,
    site: &str,
) -> usize {
    if record.payload_len() == 0 {
        return 0;
    }
    redact_string_in_record(ctx, stream, record, record.data_start, codepage, site)
}

fn redact_string_in_record(
    ctx: &MaskContext<'_>,
    stream: &mut StreamBuffer,
    record: &BiffRecord,
    offset: usize,
    codepage: u16,
    site: &str,
) -> usize {
    let Some((string, _)) = XlUnicodeString::parse(&stream.bytes()[..record.data_end], offset)
    else {
        log::debug!(
            "{site}: record 0x{:04X} at offset {} holds no parseable string",
            record.opcode,
            record.offset
        );
        return 0;
    };
    redact_string(ctx, stream, &string, codepage, site)
}

/// `TXO`: `cchText` at payload offset 10; the text follows in `CONTINUE` records, each starting
/// with its own option-flags byte. Returns the hits and the offset after the last `CONTINUE`.
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
    let payload = record.payload(stream.bytes());
    let Some(cch) = payload.get(10..12) else {
        return (0, coalesced.next_offset);
    };
    let mut remaining = u16::from_le_bytes([cch[0], cch[1]]) as usize;

    let mut decoded = DecodedText::new();
    for segment in coalesced.segments.iter().skip(1) {
        if remaining == 0 {
            break;
        }
        let bytes = &stream.bytes()[segment.start..segment.end];
        let Some((&flags, chars)) = bytes.split_first() else {
            continue;
        };
        let base = segment.start + 1;
        let part = if flags & STR_FLAG_HIGH_BYTE != 0 {
            let take = remaining.min(chars.len() / 2);
            remaining -= take;
            decode_utf16le_indexed(&chars[..take * 2], base)
        } else {
            let take = remaining.min(chars.len());
            remaining -= take;
            decode_codepage_indexed(&chars[..take], base, codepage)
        };
        decoded.append(part);
    }
    if remaining > 0 {
        log::debug!(
            "{site}: TXO at offset {} is missing {remaining} characters of text",
            record.offset
        );
    }
    (
        redact_decoded(ctx, stream, &decoded, site),
        coalesced.next_offset,
    )
}
