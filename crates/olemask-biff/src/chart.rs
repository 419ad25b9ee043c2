//! Chart substream text: series names, wrapped future records, and records whose string layout
//! is only known loosely.

use olemask_core::{
    decode_codepage_indexed, decode_utf16le_indexed, redact_decoded, MaskContext, StreamBuffer,
};

use crate::records::{BiffRecord, RECORD_FRTWRAPPER, RECORD_SERIESTEXT};
use crate::strings::{redact_string, XlUnicodeString};

/// Shortest run of printable characters the fallback scan considers.
pub const MIN_PRINTABLE_RUN: usize = 5;

/// `SeriesText`: `id: u16` followed by a ShortXLUnicodeString.
pub fn redact_series_text(
    ctx: &MaskContext<'_>,
    stream: &mut StreamBuffer,
    record: &BiffRecord,
    codepage: u16,
    site: &str,
) -> usize {
    redact_short_string(ctx, stream, record.data_start + 2, record.data_end, codepage, site)
}

/// `FrtWrapper` carrying a `SeriesText`.
///
/// Payload: `rt: u16` (0x0851), `grbitFrt: u16`, then the wrapped record header (`opcode: u16`,
/// `len: u16`), the series id and the ShortXLUnicodeString at payload offset 10. Anything else
/// is left alone.
pub fn redact_frt_wrapper(
    ctx: &MaskContext<'_>,
    stream: &mut StreamBuffer,
    record: &BiffRecord,
    codepage: u16,
    site: &str,
) -> usize {
    let payload = record.payload(stream.bytes());
    if payload.len() < 8 {
        return 0;
    }
    let rt = u16::from_le_bytes([payload[0], payload[1]]);
    let wrapped = u16::from_le_bytes([payload[4], payload[5]]);
    let wrapped_len = u16::from_le_bytes([payload[6], payload[7]]) as usize;
    if rt != RECORD_FRTWRAPPER || wrapped != RECORD_SERIESTEXT {
        return 0;
    }
    let wrapped_end = record.data_start + 8 + wrapped_len;
    if wrapped_end > record.data_end {
        log::debug!("{site}: FrtWrapper at offset {} overruns its record", record.offset);
        return 0;
    }
    redact_short_string(ctx, stream, record.data_start + 10, wrapped_end, codepage, site)
}

fn redact_short_string(
    ctx: &MaskContext<'_>,
    stream: &mut StreamBuffer,
    offset: usize,
    limit: usize,
    codepage: u16,
    site: &str,
) -> usize {
    let bounded = &stream.bytes()[..limit.min(stream.len())];
    let Some((string, _)) = XlUnicodeString::parse_short(bounded, offset) else {
        return 0;
    };
    redact_string(ctx, stream, &string, codepage, site)
}

/// Scan a chart record payload for XLUnicodeStrings.
///
/// At each position a string parse is attempted; a parse that yields text advances past the
/// string, anything else resynchronizes one byte forward. When no string with text is found at
/// all, printable runs are masked instead (see [`redact_printable_runs`]).
pub fn scan_string_like(
    ctx: &MaskContext<'_>,
    stream: &mut StreamBuffer,
    record: &BiffRecord,
    codepage: u16,
    site: &str,
) -> usize {
    let (start, end) = (record.data_start, record.data_end);
    let mut pos = start;
    let mut hits = 0usize;
    let mut found_text = false;
    while pos < end {
        let parsed = XlUnicodeString::parse(&stream.bytes()[..end], pos);
        match parsed {
            Some((string, used)) if string.cch > 0 => {
                found_text = true;
                hits += redact_string(ctx, stream, &string, codepage, site);
                pos += used;
            }
            _ => pos += 1,
        }
    }
    if !found_text {
        hits += redact_printable_runs(ctx, stream, start, end, codepage, site);
    }
    hits
}

/// Heuristic fallback for payloads with no parseable string: mask hits inside runs of at least
/// [`MIN_PRINTABLE_RUN`] printable ASCII bytes, and inside runs of printable ASCII UTF-16LE units.
pub fn redact_printable_runs(
    ctx: &MaskContext<'_>,
    stream: &mut StreamBuffer,
    start: usize,
    end: usize,
    codepage: u16,
    site: &str,
) -> usize {
    let end = end.min(stream.len());
    let (ascii, wide) = printable_runs(&stream.bytes()[..end], start);
    if ascii.is_empty() && wide.is_empty() {
        return 0;
    }
    log::debug!(
        "{site}: no string structure found, falling back to {} printable runs",
        ascii.len() + wide.len()
    );

    let mut hits = 0usize;
    for (run_start, run_end) in ascii {
        let decoded =
            decode_codepage_indexed(&stream.bytes()[run_start..run_end], run_start, codepage);
        hits += redact_decoded(ctx, stream, &decoded, site);
    }
    for (run_start, run_end) in wide {
        let decoded = decode_utf16le_indexed(&stream.bytes()[run_start..run_end], run_start);
        hits += redact_decoded(ctx, stream, &decoded, site);
    }
    hits
}

fn is_printable(b: u8) -> bool {
    (0x20..=0x7E).contains(&b)
}

type Runs = Vec<(usize, usize)>;

fn printable_runs(bytes: &[u8], start: usize) -> (Runs, Runs) {
    let mut ascii = Vec::new();
    let mut pos = start;
    while pos < bytes.len() {
        if !is_printable(bytes[pos]) {
            pos += 1;
            continue;
        }
        let run_start = pos;
        while pos < bytes.len() && is_printable(bytes[pos]) {
            pos += 1;
        }
        if pos - run_start >= MIN_PRINTABLE_RUN {
            ascii.push((run_start, pos));
        }
    }

    let mut wide = Vec::new();
    let mut pos = start;
    while pos + 1 < bytes.len() {
        let run_start = pos;
        while pos + 1 < bytes.len() && is_printable(bytes[pos]) && bytes[pos + 1] == 0 {
            pos += 2;
        }
        if pos == run_start {
            pos += 1;
        } else if (pos - run_start) / 2 >= MIN_PRINTABLE_RUN {
            wide.push((run_start, pos));
        }
    }
    (ascii, wide)
}
