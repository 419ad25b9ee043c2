//! Text locations inside text-output records.
//!
//! `EMR_EXTTEXTOUTA/W`: type, size, bounds (16), graphics mode, x/y scale, then one `EmrText` at
//! record offset `0x24`. `EMR_POLYTEXTOUTA/W`: the same prefix followed by `cStrings` and that
//! many `EmrText` entries. `EmrText`: reference point (8), `nChars`, `offString` (relative to the
//! record), `fOptions`, an optional rectangle, `offDx`. `EMR_SMALLTEXTOUT` stores its text inline
//! after an optional clipping rectangle.

use crate::records::{read_u32, EmfRecord, EmfRecordKind};

pub const ETO_GLYPH_INDEX: u32 = 0x0010;
pub const ETO_NO_RECT: u32 = 0x0100;
pub const ETO_SMALL_CHARS: u32 = 0x0200;

const EMR_TEXT_OFFSET: usize = 0x24;
const RECT_LEN: usize = 16;

/// How the characters of a [`TextSpan`] are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmfCharset {
    /// One byte per character in the document's ANSI code page.
    Ansi,
    Utf16Le,
}

/// Text bytes of one string, relative to the buffer the record was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSpan {
    pub record_offset: usize,
    pub offset: usize,
    pub byte_len: usize,
    pub char_count: usize,
    pub charset: EmfCharset,
}

/// The first string of a text-output record, if it has one.
pub fn locate_text_span(buf: &[u8], record: &EmfRecord) -> Option<TextSpan> {
    locate_text_spans(buf, record).into_iter().next()
}

/// Every string of a text-output record. Strings that fall outside their record, are empty, or
/// hold glyph indices rather than characters are left out.
pub fn locate_text_spans(buf: &[u8], record: &EmfRecord) -> Vec<TextSpan> {
    let Some(bytes) = buf.get(record.offset..record.end()) else {
        return Vec::new();
    };
    let mut spans = match record.kind() {
        EmfRecordKind::ExtTextOutA => emr_text(bytes, EMR_TEXT_OFFSET, EmfCharset::Ansi)
            .map(|(span, _)| span)
            .into_iter()
            .collect(),
        EmfRecordKind::ExtTextOutW => emr_text(bytes, EMR_TEXT_OFFSET, EmfCharset::Utf16Le)
            .map(|(span, _)| span)
            .into_iter()
            .collect(),
        EmfRecordKind::PolyTextOutA => poly_text(bytes, EmfCharset::Ansi),
        EmfRecordKind::PolyTextOutW => poly_text(bytes, EmfCharset::Utf16Le),
        EmfRecordKind::SmallTextOut => small_text(bytes).into_iter().collect(),
        _ => Vec::new(),
    };
    for span in &mut spans {
        span.record_offset = record.offset;
        span.offset += record.offset;
    }
    spans
}

/// The `EmrText` at record offset `at` and its length. `None` when the entry does not fit in the
/// record; the inner span is `None` for empty, glyph-indexed or out-of-record text.
fn emr_text_entry(
    record: &[u8],
    at: usize,
    charset: EmfCharset,
) -> Option<(Option<TextSpan>, usize)> {
    let chars = read_u32(record, at + 8)? as usize;
    let off_string = read_u32(record, at + 12)? as usize;
    let options = read_u32(record, at + 16)?;
    let rect = if options & ETO_NO_RECT != 0 { 0 } else { RECT_LEN };
    let entry_len = 20 + rect + 4;
    if at + entry_len > record.len() {
        return None;
    }

    if chars == 0 || off_string == 0 || options & ETO_GLYPH_INDEX != 0 {
        return Some((None, entry_len));
    }
    let width = match charset {
        EmfCharset::Ansi => 1,
        EmfCharset::Utf16Le => 2,
    };
    let span = chars
        .checked_mul(width)
        .and_then(|byte_len| Some((byte_len, off_string.checked_add(byte_len)?)))
        .filter(|&(_, end)| end <= record.len())
        .map(|(byte_len, _)| TextSpan {
            record_offset: 0,
            offset: off_string,
            byte_len,
            char_count: chars,
            charset,
        });
    Some((span, entry_len))
}

fn emr_text(record: &[u8], at: usize, charset: EmfCharset) -> Option<(TextSpan, usize)> {
    let (span, len) = emr_text_entry(record, at, charset)?;
    Some((span?, len))
}

fn poly_text(record: &[u8], charset: EmfCharset) -> Vec<TextSpan> {
    let Some(count) = read_u32(record, EMR_TEXT_OFFSET) else {
        return Vec::new();
    };
    let mut spans = Vec::new();
    let mut at = EMR_TEXT_OFFSET + 4;
    for _ in 0..count {
        // Each entry is at least 24 bytes, so a bogus count runs off the record quickly.
        let Some((span, len)) = emr_text_entry(record, at, charset) else {
            break;
        };
        spans.extend(span);
        at += len;
    }
    spans
}

fn small_text(record: &[u8]) -> Option<TextSpan> {
    let chars = read_u32(record, 16)? as usize;
    let options = read_u32(record, 20)?;
    if chars == 0 || options & ETO_GLYPH_INDEX != 0 {
        return None;
    }
    // x, y, cChars, fuOptions, iGraphicsMode, exScale, eyScale after the 8-byte header.
    let mut text_start = 8 + 7 * 4;
    if options & ETO_NO_RECT == 0 {
        text_start += RECT_LEN;
    }
    let (charset, byte_len) = if options & ETO_SMALL_CHARS != 0 {
        (EmfCharset::Ansi, chars)
    } else {
        (EmfCharset::Utf16Le, chars.checked_mul(2)?)
    };
    if text_start.checked_add(byte_len)? > record.len() {
        return None;
    }
    Some(TextSpan {
        record_offset: 0,
        offset: text_start,
        byte_len,
        char_count: chars,
        charset,
    })
}
