//! XLUnicodeString parsing, decoding and same-footprint rewriting.
//!
//! A parse never copies text: it records where each run of characters sits in the buffer so the
//! masked bytes can be written back over exactly the same positions. Strings continued across
//! `CONTINUE` records are parsed from the coalesced payload; at each fragment boundary inside the
//! character data the next fragment starts with a fresh option-flags byte that may switch the
//! remaining characters between compressed and UTF-16.

use olemask_core::{
    decode_codepage_indexed, decode_utf16le_indexed, encode_char, fit_to_width, DecodedText,
    MaskContext, RedactionConfig, StreamBuffer,
};

pub const STR_FLAG_HIGH_BYTE: u8 = 0x01;
pub const STR_FLAG_EXT: u8 = 0x04;
pub const STR_FLAG_RICH_TEXT: u8 = 0x08;

/// A run of characters stored with one width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRun {
    pub offset: usize,
    pub chars: usize,
    pub high_byte: bool,
}

impl TextRun {
    pub fn byte_len(&self) -> usize {
        if self.high_byte {
            self.chars * 2
        } else {
            self.chars
        }
    }
}

/// Location of one parsed XLUnicodeString (or ShortXLUnicodeString) in a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XlUnicodeString {
    pub offset: usize,
    pub cch: u16,
    pub flags: u8,
    pub rich_runs: u16,
    pub ext_len: u32,
    pub runs: Vec<TextRun>,
    /// One past the last byte, rich-run and ExtRst trailers included.
    pub end: usize,
}

/// How the characters of a string were decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodePath {
    Utf16,
    Codepage(u16),
    /// `fHighByte` was clear but the bytes looked like UTF-16LE.
    Utf16HeuristicFallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedXlString {
    pub decoded: DecodedText,
    pub path: DecodePath,
}

impl XlUnicodeString {
    /// Parse an uncontinued XLUnicodeString (`cch: u16`, flags, optional rich/ext headers).
    ///
    /// Returns the string and the number of bytes it occupies, or `None` when it does not fit in
    /// `buf`.
    pub fn parse(buf: &[u8], offset: usize) -> Option<(Self, usize)> {
        parse_with(buf, &[], offset, Width::Long)
    }

    /// Parse an XLUnicodeString from a coalesced record payload.
    ///
    /// `fragment_ends` holds the cumulative end of each physical fragment within `buf`, as
    /// returned by [`crate::Coalesced::fragment_ends`].
    pub fn parse_continued(
        buf: &[u8],
        fragment_ends: &[usize],
        offset: usize,
    ) -> Option<(Self, usize)> {
        parse_with(buf, fragment_ends, offset, Width::Long)
    }

    /// Parse a ShortXLUnicodeString (`cch: u8`, flags). Only `fHighByte` is honoured.
    pub fn parse_short(buf: &[u8], offset: usize) -> Option<(Self, usize)> {
        parse_with(buf, &[], offset, Width::Short)
    }

    pub fn footprint(&self) -> usize {
        self.end - self.offset
    }

    pub fn decode_text(
        &self,
        buf: &[u8],
        codepage: u16,
        config: &RedactionConfig,
    ) -> DecodedXlString {
        let mut decoded = DecodedText::new();
        let mut fallback = false;
        let mut any_compressed = false;
        for run in &self.runs {
            let Some(bytes) = buf.get(run.offset..run.offset + run.byte_len()) else {
                continue;
            };
            let part = if run.high_byte {
                decode_utf16le_indexed(bytes, run.offset)
            } else if config.compressed_utf16_fallback && looks_like_utf16(bytes) {
                fallback = true;
                decode_utf16le_indexed(bytes, run.offset)
            } else {
                any_compressed = true;
                decode_codepage_indexed(bytes, run.offset, codepage)
            };
            decoded.append(part);
        }

        let path = if fallback {
            log::debug!(
                "string at offset {}: compressed flag with UTF-16LE shaped bytes, decoding as UTF-16",
                self.offset
            );
            DecodePath::Utf16HeuristicFallback
        } else if any_compressed {
            DecodePath::Codepage(codepage)
        } else {
            DecodePath::Utf16
        };
        DecodedXlString { decoded, path }
    }

    /// Bytes to write over `buf[self.offset..self.end]` so that the string reads as `new_text`.
    ///
    /// Headers, continuation flag bytes and trailers are copied through unchanged; characters
    /// equal to the current text keep their original bytes, changed ones are encoded into their
    /// slot with [`fit_to_width`]. When `new_text` is shorter than the string, the remaining
    /// slots are filled with the mask character. The result is always `self.footprint()` bytes.
    pub fn build_replacement(
        &self,
        buf: &[u8],
        new_text: &str,
        codepage: u16,
        config: &RedactionConfig,
    ) -> Vec<u8> {
        let mut out = buf
            .get(self.offset..self.end)
            .map(<[u8]>::to_vec)
            .unwrap_or_else(|| vec![0; self.footprint()]);
        let current = self.decode_text(buf, codepage, config).decoded;
        let pad = config.pad_byte();
        let mut replacement = new_text.chars();
        for (orig, slot) in current.text.chars().zip(&current.slots) {
            let bytes = match replacement.next() {
                Some(ch) if ch == orig => continue,
                Some(ch) => fit_to_width(&encode_char(ch, slot.encoding), slot.len, pad),
                None => fit_to_width(&encode_char(config.mask_char, slot.encoding), slot.len, pad),
            };
            let start = slot.start - self.offset;
            if let Some(dst) = out.get_mut(start..start + slot.len) {
                dst.copy_from_slice(&bytes);
            }
        }
        out
    }
}

#[derive(Clone, Copy)]
enum Width {
    Long,
    Short,
}

fn parse_with(
    buf: &[u8],
    fragment_ends: &[usize],
    offset: usize,
    width: Width,
) -> Option<(XlUnicodeString, usize)> {
    let mut pos = offset;
    let (cch, flags) = match width {
        Width::Long => {
            let header = buf.get(pos..pos.checked_add(3)?)?;
            pos += 3;
            (u16::from_le_bytes([header[0], header[1]]), header[2])
        }
        Width::Short => {
            let header = buf.get(pos..pos.checked_add(2)?)?;
            pos += 2;
            (u16::from(header[0]), header[1] & STR_FLAG_HIGH_BYTE)
        }
    };

    let mut rich_runs = 0u16;
    if flags & STR_FLAG_RICH_TEXT != 0 {
        let b = buf.get(pos..pos + 2)?;
        rich_runs = u16::from_le_bytes([b[0], b[1]]);
        pos += 2;
    }
    let mut ext_len = 0u32;
    if flags & STR_FLAG_EXT != 0 {
        let b = buf.get(pos..pos + 4)?;
        ext_len = u32::from_le_bytes([b[0], b[1], b[2], b[3]]);
        pos += 4;
    }

    let mut high_byte = flags & STR_FLAG_HIGH_BYTE != 0;
    let mut runs = Vec::new();
    let mut remaining = cch as usize;
    while remaining > 0 {
        // Boundaries only matter strictly inside the buffer; the last end is the buffer end.
        let fragment_end = fragment_ends
            .iter()
            .copied()
            .find(|&end| end >= pos && end < buf.len())
            .unwrap_or(buf.len());
        if pos >= fragment_end {
            // Character data continues in the next fragment behind a fresh flags byte.
            let continued_flags = *buf.get(pos)?;
            high_byte = continued_flags & STR_FLAG_HIGH_BYTE != 0;
            pos += 1;
            continue;
        }
        let char_width = if high_byte { 2 } else { 1 };
        let fits = (fragment_end - pos) / char_width;
        if fits == 0 {
            // A UTF-16 unit split across fragments.
            return None;
        }
        let take = remaining.min(fits);
        runs.push(TextRun {
            offset: pos,
            chars: take,
            high_byte,
        });
        pos += take * char_width;
        remaining -= take;
    }

    let trailer = (rich_runs as usize) * 4 + ext_len as usize;
    let end = pos.checked_add(trailer)?;
    if end > buf.len() {
        return None;
    }
    Some((
        XlUnicodeString {
            offset,
            cch,
            flags,
            rich_runs,
            ext_len,
            runs,
            end,
        },
        end - offset,
    ))
}

fn looks_like_utf16(bytes: &[u8]) -> bool {
    bytes.len() >= 2
        && bytes.len() % 2 == 0
        && bytes.iter().skip(1).step_by(2).all(|&b| b == 0)
        && bytes.iter().step_by(2).any(|&b| b != 0)
}

/// Mask every sensitive range of `string` in `target`, rewriting the string's footprint in one
/// same-length write. Returns the number of spans masked.
pub fn redact_string(
    ctx: &MaskContext<'_>,
    target: &mut StreamBuffer,
    string: &XlUnicodeString,
    codepage: u16,
    site: &str,
) -> usize {
    let current = string.decode_text(target.bytes(), codepage, ctx.config).decoded;
    let spans = ctx.locate(&current.text);
    if spans.is_empty() {
        return 0;
    }

    let mut chars: Vec<char> = current.text.chars().collect();
    for span in &spans {
        for ch in chars.iter_mut().take(span.range.end).skip(span.range.start) {
            if (*ch as u32) >= 0x20 {
                *ch = ctx.config.mask_char;
            }
        }
    }
    let new_text: String = chars.into_iter().collect();
    let replacement = string.build_replacement(target.bytes(), &new_text, codepage, ctx.config);
    let span = target.span(string.offset, string.footprint());
    match target.write(span, &replacement) {
        Ok(()) => {
            for hit in &spans {
                ctx.note_hit(site, hit);
            }
            spans.len()
        }
        Err(err) => {
            ctx.note_refused(site, &err);
            0
        }
    }
}
