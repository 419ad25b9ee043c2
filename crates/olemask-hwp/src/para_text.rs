//! `HWPTAG_PARA_TEXT` payload decoding.
//!
//! Paragraph text is UTF-16LE with control characters below `0x20` embedded in the stream.
//! Inline and extended controls (section/column definitions, fields, tables, drawing objects)
//! occupy eight code units: the control code, a 12-byte parameter block and the repeated
//! control code. Char controls occupy a single unit.

use olemask_core::{decode_utf16le_indexed, CharSlot, DecodedText, TextEncoding};

const LINE_BREAK: u16 = 10;
const PARA_BREAK: u16 = 13;
const CONTROL_UNITS: usize = 8;

/// Whether control code `unit` is an inline or extended control (eight units long).
pub fn is_wide_control(unit: u16) -> bool {
    matches!(unit, 1..=9 | 11 | 12 | 14..=23)
}

/// Decode paragraph text found at `base` in its buffer.
///
/// Visible characters map to their own two or four bytes. Line and paragraph breaks decode as
/// `'\n'` over their unit and other char controls as themselves; masking never rewrites either.
/// Inline and extended controls are skipped entirely, as is a control cut off by the end of the
/// payload.
pub fn decode_para_text(bytes: &[u8], base: usize) -> DecodedText {
    let units = bytes.len() / 2;
    let unit_at = |i: usize| u16::from_le_bytes([bytes[i * 2], bytes[i * 2 + 1]]);

    let mut out = DecodedText::new();
    let mut run_start = 0usize;
    let mut i = 0usize;
    while i < units {
        let unit = unit_at(i);
        if unit >= 0x20 {
            i += 1;
            continue;
        }
        if run_start < i {
            out.append(decode_utf16le_indexed(&bytes[run_start * 2..i * 2], base + run_start * 2));
        }
        if is_wide_control(unit) {
            i = (i + CONTROL_UNITS).min(units);
        } else {
            let ch = match unit {
                LINE_BREAK | PARA_BREAK => '\n',
                other => char::from(other as u8),
            };
            out.push(
                ch,
                CharSlot {
                    start: base + i * 2,
                    len: 2,
                    encoding: TextEncoding::Utf16Le,
                },
            );
            i += 1;
        }
        run_start = i;
    }
    if run_start < units {
        out.append(decode_utf16le_indexed(&bytes[run_start * 2..units * 2], base + run_start * 2));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn units(parts: &[&[u16]]) -> Vec<u8> {
        parts
            .iter()
            .flat_map(|p| p.iter())
            .flat_map(|u| u.to_le_bytes())
            .collect()
    }

    #[test]
    fn inline_controls_are_skipped_and_breaks_become_newlines() {
        let hello: Vec<u16> = "Hi ".encode_utf16().collect();
        let name: Vec<u16> = "Kim".encode_utf16().collect();
        // Extended control 11 (table) with its parameter block.
        let control = [11u16, 0x6274, 0x6C, 0, 0, 0, 0, 11];
        let bytes = units(&[&hello, &control, &name, &[13]]);

        let decoded = decode_para_text(&bytes, 100);
        assert_eq!(decoded.text, "Hi Kim\n");
        assert_eq!(decoded.slots[3].start, 100 + (3 + 8) * 2);
        assert_eq!(decoded.slots[6].start, 100 + (3 + 8 + 3) * 2);
        assert_eq!(decoded.slots.len(), decoded.text.chars().count());
    }

    #[test]
    fn cut_off_control_ends_the_text() {
        let bytes = units(&[&[0x41, 3, 0x20, 0x20]]);
        let decoded = decode_para_text(&bytes, 0);
        assert_eq!(decoded.text, "A");
    }

    #[test]
    fn surrogate_pairs_keep_four_byte_slots() {
        let text: Vec<u16> = "a\u{1F600}b".encode_utf16().collect();
        let decoded = decode_para_text(&units(&[&text]), 0);
        assert_eq!(decoded.text, "a\u{1F600}b");
        assert_eq!(decoded.slots[1].len, 4);
        assert_eq!(decoded.slots[2].start, 6);
    }
}
