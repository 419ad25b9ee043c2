use std::collections::BTreeSet;
use std::ops::Range;
use std::sync::{Mutex, OnceLock};

use encoding_rs::{
    CoderResult, Encoding, BIG5, EUC_KR, GBK, SHIFT_JIS, UTF_8, WINDOWS_1250, WINDOWS_1251,
    WINDOWS_1252, WINDOWS_1253, WINDOWS_1254, WINDOWS_1255, WINDOWS_1256, WINDOWS_1257,
    WINDOWS_1258, WINDOWS_874,
};

/// How a run of text bytes is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    Utf16Le,
    /// A Windows code page (`949`, `1252`, ...). Unknown code pages decode byte-for-byte.
    Codepage(u16),
}

/// Where one decoded character lives in the buffer it was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharSlot {
    pub start: usize,
    pub len: usize,
    pub encoding: TextEncoding,
}

impl CharSlot {
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }
}

/// Decoded text plus the byte slot of every character.
///
/// `slots.len()` always equals `text.chars().count()`. Slots are buffer-relative and need not be
/// contiguous: text stitched together from several record fragments keeps each character's
/// original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub slots: Vec<CharSlot>,
}

impl DecodedText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `bytes` found at `base` in some buffer.
    pub fn decode(bytes: &[u8], base: usize, encoding: TextEncoding) -> Self {
        match encoding {
            TextEncoding::Utf16Le => decode_utf16le_indexed(bytes, base),
            TextEncoding::Codepage(cp) => decode_codepage_indexed(bytes, base, cp),
        }
    }

    pub fn push(&mut self, ch: char, slot: CharSlot) {
        self.text.push(ch);
        self.slots.push(slot);
    }

    pub fn append(&mut self, other: DecodedText) {
        self.text.push_str(&other.text);
        self.slots.extend(other.slots);
    }

    pub fn char_len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl FromIterator<(char, CharSlot)> for DecodedText {
    fn from_iter<I: IntoIterator<Item = (char, CharSlot)>>(iter: I) -> Self {
        let mut out = DecodedText::new();
        for (ch, slot) in iter {
            out.push(ch, slot);
        }
        out
    }
}

pub fn encoding_for_codepage(codepage: u16) -> Option<&'static Encoding> {
    Some(match codepage as u32 {
        874 => WINDOWS_874,
        932 => SHIFT_JIS,
        936 => GBK,
        949 => EUC_KR,
        950 => BIG5,
        1250 => WINDOWS_1250,
        1251 => WINDOWS_1251,
        1252 => WINDOWS_1252,
        1253 => WINDOWS_1253,
        1254 => WINDOWS_1254,
        1255 => WINDOWS_1255,
        1256 => WINDOWS_1256,
        1257 => WINDOWS_1257,
        1258 => WINDOWS_1258,
        65001 => UTF_8,
        _ => return None,
    })
}

pub fn decode_ansi(codepage: u16, bytes: &[u8]) -> String {
    if let Some(encoding) = encoding_for_codepage(codepage) {
        let (cow, _) = encoding.decode_without_bom_handling(bytes);
        return cow.into_owned();
    }

    warn_unsupported_codepage(codepage);

    // Lossless byte-to-Unicode mapping (ISO-8859-1-ish) keeps ASCII intact.
    bytes.iter().copied().map(char::from).collect()
}

fn warn_unsupported_codepage(codepage: u16) {
    static WARNED: OnceLock<Mutex<BTreeSet<u16>>> = OnceLock::new();

    let warned = WARNED.get_or_init(|| Mutex::new(BTreeSet::new()));
    let mut warned = match warned.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };

    if warned.insert(codepage) {
        log::warn!(
            "unsupported code page {codepage}; decoding 8-bit text using lossless byte-to-Unicode mapping"
        );
    }
}

/// Decode UTF-16LE, recording a slot per character. Unpaired surrogates become U+FFFD over their
/// own code unit; a trailing odd byte belongs to no slot.
pub fn decode_utf16le_indexed(bytes: &[u8], base: usize) -> DecodedText {
    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));

    let mut out = DecodedText::new();
    let mut unit_pos = 0usize;
    for decoded in char::decode_utf16(units) {
        let (ch, units_used) = match decoded {
            Ok(ch) => (ch, ch.len_utf16()),
            Err(_) => (char::REPLACEMENT_CHARACTER, 1),
        };
        out.push(
            ch,
            CharSlot {
                start: base + unit_pos * 2,
                len: units_used * 2,
                encoding: TextEncoding::Utf16Le,
            },
        );
        unit_pos += units_used;
    }
    out
}

/// Decode 8-bit/DBCS text in `codepage`, recording a slot per character.
///
/// Malformed sequences decode to U+FFFD; every input byte ends up inside exactly one slot.
pub fn decode_codepage_indexed(bytes: &[u8], base: usize, codepage: u16) -> DecodedText {
    let tag = TextEncoding::Codepage(codepage);
    let one_byte = |i: usize| CharSlot {
        start: base + i,
        len: 1,
        encoding: tag,
    };

    let Some(encoding) = encoding_for_codepage(codepage) else {
        warn_unsupported_codepage(codepage);
        return bytes
            .iter()
            .enumerate()
            .map(|(i, &b)| (char::from(b), one_byte(i)))
            .collect();
    };

    if encoding.is_single_byte() {
        let (cow, _) = encoding.decode_without_bom_handling(bytes);
        if cow.chars().count() == bytes.len() {
            return cow
                .chars()
                .enumerate()
                .map(|(i, ch)| (ch, one_byte(i)))
                .collect();
        }
    }

    // Feed the decoder one byte at a time and attribute each emitted character to the bytes
    // consumed since the previous emission.
    let mut decoder = encoding.new_decoder_without_bom_handling();
    let mut out = DecodedText::new();
    let mut scratch = String::with_capacity(32);
    let mut pending_start = 0usize;

    for (i, byte) in bytes.iter().enumerate() {
        let last = i + 1 == bytes.len();
        scratch.clear();
        let mut src = std::slice::from_ref(byte);
        loop {
            let (result, read, _) = decoder.decode_to_string(src, &mut scratch, last);
            src = &src[read..];
            match result {
                CoderResult::InputEmpty => break,
                CoderResult::OutputFull => scratch.reserve(16),
            }
        }

        let emitted: Vec<char> = scratch.chars().collect();
        let Some((&final_char, leading)) = emitted.split_last() else {
            continue;
        };
        if leading.is_empty() {
            out.push(
                final_char,
                CharSlot {
                    start: base + pending_start,
                    len: i + 1 - pending_start,
                    encoding: tag,
                },
            );
        } else {
            // A malformed prefix flushed together with the current byte's character.
            for (n, &ch) in leading.iter().enumerate() {
                let (start, len) = if n == 0 {
                    (pending_start, i - pending_start)
                } else {
                    (i, 0)
                };
                out.push(
                    ch,
                    CharSlot {
                        start: base + start,
                        len,
                        encoding: tag,
                    },
                );
            }
            out.push(final_char, one_byte(i));
        }
        pending_start = i + 1;
    }
    out
}

/// Encode a single character. Characters the code page cannot represent encode to nothing.
pub fn encode_char(ch: char, encoding: TextEncoding) -> Vec<u8> {
    match encoding {
        TextEncoding::Utf16Le => {
            let mut units = [0u16; 2];
            ch.encode_utf16(&mut units)
                .iter()
                .flat_map(|unit| unit.to_le_bytes())
                .collect()
        }
        TextEncoding::Codepage(cp) => match encoding_for_codepage(cp) {
            Some(encoding) => {
                let mut buf = [0u8; 4];
                let (bytes, _, had_errors) = encoding.encode(ch.encode_utf8(&mut buf));
                if had_errors {
                    Vec::new()
                } else {
                    bytes.into_owned()
                }
            }
            None => u8::try_from(u32::from(ch))
                .map(|b| vec![b])
                .unwrap_or_default(),
        },
    }
}

/// Fit an encoded character into exactly `width` bytes.
///
/// The encoding is repeated when it tiles `width` (one UTF-16 mask unit into a surrogate pair's
/// four bytes); anything else is filled with `pad`.
pub fn fit_to_width(encoded: &[u8], width: usize, pad: u8) -> Vec<u8> {
    if width == 0 {
        return Vec::new();
    }
    if !encoded.is_empty() && width % encoded.len() == 0 {
        return encoded.repeat(width / encoded.len());
    }
    vec![pad; width]
}

pub(crate) fn pad_byte_for(mask_char: char) -> u8 {
    if mask_char.is_ascii() {
        mask_char as u8
    } else {
        b'*'
    }
}
