//! EMF record lists with text-output records laid out per MS-EMF.

pub const ETO_GLYPH_INDEX: u32 = 0x0010;
pub const ETO_NO_RECT: u32 = 0x0100;
pub const ETO_SMALL_CHARS: u32 = 0x0200;

fn record(record_type: u32, body: &[u8]) -> Vec<u8> {
    let mut body = body.to_vec();
    while body.len() % 4 != 0 {
        body.push(0);
    }
    let mut out = record_type.to_le_bytes().to_vec();
    out.extend_from_slice(&((body.len() + 8) as u32).to_le_bytes());
    out.extend(body);
    out
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub fn header() -> Vec<u8> {
    let mut body = vec![0u8; 80];
    body[32..36].copy_from_slice(b" EMF");
    record(0x01, &body)
}

pub fn eof() -> Vec<u8> {
    record(0x0E, &[0; 12])
}

pub fn other(record_type: u32, len: usize) -> Vec<u8> {
    record(record_type, &vec![0x41; len])
}

/// Text bytes: UTF-16LE when `wide`, ASCII otherwise.
pub fn encode(text: &str, wide: bool) -> Vec<u8> {
    if wide {
        text.encode_utf16().flat_map(u16::to_le_bytes).collect()
    } else {
        text.as_bytes().to_vec()
    }
}

/// Bounds, graphics mode and scale: the 28 bytes between the header and the first `EmrText`.
fn text_out_prefix() -> Vec<u8> {
    vec![0u8; 28]
}

fn emr_text_entry_len(options: u32) -> usize {
    if options & ETO_NO_RECT != 0 {
        24
    } else {
        40
    }
}

fn push_emr_text(body: &mut Vec<u8>, chars: usize, off_string: usize, options: u32) {
    body.extend_from_slice(&[0; 8]);
    put_u32(body, chars as u32);
    put_u32(body, off_string as u32);
    put_u32(body, options);
    if options & ETO_NO_RECT == 0 {
        body.extend_from_slice(&[0; 16]);
    }
    put_u32(body, 0);
}

pub fn ext_text_out(text: &str, wide: bool, options: u32) -> Vec<u8> {
    let mut body = text_out_prefix();
    let off_string = 8 + body.len() + emr_text_entry_len(options);
    push_emr_text(&mut body, text.chars().count(), off_string, options);
    body.extend(encode(text, wide));
    record(if wide { 0x54 } else { 0x53 }, &body)
}

pub fn poly_text_out(strings: &[(&str, u32)], wide: bool) -> Vec<u8> {
    let mut body = text_out_prefix();
    put_u32(&mut body, strings.len() as u32);
    let entries_len: usize = strings.iter().map(|(_, o)| emr_text_entry_len(*o)).sum();
    let mut off_string = 8 + body.len() + entries_len;
    let mut text = Vec::new();
    for (s, options) in strings {
        push_emr_text(&mut body, s.chars().count(), off_string, *options);
        let encoded = encode(s, wide);
        off_string += encoded.len();
        text.extend(encoded);
    }
    body.extend(text);
    record(if wide { 0x61 } else { 0x60 }, &body)
}

pub fn small_text_out(text: &str, options: u32) -> Vec<u8> {
    let mut body = Vec::new();
    put_u32(&mut body, 0);
    put_u32(&mut body, 0);
    put_u32(&mut body, text.chars().count() as u32);
    put_u32(&mut body, options);
    body.extend_from_slice(&[0; 12]);
    if options & ETO_NO_RECT == 0 {
        body.extend_from_slice(&[0; 16]);
    }
    body.extend(encode(text, options & ETO_SMALL_CHARS == 0));
    record(0x6C, &body)
}
