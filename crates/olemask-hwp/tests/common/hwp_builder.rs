//! Section streams built record by record.

use std::io::Write;

use flate2::write::DeflateEncoder;
use flate2::Compression;

pub const PARA_HEADER: u16 = 66;
pub const PARA_TEXT: u16 = 67;
pub const PARA_CHAR_SHAPE: u16 = 68;

pub fn record(tag: u16, level: u16, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    if payload.len() >= 0xFFF {
        let header = u32::from(tag) | (u32::from(level) << 10) | (0xFFF << 20);
        out.extend_from_slice(&header.to_le_bytes());
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    } else {
        let header = u32::from(tag) | (u32::from(level) << 10) | ((payload.len() as u32) << 20);
        out.extend_from_slice(&header.to_le_bytes());
    }
    out.extend_from_slice(payload);
    out
}

pub fn utf16(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

/// An extended control (eight code units) such as a table anchor.
pub fn extended_control(code: u16) -> Vec<u8> {
    [code, 0x6274, 0x6C20, 0, 0, 0, 0, code]
        .into_iter()
        .flat_map(u16::to_le_bytes)
        .collect()
}

/// One paragraph: header, text ending in a paragraph break, char shape.
pub fn paragraph(text_payload: &[u8]) -> Vec<u8> {
    let mut payload = text_payload.to_vec();
    payload.extend_from_slice(&13u16.to_le_bytes());
    let mut out = record(PARA_HEADER, 0, &[0u8; 22]);
    out.extend(record(PARA_TEXT, 1, &payload));
    out.extend(record(PARA_CHAR_SHAPE, 1, &[0u8; 8]));
    out
}

/// Raw deflate at fast compression, with `slack` zero bytes after the final block.
pub fn deflate(data: &[u8], slack: usize) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(data).expect("deflate");
    let mut out = encoder.finish().expect("finish");
    out.extend(std::iter::repeat(0).take(slack));
    out
}
