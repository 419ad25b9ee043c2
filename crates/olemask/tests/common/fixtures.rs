//! Whole documents for end-to-end tests: compound files written by the `cfb` crate around
//! hand-built BIFF, Word, HWP and EMF streams.

use std::io::{Cursor, Read, Write};

use flate2::write::DeflateEncoder;
use flate2::Compression;

/// A version 3 compound file holding `streams` (slash-separated paths; storages are created as
/// needed).
pub fn ole_container(streams: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let cursor = Cursor::new(Vec::new());
    let mut ole =
        cfb::CompoundFile::create_with_version(cfb::Version::V3, cursor).expect("create cfb");
    for (path, data) in streams {
        if let Some((storage, _)) = path.rsplit_once('/') {
            ole.create_storage_all(storage).expect("storage");
        }
        let mut stream = ole.create_stream(path).expect("stream");
        stream.write_all(data).expect("write stream");
    }
    ole.flush().expect("flush cfb");
    ole.into_inner().into_inner()
}

/// Read a stream back through the `cfb` crate, independently of the code under test.
pub fn read_stream(container: &[u8], path: &str) -> Vec<u8> {
    let mut ole = cfb::CompoundFile::open(Cursor::new(container.to_vec())).expect("open cfb");
    let mut out = Vec::new();
    ole.open_stream(path)
        .expect("open stream")
        .read_to_end(&mut out)
        .expect("read stream");
    out
}

pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

pub fn utf16(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

// BIFF8

fn biff_record(opcode: u16, payload: &[u8]) -> Vec<u8> {
    let mut out = opcode.to_le_bytes().to_vec();
    out.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    out.extend_from_slice(payload);
    out
}

/// Globals with a cp1252 `CODEPAGE` and an `SST` of compressed strings. `filler` unhandled
/// records go before the `SST` to push the stream out of the mini stream.
pub fn workbook(strings: &[&str], filler: usize) -> Vec<u8> {
    let mut bof = [0u8; 16];
    bof[..4].copy_from_slice(&[0x00, 0x06, 0x05, 0x00]);
    let mut out = biff_record(0x0809, &bof);
    out.extend(biff_record(0x0042, &1252u16.to_le_bytes()));
    for _ in 0..filler {
        out.extend(biff_record(0x003D, &[0u8; 18]));
    }

    let mut sst = (strings.len() as u32).to_le_bytes().to_vec();
    sst.extend_from_slice(&(strings.len() as u32).to_le_bytes());
    for text in strings {
        sst.extend_from_slice(&(text.len() as u16).to_le_bytes());
        sst.push(0x00);
        sst.extend_from_slice(text.as_bytes());
    }
    out.extend(biff_record(0x00FC, &sst));
    out.extend(biff_record(0x000A, &[]));
    out
}

// Word

pub const WORD_TEXT_START: usize = 0x800;

/// `WordDocument` and `1Table` streams for one UTF-16 piece holding `text`.
pub fn word_streams(text: &str) -> (Vec<u8>, Vec<u8>) {
    let mut word_doc = vec![0u8; WORD_TEXT_START];
    word_doc[..2].copy_from_slice(&0xA5ECu16.to_le_bytes());
    word_doc[0x0A..0x0C].copy_from_slice(&0x0200u16.to_le_bytes());
    word_doc.extend(utf16(text));
    word_doc.extend_from_slice(&[0u8; 64]);

    let chars = text.encode_utf16().count() as u32;
    let mut plc = Vec::new();
    plc.extend_from_slice(&0u32.to_le_bytes());
    plc.extend_from_slice(&chars.to_le_bytes());
    plc.extend_from_slice(&[0, 0]);
    plc.extend_from_slice(&(WORD_TEXT_START as u32).to_le_bytes());
    plc.extend_from_slice(&[0, 0]);

    let mut table = vec![0u8; 32];
    let fc_clx = table.len() as u32;
    table.push(0x02);
    table.extend_from_slice(&(plc.len() as u32).to_le_bytes());
    table.extend(plc);
    let lcb_clx = table.len() as u32 - fc_clx;

    word_doc[0x1A2..0x1A6].copy_from_slice(&fc_clx.to_le_bytes());
    word_doc[0x1A6..0x1AA].copy_from_slice(&lcb_clx.to_le_bytes());
    (word_doc, table)
}

// HWP

pub const HWP_COMPRESSED: u32 = 0x01;
pub const HWP_ENCRYPTED: u32 = 0x02;

pub fn hwp_file_header(flags: u32) -> Vec<u8> {
    let mut out = vec![0u8; 256];
    out[..17].copy_from_slice(b"HWP Document File");
    out[32..36].copy_from_slice(&0x0501_0000u32.to_le_bytes());
    out[36..40].copy_from_slice(&flags.to_le_bytes());
    out
}

fn hwp_record(tag: u16, level: u16, payload: &[u8]) -> Vec<u8> {
    let header = u32::from(tag) | (u32::from(level) << 10) | ((payload.len() as u32) << 20);
    let mut out = header.to_le_bytes().to_vec();
    out.extend_from_slice(payload);
    out
}

/// A section with one paragraph per entry of `paragraphs`.
pub fn hwp_section(paragraphs: &[&str]) -> Vec<u8> {
    let mut out = Vec::new();
    for text in paragraphs {
        let mut payload = utf16(text);
        payload.extend_from_slice(&13u16.to_le_bytes());
        out.extend(hwp_record(66, 0, &[0u8; 22]));
        out.extend(hwp_record(67, 1, &payload));
        out.extend(hwp_record(68, 1, &[0u8; 8]));
    }
    out
}

/// Raw deflate at fast compression followed by `slack` zero bytes, so best-compression output
/// always fits back.
pub fn deflate(data: &[u8], slack: usize) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(data).expect("deflate");
    let mut out = encoder.finish().expect("finish");
    out.extend(std::iter::repeat(0).take(slack));
    out
}

pub fn inflate(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    flate2::read::DeflateDecoder::new(raw)
        .read_to_end(&mut out)
        .expect("inflate");
    out
}

// EMF

fn emf_record(record_type: u32, body: &[u8]) -> Vec<u8> {
    let mut out = record_type.to_le_bytes().to_vec();
    out.extend_from_slice(&((body.len() + 8) as u32).to_le_bytes());
    out.extend_from_slice(body);
    out
}

/// An `OlePres`-style stream: a 16-byte presentation prefix, then a metafile with one
/// `EMR_EXTTEXTOUTW` drawing `text`.
pub fn presentation_stream(text: &str) -> Vec<u8> {
    let mut header = vec![0u8; 80];
    header[32..36].copy_from_slice(b" EMF");

    let mut string = utf16(text);
    while string.len() % 4 != 0 {
        string.push(0);
    }
    let chars = text.encode_utf16().count() as u32;
    // 8 header + 28 bounds/mode/scales + 40 EmrText with rectangle.
    let off_string = 76u32;
    let mut body = vec![0u8; 28];
    body.extend_from_slice(&[0u8; 8]);
    body.extend_from_slice(&chars.to_le_bytes());
    body.extend_from_slice(&off_string.to_le_bytes());
    body.extend_from_slice(&0u32.to_le_bytes());
    body.extend_from_slice(&[0u8; 16]);
    body.extend_from_slice(&(off_string + string.len() as u32).to_le_bytes());
    body.extend(string);
    body.extend(std::iter::repeat(0).take(chars as usize * 4));

    let mut out = vec![0u8; 16];
    out.extend(emf_record(0x01, &header));
    out.extend(emf_record(0x54, &body));
    out.extend(emf_record(0x0E, &[0u8; 12]));
    out
}
