//! Body section streams: raw-deflate transport and paragraph text redaction.

use std::io::{Read, Write};

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use olemask_core::{redact_decoded, MaskContext, RedactionReport, StreamBuffer};

use crate::error::HwpError;
use crate::para_text::decode_para_text;
use crate::records::{parse_records, HwpTag};

/// Upper bound on an inflated section or `BinData` stream.
pub const MAX_INFLATED_LEN: usize = 256 * 1024 * 1024;

/// Inflate a raw-deflate stream (no zlib header). Bytes after the final deflate block, such as
/// the zero padding this crate writes, are ignored.
pub fn inflate(raw: &[u8]) -> Result<Vec<u8>, HwpError> {
    inflate_with_limit(raw, MAX_INFLATED_LEN)
}

pub fn inflate_with_limit(raw: &[u8], limit: usize) -> Result<Vec<u8>, HwpError> {
    let mut out = Vec::new();
    DeflateDecoder::new(raw)
        .take(limit as u64 + 1)
        .read_to_end(&mut out)
        .map_err(HwpError::Inflate)?;
    if out.len() > limit {
        return Err(HwpError::InflatedTooLarge { limit });
    }
    Ok(out)
}

/// Raw-deflate `data` at best compression and zero-pad the result to exactly `available` bytes.
pub fn deflate_to_fit(data: &[u8], available: usize) -> Result<Vec<u8>, HwpError> {
    let mut encoder = DeflateEncoder::new(Vec::with_capacity(available), Compression::best());
    encoder.write_all(data).map_err(HwpError::Deflate)?;
    let mut out = encoder.finish().map_err(HwpError::Deflate)?;
    if out.len() > available {
        return Err(HwpError::RecompressedTooLarge {
            recompressed: out.len(),
            available,
        });
    }
    out.resize(available, 0);
    Ok(out)
}

/// Mask paragraph text in a decompressed section. Only `HWPTAG_PARA_TEXT` records are touched;
/// a record clipped by the end of the stream is still scanned over its available bytes and
/// reported. Returns the number of spans masked.
pub fn redact_section_records(
    ctx: &MaskContext<'_>,
    section: &mut StreamBuffer,
    site: &str,
    report: &mut RedactionReport,
) -> usize {
    let records: Vec<_> = parse_records(section.bytes()).collect();
    let mut hits = 0usize;
    for record in records {
        if record.is_truncated() {
            report.warn(
                site,
                format!(
                    "record tag {} at offset {} declares {} bytes, only {} present",
                    record.tag_id,
                    record.offset,
                    record.declared_size,
                    record.data_end - record.data_start
                ),
            );
        }
        if record.tag() != HwpTag::ParaText {
            continue;
        }
        let decoded = decode_para_text(record.payload(section.bytes()), record.data_start);
        hits += redact_decoded(ctx, section, &decoded, site);
    }
    hits
}

/// A section whose paragraph text changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactedSection {
    pub hits: usize,
    /// Replacement stream bytes, exactly as long as the stored stream.
    pub bytes: Vec<u8>,
}

/// Redact one section stream as stored in the container. `Ok(None)` when nothing was masked.
pub fn redact_section_stream(
    ctx: &MaskContext<'_>,
    raw: &[u8],
    compressed: bool,
    site: &str,
    report: &mut RedactionReport,
) -> Result<Option<RedactedSection>, HwpError> {
    let plain = if compressed { inflate(raw)? } else { raw.to_vec() };
    let mut section = StreamBuffer::scratch(plain);
    let hits = redact_section_records(ctx, &mut section, site, report);
    if hits == 0 || !section.is_dirty() {
        return Ok(None);
    }
    log::debug!("{site}: {hits} spans masked");

    let bytes = if compressed {
        deflate_to_fit(section.bytes(), raw.len())?
    } else {
        section.into_bytes()
    };
    Ok(Some(RedactedSection { hits, bytes }))
}
