//! HWP 5.0 documents.

use olemask_biff::chart::redact_printable_runs;
use olemask_cfb::{CompoundFile, DirEntry};
use olemask_core::{MaskContext, RedactionReport, StreamBuffer};
use olemask_hwp::{
    deflate_to_fit, find_embedded_cfb, inflate, is_body_section, is_ole_bindata,
    redact_section_stream, FileHeader,
};

use crate::container::replace_stream;
use crate::detect::Format;
use crate::embedded::redact_nested;
use crate::Error;

/// Every `BodyText/Section<N>` stream, then every `BinData/*.OLE` object.
///
/// Encrypted documents are left unchanged. Distribution documents only expose their `BodyText`
/// placeholder; the encrypted `ViewText` copy is not touched.
pub(crate) fn redact(
    ctx: &MaskContext<'_>,
    cfb: &CompoundFile,
    container: &mut [u8],
    report: &mut RedactionReport,
) -> Result<usize, Error> {
    let header_entry = cfb.find_stream("FileHeader").ok_or(Error::MissingStream {
        format: Format::Hwp,
        stream: "FileHeader",
    })?;
    let header = FileHeader::parse(&cfb.read_stream(container, header_entry)?)?;
    log::debug!(
        "HWP {} (compressed: {}, flags {:#x})",
        header.version_string(),
        header.is_compressed(),
        header.flags
    );
    if header.is_encrypted() {
        report.warn("FileHeader", "document is password protected; left unchanged");
        return Ok(0);
    }
    if header.is_distribution() {
        report.warn("FileHeader", "distribution document; ViewText sections are not scanned");
    }
    let compressed = header.is_compressed();

    let entries: Vec<DirEntry> = cfb.streams().cloned().collect();
    let mut hits = 0usize;
    for entry in entries.iter().filter(|e| is_body_section(&e.path)) {
        hits += redact_section(ctx, cfb, container, entry, compressed, report);
    }
    for entry in entries.iter().filter(|e| is_ole_bindata(&e.path)) {
        hits += redact_bindata(ctx, cfb, container, entry, compressed, report);
    }
    Ok(hits)
}

fn redact_section(
    ctx: &MaskContext<'_>,
    cfb: &CompoundFile,
    container: &mut [u8],
    entry: &DirEntry,
    compressed: bool,
    report: &mut RedactionReport,
) -> usize {
    let site = entry.path.as_str();
    let raw = match cfb.read_stream(container, entry) {
        Ok(raw) => raw,
        Err(err) => {
            report.warn(site, format!("stream skipped: {err}"));
            return 0;
        }
    };
    match redact_section_stream(ctx, &raw, compressed, site, report) {
        Ok(Some(section)) => {
            replace_stream(cfb, container, entry, &section.bytes, section.hits, report)
        }
        Ok(None) => 0,
        Err(err) => {
            report.warn(site, format!("section left unchanged: {err}"));
            0
        }
    }
}

fn redact_bindata(
    ctx: &MaskContext<'_>,
    cfb: &CompoundFile,
    container: &mut [u8],
    entry: &DirEntry,
    compressed: bool,
    report: &mut RedactionReport,
) -> usize {
    let site = entry.path.as_str();
    let raw = match cfb.read_stream(container, entry) {
        Ok(raw) => raw,
        Err(err) => {
            report.warn(site, format!("stream skipped: {err}"));
            return 0;
        }
    };
    match rebuild_bindata(ctx, &raw, compressed, site, report) {
        Ok(Some((bytes, hits))) => replace_stream(cfb, container, entry, &bytes, hits, report),
        Ok(None) => 0,
        Err(err) => {
            report.warn(site, format!("embedded object left unchanged: {err}"));
            0
        }
    }
}

/// Returns the replacement stream bytes and hit count, or `None` when nothing was masked.
///
/// The object is redacted through its embedded compound file when one is found and parses;
/// otherwise its printable runs are scanned in place.
fn rebuild_bindata(
    ctx: &MaskContext<'_>,
    raw: &[u8],
    compressed: bool,
    site: &str,
    report: &mut RedactionReport,
) -> Result<Option<(Vec<u8>, usize)>, Error> {
    let mut plain = if compressed { inflate(raw)? } else { raw.to_vec() };
    let hits = match find_embedded_cfb(&plain) {
        Some(start) => match redact_nested(ctx, &mut plain[start..]) {
            Ok(mut nested) => {
                // Hits are counted by the caller once the stream is written back.
                let hits = std::mem::take(&mut nested.hits);
                report.absorb(site, nested);
                hits
            }
            Err(err) => {
                report.warn(
                    site,
                    format!(
                        "embedded compound file at offset {start} unreadable ({err}); \
                         scanned as raw text"
                    ),
                );
                redact_raw(ctx, &mut plain, site)
            }
        },
        None => {
            log::debug!("{site}: no compound file inside the object; scanning raw text");
            redact_raw(ctx, &mut plain, site)
        }
    };
    if hits == 0 {
        return Ok(None);
    }

    let bytes = if compressed {
        deflate_to_fit(&plain, raw.len())?
    } else {
        plain
    };
    Ok(Some((bytes, hits)))
}

fn redact_raw(ctx: &MaskContext<'_>, plain: &mut Vec<u8>, site: &str) -> usize {
    let mut buffer = StreamBuffer::scratch(std::mem::take(plain));
    let len = buffer.len();
    let hits = redact_printable_runs(
        ctx,
        &mut buffer,
        0,
        len,
        ctx.config.single_byte_codepage,
        site,
    );
    *plain = buffer.into_bytes();
    hits
}
