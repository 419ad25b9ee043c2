//! Streams that carry text whatever document they sit in: BIFF workbooks (charts and embedded
//! spreadsheets), EMF presentation caches, and anything else scanned as raw text.

use olemask_biff::chart::redact_printable_runs;
use olemask_biff::redact_workbook;
use olemask_cfb::{CompoundFile, DirEntry};
use olemask_core::{MaskContext, RedactionReport};
use olemask_emf::redact_embedded_emf;

use crate::container::redact_stream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EmbeddedKind {
    Workbook,
    Presentation,
    /// No known layout: printable runs, single-byte and UTF-16LE.
    Raw,
}

/// Classify a stream by its name. Presentation streams carry a leading control character
/// (`\x03EPRINT`, `\x02OlePres000`).
pub(crate) fn classify(entry: &DirEntry) -> EmbeddedKind {
    let name = entry.name.trim_start_matches(|c: char| (c as u32) < 0x20);
    if name.eq_ignore_ascii_case("Workbook") || name.eq_ignore_ascii_case("Book") {
        EmbeddedKind::Workbook
    } else if name.eq_ignore_ascii_case("EPRINT")
        || name
            .get(..7)
            .is_some_and(|p| p.eq_ignore_ascii_case("OlePres"))
    {
        EmbeddedKind::Presentation
    } else {
        EmbeddedKind::Raw
    }
}

/// Redact every stream in `cfb`, at any depth. Workbook and presentation streams are parsed;
/// the rest (`Contents`, `\x01Ole10Native`, property sets, the document's own streams once
/// their structured pass has run) get the raw scan. Returns the spans masked.
pub(crate) fn redact_streams(
    ctx: &MaskContext<'_>,
    cfb: &CompoundFile,
    container: &mut [u8],
    report: &mut RedactionReport,
) -> usize {
    let targets: Vec<(DirEntry, EmbeddedKind)> = cfb
        .streams()
        .map(|entry| (entry.clone(), classify(entry)))
        .collect();
    let codepage = ctx.config.single_byte_codepage;

    let mut hits = 0usize;
    for (entry, kind) in &targets {
        let site = entry.path.as_str();
        log::debug!("{site}: redacting as {kind:?}");
        hits += redact_stream(cfb, container, entry, report, |stream, report| match kind {
            EmbeddedKind::Workbook => redact_workbook(ctx, stream, site, report),
            EmbeddedKind::Presentation => redact_embedded_emf(ctx, stream, site),
            EmbeddedKind::Raw => {
                let len = stream.len();
                redact_printable_runs(ctx, stream, 0, len, codepage, site)
            }
        });
    }
    hits
}

/// Redact a compound file nested inside another stream (an HWP `BinData` object). The bytes are
/// masked in place; warnings come back in a report of their own.
pub(crate) fn redact_nested(
    ctx: &MaskContext<'_>,
    object: &mut [u8],
) -> Result<RedactionReport, olemask_cfb::CfbError> {
    let cfb = CompoundFile::parse(object)?;
    let mut report = RedactionReport::default();
    let hits = redact_streams(ctx, &cfb, object, &mut report);
    report.hits = hits;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use olemask_cfb::ObjectType;

    fn entry(name: &str) -> DirEntry {
        DirEntry {
            id: 1,
            name: name.to_string(),
            path: name.to_string(),
            object_type: ObjectType::Stream,
            left: 0,
            right: 0,
            child: 0,
            start_sector: 0,
            size: 0,
        }
    }

    #[test]
    fn stream_names_are_classified() {
        assert_eq!(classify(&entry("Workbook")), EmbeddedKind::Workbook);
        assert_eq!(classify(&entry("BOOK")), EmbeddedKind::Workbook);
        assert_eq!(classify(&entry("\u{3}EPRINT")), EmbeddedKind::Presentation);
        assert_eq!(classify(&entry("\u{2}OlePres000")), EmbeddedKind::Presentation);
        assert_eq!(classify(&entry("\u{1}CompObj")), EmbeddedKind::Raw);
        assert_eq!(classify(&entry("Contents")), EmbeddedKind::Raw);
    }
}
