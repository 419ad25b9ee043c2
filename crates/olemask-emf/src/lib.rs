//! Enhanced Metafile text redaction.
//!
//! Chart previews embedded in office documents (`\x03EPRINT`, `\x02OlePres000`) are EMF
//! recordings that repeat the chart's labels inside text-output records. The scanner walks the
//! record list, locates the string bytes of each text record and masks hits in place.

mod records;
mod text;

#[cfg(test)]
mod fuzz_tests;

use olemask_core::{redact_text_span, MaskContext, StreamBuffer, TextEncoding};

pub use records::{
    find_emf_start, iterate_records, EmfRecord, EmfRecordIter, EmfRecordKind, EMF_SIGNATURE,
    EMR_EOF, EMR_EXTTEXTOUTA, EMR_EXTTEXTOUTW, EMR_HEADER, EMR_POLYTEXTOUTA, EMR_POLYTEXTOUTW,
    EMR_SMALLTEXTOUT,
};
pub use text::{
    locate_text_span, locate_text_spans, EmfCharset, TextSpan, ETO_GLYPH_INDEX, ETO_NO_RECT,
    ETO_SMALL_CHARS,
};

/// Mask every sensitive string in the metafile starting at `start` in `stream`. ANSI strings
/// decode with the configured single-byte code page. Returns the number of spans masked.
pub fn redact_emf(
    ctx: &MaskContext<'_>,
    stream: &mut StreamBuffer,
    start: usize,
    site: &str,
) -> usize {
    let spans: Vec<TextSpan> = EmfRecordIter::from_offset(stream.bytes(), start)
        .filter(|record| record.kind().carries_text())
        .flat_map(|record| locate_text_spans(stream.bytes(), &record))
        .collect();
    log::debug!("{site}: {} EMF text strings", spans.len());

    let mut hits = 0usize;
    for text in spans {
        let encoding = match text.charset {
            EmfCharset::Ansi => TextEncoding::Codepage(ctx.config.single_byte_codepage),
            EmfCharset::Utf16Le => TextEncoding::Utf16Le,
        };
        let span = stream.span(text.offset, text.byte_len);
        match redact_text_span(ctx, stream, span, encoding, site) {
            Ok(n) => hits += n,
            Err(err) => ctx.note_refused(site, &err),
        }
    }
    hits
}

/// [`redact_emf`] over a stream that may carry a presentation header before the metafile.
/// Streams without an EMF header are left alone.
pub fn redact_embedded_emf(ctx: &MaskContext<'_>, stream: &mut StreamBuffer, site: &str) -> usize {
    match find_emf_start(stream.bytes()) {
        Some(start) => redact_emf(ctx, stream, start, site),
        None => {
            log::debug!("{site}: no EMF header found");
            0
        }
    }
}
