use std::cell::Cell;

use crate::config::RedactionConfig;
use crate::error::MaskError;
use crate::oracle::{locate_raw_spans, RawSpan, SensitivityOracle};
use crate::span::{SpanRef, StreamBuffer};
use crate::text::{encode_char, fit_to_width, pad_byte_for, DecodedText, TextEncoding};

/// Produce a mask for `original` of exactly `original.len()` bytes.
///
/// Each decoded character becomes one `mask_char` encoded in the character's own width; widths
/// that cannot hold the encoded mask (a double-byte character under a single-byte mask) are
/// filled with `'*'` bytes instead. Bytes that belong to no character (a trailing odd byte of
/// UTF-16) are filled the same way.
pub fn mask(original: &[u8], mask_char: char, encoding: TextEncoding) -> Vec<u8> {
    let pad = pad_byte_for(mask_char);
    let decoded = DecodedText::decode(original, 0, encoding);
    let mut out = vec![pad; original.len()];
    for slot in &decoded.slots {
        let bytes = fit_to_width(&encode_char(mask_char, slot.encoding), slot.len, pad);
        out[slot.range()].copy_from_slice(&bytes);
    }
    out
}

fn check_write(
    target: &StreamBuffer,
    span: SpanRef,
    replacement: &[u8],
) -> Result<(), MaskError> {
    if span.buffer != target.id() {
        return Err(MaskError::ForeignSpan {
            span,
            target: target.id(),
        });
    }
    if replacement.len() != span.len {
        return Err(MaskError::LengthMismatch {
            span,
            expected: span.len,
            actual: replacement.len(),
        });
    }
    if span.end() > target.len() {
        return Err(MaskError::OutOfBounds {
            span,
            buffer_len: target.len(),
        });
    }
    Ok(())
}

/// The single write path for masked bytes. Refuses any replacement whose length differs from the
/// span it replaces.
pub fn write_same_length(
    target: &mut StreamBuffer,
    span: SpanRef,
    replacement: &[u8],
) -> Result<(), MaskError> {
    check_write(target, span, replacement)?;
    if span.len == 0 {
        return Ok(());
    }
    target.bytes_mut()[span.range()].copy_from_slice(replacement);
    target.mark_dirty(span);
    Ok(())
}

/// Validate every write before applying any of them, so a refused span leaves no partial mask.
fn write_all_same_length(
    target: &mut StreamBuffer,
    writes: &[(SpanRef, Vec<u8>)],
) -> Result<(), MaskError> {
    for (span, bytes) in writes {
        check_write(target, *span, bytes)?;
    }
    for (span, bytes) in writes {
        write_same_length(target, *span, bytes)?;
    }
    Ok(())
}

/// Everything a codec needs to decide and apply masks for one document.
pub struct MaskContext<'a> {
    pub oracle: &'a dyn SensitivityOracle,
    pub config: &'a RedactionConfig,
    samples_logged: Cell<usize>,
    refused: Cell<usize>,
}

impl<'a> MaskContext<'a> {
    pub fn new(oracle: &'a dyn SensitivityOracle, config: &'a RedactionConfig) -> Self {
        Self {
            oracle,
            config,
            samples_logged: Cell::new(0),
            refused: Cell::new(0),
        }
    }

    /// Sensitive ranges of `raw`, in raw character positions.
    pub fn locate(&self, raw: &str) -> Vec<RawSpan> {
        locate_raw_spans(self.oracle, raw)
    }

    pub fn note_hit(&self, site: &str, span: &RawSpan) {
        let logged = self.samples_logged.get();
        if logged < self.config.max_log_samples {
            log::info!(
                "masked {} chars matching rule `{}` in {site}",
                span.range.len(),
                span.rule
            );
            self.samples_logged.set(logged + 1);
        }
    }

    pub fn note_refused(&self, site: &str, err: &MaskError) {
        log::error!("refusing masked write in {site}: {err}");
        self.refused.set(self.refused.get() + 1);
    }

    pub fn refused_spans(&self) -> usize {
        self.refused.get()
    }
}

/// Run the oracle over `decoded` and mask every hit in `target`.
///
/// Control characters (`< 0x20`) inside a hit keep their bytes: they carry document structure
/// (paragraph marks, field delimiters, cell marks). Returns the number of spans masked.
pub fn redact_decoded(
    ctx: &MaskContext<'_>,
    target: &mut StreamBuffer,
    decoded: &DecodedText,
    site: &str,
) -> usize {
    let spans = ctx.locate(&decoded.text);
    if spans.is_empty() {
        return 0;
    }

    let chars: Vec<char> = decoded.text.chars().collect();
    let pad = ctx.config.pad_byte();
    let mut hits = 0;
    for span in &spans {
        let mut writes = Vec::new();
        for idx in span.range.clone() {
            let (Some(&ch), Some(slot)) = (chars.get(idx), decoded.slots.get(idx)) else {
                break;
            };
            if (ch as u32) < 0x20 || slot.len == 0 {
                continue;
            }
            let encoded = encode_char(ctx.config.mask_char, slot.encoding);
            let bytes = fit_to_width(&encoded, slot.len, pad);
            writes.push((target.span(slot.start, slot.len), bytes));
        }
        if writes.is_empty() {
            continue;
        }
        match write_all_same_length(target, &writes) {
            Ok(()) => {
                ctx.note_hit(site, span);
                hits += 1;
            }
            Err(err) => ctx.note_refused(site, &err),
        }
    }
    hits
}

/// Decode the contiguous text at `span`, run the oracle over it and mask every hit in place.
pub fn redact_text_span(
    ctx: &MaskContext<'_>,
    target: &mut StreamBuffer,
    span: SpanRef,
    encoding: TextEncoding,
    site: &str,
) -> Result<usize, MaskError> {
    if span.buffer != target.id() {
        return Err(MaskError::ForeignSpan {
            span,
            target: target.id(),
        });
    }
    let original = target
        .bytes()
        .get(span.range())
        .ok_or(MaskError::OutOfBounds {
            span,
            buffer_len: target.len(),
        })?;
    let decoded = DecodedText::decode(original, span.start, encoding);
    Ok(redact_decoded(ctx, target, &decoded, site))
}
