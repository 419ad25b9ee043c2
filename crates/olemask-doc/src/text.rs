use olemask_core::{
    decode_codepage_indexed, redact_decoded, CharSlot, DecodedText, MaskContext, RedactionReport,
    StreamBuffer, TextEncoding,
};

use crate::clx::{locate_pieces, PlcPiece};
use crate::error::DocError;
use crate::fib::Fib;

/// Code page of compressed (8-bit) pieces.
pub const COMPRESSED_CODEPAGE: u16 = 1252;

/// Decode one piece, one character per character position: cp1252 for compressed pieces, one
/// UTF-16 code unit per character otherwise (unpaired or paired surrogates alike become U+FFFD)
/// so character indices stay aligned with CPs.
pub fn decode_piece_text(word_doc: &[u8], piece: &PlcPiece) -> Result<DecodedText, DocError> {
    let start = piece.byte_offset();
    let end = start + piece.byte_len();
    let bytes = word_doc
        .get(start..end)
        .ok_or(DocError::PieceOutOfBounds {
            index: piece.index,
            start,
            end,
            len: word_doc.len(),
        })?;
    if piece.compressed {
        return Ok(decode_codepage_indexed(bytes, start, COMPRESSED_CODEPAGE));
    }

    let mut out = DecodedText::new();
    for (i, pair) in bytes.chunks_exact(2).enumerate() {
        let unit = u16::from_le_bytes([pair[0], pair[1]]);
        let ch = char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER);
        out.push(
            ch,
            CharSlot {
                start: start + i * 2,
                len: 2,
                encoding: TextEncoding::Utf16Le,
            },
        );
    }
    Ok(out)
}

/// The document text: every piece in CP order. A piece outside the stream aborts extraction.
pub fn document_text(word_doc: &[u8], pieces: &[PlcPiece]) -> Result<DecodedText, DocError> {
    let mut out = DecodedText::new();
    for piece in pieces {
        out.append(decode_piece_text(word_doc, piece)?);
    }
    Ok(out)
}

/// Mask every sensitive span of the document text in the `WordDocument` stream.
///
/// `table` is the stream named by [`Fib::table_stream_name`]. Encrypted documents and documents
/// whose piece table cannot be read are left unchanged and reported. Returns the number of spans
/// masked.
pub fn redact_word_document(
    ctx: &MaskContext<'_>,
    word_doc: &mut StreamBuffer,
    table: &[u8],
    site: &str,
    report: &mut RedactionReport,
) -> usize {
    let fib = match Fib::parse(word_doc.bytes()) {
        Ok(fib) => fib,
        Err(err) => {
            report.warn(site, err.to_string());
            return 0;
        }
    };
    if fib.is_encrypted() {
        report.warn(site, DocError::Encrypted.to_string());
        return 0;
    }

    let pieces = locate_pieces(word_doc.bytes(), table);
    if pieces.is_empty() {
        report.warn(site, "piece table is missing or unreadable; text left unscanned");
        return 0;
    }
    let text = match document_text(word_doc.bytes(), &pieces) {
        Ok(text) => text,
        Err(err) => {
            report.warn(site, format!("{err}; text left unscanned"));
            return 0;
        }
    };
    log::debug!("{site}: {} pieces, {} characters", pieces.len(), text.char_len());
    redact_decoded(ctx, word_doc, &text, site)
}
