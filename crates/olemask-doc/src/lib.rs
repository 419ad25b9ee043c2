//! Word 97-2003 body text redaction.
//!
//! The document text lives in the `WordDocument` stream as a sequence of pieces, each either
//! 8-bit (cp1252) or UTF-16LE, located through the CLX piece table in the `0Table`/`1Table`
//! stream. Masks are written over the piece bytes; the piece table and FIB are never touched.

pub mod clx;
mod error;
pub mod fib;
mod text;


pub use clx::{locate_pieces, map_char_range_to_bytes, ByteRange, PlcPiece};
pub use error::DocError;
pub use fib::{Fib, WORD_IDENT};
pub use text::{decode_piece_text, document_text, redact_word_document, COMPRESSED_CODEPAGE};
