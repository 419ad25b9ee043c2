use olemask_core::{LiteralOracle, MaskContext, RedactionConfig, RedactionReport, StreamBuffer};
use olemask_doc::{document_text, locate_pieces, redact_word_document, Fib};
use pretty_assertions::assert_eq;

mod common;

use common::doc_builder::{utf16, word_streams, TEXT_START};

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn redact(word_doc: &[u8], table: &[u8], needle: &str) -> (usize, Vec<u8>, RedactionReport) {
    let oracle = LiteralOracle::new([needle]);
    let config = RedactionConfig::default();
    let ctx = MaskContext::new(&oracle, &config);
    let mut stream = StreamBuffer::scratch(word_doc.to_vec());
    let mut report = RedactionReport::default();
    let hits = redact_word_document(&ctx, &mut stream, table, "WordDocument", &mut report);
    (hits, stream.into_bytes(), report)
}

#[test]
fn text_is_read_across_mixed_width_pieces() {
    let streams = word_streams(&[("Dear Al", true), ("ice,\r", false)], 0);
    let fib = Fib::parse(&streams.word_doc).expect("fib");
    assert_eq!(fib.table_stream_name(), "1Table");

    let pieces = locate_pieces(&streams.word_doc, &streams.table);
    assert_eq!(pieces.len(), 2);
    assert_eq!(pieces[0].byte_offset(), TEXT_START);
    let text = document_text(&streams.word_doc, &pieces).expect("text");
    assert_eq!(text.text, "Dear Alice,\r");
}

#[test]
fn hit_spanning_two_pieces_is_masked_in_both() {
    let streams = word_streams(&[("Dear Al", true), ("ice,\r", false)], 0);
    let (hits, out, report) = redact(&streams.word_doc, &streams.table, "Alice");
    assert_eq!(hits, 1);
    assert_eq!(out.len(), streams.word_doc.len());
    assert_eq!(&out[TEXT_START..TEXT_START + 7], b"Dear **");
    assert!(contains(&out, &utf16("***,\r")));
    assert!(report.warnings.is_empty());
}

#[test]
fn paragraph_gap_inside_a_hit_is_never_masked() {
    let streams = word_streams(&[("Kim\r\rLee", false)], 0);
    let (hits, out, _) = redact(&streams.word_doc, &streams.table, "Kim\r\rLee");
    assert_eq!(hits, 2);
    assert!(contains(&out, &utf16("***\r\r***")));
}

#[test]
fn encrypted_documents_are_reported_and_untouched() {
    let streams = word_streams(&[("Alice", true)], 0x0100);
    let (hits, out, report) = redact(&streams.word_doc, &streams.table, "Alice");
    assert_eq!(hits, 0);
    assert_eq!(out, streams.word_doc);
    assert_eq!(report.warnings.len(), 1);
}

#[test]
fn piece_outside_the_stream_fails_closed() {
    let streams = word_streams(&[("Alice", true), ("Bob", false)], 0);
    let mut word_doc = streams.word_doc.clone();
    word_doc.truncate(TEXT_START + 5);
    // The FIB still points at the same table; the second piece now lies past the end.
    let (hits, out, report) = redact(&word_doc, &streams.table, "Alice");
    assert_eq!(hits, 0);
    assert_eq!(out, word_doc);
    assert_eq!(report.warnings.len(), 1);
}

#[test]
fn table_too_short_for_the_clx_leaves_the_text_unscanned() {
    let streams = word_streams(&[("Alice", true)], 0);
    let (hits, _, report) = redact(&streams.word_doc, &streams.table[..20], "Alice");
    assert_eq!(hits, 0);
    assert_eq!(report.warnings.len(), 1);
}
