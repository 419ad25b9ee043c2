#![no_main]

use libfuzzer_sys::fuzz_target;
use olemask_core::{LiteralOracle, MaskContext, RedactionConfig, StreamBuffer};
use olemask_emf::{iterate_records, locate_text_spans, redact_embedded_emf};

fuzz_target!(|data: &[u8]| {
    for record in iterate_records(data) {
        for span in locate_text_spans(data, &record) {
            assert!(span.offset + span.byte_len <= record.end());
        }
    }

    let oracle = LiteralOracle::new(["Alice", "a"]);
    let config = RedactionConfig::default();
    let ctx = MaskContext::new(&oracle, &config);
    let mut stream = StreamBuffer::scratch(data.to_vec());
    redact_embedded_emf(&ctx, &mut stream, "EPRINT");
    assert_eq!(stream.len(), data.len());
});
