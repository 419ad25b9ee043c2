use proptest::prelude::*;

use olemask_core::{LiteralOracle, MaskContext, RedactionConfig, StreamBuffer};

use crate::{iterate_records, locate_text_spans, redact_embedded_emf};

const MAX_LEN: usize = 8 * 1024;

fn text_record() -> impl Strategy<Value = Vec<u8>> {
    let record_type = prop::sample::select(vec![0x53u32, 0x54, 0x60, 0x61, 0x6C, 0x0E, 0x01]);
    (record_type, proptest::collection::vec(any::<u8>(), 0..=160)).prop_map(|(ty, mut body)| {
        body.truncate(body.len() / 4 * 4);
        let mut out = ty.to_le_bytes().to_vec();
        out.extend_from_slice(&((body.len() + 8) as u32).to_le_bytes());
        out.extend_from_slice(&body);
        out
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        // Deterministic in CI so failures are reproducible.
        rng_seed: proptest::test_runner::RngSeed::Fixed(0),
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    #[test]
    fn located_spans_stay_inside_their_records(
        records in proptest::collection::vec(text_record(), 0..=32),
    ) {
        let buf = records.concat();
        let result = std::panic::catch_unwind(|| {
            for record in iterate_records(&buf) {
                for span in locate_text_spans(&buf, &record) {
                    assert!(span.offset >= record.offset);
                    assert!(span.offset + span.byte_len <= record.end());
                }
            }
        });
        prop_assert!(result.is_ok(), "EMF scanner panicked or overran a record");
    }

    #[test]
    fn redaction_is_panic_free_and_length_preserving(
        buf in proptest::collection::vec(any::<u8>(), 0..=MAX_LEN),
    ) {
        let result = std::panic::catch_unwind(|| {
            let oracle = LiteralOracle::new(["A"]);
            let config = RedactionConfig::default();
            let ctx = MaskContext::new(&oracle, &config);
            let mut stream = StreamBuffer::scratch(buf.clone());
            redact_embedded_emf(&ctx, &mut stream, "EMF");
            stream.into_bytes()
        });
        prop_assert!(result.is_ok(), "redact_embedded_emf panicked");
        if let Ok(out) = result {
            prop_assert_eq!(out.len(), buf.len());
        }
    }
}
