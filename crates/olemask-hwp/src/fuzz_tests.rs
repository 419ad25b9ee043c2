use proptest::prelude::*;

use olemask_core::{LiteralOracle, MaskContext, RedactionConfig, RedactionReport};

use crate::{decode_para_text, inflate_with_limit, parse_records, redact_section_stream};

const MAX_LEN: usize = 8 * 1024;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        // Deterministic in CI so failures are reproducible.
        rng_seed: proptest::test_runner::RngSeed::Fixed(0),
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    #[test]
    fn record_and_text_decoding_is_panic_free(
        buf in proptest::collection::vec(any::<u8>(), 0..=MAX_LEN),
    ) {
        let result = std::panic::catch_unwind(|| {
            for record in parse_records(&buf) {
                assert!(record.data_end <= buf.len());
                let decoded = decode_para_text(record.payload(&buf), record.data_start);
                assert_eq!(decoded.slots.len(), decoded.text.chars().count());
                for slot in &decoded.slots {
                    assert!(slot.end() <= record.data_end);
                }
            }
        });
        prop_assert!(result.is_ok(), "HWP record decoding panicked");
    }

    #[test]
    fn section_redaction_is_length_preserving(
        buf in proptest::collection::vec(any::<u8>(), 0..=MAX_LEN),
        compressed in any::<bool>(),
    ) {
        let result = std::panic::catch_unwind(|| {
            let oracle = LiteralOracle::new(["A"]);
            let config = RedactionConfig::default();
            let ctx = MaskContext::new(&oracle, &config);
            let mut report = RedactionReport::default();
            let _ = inflate_with_limit(&buf, 64 * 1024);
            redact_section_stream(&ctx, &buf, compressed, "Section0", &mut report)
        });
        prop_assert!(result.is_ok(), "section redaction panicked");
        if let Ok(Ok(Some(section))) = result {
            prop_assert_eq!(section.bytes.len(), buf.len());
        }
    }
}
