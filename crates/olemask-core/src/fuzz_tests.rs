use proptest::prelude::*;

use crate::{
    decode_codepage_indexed, decode_utf16le_indexed, mask, redact_decoded, LiteralOracle,
    MaskContext, RedactionConfig, SensitivityOracle, StreamBuffer, TextEncoding,
};

const MAX_INPUT_LEN: usize = 4 * 1024;

fn encoding_strategy() -> impl Strategy<Value = TextEncoding> {
    prop_oneof![
        Just(TextEncoding::Utf16Le),
        Just(TextEncoding::Codepage(949)),
        Just(TextEncoding::Codepage(1252)),
        Just(TextEncoding::Codepage(932)),
        Just(TextEncoding::Codepage(65001)),
        Just(TextEncoding::Codepage(437)),
    ]
}

fn mask_char_strategy() -> impl Strategy<Value = char> {
    prop_oneof![Just('*'), Just('#'), Just('\u{FF0A}'), Just('\u{1F512}')]
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
    fn mask_preserves_byte_length(
        original in proptest::collection::vec(any::<u8>(), 0..=MAX_INPUT_LEN),
        encoding in encoding_strategy(),
        mask_char in mask_char_strategy(),
    ) {
        let masked = mask(&original, mask_char, encoding);
        prop_assert_eq!(masked.len(), original.len());
    }

    #[test]
    fn indexed_decoders_cover_every_byte_once(
        bytes in proptest::collection::vec(any::<u8>(), 0..=MAX_INPUT_LEN),
        codepage in prop_oneof![Just(949u16), Just(932), Just(936), Just(950), Just(1252), Just(65001)],
    ) {
        let decoded = decode_codepage_indexed(&bytes, 0, codepage);
        prop_assert_eq!(decoded.text.chars().count(), decoded.slots.len());
        let mut next = 0usize;
        for slot in &decoded.slots {
            prop_assert_eq!(slot.start, next);
            next = slot.end();
        }
        prop_assert_eq!(next, bytes.len());

        let decoded = decode_utf16le_indexed(&bytes, 0);
        let covered: usize = decoded.slots.iter().map(|s| s.len).sum();
        prop_assert_eq!(covered, bytes.len() & !1);
    }

    #[test]
    fn masked_text_no_longer_matches_its_literal(
        prefix in "[a-z ]{0,12}",
        secret in "[0-9]{6}-[0-9]{7}",
        suffix in "[a-z ]{0,12}",
    ) {
        let oracle = LiteralOracle::new([secret.as_str()]);
        let config = RedactionConfig::default();
        let ctx = MaskContext::new(&oracle, &config);

        let text = format!("{prefix}{secret}{suffix}");
        let bytes: Vec<u8> = text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
        let mut buf = StreamBuffer::scratch(bytes.clone());
        let decoded = decode_utf16le_indexed(&bytes, 0);

        let hits = redact_decoded(&ctx, &mut buf, &decoded, "proptest");
        prop_assert!(hits >= 1);
        prop_assert_eq!(buf.len(), bytes.len());

        let rescanned = decode_utf16le_indexed(buf.bytes(), 0);
        prop_assert!(oracle.find_sensitive_spans(&rescanned.text).is_empty());
    }
}
