#![no_main]

use libfuzzer_sys::fuzz_target;
use olemask_core::{LiteralOracle, MaskContext, RedactionConfig, RedactionReport};
use olemask_hwp::{parse_records, redact_section_stream};

fuzz_target!(|data: &[u8]| {
    // Record walking must stay inside the buffer.
    for record in parse_records(data) {
        assert!(record.data_start <= record.data_end && record.data_end <= data.len());
    }

    let oracle = LiteralOracle::new(["Alice", "a"]);
    let config = RedactionConfig::default();
    let ctx = MaskContext::new(&oracle, &config);
    let mut report = RedactionReport::default();

    // First byte picks the transport so both the raw and the deflate paths are explored.
    let compressed = data.first().is_some_and(|b| b & 1 == 1);
    if let Ok(Some(section)) = redact_section_stream(&ctx, data, compressed, "Section0", &mut report)
    {
        assert_eq!(section.bytes.len(), data.len());
    }
});
