#![no_main]

use libfuzzer_sys::fuzz_target;
use olemask_biff::redact_workbook;
use olemask_core::{LiteralOracle, MaskContext, RedactionConfig, RedactionReport, StreamBuffer};

fuzz_target!(|data: &[u8]| {
    let oracle = LiteralOracle::new(["Alice", "a"]);
    let config = RedactionConfig::default();
    let ctx = MaskContext::new(&oracle, &config);
    let mut stream = StreamBuffer::scratch(data.to_vec());
    let mut report = RedactionReport::default();

    redact_workbook(&ctx, &mut stream, "Workbook", &mut report);
    assert_eq!(stream.len(), data.len());
});
