#![no_main]

use libfuzzer_sys::fuzz_target;
use olemask::{redact, LiteralOracle, RedactionConfig};

/// Keep the harness itself bounded; real containers are far larger but the interesting structure
/// (header, FAT, directory) sits in the first few sectors.
const MAX_INPUT_BYTES: usize = 1 << 20;

fuzz_target!(|data: &[u8]| {
    if data.len() > MAX_INPUT_BYTES {
        return;
    }
    let oracle = LiteralOracle::new(["Alice", "\u{D64D}\u{AE38}\u{B3D9}"]);
    if let Ok(redacted) = redact(data, &oracle, &RedactionConfig::default()) {
        assert_eq!(redacted.bytes.len(), data.len());
    }
});
