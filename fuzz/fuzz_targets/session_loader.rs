#![no_main]

use libfuzzer_sys::fuzz_target;
use pageverdict::session;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must load or fail cleanly, never panic
    if let Ok(evidence) = session::parse_slice(data) {
        assert!(evidence.load_time_ms().map_or(true, |ms| ms >= 0.0));
    }
});
