#![no_main]

use libfuzzer_sys::fuzz_target;

use solar_nullables::NullExchange;
use solar_token::{ReflectionToken, TokenConfig, TokenSnapshot};

// Decoding and restoring arbitrary bytes must fail cleanly, never panic.
fuzz_target!(|data: &[u8]| {
    if let Ok(snapshot) = TokenSnapshot::from_bytes(data) {
        let _ = ReflectionToken::restore(&TokenConfig::default(), snapshot, NullExchange::new());
    }
});
