#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Probe and full decode of arbitrary bytes — must never panic
    let _ = zenilbm::probe(data);
    let _ = zenilbm::decode(data, enough::Unstoppable);
});
