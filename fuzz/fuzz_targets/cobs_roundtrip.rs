//! Fuzz target for the COBS codec.
//!
//! Encodes arbitrary input, checks the encoded region never contains a zero
//! byte, decodes it back, and asserts the round trip is lossless. Also
//! exercises `cobs_decode` directly on arbitrary bytes to make sure
//! malformed COBS streams are rejected rather than panicking.

#![no_main]

use acp_core::{cobs_decode, cobs_encode, cobs_max_encoded_len};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 4096 {
        return;
    }

    let mut encoded = vec![0u8; cobs_max_encoded_len(data.len())];
    let Ok(encoded_len) = cobs_encode(data, &mut encoded) else {
        return;
    };
    let encoded = &encoded[..encoded_len];
    assert!(!encoded.contains(&0), "COBS output must never contain a zero byte");

    let mut decoded = vec![0u8; data.len() + 8];
    let decoded_len = cobs_decode(encoded, &mut decoded).expect("valid COBS encoding must decode");
    assert_eq!(&decoded[..decoded_len], data, "round trip must be lossless");

    // Arbitrary bytes interpreted directly as a COBS stream must never panic.
    let mut scratch = vec![0u8; data.len() + 8];
    let _ = cobs_decode(data, &mut scratch);
});
