//! Fuzz target for authenticated-frame tag verification.
//!
//! Builds a valid authenticated frame, applies an arbitrary mutation to its
//! bytes, and decodes it against a fresh receive session. The only
//! assertions are about what must NEVER happen: no panic, and no frame ever
//! accepted with a tampered tag or body that doesn't match what was sent.

#![no_main]

use acp_core::{decode, encode, FrameFlags, FrameType, PayloadBuf, Session};
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    payload: Vec<u8>,
    mutate_index: usize,
    mutate_xor: u8,
    mutate: bool,
}

fuzz_target!(|input: Input| {
    let payload_bytes = &input.payload[..input.payload.len().min(1024)];
    let Ok(payload) = PayloadBuf::from_slice(payload_bytes) else {
        return;
    };

    let key = [0x42u8; 32];
    let mut tx = Session::init(1, &key, 0xABCD).expect("valid key");
    let mut rx = Session::init(1, &key, 0xABCD).expect("valid key");

    let mut out = vec![0u8; acp_core::MAX_FRAME_WIRE_SIZE];
    let n = encode(FrameType::Telemetry, FrameFlags::authenticated(), &payload, Some(&mut tx), &mut out)
        .expect("encode within bounds must succeed");
    out.truncate(n);

    if input.mutate && n > 0 {
        let idx = input.mutate_index % n;
        out[idx] ^= input.mutate_xor.max(1);
    }

    match decode(&out, Some(&mut rx)) {
        Ok((frame, _)) => {
            assert_eq!(frame.payload.as_slice(), payload_bytes, "accepted frame must carry the original payload");
        }
        Err(_) => {}
    }
});
