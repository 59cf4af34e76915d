//! Fuzz target for `acp_core::decode`.
//!
//! Feeds arbitrary byte sequences through the top-level decode policy gate
//! with no session (unauthenticated path only). Looks for:
//! - parser crashes or panics
//! - integer overflows/underflows in length arithmetic
//! - buffer over-reads
//! - malformed frames that bypass CRC or structural validation
//!
//! Must never panic. All invalid inputs must return an `Err`.

#![no_main]

use acp_core::decode;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = decode(data, None);
});
