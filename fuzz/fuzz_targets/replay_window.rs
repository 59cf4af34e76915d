//! Fuzz target for `ReplayWindow::check_and_advance`.
//!
//! Feeds an arbitrary sequence of u32 sequence numbers through a single
//! window and checks the invariants from the specification's replay-window
//! transition table: 0 is always rejected, a sequence is never accepted
//! twice, and `last_accepted` never moves backward.

#![no_main]

use acp_core::ReplayWindow;
use libfuzzer_sys::fuzz_target;
use std::collections::HashSet;

fuzz_target!(|sequences: Vec<u32>| {
    let mut window = ReplayWindow::new();
    let mut accepted = HashSet::new();
    let mut prev_last_accepted = 0u32;

    for &s in sequences.iter().take(10_000) {
        let result = window.check_and_advance(s);

        if s == 0 {
            assert!(result.is_err(), "sequence 0 must never be accepted");
            continue;
        }

        if result.is_ok() {
            assert!(accepted.insert(s), "sequence {s} accepted twice");
            assert!(window.last_accepted() >= prev_last_accepted, "last_accepted must never move backward");
            prev_last_accepted = window.last_accepted();
        }
    }
});
