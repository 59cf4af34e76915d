#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]

//! ACP core: a portable, deterministic, security-oriented library for
//! framing, authenticating, and parsing fixed-bounded command, telemetry,
//! and system messages over unreliable byte streams (serial, USB, CAN, TCP).
//!
//! ```text
//!                  ┌─────────────────────────────────────────┐
//!                  │            top-level frame API           │  (policy: commands MUST be authenticated)
//!                  │        api::encode / api::decode         │
//!                  └───────────────┬───────────────────────────┘
//!                                  │
//!          ┌───────────────────────┼────────────────────────┐
//!          │                       │                        │
//!    ┌─────▼─────┐          ┌──────▼──────┐          ┌──────▼──────┐
//!    │   framer   │          │   session   │          │     hmac    │
//!    │ (wire codec)│         │ (seq/replay)│          │ (auth tags) │
//!    └─────┬──────┘          └─────────────┘          └──────┬──────┘
//!          │                                                 │
//!    ┌─────▼──────┐                                   ┌──────▼──────┐
//!    │    cobs    │                                   │    sha256   │
//!    │ (zero-elim)│                                   │  (primitive)│
//!    └─────┬──────┘                                   └─────────────┘
//!          │
//!    ┌─────▼──────┐
//!    │     crc     │
//!    │ (integrity) │
//!    └────────────┘
//! ```
//!
//! Transport I/O, key agreement/provisioning, persistent keystores beyond
//! the injected [`KeyStore`] trait, encryption (confidentiality), and
//! application-level payload semantics are all out of scope — they are the
//! embedder's responsibility. There is no role-based authorization layer
//! and no rate limiter: the current protocol generation binds authenticity
//! to command frames and nothing more.
//!
//! # Wire format
//!
//! A frame is delimited by `0x00` bytes. Between the delimiters is a
//! COBS-stuffed encoding of:
//!
//! ```text
//! version(1) type(1) flags(1) reserved(1) length(2,BE) [sequence(4,BE) if AUTHENTICATED]
//! payload(0..=1024) crc16(2,BE)
//! ```
//!
//! If `AUTHENTICATED` is set, a 16-byte HMAC-SHA256 tag follows the
//! trailing delimiter, computed over the COBS-encoded bytes excluding both
//! delimiters (never over the tag itself, and never inside the COBS
//! region).
//!
//! # Allocation
//!
//! Every hot-path type (`PayloadBuf`, `Frame`, `Session`) is a fixed-size,
//! stack-resident value. Nothing in this crate allocates unless the
//! `alloc`/`std` features are enabled, and even then allocation is confined
//! to convenience constructors — the core codec and policy functions never
//! allocate themselves.

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod api;
pub mod cobs;
pub mod crc;
pub mod error;
pub mod framer;
pub mod hmac;
mod sha256;
pub mod session;
pub mod types;

pub use api::{decode, encode};
pub use cobs::{cobs_decode, cobs_encode, cobs_max_encoded_len, CobsDecoder, DecoderState, FeedResult};
pub use crc::{crc16, Crc16};
pub use error::{AcpError, ArgumentError, AuthError, FramingError, Result, SessionError};
pub use hmac::{ct_eq, hmac_sha256, hmac_sha256_tag, HmacSha256, TAG_SIZE};
pub use session::{ReplayWindow, Session, REPLAY_WINDOW_WIDTH};
pub use sha256::{sha256, Sha256, DIGEST_SIZE};
pub use types::{Frame, FrameDescriptor, FrameFlags, FrameType, PayloadBuf, MAX_PAYLOAD, PROTOCOL_VERSION};

/// Upper bound on the wire size of a fully-encoded frame, including the
/// COBS overhead, both delimiters, and (for authenticated frames) the
/// HMAC tag. Sized from the maximum authenticated header, maximum payload,
/// CRC, and tag: callers sizing their own transmit buffers should use this
/// rather than re-deriving it.
pub const MAX_FRAME_WIRE_SIZE: usize = framer::max_wire_size() + hmac::TAG_SIZE;

/// Capability supplied by the embedder for key lookup by key identifier.
/// ACP core never persists or provisions keys itself.
pub trait KeyStore {
    /// Look up the 32-byte key for `key_id`, or an error (including
    /// [`error::SessionError::KeyNotFound`]) if none exists.
    fn get(&self, key_id: u32) -> Result<[u8; 32]>;

    /// Store `key` under `key_id`. Optional: implementations with no
    /// writable backing store may always return an error.
    fn put(&mut self, key_id: u32, key: &[u8; 32]) -> Result<()>;
}

/// Capability supplied by the embedder for reading a monotonic millisecond
/// clock. The core itself never reads a clock; this exists solely so
/// callers can feed a value into [`Session::is_expired`].
pub trait MonotonicClock {
    /// Current time in milliseconds since an arbitrary, monotonic epoch.
    fn now_ms(&self) -> u64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_frame_wire_size_fits_boundary_authenticated_frame() {
        let payload = PayloadBuf::from_slice(&[0u8; MAX_PAYLOAD]).unwrap();
        let mut session = Session::init(1, &[0xAA; 32], 0).unwrap();
        let mut out = vec![0u8; MAX_FRAME_WIRE_SIZE];
        let n = encode(FrameType::Command, FrameFlags::authenticated(), &payload, Some(&mut session), &mut out)
            .unwrap();
        assert!(n <= MAX_FRAME_WIRE_SIZE);
    }
}
