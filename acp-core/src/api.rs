//! Top-level frame API: the policy gate that ties framing, HMAC
//! authentication, and session/replay state together.
//!
//! Everything below this module (`crc`, `sha256`, `hmac`, `cobs`, `framer`)
//! is policy-free — it will happily build or parse an unauthenticated
//! `Command` frame if asked directly. This module is where "commands MUST
//! be authenticated" actually gets enforced, mirroring the way the
//! teacher's validator modules check structural policy before doing any
//! cryptographic work.

use crate::error::{AuthError, SessionError};
use crate::hmac::{ct_eq, hmac_sha256_tag, TAG_SIZE};
use crate::session::Session;
use crate::types::{Frame, FrameFlags, FrameType, PayloadBuf};
use crate::{framer, AcpError};

/// Encode one frame, enforcing the "commands must be authenticated" policy
/// and, for authenticated frames, acquiring a TX sequence number from
/// `session` and appending the 16-byte HMAC-SHA256 tag.
///
/// Returns the total number of bytes written to `out`: the COBS-wrapped,
/// delimiter-bracketed frame, plus the tag when `flags` is authenticated.
pub fn encode(
    frame_type: FrameType,
    flags: FrameFlags,
    payload: &PayloadBuf,
    session: Option<&mut Session>,
    out: &mut [u8],
) -> Result<usize, AcpError> {
    if frame_type == FrameType::Command && !flags.is_authenticated() {
        return Err(AcpError::Authenticity(AuthError::AuthRequired));
    }

    if !flags.is_authenticated() {
        return framer::encode(frame_type, flags, 0, payload, out);
    }

    // Validate capacity before touching `session`: a TX sequence number
    // must never be consumed on a path that can still fail, or it is
    // burned for nothing once the caller's buffer turns out too small.
    let required = framer::encoded_len(flags, payload.len()) + TAG_SIZE;
    if out.len() < required {
        return Err(AcpError::Argument(crate::error::ArgumentError::BufferTooSmall {
            needed: required,
            actual: out.len(),
        }));
    }

    let session = session.ok_or(AcpError::Session(SessionError::NotInitialized))?;
    let sequence = session.next_tx_sequence()?;
    let key = *session.key_bytes()?;

    let frame_len = framer::encode(frame_type, flags, sequence, payload, out)?;

    // The tag covers the COBS-encoded region only — leading and trailing
    // delimiters are excluded, per the wire format's fixed convention.
    // `required` already accounts for `frame_len + TAG_SIZE`, so this
    // always fits.
    let tag = hmac_sha256_tag(&key, &out[1..frame_len - 1]);
    out[frame_len..frame_len + TAG_SIZE].copy_from_slice(&tag);

    Ok(frame_len + TAG_SIZE)
}

/// Decode one frame from `input`, verifying the authentication tag and
/// replay window when the frame is authenticated, and enforcing that
/// `Command` frames are never accepted unauthenticated.
///
/// Returns `(frame, bytes_consumed)`. `bytes_consumed` includes the 16-byte
/// tag for authenticated frames. `Err(AcpError::Incomplete)` means the
/// caller should read more bytes and retry — no session state advances.
pub fn decode(input: &[u8], session: Option<&mut Session>) -> Result<(Frame, usize), AcpError> {
    let (frame, frame_len) = framer::decode(input)?;

    if !frame.is_authenticated() {
        if frame.frame_type == FrameType::Command {
            return Err(AcpError::Authenticity(AuthError::AuthRequired));
        }
        return Ok((frame, frame_len));
    }

    let session = session.ok_or(AcpError::Session(SessionError::NotInitialized))?;

    if input.len() < frame_len + TAG_SIZE {
        return Err(AcpError::Incomplete);
    }

    let key = *session.key_bytes()?;
    let expected_tag = hmac_sha256_tag(&key, &input[1..frame_len - 1]);
    let received_tag = &input[frame_len..frame_len + TAG_SIZE];

    if ct_eq(&expected_tag, received_tag) != 0 {
        return Err(AcpError::Authenticity(AuthError::AuthFailed));
    }

    session.check_and_advance_replay(frame.sequence)?;

    Ok((frame, frame_len + TAG_SIZE))
}
