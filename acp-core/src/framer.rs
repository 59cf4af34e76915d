//! Frame serialization: header + payload + CRC, COBS-wrapped and
//! delimiter-bracketed. This module has no knowledge of HMAC or sessions —
//! that policy lives in [`crate::api`]; this is the pure wire codec.

use crate::cobs::{cobs_decode, cobs_encode, cobs_max_encoded_len};
use crate::crc::crc16;
use crate::error::{ArgumentError, FramingError};
use crate::types::{Frame, FrameFlags, FrameType, PayloadBuf, MAX_PAYLOAD, PROTOCOL_VERSION};
use crate::AcpError;

const DELIMITER: u8 = 0x00;

const HEADER_SIZE_UNAUTH: usize = 6;
const HEADER_SIZE_AUTH: usize = 10;
const CRC_SIZE: usize = 2;

/// Slack above the largest legitimate unencoded frame
/// (`HEADER_SIZE_AUTH + MAX_PAYLOAD + CRC_SIZE`) carried by the decode
/// scratch buffer. Without it, a forged frame whose declared `length`
/// exceeds `MAX_PAYLOAD` by even one byte overflows `cobs_decode`'s output
/// buffer before `decode` ever reads the length field, so the explicit
/// `PayloadTooLarge` check below is never reached. Lands the scratch
/// buffer at the ~1100-byte figure the protocol budgets for its maximum
/// frame footprint.
const DECODE_SLACK: usize = 64;
const DECODE_SCRATCH_SIZE: usize = HEADER_SIZE_AUTH + MAX_PAYLOAD + CRC_SIZE + DECODE_SLACK;

/// Header size for a frame with the given flags: 6 bytes unauthenticated,
/// 10 bytes authenticated (the extra 4 bytes are the big-endian sequence
/// number).
#[must_use]
const fn header_size(flags: FrameFlags) -> usize {
    if flags.is_authenticated() { HEADER_SIZE_AUTH } else { HEADER_SIZE_UNAUTH }
}

/// Upper bound on the wire size of an encoded frame (COBS overhead plus
/// both delimiters), for sizing caller-owned buffers. Excludes the
/// HMAC tag appended by [`crate::api::encode`] for authenticated frames.
#[must_use]
pub const fn max_wire_size() -> usize {
    let unencoded = HEADER_SIZE_AUTH + MAX_PAYLOAD + CRC_SIZE;
    cobs_max_encoded_len(unencoded) + 2
}

/// Exact number of bytes [`encode`] will write for a frame with the given
/// `flags` and payload length: the COBS-wrapped header, payload, and CRC,
/// both delimiters included. Lets callers validate buffer capacity ahead
/// of time, without doing the encode itself — in particular so
/// [`crate::api::encode`] can check capacity before acquiring a TX
/// sequence number.
#[must_use]
pub fn encoded_len(flags: FrameFlags, payload_len: usize) -> usize {
    let hsize = header_size(flags);
    let unencoded_len = hsize + payload_len + CRC_SIZE;
    cobs_max_encoded_len(unencoded_len) + 2
}

/// Serialize `frame_type`/`flags`/`sequence`/`payload` into the COBS-wrapped,
/// delimiter-bracketed wire representation, writing into `out`.
///
/// `sequence` is ignored (and must be 0) unless `flags` is authenticated.
/// Returns the number of bytes written to `out`, not including any HMAC tag
/// (authentication is layered on by [`crate::api::encode`]).
pub fn encode(
    frame_type: FrameType,
    flags: FrameFlags,
    sequence: u32,
    payload: &PayloadBuf,
    out: &mut [u8],
) -> Result<usize, AcpError> {
    if payload.len() > MAX_PAYLOAD {
        return Err(AcpError::Argument(ArgumentError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        }));
    }

    let hsize = header_size(flags);
    let unencoded_len = hsize + payload.len() + CRC_SIZE;

    let mut unencoded = [0u8; HEADER_SIZE_AUTH + MAX_PAYLOAD + CRC_SIZE];
    unencoded[0] = PROTOCOL_VERSION;
    unencoded[1] = frame_type.to_u8();
    unencoded[2] = flags.to_byte();
    unencoded[3] = 0; // reserved

    #[allow(clippy::cast_possible_truncation)]
    let length = payload.len() as u16;
    unencoded[4..6].copy_from_slice(&length.to_be_bytes());

    if flags.is_authenticated() {
        unencoded[6..10].copy_from_slice(&sequence.to_be_bytes());
    }

    unencoded[hsize..hsize + payload.len()].copy_from_slice(payload.as_slice());

    let crc = crc16(&unencoded[..hsize + payload.len()]);
    unencoded[hsize + payload.len()..unencoded_len].copy_from_slice(&crc.to_be_bytes());

    let needed_encoded = cobs_max_encoded_len(unencoded_len);
    if out.len() < needed_encoded + 2 {
        return Err(AcpError::Argument(ArgumentError::BufferTooSmall {
            needed: needed_encoded + 2,
            actual: out.len(),
        }));
    }

    out[0] = DELIMITER;
    let encoded_len = cobs_encode(&unencoded[..unencoded_len], &mut out[1..])?;
    out[1 + encoded_len] = DELIMITER;

    Ok(1 + encoded_len + 1)
}

/// Parse one delimited frame starting at `input[0]`.
///
/// Returns `(frame, bytes_consumed)` where `bytes_consumed` is the length
/// of the COBS-wrapped region including both delimiters (the caller adds
/// the HMAC tag length separately for authenticated frames).
///
/// `Err(AcpError::Incomplete)` means the caller should read more bytes and
/// retry; no assumption about malformation can be made yet.
pub fn decode(input: &[u8]) -> Result<(Frame, usize), AcpError> {
    if input.is_empty() || input[0] != DELIMITER {
        return Err(AcpError::Framing(FramingError::MissingDelimiter));
    }

    let Some(trailing_offset) = input[1..].iter().position(|&b| b == DELIMITER) else {
        return Err(AcpError::Incomplete);
    };
    let trailing_idx = 1 + trailing_offset;

    let cobs_region = &input[1..trailing_idx];
    let mut unencoded = [0u8; DECODE_SCRATCH_SIZE];
    let unencoded_len = cobs_decode(cobs_region, &mut unencoded)?;

    if unencoded_len < HEADER_SIZE_UNAUTH + CRC_SIZE {
        return Err(AcpError::Framing(FramingError::Malformed("frame shorter than minimum header + CRC")));
    }

    let version = unencoded[0];
    let raw_type = unencoded[1];
    let flags = FrameFlags::from_byte(unencoded[2])?;
    // unencoded[3] is reserved and carries no semantic meaning on decode.

    let hsize = header_size(flags);
    if unencoded_len < hsize + CRC_SIZE {
        return Err(AcpError::Framing(FramingError::Malformed("frame shorter than declared header + CRC")));
    }

    let crc_declared = u16::from_be_bytes([unencoded[unencoded_len - 2], unencoded[unencoded_len - 1]]);
    let crc_actual = crc16(&unencoded[..unencoded_len - CRC_SIZE]);
    if crc_declared != crc_actual {
        return Err(AcpError::CrcMismatch);
    }

    let length = u16::from_be_bytes([unencoded[4], unencoded[5]]) as usize;
    if hsize + length + CRC_SIZE != unencoded_len {
        return Err(AcpError::Framing(FramingError::Malformed("declared length inconsistent with frame size")));
    }
    if length > MAX_PAYLOAD {
        return Err(AcpError::Argument(ArgumentError::PayloadTooLarge { size: length, max: MAX_PAYLOAD }));
    }

    let sequence = if flags.is_authenticated() {
        u32::from_be_bytes([unencoded[6], unencoded[7], unencoded[8], unencoded[9]])
    } else {
        0
    };

    let frame_type = FrameType::try_from(raw_type)?;
    let payload = PayloadBuf::from_slice(&unencoded[hsize..hsize + length])?;

    let frame = Frame { version, frame_type, flags, sequence, payload };
    Ok((frame, trailing_idx + 1))
}
