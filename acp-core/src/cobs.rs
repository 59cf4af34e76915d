//! Consistent Overhead Byte Stuffing (COBS): zero-elimination codec plus a
//! byte-at-a-time streaming reassembly state machine for delimiter-framed
//! transports.

use crate::error::{ArgumentError, FramingError};
use crate::AcpError;

/// Maximum encoded size for `len` input bytes: one code byte per run of up
/// to 254 non-zero bytes, plus the input itself.
#[must_use]
pub const fn cobs_max_encoded_len(len: usize) -> usize {
    len + len.div_ceil(254) + 1
}

/// COBS-encode `input` into `output`, returning the number of bytes written.
///
/// The encoded region never contains a zero byte. `output` must be at least
/// [`cobs_max_encoded_len`] bytes.
pub fn cobs_encode(input: &[u8], output: &mut [u8]) -> Result<usize, AcpError> {
    let needed = cobs_max_encoded_len(input.len());
    if output.len() < needed {
        return Err(AcpError::Argument(ArgumentError::BufferTooSmall {
            needed,
            actual: output.len(),
        }));
    }

    let mut read_idx = 0;
    let mut write_idx = 1;
    let mut code_idx = 0;
    let mut code: u8 = 1;

    while read_idx < input.len() {
        let byte = input[read_idx];
        if byte == 0 {
            output[code_idx] = code;
            code_idx = write_idx;
            write_idx += 1;
            code = 1;
        } else {
            output[write_idx] = byte;
            write_idx += 1;
            code += 1;
            if code == 0xFF {
                output[code_idx] = code;
                code_idx = write_idx;
                write_idx += 1;
                code = 1;
            }
        }
        read_idx += 1;
    }

    output[code_idx] = code;
    Ok(write_idx)
}

/// COBS-decode `input` into `output`, returning the number of bytes written.
///
/// Rejects a code byte of zero and any output that would exceed
/// `output.len()` as malformed ([`FramingError::CobsViolation`]).
pub fn cobs_decode(input: &[u8], output: &mut [u8]) -> Result<usize, AcpError> {
    let mut read_idx = 0;
    let mut write_idx = 0;

    while read_idx < input.len() {
        let code = input[read_idx];
        if code == 0 {
            return Err(AcpError::Framing(FramingError::CobsViolation));
        }
        let run = usize::from(code) - 1;
        read_idx += 1;

        if read_idx + run > input.len() {
            return Err(AcpError::Framing(FramingError::CobsViolation));
        }
        if write_idx + run > output.len() {
            return Err(AcpError::Argument(ArgumentError::BufferTooSmall {
                needed: write_idx + run,
                actual: output.len(),
            }));
        }

        output[write_idx..write_idx + run].copy_from_slice(&input[read_idx..read_idx + run]);
        write_idx += run;
        read_idx += run;

        let more_input_follows = read_idx < input.len();
        if code != 0xFF && more_input_follows {
            if write_idx >= output.len() {
                return Err(AcpError::Argument(ArgumentError::BufferTooSmall {
                    needed: write_idx + 1,
                    actual: output.len(),
                }));
            }
            output[write_idx] = 0;
            write_idx += 1;
        }
    }

    Ok(write_idx)
}

/// State of the byte-at-a-time streaming COBS reassembly machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// Waiting for the start of a frame (leading delimiters are ignored).
    Idle,
    /// Buffering bytes between delimiters.
    Receiving,
    /// A full COBS-encoded region has been buffered; call
    /// [`CobsDecoder::encoded_bytes`] then [`CobsDecoder::reset`].
    Complete,
    /// The buffer overflowed; remains until [`CobsDecoder::reset`].
    Error,
}

/// Result of feeding one byte to [`CobsDecoder::feed_byte`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedResult {
    /// A complete COBS-encoded region is ready to be retrieved.
    FrameReady,
    /// More bytes are needed before a frame is complete.
    NeedMoreBytes,
    /// The decoder is in an error state (buffer overflow). The caller must
    /// call [`CobsDecoder::reset`] before feeding more bytes.
    Error,
}

/// Single-frame, byte-at-a-time streaming COBS reassembler.
///
/// Buffers the COBS-encoded bytes between a pair of `0x00` delimiters. This
/// does not itself run [`cobs_decode`] — it only locates frame boundaries in
/// a byte stream; call [`cobs_decode`] on [`Self::encoded_bytes`] once
/// [`FeedResult::FrameReady`] is returned. Multi-frame pipelining is the
/// caller's responsibility: reset and keep feeding.
pub struct CobsDecoder<'a> {
    buf: &'a mut [u8],
    write_idx: usize,
    state: DecoderState,
}

impl<'a> CobsDecoder<'a> {
    /// Wrap a caller-owned buffer for reassembly.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, write_idx: 0, state: DecoderState::Idle }
    }

    /// Current state machine state.
    #[must_use]
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Feed one byte from the transport, advancing the state machine.
    pub fn feed_byte(&mut self, byte: u8) -> FeedResult {
        match self.state {
            DecoderState::Idle => {
                if byte == 0 {
                    FeedResult::NeedMoreBytes
                } else if self.push(byte) {
                    self.state = DecoderState::Receiving;
                    FeedResult::NeedMoreBytes
                } else {
                    self.state = DecoderState::Error;
                    FeedResult::Error
                }
            }
            DecoderState::Receiving => {
                if byte == 0 {
                    self.state = DecoderState::Complete;
                    FeedResult::FrameReady
                } else if self.push(byte) {
                    FeedResult::NeedMoreBytes
                } else {
                    self.state = DecoderState::Error;
                    FeedResult::Error
                }
            }
            DecoderState::Complete => FeedResult::FrameReady,
            DecoderState::Error => FeedResult::Error,
        }
    }

    fn push(&mut self, byte: u8) -> bool {
        if self.write_idx >= self.buf.len() {
            return false;
        }
        self.buf[self.write_idx] = byte;
        self.write_idx += 1;
        true
    }

    /// The buffered COBS-encoded region (delimiters excluded). Valid once
    /// [`Self::state`] is [`DecoderState::Complete`].
    #[must_use]
    pub fn encoded_bytes(&self) -> &[u8] {
        &self.buf[..self.write_idx]
    }

    /// Return to [`DecoderState::Idle`] and discard any buffered bytes.
    pub fn reset(&mut self) {
        self.write_idx = 0;
        self.state = DecoderState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(input: &[u8]) -> Vec<u8> {
        let mut encoded = vec![0u8; cobs_max_encoded_len(input.len())];
        let encoded_len = cobs_encode(input, &mut encoded).expect("encode");
        encoded.truncate(encoded_len);
        assert!(!encoded.contains(&0), "encoded region must contain no zero byte");

        let mut decoded = vec![0u8; input.len() + 8];
        let decoded_len = cobs_decode(&encoded, &mut decoded).expect("decode");
        decoded.truncate(decoded_len);
        decoded
    }

    #[test]
    fn empty_input() {
        assert_eq!(round_trip(&[]), Vec::<u8>::new());
    }

    #[test]
    fn no_zero_bytes() {
        assert_eq!(round_trip(&[0x11, 0x22, 0x33]), vec![0x11, 0x22, 0x33]);
    }

    #[test]
    fn single_embedded_zero() {
        assert_eq!(round_trip(&[0x11, 0x22, 0x00, 0x33]), vec![0x11, 0x22, 0x00, 0x33]);
    }

    #[test]
    fn leading_and_trailing_zero() {
        assert_eq!(round_trip(&[0x00, 0x01, 0x00]), vec![0x00, 0x01, 0x00]);
    }

    #[test]
    fn long_run_crosses_254_boundary() {
        let input: Vec<u8> = (0..300).map(|i| (i % 255 + 1) as u8).collect();
        assert_eq!(round_trip(&input), input);
    }

    #[test]
    fn all_zero_input() {
        let input = vec![0u8; 10];
        assert_eq!(round_trip(&input), input);
    }

    #[test]
    fn decode_rejects_zero_code_byte() {
        let mut out = [0u8; 16];
        let err = cobs_decode(&[0x02, 0xAA, 0x00], &mut out).unwrap_err();
        assert!(matches!(err, AcpError::Framing(FramingError::CobsViolation)));
    }

    #[test]
    fn decode_rejects_truncated_run() {
        let mut out = [0u8; 16];
        let err = cobs_decode(&[0x05, 0xAA, 0xBB], &mut out).unwrap_err();
        assert!(matches!(err, AcpError::Framing(FramingError::CobsViolation)));
    }

    #[test]
    fn streaming_decoder_signals_once_at_delimiter() {
        let mut encoded = vec![0u8; cobs_max_encoded_len(3)];
        let n = cobs_encode(&[0x01, 0x02, 0x03], &mut encoded).expect("encode");
        encoded.truncate(n);

        let mut wire = vec![0x00u8];
        wire.extend_from_slice(&encoded);
        wire.push(0x00);

        let mut buf = [0u8; 64];
        let mut decoder = CobsDecoder::new(&mut buf);
        let mut ready_count = 0;
        for (i, &byte) in wire.iter().enumerate() {
            let result = decoder.feed_byte(byte);
            if result == FeedResult::FrameReady {
                ready_count += 1;
                assert_eq!(i, wire.len() - 1, "frame-ready must fire exactly at the trailing delimiter");
            }
        }
        assert_eq!(ready_count, 1);
        assert_eq!(decoder.encoded_bytes(), encoded.as_slice());
    }

    #[test]
    fn streaming_decoder_overflow_enters_error_state() {
        let mut buf = [0u8; 2];
        let mut decoder = CobsDecoder::new(&mut buf);
        assert_eq!(decoder.feed_byte(0x01), FeedResult::NeedMoreBytes);
        assert_eq!(decoder.feed_byte(0x02), FeedResult::NeedMoreBytes);
        assert_eq!(decoder.feed_byte(0x03), FeedResult::Error);
        assert_eq!(decoder.state(), DecoderState::Error);
        decoder.reset();
        assert_eq!(decoder.state(), DecoderState::Idle);
    }
}
