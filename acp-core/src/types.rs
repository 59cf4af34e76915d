//! Frame data model: [`FrameType`], [`FrameFlags`], [`FrameDescriptor`], and
//! [`Frame`] itself.
//!
//! Payload storage is a fixed-size, stack-resident buffer rather than a
//! heap-backed `Vec`/`Bytes`, matching the protocol's zero-allocation
//! hot-path requirement: every [`Frame`] costs exactly
//! [`MAX_PAYLOAD`](crate::MAX_PAYLOAD) bytes regardless of how much of it is
//! in use.

use core::fmt;

use crate::error::ArgumentError;
use crate::AcpError;

/// Maximum payload length in bytes for this protocol version.
pub const MAX_PAYLOAD: usize = 1024;

/// Current protocol major version transmitted on the wire.
pub const PROTOCOL_VERSION: u8 = 0x00;

/// ACP frame type, transmitted as a single byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FrameType {
    /// Sensor/status data, authentication optional.
    Telemetry = 0x01,
    /// Actuation/control instruction. MUST be authenticated.
    Command = 0x02,
    /// Session/system management, authentication optional.
    System = 0x03,
}

impl FrameType {
    /// Raw wire value for this frame type.
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for FrameType {
    type Error = AcpError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Self::Telemetry),
            0x02 => Ok(Self::Command),
            0x03 => Ok(Self::System),
            other => Err(AcpError::Argument(ArgumentError::InvalidFrameType(other))),
        }
    }
}

/// Frame processing flags. Only bit 0 ([`Self::AUTHENTICATED`]) is defined;
/// all other bits are reserved and MUST be zero on encode, and are rejected
/// on decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameFlags(u8);

impl FrameFlags {
    /// The frame carries a sequence number and an HMAC-SHA256 tag.
    pub const AUTHENTICATED: u8 = 0x01;

    /// All currently-defined bits.
    const KNOWN_BITS: u8 = Self::AUTHENTICATED;

    /// No flags set.
    #[must_use]
    pub const fn none() -> Self {
        Self(0)
    }

    /// Build from a raw byte, validating that no reserved bit is set.
    pub fn from_byte(byte: u8) -> Result<Self, AcpError> {
        if byte & !Self::KNOWN_BITS != 0 {
            return Err(AcpError::Argument(ArgumentError::InvalidFlags(byte)));
        }
        Ok(Self(byte))
    }

    /// Raw wire byte.
    #[must_use]
    pub const fn to_byte(self) -> u8 {
        self.0
    }

    /// Whether [`Self::AUTHENTICATED`] is set.
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        self.0 & Self::AUTHENTICATED != 0
    }

    /// Return a copy with [`Self::AUTHENTICATED`] set.
    #[must_use]
    pub const fn authenticated() -> Self {
        Self(Self::AUTHENTICATED)
    }
}

/// Inputs describing a frame to be encoded.
///
/// Mirrors the teacher's builder-style header construction
/// (`FrameHeader::new` plus setters): start from [`Self::new`] and chain the
/// `with_*` methods that apply.
#[derive(Debug, Clone)]
pub struct FrameDescriptor {
    pub(crate) frame_type: FrameType,
    pub(crate) flags: FrameFlags,
    pub(crate) payload: PayloadBuf,
}

impl FrameDescriptor {
    /// Start describing an unauthenticated frame of the given type with an
    /// empty payload.
    #[must_use]
    pub fn new(frame_type: FrameType) -> Self {
        Self { frame_type, flags: FrameFlags::none(), payload: PayloadBuf::empty() }
    }

    /// Set the `AUTHENTICATED` flag.
    #[must_use]
    pub fn authenticated(mut self) -> Self {
        self.flags = FrameFlags::authenticated();
        self
    }

    /// Attach a payload, copying it into the frame's fixed-capacity buffer.
    pub fn with_payload(mut self, payload: &[u8]) -> Result<Self, AcpError> {
        self.payload = PayloadBuf::from_slice(payload)?;
        Ok(self)
    }
}

/// Fixed-capacity payload buffer: up to [`MAX_PAYLOAD`] bytes, stack
/// resident, no allocation.
#[derive(Clone)]
pub struct PayloadBuf {
    bytes: [u8; MAX_PAYLOAD],
    len: u16,
}

impl PayloadBuf {
    /// An empty payload.
    #[must_use]
    pub const fn empty() -> Self {
        Self { bytes: [0u8; MAX_PAYLOAD], len: 0 }
    }

    /// Copy `data` into a new payload buffer, rejecting anything over
    /// [`MAX_PAYLOAD`] bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self, AcpError> {
        if data.len() > MAX_PAYLOAD {
            return Err(AcpError::Argument(ArgumentError::PayloadTooLarge {
                size: data.len(),
                max: MAX_PAYLOAD,
            }));
        }
        let mut bytes = [0u8; MAX_PAYLOAD];
        bytes[..data.len()].copy_from_slice(data);
        #[allow(clippy::cast_possible_truncation)]
        let len = data.len() as u16;
        Ok(Self { bytes, len })
    }

    /// The payload bytes in use.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// Number of payload bytes in use.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Copy a heap-allocated buffer into a payload, for callers who have
    /// `alloc` and would rather not build a `&[u8]` by hand. Behaves exactly
    /// like [`Self::from_slice`].
    #[cfg(feature = "alloc")]
    pub fn from_vec(data: &alloc::vec::Vec<u8>) -> Result<Self, AcpError> {
        Self::from_slice(data)
    }
}

// Hand-written: a [u8; MAX_PAYLOAD] array blocks #[derive(Debug)], and we
// never want to print payload bytes verbatim (they may carry authenticated
// command content) — only the length.
impl fmt::Debug for PayloadBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadBuf").field("len", &self.len).finish_non_exhaustive()
    }
}

impl PartialEq for PayloadBuf {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for PayloadBuf {}

/// A fully-parsed ACP frame, as produced by decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Protocol version the frame was parsed with.
    pub version: u8,
    /// Frame type.
    pub frame_type: FrameType,
    /// Frame flags.
    pub flags: FrameFlags,
    /// Transmit sequence number. Zero for unauthenticated frames.
    pub sequence: u32,
    /// Payload bytes.
    pub payload: PayloadBuf,
}

impl Frame {
    /// Whether this frame carries the `AUTHENTICATED` flag.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.flags.is_authenticated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_type_round_trips() {
        for t in [FrameType::Telemetry, FrameType::Command, FrameType::System] {
            assert_eq!(FrameType::try_from(t.to_u8()).unwrap(), t);
        }
    }

    #[test]
    fn frame_type_rejects_reserved_value() {
        assert!(FrameType::try_from(0x00).is_err());
        assert!(FrameType::try_from(0x04).is_err());
    }

    #[test]
    fn flags_reject_reserved_bits() {
        assert!(FrameFlags::from_byte(0x02).is_err());
        assert!(FrameFlags::from_byte(0x01).is_ok());
    }

    #[test]
    fn payload_buf_rejects_oversize() {
        let data = vec![0u8; MAX_PAYLOAD + 1];
        assert!(PayloadBuf::from_slice(&data).is_err());
    }

    #[test]
    fn payload_buf_boundary_sizes_accepted() {
        for size in [0, 1, 255, 256, 1023, 1024] {
            let data = vec![0xAAu8; size];
            let buf = PayloadBuf::from_slice(&data).unwrap();
            assert_eq!(buf.as_slice(), data.as_slice());
        }
    }
}
