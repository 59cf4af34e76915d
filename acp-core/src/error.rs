//! Error taxonomy for the ACP core.
//!
//! Every fallible operation returns [`AcpError`] or a component-scoped error
//! that converts into it. Nothing is caught or hidden inside the core: all
//! errors are returned synchronously to the caller, and [`AcpError::Incomplete`]
//! is the only variant that does not advance any session state.

use core::fmt;

/// Top-level error type returned by every fallible ACP core operation.
///
/// Variants are grouped to mirror the protocol's error taxonomy exactly:
/// argument validation, incompleteness (recoverable), framing, integrity,
/// authenticity, session, resource, and internal invariant violations.
/// `CrcMismatch` and `AuthFailed` are always distinguishable by the caller,
/// as required for audit/log differentiation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AcpError {
    /// Caller-supplied argument was invalid (bad type, oversized payload,
    /// undersized buffer, ...).
    #[error("invalid argument: {0}")]
    Argument(#[from] ArgumentError),

    /// Not enough bytes were available to complete a frame. Recoverable:
    /// the caller should read more bytes and retry. No state advances.
    #[error("need more bytes to complete frame")]
    Incomplete,

    /// The byte stream was structurally malformed (missing delimiter,
    /// invalid COBS encoding, inconsistent length fields).
    #[error("framing error: {0}")]
    Framing(#[from] FramingError),

    /// CRC-16 verification failed. Distinct from [`FramingError`] so callers
    /// can tell data corruption apart from protocol malformation.
    #[error("CRC-16 mismatch")]
    CrcMismatch,

    /// Authentication policy or cryptographic verification failed.
    #[error("authenticity error: {0}")]
    Authenticity(#[from] AuthError),

    /// Session state does not permit the requested operation.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// An external collaborator (keystore, ...) reported failure.
    #[error("resource error: {0}")]
    Resource(ResourceMessage),

    /// An invariant that should be unreachable was violated. Indicates a
    /// bug in the core rather than bad input.
    #[error("internal invariant violation: {0}")]
    Internal(&'static str),
}

/// Fixed-capacity message carried by [`AcpError::Resource`].
///
/// Resource errors originate from external collaborators (the keystore)
/// whose failure messages are caller-defined; a small fixed buffer avoids
/// requiring an allocator on the error path while still carrying useful
/// context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMessage {
    bytes: [u8; Self::CAPACITY],
    len: usize,
}

impl ResourceMessage {
    /// Maximum number of bytes retained from the original message.
    pub const CAPACITY: usize = 64;

    /// Build a resource message, truncating to [`Self::CAPACITY`] bytes.
    #[must_use]
    pub fn new(message: &str) -> Self {
        let src = message.as_bytes();
        let len = src.len().min(Self::CAPACITY);
        let mut bytes = [0u8; Self::CAPACITY];
        bytes[..len].copy_from_slice(&src[..len]);
        Self { bytes, len }
    }

    /// The message, as far as it was retained.
    #[must_use]
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.bytes[..self.len]).unwrap_or("<invalid utf-8>")
    }
}

impl fmt::Display for ResourceMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Argument-validation failures, checked before any parsing or cryptography.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    /// Session key material was empty.
    #[error("zero-length key")]
    ZeroLengthKey,

    /// An unrecognized frame type byte.
    #[error("invalid frame type: {0:#04x}")]
    InvalidFrameType(u8),

    /// A reserved flag bit was set.
    #[error("invalid flags: {0:#04x}")]
    InvalidFlags(u8),

    /// Payload exceeded [`crate::MAX_PAYLOAD`].
    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge {
        /// Size the caller requested.
        size: usize,
        /// Maximum permitted size.
        max: usize,
    },

    /// Destination buffer was too small for the operation's output.
    #[error("buffer too small: need {needed} bytes, have {actual}")]
    BufferTooSmall {
        /// Bytes required.
        needed: usize,
        /// Bytes actually available.
        actual: usize,
    },
}

/// Frame-structure failures: everything short of CRC/authenticity.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FramingError {
    /// The candidate frame did not start with a `0x00` delimiter.
    #[error("missing leading delimiter")]
    MissingDelimiter,

    /// COBS decoding encountered a malformed code byte or truncated block.
    #[error("COBS decode violation")]
    CobsViolation,

    /// Decoded length was inconsistent with the declared header/payload
    /// sizes.
    #[error("malformed frame: {0}")]
    Malformed(&'static str),
}

/// Authenticity-policy and cryptographic-verification failures.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// A command frame was encoded or decoded without the `AUTHENTICATED`
    /// flag set. Commands MUST be authenticated end-to-end.
    #[error("authentication required")]
    AuthRequired,

    /// The HMAC-SHA256 tag did not match.
    #[error("authentication failed: tag mismatch")]
    AuthFailed,

    /// The sequence number was rejected by the replay window.
    #[error("replayed or out-of-window sequence number")]
    Replay,
}

/// Session lifecycle failures.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The operation requires an initialized session but none was
    /// provided, or the session was never initialized.
    #[error("session not initialized")]
    NotInitialized,

    /// The session exceeded a caller-supplied maximum lifetime. Only
    /// evaluated when the caller asks via [`crate::Session::is_expired`].
    #[error("session expired")]
    Expired,

    /// The keystore had no key for the requested key identifier.
    #[error("key not found for key id {0}")]
    KeyNotFound(u32),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, AcpError>;
