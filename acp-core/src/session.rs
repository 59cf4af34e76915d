//! Session state: key material, TX sequence generation, and the RX replay
//! window.
//!
//! A [`Session`] is owned by the caller and is never retained or shared
//! across threads internally — mutating operations take `&mut self`, the
//! same discipline the teacher's `SymmetricRatchet`/`Sequencer` use for
//! their own monotonic counters.

use zeroize::Zeroize;

use crate::error::SessionError;
use crate::AcpError;

/// Width, in sequence numbers, of the sliding replay window.
pub const REPLAY_WINDOW_WIDTH: u32 = 64;

/// Sliding replay-detection window over the last
/// [`REPLAY_WINDOW_WIDTH`] accepted sequence numbers.
///
/// Bit 0 of the bitmap corresponds to `last_accepted`; bit `k` corresponds
/// to `last_accepted - k`.
#[derive(Debug, Clone, Copy, Default, Zeroize)]
pub struct ReplayWindow {
    last_accepted: u32,
    bitmap: u64,
}

impl ReplayWindow {
    /// A fresh window that has not yet accepted any sequence number.
    #[must_use]
    pub const fn new() -> Self {
        Self { last_accepted: 0, bitmap: 0 }
    }

    /// Last accepted sequence number (0 if nothing has been accepted yet).
    #[must_use]
    pub const fn last_accepted(&self) -> u32 {
        self.last_accepted
    }

    /// Check sequence number `s` against the window and, if accepted,
    /// advance the window to include it.
    ///
    /// Implements the five-case transition table from the specification:
    /// reject 0 outright; accept unconditionally the first frame ever seen;
    /// slide the window forward for new-high sequence numbers; reject
    /// anything more than [`REPLAY_WINDOW_WIDTH`] behind the high-water
    /// mark; otherwise consult (and set) the corresponding bitmap bit.
    pub fn check_and_advance(&mut self, s: u32) -> Result<(), AcpError> {
        if s == 0 {
            return Err(AcpError::Authenticity(crate::error::AuthError::Replay));
        }

        if self.last_accepted == 0 {
            self.last_accepted = s;
            self.bitmap = 1;
            return Ok(());
        }

        if s > self.last_accepted {
            let advance = s - self.last_accepted;
            self.bitmap = if advance >= 64 { 0 } else { self.bitmap << advance };
            self.bitmap |= 1;
            self.last_accepted = s;
            return Ok(());
        }

        let behind = self.last_accepted - s;
        if behind >= REPLAY_WINDOW_WIDTH {
            tracing::debug!(sequence = s, last_accepted = self.last_accepted, "replay: too old");
            return Err(AcpError::Authenticity(crate::error::AuthError::Replay));
        }

        let bit = 1u64 << behind;
        if self.bitmap & bit != 0 {
            tracing::debug!(sequence = s, "replay: duplicate sequence rejected");
            return Err(AcpError::Authenticity(crate::error::AuthError::Replay));
        }
        self.bitmap |= bit;
        Ok(())
    }
}

/// Key material, TX sequencing, and RX replay state shared between two
/// communicating endpoints.
///
/// Key material, nonce, and window state are zeroized on [`Self::rotate`]
/// and [`Self::terminate`], and on [`Drop`] — matching the teacher's
/// zeroize-on-disposal discipline for anything carrying key material
/// (`MessageKey`'s `Drop`, `SymmetricRatchet::advance`'s in-place
/// `zeroize()` of the superseded chain key).
pub struct Session {
    key_id: u32,
    key: [u8; 32],
    nonce: u64,
    next_tx_sequence: u32,
    replay_window: ReplayWindow,
    initialized: bool,
}

impl Drop for Session {
    fn drop(&mut self) {
        self.key.zeroize();
        self.nonce.zeroize();
        self.replay_window.zeroize();
    }
}

impl Session {
    /// Initialize a session with the given key identifier, key material,
    /// and diversification nonce.
    ///
    /// `key` is copied into a fixed 32-byte slot: longer inputs are
    /// truncated, shorter inputs are zero-padded. The next TX sequence
    /// starts at 1 (0 is reserved for unauthenticated frames and is never
    /// transmitted). Fails on an empty key.
    pub fn init(key_id: u32, key: &[u8], nonce: u64) -> Result<Self, AcpError> {
        if key.is_empty() {
            return Err(AcpError::Argument(crate::error::ArgumentError::ZeroLengthKey));
        }

        let mut stored_key = [0u8; 32];
        let copy_len = key.len().min(32);
        stored_key[..copy_len].copy_from_slice(&key[..copy_len]);

        Ok(Self {
            key_id,
            key: stored_key,
            nonce,
            next_tx_sequence: 1,
            replay_window: ReplayWindow::new(),
            initialized: true,
        })
    }

    /// Key identifier this session was initialized with.
    #[must_use]
    pub const fn key_id(&self) -> u32 {
        self.key_id
    }

    /// Diversification nonce.
    #[must_use]
    pub const fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Whether the session has been initialized (and not yet terminated).
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Current key material, for HMAC computation.
    pub(crate) fn key_bytes(&self) -> Result<&[u8; 32], AcpError> {
        if !self.initialized {
            return Err(AcpError::Session(SessionError::NotInitialized));
        }
        Ok(&self.key)
    }

    /// Read-only view of the replay window, for diagnostics/tests.
    #[must_use]
    pub const fn replay_window(&self) -> &ReplayWindow {
        &self.replay_window
    }

    /// Return the next TX sequence number and advance the generator.
    ///
    /// Skips the reserved value 0 on wraparound: if the counter would wrap
    /// from `u32::MAX` to `0`, it wraps to `1` instead. Wraparound MAY be
    /// treated by the embedder as a session-exhaustion signal triggering
    /// [`Self::rotate`]; this type does not do so automatically.
    pub fn next_tx_sequence(&mut self) -> Result<u32, AcpError> {
        if !self.initialized {
            return Err(AcpError::Session(SessionError::NotInitialized));
        }
        let current = self.next_tx_sequence;
        self.next_tx_sequence = current.checked_add(1).unwrap_or(1);
        Ok(current)
    }

    /// Validate a received sequence number against the replay window and,
    /// on acceptance, advance the window.
    pub fn check_and_advance_replay(&mut self, sequence: u32) -> Result<(), AcpError> {
        if !self.initialized {
            return Err(AcpError::Session(SessionError::NotInitialized));
        }
        self.replay_window.check_and_advance(sequence)
    }

    /// Rotate key material and/or nonce, resetting TX sequencing and the
    /// replay window. The superseded key and nonce are zeroized before
    /// being overwritten.
    pub fn rotate(&mut self, new_key: Option<&[u8]>, new_nonce: Option<u64>) -> Result<(), AcpError> {
        if !self.initialized {
            return Err(AcpError::Session(SessionError::NotInitialized));
        }

        self.key.zeroize();
        if let Some(key) = new_key {
            if key.is_empty() {
                return Err(AcpError::Argument(crate::error::ArgumentError::ZeroLengthKey));
            }
            let copy_len = key.len().min(32);
            self.key[..copy_len].copy_from_slice(&key[..copy_len]);
        }

        if let Some(nonce) = new_nonce {
            self.nonce = nonce;
        }

        self.next_tx_sequence = 1;
        self.replay_window = ReplayWindow::new();

        tracing::info!(key_id = self.key_id, "session rotated");
        Ok(())
    }

    /// Securely zero all sensitive state and mark the session uninitialized.
    /// Subsequent operations on this session return
    /// [`crate::error::SessionError::NotInitialized`].
    pub fn terminate(&mut self) {
        self.key.zeroize();
        self.nonce.zeroize();
        self.replay_window.zeroize();
        self.next_tx_sequence = 0;
        self.initialized = false;
        tracing::info!(key_id = self.key_id, "session terminated");
    }

    /// Caller-evaluated expiry check: the core never reads a clock itself.
    /// Returns `true` if `now_ms - session_start_ms >= max_lifetime_ms`.
    #[must_use]
    pub fn is_expired(session_start_ms: u64, now_ms: u64, max_lifetime_ms: u64) -> bool {
        now_ms.saturating_sub(session_start_ms) >= max_lifetime_ms
    }
}
