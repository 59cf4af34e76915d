//! HMAC-SHA256 (RFC 2104) with 16-byte ACP tag truncation and constant-time
//! comparison.

use zeroize::Zeroize;

use crate::sha256::{DIGEST_SIZE, Sha256};

const BLOCK_SIZE: usize = 64;
const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5c;

/// Length, in bytes, of the truncated ACP authentication tag.
pub const TAG_SIZE: usize = 16;

/// Streaming HMAC-SHA256. Keys longer than the block size are pre-hashed;
/// shorter keys are zero-padded, per RFC 2104.
pub struct HmacSha256 {
    inner: Sha256,
    outer_key_pad: [u8; BLOCK_SIZE],
}

impl Drop for HmacSha256 {
    fn drop(&mut self) {
        self.outer_key_pad.zeroize();
    }
}

impl HmacSha256 {
    /// Initialize HMAC-SHA256 with the given key.
    pub fn new(key: &[u8]) -> Self {
        let mut block_key = [0u8; BLOCK_SIZE];
        if key.len() > BLOCK_SIZE {
            let hashed = crate::sha256::sha256(key);
            block_key[..DIGEST_SIZE].copy_from_slice(&hashed);
        } else {
            block_key[..key.len()].copy_from_slice(key);
        }

        let mut inner_key_pad = [0u8; BLOCK_SIZE];
        let mut outer_key_pad = [0u8; BLOCK_SIZE];
        for i in 0..BLOCK_SIZE {
            inner_key_pad[i] = block_key[i] ^ IPAD;
            outer_key_pad[i] = block_key[i] ^ OPAD;
        }
        block_key.zeroize();

        let mut inner = Sha256::new();
        inner.update(&inner_key_pad);
        inner_key_pad.zeroize();

        Self { inner, outer_key_pad }
    }

    /// Fold additional message bytes into the running MAC.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Finalize and return the full 32-byte HMAC-SHA256 digest.
    #[must_use]
    pub fn finalize(self) -> [u8; DIGEST_SIZE] {
        let inner_digest = self.inner.finalize();
        let mut outer = Sha256::new();
        outer.update(&self.outer_key_pad);
        outer.update(&inner_digest);
        outer.finalize()
    }
}

/// One-shot HMAC-SHA256 over a complete message.
#[must_use]
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; DIGEST_SIZE] {
    let mut mac = HmacSha256::new(key);
    mac.update(data);
    mac.finalize()
}

/// One-shot HMAC-SHA256, truncated to the first [`TAG_SIZE`] bytes — the
/// authentication tag format used on the ACP wire.
#[must_use]
pub fn hmac_sha256_tag(key: &[u8], data: &[u8]) -> [u8; TAG_SIZE] {
    let digest = hmac_sha256(key, data);
    let mut tag = [0u8; TAG_SIZE];
    tag.copy_from_slice(&digest[..TAG_SIZE]);
    tag
}

/// Constant-time byte comparison.
///
/// XOR-accumulates every byte pair and never short-circuits, so execution
/// time does not depend on where (or whether) `a` and `b` first differ.
/// Returns `0` iff `a == b` and the lengths match. A length mismatch is
/// checked up front (lengths are not secret in ACP — tags are always
/// [`TAG_SIZE`] bytes) and reported as unequal without touching the buffers.
#[must_use]
pub fn ct_eq(a: &[u8], b: &[u8]) -> u8 {
    if a.len() != b.len() {
        return 1;
    }
    let mut diff: u8 = 0;
    for i in 0..a.len() {
        diff |= a[i] ^ b[i];
    }
    diff
}
