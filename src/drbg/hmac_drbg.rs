//! Simplified HMAC-SHA256 DRBG.
//!
//! # Construction
//!
//! State is a key `K` and a value `V`, each one HMAC-SHA256 output wide.
//! The update primitive is
//!
//! ```text
//! K = HMAC(K, V || 0x00 || material)
//! V = HMAC(K, V)
//! if material present:
//!     K = HMAC(K, V || 0x01 || material)
//!     V = HMAC(K, V)
//! ```
//!
//! and `generate(n)` chains `V = HMAC(K, V)` until `n` bytes are produced,
//! then runs the update with no material for backtracking resistance.
//!
//! This is deliberately not SP 800-90A HMAC_DRBG: there is no reseed
//! counter, no per-request output ceiling and no personalization string.
//! Output sequences are pinned by tests and must not drift.

use hmac::{Hmac, Mac};
use rand_core::{CryptoRng, RngCore};
use sha2::Sha256;
use zeroize::Zeroize;

type HmacSha256 = Hmac<Sha256>;

const SEPARATOR_0: &[u8] = &[0x00];
const SEPARATOR_1: &[u8] = &[0x01];

/// Width of `K`, `V` and every HMAC output, in bytes.
pub const OUTLEN: usize = 32;

/// A keyed `(K, V)` state machine expanding seed material into bytes.
///
/// Every method that mutates state takes `&mut self`, so a call is atomic
/// with respect to any other caller holding the same generator behind a
/// lock. Both halves of the state are wiped on drop.
pub struct HmacDrbg {
    k: [u8; OUTLEN],
    v: [u8; OUTLEN],
}

impl HmacDrbg {
    /// Instantiates the generator from `seed`.
    ///
    /// `K` starts as all `0x00`, `V` as all `0x01`, then the update runs
    /// with `seed` as present material (even when it is empty).
    pub fn new(seed: &[u8]) -> Self {
        let mut drbg = Self {
            k: [0x00; OUTLEN],
            v: [0x01; OUTLEN],
        };
        drbg.update(Some(seed));
        drbg
    }

    /// Mixes `material` into the state.
    ///
    /// `None` runs only the first half of the update; `Some(&[])` runs
    /// both halves.
    pub fn reseed(&mut self, material: Option<&[u8]>) {
        self.update(material);
        tracing::trace!(
            material_bytes = material.map(<[u8]>::len),
            "DRBG reseeded"
        );
    }

    /// Returns exactly `n` pseudorandom bytes.
    pub fn generate(&mut self, n: usize) -> Vec<u8> {
        let mut out = vec![0u8; n];
        self.fill(&mut out);
        out
    }

    /// Fills `dest` completely, then advances the state.
    pub fn fill(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(OUTLEN) {
            self.v = mac(&self.k, &[self.v.as_slice()]);
            chunk.copy_from_slice(&self.v[..chunk.len()]);
        }
        self.update(None);
    }

    fn update(&mut self, material: Option<&[u8]>) {
        let extra = material.unwrap_or_default();

        self.k = mac(&self.k, &[self.v.as_slice(), SEPARATOR_0, extra]);
        self.v = mac(&self.k, &[self.v.as_slice()]);

        if material.is_some() {
            self.k = mac(&self.k, &[self.v.as_slice(), SEPARATOR_1, extra]);
            self.v = mac(&self.k, &[self.v.as_slice()]);
        }
    }
}

/// HMAC-SHA256 over the concatenation of `parts`.
fn mac(key: &[u8; OUTLEN], parts: &[&[u8]]) -> [u8; OUTLEN] {
    let mut mac =
        <HmacSha256 as Mac>::new_from_slice(key).expect("HMAC-SHA256 accepts keys of any length");
    for part in parts {
        mac.update(part);
    }
    mac.finalize().into_bytes().into()
}

impl Drop for HmacDrbg {
    fn drop(&mut self) {
        self.k.zeroize();
        self.v.zeroize();
    }
}

impl std::fmt::Debug for HmacDrbg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacDrbg").finish_non_exhaustive()
    }
}

impl RngCore for HmacDrbg {
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        self.fill(&mut buf);
        u32::from_le_bytes(buf)
    }

    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        self.fill(&mut buf);
        u64::from_le_bytes(buf)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.fill(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill(dest);
        Ok(())
    }
}

impl CryptoRng for HmacDrbg {}
