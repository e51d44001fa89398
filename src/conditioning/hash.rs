//! Cryptographic whitening of sampled entropy.
//!
//! Uses a 256-bit hash to destroy any residual structure or bias left by
//! raster sampling before the material reaches the DRBG.

use std::sync::Arc;

use blake3::Hasher as Blake3Hasher;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, Zeroizing};

use super::sample;
use crate::noise::{Clock, NoiseSource};
use crate::simulation::PixelBuffer;

/// Supported hash algorithms for whitening.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-256 - the reference whitening hash.
    #[default]
    Sha256,
    /// BLAKE3 - faster, same output width.
    Blake3,
}

impl HashAlgorithm {
    /// Hashes the concatenation of `parts` into a 32-byte digest.
    pub fn digest(self, parts: &[&[u8]]) -> [u8; 32] {
        match self {
            HashAlgorithm::Sha256 => {
                let mut hasher = Sha256::new();
                for part in parts {
                    hasher.update(part);
                }
                hasher.finalize().into()
            }
            HashAlgorithm::Blake3 => {
                let mut hasher = Blake3Hasher::new();
                for part in parts {
                    hasher.update(part);
                }
                *hasher.finalize().as_bytes()
            }
        }
    }
}

/// Whitened seed material.
///
/// Fixed-size hash output, wiped from memory when dropped.
#[derive(Clone)]
pub struct WhitenedSeed {
    data: [u8; 32],
}

impl WhitenedSeed {
    /// Returns the seed bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.data
    }
}

impl Drop for WhitenedSeed {
    fn drop(&mut self) {
        self.data.zeroize();
    }
}

impl PartialEq for WhitenedSeed {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl std::fmt::Debug for WhitenedSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhitenedSeed").finish_non_exhaustive()
    }
}

/// Samples frames and whitens byte blocks.
///
/// Holds the process-level noise and clock capabilities so every sample
/// draws its jitter and fresh randomness from the injected sources.
pub struct Conditioner {
    algorithm: HashAlgorithm,
    noise: Arc<dyn NoiseSource>,
    clock: Arc<dyn Clock>,
}

impl Conditioner {
    /// Creates a conditioner with the specified algorithm and sources.
    pub fn new(algorithm: HashAlgorithm, noise: Arc<dyn NoiseSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            algorithm,
            noise,
            clock,
        }
    }

    /// Returns the whitening algorithm.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Extracts raw sample bytes from a frame.
    ///
    /// Grayscale values on a `quality`-pixel grid, followed by 8 bytes of
    /// monotonic clock (least significant first) and 32 fresh random bytes.
    /// An absent frame yields an empty sample. The returned buffer is wiped
    /// when dropped.
    pub fn sample(&self, buffer: Option<&PixelBuffer>, quality: usize) -> Zeroizing<Vec<u8>> {
        sample::sample(buffer, quality, self.clock.as_ref(), self.noise.as_ref())
    }

    /// Hashes `bytes` into a fixed 32-byte seed. Empty input is valid.
    pub fn whiten(&self, bytes: &[u8]) -> WhitenedSeed {
        let seed = WhitenedSeed {
            data: self.algorithm.digest(&[bytes]),
        };

        tracing::trace!(input_bytes = bytes.len(), "Whitened entropy block");

        seed
    }

    /// Hashes the concatenation of two blocks without materializing it.
    pub fn whiten_pair(&self, first: &[u8], second: &[u8]) -> WhitenedSeed {
        WhitenedSeed {
            data: self.algorithm.digest(&[first, second]),
        }
    }
}

impl std::fmt::Debug for Conditioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conditioner")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}
