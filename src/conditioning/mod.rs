//! Entropy conditioning.
//!
//! Turns rendered frames into raw sample bytes (downsampled grayscale plus
//! timing jitter plus fresh randomness) and whitens byte blocks through a
//! 256-bit cryptographic hash before they reach the DRBG.

mod hash;
mod sample;

pub use hash::{Conditioner, HashAlgorithm, WhitenedSeed};
pub use sample::{sample_len, JITTER_BYTES, NOISE_BYTES};
