//! Statistical checks over generated output.
//!
//! These are sanity checks for diagnostics and tests, not cryptographic
//! proofs of randomness.

mod statistics;

pub use statistics::{
    autocorrelation, bit_bias, chi_square, histogram, shannon_entropy, ByteStatistics,
    Significance, BYTE_DEGREES_OF_FREEDOM,
};
