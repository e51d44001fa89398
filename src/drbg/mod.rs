//! Deterministic random bit generation.
//!
//! A simplified HMAC-SHA256 DRBG driven by whitened lamp samples.

mod hmac_drbg;

pub use hmac_drbg::{HmacDrbg, OUTLEN};
