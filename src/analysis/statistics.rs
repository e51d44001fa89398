//! Byte-level statistics for generated output.
//!
//! These are sanity checks to catch gross failures (a stuck lamp, a broken
//! mixer), not proofs of randomness. Passing them is necessary but not
//! sufficient.

/// Degrees of freedom of a byte-frequency chi-square test.
pub const BYTE_DEGREES_OF_FREEDOM: u32 = 255;

/// Significance levels with precomputed critical values for 255 degrees of
/// freedom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Significance {
    /// alpha = 0.01
    OnePercent,
    /// alpha = 0.001
    PointOnePercent,
    /// alpha = 0.0001
    PointZeroOnePercent,
}

impl Significance {
    /// Upper critical value of chi-square with 255 degrees of freedom.
    pub fn critical_value(self) -> f64 {
        match self {
            Significance::OnePercent => 310.46,
            Significance::PointOnePercent => 330.55,
            Significance::PointZeroOnePercent => 347.72,
        }
    }
}

/// Statistical summary of a byte sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct ByteStatistics {
    /// Shannon entropy in bits per byte (0 to 8).
    pub shannon_per_byte: f64,
    /// Chi-square statistic of the byte histogram against uniform.
    pub chi_square: f64,
    /// Bit bias (fraction of ones minus 0.5).
    pub bit_bias: f64,
    /// Lag-1 autocorrelation.
    pub autocorrelation: f64,
    /// Number of bytes analyzed.
    pub sample_size: usize,
}

impl ByteStatistics {
    /// Runs all statistics over `data`.
    pub fn analyze(data: &[u8]) -> Self {
        let histogram = histogram(data);
        Self {
            shannon_per_byte: shannon_from_histogram(&histogram, data.len()),
            chi_square: chi_square_from_histogram(&histogram, data.len()),
            bit_bias: bit_bias(data),
            autocorrelation: autocorrelation(data),
            sample_size: data.len(),
        }
    }

    /// Total Shannon entropy estimate in bits (per-byte entropy times
    /// length).
    pub fn shannon_bits(&self) -> f64 {
        self.shannon_per_byte * self.sample_size as f64
    }

    /// Returns true if the byte histogram is consistent with uniform at the
    /// given significance level.
    pub fn looks_uniform(&self, significance: Significance) -> bool {
        self.chi_square < significance.critical_value()
    }
}

/// Counts occurrences of every byte value.
pub fn histogram(data: &[u8]) -> [u64; 256] {
    let mut counts = [0u64; 256];
    for &b in data {
        counts[b as usize] += 1;
    }
    counts
}

/// Shannon entropy in bits per byte.
pub fn shannon_entropy(data: &[u8]) -> f64 {
    shannon_from_histogram(&histogram(data), data.len())
}

/// Chi-square statistic of the byte histogram against a uniform
/// distribution over 256 values.
pub fn chi_square(data: &[u8]) -> f64 {
    chi_square_from_histogram(&histogram(data), data.len())
}

/// Fraction of set bits minus 0.5, in [-0.5, 0.5].
pub fn bit_bias(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let ones: u64 = data.iter().map(|b| u64::from(b.count_ones())).sum();
    ones as f64 / (data.len() * 8) as f64 - 0.5
}

/// Lag-1 autocorrelation of byte values.
///
/// Constant input is reported as perfectly correlated.
pub fn autocorrelation(data: &[u8]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }

    let n = data.len() as f64;
    let mean: f64 = data.iter().map(|&b| f64::from(b)).sum::<f64>() / n;
    let variance: f64 = data.iter().map(|&b| (f64::from(b) - mean).powi(2)).sum();

    if variance == 0.0 {
        return 1.0;
    }

    let covariance: f64 = data
        .windows(2)
        .map(|w| (f64::from(w[0]) - mean) * (f64::from(w[1]) - mean))
        .sum();

    covariance / variance
}

fn shannon_from_histogram(counts: &[u64; 256], len: usize) -> f64 {
    if len == 0 {
        return 0.0;
    }
    let n = len as f64;
    counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / n;
            -p * p.log2()
        })
        .sum()
}

fn chi_square_from_histogram(counts: &[u64; 256], len: usize) -> f64 {
    if len == 0 {
        return 0.0;
    }
    let expected = len as f64 / 256.0;
    counts
        .iter()
        .map(|&c| {
            let d = c as f64 - expected;
            d * d / expected
        })
        .sum()
}
