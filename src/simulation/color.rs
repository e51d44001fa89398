//! Blob colors and color assignment modes.

use rand_core::RngCore;
use serde::{Deserialize, Serialize};

use super::field::unit;

/// An opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const YELLOW: Rgb = Rgb::new(255, 255, 0);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);
    pub const MAGENTA: Rgb = Rgb::new(255, 0, 255);
    pub const CYAN: Rgb = Rgb::new(0, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from hue, saturation and brightness, each in [0, 1].
    pub fn from_hsb(hue: f64, saturation: f64, brightness: f64) -> Self {
        let channel = |v: f64| (v * 255.0 + 0.5).clamp(0.0, 255.0) as u8;

        if saturation <= 0.0 {
            let v = channel(brightness);
            return Self::new(v, v, v);
        }

        let h = (hue - hue.floor()) * 6.0;
        let f = h - h.floor();
        let p = brightness * (1.0 - saturation);
        let q = brightness * (1.0 - saturation * f);
        let t = brightness * (1.0 - saturation * (1.0 - f));

        let (r, g, b) = match h as u32 {
            0 => (brightness, t, p),
            1 => (q, brightness, p),
            2 => (p, brightness, t),
            3 => (p, q, brightness),
            4 => (t, p, brightness),
            _ => (brightness, p, q),
        };
        Self::new(channel(r), channel(g), channel(b))
    }

    /// Returns (hue, saturation, brightness), each in [0, 1].
    pub fn to_hsb(self) -> (f64, f64, f64) {
        let (r, g, b) = (f64::from(self.r), f64::from(self.g), f64::from(self.b));
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);

        let brightness = max / 255.0;
        let saturation = if max > 0.0 { (max - min) / max } else { 0.0 };
        if saturation == 0.0 {
            return (0.0, 0.0, brightness);
        }

        let span = max - min;
        let rc = (max - r) / span;
        let gc = (max - g) / span;
        let bc = (max - b) / span;
        let sector = if r == max {
            bc - gc
        } else if g == max {
            2.0 + rc - bc
        } else {
            4.0 + gc - rc
        };
        let mut hue = sector / 6.0;
        if hue < 0.0 {
            hue += 1.0;
        }
        (hue, saturation, brightness)
    }

    /// Scales every channel by `factor`, saturating at white.
    pub fn scaled(self, factor: f64) -> Self {
        let channel = |v: u8| (f64::from(v) * factor).round().clamp(0.0, 255.0) as u8;
        Self::new(channel(self.r), channel(self.g), channel(self.b))
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(c: Rgb) -> Self {
        [c.r, c.g, c.b]
    }
}

/// How blobs are colored when a field is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Every blob gets an independent warm hue, saturation and brightness.
    #[default]
    RandomPerBlob,
    /// All blobs share one hue with randomized brightness.
    Single(Rgb),
    /// Blobs alternate between two hues, each with randomized brightness.
    Alternating(Rgb, Rgb),
}

impl ColorMode {
    /// Builds the mode implied by zero, one or two fixed colors.
    ///
    /// Colors beyond the second are ignored.
    pub fn from_fixed(colors: &[Rgb]) -> Self {
        match colors {
            [] => Self::RandomPerBlob,
            [only] => Self::Single(*only),
            [first, second, ..] => Self::Alternating(*first, *second),
        }
    }

    /// Picks the color for the blob at `index`, drawing from `rng`.
    pub(crate) fn pick(&self, index: usize, rng: &mut impl RngCore) -> Rgb {
        match *self {
            Self::RandomPerBlob => {
                let hue = unit(rng) * 0.15 + 0.02;
                let saturation = 0.7 + unit(rng) * 0.3;
                let brightness = 0.6 + unit(rng) * 0.4;
                Rgb::from_hsb(hue, saturation, brightness)
            }
            Self::Single(base) => with_random_brightness(base, rng),
            Self::Alternating(even, odd) => {
                let base = if index % 2 == 0 { even } else { odd };
                with_random_brightness(base, rng)
            }
        }
    }
}

fn with_random_brightness(base: Rgb, rng: &mut impl RngCore) -> Rgb {
    let (hue, saturation, _) = base.to_hsb();
    Rgb::from_hsb(hue, saturation, 0.6 + unit(rng) * 0.4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    #[test]
    fn test_hsb_primaries() {
        assert_eq!(Rgb::from_hsb(0.0, 1.0, 1.0), Rgb::RED);
        assert_eq!(Rgb::from_hsb(1.0 / 3.0, 1.0, 1.0), Rgb::GREEN);
        assert_eq!(Rgb::from_hsb(2.0 / 3.0, 1.0, 1.0), Rgb::BLUE);
        assert_eq!(Rgb::from_hsb(0.5, 0.0, 0.5), Rgb::new(128, 128, 128));
    }

    #[test]
    fn test_hsb_round_trip_keeps_hue() {
        for color in [Rgb::RED, Rgb::YELLOW, Rgb::CYAN, Rgb::MAGENTA] {
            let (h, s, b) = color.to_hsb();
            assert_eq!(Rgb::from_hsb(h, s, b), color);
        }
    }

    #[test]
    fn test_from_fixed() {
        assert_eq!(ColorMode::from_fixed(&[]), ColorMode::RandomPerBlob);
        assert_eq!(ColorMode::from_fixed(&[Rgb::RED]), ColorMode::Single(Rgb::RED));
        assert_eq!(
            ColorMode::from_fixed(&[Rgb::RED, Rgb::BLUE, Rgb::GREEN]),
            ColorMode::Alternating(Rgb::RED, Rgb::BLUE)
        );
    }

    #[test]
    fn test_single_mode_keeps_hue() {
        let mut rng = ChaCha20Rng::from_seed([3u8; 32]);
        let mode = ColorMode::Single(Rgb::BLUE);

        for i in 0..8 {
            let c = mode.pick(i, &mut rng);
            assert_eq!((c.r, c.g), (0, 0));
            assert!(c.b >= 153, "brightness below 0.6: {c:?}");
        }
    }

    #[test]
    fn test_alternating_mode() {
        let mut rng = ChaCha20Rng::from_seed([3u8; 32]);
        let mode = ColorMode::Alternating(Rgb::RED, Rgb::GREEN);

        let even = mode.pick(0, &mut rng);
        let odd = mode.pick(1, &mut rng);
        assert!(even.r > 0 && even.g == 0);
        assert!(odd.g > 0 && odd.r == 0);
    }

    #[test]
    fn test_random_mode_is_warm() {
        let mut rng = ChaCha20Rng::from_seed([9u8; 32]);
        for i in 0..32 {
            let c = ColorMode::RandomPerBlob.pick(i, &mut rng);
            // hues 0.02..0.17 are reds through oranges
            assert!(c.b <= c.r && c.b <= c.g, "not warm: {c:?}");
        }
    }
}
