//! A single soft blob.

use super::Rgb;

/// One blob in the field.
///
/// Position and radius are relative to the canvas: `(0, 0)` is the top-left
/// corner and `(1, 1)` the bottom-right. Velocity is in canvas units per
/// second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blob {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Relative radius in (0, 0.5).
    pub radius: f64,
    pub color: Rgb,
}

impl Blob {
    /// Returns true if the center lies inside the unit square.
    pub fn is_inside(&self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }

    /// Integrates one tick of motion.
    ///
    /// `jitter` is added to the velocity before damping. After moving, an
    /// axis that left [0, 1] is clamped to the wall and its velocity is
    /// reflected inward with `restitution`.
    pub(crate) fn advance(&mut self, jitter: (f64, f64), damping: f64, dt: f64, restitution: f64) {
        self.vx = (self.vx + jitter.0) * damping;
        self.vy = (self.vy + jitter.1) * damping;

        self.x += self.vx * dt;
        self.y += self.vy * dt;

        (self.x, self.vx) = bounce(self.x, self.vx, restitution);
        (self.y, self.vy) = bounce(self.y, self.vy, restitution);
    }
}

fn bounce(pos: f64, vel: f64, restitution: f64) -> (f64, f64) {
    if pos < 0.0 {
        (0.0, vel.abs() * restitution)
    } else if pos > 1.0 {
        (1.0, -vel.abs() * restitution)
    } else {
        (pos, vel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(x: f64, y: f64, vx: f64, vy: f64) -> Blob {
        Blob {
            x,
            y,
            vx,
            vy,
            radius: 0.1,
            color: Rgb::RED,
        }
    }

    #[test]
    fn test_free_flight() {
        let mut b = blob(0.5, 0.5, 0.1, -0.1);
        b.advance((0.0, 0.0), 1.0, 1.0, 0.6);

        assert!((b.x - 0.6).abs() < 1e-12);
        assert!((b.y - 0.4).abs() < 1e-12);
        assert_eq!((b.vx, b.vy), (0.1, -0.1));
    }

    #[test]
    fn test_reflects_off_right_wall() {
        let mut b = blob(0.95, 0.5, 1.0, 0.0);
        b.advance((0.0, 0.0), 1.0, 1.0, 0.6);

        assert_eq!(b.x, 1.0);
        assert!((b.vx + 0.6).abs() < 1e-12);
        assert!(b.is_inside());
    }

    #[test]
    fn test_reflects_off_top_wall() {
        let mut b = blob(0.5, 0.05, 0.0, -1.0);
        b.advance((0.0, 0.0), 1.0, 1.0, 0.6);

        assert_eq!(b.y, 0.0);
        assert!((b.vy - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_damping_applies_after_jitter() {
        let mut b = blob(0.5, 0.5, 0.0, 0.0);
        b.advance((0.01, -0.01), 0.5, 0.0, 0.6);

        assert!((b.vx - 0.005).abs() < 1e-12);
        assert!((b.vy + 0.005).abs() < 1e-12);
    }
}
