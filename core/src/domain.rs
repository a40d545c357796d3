use na::Vector2;
use serde::{Deserialize, Serialize};
use crate::{Error, Result};

/// Rectangular periodic box of size `SX × SY` anchored at the origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationBox {
    size: Vector2<f64>,
    half: Vector2<f64>,
}

impl SimulationBox {
    /// Create box with sides `sx` and `sy`.
    ///
    /// # Errors
    ///
    /// [Error::InvalidConfig] if a side is not a positive finite number.
    ///
    /// # Examples
    ///
    /// ```
    /// # use brownian_core::SimulationBox;
    /// let bb = SimulationBox::new(20.0, 30.0).unwrap();
    /// assert_eq!(bb.size().y, 30.0);
    /// assert_eq!(bb.half().x, 10.0);
    /// assert!(SimulationBox::new(0.0, 30.0).is_err());
    /// ```
    pub fn new(sx: f64, sy: f64) -> Result<Self> {
        if !(sx.is_finite() && sy.is_finite() && sx > 0.0 && sy > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "box sides must be positive and finite, got {sx} x {sy}"
            )));
        }
        Ok(Self {
            size: Vector2::new(sx, sy),
            half: Vector2::new(sx / 2.0, sy / 2.0),
        })
    }

    pub fn size(&self) -> Vector2<f64> {
        self.size
    }

    pub fn half(&self) -> Vector2<f64> {
        self.half
    }

    /// Shortest periodic image of `a - b`.
    ///
    /// Each axis is corrected at most once, so the result is only the true
    /// minimum image when `a` and `b` are both inside the box. Interaction
    /// code additionally relies on the box being at least twice the neighbor
    /// cutoff in both directions.
    pub fn minimum_image_delta(&self, a: &Vector2<f64>, b: &Vector2<f64>) -> Vector2<f64> {
        let mut delta = a - b;
        if delta.x > self.half.x {
            delta.x -= self.size.x;
        } else if delta.x < -self.half.x {
            delta.x += self.size.x;
        }
        if delta.y > self.half.y {
            delta.y -= self.size.y;
        } else if delta.y < -self.half.y {
            delta.y += self.size.y;
        }
        delta
    }

    /// Bring a position that left the box by less than one box length back inside.
    ///
    /// A coordinate sitting exactly on the far edge is left there, which keeps
    /// the operation idempotent under rounding.
    pub fn wrap_position(&self, position: &Vector2<f64>) -> Vector2<f64> {
        let mut wrapped = *position;
        if wrapped.x > self.size.x {
            wrapped.x -= self.size.x;
        } else if wrapped.x < 0.0 {
            wrapped.x += self.size.x;
        }
        if wrapped.y > self.size.y {
            wrapped.y -= self.size.y;
        } else if wrapped.y < 0.0 {
            wrapped.y += self.size.y;
        }
        wrapped
    }
}
