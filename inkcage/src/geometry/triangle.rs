//! Triangle primitives and barycentric coordinates.

use crate::model::Vec2;
use super::tolerance::{EPS_AREA, EPS_DEGENERATE};

/// Twice the signed area of `abc`. Positive when `abc` turns counter-clockwise.
///
/// The factor of two is kept; every caller compares signs or ratios.
#[inline]
pub fn signed_area(a: Vec2, b: Vec2, c: Vec2) -> f64 {
    (b - a).cross(c - a)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub a: Vec2,
    pub b: Vec2,
    pub c: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Barycentric {
    pub u: f64,
    pub v: f64,
    pub w: f64,
}

impl Barycentric {
    pub fn is_inside(&self) -> bool {
        self.u >= 0.0 && self.v >= 0.0 && self.w >= 0.0
    }
}

impl Triangle {
    pub const fn new(a: Vec2, b: Vec2, c: Vec2) -> Self {
        Triangle { a, b, c }
    }

    pub fn area(&self) -> f64 {
        0.5 * signed_area(self.a, self.b, self.c).abs()
    }

    pub fn centroid(&self) -> Vec2 {
        Vec2::new((self.a.x + self.b.x + self.c.x) / 3.0, (self.a.y + self.b.y + self.c.y) / 3.0)
    }

    pub fn is_degenerate(&self) -> bool {
        signed_area(self.a, self.b, self.c).abs() <= EPS_AREA
    }

    /// Barycentric coordinates of `p`, or `None` for a zero-area triangle.
    pub fn barycentric(&self, p: Vec2) -> Option<Barycentric> {
        let v0 = self.b - self.a;
        let v1 = self.c - self.a;
        let v2 = p - self.a;
        let d00 = v0.dot(v0);
        let d01 = v0.dot(v1);
        let d11 = v1.dot(v1);
        let d20 = v2.dot(v0);
        let d21 = v2.dot(v1);
        let denom = d00 * d11 - d01 * d01;
        if denom.abs() <= EPS_DEGENERATE {
            return None;
        }
        let v = (d11 * d20 - d01 * d21) / denom;
        let w = (d00 * d21 - d01 * d20) / denom;
        Some(Barycentric { u: 1.0 - v - w, v, w })
    }

    pub fn point_from_barycentric(&self, bc: Barycentric) -> Vec2 {
        self.a * bc.u + self.b * bc.v + self.c * bc.w
    }

    pub fn contains(&self, p: Vec2) -> bool {
        self.barycentric(p).map_or(false, |bc| bc.is_inside())
    }
}
