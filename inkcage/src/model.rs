use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Vec2 { x, y }
    }
    #[inline]
    pub fn dot(self, o: Vec2) -> f64 {
        self.x * o.x + self.y * o.y
    }
    /// z-component of the 3d cross product.
    #[inline]
    pub fn cross(self, o: Vec2) -> f64 {
        self.x * o.y - self.y * o.x
    }
    #[inline]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }
    #[inline]
    pub fn dist(self, o: Vec2) -> f64 {
        (self - o).length()
    }
    #[inline]
    pub fn dist_sq(self, o: Vec2) -> f64 {
        let d = self - o;
        d.dot(d)
    }
    #[inline]
    pub fn lerp(self, o: Vec2, t: f64) -> Vec2 {
        self + (o - self) * t
    }
    /// Point reflection of `self` through `center`.
    #[inline]
    pub fn reflect(self, center: Vec2) -> Vec2 {
        center * 2.0 - self
    }
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, o: Vec2) -> Vec2 {
        Vec2::new(self.x + o.x, self.y + o.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, o: Vec2) -> Vec2 {
        Vec2::new(self.x - o.x, self.y - o.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, s: f64) -> Vec2 {
        Vec2::new(self.x * s, self.y * s)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    #[inline]
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ControlPoint {
    pub pos: Vec2,
    /// Beams that reference this point, in insertion order.
    pub beams: Vec<u32>,
}

impl ControlPoint {
    pub(crate) fn add_beam(&mut self, id: u32) {
        if !self.beams.contains(&id) {
            self.beams.push(id);
        }
    }
    pub(crate) fn remove_beam(&mut self, id: u32) {
        self.beams.retain(|b| *b != id);
    }
}

/// Shape of a beam's path. Control point roles per kind:
/// - `Line`: `[a, b]`
/// - `Arc`: `[center, start]` (full circle) or `[center, start, end]`
/// - `Spline`: `[p0, .., pn]`, interpolated through every point
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    Line = 0,
    Arc = 1,
    Spline = 2,
}

impl PathKind {
    pub fn from_u8(v: u8) -> Option<PathKind> {
        match v {
            0 => Some(PathKind::Line),
            1 => Some(PathKind::Arc),
            2 => Some(PathKind::Spline),
            _ => None,
        }
    }

    /// Minimum number of control points needed to generate a path.
    pub fn min_points(self) -> usize {
        2
    }

    /// Maximum number of control points the kind consumes, if bounded.
    pub fn max_points(self) -> Option<usize> {
        match self {
            PathKind::Line => Some(2),
            PathKind::Arc => Some(3),
            PathKind::Spline => None,
        }
    }

    /// Graph endpoints of a beam with these control points. Intermediate
    /// points are shape parameters. A full-circle arc has no endpoints.
    pub fn endpoints(self, controls: &[u32]) -> Option<(u32, u32)> {
        match self {
            PathKind::Line | PathKind::Spline => {
                if controls.len() < 2 {
                    return None;
                }
                Some((controls[0], controls[controls.len() - 1]))
            }
            PathKind::Arc => {
                if controls.len() < 3 {
                    return None;
                }
                Some((controls[1], controls[2]))
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct Beam {
    pub points: Vec<u32>,
    pub kind: PathKind,
    /// Dense path samples derived from the control point positions.
    pub path: Vec<Vec2>,
    /// `Cage::geom_version` the path was generated at.
    pub built_ver: u64,
}

impl Beam {
    pub fn endpoints(&self) -> Option<(u32, u32)> {
        self.kind.endpoints(&self.points)
    }

    pub(crate) fn replace_control_point(&mut self, old: u32, replacement: u32) -> bool {
        let mut changed = false;
        for p in self.points.iter_mut() {
            if *p == old {
                *p = replacement;
                changed = true;
            }
        }
        changed
    }
}

#[derive(Clone, Debug)]
pub struct Area {
    pub id: u32,
    /// Control point cycle, counter-clockwise at the time of discovery.
    pub cycle: Vec<u32>,
    pub stamp: String,
    /// Resolved positions in `cycle` order.
    pub polygon: Vec<Vec2>,
    pub centroid: Vec2,
}

/// Key that identifies a cycle regardless of traversal start or direction.
pub fn area_stamp(ids: &[u32]) -> String {
    let mut sorted = ids.to_vec();
    sorted.sort_unstable();
    sorted
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join("-")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordScheme {
    Barycentric,
    Wachspress,
    MeanValue,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InfluenceTarget {
    Beam(u32),
    Area(u32),
}

#[derive(Clone, Debug, PartialEq)]
pub enum InfluenceCoords {
    /// Curve parameter of the closest point, then the offset from it along
    /// the tangent (nonzero only past an end) and along the normal.
    Beam { t: f64, along: f64, u: f64 },
    /// One weight per area polygon vertex; `None` marks vertices excluded
    /// from the computation.
    Area {
        scheme: CoordScheme,
        weights: Vec<Option<f64>>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Influence {
    pub target: InfluenceTarget,
    pub coords: InfluenceCoords,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamp_ignores_order_and_direction() {
        assert_eq!(area_stamp(&[3, 1, 2]), "1-2-3");
        assert_eq!(area_stamp(&[2, 1, 3]), area_stamp(&[3, 2, 1]));
        assert_eq!(area_stamp(&[10, 2]), "2-10");
    }

    #[test]
    fn arc_endpoints_skip_center() {
        assert_eq!(PathKind::Arc.endpoints(&[7, 8, 9]), Some((8, 9)));
        assert_eq!(PathKind::Arc.endpoints(&[7, 8]), None);
        assert_eq!(PathKind::Spline.endpoints(&[1, 5, 6, 2]), Some((1, 2)));
    }

    #[test]
    fn reflect_through_center() {
        let r = Vec2::new(1.0, 2.0).reflect(Vec2::new(0.0, 0.0));
        assert_eq!(r, Vec2::new(-1.0, -2.0));
    }
}
