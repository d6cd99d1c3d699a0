// Segment/line intersection with explicit tolerances.
// `intersect_lines` is the plain point query; `classify_segments` separates
// proper crossings from endpoint touches for the polygon diagonal tests.

use crate::model::Vec2;
use super::tolerance::EPS_DEGENERATE;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line {
    pub a: Vec2,
    pub b: Vec2,
}

impl Line {
    pub const fn new(a: Vec2, b: Vec2) -> Self { Line { a, b } }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegIntersection {
    None,
    // Interior crossing, away from all four endpoints
    Proper { t: f64, u: f64, p: Vec2 },
    // Meets at (or within tolerance of) an endpoint of either segment
    Touch { t: f64, u: f64, p: Vec2 },
    // Collinear with overlapping parameter span on the first segment
    CollinearOverlap { t0: f64, t1: f64 },
}

#[inline]
fn orient(a: Vec2, b: Vec2, c: Vec2) -> f64 { (b - a).cross(c - a) }

#[inline]
fn within_eps(x: f64, eps: f64) -> bool { x.abs() <= eps }

/// Intersection point of two lines or segments.
///
/// Returns `None` when the lines are parallel within `EPS_DEGENERATE`. When
/// `bounded` is set the point must also lie within both segments' extents,
/// using the same epsilon as boundary slack.
pub fn intersect_lines(l1: Line, l2: Line, bounded: bool) -> Option<Vec2> {
    let (x1, y1, x2, y2) = (l1.a.x, l1.a.y, l1.b.x, l1.b.y);
    let (x3, y3, x4, y4) = (l2.a.x, l2.a.y, l2.b.x, l2.b.y);
    let d = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
    if d.abs() < EPS_DEGENERATE {
        return None;
    }
    let c1 = x1 * y2 - y1 * x2;
    let c2 = x3 * y4 - y3 * x4;
    let xi = ((x3 - x4) * c1 - (x1 - x2) * c2) / d;
    let yi = ((y3 - y4) * c1 - (y1 - y2) * c2) / d;
    if bounded {
        let e = EPS_DEGENERATE;
        let outside = xi < x1.min(x2) - e || xi > x1.max(x2) + e
            || xi < x3.min(x4) - e || xi > x3.max(x4) + e
            || yi < y1.min(y2) - e || yi > y1.max(y2) + e
            || yi < y3.min(y4) - e || yi > y3.max(y4) + e;
        if outside {
            return None;
        }
    }
    Some(Vec2::new(xi, yi))
}

/// Parameter of the intersection along `l1`, if the segments intersect.
pub fn intersect_offset(l1: Line, l2: Line) -> Option<f64> {
    let r = l1.b - l1.a;
    let s = l2.b - l2.a;
    let rxs = r.cross(s);
    if within_eps(rxs, EPS_DEGENERATE) {
        return None;
    }
    let qp = l2.a - l1.a;
    let t = qp.cross(s) / rxs;
    let u = qp.cross(r) / rxs;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) { Some(t) } else { None }
}

/// Classify how segment `ab` meets segment `cd`.
pub fn classify_segments(a: Vec2, b: Vec2, c: Vec2, d: Vec2, eps: f64) -> SegIntersection {
    let o1 = orient(a, b, c);
    let o2 = orient(a, b, d);
    let o3 = orient(c, d, a);
    let o4 = orient(c, d, b);

    if within_eps(o1, eps) && within_eps(o2, eps) && within_eps(o3, eps) && within_eps(o4, eps) {
        return collinear_overlap(a, b, c, d, eps);
    }

    let inter1 = (o1 > 0.0 && o2 < 0.0) || (o1 < 0.0 && o2 > 0.0) || within_eps(o1, eps) || within_eps(o2, eps);
    let inter2 = (o3 > 0.0 && o4 < 0.0) || (o3 < 0.0 && o4 > 0.0) || within_eps(o3, eps) || within_eps(o4, eps);
    if !(inter1 && inter2) {
        return SegIntersection::None;
    }

    let r = b - a;
    let s = d - c;
    let rxs = r.cross(s);
    if within_eps(rxs, EPS_DEGENERATE) {
        return SegIntersection::None;
    }
    let qp = c - a;
    let t = qp.cross(s) / rxs;
    let u = qp.cross(r) / rxs;
    if t < -eps || t > 1.0 + eps || u < -eps || u > 1.0 + eps {
        return SegIntersection::None;
    }
    let p = a + r * t;
    let is_touch = within_eps(t, eps) || within_eps(1.0 - t, eps) || within_eps(u, eps) || within_eps(1.0 - u, eps);
    if is_touch {
        SegIntersection::Touch { t: t.clamp(0.0, 1.0), u: u.clamp(0.0, 1.0), p }
    } else {
        SegIntersection::Proper { t, u, p }
    }
}

fn collinear_overlap(a: Vec2, b: Vec2, c: Vec2, d: Vec2, eps: f64) -> SegIntersection {
    // Project onto the dominant axis of AB
    let use_x = (b.x - a.x).abs() >= (b.y - a.y).abs();
    let (pa1, pa2, pc1, pc2) = if use_x { (a.x, b.x, c.x, d.x) } else { (a.y, b.y, c.y, d.y) };
    let len_ab = pa2 - pa1;
    if within_eps(len_ab, eps) {
        return SegIntersection::None;
    }
    let tc1 = (pc1 - pa1) / len_ab;
    let tc2 = (pc2 - pa1) / len_ab;
    let lo = tc1.min(tc2).max(0.0);
    let hi = tc1.max(tc2).min(1.0);
    if hi < lo - eps {
        return SegIntersection::None;
    }
    SegIntersection::CollinearOverlap { t0: lo, t1: hi.max(lo) }
}
