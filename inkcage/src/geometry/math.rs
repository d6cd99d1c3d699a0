use crate::model::Vec2;
use super::tolerance::{EPS_DEGENERATE, clamp01};

/// Squared distance from `p` to segment `ab` and the clamped parameter of the
/// projection.
pub fn seg_distance_sq(p: Vec2, a: Vec2, b: Vec2) -> (f64, f64) {
    let v = b - a;
    let w = p - a;
    let vv = v.dot(v);
    let t = if vv > EPS_DEGENERATE { clamp01(w.dot(v) / vv) } else { 0.0 };
    let proj = a + v * t;
    (p.dist_sq(proj), t)
}

/// Project `p` onto segment `ab`. Degenerate segments project to `a`.
pub fn project_onto_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let (_, t) = seg_distance_sq(p, a, b);
    a.lerp(b, t)
}

pub fn dist_point_to_seg_sq(p: Vec2, a: Vec2, b: Vec2) -> f64 {
    let (d2, _) = seg_distance_sq(p, a, b);
    d2
}

/// Unit vector, or `None` for (near) zero-length input.
pub fn normalize(v: Vec2) -> Option<Vec2> {
    let len = v.length();
    if len > EPS_DEGENERATE { Some(v * (1.0 / len)) } else { None }
}

/// Closest point on a polyline, its segment index and distance.
pub fn closest_on_polyline(p: Vec2, pts: &[Vec2]) -> Option<(Vec2, usize, f64)> {
    if pts.is_empty() { return None; }
    if pts.len() == 1 { return Some((pts[0], 0, p.dist(pts[0]))); }
    let mut best: Option<(Vec2, usize, f64)> = None;
    for i in 0..pts.len() - 1 {
        let (d2, t) = seg_distance_sq(p, pts[i], pts[i + 1]);
        if best.map_or(true, |(_, _, bd)| d2 < bd) {
            best = Some((pts[i].lerp(pts[i + 1], t), i, d2));
        }
    }
    best.map(|(q, i, d2)| (q, i, d2.sqrt()))
}
