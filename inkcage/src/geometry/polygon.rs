//! Simple-polygon predicates. Polygons are vertex slices with an implicit
//! closing edge; no vertex is repeated at the end.

use crate::model::Vec2;
use super::intersect::{classify_segments, SegIntersection};
use super::tolerance::{EPS_AREA, EPS_DEGENERATE};
use super::triangle::signed_area;

/// Signed shoelace area; positive for counter-clockwise winding.
pub fn polygon_area(poly: &[Vec2]) -> f64 {
    let mut a = 0.0;
    for i in 0..poly.len() {
        let j = (i + 1) % poly.len();
        a += poly[i].cross(poly[j]);
    }
    0.5 * a
}

pub fn polygon_centroid(poly: &[Vec2]) -> Vec2 {
    if poly.is_empty() {
        return Vec2::ZERO;
    }
    let mut c = Vec2::ZERO;
    let mut a = 0.0;
    for i in 0..poly.len() {
        let j = (i + 1) % poly.len();
        let cross = poly[i].cross(poly[j]);
        a += cross;
        c = c + (poly[i] + poly[j]) * cross;
    }
    let a = a * 0.5;
    if a.abs() < EPS_AREA {
        // Vertex average for collinear or collapsed input
        let n = poly.len() as f64;
        let sum = poly.iter().fold(Vec2::ZERO, |acc, p| acc + *p);
        return sum * (1.0 / n);
    }
    c * (1.0 / (6.0 * a))
}

/// Ray-crossing parity test. Points exactly on an edge may report either way.
pub fn point_in_polygon(poly: &[Vec2], p: Vec2) -> bool {
    let n = poly.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (poly[i], poly[j]);
        if (pi.y > p.y) != (pj.y > p.y) && p.x < (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Counter-clockwise copy of `poly`.
pub fn ensure_ccw(poly: &[Vec2]) -> Vec<Vec2> {
    let mut out = poly.to_vec();
    if polygon_area(poly) < 0.0 {
        out.reverse();
    }
    out
}

/// Index order that visits `poly` counter-clockwise.
pub fn ccw_order(poly: &[Vec2]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..poly.len()).collect();
    if polygon_area(poly) < 0.0 {
        idx.reverse();
    }
    idx
}

#[inline]
fn prev_next(n: usize, i: usize) -> (usize, usize) {
    ((i + n - 1) % n, (i + 1) % n)
}

/// Vertices of a counter-clockwise polygon whose interior angle exceeds 180°.
pub fn reflex_vertices(poly: &[Vec2]) -> Vec<usize> {
    let n = poly.len();
    if n < 4 {
        return Vec::new();
    }
    (0..n)
        .filter(|&i| {
            let (p, q) = prev_next(n, i);
            signed_area(poly[p], poly[i], poly[q]) < -EPS_AREA
        })
        .collect()
}

/// Convex with counter-clockwise turns (collinear vertices allowed).
pub fn is_convex_ccw(poly: &[Vec2]) -> bool {
    let n = poly.len();
    if n < 3 || polygon_area(poly) <= EPS_AREA {
        return false;
    }
    (0..n).all(|i| {
        let (p, q) = prev_next(n, i);
        signed_area(poly[p], poly[i], poly[q]) >= -EPS_AREA
    })
}

/// No two non-adjacent edges meet and no adjacent edges fold back.
pub fn is_simple(poly: &[Vec2]) -> bool {
    let n = poly.len();
    if n < 3 {
        return false;
    }
    for i in 0..n {
        let a = poly[i];
        let b = poly[(i + 1) % n];
        if a.dist_sq(b) <= EPS_DEGENERATE {
            return false;
        }
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            let c = poly[j];
            let d = poly[(j + 1) % n];
            match classify_segments(a, b, c, d, EPS_DEGENERATE) {
                SegIntersection::None => {}
                SegIntersection::Touch { .. } if adjacent => {}
                SegIntersection::CollinearOverlap { t0, t1 } if adjacent && (t1 - t0) <= EPS_DEGENERATE => {}
                _ => return false,
            }
        }
    }
    true
}

/// Convex hull by Andrew's monotone chain, counter-clockwise, without
/// collinear points.
pub fn convex_hull(points: &[Vec2]) -> Vec<Vec2> {
    let mut pts = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup_by(|a, b| a.dist_sq(*b) <= EPS_DEGENERATE);
    if pts.len() < 3 {
        return pts;
    }
    let mut hull: Vec<Vec2> = Vec::with_capacity(pts.len() * 2);
    for &p in pts.iter() {
        while hull.len() >= 2 && signed_area(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower && signed_area(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}
