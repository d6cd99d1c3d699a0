//! Convex decomposition and triangulation of simple polygons.
//!
//! Every function here takes the polygon as a vertex slice in any winding and
//! answers with indices into that slice, so callers can map results back to
//! control point ids.

use crate::geometry::intersect::{classify_segments, SegIntersection};
use crate::geometry::polygon::{ccw_order, point_in_polygon, reflex_vertices};
use crate::geometry::tolerance::{EPS_AREA, EPS_DEGENERATE};
use crate::geometry::triangle::{signed_area, Triangle};
use crate::model::Vec2;

#[inline]
fn adjacent(n: usize, i: usize, j: usize) -> bool {
    (i + 1) % n == j || (j + 1) % n == i
}

/// True when `i`-`j` is an interior diagonal of `poly`: not a polygon edge,
/// midpoint inside, and it meets no edge other than those incident to `i`
/// or `j`.
pub fn is_valid_diagonal(poly: &[Vec2], i: usize, j: usize) -> bool {
    let n = poly.len();
    if i == j || n < 4 || adjacent(n, i, j) {
        return false;
    }
    let (a, b) = (poly[i], poly[j]);
    if a.dist_sq(b) <= EPS_DEGENERATE {
        return false;
    }
    if !point_in_polygon(poly, a.lerp(b, 0.5)) {
        return false;
    }
    for k in 0..n {
        let k1 = (k + 1) % n;
        if k == i || k == j || k1 == i || k1 == j {
            continue;
        }
        if classify_segments(a, b, poly[k], poly[k1], EPS_DEGENERATE) != SegIntersection::None {
            return false;
        }
    }
    true
}

/// Split `poly` into convex pieces along interior diagonals.
///
/// Each piece is a counter-clockwise index list. A convex input comes back as
/// a single piece; a polygon with no usable diagonal is returned unsplit.
pub fn convex_decompose(poly: &[Vec2]) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    if poly.len() < 3 {
        return out;
    }
    decompose_rec(poly, ccw_order(poly), &mut out);
    out
}

fn decompose_rec(poly: &[Vec2], idx: Vec<usize>, out: &mut Vec<Vec<usize>>) {
    let m = idx.len();
    let sub: Vec<Vec2> = idx.iter().map(|&i| poly[i]).collect();
    let reflex = reflex_vertices(&sub);
    if reflex.is_empty() {
        out.push(idx);
        return;
    }
    let Some((r, j)) = balanced_diagonal(&sub, &reflex) else {
        log::debug!("no valid diagonal for {}-gon; keeping it whole", m);
        out.push(idx);
        return;
    };
    let (first, second) = split_at_diagonal(&idx, r, j);
    decompose_rec(poly, first, out);
    decompose_rec(poly, second, out);
}

/// Valid diagonal from any reflex vertex whose halves differ least in
/// vertex count. Ties go to the earlier reflex vertex, then the lower `j`.
fn balanced_diagonal(sub: &[Vec2], reflex: &[usize]) -> Option<(usize, usize)> {
    let m = sub.len();
    // (balance, r, j)
    let mut best: Option<(usize, usize, usize)> = None;
    for &r in reflex {
        for j in 0..m {
            if !is_valid_diagonal(sub, r, j) {
                continue;
            }
            let len1 = (j + m - r) % m + 1;
            let len2 = m + 2 - len1;
            let balance = len1.abs_diff(len2);
            if best.map_or(true, |(b, _, _)| balance < b) {
                best = Some((balance, r, j));
            }
        }
    }
    best.map(|(_, r, j)| (r, j))
}

/// Both halves of a cyclic index list cut along the local diagonal `r`-`j`.
fn split_at_diagonal(idx: &[usize], r: usize, j: usize) -> (Vec<usize>, Vec<usize>) {
    let m = idx.len();
    let walk = |from: usize, to: usize| {
        let mut v = Vec::new();
        let mut k = from;
        loop {
            v.push(idx[k]);
            if k == to {
                break;
            }
            k = (k + 1) % m;
        }
        v
    };
    (walk(r, j), walk(j, r))
}

/// Every vertex triple whose sides are polygon edges or valid diagonals and
/// whose centroid lies inside. Triangles may overlap.
pub fn triangulate(poly: &[Vec2]) -> Vec<[usize; 3]> {
    let n = poly.len();
    let mut tris = Vec::new();
    if n < 3 {
        return tris;
    }
    let mut ok = vec![false; n * n];
    for i in 0..n {
        for j in (i + 1)..n {
            let v = adjacent(n, i, j) || is_valid_diagonal(poly, i, j);
            ok[i * n + j] = v;
            ok[j * n + i] = v;
        }
    }
    for i in 0..n {
        for j in (i + 1)..n {
            if !ok[i * n + j] {
                continue;
            }
            for k in (j + 1)..n {
                if !ok[j * n + k] || !ok[i * n + k] {
                    continue;
                }
                let t = Triangle::new(poly[i], poly[j], poly[k]);
                if t.is_degenerate() {
                    continue;
                }
                if point_in_polygon(poly, t.centroid()) {
                    tris.push([i, j, k]);
                }
            }
        }
    }
    tris
}

fn strictly_convex_ccw(pts: &[Vec2]) -> bool {
    let n = pts.len();
    n >= 3
        && (0..n).all(|i| signed_area(pts[(i + n - 1) % n], pts[i], pts[(i + 1) % n]) > EPS_AREA)
}

/// Largest convex sub-polygon of `poly` (over its own vertices) that contains
/// `p`, as a counter-clockwise index list.
///
/// Grows greedily from the largest containing triangle; `None` if no
/// triangle of the triangulation contains `p`.
pub fn largest_convex_containing(poly: &[Vec2], p: Vec2) -> Option<Vec<usize>> {
    let n = poly.len();
    let tris = triangulate(poly);
    let seed = tris
        .iter()
        .map(|t| (t, Triangle::new(poly[t[0]], poly[t[1]], poly[t[2]])))
        .filter(|(_, tri)| tri.contains(p))
        .max_by(|a, b| a.1.area().total_cmp(&b.1.area()))?
        .0;
    let mut sub: Vec<usize> = seed.to_vec();
    if signed_area(poly[sub[0]], poly[sub[1]], poly[sub[2]]) < 0.0 {
        sub.swap(1, 2);
    }
    let edge_ok = |a: usize, b: usize| adjacent(n, a, b) || is_valid_diagonal(poly, a, b);

    loop {
        let mut grew = false;
        for v in ccw_order(poly) {
            if sub.contains(&v) {
                continue;
            }
            for pos in 0..sub.len() {
                let mut cand = sub.clone();
                cand.insert(pos + 1, v);
                let m = cand.len();
                let pts: Vec<Vec2> = cand.iter().map(|&i| poly[i]).collect();
                if !strictly_convex_ccw(&pts) {
                    continue;
                }
                let prev = cand[pos];
                let next = cand[(pos + 2) % m];
                if !edge_ok(prev, v) || !edge_ok(v, next) {
                    continue;
                }
                if !point_in_polygon(&pts, p) {
                    continue;
                }
                sub = cand;
                grew = true;
                break;
            }
        }
        if !grew {
            break;
        }
    }
    Some(sub)
}
