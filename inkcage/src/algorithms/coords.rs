//! Generalized barycentric coordinates over area polygons and their inverse.
//!
//! Weights are indexed like the polygon slice they were computed against.
//! `None` marks a vertex left out of the computation (hidden from the query
//! point, or outside the convex working set); reconstruction skips it and
//! renormalizes by the weights that remain.

use crate::error::{CageError, CageResult};
use crate::geometry::intersect::{classify_segments, SegIntersection};
use crate::geometry::math::seg_distance_sq;
use crate::geometry::polygon::{ccw_order, is_convex_ccw, polygon_area};
use crate::geometry::tolerance::{EPS_AREA, EPS_COINCIDENT, EPS_DEGENERATE, EPS_WEIGHT};
use crate::geometry::triangle::{signed_area, Triangle};
use crate::model::{CoordScheme, Vec2};

use super::decompose::{largest_convex_containing, triangulate};

fn one_hot(n: usize, i: usize) -> Vec<f64> {
    let mut w = vec![0.0; n];
    w[i] = 1.0;
    w
}

fn two_hot(n: usize, i: usize, j: usize, t: f64) -> Vec<f64> {
    let mut w = vec![0.0; n];
    w[i] = 1.0 - t;
    w[j] += t;
    w
}

fn normalized(mut w: Vec<f64>) -> CageResult<Vec<f64>> {
    let sum: f64 = w.iter().sum();
    if !sum.is_finite() || sum.abs() <= EPS_WEIGHT {
        return Err(CageError::Degenerate { what: "weight sum" });
    }
    for x in w.iter_mut() {
        *x /= sum;
    }
    Ok(w)
}

fn coincident_vertex(poly: &[Vec2], p: Vec2) -> Option<usize> {
    poly.iter().position(|v| v.dist(p) <= EPS_COINCIDENT)
}

/// Wachspress coordinates of `p` in a convex polygon.
///
/// A point on a vertex or edge resolves to the one- or two-vertex
/// interpolation instead of dividing by a vanishing area.
pub fn wachspress(poly: &[Vec2], p: Vec2) -> CageResult<Vec<f64>> {
    let n = poly.len();
    if n < 3 || polygon_area(poly).abs() <= EPS_AREA {
        return Err(CageError::Degenerate { what: "polygon area" });
    }
    if let Some(i) = coincident_vertex(poly, p) {
        return Ok(one_hot(n, i));
    }
    // edge_area[i] spans edge i -> i+1
    let edge_area: Vec<f64> = (0..n).map(|i| signed_area(p, poly[i], poly[(i + 1) % n])).collect();
    for i in 0..n {
        let j = (i + 1) % n;
        if edge_area[i].abs() <= EPS_AREA {
            let (d2, t) = seg_distance_sq(p, poly[i], poly[j]);
            if d2 <= EPS_COINCIDENT {
                return Ok(two_hot(n, i, j, t));
            }
        }
    }
    let mut w = Vec::with_capacity(n);
    for i in 0..n {
        let prev = (i + n - 1) % n;
        let next = (i + 1) % n;
        let num = signed_area(poly[prev], poly[i], poly[next]);
        let den = edge_area[prev] * edge_area[i];
        if den.abs() <= EPS_DEGENERATE * EPS_DEGENERATE {
            return Err(CageError::Degenerate { what: "wachspress denominator" });
        }
        w.push(num / den);
    }
    normalized(w)
}

/// Mean-value coordinates of `p`; valid for non-convex simple polygons.
pub fn mean_value(poly: &[Vec2], p: Vec2) -> CageResult<Vec<f64>> {
    let n = poly.len();
    if n < 3 {
        return Err(CageError::Degenerate { what: "polygon size" });
    }
    if let Some(i) = coincident_vertex(poly, p) {
        return Ok(one_hot(n, i));
    }
    let r: Vec<Vec2> = poly.iter().map(|v| *v - p).collect();
    let d: Vec<f64> = r.iter().map(|v| v.length()).collect();
    // tan(alpha_i / 2) for the angle subtended by edge i -> i+1
    let mut tan_half = Vec::with_capacity(n);
    for i in 0..n {
        let j = (i + 1) % n;
        let cross = r[i].cross(r[j]);
        let dot = r[i].dot(r[j]);
        let den = d[i] * d[j] + dot;
        if den <= EPS_DEGENERATE * d[i] * d[j] {
            // Angle of pi: p sits on this edge
            return Ok(two_hot(n, i, j, d[i] / (d[i] + d[j])));
        }
        tan_half.push(cross / den);
    }
    let w = (0..n)
        .map(|i| {
            let prev = (i + n - 1) % n;
            (tan_half[prev] + tan_half[i]) / d[i]
        })
        .collect();
    normalized(w)
}

/// Per vertex: whether the segment from `p` reaches it without crossing a
/// polygon edge not incident to that vertex.
pub fn visible_vertices(poly: &[Vec2], p: Vec2) -> Vec<bool> {
    let n = poly.len();
    (0..n)
        .map(|i| {
            (0..n).all(|k| {
                let k1 = (k + 1) % n;
                if k == i || k1 == i {
                    return true;
                }
                match classify_segments(p, poly[i], poly[k], poly[k1], EPS_DEGENERATE) {
                    SegIntersection::None => true,
                    SegIntersection::Touch { t, .. } => t <= EPS_DEGENERATE,
                    _ => false,
                }
            })
        })
        .collect()
}

/// Average of the barycentric coordinates of `p` over every interior
/// triangle containing it. `None` if no triangle contains `p`.
pub fn barycentric_average(poly: &[Vec2], p: Vec2) -> Option<Vec<Option<f64>>> {
    let n = poly.len();
    let mut acc = vec![0.0; n];
    let mut touched = vec![false; n];
    let mut count = 0usize;
    for [i, j, k] in triangulate(poly) {
        let tri = Triangle::new(poly[i], poly[j], poly[k]);
        let Some(bc) = tri.barycentric(p) else { continue };
        if !bc.is_inside() {
            continue;
        }
        acc[i] += bc.u;
        acc[j] += bc.v;
        acc[k] += bc.w;
        touched[i] = true;
        touched[j] = true;
        touched[k] = true;
        count += 1;
    }
    if count == 0 {
        return None;
    }
    let inv = 1.0 / count as f64;
    Some(acc.iter().zip(&touched).map(|(w, t)| t.then_some(w * inv)).collect())
}

/// Weighted sum of the present vertices, renormalized by their weight sum.
pub fn reconstruct(poly: &[Vec2], weights: &[Option<f64>]) -> CageResult<Vec2> {
    if poly.len() != weights.len() {
        return Err(CageError::Degenerate { what: "weight count" });
    }
    let mut acc = Vec2::ZERO;
    let mut sum = 0.0;
    for (v, w) in poly.iter().zip(weights) {
        if let Some(w) = w {
            acc = acc + *v * *w;
            sum += w;
        }
    }
    if sum.abs() <= EPS_WEIGHT {
        return Err(CageError::Degenerate { what: "weight sum" });
    }
    let out = acc * (1.0 / sum);
    if out.is_finite() { Ok(out) } else { Err(CageError::Degenerate { what: "reconstruction" }) }
}

fn scatter(n: usize, subset: &[usize], w: &[f64]) -> Vec<Option<f64>> {
    let mut out = vec![None; n];
    for (&i, &wi) in subset.iter().zip(w) {
        out[i] = Some(wi);
    }
    out
}

/// Coordinates of `p` against an area polygon under `scheme`.
///
/// Wachspress needs a convex set: the full polygon when it is convex,
/// otherwise the largest convex sub-polygon containing `p`, falling back to
/// averaged triangle coordinates and finally mean-value coordinates.
pub fn area_coordinates(
    poly: &[Vec2],
    p: Vec2,
    scheme: CoordScheme,
    visibility: bool,
) -> CageResult<Vec<Option<f64>>> {
    let n = poly.len();
    log::trace!("area coordinates: scheme={:?} vertices={} visibility={}", scheme, n, visibility);
    let mut base = ccw_order(poly);
    if visibility {
        let vis = visible_vertices(poly, p);
        let seen: Vec<usize> = base.iter().copied().filter(|&i| vis[i]).collect();
        if seen.len() >= 3 {
            base = seen;
        }
    }
    let sub: Vec<Vec2> = base.iter().map(|&i| poly[i]).collect();

    match scheme {
        CoordScheme::MeanValue => Ok(scatter(n, &base, &mean_value(&sub, p)?)),
        CoordScheme::Barycentric => triangle_or_mean_value(n, &base, &sub, p),
        CoordScheme::Wachspress => {
            if is_convex_ccw(&sub) {
                return Ok(scatter(n, &base, &wachspress(&sub, p)?));
            }
            if let Some(local) = largest_convex_containing(&sub, p) {
                let pts: Vec<Vec2> = local.iter().map(|&i| sub[i]).collect();
                if let Ok(w) = wachspress(&pts, p) {
                    let global: Vec<usize> = local.iter().map(|&i| base[i]).collect();
                    return Ok(scatter(n, &global, &w));
                }
            }
            log::trace!("no convex working set; using triangle coordinates");
            triangle_or_mean_value(n, &base, &sub, p)
        }
    }
}

fn triangle_or_mean_value(n: usize, base: &[usize], sub: &[Vec2], p: Vec2) -> CageResult<Vec<Option<f64>>> {
    if let Some(w) = barycentric_average(sub, p) {
        let mut out = vec![None; n];
        for (&i, wi) in base.iter().zip(w) {
            out[i] = wi;
        }
        return Ok(out);
    }
    Ok(scatter(n, base, &mean_value(sub, p)?))
}
