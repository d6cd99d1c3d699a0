use crate::geometry::curve::Curve;
use crate::geometry::math::closest_on_polyline;
use crate::model::Vec2;
use crate::{Cage, Pick};

/// Closest control point strictly within `radius` of `p`; ties go to the
/// lower id.
pub fn find_near_impl(cage: &Cage, p: Vec2, radius: f64) -> Option<u32> {
    let r2 = radius * radius;
    let mut best: Option<(u32, f64)> = None;
    for (i, cp) in cage.points.iter().enumerate() {
        let Some(cp) = cp else { continue };
        let d2 = cp.pos.dist_sq(p);
        if d2 < r2 && best.map_or(true, |(_, bd)| d2 < bd) {
            best = Some((i as u32, d2));
        }
    }
    best.map(|(id, _)| id)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeamHit {
    pub beam: u32,
    /// Curve parameter of the closest point.
    pub t: f64,
    pub point: Vec2,
    pub dist: f64,
}

/// Closest point on one beam's curve. `None` if the beam lacks the control
/// points its kind needs.
pub fn closest_on_beam(cage: &Cage, beam: u32, p: Vec2) -> Option<BeamHit> {
    let curve = cage.beam_curve(beam)?;
    Some(hit_on(&curve, beam, p))
}

fn hit_on(curve: &Curve, beam: u32, p: Vec2) -> BeamHit {
    let t = curve.closest_param(p);
    let point = curve.eval(t);
    BeamHit { beam, t, point, dist: point.dist(p) }
}

/// Nearest beam within `radius`, ties to the lower id. The sampled path
/// rejects far beams before the curve search runs. Beams with no tangent at
/// the closest point (zero length) are skipped.
pub fn nearest_beam_impl(cage: &Cage, p: Vec2, radius: f64) -> Option<BeamHit> {
    let mut best: Option<BeamHit> = None;
    for (i, b) in cage.beams.iter().enumerate() {
        let Some(b) = b else { continue };
        let Some((_, _, coarse)) = closest_on_polyline(p, &b.path) else { continue };
        // Path samples are chords of the curve; allow one sample spacing of slack
        let slack = path_spacing(&b.path);
        if coarse > radius + slack {
            continue;
        }
        let Some(curve) = curve_for(cage, i as u32) else { continue };
        let hit = hit_on(&curve, i as u32, p);
        if curve.tangent(hit.t).is_none() {
            continue;
        }
        if hit.dist <= radius && best.map_or(true, |bh| hit.dist < bh.dist) {
            best = Some(hit);
        }
    }
    best
}

fn path_spacing(path: &[Vec2]) -> f64 {
    path.windows(2).map(|w| w[0].dist(w[1])).fold(0.0, f64::max)
}

/// Authoring pick: control points take priority over beams.
pub fn pick_impl(cage: &Cage, p: Vec2, tol: f64) -> Option<Pick> {
    let tol2 = tol * tol;
    let mut best_point: Option<(u32, f64)> = None;
    for (i, cp) in cage.points.iter().enumerate() {
        if let Some(cp) = cp {
            let d2 = cp.pos.dist_sq(p);
            if d2 <= tol2 && best_point.map_or(true, |(_, bd)| d2 < bd) {
                best_point = Some((i as u32, d2));
            }
        }
    }
    if let Some((id, d2)) = best_point {
        return Some(Pick::ControlPoint { id, dist: d2.sqrt() });
    }
    nearest_beam_impl(cage, p, tol).map(|h| Pick::Beam { id: h.beam, t: h.t, dist: h.dist })
}

/// Curve of a beam given resolved control positions, shared by binding and
/// picking.
pub(crate) fn curve_for(cage: &Cage, beam: u32) -> Option<Curve> {
    let b = cage.beams.get(beam as usize)?.as_ref()?;
    let controls: Vec<Vec2> = b.points.iter().map(|&id| cage.point_pos(id)).collect();
    Curve::from_controls(b.kind, &controls)
}
