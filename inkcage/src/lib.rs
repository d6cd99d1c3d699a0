pub mod config;
pub mod deformer;
pub mod error;
pub mod model;
pub mod geometry {
    pub mod curve;
    pub mod intersect;
    pub mod limits;
    pub mod math;
    pub mod polygon;
    pub mod tolerance;
    pub mod triangle;
}
pub mod algorithms {
    pub mod areas;
    pub mod coords;
    pub mod decompose;
    pub mod picking;
}
mod json;

use algorithms::areas::{AreaCache, DiscoveryStats};
use algorithms::picking::BeamHit;
use config::CageConfig;
use error::{CageError, CageResult};
use geometry::curve::{generate, spline_insertion, Curve};
use model::{Area, Beam, ControlPoint, Influence, InfluenceCoords, InfluenceTarget, PathKind, Vec2};
use serde::Serialize;
use std::cell::RefCell;

pub use deformer::Deformer;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Pick {
    #[serde(rename = "control_point")]
    ControlPoint { id: u32, dist: f64 },
    #[serde(rename = "beam")]
    Beam { id: u32, t: f64, dist: f64 },
}

/// Control points and beams of one deformation cage, plus derived areas.
///
/// Ids are arena indices and are never reused. Operations given an id that
/// does not name a live entity panic; the `get_*` accessors are the checked
/// way in.
pub struct Cage {
    pub(crate) points: Vec<Option<ControlPoint>>, // id is index
    pub(crate) beams: Vec<Option<Beam>>,          // id is index
    pub(crate) config: CageConfig,
    // Bumped on any position or path change
    pub(crate) geom_ver: u64,
    // Bumped when beam adjacency changes; forces area rediscovery
    pub(crate) topo_ver: u64,
    pub(crate) area_cache: RefCell<AreaCache>,
}

impl Default for Cage {
    fn default() -> Self {
        Cage::new()
    }
}

impl Cage {
    pub fn new() -> Self {
        Cage::with_config(CageConfig::default())
    }

    pub fn with_config(config: CageConfig) -> Self {
        Cage {
            points: Vec::new(),
            beams: Vec::new(),
            config,
            geom_ver: 1,
            topo_ver: 1,
            area_cache: RefCell::new(AreaCache::default()),
        }
    }

    pub fn config(&self) -> &CageConfig {
        &self.config
    }

    /// Replace the configuration. Paths are regenerated and areas
    /// rediscovered on next read.
    pub fn set_config(&mut self, config: CageConfig) -> CageResult<()> {
        config.validate()?;
        self.config = config;
        self.rebuild_paths();
        self.topo_ver = self.topo_ver.wrapping_add(1);
        Ok(())
    }

    pub fn geom_version(&self) -> u64 {
        self.geom_ver
    }

    pub fn topology_version(&self) -> u64 {
        self.topo_ver
    }

    fn bump(&mut self) {
        self.geom_ver = self.geom_ver.wrapping_add(1);
    }

    fn bump_topology(&mut self) {
        self.topo_ver = self.topo_ver.wrapping_add(1);
        self.bump();
    }

    // Control points
    pub fn add_control_point(&mut self, pos: Vec2) -> u32 {
        let id = self.points.len() as u32;
        self.points.push(Some(ControlPoint { pos, beams: Vec::new() }));
        // An isolated point can block a face
        self.bump_topology();
        id
    }

    pub fn get_control_point(&self, id: u32) -> Option<&ControlPoint> {
        self.points.get(id as usize).and_then(|p| p.as_ref())
    }

    pub fn control_point(&self, id: u32) -> &ControlPoint {
        match self.get_control_point(id) {
            Some(cp) => cp,
            None => panic!("unknown control point id {}", id),
        }
    }

    fn control_point_mut(&mut self, id: u32) -> &mut ControlPoint {
        match self.points.get_mut(id as usize).and_then(|p| p.as_mut()) {
            Some(cp) => cp,
            None => panic!("unknown control point id {}", id),
        }
    }

    pub(crate) fn point_pos(&self, id: u32) -> Vec2 {
        self.control_point(id).pos
    }

    pub fn control_point_count(&self) -> u32 {
        self.points.iter().filter(|p| p.is_some()).count() as u32
    }

    pub fn control_point_ids(&self) -> Vec<u32> {
        self.points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.as_ref().map(|_| i as u32))
            .collect()
    }

    /// Ids and interleaved xy positions of every live control point.
    pub fn get_control_point_arrays(&self) -> (Vec<u32>, Vec<f64>) {
        let mut ids = Vec::new();
        let mut pos = Vec::new();
        for (i, p) in self.points.iter().enumerate() {
            if let Some(p) = p {
                ids.push(i as u32);
                pos.push(p.pos.x);
                pos.push(p.pos.y);
            }
        }
        (ids, pos)
    }

    /// Closest control point strictly within `radius`, ties to the lower id.
    pub fn find_near(&self, pos: Vec2, radius: f64) -> Option<u32> {
        algorithms::picking::find_near_impl(self, pos, radius)
    }

    pub fn find_or_add_control_point(&mut self, pos: Vec2) -> u32 {
        match self.find_near(pos, self.config.snap_radius) {
            Some(id) => id,
            None => self.add_control_point(pos),
        }
    }

    /// Move a control point and regenerate every beam that references it.
    /// Areas keep their cycles and are re-resolved, not rediscovered.
    pub fn move_control_point(&mut self, id: u32, pos: Vec2) {
        let beams = {
            let cp = self.control_point_mut(id);
            cp.pos = pos;
            cp.beams.clone()
        };
        for b in beams {
            self.regenerate_beam(b);
        }
        self.bump();
    }

    /// Merge `id` with the closest other control point strictly within
    /// `merge_distance`. `id` survives at the other point's position and takes
    /// over its beams. Returns the absorbed id.
    pub fn merge_control_point(&mut self, id: u32) -> Option<u32> {
        let here = self.point_pos(id);
        let md2 = self.config.merge_distance * self.config.merge_distance;
        let mut best: Option<(u32, f64)> = None;
        for (i, p) in self.points.iter().enumerate() {
            let Some(p) = p else { continue };
            if i as u32 == id {
                continue;
            }
            let d2 = p.pos.dist_sq(here);
            if d2 < md2 && best.map_or(true, |(_, bd)| d2 < bd) {
                best = Some((i as u32, d2));
            }
        }
        let (other, _) = best?;
        let target = self.point_pos(other);
        let own = {
            let cp = self.control_point_mut(id);
            cp.pos = target;
            cp.beams.clone()
        };
        for b in own {
            self.regenerate_beam(b);
        }
        self.replace_control_point(other, id);
        self.points[other as usize] = None;
        log::debug!("merged control point {} into {}", other, id);
        Some(other)
    }

    /// Re-key every beam reference from `old` to `replacement`. Beams left
    /// with a single distinct control point are removed. `old` stays alive
    /// with no beams.
    pub fn replace_control_point(&mut self, old: u32, replacement: u32) {
        self.control_point(replacement);
        let beams = std::mem::take(&mut self.control_point_mut(old).beams);
        for b in beams {
            let collapsed = {
                let beam = self.beam_mut(b);
                beam.replace_control_point(old, replacement);
                let first = beam.points[0];
                beam.points.iter().all(|p| *p == first)
            };
            if collapsed {
                self.detach_beam(b);
            } else {
                self.control_point_mut(replacement).add_beam(b);
                self.regenerate_beam(b);
            }
        }
        self.bump_topology();
    }

    /// Remove a control point and every beam that references it.
    pub fn remove_control_point(&mut self, id: u32) {
        let beams = self.control_point(id).beams.clone();
        for b in beams {
            self.detach_beam(b);
        }
        self.points[id as usize] = None;
        self.bump_topology();
    }

    // Beams
    pub fn add_beam(&mut self, points: &[u32], kind: PathKind) -> u32 {
        assert!(!points.is_empty(), "beam needs at least one control point");
        for &p in points {
            self.control_point(p);
        }
        let id = self.beams.len() as u32;
        self.beams.push(Some(Beam { points: points.to_vec(), kind, path: Vec::new(), built_ver: 0 }));
        for &p in points {
            self.control_point_mut(p).add_beam(id);
        }
        self.regenerate_beam(id);
        self.bump_topology();
        id
    }

    /// Append a control point to a beam still gathering its points. Returns
    /// false if the kind already has all the points it uses.
    pub fn add_control_point_to_beam(&mut self, beam: u32, point: u32) -> bool {
        self.control_point(point);
        {
            let b = self.beam_mut(beam);
            if b.kind.max_points().is_some_and(|m| b.points.len() >= m) {
                return false;
            }
            b.points.push(point);
        }
        self.control_point_mut(point).add_beam(beam);
        self.regenerate_beam(beam);
        self.bump_topology();
        true
    }

    pub fn remove_beam(&mut self, id: u32) {
        self.detach_beam(id);
        self.bump_topology();
    }

    fn detach_beam(&mut self, id: u32) {
        let b = match self.beams.get_mut(id as usize).and_then(|b| b.take()) {
            Some(b) => b,
            None => panic!("unknown beam id {}", id),
        };
        for p in b.points {
            if let Some(Some(cp)) = self.points.get_mut(p as usize) {
                cp.remove_beam(id);
            }
        }
    }

    /// Insert a new control point into a spline beam where its curve passes
    /// closest to `near`. Returns the new point id, or `None` for non-spline
    /// beams.
    pub fn insert_spline_control_point(&mut self, beam: u32, near: Vec2) -> Option<u32> {
        if self.beam(beam).kind != PathKind::Spline {
            return None;
        }
        let controls = self.beam_controls(beam);
        let t = self.beam_curve(beam)?.closest_param(near);
        let (index, pos) = spline_insertion(&controls, t)?;
        let id = self.points.len() as u32;
        self.points.push(Some(ControlPoint { pos, beams: vec![beam] }));
        self.beam_mut(beam).points.insert(index, id);
        self.regenerate_beam(beam);
        // Interior spline points are shape parameters; adjacency is unchanged
        self.bump();
        Some(id)
    }

    pub fn get_beam(&self, id: u32) -> Option<&Beam> {
        self.beams.get(id as usize).and_then(|b| b.as_ref())
    }

    pub fn beam(&self, id: u32) -> &Beam {
        match self.get_beam(id) {
            Some(b) => b,
            None => panic!("unknown beam id {}", id),
        }
    }

    fn beam_mut(&mut self, id: u32) -> &mut Beam {
        match self.beams.get_mut(id as usize).and_then(|b| b.as_mut()) {
            Some(b) => b,
            None => panic!("unknown beam id {}", id),
        }
    }

    pub fn beam_count(&self) -> u32 {
        self.beams.iter().filter(|b| b.is_some()).count() as u32
    }

    pub fn beam_ids(&self) -> Vec<u32> {
        self.beams
            .iter()
            .enumerate()
            .filter_map(|(i, b)| b.as_ref().map(|_| i as u32))
            .collect()
    }

    /// Dense path points of a beam for rendering.
    pub fn beam_path(&self, id: u32) -> &[Vec2] {
        &self.beam(id).path
    }

    fn beam_controls(&self, id: u32) -> Vec<Vec2> {
        self.beam(id).points.iter().map(|&p| self.point_pos(p)).collect()
    }

    /// Parametric curve of a beam, `None` while it lacks points for its kind.
    pub fn beam_curve(&self, id: u32) -> Option<Curve> {
        self.beam(id);
        algorithms::picking::curve_for(self, id)
    }

    pub(crate) fn rebuild_paths(&mut self) {
        for id in self.beam_ids() {
            self.regenerate_beam(id);
        }
        self.bump();
    }

    fn regenerate_beam(&mut self, id: u32) {
        let controls = self.beam_controls(id);
        let steps = self.config.path_steps;
        let ver = self.geom_ver.wrapping_add(1);
        let b = self.beam_mut(id);
        b.path = generate(b.kind, &controls, steps);
        b.built_ver = ver;
    }

    pub fn closest_point_on_beam(&self, beam: u32, p: Vec2) -> Option<BeamHit> {
        self.beam(beam);
        algorithms::picking::closest_on_beam(self, beam, p)
    }

    pub fn nearest_beam(&self, p: Vec2, radius: f64) -> Option<BeamHit> {
        algorithms::picking::nearest_beam_impl(self, p, radius)
    }

    pub fn pick(&self, p: Vec2, tol: f64) -> Option<Pick> {
        algorithms::picking::pick_impl(self, p, tol)
    }

    // Areas
    /// Run `f` over the current areas, rediscovering or re-resolving first if
    /// the cage changed since the last read.
    pub fn with_areas<R>(&self, f: impl FnOnce(&[Area]) -> R) -> R {
        let mut cache = self.area_cache.borrow_mut();
        algorithms::areas::refresh(self, &mut cache);
        f(&cache.areas)
    }

    pub fn areas(&self) -> Vec<Area> {
        self.with_areas(|a| a.to_vec())
    }

    pub fn area_count(&self) -> u32 {
        self.with_areas(|a| a.len() as u32)
    }

    pub fn get_area(&self, id: u32) -> Option<Area> {
        self.with_areas(|areas| areas.iter().find(|a| a.id == id).cloned())
    }

    /// Force a full rediscovery now and report what it found.
    pub fn discover_areas(&self) -> DiscoveryStats {
        let mut cache = self.area_cache.borrow_mut();
        cache.topo_ver = self.topo_ver.wrapping_sub(1);
        algorithms::areas::refresh(self, &mut cache).unwrap_or_default()
    }

    /// Area whose polygon contains `p`. Overlaps resolve to the smallest
    /// area, then the lower id.
    pub fn area_containing(&self, p: Vec2) -> Option<u32> {
        use geometry::polygon::{point_in_polygon, polygon_area};
        self.with_areas(|areas| {
            areas
                .iter()
                .filter(|a| point_in_polygon(&a.polygon, p))
                .map(|a| (polygon_area(&a.polygon).abs(), a.id))
                .min_by(|x, y| x.0.total_cmp(&y.0).then(x.1.cmp(&y.1)))
                .map(|(_, id)| id)
        })
    }

    // Influence
    /// Capture coordinates of `p` against the cage: the containing area if
    /// any, else the nearest beam within `beam_bind_radius`.
    pub fn compute_influence(&self, p: Vec2) -> Option<Influence> {
        if !p.is_finite() {
            return None;
        }
        if let Some(area) = self.area_containing(p) {
            let coords = self.with_areas(|areas| {
                let a = areas.iter().find(|a| a.id == area)?;
                let scheme = self.config.coord_scheme;
                match algorithms::coords::area_coordinates(&a.polygon, p, scheme, self.config.visibility) {
                    Ok(weights) => Some(InfluenceCoords::Area { scheme, weights }),
                    Err(e) => {
                        log::debug!("area {} rejected point: {}", area, e);
                        None
                    }
                }
            });
            if let Some(coords) = coords {
                return Some(Influence { target: InfluenceTarget::Area(area), coords });
            }
        }
        let hit = self.nearest_beam(p, self.config.beam_bind_radius)?;
        let curve = self.beam_curve(hit.beam)?;
        let tan = curve.tangent(hit.t)?;
        let perp = Vec2::new(tan.y, -tan.x);
        let d = p - hit.point;
        let coords = InfluenceCoords::Beam { t: hit.t, along: d.dot(tan), u: d.dot(perp) };
        Some(Influence { target: InfluenceTarget::Beam(hit.beam), coords })
    }

    /// Position of an influence under current cage geometry. Panics if the
    /// beam or area it names no longer exists.
    pub fn reconstruct(&self, influence: &Influence) -> CageResult<Vec2> {
        match (&influence.target, &influence.coords) {
            (InfluenceTarget::Area(id), InfluenceCoords::Area { weights, .. }) => {
                let id = *id;
                self.with_areas(|areas| match areas.iter().find(|a| a.id == id) {
                    Some(a) => algorithms::coords::reconstruct(&a.polygon, weights),
                    None => panic!("unknown area id {}", id),
                })
            }
            (InfluenceTarget::Beam(id), InfluenceCoords::Beam { t, along, u }) => {
                let curve = self.beam_curve(*id).ok_or(CageError::Degenerate { what: "beam curve" })?;
                let tan = curve.tangent(*t).ok_or(CageError::Degenerate { what: "beam tangent" })?;
                let perp = Vec2::new(tan.y, -tan.x);
                Ok(curve.eval(*t) + tan * *along + perp * *u)
            }
            _ => Err(CageError::Degenerate { what: "influence target and coordinates disagree" }),
        }
    }

    // JSON
    pub fn to_json_value(&self) -> serde_json::Value {
        json::to_json_impl(self)
    }

    pub fn from_json_value(&mut self, v: serde_json::Value) -> CageResult<()> {
        json::from_json_impl(self, v)
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.beams.clear();
        *self.area_cache.borrow_mut() = AreaCache::default();
        self.bump_topology();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64) -> Vec2 { Vec2::new(x, y) }

    #[test]
    fn ids_are_not_reused() {
        let mut c = Cage::new();
        let a = c.add_control_point(v(0.0, 0.0));
        c.remove_control_point(a);
        let b = c.add_control_point(v(1.0, 1.0));
        assert_ne!(a, b);
        assert!(c.get_control_point(a).is_none());
        assert_eq!(c.control_point_count(), 1);
    }

    #[test]
    fn merge_radius_is_exclusive() {
        let mut c = Cage::new();
        let a = c.add_control_point(v(0.0, 0.0));
        let b = c.add_control_point(v(5.0, 0.0));
        assert_eq!(c.merge_control_point(b), None);
        c.move_control_point(b, v(4.9, 0.0));
        assert_eq!(c.merge_control_point(b), Some(a));
        assert_eq!(c.point_pos(b), v(0.0, 0.0));
        assert!(c.get_control_point(a).is_none());
    }

    #[test]
    fn find_or_add_snaps() {
        let mut c = Cage::new();
        let a = c.add_control_point(v(0.0, 0.0));
        assert_eq!(c.find_or_add_control_point(v(1.0, 1.0)), a);
        let b = c.find_or_add_control_point(v(50.0, 0.0));
        assert_ne!(a, b);
    }

    #[test]
    fn find_near_prefers_closest() {
        let mut c = Cage::new();
        c.add_control_point(v(0.0, 0.0));
        let b = c.add_control_point(v(3.0, 0.0));
        assert_eq!(c.find_near(v(2.5, 0.0), 5.0), Some(b));
        assert_eq!(c.find_near(v(20.0, 0.0), 5.0), None);
    }

    #[test]
    fn move_regenerates_paths() {
        let mut c = Cage::new();
        let a = c.add_control_point(v(0.0, 0.0));
        let b = c.add_control_point(v(10.0, 0.0));
        let beam = c.add_beam(&[a, b], PathKind::Line);
        let ver = c.geom_version();
        c.move_control_point(b, v(10.0, 10.0));
        assert!(c.geom_version() > ver);
        let path = c.beam_path(beam);
        assert!(path.last().unwrap().dist(v(10.0, 10.0)) < 1e-12);
        assert_eq!(c.beam(beam).built_ver, c.geom_version());
    }

    #[test]
    fn line_beam_refuses_third_point() {
        let mut c = Cage::new();
        let a = c.add_control_point(v(0.0, 0.0));
        let b = c.add_control_point(v(10.0, 0.0));
        let d = c.add_control_point(v(5.0, 5.0));
        let beam = c.add_beam(&[a, b], PathKind::Line);
        assert!(!c.add_control_point_to_beam(beam, d));
        let arc = c.add_beam(&[d, a], PathKind::Arc);
        assert!(c.add_control_point_to_beam(arc, b));
        assert_eq!(c.beam(arc).endpoints(), Some((a, b)));
    }

    #[test]
    fn merge_rehomes_beams() {
        let mut c = Cage::new();
        let a = c.add_control_point(v(0.0, 0.0));
        let b = c.add_control_point(v(10.0, 0.0));
        let b2 = c.add_control_point(v(11.0, 0.0));
        let d = c.add_control_point(v(20.0, 0.0));
        let e1 = c.add_beam(&[a, b], PathKind::Line);
        let e2 = c.add_beam(&[b2, d], PathKind::Line);
        let topo = c.topology_version();
        assert_eq!(c.merge_control_point(b2), Some(b));
        assert!(c.topology_version() > topo);
        assert!(c.get_control_point(b).is_none());
        assert_eq!(c.beam(e1).points, vec![a, b2]);
        assert_eq!(c.beam(e2).points, vec![b2, d]);
        assert_eq!(c.point_pos(b2), v(10.0, 0.0));
        let mut beams = c.control_point(b2).beams.clone();
        beams.sort();
        assert_eq!(beams, vec![e1, e2]);
    }

    #[test]
    fn merge_collapses_shared_beam() {
        let mut c = Cage::new();
        let a = c.add_control_point(v(0.0, 0.0));
        let b = c.add_control_point(v(1.0, 0.0));
        let beam = c.add_beam(&[a, b], PathKind::Line);
        assert_eq!(c.merge_control_point(a), Some(b));
        assert!(c.get_beam(beam).is_none());
        assert!(c.control_point(a).beams.is_empty());
    }

    #[test]
    fn merge_without_neighbor_is_noop() {
        let mut c = Cage::new();
        let a = c.add_control_point(v(0.0, 0.0));
        c.add_control_point(v(100.0, 0.0));
        let topo = c.topology_version();
        assert_eq!(c.merge_control_point(a), None);
        assert_eq!(c.topology_version(), topo);
    }

    #[test]
    #[should_panic(expected = "unknown control point id 7")]
    fn unknown_id_is_fatal() {
        let mut c = Cage::new();
        c.move_control_point(7, v(0.0, 0.0));
    }

    #[test]
    fn spline_insertion_adds_shape_point() {
        let mut c = Cage::new();
        let a = c.add_control_point(v(0.0, 0.0));
        let b = c.add_control_point(v(10.0, 0.0));
        let beam = c.add_beam(&[a, b], PathKind::Spline);
        let topo = c.topology_version();
        let id = c.insert_spline_control_point(beam, v(5.0, 1.0)).unwrap();
        assert_eq!(c.beam(beam).points, vec![a, id, b]);
        assert!(c.point_pos(id).dist(v(5.0, 0.0)) < 1e-3);
        assert_eq!(c.topology_version(), topo);
        assert_eq!(c.beam(beam).endpoints(), Some((a, b)));
    }

    #[test]
    fn pick_prefers_points() {
        let mut c = Cage::new();
        let a = c.add_control_point(v(0.0, 0.0));
        let b = c.add_control_point(v(10.0, 0.0));
        let beam = c.add_beam(&[a, b], PathKind::Line);
        assert!(matches!(c.pick(v(0.5, 0.5), 2.0), Some(Pick::ControlPoint { id, .. }) if id == a));
        match c.pick(v(5.0, 1.0), 2.0) {
            Some(Pick::Beam { id, t, dist }) => {
                assert_eq!(id, beam);
                assert!((t - 0.5).abs() < 1e-4);
                assert!((dist - 1.0).abs() < 1e-6);
            }
            other => panic!("unexpected pick {:?}", other),
        }
        assert!(c.pick(v(5.0, 9.0), 2.0).is_none());
    }
}
