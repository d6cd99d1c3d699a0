//! Area discovery: minimal faces of the beam graph.
//!
//! Candidate cycles come from walking the faces of the beam drawing and from
//! a depth-first search that closes a cycle whenever it steps back onto its
//! own path. Candidates that are not simple,
//! have no area, or strictly enclose another control point are dropped; the
//! rest are accepted shortest first while they still cover a new point.
//!
//! The faces of the drawing itself are always walked in full. The DFS adds
//! cycles that the walk misses where beams cross without sharing a point;
//! it is exponential in the worst case, so each start is capped at
//! `CageConfig::discovery_budget` steps. Discovery only runs when the
//! topology version moves.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::geometry::math::dist_point_to_seg_sq;
use crate::geometry::polygon::{is_simple, point_in_polygon, polygon_area, polygon_centroid};
use crate::geometry::tolerance::{EPS_AREA, EPS_COINCIDENT};
use crate::model::{area_stamp, Area, Vec2};
use crate::Cage;

/// Derived area state, keyed by the cage versions it was built at.
#[derive(Clone, Debug, Default)]
pub struct AreaCache {
    pub areas: Vec<Area>,
    pub topo_ver: u64,
    pub geom_ver: u64,
    pub next_id: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiscoveryStats {
    pub candidates: usize,
    pub unique: usize,
    pub accepted: usize,
    pub steps: usize,
    pub exhausted: bool,
}

/// Endpoint adjacency, sorted and deduplicated. Self-loops are dropped.
fn adjacency(cage: &Cage) -> BTreeMap<u32, Vec<u32>> {
    let mut adj: BTreeMap<u32, BTreeSet<u32>> = BTreeMap::new();
    for b in cage.beams.iter().flatten() {
        let Some((a, z)) = b.endpoints() else { continue };
        if a == z {
            continue;
        }
        adj.entry(a).or_default().insert(z);
        adj.entry(z).or_default().insert(a);
    }
    adj.into_iter().map(|(k, v)| (k, v.into_iter().collect())).collect()
}

/// Budgeted DFS cycle search. The budget caps steps per start vertex, so a
/// dense region cannot starve the starts after it.
fn enumerate_cycles(adj: &BTreeMap<u32, Vec<u32>>, budget: usize, stats: &mut DiscoveryStats) -> Vec<Vec<u32>> {
    let mut out = Vec::new();
    'starts: for &start in adj.keys() {
        let mut steps = 0usize;
        let mut path = vec![start];
        let mut on_path: HashMap<u32, usize> = HashMap::from([(start, 0)]);
        let mut cursor: Vec<usize> = vec![0];
        while let Some(&c) = cursor.last() {
            let depth = cursor.len() - 1;
            let node = path[depth];
            let nbrs = &adj[&node];
            if c >= nbrs.len() {
                cursor.pop();
                if let Some(n) = path.pop() {
                    on_path.remove(&n);
                }
                continue;
            }
            cursor[depth] += 1;
            let next = nbrs[c];
            // Cycles through lower ids were found from those starts
            if next < start {
                continue;
            }
            if steps == budget {
                stats.exhausted = true;
                stats.steps += steps;
                continue 'starts;
            }
            steps += 1;
            if let Some(&idx) = on_path.get(&next) {
                if path.len() - idx > 2 {
                    out.push(path[idx..].to_vec());
                }
                continue;
            }
            on_path.insert(next, path.len());
            path.push(next);
            cursor.push(0);
        }
        stats.steps += steps;
    }
    out
}

/// Closed walks around the faces of the straight-line drawing through beam
/// endpoints. Each directed edge is walked once, so this is linear in the
/// beam count and yields every bounded face of a planar layout. Walks that
/// revisit a vertex are dropped.
fn face_walks(cage: &Cage, adj: &BTreeMap<u32, Vec<u32>>) -> Vec<Vec<u32>> {
    // Neighbors of each vertex in counter-clockwise angular order
    let rot: HashMap<u32, Vec<u32>> = adj
        .iter()
        .map(|(&v, nbrs)| {
            let o = cage.point_pos(v);
            let mut sorted = nbrs.clone();
            sorted.sort_by(|a, b| {
                let da = cage.point_pos(*a) - o;
                let db = cage.point_pos(*b) - o;
                da.y.atan2(da.x).total_cmp(&db.y.atan2(db.x)).then(a.cmp(b))
            });
            (v, sorted)
        })
        .collect();
    let edge_count: usize = adj.values().map(|n| n.len()).sum();
    let mut visited: HashSet<(u32, u32)> = HashSet::new();
    let mut out = Vec::new();
    for (&u0, nbrs) in adj {
        for &v0 in nbrs {
            if visited.contains(&(u0, v0)) {
                continue;
            }
            let mut walk = Vec::new();
            let (mut u, mut v) = (u0, v0);
            while visited.insert((u, v)) && walk.len() <= edge_count {
                walk.push(u);
                let around = &rot[&v];
                let k = around.iter().position(|x| *x == u).unwrap_or(0);
                let w = around[(k + around.len() - 1) % around.len()];
                u = v;
                v = w;
            }
            let distinct: HashSet<u32> = walk.iter().copied().collect();
            if walk.len() > 2 && distinct.len() == walk.len() && (u, v) == (u0, v0) {
                out.push(walk);
            }
        }
    }
    out
}

fn strictly_inside(poly: &[Vec2], p: Vec2) -> bool {
    if !point_in_polygon(poly, p) {
        return false;
    }
    let n = poly.len();
    (0..n).all(|i| dist_point_to_seg_sq(p, poly[i], poly[(i + 1) % n]) > EPS_COINCIDENT)
}

struct Candidate {
    cycle: Vec<u32>,
    stamp: String,
    area: f64,
}

/// Run discovery against the current graph. Returned cycles are
/// counter-clockwise at current positions.
pub fn discover_cycles(cage: &Cage, budget: usize) -> (Vec<Vec<u32>>, DiscoveryStats) {
    let mut stats = DiscoveryStats::default();
    let adj = adjacency(cage);
    log::debug!("area discovery: {} graph nodes, budget {}", adj.len(), budget);
    let mut raw = face_walks(cage, &adj);
    raw.extend(enumerate_cycles(&adj, budget, &mut stats));
    stats.candidates = raw.len();
    if stats.exhausted {
        log::warn!("area discovery hit the {} step cap on some starts; faces off the planar walk may be missing", budget);
    }

    // Shape parameters (arc centers, spline interiors) never block a face
    let endpoints: HashSet<u32> = adj.keys().copied().collect();
    let blockers: Vec<(u32, Vec2)> = cage
        .points
        .iter()
        .enumerate()
        .filter_map(|(i, cp)| {
            let cp = cp.as_ref()?;
            let id = i as u32;
            (cp.beams.is_empty() || endpoints.contains(&id)).then_some((id, cp.pos))
        })
        .collect();

    let mut seen: HashSet<String> = HashSet::new();
    let mut cands: Vec<Candidate> = Vec::new();
    for mut cycle in raw {
        let stamp = area_stamp(&cycle);
        if seen.contains(&stamp) {
            continue;
        }
        let poly: Vec<Vec2> = cycle.iter().map(|&id| cage.point_pos(id)).collect();
        let area = polygon_area(&poly);
        if area.abs() <= EPS_AREA {
            continue;
        }
        let members: HashSet<u32> = cycle.iter().copied().collect();
        if blockers.iter().any(|(id, p)| !members.contains(id) && strictly_inside(&poly, *p)) {
            continue;
        }
        if !is_simple(&poly) {
            continue;
        }
        if area < 0.0 {
            cycle.reverse();
        }
        seen.insert(stamp.clone());
        cands.push(Candidate { cycle, stamp, area: area.abs() });
    }
    stats.unique = cands.len();

    cands.sort_by(|a, b| {
        a.cycle
            .len()
            .cmp(&b.cycle.len())
            .then(a.area.total_cmp(&b.area))
            .then_with(|| a.stamp.cmp(&b.stamp))
    });

    let mut covered: HashSet<u32> = HashSet::new();
    let mut accepted = Vec::new();
    for c in cands {
        if covered.len() == endpoints.len() {
            break;
        }
        if c.cycle.iter().any(|id| !covered.contains(id)) {
            covered.extend(c.cycle.iter().copied());
            accepted.push(c.cycle);
        }
    }
    stats.accepted = accepted.len();
    log::debug!(
        "area discovery: {} candidates, {} unique faces, {} accepted, {} steps",
        stats.candidates,
        stats.unique,
        stats.accepted,
        stats.steps
    );
    (accepted, stats)
}

/// True when `a` and `b` are the same cyclic sequence in either direction.
fn same_cycle(a: &[u32], b: &[u32]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let n = a.len();
    let Some(off) = b.iter().position(|x| *x == a[0]) else { return false };
    let fwd = (0..n).all(|k| a[k] == b[(off + k) % n]);
    let bwd = (0..n).all(|k| a[k] == b[(off + n - k) % n]);
    fwd || bwd
}

fn resolve(cage: &Cage, area: &mut Area) {
    area.polygon = area.cycle.iter().map(|&id| cage.point_pos(id)).collect();
    area.centroid = polygon_centroid(&area.polygon);
}

/// Bring `cache` up to date with `cage`: rediscover on topology change,
/// otherwise re-resolve polygons if positions moved. Returns the discovery
/// stats when a rediscovery ran.
pub(crate) fn refresh(cage: &Cage, cache: &mut AreaCache) -> Option<DiscoveryStats> {
    let mut ran = None;
    if cache.topo_ver != cage.topo_ver {
        let (cycles, stats) = discover_cycles(cage, cage.config.discovery_budget);
        ran = Some(stats);
        let mut previous: HashMap<String, Area> =
            cache.areas.drain(..).map(|a| (a.stamp.clone(), a)).collect();
        let mut next = Vec::with_capacity(cycles.len());
        for cycle in cycles {
            let stamp = area_stamp(&cycle);
            // Same vertex set in a new order is a new face: stored weights
            // would no longer line up with its vertices
            let area = match previous.remove(&stamp) {
                Some(old) if same_cycle(&old.cycle, &cycle) => old,
                _ => {
                    let id = cache.next_id;
                    cache.next_id += 1;
                    Area { id, cycle, stamp, polygon: Vec::new(), centroid: Vec2::ZERO }
                }
            };
            next.push(area);
        }
        if !previous.is_empty() {
            log::debug!("area discovery retired {} areas", previous.len());
        }
        next.sort_by_key(|a| a.id);
        cache.areas = next;
        cache.topo_ver = cage.topo_ver;
        cache.geom_ver = u64::MAX;
    }
    if cache.geom_ver != cage.geom_ver {
        for area in cache.areas.iter_mut() {
            resolve(cage, area);
        }
        cache.geom_ver = cage.geom_ver;
    }
    ran
}
