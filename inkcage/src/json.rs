use crate::error::{CageError, CageResult};
use crate::geometry::limits;
use crate::model::{Beam, ControlPoint, PathKind, Vec2};
use crate::Cage;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DOC_VERSION: u32 = 1;

pub fn to_json_impl(c: &Cage) -> Value {
    #[derive(Serialize)]
    struct PointSer {
        id: u32,
        x: f64,
        y: f64,
    }
    #[derive(Serialize)]
    struct BeamSer<'a> {
        id: u32,
        points: &'a [u32],
        kind: PathKind,
    }
    #[derive(Serialize)]
    struct Doc<'a> {
        version: u32,
        control_points: Vec<PointSer>,
        beams: Vec<BeamSer<'a>>,
    }
    let mut control_points = Vec::new();
    for (i, p) in c.points.iter().enumerate() {
        if let Some(p) = p {
            control_points.push(PointSer { id: i as u32, x: p.pos.x, y: p.pos.y });
        }
    }
    let mut beams = Vec::new();
    for (i, b) in c.beams.iter().enumerate() {
        if let Some(b) = b {
            beams.push(BeamSer { id: i as u32, points: &b.points, kind: b.kind });
        }
    }
    let doc = Doc { version: DOC_VERSION, control_points, beams };
    serde_json::to_value(doc).unwrap_or(Value::Null)
}

/// Replace the cage contents with a document. Validation runs before any
/// state is touched, so a rejected document leaves the cage unchanged.
pub fn from_json_impl(c: &mut Cage, v: Value) -> CageResult<()> {
    #[derive(Deserialize)]
    struct PointDe {
        id: u32,
        x: f64,
        y: f64,
    }
    #[derive(Deserialize)]
    struct BeamDe {
        id: u32,
        points: Vec<u32>,
        kind: PathKind,
    }
    #[derive(Deserialize)]
    struct DocDe {
        version: Option<u32>,
        control_points: Vec<PointDe>,
        beams: Vec<BeamDe>,
    }
    let doc: DocDe = serde_json::from_value(v).map_err(|e| CageError::InvalidJson(e.to_string()))?;
    if let Some(ver) = doc.version {
        if ver != DOC_VERSION {
            return Err(CageError::InvalidJson(format!("unsupported version {}", ver)));
        }
    }
    if doc.control_points.len() > limits::MAX_CONTROL_POINTS {
        return Err(CageError::LimitExceeded { what: "control_points", max: limits::MAX_CONTROL_POINTS });
    }
    if doc.beams.len() > limits::MAX_BEAMS {
        return Err(CageError::LimitExceeded { what: "beams", max: limits::MAX_BEAMS });
    }
    let max_point_id = doc.control_points.iter().map(|p| p.id).max();
    let max_beam_id = doc.beams.iter().map(|b| b.id).max();
    // Ids are arena slots; bound them so a sparse document can't force a
    // huge allocation
    if max_point_id.is_some_and(|m| m as usize >= limits::MAX_CONTROL_POINTS) {
        return Err(CageError::LimitExceeded { what: "control point id", max: limits::MAX_CONTROL_POINTS });
    }
    if max_beam_id.is_some_and(|m| m as usize >= limits::MAX_BEAMS) {
        return Err(CageError::LimitExceeded { what: "beam id", max: limits::MAX_BEAMS });
    }

    let mut points: Vec<Option<ControlPoint>> = vec![None; max_point_id.map_or(0, |m| m as usize + 1)];
    for p in &doc.control_points {
        if !p.x.is_finite() || !p.y.is_finite() {
            return Err(CageError::NonFinite { param: "control point coordinate" });
        }
        if !limits::in_coord_bounds(p.x) || !limits::in_coord_bounds(p.y) {
            return Err(CageError::InvalidJson(format!("control point {} out of bounds", p.id)));
        }
        let slot = &mut points[p.id as usize];
        if slot.is_some() {
            return Err(CageError::InvalidJson(format!("duplicate control point id {}", p.id)));
        }
        *slot = Some(ControlPoint { pos: Vec2::new(p.x, p.y), beams: Vec::new() });
    }

    let mut beams: Vec<Option<Beam>> = vec![None; max_beam_id.map_or(0, |m| m as usize + 1)];
    for b in doc.beams {
        if b.points.is_empty() {
            return Err(CageError::InvalidJson(format!("beam {} has no control points", b.id)));
        }
        if b.points.len() > limits::MAX_POINTS_PER_BEAM {
            return Err(CageError::LimitExceeded { what: "points per beam", max: limits::MAX_POINTS_PER_BEAM });
        }
        if b.kind.max_points().is_some_and(|m| b.points.len() > m) {
            return Err(CageError::InvalidJson(format!("beam {} has too many points for {:?}", b.id, b.kind)));
        }
        for &pid in &b.points {
            match points.get_mut(pid as usize).and_then(|p| p.as_mut()) {
                Some(cp) => cp.add_beam(b.id),
                None => {
                    return Err(CageError::InvalidJson(format!("beam {} references unknown control point {}", b.id, pid)))
                }
            }
        }
        let slot = &mut beams[b.id as usize];
        if slot.is_some() {
            return Err(CageError::InvalidJson(format!("duplicate beam id {}", b.id)));
        }
        *slot = Some(Beam { points: b.points, kind: b.kind, path: Vec::new(), built_ver: 0 });
    }

    c.clear();
    c.points = points;
    c.beams = beams;
    c.rebuild_paths();
    log::debug!("loaded cage: {} control points, {} beams", c.control_point_count(), c.beam_count());
    Ok(())
}
