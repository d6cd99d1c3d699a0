use inkcage::error::CageError;
use inkcage::geometry::limits;
use inkcage::model::{PathKind, Vec2};
use inkcage::Cage;
use serde_json::json;

fn v(x: f64, y: f64) -> Vec2 { Vec2::new(x, y) }

fn sample_cage() -> Cage {
    let mut c = Cage::new();
    let ids: Vec<u32> = [v(0.0, 0.0), v(10.0, 0.0), v(10.0, 10.0), v(0.0, 10.0), v(5.0, -4.0)]
        .iter()
        .map(|p| c.add_control_point(*p))
        .collect();
    c.add_beam(&[ids[0], ids[1]], PathKind::Line);
    c.add_beam(&[ids[1], ids[2]], PathKind::Line);
    c.add_beam(&[ids[2], ids[3]], PathKind::Line);
    c.add_beam(&[ids[3], ids[4], ids[0]], PathKind::Spline);
    c
}

#[test]
fn save_load_preserves_graph() {
    let c = sample_cage();
    let doc = c.to_json_value();
    assert_eq!(doc["version"], 1);
    assert!(doc.get("areas").is_none());
    assert_eq!(doc["beams"][3]["kind"], "spline");

    let mut d = Cage::new();
    d.from_json_value(doc.clone()).unwrap();
    assert_eq!(d.control_point_ids(), c.control_point_ids());
    assert_eq!(d.beam_ids(), c.beam_ids());
    for id in c.beam_ids() {
        assert_eq!(d.beam(id).points, c.beam(id).points);
        assert_eq!(d.beam(id).kind, c.beam(id).kind);
        assert_eq!(d.beam_path(id), c.beam_path(id));
    }
    assert_eq!(d.to_json_value(), doc);
    assert_eq!(d.area_count(), c.area_count());
}

#[test]
fn load_marks_topology_dirty() {
    let c = sample_cage();
    let mut d = Cage::new();
    let topo = d.topology_version();
    d.from_json_value(c.to_json_value()).unwrap();
    assert!(d.topology_version() > topo);
    assert_eq!(d.area_count(), 1);
}

#[test]
fn rejects_oversized_beam() {
    let mut c = Cage::new();
    let refs: Vec<u32> = vec![0; limits::MAX_POINTS_PER_BEAM + 1];
    let doc = json!({
        "control_points": [{"id": 0, "x": 0.0, "y": 0.0}],
        "beams": [{"id": 0, "points": refs, "kind": "spline"}]
    });
    assert!(matches!(c.from_json_value(doc), Err(CageError::LimitExceeded { what: "points per beam", .. })));
}

#[test]
fn rejects_huge_ids() {
    let mut c = Cage::new();
    let doc = json!({
        "control_points": [{"id": 4_000_000u32, "x": 0.0, "y": 0.0}],
        "beams": []
    });
    assert!(matches!(c.from_json_value(doc), Err(CageError::LimitExceeded { .. })));
}

#[test]
fn rejects_out_of_bounds_and_duplicates() {
    let mut c = Cage::new();
    let doc = json!({
        "control_points": [{"id": 0, "x": 1.0e12, "y": 0.0}],
        "beams": []
    });
    assert!(matches!(c.from_json_value(doc), Err(CageError::InvalidJson(_))));
    let doc = json!({
        "control_points": [{"id": 0, "x": 0.0, "y": 0.0}, {"id": 0, "x": 1.0, "y": 0.0}],
        "beams": []
    });
    assert!(matches!(c.from_json_value(doc), Err(CageError::InvalidJson(_))));
    let doc = json!({
        "control_points": [{"id": 0, "x": 0.0, "y": 0.0}, {"id": 1, "x": 1.0, "y": 0.0}, {"id": 2, "x": 2.0, "y": 0.0}],
        "beams": [{"id": 0, "points": [0, 1, 2], "kind": "line"}]
    });
    assert!(matches!(c.from_json_value(doc), Err(CageError::InvalidJson(_))));
}

#[test]
fn failed_load_keeps_previous_state() {
    let mut c = sample_cage();
    let before = c.to_json_value();
    let doc = json!({"control_points": "nope", "beams": []});
    assert!(c.from_json_value(doc).is_err());
    assert_eq!(c.to_json_value(), before);
}
