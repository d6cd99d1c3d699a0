use inkcage::config::CageConfig;
use inkcage::model::{CoordScheme, InfluenceCoords, InfluenceTarget, PathKind, Vec2};
use inkcage::{Cage, Deformer};

fn v(x: f64, y: f64) -> Vec2 { Vec2::new(x, y) }

fn cage_with(config: CageConfig, pts: &[Vec2]) -> (Cage, Vec<u32>) {
    let mut cage = Cage::with_config(config);
    let ids: Vec<u32> = pts.iter().map(|p| cage.add_control_point(*p)).collect();
    for i in 0..ids.len() {
        cage.add_beam(&[ids[i], ids[(i + 1) % ids.len()]], PathKind::Line);
    }
    (cage, ids)
}

fn square() -> (Cage, Vec<u32>) {
    cage_with(CageConfig::default(), &[v(0.0, 0.0), v(10.0, 0.0), v(10.0, 10.0), v(0.0, 10.0)])
}

const ELL: [Vec2; 6] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(10.0, 0.0),
    Vec2::new(10.0, 5.0),
    Vec2::new(5.0, 5.0),
    Vec2::new(5.0, 10.0),
    Vec2::new(0.0, 10.0),
];

#[test]
fn square_center_moves_to_seven_and_a_half() {
    let (mut cage, ids) = square();
    let inf = cage.compute_influence(v(5.0, 5.0)).unwrap();
    match &inf.coords {
        InfluenceCoords::Area { scheme, weights } => {
            assert_eq!(*scheme, CoordScheme::Wachspress);
            assert_eq!(weights.len(), 4);
            for w in weights {
                assert!((w.unwrap() - 0.25).abs() < 1e-12);
            }
        }
        other => panic!("expected area coordinates, got {:?}", other),
    }
    cage.move_control_point(ids[2], v(20.0, 20.0));
    let p = cage.reconstruct(&inf).unwrap();
    assert!(p.dist(v(7.5, 7.5)) < 1e-9, "got {:?}", p);
}

#[test]
fn round_trip_inside_area() {
    let (cage, _) = square();
    for p in [v(1.0, 1.0), v(9.5, 3.0), v(2.0, 8.0), v(5.0, 0.5)] {
        let inf = cage.compute_influence(p).unwrap();
        assert!(matches!(inf.target, InfluenceTarget::Area(_)));
        assert!(cage.reconstruct(&inf).unwrap().dist(p) < 1e-6);
    }
}

#[test]
fn round_trip_on_beam() {
    let mut cage = Cage::new();
    let a = cage.add_control_point(v(0.0, 0.0));
    let b = cage.add_control_point(v(20.0, 0.0));
    let c = cage.add_control_point(v(40.0, 10.0));
    cage.add_beam(&[a, b, c], PathKind::Spline);
    for p in [v(5.0, 3.0), v(15.0, -4.0), v(30.0, 8.0)] {
        let inf = cage.compute_influence(p).unwrap();
        assert!(matches!(inf.target, InfluenceTarget::Beam(_)));
        let q = cage.reconstruct(&inf).unwrap();
        assert!(q.dist(p) < 1e-3, "{:?} came back as {:?}", p, q);
    }
}

#[test]
fn round_trip_past_beam_ends() {
    let mut cage = Cage::new();
    let a = cage.add_control_point(v(0.0, 0.0));
    let b = cage.add_control_point(v(10.0, 0.0));
    cage.add_beam(&[a, b], PathKind::Line);
    for p in [v(12.0, 1.0), v(-5.0, -3.0), v(19.0, 0.0)] {
        let inf = cage.compute_influence(p).unwrap();
        let q = cage.reconstruct(&inf).unwrap();
        assert!(q.dist(p) < 1e-6, "{:?} came back as {:?}", p, q);
    }
    let inf = cage.compute_influence(v(12.0, 1.0)).unwrap();
    cage.move_control_point(a, v(0.0, 5.0));
    cage.move_control_point(b, v(10.0, 5.0));
    assert!(cage.reconstruct(&inf).unwrap().dist(v(12.0, 6.0)) < 1e-6);
}

#[test]
fn zero_length_beam_is_not_bound() {
    let mut cage = Cage::new();
    let a = cage.add_control_point(v(0.0, 0.0));
    let b = cage.add_control_point(v(0.0, 0.0));
    cage.add_beam(&[a, b], PathKind::Line);
    let c = cage.add_control_point(v(0.0, 5.0));
    let d = cage.add_control_point(v(10.0, 5.0));
    let line = cage.add_beam(&[c, d], PathKind::Line);
    let p = v(0.0, 1.0);
    let inf = cage.compute_influence(p).unwrap();
    assert_eq!(inf.target, InfluenceTarget::Beam(line));
    assert!(cage.reconstruct(&inf).unwrap().dist(p) < 1e-6);
}

#[test]
fn beam_binding_follows_translation() {
    let mut cage = Cage::new();
    let a = cage.add_control_point(v(0.0, 0.0));
    let b = cage.add_control_point(v(10.0, 0.0));
    cage.add_beam(&[a, b], PathKind::Line);
    let inf = cage.compute_influence(v(4.0, 2.0)).unwrap();
    cage.move_control_point(a, v(0.0, 5.0));
    cage.move_control_point(b, v(10.0, 5.0));
    assert!(cage.reconstruct(&inf).unwrap().dist(v(4.0, 7.0)) < 1e-3);
}

#[test]
fn far_point_is_unbound() {
    let (cage, _) = square();
    assert!(cage.compute_influence(v(100.0, 100.0)).is_none());
    assert!(cage.compute_influence(v(f64::NAN, 1.0)).is_none());
}

#[test]
fn vertex_weight_scales_displacement() {
    let (mut cage, ids) = square();
    let p = v(3.0, 6.0);
    let inf = cage.compute_influence(p).unwrap();
    let InfluenceCoords::Area { weights, .. } = &inf.coords else { panic!("not an area influence") };
    let area = cage.areas()[0].clone();
    let k = area.cycle.iter().position(|id| *id == ids[2]).unwrap();
    let w = weights[k].unwrap();
    let d = v(0.01, -0.02);
    cage.move_control_point(ids[2], v(10.0, 10.0) + d);
    let moved = cage.reconstruct(&inf).unwrap();
    let expected = p + d * w;
    assert!(moved.dist(expected) < 1e-9);
}

#[test]
fn concave_area_round_trip_per_scheme() {
    for scheme in [CoordScheme::Wachspress, CoordScheme::MeanValue, CoordScheme::Barycentric] {
        let config = CageConfig { coord_scheme: scheme, ..CageConfig::default() };
        let (cage, _) = cage_with(config, &ELL);
        assert_eq!(cage.area_count(), 1);
        for p in [v(2.0, 7.0), v(8.0, 2.0), v(3.0, 3.0)] {
            let inf = cage.compute_influence(p).unwrap();
            let q = cage.reconstruct(&inf).unwrap();
            assert!(q.dist(p) < 1e-6, "{:?}: {:?} came back as {:?}", scheme, p, q);
        }
    }
}

#[test]
fn visibility_leaves_hidden_vertex_out() {
    let config = CageConfig { coord_scheme: CoordScheme::MeanValue, visibility: true, ..CageConfig::default() };
    let (cage, ids) = cage_with(config, &ELL);
    let p = v(9.0, 1.0);
    let inf = cage.compute_influence(p).unwrap();
    let InfluenceCoords::Area { weights, .. } = &inf.coords else { panic!("not an area influence") };
    let area = cage.areas()[0].clone();
    let k = area.cycle.iter().position(|id| *id == ids[4]).unwrap();
    assert_eq!(weights[k], None);
    assert!(cage.reconstruct(&inf).unwrap().dist(p) < 1e-6);
}

#[test]
fn smallest_containing_area_wins() {
    // Two crossing bars; neither has a corner inside the other
    let mut cage = Cage::new();
    let mut bar = |pts: [Vec2; 4]| -> Vec<u32> {
        let ids: Vec<u32> = pts.iter().map(|p| cage.add_control_point(*p)).collect();
        for i in 0..4 {
            cage.add_beam(&[ids[i], ids[(i + 1) % 4]], PathKind::Line);
        }
        ids
    };
    let _wide = bar([v(0.0, 4.0), v(20.0, 4.0), v(20.0, 6.0), v(0.0, 6.0)]);
    let tall = bar([v(9.0, 0.0), v(11.0, 0.0), v(11.0, 10.0), v(9.0, 10.0)]);
    assert_eq!(cage.area_count(), 2);
    let id = cage.area_containing(v(10.0, 5.0)).unwrap();
    let mut cycle = cage.get_area(id).unwrap().cycle;
    cycle.sort();
    assert_eq!(cycle, tall);
    assert!(cage.area_containing(v(2.0, 5.0)).is_some());
}

#[test]
fn deformer_updates_in_place() {
    let (mut cage, ids) = square();
    let mut deformer = Deformer::new();
    let mut stroke = vec![v(5.0, 5.0), v(2.0, 2.0), v(300.0, 300.0)];
    let bound = deformer.bind(&cage, &stroke);
    assert_eq!(bound.iter().filter(|b| b.is_some()).count(), 2);
    cage.move_control_point(ids[2], v(20.0, 20.0));
    assert_eq!(deformer.update(&cage, &mut stroke), 2);
    assert!(stroke[0].dist(v(7.5, 7.5)) < 1e-9);
    assert_eq!(stroke[2], v(300.0, 300.0));

    deformer.detach(0);
    let before = stroke[0];
    cage.move_control_point(ids[2], v(10.0, 10.0));
    deformer.update(&cage, &mut stroke);
    assert_eq!(stroke[0], before);
    assert!(stroke[1].dist(v(2.0, 2.0)) < 1e-9);
}

#[test]
#[should_panic(expected = "unknown area id")]
fn reconstruct_against_retired_area_is_fatal() {
    let (mut cage, _) = square();
    let inf = cage.compute_influence(v(5.0, 5.0)).unwrap();
    cage.remove_beam(0);
    let _ = cage.reconstruct(&inf);
}
