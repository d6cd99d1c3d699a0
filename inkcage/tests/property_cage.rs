use inkcage::algorithms::coords::{mean_value, reconstruct, wachspress};
use inkcage::geometry::polygon::ensure_ccw;
use inkcage::model::{InfluenceTarget, PathKind, Vec2};
use inkcage::Cage;
use proptest::prelude::*;

fn regular(n: usize, cx: f64, cy: f64, r: f64, rot: f64) -> Vec<Vec2> {
    (0..n)
        .map(|i| {
            let a = rot + i as f64 / n as f64 * std::f64::consts::TAU;
            Vec2::new(cx + r * a.cos(), cy + r * a.sin())
        })
        .collect()
}

// Interior point as a convex combination of the center and one fan triangle
fn interior(poly: &[Vec2], center: Vec2, k: usize, s: f64, t: f64) -> Vec2 {
    let a = poly[k % poly.len()];
    let b = poly[(k + 1) % poly.len()];
    let (s, t) = if s + t > 0.9 { (s * 0.45, t * 0.45) } else { (s, t) };
    center + (a - center) * s + (b - center) * t
}

fn all_present(w: Vec<f64>) -> Vec<Option<f64>> {
    w.into_iter().map(Some).collect()
}

proptest! {
    #[test]
    fn convex_coordinates_partition_unity(
        n in 3usize..10,
        cx in -50.0f64..50.0,
        cy in -50.0f64..50.0,
        r in 1.0f64..40.0,
        rot in 0.0f64..6.3,
        k in 0usize..10,
        s in 0.05f64..0.9,
        t in 0.05f64..0.9,
        clockwise in any::<bool>(),
    ) {
        let mut poly = regular(n, cx, cy, r, rot);
        if clockwise {
            poly.reverse();
        }
        let p = interior(&poly, Vec2::new(cx, cy), k, s, t);
        for w in [wachspress(&poly, p).unwrap(), mean_value(&poly, p).unwrap()] {
            let sum: f64 = w.iter().sum();
            prop_assert!((sum - 1.0).abs() < 1e-9);
            let q = reconstruct(&poly, &all_present(w)).unwrap();
            prop_assert!(q.dist(p) < 1e-6, "{:?} vs {:?}", q, p);
        }
    }

    #[test]
    fn ensure_ccw_is_idempotent(pts in prop::collection::vec((-100i32..100, -100i32..100), 3..12)) {
        let poly: Vec<Vec2> = pts.iter().map(|(x, y)| Vec2::new(*x as f64, *y as f64)).collect();
        let once = ensure_ccw(&poly);
        let twice = ensure_ccw(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn square_cage_round_trip(x in 0.2f64..9.8, y in 0.2f64..9.8) {
        let mut cage = Cage::new();
        let ids: Vec<u32> = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]
            .iter()
            .map(|(a, b)| cage.add_control_point(Vec2::new(*a, *b)))
            .collect();
        for i in 0..4 {
            cage.add_beam(&[ids[i], ids[(i + 1) % 4]], PathKind::Line);
        }
        let p = Vec2::new(x, y);
        let inf = cage.compute_influence(p).unwrap();
        prop_assert!(matches!(inf.target, InfluenceTarget::Area(_)));
        prop_assert!(cage.reconstruct(&inf).unwrap().dist(p) < 1e-6);
    }

    #[test]
    fn edits_keep_back_references_consistent(ops in prop::collection::vec((0u8..4, any::<u16>(), any::<u16>(), -50i16..50, -50i16..50), 1..60)) {
        let mut cage = Cage::new();
        for (op, a, b, x, y) in ops {
            let live = cage.control_point_ids();
            let pos = Vec2::new(x as f64, y as f64);
            match op {
                0 => { cage.add_control_point(pos); }
                1 if live.len() >= 2 => {
                    let pa = live[a as usize % live.len()];
                    let pb = live[b as usize % live.len()];
                    if pa != pb {
                        cage.add_beam(&[pa, pb], PathKind::Line);
                    }
                }
                2 if !live.is_empty() => {
                    cage.move_control_point(live[a as usize % live.len()], pos);
                }
                3 if !live.is_empty() => {
                    cage.merge_control_point(live[a as usize % live.len()]);
                }
                _ => {}
            }
        }
        for bid in cage.beam_ids() {
            let beam = cage.beam(bid);
            prop_assert!(beam.points.iter().any(|p| *p != beam.points[0]));
            for p in &beam.points {
                prop_assert!(cage.control_point(*p).beams.contains(&bid));
            }
        }
        for pid in cage.control_point_ids() {
            for bid in &cage.control_point(pid).beams {
                prop_assert!(cage.beam(*bid).points.contains(&pid));
            }
        }
        for area in cage.areas() {
            prop_assert!(area.cycle.len() >= 3);
            prop_assert_eq!(area.polygon.len(), area.cycle.len());
        }
    }
}
