//! Parametric beam paths over `t ∈ [0, 1]` and the dense sampling used for
//! rendering and projection.

use std::f64::consts::TAU;

use crate::model::{PathKind, Vec2};
use super::math::normalize;
use super::tolerance::{clamp01, CLOSEST_POINT_SAMPLES, EPS_DEGENERATE, EPS_SEARCH, TANGENT_DELTA};

#[derive(Clone, Debug, PartialEq)]
pub enum Curve {
    Line { a: Vec2, b: Vec2 },
    Arc { center: Vec2, radius: f64, start: f64, end: f64 },
    /// Catmull-Rom through `points`, with reflected virtual end points.
    CatmullRom { points: Vec<Vec2>, first: Vec2, last: Vec2 },
}

impl Curve {
    /// Build the curve for a beam kind from resolved control positions.
    /// Returns `None` when there are too few points for the kind.
    pub fn from_controls(kind: PathKind, controls: &[Vec2]) -> Option<Curve> {
        if controls.len() < kind.min_points() {
            return None;
        }
        match kind {
            PathKind::Line => Some(Curve::Line { a: controls[0], b: controls[1] }),
            PathKind::Arc => {
                let center = controls[0];
                let r = controls[1] - center;
                let start = r.y.atan2(r.x);
                let end = match controls.get(2) {
                    Some(p) => {
                        let e = *p - center;
                        let mut end = e.y.atan2(e.x);
                        while end <= start + EPS_DEGENERATE {
                            end += TAU;
                        }
                        end
                    }
                    None => start + TAU,
                };
                Some(Curve::Arc { center, radius: r.length(), start, end })
            }
            PathKind::Spline => {
                let n = controls.len();
                Some(Curve::CatmullRom {
                    points: controls.to_vec(),
                    first: controls[1].reflect(controls[0]),
                    last: controls[n - 2].reflect(controls[n - 1]),
                })
            }
        }
    }

    pub fn eval(&self, t: f64) -> Vec2 {
        match self {
            Curve::Line { a, b } => a.lerp(*b, t),
            Curve::Arc { center, radius, start, end } => {
                let ang = start + t * (end - start);
                Vec2::new(center.x + radius * ang.cos(), center.y + radius * ang.sin())
            }
            Curve::CatmullRom { points, first, last } => {
                let segs = points.len() - 1;
                let scaled = clamp01(t) * segs as f64;
                let i = (scaled.floor() as usize).min(segs - 1);
                let local = scaled - i as f64;
                let p0 = if i == 0 { *first } else { points[i - 1] };
                let p3 = if i + 2 >= points.len() { *last } else { points[i + 2] };
                catmull_rom_point(p0, points[i], points[i + 1], p3, local)
            }
        }
    }

    /// `steps + 1` samples including both ends.
    pub fn sample(&self, steps: usize) -> Vec<Vec2> {
        let steps = steps.max(1);
        (0..=steps).map(|i| self.eval(i as f64 / steps as f64)).collect()
    }

    /// Unit tangent by finite difference; `None` where the curve is stationary.
    pub fn tangent(&self, t: f64) -> Option<Vec2> {
        let (t0, t1) = if t + TANGENT_DELTA <= 1.0 { (t, t + TANGENT_DELTA) } else { (t - TANGENT_DELTA, t) };
        normalize(self.eval(t1) - self.eval(t0))
    }

    /// Parameter of the point on the curve closest to `target`.
    ///
    /// A coarse scan picks the bracket, then ternary search narrows it to
    /// `EPS_SEARCH`. Results are approximate to that tolerance.
    pub fn closest_param(&self, target: Vec2) -> f64 {
        let n = CLOSEST_POINT_SAMPLES;
        let mut best_i = 0usize;
        let mut best_d = f64::INFINITY;
        for i in 0..=n {
            let d = self.eval(i as f64 / n as f64).dist_sq(target);
            if d < best_d {
                best_d = d;
                best_i = i;
            }
        }
        let mut lo = best_i.saturating_sub(1) as f64 / n as f64;
        let mut hi = ((best_i + 1).min(n)) as f64 / n as f64;
        let mut best_t = best_i as f64 / n as f64;
        while hi - lo > EPS_SEARCH {
            let m1 = lo + (hi - lo) / 3.0;
            let m2 = hi - (hi - lo) / 3.0;
            let d1 = self.eval(m1).dist_sq(target);
            let d2 = self.eval(m2).dist_sq(target);
            if d1 < d2 {
                hi = m2;
            } else {
                lo = m1;
            }
            if d1 < best_d {
                best_d = d1;
                best_t = m1;
            }
            if d2 < best_d {
                best_d = d2;
                best_t = m2;
            }
        }
        best_t
    }
}

pub fn catmull_rom_point(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f64) -> Vec2 {
    let t2 = t * t;
    let t3 = t2 * t;
    let f = |a: f64, b: f64, c: f64, d: f64| {
        0.5 * ((-a + 3.0 * b - 3.0 * c + d) * t3 + (2.0 * a - 5.0 * b + 4.0 * c - d) * t2 + (-a + c) * t + 2.0 * b)
    };
    Vec2::new(f(p0.x, p1.x, p2.x, p3.x), f(p0.y, p1.y, p2.y, p3.y))
}

/// Dense path for a beam. Returns an empty sequence if the kind lacks points.
pub fn generate(kind: PathKind, controls: &[Vec2], steps: usize) -> Vec<Vec2> {
    Curve::from_controls(kind, controls).map(|c| c.sample(steps)).unwrap_or_default()
}

/// Position in `controls` at which a new spline point for parameter `t`
/// belongs, and the point itself.
pub fn spline_insertion(controls: &[Vec2], t: f64) -> Option<(usize, Vec2)> {
    let curve = Curve::from_controls(PathKind::Spline, controls)?;
    let segs = controls.len() - 1;
    let seg = ((clamp01(t) * segs as f64).floor() as usize).min(segs - 1);
    Some((seg + 1, curve.eval(t)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64) -> Vec2 { Vec2::new(x, y) }

    #[test]
    fn line_samples_are_even() {
        let pts = generate(PathKind::Line, &[v(0.0, 0.0), v(10.0, 0.0)], 10);
        assert_eq!(pts.len(), 11);
        assert!(pts[3].dist(v(3.0, 0.0)) < 1e-12);
    }

    #[test]
    fn spline_passes_through_controls() {
        let ctrl = [v(0.0, 0.0), v(10.0, 5.0), v(20.0, 0.0), v(30.0, 5.0)];
        let c = Curve::from_controls(PathKind::Spline, &ctrl).unwrap();
        for (i, p) in ctrl.iter().enumerate() {
            let t = i as f64 / 3.0;
            assert!(c.eval(t).dist(*p) < 1e-9, "control {} missed", i);
        }
    }

    #[test]
    fn two_point_spline_is_straight() {
        let c = Curve::from_controls(PathKind::Spline, &[v(0.0, 0.0), v(10.0, 0.0)]).unwrap();
        assert!(c.eval(0.5).dist(v(5.0, 0.0)) < 1e-9);
    }

    #[test]
    fn full_circle_arc() {
        let pts = generate(PathKind::Arc, &[v(0.0, 0.0), v(5.0, 0.0)], 100);
        for p in &pts {
            assert!((p.length() - 5.0).abs() < 1e-9);
        }
        assert!(pts[0].dist(pts[100]) < 1e-9);
        assert!(pts[25].dist(v(0.0, 5.0)) < 1e-9);
    }

    #[test]
    fn partial_arc_ends_at_angle() {
        let c = Curve::from_controls(PathKind::Arc, &[v(0.0, 0.0), v(5.0, 0.0), v(0.0, 2.0)]).unwrap();
        assert!(c.eval(1.0).dist(v(0.0, 5.0)) < 1e-9);
        assert!(c.eval(0.5).dist(v(5.0 * std::f64::consts::FRAC_1_SQRT_2, 5.0 * std::f64::consts::FRAC_1_SQRT_2)) < 1e-9);
    }

    #[test]
    fn closest_param_on_line() {
        let c = Curve::from_controls(PathKind::Line, &[v(0.0, 0.0), v(10.0, 0.0)]).unwrap();
        let t = c.closest_param(v(3.0, 4.0));
        assert!((t - 0.3).abs() < 1e-4);
        let t_end = c.closest_param(v(15.0, 1.0));
        assert!(t_end > 1.0 - 1e-4);
    }

    #[test]
    fn tangent_at_end_uses_backward_difference() {
        let c = Curve::from_controls(PathKind::Line, &[v(0.0, 0.0), v(0.0, 10.0)]).unwrap();
        let t = c.tangent(1.0).unwrap();
        assert!(t.dist(v(0.0, 1.0)) < 1e-9);
        let degenerate = Curve::from_controls(PathKind::Line, &[v(1.0, 1.0), v(1.0, 1.0)]).unwrap();
        assert!(degenerate.tangent(0.5).is_none());
    }

    #[test]
    fn insertion_lands_in_segment() {
        let ctrl = [v(0.0, 0.0), v(10.0, 0.0), v(20.0, 0.0)];
        let (idx, p) = spline_insertion(&ctrl, 0.75).unwrap();
        assert_eq!(idx, 2);
        assert!((p.x - 15.0).abs() < 1e-9);
    }
}
