// Centralized tolerances and helpers for robust geometry

pub const EPS_DEGENERATE: f64 = 1e-10;    // parallel lines, zero-length vectors
pub const EPS_SEARCH: f64 = 1e-5;         // curve parameter search interval width
pub const EPS_AREA: f64 = 1e-9;           // zero signed-area threshold (units^2)
pub const EPS_WEIGHT: f64 = 1e-12;        // weight-sum guard before renormalizing
pub const EPS_COINCIDENT: f64 = 1e-9;     // query point on a vertex
pub const TANGENT_DELTA: f64 = 1e-5;      // finite difference step for tangents

// Coarse sampling before the ternary refinement in closest-point search
pub const CLOSEST_POINT_SAMPLES: usize = 64;

#[inline] pub fn clamp01(x: f64) -> f64 { x.max(0.0).min(1.0) }
