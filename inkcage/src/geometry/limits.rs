// Centralized ingestion limits to harden against untrusted documents (JSON)

// Scene size caps
pub const MAX_CONTROL_POINTS: usize = 100_000;
pub const MAX_BEAMS: usize = 200_000;
pub const MAX_POINTS_PER_BEAM: usize = 4_096;

// Numeric bounds
pub const COORD_MIN: f64 = -10_000_000.0;
pub const COORD_MAX: f64 =  10_000_000.0;

#[inline]
pub fn in_coord_bounds(x: f64) -> bool { x.is_finite() && x >= COORD_MIN && x <= COORD_MAX }
