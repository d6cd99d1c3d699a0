use serde::{Deserialize, Serialize};

use crate::error::{CageError, CageResult};
use crate::model::CoordScheme;

/// Tunables for authoring and binding. Geometric tolerances live in
/// `geometry::tolerance`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CageConfig {
    /// Control points closer than this are merged by `merge_control_point`.
    pub merge_distance: f64,
    /// Search radius for `find_near` and `find_or_add_control_point`.
    pub snap_radius: f64,
    /// Sample steps per beam path.
    pub path_steps: usize,
    /// Maximum distance from a beam for beam-relative binding.
    pub beam_bind_radius: f64,
    pub coord_scheme: CoordScheme,
    /// Drop polygon vertices hidden from the query point.
    pub visibility: bool,
    /// Cap on DFS steps from each start vertex during area discovery.
    pub discovery_budget: usize,
}

impl Default for CageConfig {
    fn default() -> Self {
        CageConfig {
            merge_distance: 5.0,
            snap_radius: 5.0,
            path_steps: 100,
            beam_bind_radius: 20.0,
            coord_scheme: CoordScheme::Wachspress,
            visibility: false,
            discovery_budget: 1_024,
        }
    }
}

impl CageConfig {
    /// Parse a (possibly partial) JSON document; absent fields keep defaults.
    pub fn from_json_str(s: &str) -> CageResult<CageConfig> {
        let cfg: CageConfig = serde_json::from_str(s).map_err(|e| CageError::InvalidJson(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> CageResult<()> {
        let distances = [
            ("merge_distance", self.merge_distance),
            ("snap_radius", self.snap_radius),
            ("beam_bind_radius", self.beam_bind_radius),
        ];
        for (param, d) in distances {
            if !d.is_finite() {
                return Err(CageError::NonFinite { param });
            }
            if d < 0.0 {
                return Err(CageError::InvalidJson(format!("{} must be non-negative", param)));
            }
        }
        if self.path_steps == 0 {
            return Err(CageError::InvalidJson("path_steps must be at least 1".into()));
        }
        Ok(())
    }
}
