use crate::{Cage, Deformer};
use inkcage::config::CageConfig;
use inkcage::model::{PathKind, Vec2};
use inkcage::geometry::limits;
use js_sys::{Float64Array, Uint32Array};
use wasm_bindgen::prelude::*;
type JsValue = wasm_bindgen::JsValue;
use crate::error;
use crate::interop::{arr_f64, arr_u32, arr_u8, flat_xy, new_obj, points_from_xy, set_kv};

#[wasm_bindgen]
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn finite_xy(x: f64, y: f64) -> Result<Vec2, JsValue> {
    if !x.is_finite() {
        return Err(error::non_finite("x"));
    }
    if !y.is_finite() {
        return Err(error::non_finite("y"));
    }
    Ok(Vec2::new(x, y))
}

fn non_negative(param: &str, v: f64) -> Result<f64, JsValue> {
    if !v.is_finite() {
        return Err(error::non_finite(param));
    }
    if v < 0.0 {
        return Err(error::out_of_range(param, 0.0, f64::MAX, v));
    }
    Ok(v)
}

#[wasm_bindgen]
impl Cage {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Cage {
        crate::Cage::rs_new()
    }
    pub fn geom_version(&self) -> u64 {
        self.rs_geom_version()
    }
    pub fn topology_version(&self) -> u64 {
        self.inner.topology_version()
    }

    // Config
    pub fn get_config_json(&self) -> String {
        serde_json::to_string(self.inner.config()).unwrap_or_default()
    }
    /// Partial documents keep defaults for absent fields.
    pub fn set_config_json_res(&mut self, s: &str) -> JsValue {
        let cfg = match CageConfig::from_json_str(s) {
            Ok(c) => c,
            Err(e) => return error::from_cage(&e),
        };
        match self.inner.set_config(cfg) {
            Ok(()) => error::ok(JsValue::TRUE),
            Err(e) => error::from_cage(&e),
        }
    }

    // Control points
    pub fn add_control_point(&mut self, x: f64, y: f64) -> u32 {
        self.inner.add_control_point(Vec2::new(x, y))
    }
    pub fn add_control_point_res(&mut self, x: f64, y: f64) -> JsValue {
        match finite_xy(x, y) {
            Ok(p) => error::ok(JsValue::from_f64(self.inner.add_control_point(p) as f64)),
            Err(e) => e,
        }
    }
    pub fn find_or_add_control_point(&mut self, x: f64, y: f64) -> u32 {
        self.inner.find_or_add_control_point(Vec2::new(x, y))
    }
    pub fn find_or_add_control_point_res(&mut self, x: f64, y: f64) -> JsValue {
        match finite_xy(x, y) {
            Ok(p) => error::ok(JsValue::from_f64(self.inner.find_or_add_control_point(p) as f64)),
            Err(e) => e,
        }
    }
    pub fn find_near(&self, x: f64, y: f64, radius: f64) -> Option<u32> {
        self.inner.find_near(Vec2::new(x, y), radius)
    }
    pub fn move_control_point(&mut self, id: u32, x: f64, y: f64) -> bool {
        if self.inner.get_control_point(id).is_none() {
            return false;
        }
        self.inner.move_control_point(id, Vec2::new(x, y));
        true
    }
    pub fn move_control_point_res(&mut self, id: u32, x: f64, y: f64) -> JsValue {
        let p = match finite_xy(x, y) {
            Ok(p) => p,
            Err(e) => return e,
        };
        if self.inner.get_control_point(id).is_none() {
            return error::invalid_id("control_point", id);
        }
        self.inner.move_control_point(id, p);
        error::ok(JsValue::TRUE)
    }
    /// Absorbed id, or undefined when nothing was within merge distance.
    pub fn merge_control_point(&mut self, id: u32) -> Option<u32> {
        self.inner.get_control_point(id)?;
        self.inner.merge_control_point(id)
    }
    pub fn merge_control_point_res(&mut self, id: u32) -> JsValue {
        if self.inner.get_control_point(id).is_none() {
            return error::invalid_id("control_point", id);
        }
        match self.inner.merge_control_point(id) {
            Some(other) => error::ok(JsValue::from_f64(other as f64)),
            None => error::ok(JsValue::NULL),
        }
    }
    pub fn remove_control_point(&mut self, id: u32) -> bool {
        if self.inner.get_control_point(id).is_none() {
            return false;
        }
        self.inner.remove_control_point(id);
        true
    }
    pub fn remove_control_point_res(&mut self, id: u32) -> JsValue {
        if self.inner.get_control_point(id).is_none() {
            return error::invalid_id("control_point", id);
        }
        self.inner.remove_control_point(id);
        error::ok(JsValue::TRUE)
    }
    pub fn get_control_point(&self, id: u32) -> JsValue {
        match self.inner.get_control_point(id) {
            Some(cp) => serde_wasm_bindgen::to_value(&vec![cp.pos.x, cp.pos.y]).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }
    pub fn control_point_count(&self) -> u32 {
        self.inner.control_point_count()
    }

    // Beams
    pub fn add_beam(&mut self, points: &[u32], kind: u8) -> Option<u32> {
        let kind = PathKind::from_u8(kind)?;
        if points.is_empty() || points.iter().any(|p| self.inner.get_control_point(*p).is_none()) {
            return None;
        }
        if kind.max_points().is_some_and(|m| points.len() > m) {
            return None;
        }
        Some(self.inner.add_beam(points, kind))
    }
    pub fn add_beam_res(&mut self, points: &[u32], kind: u8) -> JsValue {
        let Some(k) = PathKind::from_u8(kind) else {
            return error::invalid_kind(kind);
        };
        let max = k.max_points().unwrap_or(limits::MAX_POINTS_PER_BEAM);
        if points.is_empty() || points.len() > max {
            return error::out_of_range("points.length", 1.0, max as f64, points.len() as f64);
        }
        if let Some(bad) = points.iter().find(|p| self.inner.get_control_point(**p).is_none()) {
            return error::invalid_id("control_point", *bad);
        }
        error::ok(JsValue::from_f64(self.inner.add_beam(points, k) as f64))
    }
    pub fn add_control_point_to_beam_res(&mut self, beam: u32, point: u32) -> JsValue {
        if self.inner.get_beam(beam).is_none() {
            return error::invalid_id("beam", beam);
        }
        if self.inner.get_control_point(point).is_none() {
            return error::invalid_id("control_point", point);
        }
        error::ok(JsValue::from_bool(self.inner.add_control_point_to_beam(beam, point)))
    }
    pub fn remove_beam(&mut self, id: u32) -> bool {
        if self.inner.get_beam(id).is_none() {
            return false;
        }
        self.inner.remove_beam(id);
        true
    }
    pub fn remove_beam_res(&mut self, id: u32) -> JsValue {
        if self.inner.get_beam(id).is_none() {
            return error::invalid_id("beam", id);
        }
        self.inner.remove_beam(id);
        error::ok(JsValue::TRUE)
    }
    pub fn insert_spline_control_point_res(&mut self, beam: u32, x: f64, y: f64) -> JsValue {
        let p = match finite_xy(x, y) {
            Ok(p) => p,
            Err(e) => return e,
        };
        match self.inner.get_beam(beam) {
            None => return error::invalid_id("beam", beam),
            Some(b) if b.kind != PathKind::Spline => {
                return error::err("invalid_kind", "beam is not a spline", None)
            }
            Some(_) => {}
        }
        match self.inner.insert_spline_control_point(beam, p) {
            Some(id) => error::ok(JsValue::from_f64(id as f64)),
            None => error::degenerate("spline"),
        }
    }
    pub fn beam_count(&self) -> u32 {
        self.inner.beam_count()
    }

    // Queries
    pub fn pick(&self, x: f64, y: f64, tol: f64) -> JsValue {
        match self.inner.pick(Vec2::new(x, y), tol) {
            Some(p) => serde_wasm_bindgen::to_value(&p).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }
    pub fn pick_res(&self, x: f64, y: f64, tol: f64) -> JsValue {
        let p = match finite_xy(x, y) {
            Ok(p) => p,
            Err(e) => return e,
        };
        let tol = match non_negative("tol", tol) {
            Ok(t) => t,
            Err(e) => return e,
        };
        match self.inner.pick(p, tol) {
            Some(hit) => error::ok(serde_wasm_bindgen::to_value(&hit).unwrap_or(JsValue::NULL)),
            None => error::ok(JsValue::NULL),
        }
    }
    pub fn closest_point_on_beam_res(&self, beam: u32, x: f64, y: f64) -> JsValue {
        let p = match finite_xy(x, y) {
            Ok(p) => p,
            Err(e) => return e,
        };
        if self.inner.get_beam(beam).is_none() {
            return error::invalid_id("beam", beam);
        }
        match self.inner.closest_point_on_beam(beam, p) {
            Some(hit) => {
                let o = new_obj();
                set_kv(&o, "t", &JsValue::from_f64(hit.t));
                set_kv(&o, "x", &JsValue::from_f64(hit.point.x));
                set_kv(&o, "y", &JsValue::from_f64(hit.point.y));
                set_kv(&o, "dist", &JsValue::from_f64(hit.dist));
                error::ok(o.into())
            }
            None => error::degenerate("beam curve"),
        }
    }

    // Typed arrays getters
    pub fn get_control_point_data(&self) -> JsValue {
        let (ids, pos) = self.inner.get_control_point_arrays();
        let obj = new_obj();
        set_kv(&obj, "ids", &arr_u32(&ids).into());
        set_kv(&obj, "positions", &arr_f64(&pos).into());
        obj.into()
    }
    /// Beam ids, kinds and paths. `path_offsets[i]..path_offsets[i+1]`
    /// indexes points of beam i in `paths`.
    pub fn get_beam_data(&self) -> JsValue {
        let ids = self.inner.beam_ids();
        let mut kinds = Vec::with_capacity(ids.len());
        let mut offsets = Vec::with_capacity(ids.len() + 1);
        let mut paths = Vec::new();
        offsets.push(0u32);
        for id in &ids {
            let b = self.inner.beam(*id);
            kinds.push(b.kind as u8);
            paths.extend(flat_xy(&b.path));
            offsets.push((paths.len() / 2) as u32);
        }
        let obj = new_obj();
        set_kv(&obj, "ids", &arr_u32(&ids).into());
        set_kv(&obj, "kinds", &arr_u8(&kinds).into());
        set_kv(&obj, "path_offsets", &arr_u32(&offsets).into());
        set_kv(&obj, "paths", &arr_f64(&paths).into());
        obj.into()
    }
    pub fn get_beam_path(&self, id: u32) -> Option<Float64Array> {
        self.inner.get_beam(id).map(|b| arr_f64(&flat_xy(&b.path)))
    }
    pub fn get_beam_points(&self, id: u32) -> Option<Uint32Array> {
        self.inner.get_beam(id).map(|b| arr_u32(&b.points))
    }
    /// Same layout as `get_beam_data`, plus interleaved centroids.
    pub fn get_area_data(&self) -> JsValue {
        self.inner.with_areas(|areas| {
            let mut ids = Vec::with_capacity(areas.len());
            let mut offsets = vec![0u32];
            let mut cycles = Vec::new();
            let mut polygons = Vec::new();
            let mut centroids = Vec::with_capacity(areas.len() * 2);
            for a in areas {
                ids.push(a.id);
                cycles.extend_from_slice(&a.cycle);
                polygons.extend(flat_xy(&a.polygon));
                offsets.push(cycles.len() as u32);
                centroids.push(a.centroid.x);
                centroids.push(a.centroid.y);
            }
            let obj = new_obj();
            set_kv(&obj, "ids", &arr_u32(&ids).into());
            set_kv(&obj, "offsets", &arr_u32(&offsets).into());
            set_kv(&obj, "cycles", &arr_u32(&cycles).into());
            set_kv(&obj, "polygons", &arr_f64(&polygons).into());
            set_kv(&obj, "centroids", &arr_f64(&centroids).into());
            obj.into()
        })
    }
    pub fn area_count(&self) -> u32 {
        self.inner.area_count()
    }
    pub fn discover_areas(&self) -> JsValue {
        let s = self.inner.discover_areas();
        let o = new_obj();
        set_kv(&o, "candidates", &JsValue::from_f64(s.candidates as f64));
        set_kv(&o, "unique", &JsValue::from_f64(s.unique as f64));
        set_kv(&o, "accepted", &JsValue::from_f64(s.accepted as f64));
        set_kv(&o, "steps", &JsValue::from_f64(s.steps as f64));
        set_kv(&o, "exhausted", &JsValue::from_bool(s.exhausted));
        o.into()
    }
    pub fn area_containing(&self, x: f64, y: f64) -> Option<u32> {
        self.inner.area_containing(Vec2::new(x, y))
    }

    // Persistence
    pub fn to_json(&self) -> String {
        self.inner.to_json_value().to_string()
    }
    pub fn from_json(&mut self, s: &str) -> bool {
        match serde_json::from_str(s) {
            Ok(v) => self.inner.from_json_value(v).is_ok(),
            Err(_) => false,
        }
    }
    pub fn from_json_res(&mut self, s: &str) -> JsValue {
        let v: serde_json::Value = match serde_json::from_str(s) {
            Ok(v) => v,
            Err(e) => return error::err("invalid_json", e.to_string(), None),
        };
        match self.inner.from_json_value(v) {
            Ok(()) => error::ok(JsValue::TRUE),
            Err(e) => error::from_cage(&e),
        }
    }
    pub fn clear(&mut self) {
        self.inner.clear()
    }
}

impl Default for Cage {
    fn default() -> Self {
        Cage::new()
    }
}

#[wasm_bindgen]
impl Deformer {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Deformer {
        Deformer { inner: inkcage::Deformer::new() }
    }
    /// Bind interleaved xy points. Returns one flag per point, 1 when bound.
    pub fn bind(&mut self, cage: &Cage, xy: &[f64]) -> Vec<u8> {
        let bound = self.inner.bind(&cage.inner, &points_from_xy(xy));
        bound.iter().map(|b| b.is_some() as u8).collect()
    }
    pub fn bind_res(&mut self, cage: &Cage, xy: &[f64]) -> JsValue {
        if xy.len() % 2 != 0 {
            return error::err("out_of_range", "xy must hold an even number of values", None);
        }
        if xy.iter().any(|v| !v.is_finite()) {
            return error::non_finite("xy");
        }
        error::ok(arr_u8(&self.bind(cage, xy)).into())
    }
    /// Rewrite the bound points of `xy` in place. Returns how many moved.
    pub fn update(&self, cage: &Cage, xy: &mut [f64]) -> u32 {
        let mut pts = points_from_xy(xy);
        let moved = self.inner.update(&cage.inner, &mut pts);
        for (i, p) in pts.iter().enumerate() {
            xy[2 * i] = p.x;
            xy[2 * i + 1] = p.y;
        }
        moved as u32
    }
    pub fn position_res(&self, cage: &Cage, index: u32) -> JsValue {
        match self.inner.position(&cage.inner, index as usize) {
            Ok(p) => error::ok(arr_f64(&[p.x, p.y]).into()),
            Err(e) => error::from_cage(&e),
        }
    }
    pub fn detach(&mut self, index: u32) -> bool {
        self.inner.detach(index as usize)
    }
    pub fn len(&self) -> u32 {
        self.inner.len() as u32
    }
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
    pub fn bound_count(&self) -> u32 {
        self.inner.bound_count() as u32
    }
    pub fn clear(&mut self) {
        self.inner.clear()
    }
}

impl Default for Deformer {
    fn default() -> Self {
        Deformer::new()
    }
}
