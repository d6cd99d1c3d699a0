use wasm_bindgen::prelude::*;
use js_sys::{Float64Array, Object, Reflect, Uint32Array, Uint8Array};

pub fn new_obj() -> Object { Object::new() }

pub fn set_kv(obj: &Object, key: &str, val: &JsValue) {
    let _ = Reflect::set(obj, &JsValue::from_str(key), val);
}

pub fn arr_u32(data: &[u32]) -> Uint32Array { Uint32Array::from(data) }
pub fn arr_f64(data: &[f64]) -> Float64Array { Float64Array::from(data) }
pub fn arr_u8(data: &[u8]) -> Uint8Array { Uint8Array::from(data) }

/// Interleaved `[x0, y0, x1, y1, ..]` from a point slice.
pub fn flat_xy(points: &[inkcage::model::Vec2]) -> Vec<f64> {
    let mut out = Vec::with_capacity(points.len() * 2);
    for p in points {
        out.push(p.x);
        out.push(p.y);
    }
    out
}

/// Inverse of `flat_xy`; a trailing odd value is ignored.
pub fn points_from_xy(xy: &[f64]) -> Vec<inkcage::model::Vec2> {
    xy.chunks_exact(2).map(|c| inkcage::model::Vec2::new(c[0], c[1])).collect()
}
