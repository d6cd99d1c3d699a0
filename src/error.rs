use wasm_bindgen::prelude::*;
use inkcage::error::CageError;

use crate::interop::{new_obj, set_kv};

/// Plain object from key/value pairs, for the `data` field of an error.
fn data(fields: &[(&str, JsValue)]) -> Option<JsValue> {
    let d = new_obj();
    for (k, v) in fields {
        set_kv(&d, k, v);
    }
    Some(d.into())
}

pub fn ok(v: JsValue) -> JsValue {
    let o = new_obj();
    set_kv(&o, "ok", &JsValue::TRUE);
    set_kv(&o, "value", &v);
    o.into()
}

/// `{ ok: false, error: { code, message, data? } }`
pub fn err(code: &'static str, message: impl Into<String>, data: Option<JsValue>) -> JsValue {
    let e = new_obj();
    set_kv(&e, "code", &JsValue::from_str(code));
    set_kv(&e, "message", &JsValue::from_str(&message.into()));
    if let Some(d) = data {
        set_kv(&e, "data", &d);
    }
    let root = new_obj();
    set_kv(&root, "ok", &JsValue::FALSE);
    set_kv(&root, "error", &e.into());
    root.into()
}

pub fn non_finite(param: &str) -> JsValue {
    let fields = [("param", JsValue::from_str(param))];
    err("non_finite", format!("parameter '{}' must be finite", param), data(&fields))
}

pub fn out_of_range(param: &str, min: f64, max: f64, got: f64) -> JsValue {
    let fields = [
        ("param", JsValue::from_str(param)),
        ("min", JsValue::from_f64(min)),
        ("max", JsValue::from_f64(max)),
        ("got", JsValue::from_f64(got)),
    ];
    err("out_of_range", format!("parameter '{}' out of range", param), data(&fields))
}

pub fn invalid_id(kind: &str, id: u32) -> JsValue {
    let fields = [("kind", JsValue::from_str(kind)), ("id", JsValue::from_f64(id as f64))];
    err("invalid_id", format!("invalid {} id", kind), data(&fields))
}

pub fn invalid_kind(got: u8) -> JsValue {
    let fields = [("got", JsValue::from_f64(got as f64))];
    err("invalid_kind", "kind must be 0:Line, 1:Arc, 2:Spline", data(&fields))
}

pub fn degenerate(what: &str) -> JsValue {
    let fields = [("what", JsValue::from_str(what))];
    err("degenerate", format!("degenerate {}", what), data(&fields))
}

/// Map a core error onto the facade's codes. Limits surface as `out_of_range`.
pub fn from_cage(e: &CageError) -> JsValue {
    match e {
        CageError::NonFinite { param } => non_finite(param),
        CageError::Degenerate { what } => degenerate(what),
        CageError::LimitExceeded { what, max } => {
            let fields = [("what", JsValue::from_str(what)), ("max", JsValue::from_f64(*max as f64))];
            err("out_of_range", e.to_string(), data(&fields))
        }
        CageError::InvalidJson(msg) => err("invalid_json", msg.clone(), None),
        CageError::NotBound => err(e.code(), e.to_string(), None),
    }
}
