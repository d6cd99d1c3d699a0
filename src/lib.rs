use wasm_bindgen::prelude::*;
mod api;
mod error;
mod interop;
mod logging;

pub use logging::init_logging;

#[wasm_bindgen]
pub struct Cage { pub(crate) inner: inkcage::Cage }

#[wasm_bindgen]
pub struct Deformer { pub(crate) inner: inkcage::Deformer }

impl Cage {
    pub fn rs_new() -> Cage { Cage { inner: inkcage::Cage::new() } }
    pub fn rs_geom_version(&self) -> u64 { self.inner.geom_version() }
}
