use wasm_bindgen::prelude::*;
use web_sys::console;

static LOGGER: WasmLog = WasmLog;

/// Forwards `log` records to the browser console.
pub struct WasmLog;

impl log::Log for WasmLog {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let (out, name, color): (fn(&JsValue, &JsValue), &str, &str) = match record.level() {
            log::Level::Trace => (console::debug_2, "trace", "color:plum"),
            log::Level::Debug => (console::debug_2, "debug", "color:cyan"),
            log::Level::Info => (console::info_2, "info", "color:mediumseagreen"),
            log::Level::Warn => (console::warn_2, "warn", "color:goldenrod"),
            log::Level::Error => (console::error_2, "error", "color:red"),
        };
        let msg = format!("%c{}\t{}: {}", name, record.target(), record.args());
        out(&JsValue::from_str(&msg), &JsValue::from_str(color));
    }

    fn flush(&self) {}
}

fn level_from(name: &str) -> log::LevelFilter {
    match name.to_ascii_lowercase().as_str() {
        "off" => log::LevelFilter::Off,
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        _ => log::LevelFilter::Info,
    }
}

/// Install the console logger. Later calls only change the level.
/// Unknown level names fall back to `info`.
#[wasm_bindgen]
pub fn init_logging(level: &str) {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level_from(level));
}
