use crate::constants::{REDUCED_MOTION_QUERY, THEME_DARK_CLASS};
use backdrop_core::{DeviceInfo, Theme};
use wasm_bindgen::JsValue;
use web_sys as web;

/// One-shot read of the navigator facts the profiler needs.
pub fn read_device_info(window: &web::Window) -> DeviceInfo {
    let navigator = window.navigator();
    let cores = navigator.hardware_concurrency();
    // `deviceMemory` is Chromium-only and missing from web-sys.
    let memory = js_sys::Reflect::get(&navigator, &JsValue::from_str("deviceMemory"))
        .ok()
        .and_then(|v| v.as_f64());
    DeviceInfo {
        logical_cores: (cores.is_finite() && cores > 0.0).then_some(cores as u32),
        device_memory_gb: memory.filter(|m| m.is_finite()).map(|m| m as f32),
        user_agent: navigator.user_agent().unwrap_or_default(),
    }
}

pub fn current_theme(document: &web::Document) -> Theme {
    let dark = document
        .document_element()
        .map(|el| el.class_list().contains(THEME_DARK_CLASS))
        .unwrap_or(false);
    Theme::from_is_dark(dark)
}

pub fn reduced_motion_query(window: &web::Window) -> Option<web::MediaQueryList> {
    window.match_media(REDUCED_MOTION_QUERY).ok().flatten()
}
