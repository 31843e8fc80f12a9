use crate::constants::{CANVAS_ELEMENT_ID, MOUNT_ELEMENT_ID};
use backdrop_core::{PerformanceTier, StaticGradient};
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

pub fn mount_element(document: &web::Document) -> anyhow::Result<web::HtmlElement> {
    document
        .get_element_by_id(MOUNT_ELEMENT_ID)
        .ok_or_else(|| anyhow::anyhow!("missing #{}", MOUNT_ELEMENT_ID))?
        .dyn_into::<web::HtmlElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))
}

/// Existing `#hero-backdrop-canvas`, or a new one appended to the mount.
pub fn ensure_canvas(
    document: &web::Document,
    mount: &web::HtmlElement,
) -> anyhow::Result<web::HtmlCanvasElement> {
    let el = match document.get_element_by_id(CANVAS_ELEMENT_ID) {
        Some(el) => el,
        None => {
            let el = document
                .create_element("canvas")
                .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
            el.set_id(CANVAS_ELEMENT_ID);
            mount
                .append_child(&el)
                .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
            el
        }
    };
    let canvas = el
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    let style = canvas.style();
    _ = style.set_property("position", "absolute");
    _ = style.set_property("inset", "0");
    _ = style.set_property("width", "100%");
    _ = style.set_property("height", "100%");
    _ = style.set_property("pointer-events", "none");
    Ok(canvas)
}

/// Keep the backing store at CSS size times the capped pixel ratio.
/// Returns the backing size in device pixels.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement, tier: &PerformanceTier) -> (u32, u32) {
    let dpr = web::window()
        .map(|w| w.device_pixel_ratio())
        .unwrap_or(1.0) as f32;
    let ratio = tier.effective_pixel_ratio(dpr);
    let rect = canvas.get_bounding_client_rect();
    let w = ((rect.width() as f32) * ratio).round().max(1.0) as u32;
    let h = ((rect.height() as f32) * ratio).round().max(1.0) as u32;
    if canvas.width() != w || canvas.height() != h {
        canvas.set_width(w);
        canvas.set_height(h);
    }
    (w, h)
}

/// Show the live canvas, or hide it behind the static gradient.
pub fn show_animated(mount: &web::HtmlElement, canvas: &web::HtmlCanvasElement) {
    _ = canvas.style().set_property("visibility", "visible");
    _ = mount.style().remove_property("background-image");
}

pub fn show_static(
    mount: &web::HtmlElement,
    canvas: Option<&web::HtmlCanvasElement>,
    gradient: &StaticGradient,
) {
    if let Some(c) = canvas {
        _ = c.style().set_property("visibility", "hidden");
    }
    _ = mount
        .style()
        .set_property("background-image", &gradient.css());
}
