#![cfg(target_arch = "wasm32")]
use backdrop_core::{
    aspect_of, assess, capture_panorama_for_tier, AnimationDriver, BackdropConfig, EffectKind,
    GraphicsProbe, PerformanceTier,
};
use glam::UVec2;
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod capture;
mod constants;
mod device;
mod dom;
mod events;
mod frame;
mod input;
mod render;
mod session;
mod shaders;
mod uniforms;

use constants::VARIANT_DATA_ATTRIBUTE;
use session::Session;

thread_local! {
    static SESSION: RefCell<Option<Rc<Session>>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("backdrop-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

/// Abort any in-flight capture, stop the frame loop and release the renderer.
#[wasm_bindgen]
pub fn unmount() {
    if let Some(session) = SESSION.with(|s| s.borrow_mut().take()) {
        session.teardown();
    }
}

/// `data-variant` on the mount element overrides the configured variant on
/// capable devices; low-end devices keep the gradient.
fn select_variant(mount: &web::HtmlElement, config: &BackdropConfig, tier: &PerformanceTier) -> EffectKind {
    let default = config.effect_for(tier);
    if tier.is_low_end {
        return default;
    }
    mount
        .get_attribute(VARIANT_DATA_ATTRIBUTE)
        .and_then(|name| EffectKind::from_name(name.trim()))
        .unwrap_or(default)
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;
    let mount = dom::mount_element(&document)?;

    let tier = assess(&device::read_device_info(&window));
    let config = BackdropConfig::default();
    let kind = select_variant(&mount, &config, &tier);
    log::info!("[backdrop] variant={}", kind.name());

    let motion_query = device::reduced_motion_query(&window);
    let reduced = motion_query.as_ref().map(|q| q.matches()).unwrap_or(false);
    let session = Rc::new(Session::new(
        mount,
        tier,
        config,
        kind,
        device::current_theme(&document),
        reduced,
    ));
    // Placeholder gradient until the mount scrolls into view.
    session.apply_surface();

    if let Some(previous) = SESSION.with(|s| s.borrow_mut().replace(session.clone())) {
        previous.teardown();
    }

    if let Some(query) = motion_query {
        events::wire_reduced_motion(&session, query, activate)?;
    }
    events::wire_theme_observer(&session, &document)?;
    events::wire_visibility(&session, activate)?;
    Ok(())
}

/// Start the renderer once: visible, motion allowed, not yet started.
fn activate(session: &Rc<Session>) {
    if !session.begin_initialization() {
        return;
    }
    let session = session.clone();
    spawn_local(async move {
        if let Err(e) = start_renderer(&session).await {
            log::error!("renderer init error: {:?}", e);
        }
    });
}

async fn start_renderer(session: &Rc<Session>) -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let canvas = dom::ensure_canvas(&document, &session.mount)?;
    let (width, height) = dom::sync_canvas_backing_size(&canvas, &session.tier);
    session.attach_canvas(canvas.clone());

    // leak a canvas clone to satisfy 'static lifetime for surface
    let leaked_canvas: &'static web::HtmlCanvasElement = Box::leak(Box::new(canvas.clone()));
    let probed = match render::probe_adapter(leaked_canvas).await {
        Ok(p) => p,
        Err(e) => {
            log::info!("[gpu] no adapter: {:?}", e);
            session.set_capability(&GraphicsProbe::unavailable());
            return Ok(());
        }
    };
    if !session.is_alive() {
        return Ok(());
    }
    session.set_capability(&probed.probe);
    if !session.should_render_3d() {
        return Ok(());
    }

    let gpu = match render::GpuState::new(probed, session.kind, &session.tier, width, height).await {
        Ok(g) => g,
        Err(e) => {
            log::info!("[gpu] device setup failed: {:?}", e);
            session.set_capability(&GraphicsProbe::unavailable());
            return Ok(());
        }
    };
    if !session.is_alive() {
        return Ok(());
    }

    let camera = session.kind.camera(aspect_of(UVec2::new(width, height)));
    let driver = AnimationDriver::new(&session.tier, camera, session.theme());
    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        session: session.clone(),
        driver,
        gpu,
        canvas,
        last_instant: Instant::now(),
    }));
    events::wire_pointer(session)?;
    let handle = frame::start_loop(frame_ctx.clone());
    session.attach_renderer(frame_ctx.clone(), handle);

    if session.kind.uses_environment() {
        start_capture(session, frame_ctx)?;
    }
    Ok(())
}

fn start_capture(
    session: &Rc<Session>,
    frame_ctx: Rc<RefCell<frame::FrameContext<'static>>>,
) -> anyhow::Result<()> {
    let handle = capture::CaptureHandle::new()?;
    let signal = handle.signal();
    let fetcher = handle.fetcher();
    session.set_capture(handle);
    let session = session.clone();
    spawn_local(async move {
        let mut decoded = None;
        capture_panorama_for_tier(
            &session.tier,
            &session.config,
            fetcher,
            &signal,
            |panorama, face_size| decoded = Some((panorama, face_size)),
        )
        .await;
        let Some((panorama, face_size)) = decoded else {
            return;
        };
        // Present a frame between the decode and the GPU projection.
        capture::yield_to_browser().await;
        if session.is_alive() && !signal.is_aborted() {
            frame_ctx.borrow_mut().gpu.set_panorama(&panorama, face_size);
        }
    });
    Ok(())
}
