use crate::dom;
use crate::render;
use crate::session::Session;
use backdrop_core::{AnimationDriver, FrameUpdate, SurfaceMode};
use instant::Instant;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameContext<'a> {
    pub session: Rc<Session>,
    pub driver: AnimationDriver,
    pub gpu: render::GpuState<'a>,
    pub canvas: web::HtmlCanvasElement,
    pub last_instant: Instant,
}

impl<'a> FrameContext<'a> {
    pub fn frame(&mut self) {
        let now = Instant::now();
        let dt_sec = (now - self.last_instant).as_secs_f32();
        self.last_instant = now;

        let session = &self.session;
        if !session.is_alive() || self.gpu.is_disposed() {
            return;
        }
        if session.mode() != SurfaceMode::Animated {
            return;
        }

        // Trailing pointer sample whose throttle window has closed.
        let sample = session.pointer.borrow_mut().take(session.now_ms());
        if let Some(pos) = sample {
            self.driver.set_pointer_target(pos);
        }

        let (w, h) = dom::sync_canvas_backing_size(&self.canvas, &session.tier);
        self.gpu.resize_if_needed(w, h);

        let update = self
            .driver
            .tick(session.elapsed_secs(), dt_sec, self.gpu.size(), session.theme());
        if update == FrameUpdate::Skipped {
            return;
        }
        self.gpu.update_frame(self.driver.params());
        match self.gpu.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => self.gpu.reconfigure(),
            Err(e) => log::error!("[frame] surface error: {:?}", e),
        }
    }
}

/// `requestAnimationFrame` chain. The tick re-arms itself only while the
/// session wants frames; `resume` restarts it, `cancel` stops it and drops
/// the closure (and with it the frame context).
pub struct LoopHandle {
    tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
    raf_id: Rc<Cell<Option<i32>>>,
}

impl LoopHandle {
    /// Request the next frame unless one is already pending.
    pub fn resume(&self) {
        if self.raf_id.get().is_none() {
            request_frame(&self.tick, &self.raf_id);
        }
    }

    /// Drop the pending request but keep the closure for `resume`.
    pub fn pause(&self) {
        if let Some(id) = self.raf_id.take() {
            if let Some(w) = web::window() {
                _ = w.cancel_animation_frame(id);
            }
        }
    }

    pub fn cancel(&self) {
        self.pause();
        self.tick.borrow_mut().take();
    }
}

fn request_frame(
    tick: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
    raf_id: &Rc<Cell<Option<i32>>>,
) {
    let id = web::window().and_then(|w| {
        tick.borrow()
            .as_ref()
            .and_then(|cb| w.request_animation_frame(cb.as_ref().unchecked_ref()).ok())
    });
    raf_id.set(id);
}

/// Build the frame chain paused; the session resumes it once the renderer
/// is attached.
pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext<'static>>>) -> LoopHandle {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let raf_id = Rc::new(Cell::new(None));
    let tick_clone = tick.clone();
    let raf_clone = raf_id.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        raf_clone.set(None);
        let wants_frames = {
            let mut ctx = frame_ctx.borrow_mut();
            ctx.frame();
            ctx.session.wants_frames()
        };
        if wants_frames {
            request_frame(&tick_clone, &raf_clone);
        }
    }) as Box<dyn FnMut()>));
    LoopHandle { tick, raf_id }
}
