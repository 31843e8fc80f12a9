use crate::capture::CaptureHandle;
use crate::constants::POINTER_THROTTLE_MS;
use crate::dom;
use crate::frame::{FrameContext, LoopHandle};
use crate::input::PointerInput;
use backdrop_core::{
    BackdropConfig, EffectKind, GraphicsProbe, LifecycleGate, PerformanceTier, SurfaceMode, Theme,
};
use instant::Instant;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// DOM listener kept so it can be removed on unmount.
pub struct Listener {
    target: web::EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(web::Event)>,
}

impl Listener {
    pub fn attach(
        target: &web::EventTarget,
        event: &'static str,
        closure: Closure<dyn FnMut(web::Event)>,
    ) -> anyhow::Result<Self> {
        target
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
        Ok(Self {
            target: target.clone(),
            event,
            closure,
        })
    }

    fn detach(&self) {
        _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
    }
}

pub enum Observer {
    Intersection(
        web::IntersectionObserver,
        Closure<dyn FnMut(js_sys::Array, web::IntersectionObserver)>,
    ),
    Mutation(
        web::MutationObserver,
        Closure<dyn FnMut(js_sys::Array, web::MutationObserver)>,
    ),
}

impl Observer {
    fn disconnect(&self) {
        match self {
            Observer::Intersection(o, _) => o.disconnect(),
            Observer::Mutation(o, _) => o.disconnect(),
        }
    }
}

/// Everything one mounted backdrop owns. Async callbacks hold a `Weak` to it
/// and bail out once `alive` is cleared.
pub struct Session {
    pub tier: PerformanceTier,
    pub config: BackdropConfig,
    pub kind: EffectKind,
    pub mount: web::HtmlElement,
    pub pointer: RefCell<PointerInput>,
    canvas: RefCell<Option<web::HtmlCanvasElement>>,
    gate: RefCell<LifecycleGate>,
    theme: Cell<Theme>,
    alive: Cell<bool>,
    started: Instant,
    capture: RefCell<Option<CaptureHandle>>,
    renderer: RefCell<Option<(Rc<RefCell<FrameContext<'static>>>, LoopHandle)>>,
    listeners: RefCell<Vec<Listener>>,
    observers: RefCell<Vec<Observer>>,
}

impl Session {
    pub fn new(
        mount: web::HtmlElement,
        tier: PerformanceTier,
        config: BackdropConfig,
        kind: EffectKind,
        theme: Theme,
        reduced_motion: bool,
    ) -> Self {
        Self {
            tier,
            config,
            kind,
            mount,
            pointer: RefCell::new(PointerInput::new(POINTER_THROTTLE_MS)),
            canvas: RefCell::new(None),
            gate: RefCell::new(LifecycleGate::new(reduced_motion)),
            theme: Cell::new(theme),
            alive: Cell::new(true),
            started: Instant::now(),
            capture: RefCell::new(None),
            renderer: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
            observers: RefCell::new(Vec::new()),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.get()
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.started.elapsed().as_secs_f32()
    }

    pub fn now_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    pub fn theme(&self) -> Theme {
        self.theme.get()
    }

    pub fn mode(&self) -> SurfaceMode {
        self.gate.borrow().mode()
    }

    pub fn should_render_3d(&self) -> bool {
        self.gate.borrow().should_render_3d()
    }

    pub fn wants_frames(&self) -> bool {
        self.is_alive() && self.gate.borrow().wants_frames()
    }

    /// Swap the visible surface to match the gate.
    pub fn apply_surface(&self) {
        if !self.is_alive() {
            return;
        }
        let canvas = self.canvas.borrow();
        match self.mode() {
            SurfaceMode::Animated => {
                if let Some(c) = canvas.as_ref() {
                    dom::show_animated(&self.mount, c);
                }
            }
            SurfaceMode::Placeholder | SurfaceMode::StaticFallback(_) => {
                let gradient = self.gate.borrow().fallback(self.theme());
                dom::show_static(&self.mount, canvas.as_ref(), &gradient);
            }
        }
    }

    /// Returns true when this ratio made the mount element visible.
    pub fn on_visibility(&self, ratio: f32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.gate.borrow_mut().on_visibility(ratio)
    }

    pub fn set_reduced_motion(&self, reduced: bool) {
        if !self.is_alive() {
            return;
        }
        let swapped = self.gate.borrow_mut().set_reduced_motion(reduced);
        if let Some(mode) = swapped {
            log::info!("[gate] reduced motion={} -> {:?}", reduced, mode);
            self.apply_surface();
            // The loop stops re-arming on its own; restart it when animation returns.
            if let Some((_, handle)) = self.renderer.borrow().as_ref() {
                if self.wants_frames() {
                    handle.resume();
                } else {
                    handle.pause();
                }
            }
        }
    }

    pub fn set_theme(&self, theme: Theme) {
        if !self.is_alive() || self.theme.get() == theme {
            return;
        }
        self.theme.set(theme);
        // The live renderer picks the theme up on its next frame.
        if self.mode() != SurfaceMode::Animated {
            self.apply_surface();
        }
    }

    pub fn set_capability(&self, probe: &GraphicsProbe) {
        if !self.is_alive() {
            return;
        }
        self.gate.borrow_mut().set_capability(probe);
        self.apply_surface();
    }

    /// Claim the single initialization slot. False if already started,
    /// not yet visible or animation is unwanted.
    pub fn begin_initialization(&self) -> bool {
        if !self.is_alive() {
            return false;
        }
        let mut gate = self.gate.borrow_mut();
        if !gate.needs_initialization() {
            return false;
        }
        gate.begin_initialization();
        true
    }

    pub fn attach_canvas(&self, canvas: web::HtmlCanvasElement) {
        *self.canvas.borrow_mut() = Some(canvas);
    }

    /// Keep the running renderer and show it; the canvas stays hidden
    /// behind the placeholder until this point.
    pub fn attach_renderer(&self, frame: Rc<RefCell<FrameContext<'static>>>, handle: LoopHandle) {
        if !self.is_alive() {
            handle.cancel();
            frame.borrow_mut().gpu.dispose();
            return;
        }
        self.gate.borrow_mut().mark_renderer_ready();
        if self.wants_frames() {
            handle.resume();
        }
        *self.renderer.borrow_mut() = Some((frame, handle));
        self.apply_surface();
    }

    pub fn set_capture(&self, handle: CaptureHandle) {
        *self.capture.borrow_mut() = Some(handle);
    }

    pub fn add_listener(&self, listener: Listener) {
        self.listeners.borrow_mut().push(listener);
    }

    pub fn add_observer(&self, observer: Observer) {
        self.observers.borrow_mut().push(observer);
    }

    /// Abort the capture, stop the loop, dispose the renderer and detach
    /// every subscription. Idempotent.
    pub fn teardown(&self) {
        if !self.alive.replace(false) {
            return;
        }
        if let Some(capture) = self.capture.borrow_mut().take() {
            capture.abort();
        }
        if let Some((frame, handle)) = self.renderer.borrow_mut().take() {
            handle.cancel();
            frame.borrow_mut().gpu.dispose();
        }
        for listener in self.listeners.borrow_mut().drain(..) {
            listener.detach();
        }
        for observer in self.observers.borrow_mut().drain(..) {
            observer.disconnect();
        }
        log::info!("[backdrop] unmounted");
    }
}
