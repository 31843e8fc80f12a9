use crate::session::{Listener, Session};
use backdrop_core::normalize_pointer;
use glam::Vec2;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Window-level `pointermove`, so foreground content over the backdrop still
/// steers it. Samples go through the throttle; the frame loop drains them.
pub fn wire_pointer(session: &Rc<Session>) -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let weak = Rc::downgrade(session);
    let closure = Closure::wrap(Box::new(move |ev: web::Event| {
        let Some(session) = weak.upgrade() else {
            return;
        };
        if !session.is_alive() {
            return;
        }
        let Some(ev) = ev.dyn_ref::<web::PointerEvent>() else {
            return;
        };
        let rect = session.mount.get_bounding_client_rect();
        let pos = normalize_pointer(
            Vec2::new(ev.client_x() as f32, ev.client_y() as f32),
            Vec2::new(rect.left() as f32, rect.top() as f32),
            Vec2::new(rect.width() as f32, rect.height() as f32),
        );
        let now = session.now_ms();
        session.pointer.borrow_mut().on_move(now, pos);
    }) as Box<dyn FnMut(web::Event)>);
    session.add_listener(Listener::attach(window.unchecked_ref(), "pointermove", closure)?);
    Ok(())
}
