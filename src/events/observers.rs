use crate::constants::{THEME_ATTRIBUTE, VISIBILITY_ROOT_MARGIN, VISIBILITY_THRESHOLD};
use crate::device;
use crate::session::{Listener, Observer, Session};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

/// One-shot intersection trigger. `on_visible` runs once, after which the
/// observer disconnects itself.
pub fn wire_visibility(session: &Rc<Session>, on_visible: fn(&Rc<Session>)) -> anyhow::Result<()> {
    let weak = Rc::downgrade(session);
    let closure = Closure::wrap(Box::new(
        move |entries: js_sys::Array, observer: web::IntersectionObserver| {
            let Some(session) = weak.upgrade() else {
                observer.disconnect();
                return;
            };
            let ratio = entries
                .iter()
                .filter_map(|e| e.dyn_into::<web::IntersectionObserverEntry>().ok())
                .filter(|e| e.is_intersecting())
                .map(|e| e.intersection_ratio())
                .fold(0.0_f64, f64::max);
            if session.on_visibility(ratio as f32) {
                observer.disconnect();
                session.apply_surface();
                on_visible(&session);
            }
        },
    )
        as Box<dyn FnMut(js_sys::Array, web::IntersectionObserver)>);

    let init = web::IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(VISIBILITY_THRESHOLD));
    init.set_root_margin(VISIBILITY_ROOT_MARGIN);
    let observer =
        web::IntersectionObserver::new_with_options(closure.as_ref().unchecked_ref(), &init)
            .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    observer.observe(&session.mount);
    session.add_observer(Observer::Intersection(observer, closure));
    Ok(())
}

/// Live `prefers-reduced-motion` subscription. `on_enabled` runs when motion
/// becomes allowed again, so a backdrop that never started can start now.
pub fn wire_reduced_motion(
    session: &Rc<Session>,
    query: web::MediaQueryList,
    on_enabled: fn(&Rc<Session>),
) -> anyhow::Result<()> {
    let weak = Rc::downgrade(session);
    let query_read = query.clone();
    let closure = Closure::wrap(Box::new(move |_ev: web::Event| {
        let Some(session) = weak.upgrade() else {
            return;
        };
        let reduced = query_read.matches();
        session.set_reduced_motion(reduced);
        if !reduced {
            on_enabled(&session);
        }
    }) as Box<dyn FnMut(web::Event)>);
    session.add_listener(Listener::attach(query.unchecked_ref(), "change", closure)?);
    Ok(())
}

/// Watch `<html class>` for the page theme switch.
pub fn wire_theme_observer(session: &Rc<Session>, document: &web::Document) -> anyhow::Result<()> {
    let root = document
        .document_element()
        .ok_or_else(|| anyhow::anyhow!("no document element"))?;
    let weak = Rc::downgrade(session);
    let doc = document.clone();
    let closure = Closure::wrap(Box::new(
        move |_records: js_sys::Array, _observer: web::MutationObserver| {
            if let Some(session) = weak.upgrade() {
                session.set_theme(device::current_theme(&doc));
            }
        },
    ) as Box<dyn FnMut(js_sys::Array, web::MutationObserver)>);

    let observer = web::MutationObserver::new(closure.as_ref().unchecked_ref())
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    let init = web::MutationObserverInit::new();
    init.set_attributes(true);
    let filter = js_sys::Array::of1(&JsValue::from_str(THEME_ATTRIBUTE));
    init.set_attribute_filter(&filter);
    observer
        .observe_with_options(&root, &init)
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    session.add_observer(Observer::Mutation(observer, closure));
    Ok(())
}
