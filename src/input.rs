//! Pointer samples shared between the DOM listener and the frame loop.

use backdrop_core::PointerThrottle;
use glam::Vec2;

/// Throttled pointer state. The listener feeds raw samples; the frame loop
/// takes at most one target per frame and flushes the trailing sample once
/// the throttle window closes.
#[derive(Debug, Default)]
pub struct PointerInput {
    throttle: PointerThrottle,
    ready: Option<Vec2>,
}

impl PointerInput {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            throttle: PointerThrottle::new(interval_ms),
            ready: None,
        }
    }

    pub fn on_move(&mut self, now_ms: f64, pos: Vec2) {
        if let Some(p) = self.throttle.on_event(now_ms, pos) {
            self.ready = Some(p);
        }
    }

    pub fn take(&mut self, now_ms: f64) -> Option<Vec2> {
        if let Some(p) = self.throttle.poll(now_ms) {
            self.ready = Some(p);
        }
        self.ready.take()
    }
}
