//! Per-frame animation state and the pointer input throttle.

use crate::constants::{
    POINTER_LERP_DEFAULT, POINTER_LERP_LOW_END, POINTER_THROTTLE_MS, STALL_THRESHOLD_SEC,
};
use crate::palette::{Palette, Theme};
use crate::profiler::PerformanceTier;
use crate::state::Camera;
use glam::{UVec2, Vec2};

/// Parameter record owned by the renderer and rewritten in place each frame.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderParameters {
    /// Seconds since mount; never decreases.
    pub time: f32,
    pub resolution: UVec2,
    /// Smoothed pointer in [0, 1]^2, y down.
    pub pointer: Vec2,
    pub camera: Camera,
    pub theme: Theme,
    pub palette: Palette,
    pub quality: f32,
    pub intensity: f32,
    pub glow: f32,
}

impl RenderParameters {
    pub fn new(tier: &PerformanceTier, camera: Camera, theme: Theme) -> Self {
        Self {
            time: 0.0,
            resolution: UVec2::ONE,
            pointer: Vec2::splat(0.5),
            camera,
            theme,
            palette: Palette::for_theme(theme),
            quality: tier.quality(),
            intensity: 1.0,
            glow: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameUpdate {
    /// Delta exceeded the stall threshold; nothing changed.
    Skipped,
    Updated,
}

pub struct AnimationDriver {
    params: RenderParameters,
    pointer_target: Vec2,
    lerp_rate: f32,
}

impl AnimationDriver {
    pub fn new(tier: &PerformanceTier, camera: Camera, theme: Theme) -> Self {
        Self {
            params: RenderParameters::new(tier, camera, theme),
            pointer_target: Vec2::splat(0.5),
            lerp_rate: if tier.is_low_end {
                POINTER_LERP_LOW_END
            } else {
                POINTER_LERP_DEFAULT
            },
        }
    }

    pub fn params(&self) -> &RenderParameters {
        &self.params
    }

    pub fn lerp_rate(&self) -> f32 {
        self.lerp_rate
    }

    pub fn pointer_target(&self) -> Vec2 {
        self.pointer_target
    }

    /// Latest raw pointer sample; out-of-range input is clamped.
    pub fn set_pointer_target(&mut self, pos: Vec2) {
        if pos.is_finite() {
            self.pointer_target = pos.clamp(Vec2::ZERO, Vec2::ONE);
        }
    }

    /// Advance one frame. `elapsed` is wall-clock seconds since mount.
    pub fn tick(&mut self, elapsed: f32, delta: f32, resolution: UVec2, theme: Theme) -> FrameUpdate {
        if !delta.is_finite() || delta > STALL_THRESHOLD_SEC {
            return FrameUpdate::Skipped;
        }
        let p = &mut self.params;
        if elapsed.is_finite() {
            p.time = p.time.max(elapsed);
        }
        if p.resolution != resolution {
            p.resolution = resolution;
            p.camera.set_aspect_from(resolution);
        }
        let smoothed = p.pointer + (self.pointer_target - p.pointer) * self.lerp_rate;
        p.pointer = smoothed.clamp(Vec2::ZERO, Vec2::ONE);
        if p.theme != theme {
            p.theme = theme;
            p.palette.assign(&Palette::for_theme(theme));
        }
        FrameUpdate::Updated
    }
}

/// Rate limiter for pointer events with trailing-edge coalescing: the first
/// event of a window is emitted immediately, later ones replace a pending
/// sample that [`PointerThrottle::poll`] releases once the window closes.
#[derive(Clone, Debug)]
pub struct PointerThrottle {
    interval_ms: f64,
    last_emit: Option<f64>,
    pending: Option<Vec2>,
}

impl Default for PointerThrottle {
    fn default() -> Self {
        Self::new(POINTER_THROTTLE_MS)
    }
}

impl PointerThrottle {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            last_emit: None,
            pending: None,
        }
    }

    fn window_open(&self, now_ms: f64) -> bool {
        self.last_emit
            .map(|last| now_ms - last >= self.interval_ms)
            .unwrap_or(true)
    }

    pub fn on_event(&mut self, now_ms: f64, pos: Vec2) -> Option<Vec2> {
        if self.window_open(now_ms) {
            self.last_emit = Some(now_ms);
            self.pending = None;
            Some(pos)
        } else {
            self.pending = Some(pos);
            None
        }
    }

    pub fn poll(&mut self, now_ms: f64) -> Option<Vec2> {
        if self.pending.is_some() && self.window_open(now_ms) {
            self.last_emit = Some(now_ms);
            self.pending.take()
        } else {
            None
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Map a client-space position into the element's [0, 1]^2 rectangle.
pub fn normalize_pointer(client: Vec2, origin: Vec2, size: Vec2) -> Vec2 {
    let size = size.max(Vec2::ONE);
    ((client - origin) / size).clamp(Vec2::ZERO, Vec2::ONE)
}
