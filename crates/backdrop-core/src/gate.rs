//! Mount-time gating: visibility, graphics capability and reduced motion.

use crate::palette::{StaticGradient, Theme};

/// Case-insensitive renderer-name fragments of software rasterizers,
/// virtual GPUs and integrated parts too weak for the marching shader.
pub const WEAK_RENDERER_PATTERNS: &[&str] = &[
    "swiftshader",
    "llvmpipe",
    "softpipe",
    "software",
    "microsoft basic render",
    "mesa offscreen",
    "virtualbox",
    "vmware svga",
    "intel(r) hd graphics",
    "mali-4",
    "adreno (tm) 3",
    "powervr sgx",
];

pub const VISIBILITY_THRESHOLD: f32 = 0.1;

/// What the host learned while trying to create a graphics context.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphicsProbe {
    pub available: bool,
    pub renderer: Option<String>,
    /// The context itself reported a CPU implementation.
    pub is_software: bool,
}

impl GraphicsProbe {
    pub fn unavailable() -> Self {
        Self::default()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallbackReason {
    NoGraphics,
    WeakRenderer,
    ReducedMotion,
}

pub fn is_weak_renderer(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    WEAK_RENDERER_PATTERNS.iter().any(|p| name.contains(p))
}

/// `Ok` when the probed context can run the animated backdrop.
pub fn check_graphics(probe: &GraphicsProbe) -> Result<(), FallbackReason> {
    if !probe.available {
        return Err(FallbackReason::NoGraphics);
    }
    if probe.is_software || probe.renderer.as_deref().is_some_and(is_weak_renderer) {
        return Err(FallbackReason::WeakRenderer);
    }
    Ok(())
}

pub fn should_render_3d(probe: &GraphicsProbe) -> bool {
    check_graphics(probe).is_ok()
}

/// One-shot visibility trigger; disconnects after the first qualifying
/// intersection.
#[derive(Clone, Debug)]
pub struct VisibilityGate {
    threshold: f32,
    connected: bool,
    triggered: bool,
}

impl Default for VisibilityGate {
    fn default() -> Self {
        Self::new(VISIBILITY_THRESHOLD)
    }
}

impl VisibilityGate {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            connected: true,
            triggered: false,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Feed an intersection ratio; returns true exactly once.
    pub fn observe(&mut self, ratio: f32) -> bool {
        if !self.connected || ratio <= 0.0 || ratio < self.threshold {
            return false;
        }
        self.triggered = true;
        self.connected = false;
        true
    }

    pub fn disconnect(&mut self) {
        self.connected = false;
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceMode {
    /// Not yet visible or the renderer is still being built: static gradient.
    Placeholder,
    Animated,
    StaticFallback(FallbackReason),
}

/// Mount-time decisions plus the live reduced-motion subscription.
#[derive(Clone, Debug, Default)]
pub struct LifecycleGate {
    visibility: VisibilityGate,
    reduced_motion: bool,
    capability: Option<Result<(), FallbackReason>>,
    renderer_ready: bool,
    initializations: u32,
}

impl LifecycleGate {
    pub fn new(reduced_motion: bool) -> Self {
        Self {
            reduced_motion,
            ..Default::default()
        }
    }

    pub fn visibility(&self) -> &VisibilityGate {
        &self.visibility
    }

    /// Intersection callback; returns true when this call made the mount
    /// element visible.
    pub fn on_visibility(&mut self, ratio: f32) -> bool {
        self.visibility.observe(ratio)
    }

    /// Preference change. Returns the new mode when the visible surface swaps.
    pub fn set_reduced_motion(&mut self, reduced: bool) -> Option<SurfaceMode> {
        if self.reduced_motion == reduced {
            return None;
        }
        let before = self.mode();
        self.reduced_motion = reduced;
        let after = self.mode();
        (before != after).then_some(after)
    }

    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    pub fn set_capability(&mut self, probe: &GraphicsProbe) {
        let verdict = check_graphics(probe);
        if let Err(reason) = verdict {
            log::info!(
                "[gate] animated backdrop disabled ({reason:?}, renderer={:?})",
                probe.renderer
            );
        }
        self.capability = Some(verdict);
    }

    /// The renderer finished building and can draw; until then a passed
    /// probe still shows the placeholder.
    pub fn mark_renderer_ready(&mut self) {
        self.renderer_ready = true;
    }

    pub fn is_renderer_ready(&self) -> bool {
        self.renderer_ready
    }

    /// Whether the frame loop should keep requesting frames.
    pub fn wants_frames(&self) -> bool {
        self.mode() == SurfaceMode::Animated
    }

    pub fn should_mount(&self) -> bool {
        self.visibility.is_triggered()
    }

    /// False until a probe succeeds.
    pub fn should_render_3d(&self) -> bool {
        matches!(self.capability, Some(Ok(())))
    }

    /// Visible, animation wanted and nothing started yet.
    pub fn needs_initialization(&self) -> bool {
        self.should_mount() && !self.reduced_motion && self.initializations == 0
    }

    pub fn begin_initialization(&mut self) {
        self.initializations += 1;
    }

    pub fn initializations(&self) -> u32 {
        self.initializations
    }

    pub fn mode(&self) -> SurfaceMode {
        if self.reduced_motion {
            return SurfaceMode::StaticFallback(FallbackReason::ReducedMotion);
        }
        match self.capability {
            Some(Err(reason)) => SurfaceMode::StaticFallback(reason),
            Some(Ok(())) if self.should_mount() && self.renderer_ready => SurfaceMode::Animated,
            _ => SurfaceMode::Placeholder,
        }
    }

    /// Theme-aware still image shown whenever the surface is not animated.
    pub fn fallback(&self, theme: Theme) -> StaticGradient {
        StaticGradient::for_theme(theme)
    }
}
