use backdrop_core::{
    is_weak_renderer, should_render_3d, FallbackReason, GraphicsProbe, LifecycleGate,
    StaticGradient, SurfaceMode, Theme, VisibilityGate,
};

fn gpu(name: &str) -> GraphicsProbe {
    GraphicsProbe {
        available: true,
        renderer: Some(name.to_string()),
        is_software: false,
    }
}

/// Gate that became visible and passed the capability probe.
fn animated_gate() -> LifecycleGate {
    let mut gate = LifecycleGate::new(false);
    assert!(gate.on_visibility(0.4));
    assert!(gate.needs_initialization());
    gate.begin_initialization();
    gate.set_capability(&gpu("Apple M2"));
    gate.mark_renderer_ready();
    assert_eq!(gate.mode(), SurfaceMode::Animated);
    gate
}

#[test]
fn weak_and_software_renderers_are_rejected() {
    for name in [
        "Google SwiftShader",
        "llvmpipe (LLVM 15.0.7, 256 bits)",
        "Microsoft Basic Render Driver",
        "Intel(R) HD Graphics 4000",
        "Mali-400 MP",
        "Adreno (TM) 306",
        "VMware SVGA 3D",
    ] {
        assert!(is_weak_renderer(name), "{name}");
        assert!(!should_render_3d(&gpu(name)));
    }
    for name in ["Apple M2", "NVIDIA GeForce RTX 4070", "Adreno (TM) 740", "Intel(R) Iris(R) Xe"] {
        assert!(!is_weak_renderer(name), "{name}");
        assert!(should_render_3d(&gpu(name)));
    }
}

#[test]
fn missing_context_or_cpu_adapter_disables_3d() {
    assert!(!should_render_3d(&GraphicsProbe::unavailable()));
    let cpu = GraphicsProbe {
        available: true,
        renderer: None,
        is_software: true,
    };
    assert!(!should_render_3d(&cpu));
    let unnamed = GraphicsProbe {
        available: true,
        renderer: None,
        is_software: false,
    };
    assert!(should_render_3d(&unnamed));
}

#[test]
fn visibility_triggers_once_then_disconnects() {
    let mut v = VisibilityGate::default();
    assert!(!v.observe(0.0));
    assert!(!v.observe(0.05));
    assert!(v.is_connected());
    assert!(v.observe(0.1));
    assert!(!v.is_connected());
    assert!(!v.observe(1.0));
    assert!(v.is_triggered());
}

#[test]
fn initialization_waits_for_visibility() {
    let mut gate = LifecycleGate::new(false);
    assert!(!gate.should_mount());
    assert!(!gate.needs_initialization());
    assert_eq!(gate.mode(), SurfaceMode::Placeholder);

    gate.on_visibility(0.2);
    assert!(gate.should_mount());
    assert!(gate.needs_initialization());
    gate.begin_initialization();
    assert!(!gate.needs_initialization());
    // Probe still pending.
    assert_eq!(gate.mode(), SurfaceMode::Placeholder);
    assert!(!gate.should_render_3d());
}

#[test]
fn placeholder_stays_until_renderer_is_built() {
    let mut gate = LifecycleGate::new(false);
    gate.on_visibility(1.0);
    gate.begin_initialization();
    gate.set_capability(&gpu("Apple M2"));
    assert!(gate.should_render_3d());
    assert!(!gate.is_renderer_ready());
    assert_eq!(gate.mode(), SurfaceMode::Placeholder);
    assert!(!gate.wants_frames());

    gate.mark_renderer_ready();
    assert_eq!(gate.mode(), SurfaceMode::Animated);
    assert!(gate.wants_frames());
}

#[test]
fn frames_stop_under_reduced_motion_and_resume_after() {
    let mut gate = animated_gate();
    assert!(gate.wants_frames());

    gate.set_reduced_motion(true);
    assert!(!gate.wants_frames());

    gate.set_reduced_motion(false);
    assert!(gate.wants_frames());
    assert_eq!(gate.initializations(), 1);
}

#[test]
fn failed_probe_selects_static_fallback() {
    let mut gate = LifecycleGate::new(false);
    gate.on_visibility(1.0);
    gate.begin_initialization();
    gate.set_capability(&gpu("SwiftShader"));
    assert!(!gate.should_render_3d());
    assert_eq!(
        gate.mode(),
        SurfaceMode::StaticFallback(FallbackReason::WeakRenderer)
    );

    gate.set_capability(&GraphicsProbe::unavailable());
    assert_eq!(gate.mode(), SurfaceMode::StaticFallback(FallbackReason::NoGraphics));
}

#[test]
fn reduced_motion_toggles_live_without_remount() {
    let mut gate = animated_gate();

    let swapped = gate.set_reduced_motion(true);
    assert_eq!(
        swapped,
        Some(SurfaceMode::StaticFallback(FallbackReason::ReducedMotion))
    );
    assert_eq!(gate.set_reduced_motion(true), None);

    let swapped = gate.set_reduced_motion(false);
    assert_eq!(swapped, Some(SurfaceMode::Animated));
    assert_eq!(gate.initializations(), 1);
    assert!(!gate.needs_initialization());
}

#[test]
fn reduced_motion_at_mount_defers_initialization() {
    let mut gate = LifecycleGate::new(true);
    gate.on_visibility(1.0);
    assert!(!gate.needs_initialization());
    assert_eq!(
        gate.mode(),
        SurfaceMode::StaticFallback(FallbackReason::ReducedMotion)
    );
    // Preference lifted mid-session: initialise now, once.
    assert_eq!(gate.set_reduced_motion(false), Some(SurfaceMode::Placeholder));
    assert!(gate.needs_initialization());
    gate.begin_initialization();
    gate.set_capability(&gpu("Apple M2"));
    gate.mark_renderer_ready();
    assert_eq!(gate.mode(), SurfaceMode::Animated);
}

#[test]
fn fallback_follows_theme() {
    let gate = LifecycleGate::default();
    let dark = gate.fallback(Theme::Dark);
    let light = gate.fallback(Theme::Light);
    assert_ne!(dark, light);
    assert_eq!(dark, StaticGradient::for_theme(Theme::Dark));
    assert!(dark.css().starts_with("linear-gradient(135deg"));

    let img = light.render(8, 4);
    assert_eq!(img.dimensions(), (8, 4));
    assert_ne!(img.get_pixel(0, 0), img.get_pixel(7, 3));
    assert!(img.pixels().all(|p| p.0[3] == (0.14_f32 * 255.0).round() as u8));
}
