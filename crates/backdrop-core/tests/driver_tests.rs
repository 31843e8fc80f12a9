use backdrop_core::constants::{POINTER_LERP_DEFAULT, POINTER_LERP_LOW_END};
use backdrop_core::{
    assess, normalize_pointer, AnimationDriver, Camera, DeviceInfo, FrameUpdate, Palette,
    PerformanceTier, PointerThrottle, Theme,
};
use glam::{UVec2, Vec2};
use proptest::prelude::*;

const RES: UVec2 = UVec2::new(1280, 720);
const FRAME: f32 = 1.0 / 60.0;

fn driver() -> AnimationDriver {
    AnimationDriver::new(&PerformanceTier::DESKTOP, Camera::for_raymarch(1.0), Theme::Dark)
}

fn unit_point() -> impl Strategy<Value = Vec2> {
    (0.0f32..=1.0, 0.0f32..=1.0).prop_map(|(x, y)| Vec2::new(x, y))
}

proptest! {
    #[test]
    fn smoothed_pointer_stays_in_unit_square(
        targets in prop::collection::vec(unit_point(), 1..200),
        low_end in any::<bool>(),
    ) {
        let tier = if low_end {
            assess(&DeviceInfo { logical_cores: Some(2), ..Default::default() })
        } else {
            PerformanceTier::DESKTOP
        };
        let mut d = AnimationDriver::new(&tier, Camera::for_raymarch(1.0), Theme::Dark);
        for (i, target) in targets.iter().enumerate() {
            d.set_pointer_target(*target);
            d.tick(i as f32 * FRAME, FRAME, RES, Theme::Dark);
            let p = d.params().pointer;
            prop_assert!((0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y), "{p:?}");
        }
    }

    #[test]
    fn raw_input_outside_bounds_is_clamped(x in -10.0f32..10.0, y in -10.0f32..10.0) {
        let mut d = driver();
        d.set_pointer_target(Vec2::new(x, y));
        for i in 0..120 {
            d.tick(i as f32 * FRAME, FRAME, RES, Theme::Dark);
        }
        let p = d.params().pointer;
        prop_assert!(p.cmpge(Vec2::ZERO).all() && p.cmple(Vec2::ONE).all());
    }
}

#[test]
fn pointer_moves_by_lerp_rate() {
    let mut d = driver();
    d.set_pointer_target(Vec2::new(1.0, 0.5));
    d.tick(FRAME, FRAME, RES, Theme::Dark);
    let expected = 0.5 + 0.5 * POINTER_LERP_DEFAULT;
    assert!((d.params().pointer.x - expected).abs() < 1e-6);
}

#[test]
fn low_end_smooths_more_slowly() {
    let low = assess(&DeviceInfo {
        logical_cores: Some(2),
        ..Default::default()
    });
    let d = AnimationDriver::new(&low, Camera::for_raymarch(1.0), Theme::Dark);
    assert_eq!(d.lerp_rate(), POINTER_LERP_LOW_END);
    assert!(d.lerp_rate() < driver().lerp_rate());
}

#[test]
fn stalled_frame_changes_nothing() {
    let mut d = driver();
    d.set_pointer_target(Vec2::new(0.9, 0.1));
    d.tick(1.0, FRAME, RES, Theme::Dark);
    let before = d.params().clone();

    d.set_pointer_target(Vec2::new(0.0, 1.0));
    let update = d.tick(1.25, 0.25, UVec2::new(640, 480), Theme::Light);
    assert_eq!(update, FrameUpdate::Skipped);
    assert_eq!(d.params(), &before);

    // Next frame follows the wall clock, not a catch-up jump.
    let update = d.tick(1.25 + FRAME, FRAME, RES, Theme::Dark);
    assert_eq!(update, FrameUpdate::Updated);
    assert!((d.params().time - (1.25 + FRAME)).abs() < 1e-6);
    let moved = d.params().pointer - before.pointer;
    assert!(moved.length() < 0.2);
}

#[test]
fn time_never_decreases() {
    let mut d = driver();
    d.tick(2.0, FRAME, RES, Theme::Dark);
    d.tick(1.5, FRAME, RES, Theme::Dark);
    assert_eq!(d.params().time, 2.0);
    d.tick(f32::NAN, FRAME, RES, Theme::Dark);
    assert_eq!(d.params().time, 2.0);
}

#[test]
fn theme_change_swaps_palette_in_place() {
    let mut d = driver();
    d.tick(0.1, FRAME, RES, Theme::Dark);
    assert_eq!(d.params().palette, Palette::for_theme(Theme::Dark));
    d.tick(0.2, FRAME, RES, Theme::Light);
    assert_eq!(d.params().theme, Theme::Light);
    assert_eq!(d.params().palette, Palette::for_theme(Theme::Light));
}

#[test]
fn resolution_updates_camera_aspect() {
    let mut d = driver();
    d.tick(0.1, FRAME, UVec2::new(800, 400), Theme::Dark);
    assert_eq!(d.params().resolution, UVec2::new(800, 400));
    assert_eq!(d.params().camera.aspect, 2.0);
}

#[test]
fn throttle_emits_leading_event_then_latest_pending() {
    let mut t = PointerThrottle::new(40.0);
    assert_eq!(t.on_event(0.0, Vec2::new(0.1, 0.1)), Some(Vec2::new(0.1, 0.1)));
    assert_eq!(t.on_event(10.0, Vec2::new(0.2, 0.2)), None);
    assert_eq!(t.on_event(20.0, Vec2::new(0.3, 0.3)), None);
    assert!(t.has_pending());
    assert_eq!(t.poll(30.0), None);
    assert_eq!(t.poll(40.0), Some(Vec2::new(0.3, 0.3)));
    assert_eq!(t.poll(90.0), None);
}

#[test]
fn throttle_caps_event_rate() {
    let mut t = PointerThrottle::default();
    let mut emitted = 0;
    // 1 second of 120 Hz pointer events, polled every 60 Hz frame.
    for i in 0..120 {
        let now = i as f64 * (1000.0 / 120.0);
        if t.on_event(now, Vec2::splat(0.5)).is_some() {
            emitted += 1;
        }
        if i % 2 == 0 && t.poll(now).is_some() {
            emitted += 1;
        }
    }
    assert!((20..=30).contains(&emitted), "emitted {emitted}");
}

#[test]
fn normalize_pointer_maps_rect_to_unit_square() {
    let origin = Vec2::new(100.0, 50.0);
    let size = Vec2::new(200.0, 100.0);
    assert_eq!(normalize_pointer(Vec2::new(200.0, 100.0), origin, size), Vec2::splat(0.5));
    assert_eq!(normalize_pointer(Vec2::new(0.0, 500.0), origin, size), Vec2::new(0.0, 1.0));
}
