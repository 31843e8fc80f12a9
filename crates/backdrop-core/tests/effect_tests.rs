use backdrop_core::{
    cpu_effect, AnimationDriver, BackdropConfig, BackgroundEffect, DeviceInfo, EffectKind,
    GradientEffect, MorphEffect, PerformanceTier, RayMarchEffect, Rasterize, Theme,
};
use backdrop_core::{assess, Palette};
use glam::{UVec2, Vec2};
use image::RgbaImage;

fn params_at(kind: EffectKind, time: f32, size: UVec2) -> backdrop_core::RenderParameters {
    let camera = kind.camera(size.x as f32 / size.y as f32);
    let mut driver = AnimationDriver::new(&PerformanceTier::DESKTOP, camera, Theme::Dark);
    driver.tick(time, 1.0 / 60.0, size, Theme::Dark);
    driver.params().clone()
}

#[test]
fn names_round_trip_and_low_end_gets_gradient() {
    for kind in EffectKind::ALL {
        assert_eq!(EffectKind::from_name(kind.name()), Some(kind));
        assert_eq!(cpu_effect(kind).kind(), kind);
    }
    assert_eq!(EffectKind::from_name("webgl"), None);

    let config = BackdropConfig::default();
    let low = assess(&DeviceInfo {
        logical_cores: Some(2),
        ..Default::default()
    });
    assert_eq!(config.effect_for(&low), EffectKind::Gradient);
    assert_eq!(config.effect_for(&PerformanceTier::DESKTOP), config.variant);
}

#[test]
fn raymarch_frame_has_hits_and_transparent_misses() {
    let size = UVec2::new(48, 32);
    let mut effect = RayMarchEffect::default();
    effect.mount(size);
    effect.update_frame(&params_at(EffectKind::RayMarch, 0.0, size));

    let mut img = RgbaImage::new(size.x, size.y);
    effect.rasterize(&mut img);
    let opaque = img.pixels().filter(|p| p.0[3] == 255).count();
    let clear = img.pixels().filter(|p| p.0 == [0, 0, 0, 0]).count();
    assert!(opaque > 0, "no surface visible");
    assert!(clear > 0, "no transparent background");
    assert_eq!(opaque + clear, img.pixels().count());
    assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 0]);
}

#[test]
fn raymarch_miss_pixel_is_transparent() {
    let effect = RayMarchEffect::default();
    assert_eq!(effect.render_pixel(Vec2::new(0.0, 1.0)), [0.0; 4]);
    assert!(!effect.march_pixel(Vec2::new(0.0, 1.0)).is_hit());
}

#[test]
fn morph_buffer_is_rewritten_in_place() {
    let size = UVec2::new(64, 48);
    let mut effect = MorphEffect::default();
    effect.mount(size);
    let ptr = effect.positions().as_ptr();

    effect.update_frame(&params_at(EffectKind::Morph, 0.0, size));
    assert_eq!(effect.positions(), effect.field().base());

    effect.update_frame(&params_at(EffectKind::Morph, 10.0, size));
    assert_eq!(effect.positions().as_ptr(), ptr);
    assert_ne!(effect.positions(), effect.field().base());
    assert_eq!(effect.blend().knot, 1.0);
}

#[test]
fn morph_rotation_depends_on_phase() {
    let size = UVec2::new(64, 48);
    let mut effect = MorphEffect::default();
    effect.update_frame(&params_at(EffectKind::Morph, 3.0, size));
    let resting = effect.model();
    effect.update_frame(&params_at(EffectKind::Morph, 10.0, size));
    let morphed = effect.model();
    assert_ne!(resting, morphed);
    assert!(morphed.is_finite());
}

#[test]
fn morph_draws_lines() {
    let size = UVec2::new(96, 64);
    let mut effect = MorphEffect::default();
    effect.update_frame(&params_at(EffectKind::Morph, 10.0, size));
    let mut img = RgbaImage::new(size.x, size.y);
    effect.rasterize(&mut img);
    let drawn = img.pixels().filter(|p| p.0[3] > 0).count();
    assert!(drawn > 50, "only {drawn} pixels drawn");
    assert!(drawn < img.pixels().count());
}

#[test]
fn gradient_is_transparent_at_edges_and_coloured_inside() {
    let size = UVec2::new(40, 30);
    let mut effect = GradientEffect::default();
    let params = params_at(EffectKind::Gradient, 2.0, size);
    effect.update_frame(&params);
    assert_eq!(effect.colors(), &Palette::for_theme(Theme::Dark).blob_colors());

    let mut img = RgbaImage::new(size.x, size.y);
    effect.rasterize(&mut img);
    for x in 0..size.x {
        assert!(img.get_pixel(x, size.y - 1).0[3] < 8);
    }
    for y in 0..size.y {
        assert!(img.get_pixel(0, y).0[3] < 8);
    }
    assert!(img.pixels().any(|p| p.0[3] > 64));
}

#[test]
fn disposed_effects_stop_updating() {
    let size = UVec2::new(16, 16);
    let mut effect = GradientEffect::default();
    effect.update_frame(&params_at(EffectKind::Gradient, 1.0, size));
    let before = *effect.frame();
    effect.dispose();
    assert!(effect.is_disposed());
    effect.update_frame(&params_at(EffectKind::Gradient, 9.0, size));
    assert_eq!(*effect.frame(), before);

    let mut ray = RayMarchEffect::default();
    ray.update_frame(&params_at(EffectKind::RayMarch, 0.0, size));
    let balls = ray.balls().to_vec();
    ray.dispose();
    ray.update_frame(&params_at(EffectKind::RayMarch, 5.0, size));
    assert_eq!(ray.balls(), balls.as_slice());
}

#[test]
fn theme_switch_reaches_effect_without_rebuild() {
    let size = UVec2::new(16, 16);
    let camera = EffectKind::Gradient.camera(1.0);
    let mut driver = AnimationDriver::new(&PerformanceTier::DESKTOP, camera, Theme::Dark);
    let mut effect = GradientEffect::default();
    driver.tick(0.5, 0.016, size, Theme::Dark);
    effect.update_frame(driver.params());
    let dark = *effect.colors();
    driver.tick(0.6, 0.016, size, Theme::Light);
    effect.update_frame(driver.params());
    assert_ne!(*effect.colors(), dark);
    assert_eq!(effect.colors(), &Palette::for_theme(Theme::Light).blob_colors());
}
