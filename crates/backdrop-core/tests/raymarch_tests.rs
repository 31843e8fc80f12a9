use backdrop_core::constants::MAX_DIST;
use backdrop_core::field::MetaballField;
use backdrop_core::raymarch::{
    camera_ray, estimate_normal, fresnel, march, refract, shade_hit, tone_map, MarchOutcome,
    MarchSettings, ShadeInputs, TRANSPARENT,
};
use backdrop_core::{Camera, CubeFace, EnvironmentMap, EquirectImage};
use glam::{Vec2, Vec3};

fn sphere(center: Vec3, radius: f32) -> impl Fn(Vec3) -> f32 + Copy {
    move |p: Vec3| p.distance(center) - radius
}

#[test]
fn settings_scale_with_quality() {
    let low = MarchSettings::for_quality(0.0);
    let high = MarchSettings::for_quality(1.0);
    assert!(low.max_steps < high.max_steps);
    assert!(low.surf_dist > high.surf_dist);
    assert!(low.normal_eps > high.normal_eps);
    assert_eq!(MarchSettings::for_quality(5.0), high);
}

#[test]
fn exact_sphere_is_hit_at_its_surface() {
    let settings = MarchSettings::for_quality(1.0);
    let out = march(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z, &settings, sphere(Vec3::ZERO, 1.0));
    match out {
        MarchOutcome::Hit { distance, steps } => {
            assert!((distance - 4.0).abs() < 0.02, "distance {distance}");
            assert!(steps <= settings.max_steps);
        }
        other => panic!("expected hit, got {other:?}"),
    }
}

#[test]
fn ray_at_a_metaball_centre_hits_for_every_quality() {
    let field = MetaballField::default();
    let balls = field.balls(0.0, Vec2::splat(0.5));
    let biggest = balls
        .iter()
        .copied()
        .fold(balls[0], |a, b| if b.radius > a.radius { b } else { a });
    let ro = Vec3::new(0.0, 0.0, 5.0);
    let rd = (biggest.center - ro).normalize();
    for q in [0.0, 0.5, 1.0] {
        let settings = MarchSettings::for_quality(q);
        let out = march(ro, rd, &settings, |p| field.distance(p, &balls));
        match out {
            MarchOutcome::Hit { distance, steps } => {
                assert!(distance < MAX_DIST);
                assert!(distance < ro.distance(biggest.center));
                assert!(steps <= settings.max_steps);
            }
            other => panic!("quality {q}: expected hit, got {other:?}"),
        }
    }
}

#[test]
fn ray_pointing_away_escapes() {
    let field = MetaballField::default();
    let balls = field.balls(0.0, Vec2::splat(0.5));
    for q in [0.0, 1.0] {
        let settings = MarchSettings::for_quality(q);
        let out = march(Vec3::new(0.0, 0.0, 5.0), Vec3::Z, &settings, |p| {
            field.distance(p, &balls)
        });
        match out {
            MarchOutcome::Miss { distance, steps } => {
                assert!(distance > MAX_DIST);
                assert!(steps < settings.max_steps);
            }
            other => panic!("expected miss, got {other:?}"),
        }
    }
}

#[test]
fn non_finite_estimate_is_a_miss() {
    let settings = MarchSettings::for_quality(1.0);
    let out = march(Vec3::ZERO, Vec3::Z, &settings, |_| f32::NAN);
    assert!(!out.is_hit());
    assert_eq!(out.steps(), 1);
}

#[test]
fn normal_of_sphere_points_outward() {
    let n = estimate_normal(Vec3::new(0.0, 1.0, 0.0), 1e-3, sphere(Vec3::ZERO, 1.0));
    assert!(n.distance(Vec3::Y) < 1e-2);
    assert_eq!(estimate_normal(Vec3::ZERO, 1e-3, |_| 1.0), -Vec3::Z);
}

#[test]
fn fresnel_grows_toward_grazing() {
    let n = Vec3::Z;
    let head_on = fresnel(-Vec3::Z, n, 1.5);
    let grazing = fresnel(Vec3::new(0.99, 0.0, -0.14).normalize(), n, 1.5);
    assert!((head_on - 0.04).abs() < 1e-3);
    assert!(grazing > head_on);
    assert!((0.0..=1.0).contains(&grazing));
}

#[test]
fn refraction_bends_toward_normal_when_entering() {
    let i = Vec3::new(1.0, 0.0, -1.0).normalize();
    let t = refract(i, Vec3::Z, 1.0 / 1.5).expect("enters glass");
    assert!(t.x < i.x && t.x > 0.0);
    // Leaving at a steep angle is total internal reflection.
    let out = Vec3::new(0.9, 0.0, 0.436).normalize();
    assert!(refract(out, -Vec3::Z, 1.5).is_none());
}

#[test]
fn tone_map_is_bounded() {
    for c in [Vec3::ZERO, Vec3::splat(0.5), Vec3::splat(1e6), Vec3::splat(-3.0)] {
        let m = tone_map(c);
        assert!(m.cmpge(Vec3::ZERO).all() && m.cmplt(Vec3::ONE).all(), "{m:?}");
    }
}

#[test]
fn shading_without_environment_is_defined() {
    let inputs = ShadeInputs {
        time: 1.0,
        rim_color: Vec3::new(0.8, 0.9, 1.0),
        glow_color: Vec3::new(0.6, 0.8, 1.0),
        intensity: 1.0,
        environment: None,
    };
    let rgba = shade_hit(Vec3::new(0.0, 0.0, 1.0), Vec3::Z, -Vec3::Z, 4.0, &inputs);
    assert_eq!(rgba[3], 1.0);
    assert!(rgba.iter().all(|c| c.is_finite() && (0.0..=1.0).contains(c)));
}

#[test]
fn environment_contributes_when_present() {
    let panorama = EquirectImage::new(8, 4, vec![Vec3::splat(4.0); 32]).expect("valid image");
    let map = EnvironmentMap::from_equirect(&panorama, 4);
    let mut inputs = ShadeInputs {
        time: 0.0,
        rim_color: Vec3::ZERO,
        glow_color: Vec3::ZERO,
        intensity: 1.0,
        environment: None,
    };
    let p = Vec3::new(0.0, 0.0, 1.0);
    let dark = shade_hit(p, Vec3::Z, -Vec3::Z, 4.0, &inputs);
    inputs.environment = Some(&map);
    let lit = shade_hit(p, Vec3::Z, -Vec3::Z, 4.0, &inputs);
    assert!(lit[0] > dark[0] && lit[1] > dark[1] && lit[2] > dark[2]);
    assert_eq!(map.face(CubeFace::PosZ).len(), 16);
}

#[test]
fn miss_colour_is_fully_transparent() {
    assert_eq!(TRANSPARENT[3], 0.0);
}

#[test]
fn centre_pixel_ray_is_shifted_left_of_axis() {
    let camera = Camera::for_raymarch(1.0);
    let (ro, rd) = camera_ray(&camera, Vec2::splat(0.5), Vec2::new(100.0, 100.0));
    assert_eq!(ro, camera.eye);
    assert!(rd.x < 0.0);
    assert!(rd.z < 0.0);
    assert!((rd.length() - 1.0).abs() < 1e-5);
}
