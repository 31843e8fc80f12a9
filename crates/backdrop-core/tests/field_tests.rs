use backdrop_core::constants::{MORPH_CYCLE_SEC, METABALL_COUNT};
use backdrop_core::field::morph::MORPH_SCHEDULE;
use backdrop_core::field::{
    ease_in_out_cubic, Ball, Blend, FloatingElements, GradientField, MetaballField, MorphField,
    MorphPhase, ScalarField,
};
use backdrop_core::noise::{fbm2, wave_noise};
use glam::{Vec2, Vec3};
use proptest::prelude::*;

fn vec3_in(range: std::ops::Range<f32>) -> impl Strategy<Value = Vec3> {
    (range.clone(), range.clone(), range).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

proptest! {
    #[test]
    fn growing_a_radius_never_lowers_the_field(
        p in vec3_in(-3.0..3.0),
        centers in prop::collection::vec(vec3_in(-2.0..2.0), METABALL_COUNT),
        radii in prop::collection::vec(0.1f32..1.5, METABALL_COUNT),
        which in 0usize..METABALL_COUNT,
        grow in 0.0f32..2.0,
    ) {
        let field = MetaballField::default();
        let balls: Vec<Ball> = centers
            .iter()
            .zip(radii.iter())
            .map(|(c, r)| Ball { center: *c, radius: *r })
            .collect();
        let mut bigger = balls.clone();
        bigger[which].radius += grow;
        let before = field.influence(p, &balls);
        let after = field.influence(p, &bigger);
        prop_assert!(after >= before, "{after} < {before}");
        // Larger influence means the point sits deeper inside the surface.
        prop_assert!(field.distance(p, &bigger) <= field.distance(p, &balls));
    }

    #[test]
    fn blends_stay_in_unit_range(t in 0.0f32..(3.0 * MORPH_CYCLE_SEC)) {
        let b = Blend::at(t);
        for v in [b.terrain, b.knot, b.helix] {
            prop_assert!((0.0..=1.0).contains(&v), "t={t} blend={b:?}");
        }
    }
}

#[test]
fn blends_are_zero_at_start_and_in_pause() {
    let start = Blend::at(0.0);
    assert_eq!((start.terrain, start.knot, start.helix), (0.0, 0.0, 0.0));

    let pause_start = MORPH_SCHEDULE[MORPH_SCHEDULE.len() - 2].1;
    let mut t = pause_start;
    while t < MORPH_CYCLE_SEC {
        let b = Blend::at(t);
        assert_eq!(b.phase, MorphPhase::Pause);
        assert_eq!((b.terrain, b.knot, b.helix), (0.0, 0.0, 0.0), "t={t}");
        t += 0.1;
    }
}

#[test]
fn positions_equal_base_grid_when_flat() {
    let field = MorphField::default();
    let mut out = vec![Vec3::splat(9.0); field.vertex_count()];
    for t in [0.0, 28.5, 29.9, MORPH_CYCLE_SEC] {
        field.write_positions(t, &mut out);
        assert_eq!(out.as_slice(), field.base(), "t={t}");
    }
}

#[test]
fn blend_covers_every_phase_in_order() {
    let mut seen = Vec::new();
    let mut t = 0.0;
    while t < MORPH_CYCLE_SEC {
        let phase = Blend::at(t).phase;
        if seen.last() != Some(&phase) {
            seen.push(phase);
        }
        t += 0.05;
    }
    let expected: Vec<MorphPhase> = MORPH_SCHEDULE.iter().map(|(p, _)| *p).collect();
    assert_eq!(seen, expected);
}

#[test]
fn hold_phases_reach_full_shapes() {
    let knot = Blend::at(10.0);
    assert_eq!(knot.phase, MorphPhase::HoldKnot);
    assert_eq!((knot.knot, knot.helix), (1.0, 0.0));
    let helix = Blend::at(20.0);
    assert_eq!(helix.phase, MorphPhase::HoldHelix);
    assert_eq!(helix.helix, 1.0);
}

#[test]
fn ease_curve_is_monotone_and_pinned() {
    assert_eq!(ease_in_out_cubic(0.0), 0.0);
    assert_eq!(ease_in_out_cubic(1.0), 1.0);
    assert_eq!(ease_in_out_cubic(0.5), 0.5);
    assert_eq!(ease_in_out_cubic(-3.0), 0.0);
    assert_eq!(ease_in_out_cubic(7.0), 1.0);
    let mut prev = 0.0;
    for i in 0..=100 {
        let v = ease_in_out_cubic(i as f32 / 100.0);
        assert!(v >= prev);
        prev = v;
    }
}

#[test]
fn organic_motion_stays_small() {
    let field = MorphField::default();
    let mut out = vec![Vec3::ZERO; field.vertex_count()];
    // Held shapes: perturbation must stay a small fraction of the shape size.
    for (t, target) in [(10.0, field.knot()), (20.0, field.helix())] {
        field.write_positions(t, &mut out);
        let size = target.iter().map(|v| v.length()).fold(0.0_f32, f32::max);
        let worst = out
            .iter()
            .zip(target.iter())
            .map(|(a, b)| a.distance(*b))
            .fold(0.0_f32, f32::max);
        assert!(worst < 0.15 * size, "t={t} worst={worst} size={size}");
    }
}

#[test]
fn morph_arrays_share_length() {
    let field = MorphField::new(8);
    assert_eq!(field.vertex_count(), 81);
    assert_eq!(field.base().len(), field.knot().len());
    assert_eq!(field.base().len(), field.helix().len());
    let idx = field.line_indices();
    assert_eq!(idx.len(), 2 * 2 * 8 * 9);
    assert!(idx.iter().all(|&i| (i as usize) < field.vertex_count()));
}

#[test]
fn floating_elements_are_seeded() {
    let a = FloatingElements::new(25, 7);
    let b = FloatingElements::new(25, 7);
    let mut va = vec![Vec3::ZERO; a.vertex_count()];
    let mut vb = vec![Vec3::ZERO; b.vertex_count()];
    a.write_vertices(3.0, &mut va);
    b.write_vertices(3.0, &mut vb);
    assert_eq!(va, vb);
    assert_eq!(a.len(), 25);
    assert_eq!(a.line_indices().len(), 25 * 12 * 2);
}

#[test]
fn centre_trajectories_do_not_repeat_within_ten_seconds() {
    let field = MetaballField::default();
    let pointer = Vec2::splat(0.5);
    let sample = |t: f32| field.balls(t, pointer);
    let mut shift = 0.25;
    while shift <= 5.0 {
        for i in 0..METABALL_COUNT {
            let mut worst = 0.0_f32;
            let mut t = 0.0;
            while t <= 5.0 {
                worst = worst.max(sample(t)[i].center.distance(sample(t + shift)[i].center));
                t += 0.05;
            }
            assert!(worst > 1e-3, "ball {i} repeats with period {shift}");
        }
        shift += 0.25;
    }

    let gradient = GradientField::default();
    let mut shift = 0.25;
    while shift <= 5.0 {
        for i in 0..4 {
            let mut worst = 0.0_f32;
            let mut t = 0.0;
            while t <= 5.0 {
                let a = gradient.frame(t, pointer, 1.0).centers[i];
                let b = gradient.frame(t + shift, pointer, 1.0).centers[i];
                worst = worst.max(a.distance(b));
                t += 0.05;
            }
            assert!(worst > 1e-3, "blob {i} repeats with period {shift}");
        }
        shift += 0.25;
    }
}

#[test]
fn pointer_bias_moves_centres() {
    let field = MetaballField::default();
    let centred = field.balls(1.0, Vec2::splat(0.5));
    let right = field.balls(1.0, Vec2::new(1.0, 0.5));
    for (a, b) in centred.iter().zip(right.iter()) {
        assert!(b.center.x > a.center.x);
        assert_eq!(a.radius, b.radius);
    }
}

#[test]
fn metaball_field_value_matches_influence() {
    let field = MetaballField::default();
    let p = Vec3::new(0.3, -0.2, 0.1);
    let balls = field.balls(2.0, Vec2::splat(0.5));
    assert_eq!(field.value(p, 2.0, Vec2::splat(0.5), 1.0), field.influence(p, &balls));
    assert!(field.distance(Vec3::new(0.0, 0.0, 40.0), &balls) > 1.0);
}

#[test]
fn gradient_weights_sum_to_one_where_visible() {
    let field = GradientField::default();
    for t in [0.0, 3.7, 12.0] {
        let frame = field.frame(t, Vec2::new(0.3, 0.7), 1.0);
        for y in 0..12 {
            for x in 0..12 {
                let uv = Vec2::new(x as f32 / 11.0, y as f32 / 11.0);
                let c = field.contributions(uv, &frame);
                match GradientField::normalized_weights(&c) {
                    Some(w) => {
                        let sum: f32 = w.iter().sum();
                        assert!((sum - 1.0).abs() < 1e-4, "sum={sum}");
                        assert!(w.iter().all(|v| *v >= 0.0));
                    }
                    None => assert!(c.iter().sum::<f32>() <= 1e-3),
                }
            }
        }
    }
}

#[test]
fn gradient_fades_at_every_edge() {
    for uv in [
        Vec2::new(0.5, 0.0),
        Vec2::new(0.5, 1.0),
        Vec2::new(0.0, 0.5),
        Vec2::new(1.0, 0.5),
    ] {
        assert_eq!(GradientField::edge_fade(uv), 0.0, "{uv:?}");
    }
    assert!(GradientField::edge_fade(Vec2::new(0.75, 0.6)) > 0.9);

    let field = GradientField::default();
    let frame = field.frame(1.0, Vec2::splat(0.5), 1.0);
    let colors = [Vec3::X, Vec3::Y, Vec3::Z, Vec3::ONE];
    let rgba = field.shade(Vec2::new(0.0, 0.5), &frame, &colors);
    assert_eq!(rgba[3], 0.0);
}

#[test]
fn gradient_alpha_follows_peak_blob() {
    let field = GradientField::default();
    let frame = field.frame(0.0, Vec2::splat(0.5), 1.0);
    let colors = [Vec3::X, Vec3::Y, Vec3::Z, Vec3::ONE];
    // Inside the first blob, away from the fades.
    let rgba = field.shade(frame.centers[0], &frame, &colors);
    assert!(rgba[3] > 0.3, "alpha {}", rgba[3]);
    assert!(rgba.iter().all(|c| (0.0..=1.0).contains(c)));
}

#[test]
fn quality_only_changes_gradient_speed() {
    let field = GradientField::default();
    assert!(field.animation_speed(0.0) < field.animation_speed(1.0));
    let slow = field.frame(4.0, Vec2::splat(0.5), 0.0);
    let fast = field.frame(4.0, Vec2::splat(0.5), 1.0);
    assert!(slow.t < fast.t);
}

#[test]
fn noise_stays_bounded() {
    for i in 0..500 {
        let x = i as f32 * 0.37 - 40.0;
        let y = i as f32 * 0.11 + 3.0;
        let w = wave_noise(x, y, i as f32 * 0.05);
        assert!((-1.0..=1.0).contains(&w));
        let f = fbm2(Vec2::new(x, y));
        assert!(f.abs() <= 1.0, "fbm2({x}, {y}) = {f}");
    }
}
