//! Noise primitives shared by the fields. The WGSL shaders carry identical
//! ports so CPU snapshots and GPU frames agree.

use glam::{Vec2, Vec3};

#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[inline]
fn fract(x: f32) -> f32 {
    x - x.floor()
}

#[inline]
fn mod289(x: Vec3) -> Vec3 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

#[inline]
fn permute(x: Vec3) -> Vec3 {
    mod289(((x * 34.0) + Vec3::ONE) * x)
}

/// 2D simplex noise, roughly in [-1, 1].
pub fn simplex2(v: Vec2) -> f32 {
    const C: [f32; 4] = [
        0.211_324_87,  // (3 - sqrt(3)) / 6
        0.366_025_42,  // (sqrt(3) - 1) / 2
        -0.577_350_3,  // -1 + 2 * C.x
        0.024_390_243, // 1 / 41
    ];
    let mut i = (v + Vec2::splat(v.dot(Vec2::splat(C[1])))).floor();
    let x0 = v - i + Vec2::splat(i.dot(Vec2::splat(C[0])));
    let i1 = if x0.x > x0.y {
        Vec2::new(1.0, 0.0)
    } else {
        Vec2::new(0.0, 1.0)
    };
    let x1 = x0 + Vec2::splat(C[0]) - i1;
    let x2 = x0 + Vec2::splat(C[2]);
    i = i - (i * (1.0 / 289.0)).floor() * 289.0;
    let p = permute(
        permute(Vec3::splat(i.y) + Vec3::new(0.0, i1.y, 1.0)) + Vec3::splat(i.x)
            + Vec3::new(0.0, i1.x, 1.0),
    );
    let mut m = (Vec3::splat(0.5) - Vec3::new(x0.dot(x0), x1.dot(x1), x2.dot(x2))).max(Vec3::ZERO);
    m = m * m;
    m = m * m;
    let x = 2.0 * Vec3::new(fract(p.x * C[3]), fract(p.y * C[3]), fract(p.z * C[3])) - Vec3::ONE;
    let h = x.abs() - Vec3::splat(0.5);
    let ox = (x + Vec3::splat(0.5)).floor();
    let a0 = x - ox;
    m *= Vec3::splat(1.792_842_9) - 0.853_734_73 * (a0 * a0 + h * h);
    let g = Vec3::new(
        a0.x * x0.x + h.x * x0.y,
        a0.y * x1.x + h.y * x1.y,
        a0.z * x2.x + h.z * x2.y,
    );
    130.0 * m.dot(g)
}

/// Four-octave fractal simplex noise.
pub fn fbm2(p: Vec2) -> f32 {
    let mut value = 0.0;
    let mut amplitude = 0.5;
    let mut frequency = 1.0;
    for _ in 0..4 {
        value += amplitude * simplex2(p * frequency);
        amplitude *= 0.5;
        frequency *= 2.0;
    }
    value
}

/// Layered sinusoid noise normalised into [-1, 1]; drives the terrain stage
/// and the knot surface wobble.
pub fn wave_noise(x: f32, y: f32, t: f32) -> f32 {
    let s1 = (x * 1.5 + t * 0.3).sin() * (y * 1.2 + t * 0.2).cos();
    let s2 = (x * 3.0 - t * 0.2).sin() * (y * 2.5 + t * 0.15).sin();
    let s3 = (x * 0.8 + y * 1.1 + t * 0.1).cos();
    (s1 + s2 * 0.5 + s3 * 0.25) / 1.75
}
