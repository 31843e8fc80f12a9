//! Sphere tracing of the metaball field and glass shading of the hit point.

use crate::constants::{
    FLOW_WEIGHT, FOCAL_LENGTH, GLASS_IOR, GLOW_FALLOFF, GLOW_STRENGTH, MARCH_STEPS_MAX,
    MARCH_STEPS_MIN, MARCH_STEP_SCALE, MAX_DIST, NORMAL_EPS_LOOSE, NORMAL_EPS_TIGHT,
    RIM_STRENGTH, SURF_DIST_LOOSE, SURF_DIST_TIGHT, VIEW_SHIFT_X,
};
use crate::envmap::EnvironmentMap;
use crate::state::Camera;
use glam::{Vec2, Vec3};

pub const TRANSPARENT: [f32; 4] = [0.0, 0.0, 0.0, 0.0];

/// Marching budget derived from the quality level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarchSettings {
    pub max_steps: u32,
    pub surf_dist: f32,
    pub normal_eps: f32,
    pub max_dist: f32,
}

impl MarchSettings {
    pub fn for_quality(quality: f32) -> Self {
        let q = quality.clamp(0.0, 1.0);
        let steps = MARCH_STEPS_MIN as f32 + (MARCH_STEPS_MAX - MARCH_STEPS_MIN) as f32 * q;
        Self {
            max_steps: steps.round() as u32,
            surf_dist: SURF_DIST_LOOSE + (SURF_DIST_TIGHT - SURF_DIST_LOOSE) * q,
            normal_eps: NORMAL_EPS_LOOSE + (NORMAL_EPS_TIGHT - NORMAL_EPS_LOOSE) * q,
            max_dist: MAX_DIST,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MarchOutcome {
    Hit { distance: f32, steps: u32 },
    Miss { distance: f32, steps: u32 },
}

impl MarchOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, MarchOutcome::Hit { .. })
    }

    pub fn steps(&self) -> u32 {
        match *self {
            MarchOutcome::Hit { steps, .. } | MarchOutcome::Miss { steps, .. } => steps,
        }
    }
}

/// Walk `ro + rd * t` by the distance estimate until it drops below the
/// surface threshold (hit) or the ray leaves the scene. Exhausting the step
/// budget without either counts as a miss.
pub fn march(ro: Vec3, rd: Vec3, settings: &MarchSettings, sdf: impl Fn(Vec3) -> f32) -> MarchOutcome {
    let mut t = 0.0_f32;
    let mut scale = MARCH_STEP_SCALE;
    let mut prev_sign = 0.0_f32;
    for step in 0..settings.max_steps {
        let d = sdf(ro + rd * t);
        if !d.is_finite() {
            return MarchOutcome::Miss { distance: t, steps: step + 1 };
        }
        if d.abs() < settings.surf_dist {
            return MarchOutcome::Hit { distance: t, steps: step + 1 };
        }
        let sign = d.signum();
        if prev_sign != 0.0 && sign != prev_sign {
            scale *= 0.5;
        }
        prev_sign = sign;
        t += d * scale;
        if t > settings.max_dist {
            return MarchOutcome::Miss { distance: t, steps: step + 1 };
        }
    }
    MarchOutcome::Miss {
        distance: t,
        steps: settings.max_steps,
    }
}

/// Central-difference gradient of the field (six evaluations).
pub fn estimate_normal(p: Vec3, eps: f32, sdf: impl Fn(Vec3) -> f32) -> Vec3 {
    let ex = Vec3::new(eps, 0.0, 0.0);
    let ey = Vec3::new(0.0, eps, 0.0);
    let ez = Vec3::new(0.0, 0.0, eps);
    let g = Vec3::new(
        sdf(p + ex) - sdf(p - ex),
        sdf(p + ey) - sdf(p - ey),
        sdf(p + ez) - sdf(p - ez),
    );
    let n = g.normalize_or_zero();
    if n == Vec3::ZERO {
        -Vec3::Z
    } else {
        n
    }
}

#[inline]
pub fn reflect(i: Vec3, n: Vec3) -> Vec3 {
    i - 2.0 * n.dot(i) * n
}

/// Snell refraction with relative index `eta`; `None` on total internal reflection.
#[inline]
pub fn refract(i: Vec3, n: Vec3, eta: f32) -> Option<Vec3> {
    let cosi = n.dot(i);
    let k = 1.0 - eta * eta * (1.0 - cosi * cosi);
    if k < 0.0 {
        None
    } else {
        Some(eta * i - (eta * cosi + k.sqrt()) * n)
    }
}

/// Unpolarised dielectric Fresnel reflectance for incident direction `i`.
pub fn fresnel(i: Vec3, n: Vec3, ior: f32) -> f32 {
    let mut cosi = i.dot(n).clamp(-1.0, 1.0);
    let (mut etai, mut etat) = (1.0_f32, ior);
    if cosi > 0.0 {
        std::mem::swap(&mut etai, &mut etat);
    }
    let sint = etai / etat * (1.0 - cosi * cosi).max(0.0).sqrt();
    if sint >= 1.0 {
        return 1.0;
    }
    let cost = (1.0 - sint * sint).max(0.0).sqrt();
    cosi = cosi.abs();
    let rs = ((etat * cosi) - (etai * cost)) / ((etat * cosi) + (etai * cost));
    let rp = ((etai * cosi) - (etat * cost)) / ((etai * cosi) + (etat * cost));
    ((rs * rs + rp * rp) / 2.0).clamp(0.0, 1.0)
}

/// Reinhard tone map followed by display gamma.
#[inline]
pub fn tone_map(color: Vec3) -> Vec3 {
    let c = color.max(Vec3::ZERO);
    let c = c / (c + Vec3::ONE);
    c.powf(1.0 / 2.2)
}

/// Procedural colour flowing over the surface with time.
#[inline]
pub fn flow_color(p: Vec3, time: f32) -> Vec3 {
    Vec3::new(
        0.3 + 0.7 * (p.x * 0.5 + time * 0.8).sin(),
        0.4 + 0.6 * (p.y * 0.7 + time * 0.6).cos(),
        0.6 + 0.4 * (p.z * 0.3 + time * 1.2).sin(),
    )
}

/// World-space primary ray for a pixel at `screen_uv` in [0, 1]^2 (y up).
pub fn camera_ray(camera: &Camera, screen_uv: Vec2, resolution: Vec2) -> (Vec3, Vec3) {
    let mut uv = (screen_uv - Vec2::splat(0.5)) * 2.0;
    uv.x -= VIEW_SHIFT_X;
    uv.x *= resolution.x.max(1.0) / resolution.y.max(1.0);
    let (right, up, back) = camera.basis();
    let rd = (right * uv.x + up * uv.y - back * FOCAL_LENGTH).normalize();
    (camera.eye, rd)
}

/// Everything the glass shading needs besides the geometry.
#[derive(Clone, Copy, Debug)]
pub struct ShadeInputs<'a> {
    pub time: f32,
    pub rim_color: Vec3,
    pub glow_color: Vec3,
    pub intensity: f32,
    pub environment: Option<&'a EnvironmentMap>,
}

/// Shade a hit at `p` with normal `n`, reached after `distance` along `rd`.
pub fn shade_hit(p: Vec3, n: Vec3, rd: Vec3, distance: f32, inputs: &ShadeInputs<'_>) -> [f32; 4] {
    let env = match inputs.environment {
        Some(map) => {
            let f = fresnel(rd, n, GLASS_IOR);
            let reflected = map.sample(reflect(rd, n));
            let refracted = refract(rd, n, 1.0 / GLASS_IOR)
                .map(|dir| map.sample(dir))
                .unwrap_or(reflected);
            refracted.lerp(reflected, f)
        }
        None => Vec3::ZERO,
    };
    let mut color = env.lerp(flow_color(p, inputs.time), FLOW_WEIGHT);
    let facing = rd.dot(n).abs();
    let rim = (1.0 - facing).powi(2);
    color += rim * inputs.rim_color * RIM_STRENGTH;
    let glow = (-distance * GLOW_FALLOFF).exp() * GLOW_STRENGTH;
    color += glow * inputs.glow_color;
    let mapped = tone_map(color * inputs.intensity);
    [mapped.x, mapped.y, mapped.z, 1.0]
}
