use super::ScalarField;
use crate::constants::{
    BLOB_COUNT, GRADIENT_ALPHA_RAMP, GRADIENT_DISTORTION, GRADIENT_GRAIN, GRADIENT_NOISE_SCALE,
    GRADIENT_POINTER_GAIN, GRADIENT_SPEED, GRADIENT_WEIGHT_FLOOR,
};
use crate::noise::{fbm2, simplex2, smoothstep};
use glam::{Vec2, Vec3};

const HALF_PI: f32 = std::f32::consts::FRAC_PI_2;

/// One drifting blob. Coordinates are UV with y up.
#[derive(Clone, Copy, Debug)]
pub struct BlobSpec {
    pub base: Vec2,
    pub amplitude: Vec2,
    pub frequency: Vec2,
    pub phase: Vec2,
    pub pointer_gain: f32,
    pub radius: f32,
    pub radius_noise: f32,
    pub softness: f32,
    pub noise_drift: f32,
    pub noise_offset: f32,
    /// Presence pulse: `base + amplitude * sin(t * frequency + phase)`.
    pub pulse: [f32; 4],
}

impl BlobSpec {
    #[inline]
    fn center(&self, t: f32, pointer_offset: Vec2) -> Vec2 {
        let w = self.frequency * t + self.phase;
        self.base + self.amplitude * Vec2::new(w.x.sin(), w.y.sin()) + pointer_offset * self.pointer_gain
    }

    #[inline]
    fn pulse_at(&self, t: f32) -> f32 {
        let [b, a, f, p] = self.pulse;
        (b + a * (t * f + p).sin()).max(0.0)
    }
}

/// Per-frame state shared by every pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GradientFrame {
    pub t: f32,
    pub centers: [Vec2; BLOB_COUNT],
    pub pulses: [f32; BLOB_COUNT],
}

#[derive(Clone, Debug)]
pub struct GradientField {
    pub blobs: [BlobSpec; BLOB_COUNT],
    pub speed: f32,
    pub noise_scale: f32,
    pub intensity: f32,
}

impl Default for GradientField {
    fn default() -> Self {
        let blob = |base: [f32; 2],
                    amplitude: [f32; 2],
                    frequency: [f32; 2],
                    phase: [f32; 2],
                    pointer_gain: f32,
                    shape: [f32; 5],
                    pulse: [f32; 4]| BlobSpec {
            base: Vec2::from(base),
            amplitude: Vec2::from(amplitude),
            frequency: Vec2::from(frequency),
            phase: Vec2::from(phase),
            pointer_gain,
            radius: shape[0],
            radius_noise: shape[1],
            softness: shape[2],
            noise_drift: shape[3],
            noise_offset: shape[4],
            pulse,
        };
        Self {
            blobs: [
                blob(
                    [0.65, 0.4],
                    [0.12, 0.2],
                    [0.4142, 0.3183],
                    [0.0, HALF_PI],
                    1.0,
                    [0.35, 0.1, 0.25, 0.1, 0.0],
                    [0.7, 0.3, 0.5257, 0.0],
                ),
                blob(
                    [0.85, 0.6],
                    [0.1, 0.15],
                    [0.3536, 0.4472],
                    [HALF_PI, 0.0],
                    -0.5,
                    [0.4, 0.12, 0.3, 0.15, 5.0],
                    [0.6, 0.4, 0.3927, HALF_PI],
                ),
                blob(
                    [0.7, 0.3],
                    [0.15, 0.2],
                    [0.5257, 0.3927],
                    [1.5, 2.0 + HALF_PI],
                    0.0,
                    [0.3, 0.08, 0.2, 0.12, 10.0],
                    [0.8, 0.2, 0.6180, 1.0],
                ),
                blob(
                    [0.55, 0.75],
                    [0.1, 0.12],
                    [0.2887, 0.3679],
                    [3.0 + HALF_PI, 1.0],
                    0.0,
                    [0.25, 0.06, 0.15, 0.1, 15.0],
                    [0.5, 0.5, 0.3466, 2.0 + HALF_PI],
                ),
            ],
            speed: GRADIENT_SPEED,
            noise_scale: GRADIENT_NOISE_SCALE,
            intensity: 1.0,
        }
    }
}

impl GradientField {
    /// Lower tiers animate a little slower; per-pixel cost never changes.
    pub fn animation_speed(&self, quality: f32) -> f32 {
        self.speed * (0.75 + 0.25 * quality.clamp(0.0, 1.0))
    }

    pub fn frame(&self, time: f32, pointer: Vec2, quality: f32) -> GradientFrame {
        let t = time * self.animation_speed(quality);
        let m = pointer * 2.0 - Vec2::ONE;
        let offset = Vec2::new(m.x, -m.y) * GRADIENT_POINTER_GAIN;
        let mut frame = GradientFrame {
            t,
            ..Default::default()
        };
        for (i, b) in self.blobs.iter().enumerate() {
            frame.centers[i] = b.center(t, offset);
            frame.pulses[i] = b.pulse_at(t);
        }
        frame
    }

    #[inline]
    fn distort(uv: Vec2, t: f32) -> Vec2 {
        uv + Vec2::new(
            simplex2(Vec2::new(uv.y * 2.0 + t * 0.3, t * 0.2)),
            simplex2(Vec2::new(uv.x * 2.0 + t * 0.2, t * 0.3)),
        ) * GRADIENT_DISTORTION
    }

    /// Weighted contribution of each blob at `uv`.
    pub fn contributions(&self, uv: Vec2, frame: &GradientFrame) -> [f32; BLOB_COUNT] {
        let t = frame.t;
        let duv = Self::distort(uv, t);
        let mut out = [0.0; BLOB_COUNT];
        for (i, b) in self.blobs.iter().enumerate() {
            let noise_at = duv * self.noise_scale + Vec2::splat(t * b.noise_drift + b.noise_offset);
            let r = b.radius + fbm2(noise_at) * b.radius_noise;
            let d = duv.distance(frame.centers[i]);
            out[i] = smoothstep(r + b.softness, r - b.softness, d) * frame.pulses[i];
        }
        out
    }

    /// Contributions normalised to sum to one, or `None` where nothing shows.
    pub fn normalized_weights(contrib: &[f32; BLOB_COUNT]) -> Option<[f32; BLOB_COUNT]> {
        let total: f32 = contrib.iter().sum();
        if total <= GRADIENT_WEIGHT_FLOOR {
            return None;
        }
        let mut w = *contrib;
        for v in &mut w {
            *v /= total;
        }
        Some(w)
    }

    /// Edge fades so the effect floats above a transparent page.
    pub fn edge_fade(uv: Vec2) -> f32 {
        let bottom = smoothstep(0.0, 0.35, uv.y);
        let top = smoothstep(1.0, 0.9, uv.y);
        let left = smoothstep(0.0, 0.5, uv.x);
        let right = smoothstep(1.0, 0.96, uv.x);
        bottom * top * left * right
    }

    /// Final tone-mapped, gamma-corrected RGBA for one pixel.
    pub fn shade(&self, uv: Vec2, frame: &GradientFrame, colors: &[Vec3; BLOB_COUNT]) -> [f32; 4] {
        let contrib = self.contributions(uv, frame);
        let mut color = match Self::normalized_weights(&contrib) {
            Some(w) => colors
                .iter()
                .zip(w.iter())
                .fold(Vec3::ZERO, |acc, (c, w)| acc + *c * *w),
            None => colors[0],
        };
        color += Vec3::splat(simplex2(uv * 500.0 + Vec2::splat(frame.t)) * GRADIENT_GRAIN);
        let peak = contrib.iter().copied().fold(0.0_f32, f32::max);
        let alpha = smoothstep(0.0, GRADIENT_ALPHA_RAMP, peak) * self.intensity * Self::edge_fade(uv);
        let mapped = crate::raymarch::tone_map(color);
        [mapped.x, mapped.y, mapped.z, alpha.clamp(0.0, 1.0)]
    }
}

impl ScalarField for GradientField {
    type Point = Vec2;

    /// Strongest single-blob contribution, the quantity alpha is built from.
    fn value(&self, uv: Vec2, time: f32, pointer: Vec2, quality: f32) -> f32 {
        let frame = self.frame(time, pointer, quality);
        self.contributions(uv, &frame)
            .into_iter()
            .fold(0.0_f32, f32::max)
    }
}
