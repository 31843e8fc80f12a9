//! Uniform records for the GPU passes.
//!
//! Each layer owns one record and rewrites it in place every frame before
//! uploading it with `queue.write_buffer`. Layouts follow WGSL uniform rules:
//! everything is packed into `vec4` slots so no implicit padding appears.

use crate::constants::{
    BLOOM_STRENGTH, BLOOM_STRENGTH_MOBILE, BLOOM_THRESHOLD, CHROMATIC_OFFSET,
};
use backdrop_core::constants::{
    BLOB_COUNT, FLOW_WEIGHT, FOCAL_LENGTH, GLASS_IOR, GLOW_FALLOFF, GLOW_STRENGTH,
    GRADIENT_ALPHA_RAMP, GRADIENT_DISTORTION, GRADIENT_GRAIN, GRADIENT_WEIGHT_FLOOR,
    MARCH_STEP_SCALE, METABALL_COUNT, RIM_STRENGTH, VIEW_SHIFT_X,
};
use backdrop_core::{CubeFace, GradientEffect, PerformanceTier, RayMarchEffect};
use glam::{Mat4, Vec3};

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RaymarchUniforms {
    pub eye: [f32; 4],   // w: focal length
    pub right: [f32; 4], // w: horizontal view shift
    pub up: [f32; 4],
    pub back: [f32; 4],
    pub balls: [[f32; 4]; METABALL_COUNT], // xyz centre, w radius
    pub rim: [f32; 4],                     // w: intensity
    pub glow: [f32; 4],
    pub resolution: [f32; 2],
    pub time: f32,
    pub env_ready: f32,
    pub march: [f32; 4],   // max steps, surface distance, normal epsilon, max distance
    pub field: [f32; 4],   // threshold, offset, epsilon, step scale
    pub shading: [f32; 4], // ior, flow weight, rim strength, glow falloff
}

impl RaymarchUniforms {
    pub fn write(&mut self, effect: &RayMarchEffect, env_ready: bool) {
        let cam = effect.camera();
        let (right, up, back) = cam.basis();
        self.eye = cam.eye.extend(FOCAL_LENGTH).to_array();
        self.right = right.extend(VIEW_SHIFT_X).to_array();
        self.up = up.extend(0.0).to_array();
        self.back = back.extend(0.0).to_array();
        for (dst, ball) in self.balls.iter_mut().zip(effect.balls()) {
            *dst = ball.center.extend(ball.radius).to_array();
        }
        self.rim = effect.rim_color().extend(effect.intensity()).to_array();
        self.glow = (effect.glow_color() * GLOW_STRENGTH).extend(0.0).to_array();
        self.resolution = effect.resolution().as_vec2().to_array();
        self.time = effect.time();
        self.env_ready = if env_ready { 1.0 } else { 0.0 };
        let s = effect.settings();
        self.march = [s.max_steps as f32, s.surf_dist, s.normal_eps, s.max_dist];
        let f = effect.field();
        self.field = [f.threshold, f.offset, f.epsilon, MARCH_STEP_SCALE];
        self.shading = [GLASS_IOR, FLOW_WEIGHT, RIM_STRENGTH, GLOW_FALLOFF];
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GradientUniforms {
    pub centers: [[f32; 4]; BLOB_COUNT], // xy centre, z pulse, w noise offset
    pub shape: [[f32; 4]; BLOB_COUNT],   // radius, radius noise, softness, noise drift
    pub colors: [[f32; 4]; BLOB_COUNT],
    pub time: f32,
    pub intensity: f32,
    pub noise_scale: f32,
    pub _pad: f32,
    pub tuning: [f32; 4], // distortion, grain, alpha ramp, weight floor
}

impl GradientUniforms {
    pub fn write(&mut self, effect: &GradientEffect) {
        let field = effect.field();
        let frame = effect.frame();
        for (i, blob) in field.blobs.iter().enumerate() {
            let c = frame.centers[i];
            self.centers[i] = [c.x, c.y, frame.pulses[i], blob.noise_offset];
            self.shape[i] = [blob.radius, blob.radius_noise, blob.softness, blob.noise_drift];
            self.colors[i] = effect.colors()[i].extend(1.0).to_array();
        }
        self.time = frame.t;
        self.intensity = effect.intensity();
        self.noise_scale = field.noise_scale;
        self.tuning = [
            GRADIENT_DISTORTION,
            GRADIENT_GRAIN,
            GRADIENT_ALPHA_RAMP,
            GRADIENT_WEIGHT_FLOOR,
        ];
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineUniforms {
    pub mvp: [[f32; 4]; 4],
    pub color: [f32; 4], // linear rgb, w: alpha
}

impl LineUniforms {
    pub fn write(&mut self, mvp: Mat4, color: Vec3, alpha: f32) {
        self.mvp = mvp.to_cols_array_2d();
        self.color = color.extend(alpha).to_array();
    }
}

/// One face of the panorama-to-cube projection pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CubeFaceUniforms {
    pub centre: [f32; 4], // w: face size in texels
    pub s_axis: [f32; 4],
    pub t_axis: [f32; 4],
}

impl CubeFaceUniforms {
    pub fn for_face(face: CubeFace, face_size: u32) -> Self {
        let (centre, s_axis, t_axis) = face.basis();
        Self {
            centre: centre.extend(face_size.max(1) as f32).to_array(),
            s_axis: s_axis.extend(0.0).to_array(),
            t_axis: t_axis.extend(0.0).to_array(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PostUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub chromatic: f32,
    pub blur_dir: [f32; 2],
    pub bloom_strength: f32,
    pub threshold: f32,
}

/// Which post passes run, derived once from the tier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PostSettings {
    pub bloom: bool,
    pub bloom_strength: f32,
    pub chromatic: f32,
}

impl PostSettings {
    pub fn for_tier(tier: &PerformanceTier) -> Self {
        let bloom = tier.post_processing_enabled;
        Self {
            bloom,
            bloom_strength: match (bloom, tier.is_mobile) {
                (false, _) => 0.0,
                (true, true) => BLOOM_STRENGTH_MOBILE,
                (true, false) => BLOOM_STRENGTH,
            },
            chromatic: if tier.chromatic_aberration_enabled() {
                CHROMATIC_OFFSET
            } else {
                0.0
            },
        }
    }

    /// Record for one pass; `blur_dir` is zero outside the blur passes.
    pub fn pass(&self, resolution: [f32; 2], time: f32, blur_dir: [f32; 2]) -> PostUniforms {
        PostUniforms {
            resolution,
            time,
            chromatic: self.chromatic,
            blur_dir,
            bloom_strength: self.bloom_strength,
            threshold: BLOOM_THRESHOLD,
        }
    }
}
